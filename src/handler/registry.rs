//! Router dispatching exchanges by message type.
//!
//! Handlers run in order: the catch-all (if any) first, then the handler
//! registered for the exchange's type. Each sees the previous handler's
//! output; a `None` anywhere drops the exchange.
//!
//! Exchanges with no matching handler, and exchanges whose type does not
//! resolve, pass through unchanged.

use std::collections::HashMap;

use super::Middleware;
use crate::protocol::{Exchange, MessageType};

/// Middleware that dispatches by [`MessageType`].
#[derive(Default)]
pub struct Router {
    /// Handlers by message type.
    handlers: HashMap<MessageType, Box<dyn Middleware>>,
    /// Handler for every message.
    catch_all: Option<Box<dyn Middleware>>,
}

impl Router {
    /// Create an empty router (behaves as identity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for one message type, replacing any previous one.
    pub fn on<M: Middleware>(mut self, kind: MessageType, handler: M) -> Self {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    /// Register a handler that sees every exchange before the typed handler.
    pub fn on_message<M: Middleware>(mut self, handler: M) -> Self {
        self.catch_all = Some(Box::new(handler));
        self
    }

    /// Check if a typed handler is registered.
    pub fn has_handler(&self, kind: MessageType) -> bool {
        self.handlers.contains_key(&kind)
    }
}

impl Middleware for Router {
    fn handle(&self, exchange: Exchange) -> Option<Exchange> {
        let exchange = match &self.catch_all {
            Some(handler) => handler.handle(exchange)?,
            None => exchange,
        };

        let kind = match exchange.message_type() {
            Ok(kind) => kind,
            Err(e) => {
                tracing::debug!("Router pass-through: {}", e);
                return Some(exchange);
            }
        };

        match self.handlers.get(&kind) {
            Some(handler) => handler.handle(exchange),
            None => Some(exchange),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn exchange(raw: &'static [u8]) -> Exchange {
        Exchange::parse(Bytes::from_static(raw)).unwrap()
    }

    fn replace_body(exchange: Exchange) -> Option<Exchange> {
        let payload = exchange.payload.with_body(Bytes::from_static(b"changed"));
        Some(Exchange::new(exchange.metadata, payload))
    }

    #[test]
    fn test_empty_router_is_identity() {
        let ex = exchange(b"1 id\n\r\n\r\nbody");
        assert_eq!(Router::new().handle(ex.clone()), Some(ex));
    }

    #[test]
    fn test_dispatch_by_type() {
        let router = Router::new()
            .on(MessageType::Request, replace_body)
            .on(MessageType::OriginalResponse, |_: Exchange| -> Option<Exchange> { None });

        let out = router.handle(exchange(b"1 id\n\r\n\r\nbody")).unwrap();
        assert_eq!(out.payload.body(), b"changed");

        assert!(router.handle(exchange(b"2 id\n\r\n\r\nbody")).is_none());

        // No handler for replayed responses
        let out = router.handle(exchange(b"3 id\n\r\n\r\nbody")).unwrap();
        assert_eq!(out.payload.body(), b"body");
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let router = Router::new().on(MessageType::Request, |_: Exchange| -> Option<Exchange> { None });
        let ex = exchange(b"9 id\n\r\n\r\nbody");
        assert_eq!(router.handle(ex.clone()), Some(ex));
    }

    #[test]
    fn test_catch_all_runs_first() {
        let router = Router::new()
            .on_message(replace_body)
            .on(MessageType::Request, |ex: Exchange| {
                assert_eq!(ex.payload.body(), b"changed");
                Some(ex)
            });

        let out = router.handle(exchange(b"1 id\n\r\n\r\nbody")).unwrap();
        assert_eq!(out.payload.body(), b"changed");
    }

    #[test]
    fn test_catch_all_drop_short_circuits() {
        let router = Router::new()
            .on_message(|_: Exchange| -> Option<Exchange> { None })
            .on(MessageType::Request, |_: Exchange| -> Option<Exchange> {
                panic!("typed handler must not run")
            });

        assert!(router.handle(exchange(b"1 id\n\r\n\r\n")).is_none());
        assert!(router.has_handler(MessageType::Request));
        assert!(!router.has_handler(MessageType::ReplayedResponse));
    }
}
