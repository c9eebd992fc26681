//! Handler module - the middleware seam between framing and re-encoding.
//!
//! Provides:
//! - [`Middleware`] - observe or transform one exchange
//! - [`Identity`] - pass every exchange through unchanged
//! - [`Router`] - dispatch by message type
//!
//! # Example
//!
//! ```
//! use replay_middleware::handler::Router;
//! use replay_middleware::protocol::{Exchange, MessageType};
//!
//! let router = Router::new()
//!     .on(MessageType::Request, |exchange: Exchange| Some(exchange))
//!     .on(MessageType::OriginalResponse, |_: Exchange| -> Option<Exchange> { None });
//! assert!(router.has_handler(MessageType::Request));
//! ```

mod registry;

pub use registry::Router;

use crate::protocol::Exchange;

/// Observe or transform one framed exchange.
///
/// Returning `None` drops the exchange: no output line is written for it.
pub trait Middleware: Send + Sync + 'static {
    /// Handle one exchange.
    fn handle(&self, exchange: Exchange) -> Option<Exchange>;
}

impl<F> Middleware for F
where
    F: Fn(Exchange) -> Option<Exchange> + Send + Sync + 'static,
{
    fn handle(&self, exchange: Exchange) -> Option<Exchange> {
        self(exchange)
    }
}

/// Pass-through middleware; the output line equals the input line.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Middleware for Identity {
    #[inline]
    fn handle(&self, exchange: Exchange) -> Option<Exchange> {
        Some(exchange)
    }
}
