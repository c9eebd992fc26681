//! Message type codes carried in the metadata line.
//!
//! ```text
//! 1 <request id> <timestamp>\n            Request
//! 2 <request id> <timestamp> <latency>\n  Original response
//! 3 <request id> <timestamp> <latency>\n  Replayed response
//! ```

use std::fmt;

use serde::Serialize;

use crate::error::{MiddlewareError, Result};

/// Kind of intercepted exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Request captured from the original traffic.
    Request,
    /// Response returned to the original request.
    OriginalResponse,
    /// Response returned by the replay target.
    ReplayedResponse,
}

impl MessageType {
    /// All message types, in code order.
    pub const ALL: [MessageType; 3] = [
        MessageType::Request,
        MessageType::OriginalResponse,
        MessageType::ReplayedResponse,
    ];

    /// Map an integer code to a message type.
    ///
    /// # Errors
    ///
    /// Returns `MiddlewareError::UnknownMessageType` for any code other than 1, 2 or 3.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(MessageType::Request),
            2 => Ok(MessageType::OriginalResponse),
            3 => Ok(MessageType::ReplayedResponse),
            other => Err(MiddlewareError::UnknownMessageType(other.to_string())),
        }
    }

    /// Integer code of this type.
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            MessageType::Request => 1,
            MessageType::OriginalResponse => 2,
            MessageType::ReplayedResponse => 3,
        }
    }

    /// Human-readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            MessageType::Request => "Request",
            MessageType::OriginalResponse => "Original Response",
            MessageType::ReplayedResponse => "Replayed Response",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve the message type from a metadata line.
///
/// Takes the bytes up to the first space, parses them as a base-10
/// integer and maps the result through [`MessageType::from_code`].
///
/// # Example
///
/// ```
/// use replay_middleware::protocol::{resolve_message_type, MessageType};
///
/// let kind = resolve_message_type(b"2 8a1f 1700000000 12").unwrap();
/// assert_eq!(kind, MessageType::OriginalResponse);
/// ```
pub fn resolve_message_type(metadata: &[u8]) -> Result<MessageType> {
    let token = metadata.split(|&b| b == b' ').next().unwrap_or_default();
    let unknown = || MiddlewareError::UnknownMessageType(String::from_utf8_lossy(token).into_owned());

    let code = std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(unknown)?;

    MessageType::from_code(code).map_err(|_| unknown())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(resolve_message_type(b"1").unwrap(), MessageType::Request);
        assert_eq!(resolve_message_type(b"2 id").unwrap(), MessageType::OriginalResponse);
        assert_eq!(resolve_message_type(b"3 id 1 2").unwrap(), MessageType::ReplayedResponse);
    }

    #[test]
    fn test_code_round_trip() {
        for kind in MessageType::ALL {
            assert_eq!(MessageType::from_code(kind.code() as i64).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_codes_rejected() {
        for meta in [&b"0 id"[..], b"4", b"-1 x", b"999999999999999999999"] {
            let err = resolve_message_type(meta).unwrap_err();
            assert!(matches!(err, MiddlewareError::UnknownMessageType(_)), "{:?}", meta);
        }
    }

    #[test]
    fn test_non_numeric_token_rejected() {
        let err = resolve_message_type(b"req 1").unwrap_err();
        assert!(matches!(err, MiddlewareError::UnknownMessageType(ref t) if t == "req"));
    }

    #[test]
    fn test_empty_metadata_rejected() {
        assert!(resolve_message_type(b"").is_err());
        // Leading space means the type token is empty
        assert!(resolve_message_type(b" 1").is_err());
    }

    #[test]
    fn test_integer_token_forms() {
        // Leading zeros and an explicit plus sign are plain integers
        assert_eq!(resolve_message_type(b"01 x").unwrap(), MessageType::Request);
        assert_eq!(resolve_message_type(b"+1 x").unwrap(), MessageType::Request);
        assert_eq!(resolve_message_type(b"003").unwrap(), MessageType::ReplayedResponse);
        assert!(resolve_message_type(b"1.0 x").is_err());
    }

    #[test]
    fn test_only_space_separates_token() {
        // A tab is part of the token, not a separator
        assert!(resolve_message_type(b"1\tid").is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(MessageType::Request.to_string(), "Request");
        assert_eq!(MessageType::OriginalResponse.name(), "Original Response");
        assert_eq!(MessageType::ReplayedResponse.name(), "Replayed Response");
    }
}
