//! Envelope splitting and metadata accessors.
//!
//! A decoded line is an envelope:
//!
//! ```text
//! ┌──────────────────────────────┬────┬──────────────────────┐
//! │ Metadata                     │ \n │ Payload              │
//! │ "<type> <id> <ts> [latency]" │    │ header block + body  │
//! └──────────────────────────────┴────┴──────────────────────┘
//! ```
//!
//! Only the first newline splits. Metadata is kept verbatim so it can be
//! written back byte-for-byte.

use bytes::Bytes;

use super::message_type::{resolve_message_type, MessageType};
use crate::error::{MiddlewareError, Result};

/// Separator between metadata and payload.
pub const METADATA_SEPARATOR: u8 = b'\n';

/// The metadata line of an envelope (without its newline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    raw: Bytes,
}

impl Metadata {
    /// Wrap raw metadata bytes.
    pub fn new(raw: impl Into<Bytes>) -> Self {
        Self { raw: raw.into() }
    }

    /// Raw metadata bytes, exactly as received.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Clone of the raw bytes (cheap, zero-copy).
    #[inline]
    pub fn raw(&self) -> Bytes {
        self.raw.clone()
    }

    /// The leading type token (everything before the first space).
    pub fn type_token(&self) -> &[u8] {
        self.token(0).unwrap_or_default()
    }

    /// Resolve the message type from the leading token.
    pub fn message_type(&self) -> Result<MessageType> {
        resolve_message_type(&self.raw)
    }

    /// Request identifier (second token), shared by a request and its responses.
    pub fn request_id(&self) -> Option<&[u8]> {
        self.token(1).filter(|t| !t.is_empty())
    }

    /// Timestamp in nanoseconds (third token).
    pub fn timestamp(&self) -> Option<i64> {
        self.numeric_token(2)
    }

    /// Round-trip latency in nanoseconds (fourth token, responses only).
    pub fn latency(&self) -> Option<i64> {
        self.numeric_token(3)
    }

    fn token(&self, index: usize) -> Option<&[u8]> {
        self.as_bytes().split(|&b| b == b' ').nth(index)
    }

    fn numeric_token(&self, index: usize) -> Option<i64> {
        let token = self.token(index)?;
        std::str::from_utf8(token).ok()?.parse().ok()
    }
}

/// Split a decoded envelope at its first newline.
///
/// Returns `(metadata, payload)`; the newline itself belongs to neither.
/// Both halves share the input buffer.
///
/// # Errors
///
/// Returns `MiddlewareError::MalformedEnvelope` if the input has no newline.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use replay_middleware::protocol::split_envelope;
///
/// let (meta, payload) = split_envelope(Bytes::from_static(b"1 abc\nGET / HTTP/1.1\r\n\r\n")).unwrap();
/// assert_eq!(meta.as_bytes(), b"1 abc");
/// assert_eq!(&payload[..], b"GET / HTTP/1.1\r\n\r\n");
/// ```
pub fn split_envelope(mut envelope: Bytes) -> Result<(Metadata, Bytes)> {
    let pos = envelope
        .iter()
        .position(|&b| b == METADATA_SEPARATOR)
        .ok_or(MiddlewareError::MalformedEnvelope)?;

    let metadata = envelope.split_to(pos);
    let payload = envelope.slice(1..);

    Ok((Metadata::new(metadata), payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(data: &'static [u8]) -> Result<(Metadata, Bytes)> {
        split_envelope(Bytes::from_static(data))
    }

    #[test]
    fn test_split_on_first_newline_only() {
        let (meta, payload) = split(b"1 id\nline one\nline two").unwrap();
        assert_eq!(meta.as_bytes(), b"1 id");
        assert_eq!(&payload[..], b"line one\nline two");
    }

    #[test]
    fn test_split_reconstructs_input() {
        let inputs: [&'static [u8]; 4] = [b"\n", b"a\n", b"\nb", b"2 x 1 2\n\x00\xff\n\r\n"];
        for input in inputs {
            let (meta, payload) = split(input).unwrap();
            let mut rebuilt = meta.as_bytes().to_vec();
            rebuilt.push(b'\n');
            rebuilt.extend_from_slice(&payload);
            assert_eq!(rebuilt, input);
        }
    }

    #[test]
    fn test_empty_halves_allowed() {
        let (meta, payload) = split(b"\n").unwrap();
        assert!(meta.as_bytes().is_empty());
        assert!(payload.is_empty());
    }

    #[test]
    fn test_missing_newline_is_malformed() {
        assert!(matches!(split(b"1 id"), Err(MiddlewareError::MalformedEnvelope)));
        assert!(matches!(split(b""), Err(MiddlewareError::MalformedEnvelope)));
    }

    #[test]
    fn test_metadata_accessors() {
        let meta = Metadata::new(Bytes::from_static(b"2 f45590522cd1838b 1500000000 1231"));
        assert_eq!(meta.type_token(), b"2");
        assert_eq!(meta.message_type().unwrap(), MessageType::OriginalResponse);
        assert_eq!(meta.request_id(), Some(&b"f45590522cd1838b"[..]));
        assert_eq!(meta.timestamp(), Some(1_500_000_000));
        assert_eq!(meta.latency(), Some(1231));
    }

    #[test]
    fn test_metadata_missing_tokens() {
        let meta = Metadata::new(Bytes::from_static(b"1"));
        assert_eq!(meta.type_token(), b"1");
        assert!(meta.request_id().is_none());
        assert!(meta.timestamp().is_none());
        assert!(meta.latency().is_none());

        let meta = Metadata::new(Bytes::from_static(b"1 id notanumber"));
        assert!(meta.timestamp().is_none());
    }
}
