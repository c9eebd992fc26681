//! A fully framed exchange: metadata plus split payload.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use replay_middleware::protocol::{Exchange, MessageType};
//!
//! let raw = Bytes::from_static(b"1 reqid\nheader: a\r\n\r\nbody");
//! let exchange = Exchange::parse(raw.clone()).unwrap();
//!
//! assert_eq!(exchange.message_type().unwrap(), MessageType::Request);
//! assert_eq!(exchange.payload.body(), b"body");
//! assert_eq!(exchange.to_bytes(), raw);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::envelope::{split_envelope, Metadata, METADATA_SEPARATOR};
use super::message_type::MessageType;
use super::payload::Payload;
use crate::error::Result;

/// One intercepted request or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Metadata line, preserved verbatim.
    pub metadata: Metadata,
    /// Header block and body.
    pub payload: Payload,
}

impl Exchange {
    /// Create an exchange from its parts.
    pub fn new(metadata: Metadata, payload: Payload) -> Self {
        Self { metadata, payload }
    }

    /// Split a decoded envelope and frame its payload.
    ///
    /// Equivalent to [`split_envelope`] followed by [`Exchange::frame`].
    pub fn parse(envelope: Bytes) -> Result<Self> {
        let (metadata, payload) = split_envelope(envelope)?;
        Self::frame(metadata, payload)
    }

    /// Frame an already split payload at its header boundary.
    ///
    /// # Errors
    ///
    /// Returns `MiddlewareError::HeaderBoundaryNotFound` if the payload has
    /// no `\r\n\r\n`.
    pub fn frame(metadata: Metadata, payload: Bytes) -> Result<Self> {
        let payload = Payload::parse(payload)?;
        Ok(Self { metadata, payload })
    }

    /// Resolve the message type from the metadata.
    #[inline]
    pub fn message_type(&self) -> Result<MessageType> {
        self.metadata.message_type()
    }

    /// Reassembled length (metadata + newline + payload).
    #[inline]
    fn encoded_len(&self) -> usize {
        self.metadata.as_bytes().len() + 1 + self.payload.len()
    }

    /// Reassemble `metadata '\n' header_block body` into one buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_slice(self.metadata.as_bytes());
        buf.put_u8(METADATA_SEPARATOR);
        buf.put_slice(self.payload.header_block());
        buf.put_slice(self.payload.body());
        buf.freeze()
    }
}
