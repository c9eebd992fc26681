//! Protocol module - envelope layout, message types and HTTP framing.
//!
//! This module implements the framing of a decoded exchange line:
//! - metadata / payload split on the first newline
//! - message type resolution from the metadata's leading token
//! - header block / body split on the first blank line
//! - reassembly into a single buffer

mod envelope;
mod exchange;
mod message_type;
mod payload;

pub use envelope::{split_envelope, Metadata, METADATA_SEPARATOR};
pub use exchange::Exchange;
pub use message_type::{resolve_message_type, MessageType};
pub use payload::{locate_body_start, Payload, HEADER_TERMINATOR};
