//! Codec module - line encoding for exchanges.
//!
//! - [`HexCodec`] - hex text <-> bytes, lowercase on output
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects.
//! The line encoding is fixed by the host proxy, so there is nothing to select
//! at runtime.
//!
//! # Example
//!
//! ```
//! use replay_middleware::codec::HexCodec;
//!
//! let decoded = HexCodec::decode("310a").unwrap();
//! assert_eq!(decoded, b"1\n");
//! ```

mod hex_codec;

pub use hex_codec::HexCodec;
