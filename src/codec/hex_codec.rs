//! Hex codec - the line encoding used on both stdin and stdout.
//!
//! Every exchange crosses the pipe as a single line of hex text, so the
//! payload can carry arbitrary bytes (including newlines) without framing
//! ambiguity.
//!
//! # Example
//!
//! ```
//! use replay_middleware::codec::HexCodec;
//!
//! let bytes = HexCodec::decode("48690A").unwrap();
//! assert_eq!(bytes, b"Hi\n");
//! assert_eq!(HexCodec::encode(&bytes), "48690a");
//! ```

use crate::error::Result;

/// Hex codec for exchange lines.
///
/// Decoding is case-insensitive; encoding always produces lowercase
/// with no separators and no line terminator.
pub struct HexCodec;

impl HexCodec {
    /// Decode hex text into bytes.
    ///
    /// Accepts `&str` or raw line bytes.
    ///
    /// # Errors
    ///
    /// Returns `MiddlewareError::Decode` on odd length or a character
    /// outside the hex alphabet.
    #[inline]
    pub fn decode<T: AsRef<[u8]>>(text: T) -> Result<Vec<u8>> {
        Ok(hex::decode(text)?)
    }

    /// Encode bytes as lowercase hex text.
    #[inline]
    pub fn encode<T: AsRef<[u8]>>(data: T) -> String {
        hex::encode(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MiddlewareError;

    #[test]
    fn test_decode_mixed_case() {
        assert_eq!(HexCodec::decode("DeadBEEF").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_encode_is_lowercase_normalization() {
        let input = "0A0b0C7F";
        let decoded = HexCodec::decode(input).unwrap();
        assert_eq!(HexCodec::encode(&decoded), input.to_lowercase());
    }

    #[test]
    fn test_binary_data_preserved() {
        // Every byte value survives
        let all_bytes: Vec<u8> = (0..=255).collect();
        let encoded = HexCodec::encode(&all_bytes);
        assert_eq!(encoded.len(), 512);
        assert_eq!(HexCodec::decode(&encoded).unwrap(), all_bytes);
    }

    #[test]
    fn test_empty() {
        assert!(HexCodec::decode("").unwrap().is_empty());
        assert_eq!(HexCodec::encode(b""), "");
    }

    #[test]
    fn test_odd_length_rejected() {
        let err = HexCodec::decode("abc").unwrap_err();
        assert!(matches!(err, MiddlewareError::Decode(hex::FromHexError::OddLength)));
    }

    #[test]
    fn test_invalid_character_rejected() {
        let err = HexCodec::decode("zz").unwrap_err();
        assert!(matches!(
            err,
            MiddlewareError::Decode(hex::FromHexError::InvalidHexCharacter { c: 'z', index: 0 })
        ));
    }

    #[test]
    fn test_non_ascii_bytes_rejected() {
        assert!(HexCodec::decode([0xC3u8, 0xA9]).is_err());
    }
}
