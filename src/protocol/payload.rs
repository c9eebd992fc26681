//! Header/body framing of an HTTP payload.
//!
//! The header block runs up to and including the first blank line
//! (`\r\n\r\n`); everything after it is body. Markers inside the body
//! are never looked at.

use bytes::Bytes;

use crate::error::{MiddlewareError, Result};

/// Blank line terminating the HTTP header block.
pub const HEADER_TERMINATOR: &[u8; 4] = b"\r\n\r\n";

/// Locate the start of the body inside a payload.
///
/// Returns the smallest `i` such that `payload[i - 4..i] == "\r\n\r\n"`.
///
/// # Errors
///
/// Returns `MiddlewareError::HeaderBoundaryNotFound` if the terminator never occurs.
///
/// # Example
///
/// ```
/// use replay_middleware::protocol::locate_body_start;
///
/// assert_eq!(locate_body_start(b"header: a\r\n\r\nbody").unwrap(), 13);
/// assert_eq!(locate_body_start(b"\r\n\r\n").unwrap(), 4);
/// ```
pub fn locate_body_start(payload: &[u8]) -> Result<usize> {
    payload
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
        .map(|pos| pos + HEADER_TERMINATOR.len())
        .ok_or(MiddlewareError::HeaderBoundaryNotFound)
}

/// An HTTP payload split into header block and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Header block, including the terminating `\r\n\r\n`.
    header_block: Bytes,
    /// Everything after the header block.
    body: Bytes,
}

impl Payload {
    /// Split a payload at its header boundary (zero-copy).
    pub fn parse(mut payload: Bytes) -> Result<Self> {
        let body_start = locate_body_start(&payload)?;
        let header_block = payload.split_to(body_start);
        Ok(Self {
            header_block,
            body: payload,
        })
    }

    /// Header block bytes, terminator included.
    #[inline]
    pub fn header_block(&self) -> &[u8] {
        &self.header_block
    }

    /// Body bytes.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Request method, e.g. `GET`. `None` if the start line has no space.
    pub fn method(&self) -> Option<&[u8]> {
        let line = self.start_line();
        let end = line.iter().position(|&b| b == b' ')?;
        Some(&line[..end]).filter(|m| !m.is_empty())
    }

    /// Request path: the second token of the start line.
    pub fn path(&self) -> Option<&[u8]> {
        self.start_line()
            .split(|&b| b == b' ')
            .nth(1)
            .filter(|p| !p.is_empty())
    }

    /// Response status code, e.g. `200` for `HTTP/1.1 200 OK`.
    ///
    /// Same position as [`Payload::path`] on a request line.
    #[inline]
    pub fn status(&self) -> Option<&[u8]> {
        self.path()
    }

    /// Value of the first header called `name` (ASCII case-insensitive).
    ///
    /// Spaces around the value are trimmed. A header present with no value
    /// returns `Some(b"")`. Only the header block is searched.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::Bytes;
    /// use replay_middleware::protocol::Payload;
    ///
    /// let payload = Payload::parse(Bytes::from_static(
    ///     b"POST /post HTTP/1.1\r\ncontent-length: 7\r\n\r\na=1&b=2",
    /// ))
    /// .unwrap();
    /// assert_eq!(payload.header("Content-Length"), Some(&b"7"[..]));
    /// assert_eq!(payload.header("Host"), None);
    /// ```
    pub fn header<N: AsRef<[u8]>>(&self, name: N) -> Option<&[u8]> {
        let name = name.as_ref();
        self.header_lines().find_map(|line| {
            let colon = line.iter().position(|&b| b == b':')?;
            if line[..colon].eq_ignore_ascii_case(name) {
                Some(trim_spaces(&line[colon + 1..]))
            } else {
                None
            }
        })
    }

    /// Request or status line, without its terminator.
    fn start_line(&self) -> &[u8] {
        self.lines().next().unwrap_or_default()
    }

    /// Header lines after the start line. Bare `\n` also ends a line.
    fn header_lines(&self) -> impl Iterator<Item = &[u8]> {
        self.lines().skip(1).take_while(|line| !line.is_empty())
    }

    fn lines(&self) -> impl Iterator<Item = &[u8]> {
        self.header_block()
            .split(|&b| b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
    }

    /// Total length (header block + body).
    #[inline]
    pub fn len(&self) -> usize {
        self.header_block.len() + self.body.len()
    }

    /// True if both header block and body are empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the body, keeping the header block.
    pub fn with_body(self, body: impl Into<Bytes>) -> Self {
        Self {
            header_block: self.header_block,
            body: body.into(),
        }
    }

    /// Replace the header block, keeping the body.
    pub fn with_header_block(self, header_block: impl Into<Bytes>) -> Self {
        Self {
            header_block: header_block.into(),
            body: self.body,
        }
    }

    /// Consume into `(header_block, body)`.
    pub fn into_parts(self) -> (Bytes, Bytes) {
        (self.header_block, self.body)
    }
}

fn trim_spaces(mut value: &[u8]) -> &[u8] {
    while let [b' ', rest @ ..] = value {
        value = rest;
    }
    while let [rest @ .., b' '] = value {
        value = rest;
    }
    value
}
