//! Line I/O for the data channel.
//!
//! # Important
//!
//! - **stdout**: re-encoded exchanges only (one hex line each)
//! - **stderr**: diagnostics and logs (never parsed by the proxy)
//! - **Never use `println!`**: it may add `\r\n` on Windows

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Write a line followed by a single `\n`, then flush.
///
/// The proxy waits for complete lines, so every line is flushed
/// immediately.
///
/// # Errors
///
/// Returns IO error if write or flush fails.
pub async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Read the next line into `buf`, without its `\n` / `\r\n` terminator.
///
/// Returns `Ok(false)` at end of stream. A final line without a terminator
/// is still returned.
pub async fn read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<bool> {
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(false);
    }
    let trimmed = strip_line_terminator(buf).len();
    buf.truncate(trimmed);
    Ok(true)
}

/// Strip trailing `\r` and `\n` characters.
pub fn strip_line_terminator(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b'\n' && b != b'\r')
        .map_or(0, |pos| pos + 1);
    &line[..end]
}
