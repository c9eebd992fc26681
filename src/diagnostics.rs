//! Diagnostic side channel.
//!
//! Each processed line produces a short sequence of [`Diagnostic`] records,
//! in this order:
//!
//! 1. `Separator`
//! 2. `MessageType` or `UnknownMessageType` (once the envelope is split)
//! 3. `OriginalLine`
//! 4. `Decoded` (once the line is valid hex)
//! 5. `Encoded` (once output is produced)
//! 6. `Failed` (only for lines that produce no output)
//!
//! Records go to a [`DiagnosticSink`], never to the data channel.
//!
//! # Important
//!
//! - **stdout** is the data channel: only re-encoded lines
//! - **stderr** carries diagnostics and logs

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::Level;

use crate::error::Result;
use crate::filter::LineState;
use crate::protocol::MessageType;

/// A single diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Start of a new line's records.
    Separator,
    /// Resolved message type.
    MessageType {
        /// Resolved type.
        kind: MessageType,
    },
    /// Metadata token did not resolve; framing continues.
    UnknownMessageType {
        /// Error description.
        error: String,
    },
    /// The raw input line (terminators stripped).
    OriginalLine {
        /// Line text (lossy UTF-8).
        line: String,
    },
    /// The decoded envelope.
    Decoded {
        /// Decoded bytes (lossy UTF-8).
        text: String,
    },
    /// The re-encoded output line.
    Encoded {
        /// Hex text written to the data channel.
        line: String,
    },
    /// The line produced no output.
    Failed {
        /// State the line failed in.
        state: LineState,
        /// Error description.
        error: String,
    },
}

impl Diagnostic {
    /// Build a `Decoded` record from raw bytes.
    pub fn decoded(bytes: &[u8]) -> Self {
        Diagnostic::Decoded {
            text: String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Log level used by [`TracingSink`].
    ///
    /// The separator and the type line share a level.
    pub fn level(&self) -> Level {
        match self {
            Diagnostic::Separator | Diagnostic::MessageType { .. } => Level::INFO,
            Diagnostic::UnknownMessageType { .. } | Diagnostic::Failed { .. } => Level::WARN,
            Diagnostic::OriginalLine { .. }
            | Diagnostic::Decoded { .. }
            | Diagnostic::Encoded { .. } => Level::DEBUG,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Separator => f.write_str("==================================="),
            Diagnostic::MessageType { kind } => write!(f, "Request type: {}", kind),
            Diagnostic::UnknownMessageType { error } => write!(f, "Request type: {}", error),
            Diagnostic::OriginalLine { line } => write!(f, "Original data: {}", line),
            Diagnostic::Decoded { text } => write!(f, "Decoded request: {}", text),
            Diagnostic::Encoded { line } => write!(f, "Encoded data: {}", line),
            Diagnostic::Failed { state, error } => {
                write!(f, "Line failed while {}: {}", state, error)
            }
        }
    }
}

/// Write-only sink for diagnostic records.
pub trait DiagnosticSink: Send + Sync {
    /// Record a single diagnostic.
    fn record(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn record(&self, diagnostic: Diagnostic) {
        (**self).record(diagnostic)
    }
}

/// Forwards records as `tracing` events on the `replay_middleware::diagnostics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        let level = diagnostic.level();
        if level == Level::WARN {
            tracing::warn!("{}", diagnostic);
        } else if level == Level::INFO {
            tracing::info!("{}", diagnostic);
        } else {
            tracing::debug!("{}", diagnostic);
        }
    }
}

/// Captures records in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far.
    pub fn records(&self) -> Vec<Diagnostic> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Remove and return all records.
    pub fn take(&self) -> Vec<Diagnostic> {
        match self.records.lock() {
            Ok(mut records) => std::mem::take(&mut *records),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, diagnostic: Diagnostic) {
        match self.records.lock() {
            Ok(mut records) => records.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}

/// Writes one JSON object per record to a writer (stderr in practice).
pub struct JsonSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonSink<W> {
    /// Create a sink over the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Serialize and write one record followed by `\n`.
    pub fn write_record(&self, diagnostic: &Diagnostic) -> Result<()> {
        let json = serde_json::to_string(diagnostic)?;
        let mut writer = match self.writer.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> DiagnosticSink for JsonSink<W> {
    fn record(&self, diagnostic: Diagnostic) {
        // Write failures are logged, never propagated to the data channel
        if let Err(e) = self.write_record(&diagnostic) {
            tracing::error!("Failed to write diagnostic: {}", e);
        }
    }
}
