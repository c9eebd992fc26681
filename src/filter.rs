//! Filter builder and pipeline driver.
//!
//! The [`FilterBuilder`] configures the middleware, the diagnostic sink and
//! the error policy. The [`Filter`] drives each line through:
//! 1. Strip line terminators
//! 2. Hex-decode the envelope
//! 3. Split metadata from payload
//! 4. Resolve the message type (diagnostic only)
//! 5. Split header block from body
//! 6. Run the middleware and reassemble
//! 7. Hex-encode and emit
//!
//! Lines are independent: nothing is carried from one line to the next.
//!
//! # Example
//!
//! ```
//! use replay_middleware::Filter;
//!
//! let filter = Filter::builder().build();
//! // "1 reqid\nheader: a\r\n\r\nbody"
//! let line = "31207265716964\
//!             0a\
//!             6865616465723a20610d0a0d0a\
//!             626f6479";
//! let output = filter.process_line(line).unwrap();
//! assert_eq!(output.as_deref(), Some(line));
//! ```

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};

use crate::codec::HexCodec;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::Result;
use crate::handler::{Identity, Middleware};
use crate::io::{read_line, strip_line_terminator, write_line};
use crate::protocol::{split_envelope, Exchange};

/// Per-line processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineState {
    /// Waiting for the next input line.
    AwaitingLine,
    /// Hex-decoding the line.
    Decoding,
    /// Splitting metadata from payload.
    Splitting,
    /// Locating the header boundary and running the middleware.
    Framing,
    /// Encoding and writing the output line.
    Emitting,
    /// Output written (or deliberately dropped by the middleware).
    Emitted,
    /// Line produced no output because of an error.
    Failed,
}

impl LineState {
    /// Lowercase state name.
    pub fn as_str(self) -> &'static str {
        match self {
            LineState::AwaitingLine => "awaiting line",
            LineState::Decoding => "decoding",
            LineState::Splitting => "splitting",
            LineState::Framing => "framing",
            LineState::Emitting => "emitting",
            LineState::Emitted => "emitted",
            LineState::Failed => "failed",
        }
    }
}

impl fmt::Display for LineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when a line fails to decode or frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Log the failure, write nothing for the line, continue with the next line.
    #[default]
    Skip,
    /// Stop the run and return the error.
    Abort,
}

/// Counters for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Lines read.
    pub lines: u64,
    /// Output lines written.
    pub emitted: u64,
    /// Lines the middleware chose not to forward.
    pub dropped: u64,
    /// Lines that failed (skipped under `ErrorPolicy::Skip`).
    pub failed: u64,
}

/// Builder for configuring and creating a [`Filter`].
pub struct FilterBuilder {
    middleware: Box<dyn Middleware>,
    sink: Arc<dyn DiagnosticSink>,
    error_policy: ErrorPolicy,
}

impl FilterBuilder {
    /// Create a builder with identity middleware, tracing diagnostics and `Skip` policy.
    pub fn new() -> Self {
        Self {
            middleware: Box::new(Identity),
            sink: Arc::new(TracingSink),
            error_policy: ErrorPolicy::default(),
        }
    }

    /// Set the middleware applied to every framed exchange.
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware = Box::new(middleware);
        self
    }

    /// Set the diagnostic sink.
    pub fn sink<S: DiagnosticSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Set the per-line error policy.
    ///
    /// Default: `ErrorPolicy::Skip`
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Build the filter.
    pub fn build(self) -> Filter {
        Filter {
            middleware: self.middleware,
            sink: self.sink,
            error_policy: self.error_policy,
        }
    }
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Records gathered while processing one line, emitted in a fixed order.
#[derive(Default)]
struct LineRecords {
    message_type: Option<Diagnostic>,
    decoded: Option<Diagnostic>,
    encoded: Option<Diagnostic>,
}

/// The line filter.
pub struct Filter {
    middleware: Box<dyn Middleware>,
    sink: Arc<dyn DiagnosticSink>,
    error_policy: ErrorPolicy,
}

impl Filter {
    /// Create a new filter builder.
    pub fn builder() -> FilterBuilder {
        FilterBuilder::new()
    }

    /// The configured error policy.
    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    /// Process one input line.
    ///
    /// Returns `Ok(Some(hex))` for the output line (without terminator),
    /// `Ok(None)` if the middleware dropped the exchange.
    ///
    /// # Errors
    ///
    /// Returns `MiddlewareError::Line` wrapping the stage error
    /// (`Decode`, `MalformedEnvelope` or `HeaderBoundaryNotFound`).
    /// An unknown message type is recorded but never fails the line.
    pub fn process_line<L: AsRef<[u8]>>(&self, raw: L) -> Result<Option<String>> {
        let line = strip_line_terminator(raw.as_ref());
        let mut records = LineRecords::default();
        let mut state = LineState::AwaitingLine;

        let result = self.frame_line(line, &mut state, &mut records);
        let original = String::from_utf8_lossy(line).into_owned();

        self.sink.record(Diagnostic::Separator);
        if let Some(record) = records.message_type {
            self.sink.record(record);
        }
        self.sink.record(Diagnostic::OriginalLine {
            line: original.clone(),
        });
        if let Some(record) = records.decoded {
            self.sink.record(record);
        }
        if let Some(record) = records.encoded {
            self.sink.record(record);
        }

        match result {
            Ok(output) => {
                tracing::trace!("Line {}", LineState::Emitted);
                Ok(output)
            }
            Err(e) => {
                self.sink.record(Diagnostic::Failed {
                    state,
                    error: e.to_string(),
                });
                tracing::trace!("Line {} while {}", LineState::Failed, state);
                Err(e.at_line(original))
            }
        }
    }

    /// Decode, split, frame and re-encode one line.
    ///
    /// `state` is left at the stage that failed.
    fn frame_line(
        &self,
        line: &[u8],
        state: &mut LineState,
        records: &mut LineRecords,
    ) -> Result<Option<String>> {
        *state = LineState::Decoding;
        let decoded = Bytes::from(HexCodec::decode(line)?);
        records.decoded = Some(Diagnostic::decoded(&decoded));

        *state = LineState::Splitting;
        let (metadata, payload) = split_envelope(decoded)?;

        records.message_type = Some(match metadata.message_type() {
            Ok(kind) => Diagnostic::MessageType { kind },
            Err(e) => Diagnostic::UnknownMessageType {
                error: e.to_string(),
            },
        });

        *state = LineState::Framing;
        let exchange = Exchange::frame(metadata, payload)?;
        let exchange = match self.middleware.handle(exchange) {
            Some(exchange) => exchange,
            None => {
                *state = LineState::Emitted;
                return Ok(None);
            }
        };

        *state = LineState::Emitting;
        let encoded = HexCodec::encode(exchange.to_bytes());
        records.encoded = Some(Diagnostic::Encoded {
            line: encoded.clone(),
        });

        *state = LineState::Emitted;
        Ok(Some(encoded))
    }

    /// Run the filter over a line stream until end of stream.
    ///
    /// Every output line is written with a single `\n` and flushed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading or writing fails, or the first
    /// per-line error under `ErrorPolicy::Abort`.
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> Result<RunStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut stats = RunStats::default();
        let mut buf = Vec::with_capacity(64 * 1024);

        while read_line(&mut reader, &mut buf).await? {
            stats.lines += 1;

            match self.process_line(&buf) {
                Ok(Some(output)) => {
                    write_line(&mut writer, &output).await?;
                    stats.emitted += 1;
                }
                Ok(None) => {
                    tracing::debug!("Middleware dropped line {}", stats.lines);
                    stats.dropped += 1;
                }
                Err(e) => {
                    stats.failed += 1;
                    match self.error_policy {
                        ErrorPolicy::Skip => {
                            tracing::warn!("Skipping line {}: {}", stats.lines, e);
                        }
                        ErrorPolicy::Abort => {
                            tracing::error!("Aborting at line {}: {}", stats.lines, e);
                            return Err(e);
                        }
                    }
                }
            }
        }

        tracing::debug!(
            "Input closed after {} lines ({} emitted, {} dropped, {} failed)",
            stats.lines,
            stats.emitted,
            stats.dropped,
            stats.failed
        );
        Ok(stats)
    }

    /// Run the filter on the process's stdin and stdout.
    pub async fn run_stdio(&self) -> Result<RunStats> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.run(stdin, stdout).await
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("error_policy", &self.error_policy)
            .finish_non_exhaustive()
    }
}
