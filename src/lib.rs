//! # replay-middleware
//!
//! Line filter for traffic-replay middleware.
//!
//! A replaying proxy pipes every intercepted request, original response and
//! replayed response through this process as one hex-encoded line each. The
//! filter decodes the line, splits it into metadata, HTTP header block and
//! body, hands the result to a [`Middleware`](handler::Middleware), and writes
//! the re-encoded exchange back.
//!
//! ## Channels
//!
//! - **stdin**: hex lines from the proxy
//! - **stdout**: hex lines back to the proxy (data only)
//! - **stderr**: diagnostics and logs
//!
//! ## Example
//!
//! ```ignore
//! use replay_middleware::Filter;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> replay_middleware::Result<()> {
//!     let stats = Filter::builder().build().run_stdio().await?;
//!     eprintln!("{} lines", stats.lines);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod handler;
pub mod io;
pub mod protocol;

pub use error::{MiddlewareError, Result};
pub use filter::{ErrorPolicy, Filter, FilterBuilder, LineState, RunStats};
pub use handler::{Identity, Middleware, Router};
