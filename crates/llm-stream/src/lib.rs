//! Incremental normalizer for streamed text-generation responses.
//!
//! A `StreamSession` takes the body of an already-accepted streaming HTTP
//! response and turns it into `NormalizedDelta` values, whatever the
//! provider's wire format:
//!
//! - `StreamKind::ChatCompletion`: SSE `data: ` lines ending with
//!   `data: [DONE]` (DeepSeek and OpenRouter style, `reasoning_content` or
//!   `reasoning`).
//! - `StreamKind::FimCompletion`: the same framing with fill-in-the-middle
//!   `choices[].text` payloads.
//! - `StreamKind::Ollama`: newline-delimited JSON that ends with a `done`
//!   message.
//!
//! ```no_run
//! use llm_stream::prelude::*;
//!
//! # async fn run(response: reqwest::Response) -> Result<(), StreamError> {
//! let mut session = StreamSession::open(StreamKind::ChatCompletion, response);
//! let mut text = String::new();
//! loop {
//!     match session.recv().await {
//!         Ok(delta) => text.push_str(&delta.content),
//!         Err(StreamError::EndOfStream) => break,
//!         Err(err) => {
//!             let _ = session.close().await;
//!             return Err(err);
//!         }
//!     }
//! }
//! let usage = session.usage();
//! session.close().await?;
//! println!("{text} ({} tokens)", usage.total_tokens);
//! # Ok(())
//! # }
//! ```

/// Response body seam and adapters.
pub mod body;
mod classify;
/// Session and probe configuration.
pub mod config;
mod decode;
/// Unified delta, usage, and aggregation types.
pub mod delta;
/// Public error type.
pub mod errors;
mod framer;
/// Provider variants and framing conventions.
pub mod model;
/// Common imports for typical usage.
pub mod prelude;
pub mod probe;
/// Stream session lifecycle and cancellation.
pub mod session;

pub use body::{ByteStreamBody, ResponseBody};
pub use config::{ProbeConfig, StreamConfig};
pub use delta::{DeltaAccumulator, NormalizedDelta, StreamSummary, Usage};
pub use errors::StreamError;
pub use model::{Framing, StreamKind};
pub use session::{AbortHandle, StreamSession};
