use std::io;
use std::sync::Arc;

use crate::model::StreamKind;

/// Errors returned while pulling deltas from a `StreamSession`.
///
/// `EndOfStream` is not a failure: it marks graceful completion and is the
/// only variant for which `is_fatal()` returns `false`. Callers should treat
/// every other variant as stream-ending and proceed to `close()`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StreamError {
    /// The underlying byte stream failed mid-read.
    #[error("stream read error ({kind}): {source}")]
    Read {
        kind: StreamKind,
        #[source]
        source: Arc<io::Error>,
    },
    /// A payload frame could not be parsed with the provider schema.
    #[error("decode error ({kind}): {source}, raw data: {raw}")]
    Decode {
        kind: StreamKind,
        raw: String,
        #[source]
        source: Arc<serde_json::Error>,
    },
    /// The stream completed normally.
    #[error("end of stream")]
    EndOfStream,
    /// Releasing the response body failed during `close()`.
    #[error("failed to release response body: {source}")]
    Release {
        #[source]
        source: Arc<io::Error>,
    },
    /// The session was aborted while a read was pending.
    #[error("stream cancelled")]
    Cancelled,
    /// A single frame grew past the configured limit without a line terminator.
    #[error("frame exceeds {limit} bytes ({kind})")]
    FrameTooLarge { kind: StreamKind, limit: usize },
    /// `recv` was called after `close`.
    #[error("session closed")]
    SessionClosed,
}

impl StreamError {
    pub(crate) fn read(kind: StreamKind, source: io::Error) -> Self {
        Self::Read {
            kind,
            source: Arc::new(source),
        }
    }

    pub(crate) fn decode(kind: StreamKind, raw: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            kind,
            raw: raw.to_string(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn release(source: io::Error) -> Self {
        Self::Release {
            source: Arc::new(source),
        }
    }

    /// Returns `true` for the graceful completion marker.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }

    /// Returns `true` when the session cannot produce further deltas because
    /// of a failure (every variant except `EndOfStream`).
    pub fn is_fatal(&self) -> bool {
        !self.is_end_of_stream()
    }

    /// Returns the offending payload text for decode failures.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            Self::Decode { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
