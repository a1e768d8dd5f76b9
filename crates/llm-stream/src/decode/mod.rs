//! Provider payload schemas and their mapping into `NormalizedDelta`.
//!
//! Each submodule owns one wire schema. The only per-provider termination
//! quirk (Ollama's `done` flag) lives in its decoder and surfaces here as
//! `Decoded::Done`.
mod chat;
mod fim;
mod ollama;

use crate::delta::NormalizedDelta;
use crate::errors::StreamError;
use crate::model::StreamKind;

/// Outcome of decoding one payload frame.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Decoded {
    /// Deliver this delta to the caller.
    Delta(NormalizedDelta),
    /// The provider's payload itself marks the end of the stream.
    Done,
}

/// Decodes a prefix-stripped payload with the schema of `kind`.
///
/// A malformed payload yields `StreamError::Decode` carrying the raw text.
pub(crate) fn decode(kind: StreamKind, payload: &str) -> Result<Decoded, StreamError> {
    let decoded = match kind {
        StreamKind::ChatCompletion => chat::decode(payload).map(Decoded::Delta),
        StreamKind::FimCompletion => fim::decode(payload).map(Decoded::Delta),
        StreamKind::Ollama => ollama::decode(payload),
    };
    decoded.map_err(|source| StreamError::decode(kind, payload, source))
}

/// Treats an empty reasoning fragment the same as an absent one.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
