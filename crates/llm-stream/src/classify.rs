use crate::model::{Framing, StreamKind};

const SSE_DATA_PREFIX: &str = "data: ";

/// Classification of one raw line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Frame<'a> {
    /// Blank lines, comments, and lines outside the provider's data convention.
    Noise,
    /// Literal stream-closing marker.
    Sentinel,
    /// Prefix-stripped payload text for the decoder.
    Payload(&'a str),
}

/// Classifies a raw line for the given provider.
///
/// The sentinel is matched as an exact string after trimming, never as a
/// pattern.
pub(crate) fn classify(kind: StreamKind, raw: &str) -> Frame<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return Frame::Noise;
    }
    if kind.sentinel() == Some(line) {
        return Frame::Sentinel;
    }
    match kind.framing() {
        Framing::ServerSentEvents => match line.strip_prefix(SSE_DATA_PREFIX) {
            Some(payload) if !payload.is_empty() => Frame::Payload(payload),
            _ => Frame::Noise,
        },
        Framing::NewlineDelimitedJson => Frame::Payload(line),
    }
}
