//! Common imports for consuming a stream session.
pub use crate::{
    AbortHandle, NormalizedDelta, ResponseBody, StreamConfig, StreamError, StreamKind,
    StreamSession, StreamSummary, Usage,
};
