use std::sync::Arc;

use futures::{Stream, stream};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::body::ResponseBody;
use crate::classify::{Frame, classify};
use crate::config::StreamConfig;
use crate::decode::{Decoded, decode};
use crate::delta::{DeltaAccumulator, NormalizedDelta, StreamSummary, Usage};
use crate::errors::StreamError;
use crate::framer::LineFramer;
use crate::model::StreamKind;

/// Handle used to cancel a session's in-flight read.
///
/// Create one up front and pass it to `StreamSession::with_config` to tie the
/// session to an outer cancellation scope, or take a clone from
/// `StreamSession::abort_handle`.
#[derive(Clone, Debug)]
pub struct AbortHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Requests cancellation.
    ///
    /// A `recv` blocked on the body returns `StreamError::Cancelled`; later
    /// calls see the session as finished.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` once `abort` has been called.
    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for AbortHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
    Open,
    // Terminal signal or fatal error seen; body not yet released.
    Finished,
    Closed,
}

/// One open streaming exchange.
///
/// Pull deltas with `recv` until it returns `StreamError::EndOfStream` (or any
/// other error), then call `close`. Deltas arrive in the order their frames
/// were read. `recv` is not meant to be driven from several tasks at once;
/// independent sessions share nothing and may run in parallel.
pub struct StreamSession {
    session_id: uuid::Uuid,
    config: StreamConfig,
    body: Option<Box<dyn ResponseBody>>,
    framer: LineFramer,
    abort: AbortHandle,
    abort_rx: watch::Receiver<bool>,
    state: SessionState,
    body_ended: bool,
    last_usage: Usage,
}

impl StreamSession {
    /// Opens a session over `body` with default limits and a fresh abort handle.
    pub fn open(kind: StreamKind, body: impl ResponseBody + 'static) -> Self {
        Self::with_config(StreamConfig::new(kind), body, AbortHandle::new())
    }

    /// Opens a session with explicit configuration and a caller-owned abort handle.
    pub fn with_config(
        config: StreamConfig,
        body: impl ResponseBody + 'static,
        abort: AbortHandle,
    ) -> Self {
        let session_id = uuid::Uuid::new_v4();
        debug!(session_id = %session_id, kind = %config.kind, "stream session opened");
        Self {
            session_id,
            abort_rx: abort.subscribe(),
            config,
            body: Some(Box::new(body)),
            framer: LineFramer::default(),
            abort,
            state: SessionState::Open,
            body_ended: false,
            last_usage: Usage::default(),
        }
    }

    /// Returns the id used to correlate this session in logs.
    pub fn session_id(&self) -> uuid::Uuid {
        self.session_id
    }

    /// Returns the provider variant of this session.
    pub fn kind(&self) -> StreamKind {
        self.config.kind
    }

    /// Returns a handle that can cancel a pending `recv`.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Returns the last non-zero usage reported by the provider.
    ///
    /// Some providers attach real counts only to the terminal delta, so this
    /// stays zero until that delta has been received.
    pub fn usage(&self) -> Usage {
        self.last_usage
    }

    /// Waits for the next normalized delta.
    ///
    /// Returns `StreamError::EndOfStream` on the provider's sentinel, on its
    /// done flag, or when the body ends, and on every call after that. Any
    /// other error is fatal for the session; the caller still has to `close`.
    pub async fn recv(&mut self) -> Result<NormalizedDelta, StreamError> {
        match self.state {
            SessionState::Closed => return Err(StreamError::SessionClosed),
            SessionState::Finished => return Err(StreamError::EndOfStream),
            SessionState::Open => {}
        }

        let result = self.pull().await;
        match &result {
            Ok(delta) => {
                if !delta.usage.is_zero() {
                    self.last_usage = delta.usage;
                }
            }
            Err(StreamError::EndOfStream) => {
                debug!(session_id = %self.session_id, kind = %self.config.kind, "stream finished");
                self.state = SessionState::Finished;
            }
            Err(err) => {
                warn!(session_id = %self.session_id, kind = %self.config.kind, error = %err, "stream failed");
                self.state = SessionState::Finished;
            }
        }
        result
    }

    /// Like `recv`, with graceful completion folded into `Ok(None)`.
    pub async fn next_delta(&mut self) -> Result<Option<NormalizedDelta>, StreamError> {
        match self.recv().await {
            Ok(delta) => Ok(Some(delta)),
            Err(StreamError::EndOfStream) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Cancels any in-flight read, then releases the body.
    ///
    /// The body is released exactly once; closing an already closed session
    /// is a no-op.
    pub async fn close(&mut self) -> Result<(), StreamError> {
        self.abort.abort();
        self.state = SessionState::Closed;
        let Some(mut body) = self.body.take() else {
            debug!(session_id = %self.session_id, "stream session already closed");
            return Ok(());
        };

        let released = body.release().await;
        drop(body);
        match released {
            Ok(()) => {
                debug!(session_id = %self.session_id, "response body released");
                Ok(())
            }
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "failed to release response body");
                Err(StreamError::release(err))
            }
        }
    }

    /// Drains the session, closes it, and returns the folded result.
    pub async fn collect(mut self) -> Result<StreamSummary, StreamError> {
        let mut acc = DeltaAccumulator::new();
        let drained = loop {
            match self.recv().await {
                Ok(delta) => acc.push(&delta),
                Err(StreamError::EndOfStream) => break Ok(()),
                Err(err) => break Err(err),
            }
        };
        let closed = self.close().await;
        drained?;
        closed?;
        Ok(acc.finish())
    }

    /// Converts the session into a `Stream` of deltas.
    ///
    /// The stream ends after `EndOfStream` or after yielding the first error,
    /// and closes the session in both cases.
    pub fn into_stream(self) -> impl Stream<Item = Result<NormalizedDelta, StreamError>> + Send {
        stream::try_unfold(self, |mut session| async move {
            match session.recv().await {
                Ok(delta) => Ok(Some((delta, session))),
                Err(StreamError::EndOfStream) => {
                    session.close().await?;
                    Ok(None)
                }
                Err(err) => {
                    let _ = session.close().await;
                    Err(err)
                }
            }
        })
    }

    async fn pull(&mut self) -> Result<NormalizedDelta, StreamError> {
        let kind = self.config.kind;
        loop {
            let Some(line) = self.next_line().await? else {
                return Err(StreamError::EndOfStream);
            };
            match classify(kind, &line) {
                Frame::Noise => continue,
                Frame::Sentinel => {
                    debug!(session_id = %self.session_id, "stream sentinel received");
                    return Err(StreamError::EndOfStream);
                }
                Frame::Payload(payload) => match decode(kind, payload)? {
                    Decoded::Delta(delta) => return Ok(delta),
                    Decoded::Done => {
                        debug!(session_id = %self.session_id, "provider done flag received");
                        return Err(StreamError::EndOfStream);
                    }
                },
            }
        }
    }

    async fn next_line(&mut self) -> Result<Option<String>, StreamError> {
        let kind = self.config.kind;
        loop {
            if let Some(line) = self.framer.next_line() {
                return self.within_limit(line).map(Some);
            }
            if self.body_ended {
                return Ok(self.framer.finish());
            }
            if self.framer.pending_len() > self.config.max_frame_bytes {
                return Err(self.frame_too_large());
            }
            if *self.abort_rx.borrow_and_update() {
                return Err(StreamError::Cancelled);
            }
            let Some(body) = self.body.as_mut() else {
                return Err(StreamError::SessionClosed);
            };

            // Only `true` is ever sent, so any change means abort.
            let chunk = tokio::select! {
                biased;
                _ = self.abort_rx.changed() => return Err(StreamError::Cancelled),
                chunk = body.next_chunk() => chunk,
            };
            match chunk {
                Some(Ok(bytes)) => {
                    debug!(session_id = %self.session_id, bytes = bytes.len(), "body chunk");
                    self.framer.push_chunk(&bytes);
                }
                Some(Err(err)) => return Err(StreamError::read(kind, err)),
                None => self.body_ended = true,
            }
        }
    }

    fn within_limit(&self, line: String) -> Result<String, StreamError> {
        if line.len() > self.config.max_frame_bytes {
            return Err(self.frame_too_large());
        }
        Ok(line)
    }

    fn frame_too_large(&self) -> StreamError {
        StreamError::FrameTooLarge {
            kind: self.config.kind,
            limit: self.config.max_frame_bytes,
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if self.body.is_some() {
            self.abort.abort();
            debug!(session_id = %self.session_id, "stream session dropped without close");
        }
    }
}
