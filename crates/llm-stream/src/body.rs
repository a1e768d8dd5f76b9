use std::io;

use bytes::Bytes;
use futures::{Stream, StreamExt as _};

/// Readable body of an already-accepted streaming HTTP response.
///
/// A `StreamSession` owns its body exclusively: nothing else reads from it or
/// releases it.
#[async_trait::async_trait]
pub trait ResponseBody: Send {
    /// Waits for the next chunk of bytes. `None` means graceful end of data.
    async fn next_chunk(&mut self) -> Option<io::Result<Bytes>>;

    /// Releases the underlying resource. Called at most once per session.
    async fn release(&mut self) -> io::Result<()>;
}

#[async_trait::async_trait]
impl ResponseBody for reqwest::Response {
    async fn next_chunk(&mut self) -> Option<io::Result<Bytes>> {
        self.chunk().await.map_err(io::Error::other).transpose()
    }

    // The connection is returned or torn down when the response is dropped,
    // which the session does right after this call.
    async fn release(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Adapts any fallible byte stream (for example `reqwest::Response::bytes_stream`)
/// into a `ResponseBody`.
pub struct ByteStreamBody<S> {
    inner: Option<S>,
}

impl<S> ByteStreamBody<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: Some(stream),
        }
    }
}

#[async_trait::async_trait]
impl<S, E> ResponseBody for ByteStreamBody<S>
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
{
    async fn next_chunk(&mut self) -> Option<io::Result<Bytes>> {
        let inner = self.inner.as_mut()?;
        let chunk = inner.next().await?;
        Some(chunk.map_err(io::Error::other))
    }

    async fn release(&mut self) -> io::Result<()> {
        self.inner = None;
        Ok(())
    }
}
