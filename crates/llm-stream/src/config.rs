use std::time::Duration;

use crate::model::StreamKind;

/// Default upper bound for a single buffered frame.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

/// Default Ollama endpoint used by the liveness probe.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Configuration for one `StreamSession`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Provider variant that decides framing, sentinel and payload schema.
    pub kind: StreamKind,
    /// Maximum bytes buffered for a single frame before the session fails.
    pub max_frame_bytes: usize,
}

impl StreamConfig {
    /// Creates a config for the given provider with default limits.
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    /// Overrides the per-frame buffer limit.
    pub fn max_frame_bytes(mut self, limit: usize) -> Self {
        self.max_frame_bytes = limit;
        self
    }
}

impl From<StreamKind> for StreamConfig {
    fn from(kind: StreamKind) -> Self {
        Self::new(kind)
    }
}

/// Configuration for the local-backend liveness probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Base URL of the local backend.
    pub base_url: String,
    /// Timeout for the probe request.
    pub timeout: Duration,
}

impl ProbeConfig {
    /// Creates a probe config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(2),
        }
    }

    /// Builds a config from `OLLAMA_HOST`, falling back to the default local URL.
    pub fn from_env() -> Self {
        let host = std::env::var("OLLAMA_HOST").unwrap_or_default();
        if host.trim().is_empty() {
            return Self::new(DEFAULT_OLLAMA_URL);
        }
        Self::new(normalize_host(host.trim()))
    }

    /// Overrides the probe timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url.trim_end_matches('/'))
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_URL)
    }
}

// OLLAMA_HOST is commonly set as `host:port` without a scheme.
fn normalize_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
