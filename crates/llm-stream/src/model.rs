use std::fmt;

/// How a provider splits its response body into payload frames.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Framing {
    /// Server-Sent-Events lines carrying a `data: ` prefix.
    ServerSentEvents,
    /// One JSON document per line, no prefix.
    NewlineDelimitedJson,
}

/// Provider variant selected once per session.
///
/// The variant carries every per-provider difference (framing, sentinel,
/// payload schema, termination rule) so the session pipeline stays the same
/// for all of them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// OpenAI-style chat completion chunks (DeepSeek, OpenRouter).
    ChatCompletion,
    /// Fill-in-the-middle text completion chunks.
    FimCompletion,
    /// Ollama `/api/chat` NDJSON messages.
    Ollama,
}

impl StreamKind {
    /// Returns the framing convention used by this provider.
    pub fn framing(self) -> Framing {
        match self {
            Self::ChatCompletion | Self::FimCompletion => Framing::ServerSentEvents,
            Self::Ollama => Framing::NewlineDelimitedJson,
        }
    }

    /// Returns the literal line that closes the stream, if the provider sends one.
    pub fn sentinel(self) -> Option<&'static str> {
        match self.framing() {
            Framing::ServerSentEvents => Some("data: [DONE]"),
            Framing::NewlineDelimitedJson => None,
        }
    }

    /// Returns the stable log name for this variant.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChatCompletion => "chat_completion",
            Self::FimCompletion => "fim_completion",
            Self::Ollama => "ollama",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
