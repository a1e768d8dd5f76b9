/// Token counts reported by the provider.
///
/// All fields stay zero until the provider reports real counts, which for
/// several providers happens only on the terminal delta.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Usage {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub prompt_tokens: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub completion_tokens: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_tokens: u64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize as _;
    Option::<u64>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Usage {
    /// Returns `true` when no counts have been reported.
    pub fn is_zero(&self) -> bool {
        self.prompt_tokens == 0 && self.completion_tokens == 0 && self.total_tokens == 0
    }
}

/// Backend-agnostic unit produced for every payload frame.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormalizedDelta {
    /// Provider response id, empty when the provider does not send one.
    pub id: String,
    /// Model that produced the frame.
    pub model: String,
    /// Unix timestamp from the envelope, `0` when absent.
    pub created: i64,
    /// Generation (choice) index, `0` when the provider omits it.
    pub index: u32,
    /// Role, usually present only on the first delta of a turn.
    pub role: Option<String>,
    /// Content fragment; empty but never absent.
    pub content: String,
    /// Reasoning fragment, regardless of which field name carried it.
    pub reasoning: Option<String>,
    /// Finish reason; empty until the final delta of a choice.
    pub finish_reason: String,
    /// Raw log-probability payload, passed through untouched.
    pub logprobs: Option<serde_json::Value>,
    /// Usage snapshot for this frame.
    pub usage: Usage,
}

impl NormalizedDelta {
    /// Returns `true` once the choice carries a finish reason.
    pub fn is_finished(&self) -> bool {
        !self.finish_reason.is_empty()
    }
}

/// Result of folding a whole stream.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StreamSummary {
    /// First role reported by the provider.
    pub role: Option<String>,
    /// Concatenated content in arrival order.
    pub content: String,
    /// Concatenated reasoning in arrival order.
    pub reasoning: String,
    /// Last non-empty finish reason.
    pub finish_reason: String,
    /// Last non-zero usage report.
    pub usage: Usage,
    /// Number of deltas folded.
    pub deltas: usize,
}

/// Accumulates deltas by concatenation, in the order they are pushed.
#[derive(Debug, Default)]
pub struct DeltaAccumulator {
    summary: StreamSummary,
}

impl DeltaAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one delta into the running summary.
    pub fn push(&mut self, delta: &NormalizedDelta) {
        let summary = &mut self.summary;
        if summary.role.is_none() {
            summary.role = delta.role.clone();
        }
        summary.content.push_str(&delta.content);
        if let Some(reasoning) = &delta.reasoning {
            summary.reasoning.push_str(reasoning);
        }
        if delta.is_finished() {
            summary.finish_reason = delta.finish_reason.clone();
        }
        if !delta.usage.is_zero() {
            summary.usage = delta.usage;
        }
        summary.deltas += 1;
    }

    /// Returns the summary folded so far.
    pub fn summary(&self) -> &StreamSummary {
        &self.summary
    }

    pub fn finish(self) -> StreamSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(content: &str) -> NormalizedDelta {
        NormalizedDelta {
            content: content.into(),
            ..NormalizedDelta::default()
        }
    }

    #[test]
    fn accumulator_concatenates_in_order_and_keeps_first_role() {
        let mut acc = DeltaAccumulator::new();
        acc.push(&NormalizedDelta {
            role: Some("assistant".into()),
            reasoning: Some("think ".into()),
            ..delta("Hel")
        });
        acc.push(&NormalizedDelta {
            role: Some("tool".into()),
            reasoning: Some("more".into()),
            ..delta("lo")
        });
        let summary = acc.finish();
        assert_eq!(summary.role.as_deref(), Some("assistant"));
        assert_eq!(summary.content, "Hello");
        assert_eq!(summary.reasoning, "think more");
        assert_eq!(summary.deltas, 2);
    }

    #[test]
    fn zero_usage_never_overwrites_reported_usage() {
        let reported = Usage {
            prompt_tokens: 3,
            completion_tokens: 4,
            total_tokens: 7,
        };
        let mut acc = DeltaAccumulator::new();
        acc.push(&NormalizedDelta {
            usage: reported,
            finish_reason: "stop".into(),
            ..delta("")
        });
        acc.push(&delta("tail"));

        let summary = acc.summary();
        assert_eq!(summary.usage, reported);
        assert_eq!(summary.finish_reason, "stop");
    }
}
