use serde::Deserialize;

use crate::delta::{NormalizedDelta, Usage};

use super::{Decoded, non_empty};

#[derive(Debug, Deserialize)]
struct OllamaChunk {
    model: Option<String>,
    created_at: Option<String>,
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    done_reason: Option<String>,
    prompt_eval_count: Option<u64>,
    eval_count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaMessage {
    role: Option<String>,
    content: Option<String>,
    thinking: Option<String>,
}

/// Decodes one NDJSON line.
///
/// `done == true` with empty content ends the stream without emitting a
/// delta, so a final chunk that carries only `done_reason` and counters is
/// not delivered. A `done` line that still has content is delivered; the
/// caller observes termination on the following read.
pub(super) fn decode(payload: &str) -> Result<Decoded, serde_json::Error> {
    let chunk: OllamaChunk = serde_json::from_str(payload)?;
    let message = chunk.message.unwrap_or_default();
    let content = message.content.unwrap_or_default();
    if chunk.done && content.is_empty() {
        return Ok(Decoded::Done);
    }

    Ok(Decoded::Delta(NormalizedDelta {
        model: chunk.model.unwrap_or_default(),
        created: chunk
            .created_at
            .as_deref()
            .map(unix_seconds)
            .unwrap_or_default(),
        role: message.role,
        content,
        reasoning: non_empty(message.thinking),
        finish_reason: chunk.done_reason.unwrap_or_default(),
        usage: usage_from_counters(chunk.prompt_eval_count, chunk.eval_count),
        ..NormalizedDelta::default()
    }))
}

fn unix_seconds(created_at: &str) -> i64 {
    match chrono::DateTime::parse_from_rfc3339(created_at) {
        Ok(ts) => ts.timestamp(),
        Err(err) => {
            tracing::debug!(created_at, error = %err, "unparseable ollama created_at");
            0
        }
    }
}

fn usage_from_counters(prompt: Option<u64>, completion: Option<u64>) -> Usage {
    if prompt.is_none() && completion.is_none() {
        return Usage::default();
    }
    let prompt_tokens = prompt.unwrap_or_default();
    let completion_tokens = completion.unwrap_or_default();
    Usage {
        prompt_tokens,
        completion_tokens,
        total_tokens: prompt_tokens.saturating_add(completion_tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(decoded: Decoded) -> NormalizedDelta {
        match decoded {
            Decoded::Delta(delta) => delta,
            Decoded::Done => panic!("expected a delta"),
        }
    }

    #[test]
    fn intermediate_message_maps_to_delta() {
        let out = delta(
            decode(
                r#"{"model":"llama3","created_at":"2024-01-01T00:00:00Z",
                   "message":{"role":"assistant","content":"Hel"},"done":false}"#,
            )
            .expect("decode"),
        );
        assert_eq!(out.model, "llama3");
        assert_eq!(out.created, 1_704_067_200);
        assert_eq!(out.role.as_deref(), Some("assistant"));
        assert_eq!(out.content, "Hel");
        assert_eq!(out.index, 0);
        assert_eq!(out.finish_reason, "");
        assert!(out.usage.is_zero());
    }

    #[test]
    fn done_with_empty_content_terminates_without_delta() {
        let out = decode(
            r#"{"model":"llama3","message":{"role":"assistant","content":""},
               "done":true,"done_reason":"stop","prompt_eval_count":12,"eval_count":30}"#,
        )
        .expect("decode");
        // The finish metadata on this frame is dropped.
        assert_eq!(out, Decoded::Done);
    }

    #[test]
    fn done_with_content_is_delivered_with_counters() {
        let out = delta(
            decode(
                r#"{"message":{"role":"assistant","content":"bye"},"done":true,
                   "done_reason":"stop","prompt_eval_count":12,"eval_count":30}"#,
            )
            .expect("decode"),
        );
        assert_eq!(out.content, "bye");
        assert_eq!(out.finish_reason, "stop");
        assert_eq!(
            out.usage,
            Usage {
                prompt_tokens: 12,
                completion_tokens: 30,
                total_tokens: 42,
            }
        );
    }

    #[test]
    fn thinking_becomes_reasoning() {
        let out = delta(
            decode(r#"{"message":{"role":"assistant","content":"","thinking":"hmm"},"done":false}"#)
                .expect("decode"),
        );
        assert_eq!(out.reasoning.as_deref(), Some("hmm"));
        assert_eq!(out.content, "");
    }

    #[test]
    fn bad_timestamp_is_not_fatal() {
        let out = delta(
            decode(r#"{"created_at":"yesterday","message":{"content":"x"}}"#).expect("decode"),
        );
        assert_eq!(out.created, 0);
    }

    #[test]
    fn huge_counters_saturate_instead_of_overflowing() {
        let out = delta(
            decode(
                r#"{"message":{"content":"x"},"prompt_eval_count":18446744073709551615,"eval_count":1}"#,
            )
            .expect("decode"),
        );
        assert_eq!(out.usage.prompt_tokens, u64::MAX);
        assert_eq!(out.usage.completion_tokens, 1);
        assert_eq!(out.usage.total_tokens, u64::MAX);
    }
}
