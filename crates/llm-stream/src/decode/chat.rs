use serde::Deserialize;

use crate::delta::{NormalizedDelta, Usage};

use super::non_empty;

#[derive(Debug, Deserialize)]
struct ChatChunk {
    id: Option<String>,
    created: Option<i64>,
    model: Option<String>,
    choices: Option<Vec<ChatChoice>>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    index: Option<u32>,
    delta: Option<ChatDelta>,
    finish_reason: Option<String>,
    logprobs: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatDelta {
    role: Option<String>,
    content: Option<String>,
    // DeepSeek name.
    reasoning_content: Option<String>,
    // OpenRouter name.
    reasoning: Option<String>,
}

pub(super) fn decode(payload: &str) -> Result<NormalizedDelta, serde_json::Error> {
    let chunk: ChatChunk = serde_json::from_str(payload)?;
    let mut choices = chunk.choices.unwrap_or_default().into_iter();
    let choice = choices.next();
    let extra = choices.count();
    if extra > 0 {
        tracing::warn!(extra, "chat chunk carries additional choices; using the first");
    }

    let mut out = NormalizedDelta {
        id: chunk.id.unwrap_or_default(),
        model: chunk.model.unwrap_or_default(),
        created: chunk.created.unwrap_or_default(),
        usage: chunk.usage.unwrap_or_default(),
        ..NormalizedDelta::default()
    };
    if let Some(choice) = choice {
        let delta = choice.delta.unwrap_or_default();
        out.index = choice.index.unwrap_or_default();
        out.role = delta.role;
        out.content = delta.content.unwrap_or_default();
        out.reasoning = non_empty(delta.reasoning_content).or(non_empty(delta.reasoning));
        out.finish_reason = choice.finish_reason.unwrap_or_default();
        out.logprobs = choice.logprobs;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_envelope_and_first_choice() {
        let delta = decode(
            r#"{"id":"chat-1","object":"chat.completion.chunk","created":1700000000,
               "model":"deepseek-chat",
               "choices":[{"index":0,"delta":{"role":"assistant","content":"Hi"},
                           "finish_reason":null,"logprobs":null}]}"#,
        )
        .expect("decode");
        assert_eq!(delta.id, "chat-1");
        assert_eq!(delta.model, "deepseek-chat");
        assert_eq!(delta.created, 1_700_000_000);
        assert_eq!(delta.role.as_deref(), Some("assistant"));
        assert_eq!(delta.content, "Hi");
        assert_eq!(delta.finish_reason, "");
        assert_eq!(delta.reasoning, None);
        assert_eq!(delta.logprobs, None);
        assert!(delta.usage.is_zero());
    }

    #[test]
    fn null_content_during_reasoning_phase_defaults_to_empty() {
        let delta = decode(
            r#"{"choices":[{"index":0,"delta":{"content":null,"reasoning_content":"step 1"}}]}"#,
        )
        .expect("decode");
        assert_eq!(delta.content, "");
        assert_eq!(delta.reasoning.as_deref(), Some("step 1"));
        assert_eq!(delta.role, None);
    }

    #[test]
    fn empty_reasoning_content_falls_back_to_openrouter_field() {
        let delta = decode(
            r#"{"choices":[{"delta":{"content":"","reasoning_content":"","reasoning":"r"}}]}"#,
        )
        .expect("decode");
        assert_eq!(delta.reasoning.as_deref(), Some("r"));
    }

    #[test]
    fn terminal_chunk_carries_usage_and_finish_reason() {
        let delta = decode(
            r#"{"choices":[{"index":0,"delta":{"content":""},"finish_reason":"stop"}],
               "usage":{"prompt_tokens":10,"completion_tokens":20,"total_tokens":30}}"#,
        )
        .expect("decode");
        assert!(delta.is_finished());
        assert_eq!(
            delta.usage,
            Usage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            }
        );
    }

    #[test]
    fn usage_only_chunk_without_choices_still_decodes() {
        let delta = decode(
            r#"{"choices":[],"usage":{"prompt_tokens":1,"completion_tokens":2,"total_tokens":3}}"#,
        )
        .expect("decode");
        assert_eq!(delta.index, 0);
        assert_eq!(delta.content, "");
        assert_eq!(delta.usage.total_tokens, 3);
    }

    #[test]
    fn logprobs_pass_through_untouched() {
        let delta = decode(
            r#"{"choices":[{"delta":{"content":"a"},"logprobs":{"content":[{"token":"a","logprob":-0.1}]}}]}"#,
        )
        .expect("decode");
        assert_eq!(
            delta.logprobs,
            Some(serde_json::json!({"content":[{"token":"a","logprob":-0.1}]}))
        );
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(decode("[DONE]").is_err());
        assert!(decode("42").is_err());
    }

    #[test]
    fn extra_choices_are_dropped_in_favor_of_the_first() {
        let delta = decode(
            r#"{"choices":[{"index":0,"delta":{"content":"first"}},
                           {"index":1,"delta":{"content":"second"}}]}"#,
        )
        .expect("decode");
        assert_eq!(delta.index, 0);
        assert_eq!(delta.content, "first");
    }

    #[test]
    fn null_usage_counts_read_as_zero() {
        let delta = decode(
            r#"{"choices":[],"usage":{"prompt_tokens":null,"completion_tokens":2,"total_tokens":null}}"#,
        )
        .expect("decode");
        assert_eq!(
            delta.usage,
            Usage {
                prompt_tokens: 0,
                completion_tokens: 2,
                total_tokens: 0,
            }
        );
    }
}
