use serde::Deserialize;

use crate::delta::{NormalizedDelta, Usage};

#[derive(Debug, Deserialize)]
struct FimChunk {
    id: Option<String>,
    created: Option<i64>,
    model: Option<String>,
    choices: Option<Vec<FimChoice>>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct FimChoice {
    text: Option<String>,
    index: Option<u32>,
    logprobs: Option<serde_json::Value>,
    // Not always a string on the wire.
    finish_reason: Option<serde_json::Value>,
}

pub(super) fn decode(payload: &str) -> Result<NormalizedDelta, serde_json::Error> {
    let chunk: FimChunk = serde_json::from_str(payload)?;
    let mut out = NormalizedDelta {
        id: chunk.id.unwrap_or_default(),
        model: chunk.model.unwrap_or_default(),
        created: chunk.created.unwrap_or_default(),
        usage: chunk.usage.unwrap_or_default(),
        ..NormalizedDelta::default()
    };
    if let Some(choice) = chunk.choices.unwrap_or_default().into_iter().next() {
        out.index = choice.index.unwrap_or_default();
        out.content = choice.text.unwrap_or_default();
        out.finish_reason = finish_reason_text(choice.finish_reason);
        out.logprobs = choice.logprobs;
    }
    Ok(out)
}

fn finish_reason_text(value: Option<serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(reason)) => reason,
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_field_becomes_content() {
        let delta = decode(
            r#"{"id":"fim-1","object":"text_completion","created":5,"model":"deepseek-chat",
               "choices":[{"text":"fn main","index":0,"finish_reason":null}]}"#,
        )
        .expect("decode");
        assert_eq!(delta.content, "fn main");
        assert_eq!(delta.finish_reason, "");
        assert_eq!(delta.role, None);
        assert_eq!(delta.reasoning, None);
        assert!(delta.usage.is_zero());
    }

    #[test]
    fn finish_reason_renders_any_scalar() {
        assert_eq!(finish_reason_text(Some(serde_json::json!("length"))), "length");
        assert_eq!(finish_reason_text(Some(serde_json::json!(1))), "1");
        assert_eq!(finish_reason_text(Some(serde_json::Value::Null)), "");
        assert_eq!(finish_reason_text(None), "");
    }
}
