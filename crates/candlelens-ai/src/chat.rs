//! Chat-completion wire envelope
//!
//! All three providers accept the OpenAI-style request schema, so one
//! payload type covers the outbound side. Replies come back in two known
//! shapes (`choices[0].message.content` for OpenAI/DeepSeek,
//! `output.text` for Aliyun DashScope); `ProviderReply` models them as a
//! tagged union with an unrecognized fallthrough instead of inspecting
//! raw maps.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{AnalysisError, AnalysisRequest, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Outbound chat-completion payload
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    /// Assemble the payload: system then user message, plus whichever
    /// sampling options the caller supplied. The two options are
    /// independent; either can appear without the other.
    pub fn build(
        request: &AnalysisRequest,
        model: impl Into<String>,
        system_prompt: String,
        user_message: String,
    ) -> Self {
        let options = request.options.as_ref();
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_message),
            ],
            temperature: options.and_then(|o| o.temperature),
            max_tokens: options.and_then(|o| o.max_tokens),
        }
    }
}

/// The two reply shapes we know how to read, plus a fallthrough for
/// anything else
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProviderReply {
    Chat { choices: Vec<ChatChoice> },
    DashScope { output: DashScopeOutput },
    Other(Value),
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct DashScopeOutput {
    pub text: String,
}

/// Pull the generated analysis text out of a raw provider reply.
///
/// Shape-matches only; the caller does not need to know which provider
/// answered. An absent or null body and an unreadable shape are reported
/// separately, the latter with the body embedded for diagnosis.
pub fn extract_analysis(body: Option<Value>) -> Result<String> {
    let body = match body {
        None | Some(Value::Null) => return Err(AnalysisError::EmptyResponse),
        Some(body) => body,
    };

    let unparsable = || AnalysisError::UnparsableResponse {
        body: body.to_string(),
    };

    let reply: ProviderReply =
        serde_json::from_value(body.clone()).map_err(|_| unparsable())?;

    match reply {
        ProviderReply::Chat { choices } => choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(unparsable),
        ProviderReply::DashScope { output } => Ok(output.text),
        ProviderReply::Other(_) => Err(unparsable()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisOptions, PricePeriod};
    use serde_json::json;

    fn request(options: Option<AnalysisOptions>) -> AnalysisRequest {
        AnalysisRequest {
            provider: "openai".to_string(),
            data: vec![PricePeriod {
                open: 10.0,
                high: 12.0,
                low: 9.0,
                close: 11.0,
                volume: 1000.0,
            }],
            i18n: "en".to_string(),
            model_type: None,
            analysis_type: None,
            message: None,
            options,
        }
    }

    #[test]
    fn payload_orders_system_before_user() {
        let payload = ChatCompletionRequest::build(
            &request(None),
            "gpt-3.5-turbo",
            "system text".to_string(),
            "user text".to_string(),
        );
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "system text");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "user text");
        // Unset sampling options never reach the wire
        assert!(value.get("temperature").is_none());
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn sampling_options_are_independent() {
        let only_temperature = ChatCompletionRequest::build(
            &request(Some(AnalysisOptions {
                temperature: Some(0.7),
                max_tokens: None,
            })),
            "m",
            String::new(),
            String::new(),
        );
        let value = serde_json::to_value(&only_temperature).unwrap();
        assert_eq!(value["temperature"], 0.7);
        assert!(value.get("max_tokens").is_none());

        let only_max_tokens = ChatCompletionRequest::build(
            &request(Some(AnalysisOptions {
                temperature: None,
                max_tokens: Some(256),
            })),
            "m",
            String::new(),
            String::new(),
        );
        let value = serde_json::to_value(&only_max_tokens).unwrap();
        assert!(value.get("temperature").is_none());
        assert_eq!(value["max_tokens"], 256);
    }

    #[test]
    fn extracts_chat_shape() {
        let body = json!({"choices": [{"message": {"content": "X"}}]});
        assert_eq!(extract_analysis(Some(body)).unwrap(), "X");
    }

    #[test]
    fn extracts_dashscope_shape() {
        let body = json!({"output": {"text": "Y"}});
        assert_eq!(extract_analysis(Some(body)).unwrap(), "Y");
    }

    #[test]
    fn chat_shape_wins_when_both_are_present() {
        let body = json!({
            "choices": [{"message": {"content": "from choices"}}],
            "output": {"text": "from output"}
        });
        assert_eq!(extract_analysis(Some(body)).unwrap(), "from choices");
    }

    #[test]
    fn missing_body_is_empty_response() {
        assert!(matches!(
            extract_analysis(None),
            Err(AnalysisError::EmptyResponse)
        ));
        assert!(matches!(
            extract_analysis(Some(Value::Null)),
            Err(AnalysisError::EmptyResponse)
        ));
    }

    #[test]
    fn unknown_shape_embeds_the_body() {
        let err = extract_analysis(Some(json!({"status": "ok"}))).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unable to parse AI response"));
        assert!(message.contains("status"));

        assert!(matches!(
            extract_analysis(Some(json!({}))),
            Err(AnalysisError::UnparsableResponse { .. })
        ));
    }

    #[test]
    fn empty_choices_are_unparsable() {
        let err = extract_analysis(Some(json!({"choices": []}))).unwrap_err();
        assert!(matches!(err, AnalysisError::UnparsableResponse { .. }));
    }
}
