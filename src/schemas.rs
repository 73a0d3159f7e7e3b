//! # Schemas Module
//!
//! Wire types for the client-facing routes and for the OpenRouter
//! chat-completion protocol.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub const DEFAULT_MAX_TOKENS: u32 = 200;
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

pub const ENHANCE_SYSTEM_PROMPT: &str = "You are a helpful writing assistant. Improve and rewrite text while maintaining the original meaning and language. Be concise and natural.";
pub const QUICK_ACTION_SYSTEM_PROMPT: &str = "You are a helpful writing assistant.";

// =============================================================================
// CLIENT REQUESTS
// =============================================================================

/// Whether a client-supplied field counts as present.
///
/// `null`, `false`, `0`, and `""` are treated as absent. Arrays and objects
/// are present.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A present scalar rendered as message text. Numbers and booleans are
/// rendered the way they appear in JSON.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value.filter(|v| is_present(v))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Body of `POST /enhance`. Fields are optional here; presence is checked by
/// the handler so that a missing prompt maps to the documented 400.
///
/// `max_tokens` is kept as the caller's JSON number and forwarded as-is, so
/// upstream decides what a negative or fractional value means.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EnhanceRequest {
    pub prompt: Option<Value>,
    pub max_tokens: Option<Number>,
    pub temperature: Option<f64>,
}

impl EnhanceRequest {
    /// The prompt as message text, if present.
    pub fn prompt(&self) -> Option<String> {
        scalar_text(self.prompt.as_ref())
    }

    pub fn max_tokens(&self) -> Number {
        self.max_tokens.clone().unwrap_or_else(|| DEFAULT_MAX_TOKENS.into())
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

/// Body of `POST /quick-action`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuickActionRequest {
    pub text: Option<Value>,
    pub action: Option<Value>,
}

impl QuickActionRequest {
    /// The text to transform, if present.
    pub fn text(&self) -> Option<String> {
        scalar_text(self.text.as_ref())
    }

    /// The raw action field, if present. It may still be a non-string.
    pub fn action(&self) -> Option<&Value> {
        self.action.as_ref().filter(|v| is_present(v))
    }
}

// =============================================================================
// UPSTREAM PROTOCOL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// One upstream call: the fixed system message followed by the user message.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: [ChatMessage; 2],
    pub max_tokens: Number,
    pub temperature: f64,
}

impl CompletionRequest {
    pub fn new(
        system: &str,
        user: impl Into<String>,
        max_tokens: impl Into<Number>,
        temperature: f64,
    ) -> Self {
        Self {
            messages: [ChatMessage::system(system), ChatMessage::user(user)],
            max_tokens: max_tokens.into(),
            temperature,
        }
    }

    pub fn user_content(&self) -> &str {
        &self.messages[1].content
    }
}

/// JSON body sent to `{base_url}/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub max_tokens: &'a Number,
    pub temperature: f64,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Trimmed content of the first choice.
    pub fn first_text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(|content| content.trim().to_string())
    }
}

// =============================================================================
// CLIENT RESPONSES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub provider: String,
    pub model: String,
    pub has_api_key: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enhance_defaults() {
        let req: EnhanceRequest = serde_json::from_value(json!({ "prompt": "fix me" })).unwrap();
        assert_eq!(req.prompt().as_deref(), Some("fix me"));
        assert_eq!(req.max_tokens().as_u64(), Some(200));
        assert_eq!(req.temperature(), 0.3);
    }

    #[test]
    fn test_lenient_field_types() {
        let req: EnhanceRequest =
            serde_json::from_value(json!({ "prompt": 123, "max_tokens": -1, "temperature": 0.123456789 }))
                .unwrap();
        assert_eq!(req.prompt().as_deref(), Some("123"));
        assert_eq!(req.max_tokens().as_i64(), Some(-1));
        assert_eq!(req.temperature(), 0.123456789);

        let req: EnhanceRequest = serde_json::from_value(json!({ "max_tokens": 100.5 })).unwrap();
        assert_eq!(req.max_tokens().as_f64(), Some(100.5));

        let req: QuickActionRequest = serde_json::from_value(json!({ "text": "hi", "action": 5 })).unwrap();
        assert_eq!(req.text().as_deref(), Some("hi"));
        assert_eq!(req.action(), Some(&json!(5)));
    }

    #[test]
    fn test_absent_values() {
        for value in [json!(null), json!(false), json!(0), json!("")] {
            assert!(!is_present(&value), "{}", value);
        }
        for value in [json!(true), json!(-1), json!("x"), json!([]), json!({})] {
            assert!(is_present(&value), "{}", value);
        }

        let req: EnhanceRequest = serde_json::from_value(json!({ "prompt": { "nested": true } })).unwrap();
        assert_eq!(req.prompt(), None);
    }

    #[test]
    fn test_empty_prompt_is_missing() {
        let req: EnhanceRequest = serde_json::from_value(json!({ "prompt": "" })).unwrap();
        assert_eq!(req.prompt(), None);
        assert_eq!(EnhanceRequest::default().prompt(), None);
    }

    #[test]
    fn test_upstream_body_shape() {
        let request = CompletionRequest::new("sys", "hello", 50, 0.7);
        let body = ChatCompletionRequest {
            model: "openai/gpt-4o-mini",
            messages: &request.messages,
            max_tokens: &request.max_tokens,
            temperature: request.temperature,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "openai/gpt-4o-mini");
        assert_eq!(value["messages"][0], json!({ "role": "system", "content": "sys" }));
        assert_eq!(value["messages"][1], json!({ "role": "user", "content": "hello" }));
        assert_eq!(value["max_tokens"], 50);
        assert_eq!(value["temperature"], 0.7);
    }

    #[test]
    fn test_first_text_is_trimmed() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Hello world  " } }]
        }))
        .unwrap();
        assert_eq!(resp.first_text().as_deref(), Some("Hello world"));

        let empty: ChatCompletionResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert_eq!(empty.first_text(), None);
    }

    #[test]
    fn test_health_uses_camel_case() {
        let health = HealthResponse {
            status: "ok".to_string(),
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
            provider: "OpenRouter".to_string(),
            model: "m".to_string(),
            has_api_key: false,
        };
        let value = serde_json::to_value(&health).unwrap();
        assert_eq!(value["hasApiKey"], false);
    }
}
