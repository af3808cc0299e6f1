use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChatError;
use crate::message::{ChatMessage, ChatRole};

/// Produces the model's reply to `message` given the earlier `history`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn generate(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ChatConfig {
    pub const DEFAULT_MODEL: &'static str = "gemini-3-flash-preview";
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

// ============================================================================
// generateContent wire types
// ============================================================================

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn content<'a>(
    role: ChatRole,
    text: &'a str,
) -> Content<'a> {
    Content {
        role: Some(role.as_str()),
        parts: vec![Part { text }],
    }
}

/// The conversation must open with a user turn, so leading model turns
/// (the greeting) are not sent.
fn build_request<'a>(
    system: &'a str,
    history: &'a [ChatMessage],
    message: &'a str,
) -> GenerateRequest<'a> {
    let mut contents: Vec<Content<'a>> = history
        .iter()
        .skip_while(|m| m.role == ChatRole::Model)
        .map(|m| content(m.role, &m.text))
        .collect();
    contents.push(content(ChatRole::User, message));

    GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part { text: system }],
        },
        contents,
    }
}

/// Concatenated text of the first candidate. Empty if the model said nothing.
fn reply_text(body: &str) -> Result<String, ChatError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| ChatError::Parse(e.to_string()))?;

    Ok(response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

/// Client for the Gemini `models/{model}:generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl GeminiClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        if config.api_key.trim().is_empty() {
            return Err(ChatError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    async fn generate(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError> {
        let request = build_request(system, history, message);
        debug!(model = %self.config.model, turns = request.contents.len(), "chat request");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::Status {
                code: status.as_u16(),
                body,
            });
        }

        reply_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn request_skips_greeting_and_appends_message() {
        let history = vec![
            ChatMessage::model("Hello!"),
            ChatMessage::user("Do you fit sash windows?"),
            ChatMessage::model("Yes, our Heritage Sash range."),
        ];

        let request = build_request("persona", &history, "How much?");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "systemInstruction": { "parts": [{ "text": "persona" }] },
                "contents": [
                    { "role": "user", "parts": [{ "text": "Do you fit sash windows?" }] },
                    { "role": "model", "parts": [{ "text": "Yes, our Heritage Sash range." }] },
                    { "role": "user", "parts": [{ "text": "How much?" }] },
                ]
            })
        );
    }

    #[test]
    fn reply_joins_parts_of_first_candidate() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"From "},{"text":"£600."}]}}]}"#;

        assert_eq!(reply_text(body).unwrap(), "From £600.");
    }

    #[test]
    fn reply_without_candidates_is_empty() {
        assert_eq!(reply_text(r#"{"candidates":[]}"#).unwrap(), "");
        assert_eq!(reply_text("{}").unwrap(), "");
    }

    #[test]
    fn malformed_reply_is_parse_error() {
        assert!(matches!(reply_text("not json"), Err(ChatError::Parse(_))));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        assert!(matches!(
            GeminiClient::new(ChatConfig::new("  ")),
            Err(ChatError::MissingApiKey)
        ));
    }

    #[test]
    fn endpoint_includes_model() {
        let mut config = ChatConfig::new("key");
        config.base_url = "http://localhost:9000/v1beta/".to_string();
        let client = GeminiClient::new(config).unwrap();

        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }
}
