//! OpenAI Chat Completions adapter for both language model collaborators

use crate::error::{ScoutError, ScoutResult};
use crate::extraction::PlayExtractor;
use crate::report::{ReportView, ReportWriter};
use async_trait::async_trait;
use gs_common::ScoutConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("greenseam-scout/", env!("CARGO_PKG_VERSION"));

const PARSE_SYSTEM_PROMPT: &str = r#"You are a baseball log parser.
Return ONLY a JSON object:
{ "plays":[
  { "name":"John Adams",
    "result":"Single|Double|Triple|HomeRun|GroundOut|FlyOut|LineOut|Strikeout|Walk|HBP",
    "battedBall":"Ground|Line|Fly|Popup|None" }
]}
One element per plate appearance, no aggregation. Must be valid JSON."#;

const SCOUT_SYSTEM_PROMPT: &str = r##"You are Greenseam AI, a data-driven scout.
For each hitter JSON entry:
  • If pa ≥ 15 AND any outcome posterior ≥ 40 %, output
        #<Name>
        Pitching Strategy:
            • <ONE ≤15-word exploit bullet>
  • Else output "#<Name> – no confident exploit."
Sort by pa descending. Separate hitters with "⸻".
Begin now."##;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Chat Completions client serving as play extractor and report writer
pub struct OpenAiClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    extract_model: String,
    report_model: String,
    extract_temperature: f32,
    report_temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Build from resolved config. Fails without an API key.
    pub fn new(config: &ScoutConfig) -> ScoutResult<Self> {
        let api_key = config.require_api_key()?.to_string();

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ScoutError::Collaborator(format!("HTTP client setup failed: {}", e)))?;

        let endpoint = format!(
            "{}/chat/completions",
            config.api_base_url.trim_end_matches('/')
        );
        info!(
            endpoint = %endpoint,
            extract_model = %config.extract_model,
            report_model = %config.report_model,
            "OpenAI client ready"
        );

        Ok(Self {
            http_client,
            endpoint,
            api_key,
            extract_model: config.extract_model.clone(),
            report_model: config.report_model.clone(),
            extract_temperature: config.extract_temperature,
            report_temperature: config.report_temperature,
            max_tokens: config.extraction_max_tokens,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn complete(&self, request: &ChatRequest<'_>) -> ScoutResult<String> {
        debug!(model = request.model, "Chat completion request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ScoutError::Collaborator(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ScoutError::Collaborator(format!(
                "API error {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::Collaborator(format!("unexpected response body: {}", e)))?;

        first_choice_content(body)
    }
}

fn first_choice_content(body: ChatResponse) -> ScoutResult<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ScoutError::Collaborator("response has no message content".to_string()))
}

#[async_trait]
impl PlayExtractor for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn extract(&self, window: &str) -> ScoutResult<String> {
        let request = ChatRequest {
            model: &self.extract_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: PARSE_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: window,
                },
            ],
            temperature: self.extract_temperature,
            max_tokens: Some(self.max_tokens),
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        };
        self.complete(&request).await
    }
}

#[async_trait]
impl ReportWriter for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn write_report(&self, view: &ReportView) -> ScoutResult<String> {
        let payload = view.to_json();
        let request = ChatRequest {
            model: &self.report_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SCOUT_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &payload,
                },
            ],
            temperature: self.report_temperature,
            max_tokens: None,
            response_format: None,
        };
        let prose = self.complete(&request).await?;
        Ok(prose.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: Option<&str>) -> ScoutConfig {
        let mut config = ScoutConfig::default();
        config.api_key = key.map(str::to_string);
        config.api_base_url = "http://localhost:9/v1/".to_string();
        config
    }

    #[test]
    fn test_scout_prompt_keeps_report_markers() {
        assert!(SCOUT_SYSTEM_PROMPT.contains("#<Name>"));
        assert!(SCOUT_SYSTEM_PROMPT.contains("\"#<Name> – no confident exploit.\""));
        assert!(SCOUT_SYSTEM_PROMPT.contains("⸻"));
        assert!(SCOUT_SYSTEM_PROMPT.ends_with("Begin now."));
    }

    #[test]
    fn test_parse_prompt_lists_every_result() {
        for result in ["Single", "HomeRun", "Strikeout", "HBP"] {
            assert!(PARSE_SYSTEM_PROMPT.contains(result));
        }
    }

    #[test]
    fn test_requires_api_key() {
        assert!(OpenAiClient::new(&config_with_key(None)).is_err());
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = OpenAiClient::new(&config_with_key(Some("sk-test"))).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/v1/chat/completions");
    }

    #[test]
    fn test_extraction_request_shape() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "log",
            }],
            temperature: 0.0,
            max_tokens: Some(2048),
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["max_tokens"], 2048);
        assert_eq!(json["messages"][0]["content"], "log");
    }

    #[test]
    fn test_report_request_omits_unset_fields() {
        let request = ChatRequest {
            model: "m",
            messages: vec![],
            temperature: 0.3,
            max_tokens: None,
            response_format: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_first_choice_content() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"plays\":[]}"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_content(body).unwrap(), r#"{"plays":[]}"#);

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(first_choice_content(empty).is_err());
    }
}
