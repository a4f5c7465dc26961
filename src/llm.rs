use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::LlmConfig;
use crate::error::CollaboratorError;
use crate::prompt::system_prompt;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub schema_name: String,
    pub prompt: String,
    pub schema: Value,
}

#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, CollaboratorError>;
}

#[async_trait]
impl<T: Completion + ?Sized> Completion for Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, CollaboratorError> {
        (**self).complete(request).await
    }
}

pub struct Unconfigured;

#[async_trait]
impl Completion for Unconfigured {
    async fn complete(&self, _request: &CompletionRequest) -> Result<Value, CollaboratorError> {
        Err(CollaboratorError::Unavailable(
            "llm not configured: set LLM_API_KEY".to_string(),
        ))
    }
}

pub fn completion_from_env(config: &LlmConfig) -> Result<Arc<dyn Completion>, String> {
    match LlmClient::from_env(config)? {
        Some(client) => {
            tracing::info!(model = client.model(), "llm client configured");
            Ok(Arc::new(client))
        }
        None => {
            tracing::warn!("LLM_API_KEY is not set; generation requests will fail");
            Ok(Arc::new(Unconfigured))
        }
    }
}

#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f64,
}

impl LlmClient {
    pub fn from_env(config: &LlmConfig) -> Result<Option<Self>, String> {
        let api_key = env::var("LLM_API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        match api_key {
            Some(api_key) => LlmClient::new(config, api_key).map(Some),
            None => Ok(None),
        }
    }

    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| format!("failed to build llm client: {}", err))?;
        Ok(Self {
            client,
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Completion for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, CollaboratorError> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = ChatRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: request.schema_name.clone(),
                    schema: request.schema.clone(),
                },
            },
        };

        let started = Instant::now();
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|err| CollaboratorError::Unavailable(format!("llm request failed: {}", err)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(CollaboratorError::Unavailable(format!("llm api error: {}", status)));
            }
            return Err(CollaboratorError::Unavailable(format!(
                "llm api error: {} {}",
                status, detail
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| CollaboratorError::Malformed(format!("llm response parse failed: {}", err)))?;

        if let Some(usage) = body.usage.as_ref() {
            tracing::debug!(
                model = %self.model,
                schema = %request.schema_name,
                latency_ms = started.elapsed().as_millis() as u64,
                prompt_tokens = ?usage.prompt_tokens,
                completion_tokens = ?usage.completion_tokens,
                "llm completion received"
            );
        }

        let content = body
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .ok_or_else(|| CollaboratorError::Malformed("llm response missing content".to_string()))?;

        parse_content(content)
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    schema: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

fn parse_content(content: &str) -> Result<Value, CollaboratorError> {
    let json = extract_json(content)
        .ok_or_else(|| CollaboratorError::Malformed("llm response missing JSON".to_string()))?;
    serde_json::from_str(json)
        .map_err(|err| CollaboratorError::Malformed(format!("llm JSON parse failed: {}", err)))
}

// Models sometimes wrap the payload in prose or a fenced block.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c == '{' || c == '[')?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closer)?;
    if start >= end {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_strips_fences() {
        let text = "```json\n{\"views\": 10}\n```";
        assert_eq!(extract_json(text), Some("{\"views\": 10}"));
    }

    #[test]
    fn extract_json_accepts_arrays() {
        let text = "Here you go: [{\"videoId\": \"a\"}]";
        assert_eq!(extract_json(text), Some("[{\"videoId\": \"a\"}]"));
    }

    #[test]
    fn parse_content_rejects_prose() {
        let err = parse_content("no structured data here").unwrap_err();
        assert!(matches!(err, CollaboratorError::Malformed(_)));
    }

    #[test]
    fn parse_content_rejects_truncated_json() {
        let err = parse_content("{\"views\": 10, \"likes\": }").unwrap_err();
        assert!(matches!(err, CollaboratorError::Malformed(_)));
    }
}
