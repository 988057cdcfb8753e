//! OpenAI-compatible chat-completions transport.
//!
//! Ollama serves the same `/v1/chat/completions` route, so both providers share this client;
//! only OpenAI requires a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use supportdesk_core::config::LlmConfig;
use tracing::debug;

use crate::llm::{CompletionClient, CompletionError, CompletionRequest};

pub struct OpenAiCompletionClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiCompletionClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, CompletionError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| CompletionError::BackendUnavailable(error.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.effective_base_url().to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Result<HeaderMap, CompletionError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
                .map_err(|_| {
                    CompletionError::BackendUnavailable("invalid api key format".to_string())
                })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Value, CompletionError> {
        let url = self.endpoint();
        debug!(
            event_name = "llm.request.sent",
            model = %request.model,
            schema = %request.schema.name,
            "sending structured completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .headers(self.headers()?)
            .json(&request_body(&request))
            .send()
            .await
            .map_err(|error| CompletionError::BackendUnavailable(transport_reason(&error)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| CompletionError::BackendUnavailable(transport_reason(&error)))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        parse_completion(&body)
    }
}

pub(crate) fn request_body(request: &CompletionRequest) -> Value {
    json!({
        "model": request.model,
        "messages": request.messages,
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": request.schema.name,
                "schema": request.schema.schema,
            }
        }
    })
}

pub(crate) fn parse_completion(body: &str) -> Result<Value, CompletionError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|error| CompletionError::Schema(format!("malformed completion body: {error}")))?;

    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| CompletionError::Schema("completion returned no choices".to_string()))?;

    if let Some(refusal) = message.refusal.filter(|refusal| !refusal.trim().is_empty()) {
        return Err(CompletionError::Schema(format!("model refused: {refusal}")));
    }

    let content = message
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| CompletionError::Schema("completion content was empty".to_string()))?;

    serde_json::from_str(&content)
        .map_err(|error| CompletionError::Schema(format!("content is not JSON: {error}")))
}

fn status_error(status: StatusCode, body: &str) -> CompletionError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        // The backend could not honour the requested response format.
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            CompletionError::Schema(format!("{}: {detail}", status.as_u16()))
        }
        _ => CompletionError::BackendUnavailable(format!("{}: {detail}", status.as_u16())),
    }
}

fn transport_reason(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {error}")
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    }
}
