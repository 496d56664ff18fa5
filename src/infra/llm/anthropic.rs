use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{CodeGenerationRequest, GenerationError};

use super::env::{read_backend_timeout, read_env_var, read_non_empty_env_var};
use super::response_parsing::{extract_code_payload, truncate_message};
use super::{CodeGenerator, CodePrompt};

const GENERATOR_ID: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_MAX_TOKENS: u32 = 2048;
const DEFAULT_TEMPERATURE: f32 = 0.2;

const ENV_API_KEY: &str = "CODESMITH_ANTHROPIC_API_KEY";
const ENV_API_KEY_FALLBACK: &str = "ANTHROPIC_API_KEY";
const ENV_BASE_URL: &str = "CODESMITH_ANTHROPIC_BASE_URL";
const ENV_MODEL: &str = "CODESMITH_ANTHROPIC_MODEL";
const ENV_TIMEOUT_SECS: &str = "CODESMITH_ANTHROPIC_TIMEOUT_SECS";

pub struct AnthropicGenerator {
    api_key: String,
    api_base_url: String,
    model: String,
    client: Client,
}

impl AnthropicGenerator {
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = read_api_key_from_env()?.ok_or_else(|| {
            GenerationError::validation(
                "Anthropic API key is missing (set CODESMITH_ANTHROPIC_API_KEY or ANTHROPIC_API_KEY)",
            )
        })?;
        let api_base_url =
            read_env_var(ENV_BASE_URL)?.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = read_non_empty_env_var(ENV_MODEL)?.unwrap_or_else(|| DEFAULT_MODEL.into());
        let timeout = read_backend_timeout(ENV_TIMEOUT_SECS, DEFAULT_TIMEOUT)?;

        Self::with_config(api_key, api_base_url, model, timeout)
    }

    pub fn with_config(
        api_key: impl Into<String>,
        api_base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerationError::validation(
                "Anthropic API key must not be empty",
            ));
        }

        let api_base_url = api_base_url.into();
        if api_base_url.trim().is_empty() {
            return Err(GenerationError::validation(
                "Anthropic API base URL must not be empty",
            ));
        }

        let model = model.into();
        let model = model.trim();
        if !model.starts_with("claude-") {
            return Err(GenerationError::validation(format!(
                "model '{model}' is not supported by the Anthropic backend"
            )));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            GenerationError::internal(format!("failed to create Anthropic HTTP client: {err}"))
        })?;

        Ok(Self {
            api_key,
            api_base_url: api_base_url.trim().to_string(),
            model: model.to_string(),
            client,
        })
    }

    /// Whether either Anthropic key variable holds a non-blank value.
    pub fn api_key_configured() -> Result<bool, GenerationError> {
        Ok(read_api_key_from_env()?.is_some())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint_url(&self) -> String {
        format!("{}/v1/messages", self.api_base_url.trim_end_matches('/'))
    }

    fn build_request_payload(&self, request: &CodeGenerationRequest) -> AnthropicMessagesRequest {
        let prompt = CodePrompt::build(request);

        AnthropicMessagesRequest {
            model: self.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            system: prompt.system,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.user,
            }],
        }
    }

    fn map_success_response(&self, response_body: &str) -> Result<String, GenerationError> {
        let response: AnthropicMessagesResponse =
            serde_json::from_str(response_body).map_err(|err| {
                GenerationError::invalid_response(format!("Anthropic response decode failed: {err}"))
            })?;

        let joined_text = response
            .content
            .iter()
            .filter_map(AnthropicContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("");
        if joined_text.trim().is_empty() {
            return Err(GenerationError::invalid_response(
                "Anthropic response did not include a text content block",
            ));
        }

        extract_code_payload(&joined_text).ok_or_else(|| {
            GenerationError::invalid_response("Anthropic response did not include code")
        })
    }
}

impl CodeGenerator for AnthropicGenerator {
    fn generator_id(&self) -> &str {
        GENERATOR_ID
    }

    fn generate(&self, request: &CodeGenerationRequest) -> Result<String, GenerationError> {
        let payload = self.build_request_payload(request);
        let started = Instant::now();

        let response = self
            .client
            .post(self.endpoint_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        let response_body = response.text().map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_http_error(status, &response_body));
        }

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            generator = GENERATOR_ID,
            model = %self.model,
            latency_ms,
            "received Anthropic message"
        );
        self.map_success_response(&response_body)
    }
}

#[derive(Debug, Serialize)]
struct AnthropicMessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicMessagesResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl AnthropicContentBlock {
    fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Other => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorEnvelope {
    #[serde(default)]
    error: Option<AnthropicErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

fn read_api_key_from_env() -> Result<Option<String>, GenerationError> {
    match read_non_empty_env_var(ENV_API_KEY)? {
        Some(key) => Ok(Some(key)),
        None => read_non_empty_env_var(ENV_API_KEY_FALLBACK),
    }
}

fn map_http_error(status: StatusCode, body: &str) -> GenerationError {
    let parsed_error = serde_json::from_str::<AnthropicErrorEnvelope>(body).ok();
    let detail = parsed_error
        .as_ref()
        .and_then(|envelope| envelope.error.as_ref());
    let error_type = detail.map(|detail| detail.error_type.as_str());

    if matches!(
        error_type,
        Some("authentication_error" | "permission_error")
    ) || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
    {
        return GenerationError::Auth;
    }
    if matches!(error_type, Some("rate_limit_error")) || status == StatusCode::TOO_MANY_REQUESTS {
        return GenerationError::RateLimited;
    }
    if matches!(error_type, Some("timeout_error"))
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::GATEWAY_TIMEOUT
    {
        return GenerationError::Timeout;
    }

    let message = detail
        .map(|detail| detail.message.clone())
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| truncate_message(body));
    GenerationError::Transport {
        message: format!("Anthropic API returned HTTP {status}: {message}"),
    }
}

fn map_transport_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        return GenerationError::Timeout;
    }
    GenerationError::Transport {
        message: format!("Anthropic transport error: {error}"),
    }
}
