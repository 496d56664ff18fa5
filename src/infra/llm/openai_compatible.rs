use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::{CodeGenerationRequest, GenerationError};

use super::env::{read_backend_timeout, read_env_var, read_non_empty_env_var};
use super::response_parsing::{extract_code_payload, truncate_message};
use super::{CodeGenerator, CodePrompt};

const GENERATOR_ID: &str = "openai_compatible";
const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "gemma3:4b";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_MAX_TOKENS: u32 = 2048;

const ENV_API_KEY: &str = "CODESMITH_OPENAI_COMPAT_API_KEY";
const ENV_API_KEY_FALLBACK: &str = "OPENAI_API_KEY";
const ENV_BASE_URL: &str = "CODESMITH_OPENAI_COMPAT_BASE_URL";
const ENV_MODEL: &str = "CODESMITH_OPENAI_COMPAT_MODEL";
const ENV_TIMEOUT_SECS: &str = "CODESMITH_OPENAI_COMPAT_TIMEOUT_SECS";

/// Chat-completions backend for local or hosted OpenAI-compatible servers
/// (Ollama, llama.cpp, LM Studio, vLLM, ...).
pub struct OpenAiCompatibleGenerator {
    api_key: Option<String>,
    api_base_url: String,
    model: String,
    client: Client,
}

impl OpenAiCompatibleGenerator {
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = match read_non_empty_env_var(ENV_API_KEY)? {
            Some(key) => Some(key),
            None => read_non_empty_env_var(ENV_API_KEY_FALLBACK)?,
        };
        let api_base_url =
            read_env_var(ENV_BASE_URL)?.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = read_non_empty_env_var(ENV_MODEL)?.unwrap_or_else(|| DEFAULT_MODEL.into());
        let timeout = read_backend_timeout(ENV_TIMEOUT_SECS, DEFAULT_TIMEOUT)?;

        Self::with_config(api_key, api_base_url, model, timeout)
    }

    pub fn with_config(
        api_key: Option<String>,
        api_base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let api_key = api_key.filter(|key| !key.trim().is_empty());

        let api_base_url = api_base_url.into();
        if api_base_url.trim().is_empty() {
            return Err(GenerationError::validation(
                "OpenAI-compatible API base URL must not be empty",
            ));
        }

        let model = model.into();
        let model = model.trim();
        if model.is_empty() {
            return Err(GenerationError::validation(
                "OpenAI-compatible model must not be empty",
            ));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            GenerationError::internal(format!(
                "failed to create OpenAI-compatible HTTP client: {err}"
            ))
        })?;

        Ok(Self {
            api_key,
            api_base_url: api_base_url.trim().to_string(),
            model: model.to_string(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn endpoint_url(&self) -> String {
        build_v1_url(&self.api_base_url, "chat/completions")
    }

    fn build_request_payload(&self, request: &CodeGenerationRequest) -> OpenAiChatCompletionsRequest {
        let prompt = CodePrompt::build(request);

        OpenAiChatCompletionsRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAiChatMessageRequest {
                    role: "system".to_string(),
                    content: prompt.system,
                },
                OpenAiChatMessageRequest {
                    role: "user".to_string(),
                    content: prompt.user,
                },
            ],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: false,
        }
    }

    fn map_success_response(&self, response_body: &str) -> Result<String, GenerationError> {
        let response: OpenAiChatCompletionsResponse =
            serde_json::from_str(response_body).map_err(|err| {
                GenerationError::invalid_response(format!(
                    "OpenAI-compatible response decode failed: {err}"
                ))
            })?;

        let response_text = response
            .choices
            .iter()
            .find_map(OpenAiChoice::extract_text)
            .ok_or_else(|| {
                GenerationError::invalid_response(
                    "OpenAI-compatible response did not include text content",
                )
            })?;

        extract_code_payload(&response_text).ok_or_else(|| {
            GenerationError::invalid_response("OpenAI-compatible response did not include code")
        })
    }
}

impl CodeGenerator for OpenAiCompatibleGenerator {
    fn generator_id(&self) -> &str {
        GENERATOR_ID
    }

    fn generate(&self, request: &CodeGenerationRequest) -> Result<String, GenerationError> {
        let payload = self.build_request_payload(request);
        let started = Instant::now();

        let mut http_request = self
            .client
            .post(self.endpoint_url())
            .header("content-type", "application/json")
            .json(&payload);
        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request.send().map_err(map_transport_error)?;
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
            "received chat completion"
        );
        self.map_success_response(&response_body)
    }
}

#[derive(Debug, Serialize)]
struct OpenAiChatCompletionsRequest {
    model: String,
    messages: Vec<OpenAiChatMessageRequest>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiChatMessageRequest {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    #[serde(default)]
    message: Option<OpenAiChoiceMessage>,
    #[serde(default)]
    text: Option<String>,
}

impl OpenAiChoice {
    fn extract_text(&self) -> Option<String> {
        if let Some(text) = self.text.as_deref().filter(|text| !text.trim().is_empty()) {
            return Some(text.to_string());
        }

        let content = self.message.as_ref()?.content.as_ref()?;
        extract_message_content(content)
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    #[serde(default)]
    error: Option<OpenAiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

fn extract_message_content(content: &Value) -> Option<String> {
    let text = match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(extract_content_part_text)
            .collect::<String>(),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

fn extract_content_part_text(part: &Value) -> Option<String> {
    match part {
        Value::String(text) => Some(text.to_string()),
        Value::Object(map) => map
            .get("text")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        _ => None,
    }
}

fn map_http_error(status: StatusCode, body: &str) -> GenerationError {
    let parsed_error = serde_json::from_str::<OpenAiErrorEnvelope>(body).ok();
    let detail = parsed_error
        .as_ref()
        .and_then(|envelope| envelope.error.as_ref());
    let error_type = detail.and_then(|detail| detail.error_type.as_deref());
    let error_code = detail.and_then(|detail| detail.code.as_deref());

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || matches!(error_type, Some("authentication_error"))
        || matches!(
            error_code,
            Some("invalid_api_key" | "invalid_authentication")
        )
    {
        return GenerationError::Auth;
    }

    if status == StatusCode::TOO_MANY_REQUESTS
        || matches!(error_type, Some("rate_limit_error" | "insufficient_quota"))
        || matches!(
            error_code,
            Some("rate_limit_exceeded" | "insufficient_quota")
        )
    {
        return GenerationError::RateLimited;
    }

    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::GATEWAY_TIMEOUT
        || matches!(error_type, Some("timeout" | "server_timeout"))
        || matches!(error_code, Some("request_timeout"))
    {
        return GenerationError::Timeout;
    }

    let message = detail
        .map(|detail| detail.message.clone())
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| truncate_message(body));

    GenerationError::Transport {
        message: format!("OpenAI-compatible API returned HTTP {status}: {message}"),
    }
}

fn map_transport_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        return GenerationError::Timeout;
    }

    GenerationError::Transport {
        message: format!("OpenAI-compatible transport error: {error}"),
    }
}

fn build_v1_url(api_base_url: &str, endpoint_path: &str) -> String {
    let base = api_base_url.trim_end_matches('/');
    let endpoint_path = endpoint_path.trim_start_matches('/');

    if base.ends_with("/v1") {
        format!("{base}/{endpoint_path}")
    } else {
        format!("{base}/v1/{endpoint_path}")
    }
}
