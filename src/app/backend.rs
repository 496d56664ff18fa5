use tracing::{debug, info, warn};

use crate::domain::{CodeGenerationRequest, GenerationError};
use crate::infra::llm::env::{read_bool_env, read_non_empty_env_var};
use crate::infra::llm::{AnthropicGenerator, CodeGenerator, OpenAiCompatibleGenerator};

use super::CodeGenerationService;

pub const ENV_BACKEND: &str = "CODESMITH_BACKEND";
pub const ENV_DEBUG_PROMPT_LOG: &str = "CODESMITH_DEBUG_PROMPT_LOG";

const UNCONFIGURED_GENERATOR_ID: &str = "unconfigured";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    OpenAiCompatible,
    Anthropic,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "openai_compatible",
            Self::Anthropic => "anthropic",
        }
    }
}

/// Resolves which generator to build.
///
/// An explicit choice always wins. Without one, Anthropic is used when a key
/// is present and the local OpenAI-compatible server otherwise.
pub fn select_backend_kind(
    explicit: Option<&str>,
    anthropic_key_present: bool,
) -> Result<BackendKind, GenerationError> {
    let Some(explicit) = explicit else {
        return Ok(if anthropic_key_present {
            BackendKind::Anthropic
        } else {
            BackendKind::OpenAiCompatible
        });
    };

    match explicit.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "openai_compatible" | "openai" | "ollama" => Ok(BackendKind::OpenAiCompatible),
        "anthropic" => Ok(BackendKind::Anthropic),
        other => Err(GenerationError::validation(format!(
            "{ENV_BACKEND} has unsupported value '{other}' (expected openai_compatible or anthropic)"
        ))),
    }
}

pub struct CodeGenerationBackend {
    pub service: CodeGenerationService,
    /// Set when the environment could not produce a working generator.
    pub notice: Option<String>,
}

pub fn build_code_generation_backend() -> CodeGenerationBackend {
    let debug_prompt_log = match read_bool_env(ENV_DEBUG_PROMPT_LOG) {
        Ok(enabled) => enabled,
        Err(error) => {
            warn!(error = %error, "ignoring invalid prompt log setting");
            false
        }
    };

    let backend = match build_generator() {
        Ok(generator) => {
            info!(generator = generator.generator_id(), "code generation backend ready");
            CodeGenerationBackend {
                service: CodeGenerationService::from_shared(generator.into()),
                notice: None,
            }
        }
        Err(error) => build_unconfigured_backend(&error),
    };

    CodeGenerationBackend {
        service: backend.service.with_task_preview_logging(debug_prompt_log),
        notice: backend.notice,
    }
}

fn build_generator() -> Result<Box<dyn CodeGenerator>, GenerationError> {
    let explicit = read_non_empty_env_var(ENV_BACKEND)?;
    let anthropic_key_present = AnthropicGenerator::api_key_configured()?;

    let kind = select_backend_kind(explicit.as_deref(), anthropic_key_present)?;
    debug!(backend = kind.as_str(), "selected code generation backend");

    match kind {
        BackendKind::Anthropic => Ok(Box::new(AnthropicGenerator::from_env()?)),
        BackendKind::OpenAiCompatible => Ok(Box::new(OpenAiCompatibleGenerator::from_env()?)),
    }
}

fn build_unconfigured_backend(error: &GenerationError) -> CodeGenerationBackend {
    let notice = format!("Code generation is unavailable: {error}");
    warn!(notice = %notice, "code generation backend is not configured");

    CodeGenerationBackend {
        service: CodeGenerationService::new(UnconfiguredGenerator {
            notice: notice.clone(),
        }),
        notice: Some(notice),
    }
}

/// Fails every request with the configuration notice.
struct UnconfiguredGenerator {
    notice: String,
}

impl CodeGenerator for UnconfiguredGenerator {
    fn generator_id(&self) -> &str {
        UNCONFIGURED_GENERATOR_ID
    }

    fn generate(&self, _request: &CodeGenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::backend(self.notice.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendKind, build_unconfigured_backend, select_backend_kind};
    use crate::domain::{CodeGenerationRequest, GenerationError, TargetLanguage};

    #[test]
    fn select_backend_kind_defaults_on_key_presence() {
        assert_eq!(select_backend_kind(None, true), Ok(BackendKind::Anthropic));
        assert_eq!(
            select_backend_kind(None, false),
            Ok(BackendKind::OpenAiCompatible)
        );
    }

    #[test]
    fn select_backend_kind_prefers_explicit_choice() {
        assert_eq!(
            select_backend_kind(Some("openai-compatible"), true),
            Ok(BackendKind::OpenAiCompatible)
        );
        assert_eq!(
            select_backend_kind(Some(" Anthropic "), false),
            Ok(BackendKind::Anthropic)
        );
        assert_eq!(
            select_backend_kind(Some("ollama"), false),
            Ok(BackendKind::OpenAiCompatible)
        );
    }

    #[test]
    fn select_backend_kind_rejects_unknown_values() {
        let error = select_backend_kind(Some("bard"), false).expect_err("unknown backend");

        assert!(matches!(
            error,
            GenerationError::Validation { message } if message.contains("'bard'")
        ));
    }

    #[test]
    fn unconfigured_backend_fails_requests_with_notice() {
        let backend = build_unconfigured_backend(&GenerationError::validation(
            "Anthropic API key is missing",
        ));

        let notice = backend.notice.clone().expect("notice should be set");
        assert_eq!(
            notice,
            "Code generation is unavailable: validation failed: Anthropic API key is missing"
        );
        assert_eq!(backend.service.generator_id(), "unconfigured");

        let error = backend
            .service
            .generate(&CodeGenerationRequest::new("sort a list", TargetLanguage::Go))
            .expect_err("unconfigured backend should fail");
        assert_eq!(
            error.failure_message(),
            format!("Error generating code: {notice}")
        );
    }
}
