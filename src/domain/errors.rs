use thiserror::Error;

pub const GENERATION_FAILURE_PREFIX: &str = "Error generating code: ";
pub const GENERATION_FAILURE_FALLBACK: &str =
    "Error generating code: the code generator failed without reporting a reason.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error("provider authentication failed")]
    Auth,
    #[error("provider rate limit reached")]
    RateLimited,
    #[error("provider request timed out")]
    Timeout,
    #[error("provider returned an invalid response: {message}")]
    InvalidResponse { message: String },
    #[error("provider transport failed: {message}")]
    Transport { message: String },
    #[error("{message}")]
    Backend { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
    #[error("code generation failed")]
    Unspecified,
}

impl GenerationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Descriptive text carried by the failure, if any.
    ///
    /// Variants whose message is blank, and `Unspecified`, carry none.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Validation { message }
            | Self::InvalidResponse { message }
            | Self::Transport { message }
            | Self::Backend { message }
            | Self::Internal { message }
                if message.trim().is_empty() =>
            {
                None
            }
            Self::Unspecified => None,
            other => Some(other.to_string()),
        }
    }

    /// The message shown in place of generated code. Never empty.
    pub fn failure_message(&self) -> String {
        match self.detail() {
            Some(detail) => format!("{GENERATION_FAILURE_PREFIX}{detail}"),
            None => GENERATION_FAILURE_FALLBACK.to_string(),
        }
    }
}
