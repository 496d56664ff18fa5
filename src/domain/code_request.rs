use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::GenerationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    #[default]
    JavaScript,
    TypeScript,
    Python,
    Java,
    #[serde(rename = "c++")]
    Cpp,
    Rust,
    Go,
}

impl TargetLanguage {
    pub const ALL: [Self; 7] = [
        Self::JavaScript,
        Self::TypeScript,
        Self::Python,
        Self::Java,
        Self::Cpp,
        Self::Rust,
        Self::Go,
    ];

    /// Wire value sent to generation backends.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Python => "python",
            Self::Java => "java",
            Self::Cpp => "c++",
            Self::Rust => "rust",
            Self::Go => "go",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Python => "Python",
            Self::Java => "Java",
            Self::Cpp => "C++",
            Self::Rust => "Rust",
            Self::Go => "Go",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language '{0}' (expected one of: javascript, typescript, python, java, c++, rust, go)")]
pub struct UnknownLanguageError(pub String);

impl FromStr for TargetLanguage {
    type Err = UnknownLanguageError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|language| language.as_str() == normalized)
            .ok_or_else(|| UnknownLanguageError(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeGenerationRequest {
    pub task: String,
    pub language: TargetLanguage,
}

impl CodeGenerationRequest {
    pub fn new(task: impl Into<String>, language: TargetLanguage) -> Self {
        Self {
            task: task.into(),
            language,
        }
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if is_blank_task(&self.task) {
            return Err(GenerationError::validation("task must not be empty"));
        }
        Ok(())
    }
}

pub fn is_blank_task(task: &str) -> bool {
    task.trim().is_empty()
}
