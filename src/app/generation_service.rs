use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{CodeGenerationRequest, GenerationError};
use crate::infra::llm::CodeGenerator;

const TASK_PREVIEW_CHARS: usize = 120;

#[derive(Clone)]
pub struct CodeGenerationService {
    generator: Arc<dyn CodeGenerator>,
    log_task_preview: bool,
}

impl CodeGenerationService {
    pub fn new<G>(generator: G) -> Self
    where
        G: CodeGenerator + 'static,
    {
        Self::from_shared(Arc::new(generator))
    }

    pub fn from_shared(generator: Arc<dyn CodeGenerator>) -> Self {
        Self {
            generator,
            log_task_preview: false,
        }
    }

    /// Includes a truncated task preview in the submission log line.
    pub fn with_task_preview_logging(mut self, enabled: bool) -> Self {
        self.log_task_preview = enabled;
        self
    }

    pub fn generator_id(&self) -> &str {
        self.generator.generator_id()
    }

    /// Runs one blocking call against the configured generator.
    pub fn generate(&self, request: &CodeGenerationRequest) -> Result<String, GenerationError> {
        request.validate()?;
        self.log_submission(request);

        let code = self.generator.generate(request)?;
        debug!(
            generator = self.generator_id(),
            code_chars = code.chars().count(),
            "code generation finished"
        );
        Ok(code)
    }

    fn log_submission(&self, request: &CodeGenerationRequest) {
        let task_chars = request.task.chars().count();
        if self.log_task_preview {
            info!(
                generator = self.generator_id(),
                language = %request.language,
                task_chars,
                task_preview = ?task_preview(&request.task, TASK_PREVIEW_CHARS),
                "submitting code generation request"
            );
        } else {
            info!(
                generator = self.generator_id(),
                language = %request.language,
                task_chars,
                "submitting code generation request"
            );
        }
    }
}

pub(crate) fn task_preview(task: &str, max_chars: usize) -> String {
    let mut chars = task.chars();
    let mut preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        preview.push_str("...");
    }
    preview
}
