use crate::domain::{CodeGenerationRequest, GenerationError};

/// The external "generate code" capability.
///
/// Implementations block until the backend answers; callers run them off the
/// UI thread. The returned text is raw source code with no wrapping.
pub trait CodeGenerator: Send + Sync {
    fn generator_id(&self) -> &str;

    fn generate(&self, request: &CodeGenerationRequest) -> Result<String, GenerationError>;
}
