mod code_request;
mod errors;

pub use code_request::{CodeGenerationRequest, TargetLanguage, UnknownLanguageError, is_blank_task};
pub use errors::{GENERATION_FAILURE_FALLBACK, GENERATION_FAILURE_PREFIX, GenerationError};
