mod anthropic;
pub(crate) mod env;
mod openai_compatible;
mod prompt;
mod provider;
mod response_parsing;

pub use anthropic::AnthropicGenerator;
pub use openai_compatible::OpenAiCompatibleGenerator;
pub use prompt::CodePrompt;
pub use provider::CodeGenerator;
