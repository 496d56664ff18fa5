use crate::domain::CodeGenerationRequest;

const SYSTEM_PROMPT: &str = "You are Codesmith's code generation backend. Reply with source code only: no prose, no explanations, no markdown fences.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePrompt {
    pub system: String,
    pub user: String,
}

impl CodePrompt {
    pub fn build(request: &CodeGenerationRequest) -> Self {
        let language = request.language.display_name();
        let user = format!(
            "Write {language} code for the following task.\n\nTask:\n{task}\n\nReturn only the {language} source code.",
            task = request.task.trim(),
        );

        Self {
            system: SYSTEM_PROMPT.to_string(),
            user,
        }
    }
}
