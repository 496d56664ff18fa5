use std::time::Duration;

use codesmith::app::{CodeGenerationService, CodeGeneratorForm, RequestState};
use codesmith::domain::{CodeGenerationRequest, GenerationError, TargetLanguage};
use codesmith::infra::llm::{AnthropicGenerator, CodeGenerator, OpenAiCompatibleGenerator};
use mockito::{Matcher, Server};
use serde_json::json;

const CSV_TASK: &str = "Create a function to convert CSV to JSON with error handling";

fn openai_generator(server: &Server, api_key: Option<&str>) -> OpenAiCompatibleGenerator {
    OpenAiCompatibleGenerator::with_config(
        api_key.map(str::to_string),
        server.url(),
        "gemma3:4b",
        Duration::from_secs(2),
    )
    .expect("generator should build")
}

fn anthropic_generator(server: &Server) -> AnthropicGenerator {
    AnthropicGenerator::with_config(
        "test-key",
        server.url(),
        "claude-3-5-sonnet-latest",
        Duration::from_secs(2),
    )
    .expect("generator should build")
}

fn chat_completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl_01",
        "choices": [
            {
                "finish_reason": "stop",
                "message": { "role": "assistant", "content": content }
            }
        ]
    })
    .to_string()
}

#[test]
fn openai_compatible_generate_unwraps_fenced_code() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_header(
            "content-type",
            Matcher::Regex("application/json.*".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("\"model\"\\s*:\\s*\"gemma3:4b\"".to_string()),
            Matcher::Regex("Write Python code".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion_body(
            "```python\ndef csv_to_json(path):\n    return []\n```",
        ))
        .create();

    let code = openai_generator(&server, Some("test-key"))
        .generate(&CodeGenerationRequest::new(CSV_TASK, TargetLanguage::Python))
        .expect("mocked chat completion should parse");

    mock.assert();
    assert_eq!(code, "def csv_to_json(path):\n    return []");
}

#[test]
fn openai_compatible_generate_omits_authorization_without_key() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion_body("fn main() {}"))
        .create();

    let code = openai_generator(&server, None)
        .generate(&CodeGenerationRequest::new("print hello", TargetLanguage::Rust))
        .expect("local server should not need a key");

    mock.assert();
    assert_eq!(code, "fn main() {}");
}

#[test]
fn openai_compatible_generate_maps_http_errors() {
    let cases = [
        (
            401,
            r#"{"error":{"message":"bad key","code":"invalid_api_key"}}"#,
            GenerationError::Auth,
        ),
        (
            429,
            r#"{"error":{"message":"slow down","type":"rate_limit_error"}}"#,
            GenerationError::RateLimited,
        ),
        (
            408,
            r#"{"error":{"message":"timed out","code":"request_timeout"}}"#,
            GenerationError::Timeout,
        ),
    ];

    for (status, body, expected) in cases {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create();

        let error = openai_generator(&server, None)
            .generate(&CodeGenerationRequest::new("sort a list", TargetLanguage::Go))
            .expect_err("error status should fail");

        mock.assert();
        assert_eq!(error, expected, "status {status}");
    }
}

#[test]
fn openai_compatible_generate_reports_server_message_for_other_statuses() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"model 'gemma3:4b' not found"}}"#)
        .create();

    let error = openai_generator(&server, None)
        .generate(&CodeGenerationRequest::new("sort a list", TargetLanguage::Go))
        .expect_err("missing model should fail");

    mock.assert();
    assert_eq!(
        error.failure_message(),
        "Error generating code: provider transport failed: \
         OpenAI-compatible API returned HTTP 404 Not Found: model 'gemma3:4b' not found"
    );
}

#[test]
fn openai_compatible_generate_rejects_empty_choices() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[]}"#)
        .create();

    let error = openai_generator(&server, None)
        .generate(&CodeGenerationRequest::new("sort a list", TargetLanguage::Go))
        .expect_err("empty choices should fail");

    mock.assert();
    assert!(matches!(error, GenerationError::InvalidResponse { .. }));
}

#[test]
fn anthropic_generate_succeeds_through_http_mock() {
    let mut server = Server::new();
    let response_body = json!({
        "id": "msg_01",
        "stop_reason": "end_turn",
        "content": [
            { "type": "text", "text": "```ts\nexport const sum = (a: number, b: number) => a + b;\n```" }
        ]
    })
    .to_string();

    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::Regex(
            "\"model\"\\s*:\\s*\"claude-3-5-sonnet-latest\"".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(response_body)
        .create();

    let code = anthropic_generator(&server)
        .generate(&CodeGenerationRequest::new(
            "add two numbers",
            TargetLanguage::TypeScript,
        ))
        .expect("mocked anthropic response should parse");

    mock.assert();
    assert_eq!(
        code,
        "export const sum = (a: number, b: number) => a + b;"
    );
}

#[test]
fn anthropic_generate_maps_authentication_error() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/messages")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#)
        .create();

    let error = anthropic_generator(&server)
        .generate(&CodeGenerationRequest::new("sort a list", TargetLanguage::Java))
        .expect_err("401 should fail");

    mock.assert();
    assert_eq!(error, GenerationError::Auth);
}

#[test]
fn backend_success_flows_into_form_state() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion_body("```cpp\nint main() { return 0; }\n```"))
        .create();

    let service = CodeGenerationService::new(openai_generator(&server, None));
    let mut form = CodeGeneratorForm::new();
    form.set_task("empty program");
    form.set_language(TargetLanguage::Cpp);

    let ticket = form.begin_generate().expect("dispatch should start");
    let outcome = service.generate(ticket.request());
    assert!(form.complete_generate(&ticket, outcome));

    mock.assert();
    assert_eq!(
        form.state(),
        &RequestState::Succeeded {
            code: "int main() { return 0; }".to_string()
        }
    );
}

#[test]
fn backend_failure_flows_into_form_state() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"slow down"}}"#)
        .create();

    let service = CodeGenerationService::new(openai_generator(&server, None));
    let mut form = CodeGeneratorForm::new();
    form.set_task("sort a list");

    let ticket = form.begin_generate().expect("dispatch should start");
    let outcome = service.generate(ticket.request());
    form.complete_generate(&ticket, outcome);

    mock.assert();
    assert_eq!(
        form.state().failure_message(),
        Some("Error generating code: provider rate limit reached")
    );
    assert!(!form.is_in_flight());
}
