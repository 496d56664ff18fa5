use std::process::ExitCode;

use clap::{Parser, Subcommand};
use codesmith::{
    app::{CodeGeneratedObserver, CodeGenerationBackend, CodeGeneratorForm, RequestState},
    domain::TargetLanguage,
    logging::init_tracing,
};
use tracing::info;

mod ui;

const BLANK_TASK_NOTICE: &str = "A task description is required.";

#[derive(Debug, Parser)]
#[command(name = "codesmith")]
#[command(about = "Generate source code from a task description")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the code generator panel (default).
    Panel,
    /// Generate code once and print it to stdout.
    Generate {
        /// Target language: javascript, typescript, python, java, c++, rust or go.
        #[arg(short, long, default_value = "javascript")]
        language: TargetLanguage,

        /// Description of the code to write.
        task: String,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let backend = codesmith::app::build_code_generation_backend();

    match cli.command.unwrap_or(Command::Panel) {
        Command::Panel => {
            ui::run_code_generator_window(backend, Some(log_generated_code()));
            ExitCode::SUCCESS
        }
        Command::Generate { language, task } => run_headless_generation(&backend, language, task),
    }
}

fn log_generated_code() -> CodeGeneratedObserver {
    Box::new(|code: &str, language: TargetLanguage| {
        info!(
            language = %language,
            code_chars = code.chars().count(),
            "code generated"
        );
    })
}

fn run_headless_generation(
    backend: &CodeGenerationBackend,
    language: TargetLanguage,
    task: String,
) -> ExitCode {
    let mut form = CodeGeneratorForm::new().with_observer(log_generated_code());
    form.set_task(task);
    form.set_language(language);

    let Some(ticket) = form.begin_generate() else {
        eprintln!("{BLANK_TASK_NOTICE}");
        return ExitCode::FAILURE;
    };
    let outcome = backend.service.generate(ticket.request());
    form.complete_generate(&ticket, outcome);

    match form.state() {
        RequestState::Succeeded { code } => {
            println!("{code}");
            ExitCode::SUCCESS
        }
        RequestState::Failed { message } => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
        RequestState::Idle | RequestState::InFlight => ExitCode::FAILURE,
    }
}
