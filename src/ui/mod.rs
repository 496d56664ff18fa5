use codesmith::app::{CodeGeneratedObserver, CodeGenerationBackend};
use codesmith::domain::TargetLanguage;
use gpui::{App, AppContext, Application, Bounds, WindowBounds, WindowOptions, px, size};
use gpui_component::Root;
use tracing::error;

mod dispatch;
mod state;
mod theme;
mod window;

pub(crate) use window::CodeGeneratorPanel;

const PANEL_WINDOW_WIDTH: f32 = 720.0;
const PANEL_WINDOW_HEIGHT: f32 = 760.0;
const TASK_EDITOR_HEIGHT_PX: f32 = 160.0;
const TASK_EDITOR_ROWS: usize = 6;

const TASK_PLACEHOLDER: &str =
    "Describe the code to write, for example: Create a function to convert CSV to JSON with error handling.";

fn language_button_id(language: TargetLanguage) -> &'static str {
    match language {
        TargetLanguage::JavaScript => "language-javascript",
        TargetLanguage::TypeScript => "language-typescript",
        TargetLanguage::Python => "language-python",
        TargetLanguage::Java => "language-java",
        TargetLanguage::Cpp => "language-cpp",
        TargetLanguage::Rust => "language-rust",
        TargetLanguage::Go => "language-go",
    }
}

/// Opens the panel in a native window and runs the event loop until it closes.
pub(crate) fn run_code_generator_window(
    backend: CodeGenerationBackend,
    observer: Option<CodeGeneratedObserver>,
) {
    Application::new().run(move |cx: &mut App| {
        gpui_component::init(cx);
        theme::apply_default_theme(cx);

        let bounds = Bounds::centered(
            None,
            size(px(PANEL_WINDOW_WIDTH), px(PANEL_WINDOW_HEIGHT)),
            cx,
        );
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            ..Default::default()
        };

        let opened = cx.open_window(options, move |window, cx| {
            let view = cx.new(|cx| CodeGeneratorPanel::new(backend, observer, window, cx));
            cx.new(|cx| Root::new(view, window, cx))
        });
        if let Err(err) = opened {
            error!(error = %err, "failed to open code generator window");
            cx.quit();
            return;
        }

        cx.on_window_closed(|cx| {
            if cx.windows().is_empty() {
                cx.quit();
            }
        })
        .detach();

        cx.activate(true);
    });
}
