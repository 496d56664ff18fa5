use codesmith::app::RequestState;
use gpui::Hsla;

use super::theme::ThemeColors;

pub(super) fn status_label(state: &RequestState) -> &'static str {
    match state {
        RequestState::Idle => "Ready",
        RequestState::InFlight => "Generating...",
        RequestState::Succeeded { .. } => "Code generated",
        RequestState::Failed { .. } => "Failed",
    }
}

pub(super) fn status_color(state: &RequestState, colors: &ThemeColors) -> Hsla {
    match state {
        RequestState::Idle => colors.accent_foreground,
        RequestState::InFlight => colors.progress_foreground,
        RequestState::Succeeded { .. } => colors.success_foreground,
        RequestState::Failed { .. } => colors.error_foreground,
    }
}

pub(super) fn generate_button_label(state: &RequestState) -> &'static str {
    if state.is_in_flight() {
        "Generating..."
    } else {
        "Generate Code"
    }
}

/// Generated code worth rendering; an empty reply shows no code block.
pub(super) fn displayed_code(state: &RequestState) -> Option<&str> {
    state.generated_code().filter(|code| !code.is_empty())
}
