use codesmith::{
    app::{
        CodeGeneratedObserver, CodeGenerationBackend, CodeGenerationService, CodeGeneratorForm,
    },
    domain::TargetLanguage,
};
use gpui::{
    ClipboardItem, Context, Entity, IntoElement, Render, Subscription, Task, Window, div,
    prelude::*, px,
};
use gpui_component::{
    Disableable,
    button::{Button, ButtonVariants as _},
    input::{Input, InputEvent, InputState},
    label::Label,
    scroll::ScrollableElement,
};
use super::dispatch::{FormHost, spawn_generation};
use super::state::{displayed_code, generate_button_label, status_color, status_label};
use super::theme::CodesmithTheme;
use super::{TASK_EDITOR_HEIGHT_PX, TASK_EDITOR_ROWS, TASK_PLACEHOLDER, language_button_id};

pub(crate) struct CodeGeneratorPanel {
    task_input: Entity<InputState>,
    _task_input_subscription: Subscription,
    form: CodeGeneratorForm,
    service: CodeGenerationService,
    backend_notice: Option<String>,
    _generation_task: Task<()>,
}

impl CodeGeneratorPanel {
    pub(super) fn new(
        backend: CodeGenerationBackend,
        observer: Option<CodeGeneratedObserver>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let task_input = cx.new(|cx| {
            InputState::new(window, cx)
                .multi_line(true)
                .rows(TASK_EDITOR_ROWS)
                .placeholder(TASK_PLACEHOLDER)
        });
        let task_input_subscription =
            cx.subscribe_in(&task_input, window, Self::on_task_input_event);

        let form = match observer {
            Some(observer) => CodeGeneratorForm::new().with_observer(observer),
            None => CodeGeneratorForm::new(),
        };

        Self {
            task_input,
            _task_input_subscription: task_input_subscription,
            form,
            service: backend.service,
            backend_notice: backend.notice,
            _generation_task: Task::ready(()),
        }
    }

    fn on_task_input_event(
        &mut self,
        state: &Entity<InputState>,
        event: &InputEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if matches!(event, InputEvent::Change) {
            let task = state.read(cx).value().to_string();
            self.form.set_task(task);
            cx.notify();
        }
    }

    fn on_language_selected(&mut self, language: TargetLanguage, cx: &mut Context<Self>) {
        if self.form.language() != language {
            self.form.set_language(language);
            cx.notify();
        }
    }

    fn on_generate_clicked(&mut self, cx: &mut Context<Self>) {
        let service = self.service.clone();
        if let Some(task) = spawn_generation(self, service, cx) {
            self._generation_task = task;
        }
    }

    fn on_copy_clicked(&mut self, cx: &mut Context<Self>) {
        if let Some(code) = displayed_code(self.form.state()) {
            cx.write_to_clipboard(ClipboardItem::new_string(code.to_string()));
        }
    }
}

impl FormHost for CodeGeneratorPanel {
    fn form_mut(&mut self) -> &mut CodeGeneratorForm {
        &mut self.form
    }
}

impl Render for CodeGeneratorPanel {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<CodesmithTheme>().clone();
        let colors = theme.colors;
        let state = self.form.state();
        let generating = state.is_in_flight();
        let selected_language = self.form.language();

        let language_button = |language: TargetLanguage| {
            let button = Button::new(language_button_id(language))
                .label(language.display_name())
                .on_click(cx.listener(move |this, _, _window, cx| {
                    this.on_language_selected(language, cx)
                }));
            if selected_language == language {
                button.primary()
            } else {
                button
            }
        };

        div()
            .size_full()
            .overflow_y_scrollbar()
            .overflow_x_hidden()
            .flex()
            .flex_col()
            .gap(theme.spacing.section_gap)
            .p(theme.spacing.window_padding)
            .bg(colors.surface_background)
            .text_color(colors.surface_foreground)
            .child(Label::new("Code Generator"))
            .child(
                div()
                    .text_color(colors.muted_foreground)
                    .child("Describe a programming task and pick the language to write it in."),
            )
            .child(Label::new("Task"))
            .child(Input::new(&self.task_input).h(px(TASK_EDITOR_HEIGHT_PX)))
            .child(Label::new("Language"))
            .child(
                div()
                    .id("language-selector")
                    .flex()
                    .flex_wrap()
                    .gap_2()
                    .children(TargetLanguage::ALL.into_iter().map(language_button)),
            )
            .child(
                div()
                    .flex()
                    .items_center()
                    .justify_between()
                    .gap_3()
                    .child(
                        Button::new("generate-button")
                            .primary()
                            .label(generate_button_label(state))
                            .loading(generating)
                            .disabled(!self.form.can_generate())
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.on_generate_clicked(cx)
                            })),
                    )
                    .child(
                        div()
                            .text_color(status_color(state, &colors))
                            .child(status_label(state)),
                    ),
            )
            .children(state.failure_message().map(|message| {
                div()
                    .text_color(colors.error_foreground)
                    .child(message.to_string())
            }))
            .children(displayed_code(state).map(|code| {
                div()
                    .flex()
                    .flex_col()
                    .gap_2()
                    .child(
                        div()
                            .flex()
                            .items_center()
                            .justify_between()
                            .child(Label::new("Generated Code"))
                            .child(
                                Button::new("copy-code-button")
                                    .ghost()
                                    .label("Copy")
                                    .on_click(cx.listener(|this, _, _window, cx| {
                                        this.on_copy_clicked(cx)
                                    })),
                            ),
                    )
                    .child(
                        div()
                            .id("generated-code")
                            .p(theme.spacing.panel_padding)
                            .rounded(theme.radius.panel)
                            .border_1()
                            .border_color(colors.panel_border)
                            .bg(colors.panel_background)
                            .font_family(theme.typography.mono_font_family.clone())
                            .text_size(theme.typography.mono_font_size)
                            .child(code.to_string()),
                    )
            }))
            .children(self.backend_notice.iter().map(|notice| {
                div()
                    .text_color(colors.accent_foreground)
                    .child(format!("Backend: {notice}"))
            }))
    }
}
