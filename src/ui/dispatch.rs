use codesmith::app::{CodeGenerationService, CodeGeneratorForm};
use gpui::{AppContext as _, Context, Task};
use tracing::debug;

/// Entity state that owns a [`CodeGeneratorForm`].
pub(super) trait FormHost: 'static {
    fn form_mut(&mut self) -> &mut CodeGeneratorForm;
}

/// Begins a dispatch on the host's form and runs the generator on the
/// background executor. Returns `None` when the form refuses to dispatch.
///
/// The outcome is applied through a weak handle, so a host released before
/// the backend answers is never touched.
pub(super) fn spawn_generation<H: FormHost>(
    host: &mut H,
    service: CodeGenerationService,
    cx: &mut Context<H>,
) -> Option<Task<()>> {
    let ticket = host.form_mut().begin_generate()?;
    cx.notify();

    let request = ticket.request().clone();
    let outcome = cx.background_spawn(async move { service.generate(&request) });

    Some(cx.spawn(async move |host, cx| {
        let outcome = outcome.await;
        let applied = host.update(cx, |host, cx| {
            if host.form_mut().complete_generate(&ticket, outcome) {
                cx.notify();
            }
        });
        if applied.is_err() {
            debug!(
                dispatch_id = ticket.dispatch_id(),
                "form host released before generation finished"
            );
        }
    }))
}
