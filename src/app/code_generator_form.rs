use tracing::{debug, warn};

use crate::domain::{CodeGenerationRequest, GenerationError, TargetLanguage, is_blank_task};

/// Notified with `(code, language)` after each successful generation.
pub type CodeGeneratedObserver = Box<dyn Fn(&str, TargetLanguage)>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Succeeded {
        code: String,
    },
    Failed {
        message: String,
    },
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub fn generated_code(&self) -> Option<&str> {
        match self {
            Self::Succeeded { code } => Some(code),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Ties a completion back to the dispatch that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTicket {
    dispatch_id: u64,
    request: CodeGenerationRequest,
}

impl DispatchTicket {
    pub fn dispatch_id(&self) -> u64 {
        self.dispatch_id
    }

    pub fn request(&self) -> &CodeGenerationRequest {
        &self.request
    }
}

/// Form state and request lifecycle of the code generator panel.
///
/// A dispatch is split at its suspension point: [`begin_generate`] moves the
/// form to [`RequestState::InFlight`] and hands out a ticket, the caller runs
/// the external call, and [`complete_generate`] applies the outcome. Only one
/// dispatch is active at a time.
///
/// [`begin_generate`]: CodeGeneratorForm::begin_generate
/// [`complete_generate`]: CodeGeneratorForm::complete_generate
pub struct CodeGeneratorForm {
    task: String,
    language: TargetLanguage,
    state: RequestState,
    next_dispatch_id: u64,
    active_dispatch_id: Option<u64>,
    observer: Option<CodeGeneratedObserver>,
}

impl Default for CodeGeneratorForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGeneratorForm {
    pub fn new() -> Self {
        Self {
            task: String::new(),
            language: TargetLanguage::default(),
            state: RequestState::Idle,
            next_dispatch_id: 1,
            active_dispatch_id: None,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: CodeGeneratedObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn set_task(&mut self, task: impl Into<String>) {
        self.task = task.into();
    }

    pub fn language(&self) -> TargetLanguage {
        self.language
    }

    pub fn set_language(&mut self, language: TargetLanguage) {
        self.language = language;
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.is_in_flight()
    }

    /// Whether the generate affordance should be enabled.
    pub fn can_generate(&self) -> bool {
        !self.is_in_flight() && !is_blank_task(&self.task)
    }

    /// Starts a dispatch, or does nothing when the task is blank or another
    /// dispatch is still in flight.
    pub fn begin_generate(&mut self) -> Option<DispatchTicket> {
        if !self.can_generate() {
            return None;
        }

        let dispatch_id = self.next_dispatch_id;
        self.next_dispatch_id = self.next_dispatch_id.saturating_add(1);
        self.active_dispatch_id = Some(dispatch_id);
        self.state = RequestState::InFlight;

        Some(DispatchTicket {
            dispatch_id,
            request: CodeGenerationRequest::new(self.task.clone(), self.language),
        })
    }

    /// Applies the outcome of the external call for `ticket`.
    ///
    /// Returns `false` without touching state when `ticket` is not the active
    /// dispatch.
    pub fn complete_generate(
        &mut self,
        ticket: &DispatchTicket,
        outcome: Result<String, GenerationError>,
    ) -> bool {
        if self.active_dispatch_id != Some(ticket.dispatch_id) {
            debug!(
                dispatch_id = ticket.dispatch_id,
                "ignoring completion for an inactive dispatch"
            );
            return false;
        }
        self.active_dispatch_id = None;

        match outcome {
            Ok(code) => {
                self.state = RequestState::Succeeded { code };
                if let (Some(observer), Some(code)) =
                    (self.observer.as_ref(), self.state.generated_code())
                {
                    observer(code, ticket.request.language);
                }
            }
            Err(error) => {
                warn!(
                    dispatch_id = ticket.dispatch_id,
                    error = %error,
                    "code generation failed"
                );
                self.state = RequestState::Failed {
                    message: error.failure_message(),
                };
            }
        }

        true
    }
}
