pub mod backend;
mod code_generator_form;
mod generation_service;

pub use backend::{CodeGenerationBackend, build_code_generation_backend};
pub use code_generator_form::{
    CodeGeneratedObserver, CodeGeneratorForm, DispatchTicket, RequestState,
};
pub use generation_service::CodeGenerationService;
