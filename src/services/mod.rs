//! Business logic services.

pub mod case_id;
pub mod cases;
pub mod workflow;

pub use case_id::CaseIdGenerator;
pub use cases::CaseService;
pub use workflow::{ActionKind, CaseAction, CaseActionsResponse, TransitionRequest};
