//! Agent responses and their structural validation.

pub mod entities;
pub mod validator;

pub use entities::{AgentFailure, AgentResponse, FailureKind, ResponseKind, sort_responses};
pub use validator::{ResponseValidator, ValidationReport};
