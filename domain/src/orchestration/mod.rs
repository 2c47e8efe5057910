//! Consultation orchestration domain
//!
//! Stages, caller-supplied history, and the result of a consultation.

pub mod entities;
pub mod value_objects;

pub use entities::Stage;
pub use value_objects::{Contribution, ExecutionMetadata, ExecutionResult, HistoryEntry};
