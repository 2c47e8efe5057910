//! Settling detected conflicts.

pub mod entities;
pub mod resolver;

pub use entities::{Resolution, ResolutionOutcome, ResolutionStrategy};
pub use resolver::{ConflictResolver, DEFAULT_CONFIDENCE_MARGIN};
