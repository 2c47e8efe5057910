//! Agent domain
//!
//! Agents are black boxes from the orchestrator's point of view: a
//! definition goes in, a response with a confidence score comes out.

pub mod entities;
pub mod value_objects;

pub use entities::AgentDefinition;
pub use value_objects::{AgentId, ModelParams};
