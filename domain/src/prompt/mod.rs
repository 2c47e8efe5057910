//! Prompt domain
//!
//! Templates for every kind of agent turn a topology produces.

mod template;

pub use template::PromptTemplate;
