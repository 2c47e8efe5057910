//! Framework selection: which orchestration strategy runs a consultation.

pub mod entities;
pub mod selector;

pub use entities::{Complexity, Framework, FrameworkChoice};
pub use selector::{FrameworkRecommendation, FrameworkSelector, SelectionCriteria};
