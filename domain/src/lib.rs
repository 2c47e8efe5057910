//! Domain layer for consult-quorum
//!
//! This crate contains the data model and the pure decision procedures of a
//! multi-agent consultation. It has no dependencies on infrastructure or
//! presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Panel
//!
//! A [`PanelConfiguration`] is the ordered set of expert agents consulted on
//! one question, together with the [`ExecutionMode`] that runs them and the
//! [`Framework`] chosen for the consultation.
//!
//! ## Deliberation
//!
//! Raw responses flow through validation, conflict detection, conflict
//! resolution and consensus building ([`Deliberation`]). Comparing what
//! agents actually claim is delegated to an injected [`ClaimComparator`].

pub mod agent;
pub mod conflict;
pub mod core;
pub mod framework;
pub mod orchestration;
pub mod panel;
pub mod prompt;
pub mod quorum;
pub mod resolution;
pub mod response;
pub mod util;

// Re-export commonly used types
pub use agent::{AgentDefinition, AgentId, ModelParams};
pub use conflict::{
    Claim, ClaimComparator, ClaimContext, Conflict, ConflictDetector, ConflictSeverity,
    ConflictTrigger, Polarity, PolarityComparator,
};
pub use core::{error::DomainError, question::Question};
pub use framework::{
    Complexity, Framework, FrameworkChoice, FrameworkRecommendation, FrameworkSelector,
    SelectionCriteria,
};
pub use orchestration::{Contribution, ExecutionMetadata, ExecutionResult, HistoryEntry, Stage};
pub use panel::{ExecutionMode, PanelConfiguration, PanelConfigurationBuilder};
pub use prompt::PromptTemplate;
pub use quorum::{
    ConsensusBuilder, ConsensusResult, Deliberation, DeliberationOutcome, DeliberationSettings,
    QuorumRule, Recommendation,
};
pub use resolution::{ConflictResolver, Resolution, ResolutionOutcome, ResolutionStrategy};
pub use response::{
    AgentFailure, AgentResponse, FailureKind, ResponseKind, ResponseValidator, ValidationReport,
    sort_responses,
};
