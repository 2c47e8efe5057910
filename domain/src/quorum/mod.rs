//! Quorum and consensus.
//!
//! A consultation reaches consensus when enough panelists agree on the same
//! claim and no conflict had to be escalated to a human. [`Deliberation`]
//! chains the decision procedures that get there.

pub mod consensus;
pub mod deliberation;
pub mod rule;

pub use consensus::{ConsensusBuilder, ConsensusResult, Recommendation};
pub use deliberation::{Deliberation, DeliberationOutcome, DeliberationSettings};
pub use rule::QuorumRule;
