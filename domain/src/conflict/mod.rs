//! Disagreement between agents: claim comparison and conflict detection.

pub mod comparator;
pub mod detector;
pub mod entities;

pub use comparator::{
    Claim, ClaimCluster, ClaimComparator, ClaimContext, Polarity, PolarityComparator,
    cluster_by_claim,
};
pub use detector::{ConflictDetector, DEFAULT_CONFIDENCE_THRESHOLD};
pub use entities::{Conflict, ConflictSeverity, ConflictTrigger};
