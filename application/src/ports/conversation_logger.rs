//! Port for structured consultation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording consultation events
//! (agent responses, detected conflicts, resolutions, consensus) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the audit
//! trail in a machine-readable format (JSONL).

use serde_json::Value;

/// Event types emitted by a consultation
pub mod event_types {
    /// One per agent response, after validation
    pub const AGENT_RESPONSE: &str = "agent_response";
    /// One per detected conflict
    pub const CONFLICT_DETECTED: &str = "conflict_detected";
    /// One per resolution
    pub const RESOLUTION_APPLIED: &str = "resolution_applied";
    /// The consensus outcome, when there is one
    pub const CONSENSUS: &str = "consensus";
}

/// A structured consultation event for logging.
///
/// Each event has a type string and a JSON payload with event-specific
/// fields. The adapter stamps the time when it writes the record.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier, one of [`event_types`]
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging consultation events.
///
/// The `log` method is synchronous and infallible; a logging failure never
/// affects the consultation.
pub trait ConversationLogger: Send + Sync {
    /// Record a consultation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
