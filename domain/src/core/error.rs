//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Only two conditions are fatal for a consultation: a configuration that
/// cannot be run at all, and a run in which no agent produced anything.
/// Agent-level failures are recorded on the responses instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No viable responses: every agent failed or timed out")]
    NoViableResponses,
}

impl DomainError {
    /// Shorthand for building an [`DomainError::InvalidConfiguration`]
    pub fn invalid(message: impl Into<String>) -> Self {
        DomainError::InvalidConfiguration(message.into())
    }

    /// Check if this error is a caller error (bad configuration or input)
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, DomainError::InvalidConfiguration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_display() {
        let error = DomainError::invalid("panel has no agents");
        assert_eq!(
            error.to_string(),
            "Invalid configuration: panel has no agents"
        );
    }

    #[test]
    fn test_is_invalid_configuration_check() {
        assert!(DomainError::invalid("x").is_invalid_configuration());
        assert!(!DomainError::NoViableResponses.is_invalid_configuration());
    }
}
