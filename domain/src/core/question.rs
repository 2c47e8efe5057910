//! Question value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A question put to a consultation panel (Value Object)
///
/// Guaranteed to contain at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Question {
    content: String,
}

impl Question {
    /// Create a new question, rejecting empty or whitespace-only content
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            Err(DomainError::invalid("question cannot be empty"))
        } else {
            Ok(Self { content })
        }
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for Question {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Question::try_new(s)
    }
}

impl TryFrom<&str> for Question {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Question::try_new(s)
    }
}

impl From<Question> for String {
    fn from(q: Question) -> Self {
        q.content
    }
}
