//! Framework selection.
//!
//! [`FrameworkSelector::recommend`] is a pure lookup from workload shape to
//! framework. The same criteria always produce the same framework.

use super::entities::{Complexity, Framework, FrameworkChoice};
use crate::core::error::DomainError;
use crate::panel::{ExecutionMode, PanelConfiguration};
use serde::{Deserialize, Serialize};

/// Shape of a consultation workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SelectionCriteria {
    pub agent_count: usize,
    pub needs_conversation: bool,
    pub needs_state: bool,
    pub needs_delegation: bool,
    /// Explicit complexity; derived from `agent_count` when absent
    pub complexity: Option<Complexity>,
}

impl SelectionCriteria {
    pub fn new(agent_count: usize) -> Self {
        Self {
            agent_count,
            ..Default::default()
        }
    }

    pub fn with_conversation(mut self) -> Self {
        self.needs_conversation = true;
        self
    }

    pub fn with_state(mut self) -> Self {
        self.needs_state = true;
        self
    }

    pub fn with_delegation(mut self) -> Self {
        self.needs_delegation = true;
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = Some(complexity);
        self
    }

    /// Derive criteria from a panel: the execution mode decides which
    /// capabilities are needed.
    pub fn from_panel(panel: &PanelConfiguration) -> Self {
        Self {
            agent_count: panel.agent_count(),
            needs_conversation: panel.mode() == ExecutionMode::Conversational,
            needs_state: panel.mode() == ExecutionMode::Sequential,
            needs_delegation: panel.mode() == ExecutionMode::Hierarchical,
            complexity: None,
        }
    }

    /// Explicit complexity, or the one implied by the agent count
    pub fn effective_complexity(&self) -> Complexity {
        self.complexity
            .unwrap_or_else(|| Complexity::from_agent_count(self.agent_count))
    }
}

/// A recommendation together with the reasoning behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkRecommendation {
    pub framework: Framework,
    pub complexity: Complexity,
    pub rationale: String,
}

/// Stateless framework selector
pub struct FrameworkSelector;

impl FrameworkSelector {
    /// Recommend a framework for the given criteria.
    ///
    /// Delegation wins over conversation, conversation over state; with none
    /// of them the simplest framework is chosen.
    pub fn recommend(criteria: &SelectionCriteria) -> Result<Framework, DomainError> {
        Self::recommend_detailed(criteria).map(|r| r.framework)
    }

    /// Like [`FrameworkSelector::recommend`], also reporting complexity and rationale
    pub fn recommend_detailed(
        criteria: &SelectionCriteria,
    ) -> Result<FrameworkRecommendation, DomainError> {
        if criteria.agent_count == 0 {
            return Err(DomainError::invalid(
                "cannot select a framework for an empty agent set",
            ));
        }

        let complexity = criteria.effective_complexity();
        let (framework, reason) = if criteria.needs_delegation {
            (Framework::Crew, "delegation requires a hierarchical-capable framework")
        } else if criteria.needs_conversation {
            (Framework::Dialogue, "multi-turn exchange requested")
        } else if criteria.needs_state {
            (Framework::StateGraph, "stateful sequential execution requested")
        } else {
            (Framework::Direct, "no special capability needed")
        };

        Ok(FrameworkRecommendation {
            framework,
            complexity,
            rationale: format!(
                "{} ({} agents, {} complexity)",
                reason, criteria.agent_count, complexity
            ),
        })
    }

    /// Resolve the framework a panel will run with.
    ///
    /// A fixed choice is used as-is (the panel builder already checked it
    /// supports the mode); `auto` goes through [`FrameworkSelector::recommend`].
    pub fn resolve(panel: &PanelConfiguration) -> Result<Framework, DomainError> {
        match panel.framework() {
            FrameworkChoice::Fixed(framework) => Ok(framework),
            FrameworkChoice::Auto => Self::recommend(&SelectionCriteria::from_panel(panel)),
        }
    }
}
