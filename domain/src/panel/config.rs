//! Panel configuration.
//!
//! A [`PanelConfiguration`] can only be obtained through
//! [`PanelConfiguration::builder`], which validates everything an
//! orchestrator relies on before any agent is invoked.

use crate::agent::{AgentDefinition, AgentId};
use crate::core::error::DomainError;
use crate::framework::entities::FrameworkChoice;
use crate::panel::mode::ExecutionMode;
use serde::Serialize;
use std::collections::HashSet;

/// Validated configuration of one consultation panel
///
/// # Example
///
/// ```
/// use consult_domain::{AgentDefinition, ExecutionMode, PanelConfiguration};
///
/// let panel = PanelConfiguration::builder(vec![
///     AgentDefinition::new("cardiology", "Cardiologist"),
///     AgentDefinition::new("pharmacy", "Clinical pharmacist"),
/// ])
/// .mode(ExecutionMode::Sequential)
/// .build()
/// .unwrap();
///
/// assert_eq!(panel.agent_count(), 2);
/// assert_eq!(panel.mode(), ExecutionMode::Sequential);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelConfiguration {
    agents: Vec<AgentDefinition>,
    mode: ExecutionMode,
    framework: FrameworkChoice,
    max_rounds: usize,
    require_consensus: bool,
    allow_debate: bool,
}

impl PanelConfiguration {
    pub const DEFAULT_MAX_ROUNDS: usize = 3;

    /// Start building a configuration for the given agents
    pub fn builder(agents: Vec<AgentDefinition>) -> PanelConfigurationBuilder {
        PanelConfigurationBuilder {
            agents,
            mode: ExecutionMode::default(),
            framework: FrameworkChoice::default(),
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
            require_consensus: false,
            allow_debate: false,
        }
    }

    /// Agents in configuration order
    pub fn agents(&self) -> &[AgentDefinition] {
        &self.agents
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn agent(&self, id: &AgentId) -> Option<&AgentDefinition> {
        self.agents.iter().find(|a| &a.id == id)
    }

    /// Position of an agent in configuration order
    pub fn position_of(&self, id: &AgentId) -> Option<usize> {
        self.agents.iter().position(|a| &a.id == id)
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn framework(&self) -> FrameworkChoice {
        self.framework
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    pub fn require_consensus(&self) -> bool {
        self.require_consensus
    }

    pub fn allow_debate(&self) -> bool {
        self.allow_debate
    }

    /// Index of the first agent allowed to delegate, if any
    pub fn first_delegating_agent(&self) -> Option<usize> {
        self.agents.iter().position(|a| a.allow_delegation)
    }

    /// Rebuild this configuration with another execution mode
    pub fn with_mode(&self, mode: ExecutionMode) -> Result<Self, DomainError> {
        self.to_builder().mode(mode).build()
    }

    /// Turn this configuration back into a builder for adjustments
    pub fn to_builder(&self) -> PanelConfigurationBuilder {
        PanelConfigurationBuilder {
            agents: self.agents.clone(),
            mode: self.mode,
            framework: self.framework,
            max_rounds: self.max_rounds,
            require_consensus: self.require_consensus,
            allow_debate: self.allow_debate,
        }
    }
}

/// Builder for [`PanelConfiguration`]
#[derive(Debug, Clone)]
pub struct PanelConfigurationBuilder {
    agents: Vec<AgentDefinition>,
    mode: ExecutionMode,
    framework: FrameworkChoice,
    max_rounds: usize,
    require_consensus: bool,
    allow_debate: bool,
}

impl PanelConfigurationBuilder {
    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn framework(mut self, framework: FrameworkChoice) -> Self {
        self.framework = framework;
        self
    }

    pub fn max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn require_consensus(mut self, require: bool) -> Self {
        self.require_consensus = require;
        self
    }

    pub fn allow_debate(mut self, allow: bool) -> Self {
        self.allow_debate = allow;
        self
    }

    /// Validate and build.
    ///
    /// Fails with [`DomainError::InvalidConfiguration`] when the agent list
    /// is empty, an id is blank or duplicated, `max_rounds` is zero, or a
    /// fixed framework cannot drive the requested mode.
    pub fn build(self) -> Result<PanelConfiguration, DomainError> {
        if self.agents.is_empty() {
            return Err(DomainError::invalid("panel must contain at least one agent"));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.id.as_str().trim().is_empty() {
                return Err(DomainError::invalid("agent id cannot be empty"));
            }
            if !seen.insert(agent.id.as_str()) {
                return Err(DomainError::invalid(format!(
                    "duplicate agent id: {}",
                    agent.id
                )));
            }
        }

        if self.max_rounds == 0 {
            return Err(DomainError::invalid("max_rounds must be at least 1"));
        }

        if let FrameworkChoice::Fixed(framework) = self.framework
            && !framework.supports(self.mode)
        {
            return Err(DomainError::invalid(format!(
                "framework '{}' cannot run {} mode",
                framework, self.mode
            )));
        }

        Ok(PanelConfiguration {
            agents: self.agents,
            mode: self.mode,
            framework: self.framework,
            max_rounds: self.max_rounds,
            require_consensus: self.require_consensus,
            allow_debate: self.allow_debate,
        })
    }
}
