//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and
//! application types once validated.

mod agent;
mod invoker;
mod logging;
mod orchestrator;
mod panel;

pub use agent::FileAgentConfig;
pub use invoker::{FileInvokerConfig, FileScriptEntry, InvokerKind};
pub use logging::FileLoggingConfig;
pub use orchestrator::FileOrchestratorConfig;
pub use panel::FilePanelConfig;

use consult_application::OrchestratorSettings;
use consult_domain::PanelConfiguration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems found in a loaded configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("panel.agents: at least one agent is required")]
    NoAgents,

    #[error("panel.agents: agent id cannot be empty")]
    EmptyAgentId,

    #[error("panel.agents: duplicate agent id '{0}'")]
    DuplicateAgentId(String),

    #[error("panel.mode: unknown mode '{0}'")]
    InvalidMode(String),

    #[error("panel.framework: unknown framework '{0}'")]
    InvalidFramework(String),

    #[error("panel.max_rounds: must be at least 1")]
    ZeroMaxRounds,

    #[error("orchestrator.deadline_ms: must be greater than 0")]
    ZeroDeadline,

    #[error("orchestrator.{field}: {value} is outside 0.0..=1.0")]
    InvalidThreshold { field: &'static str, value: f64 },

    #[error("orchestrator.quorum_rule: invalid rule '{0}'")]
    InvalidQuorumRule(String),

    #[error("invoker.endpoint: required for the http invoker")]
    MissingEndpoint,

    #[error("invoker.script: agent '{0}' is not on the panel")]
    UnknownScriptAgent(String),

    #[error("panel: {0}")]
    InvalidPanel(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Deadline and deliberation tunables
    pub orchestrator: FileOrchestratorConfig,
    /// Panel members and execution mode
    pub panel: FilePanelConfig,
    /// Agent invoker adapter
    pub invoker: FileInvokerConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        errors.extend(self.orchestrator.validate());
        errors.extend(self.panel.validate());

        let agent_ids: Vec<&str> = self.panel.agents.iter().map(|a| a.id.trim()).collect();
        errors.extend(self.invoker.validate(&agent_ids));

        // Mode/framework compatibility is checked by the panel builder
        if errors.is_empty()
            && let Err(e) = self.panel.to_panel()
        {
            errors.push(e);
        }

        errors
    }

    pub fn to_panel(&self) -> Result<PanelConfiguration, ConfigValidationError> {
        self.panel.to_panel()
    }

    pub fn to_settings(&self) -> Result<OrchestratorSettings, ConfigValidationError> {
        self.orchestrator.to_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consult_domain::{ExecutionMode, QuorumRule};
    use std::time::Duration;

    const FULL_CONFIG: &str = r#"
[orchestrator]
deadline_ms = 90000
quorum_rule = "unanimous"

[panel]
mode = "conversational"
max_rounds = 2
require_consensus = true

[[panel.agents]]
id = "cardiology"
role = "Cardiologist"
goal = "Assess cardiovascular risk"

[[panel.agents]]
id = "pharmacy"
role = "Clinical pharmacist"
allow_delegation = true

[[invoker.script]]
agent = "cardiology"
content = "Approve"
confidence = 0.8

[logging]
conversation_log = "/tmp/consultations.jsonl"
"#;

    #[test]
    fn test_deserialize_full_config() {
        let config: FileConfig = toml::from_str(FULL_CONFIG).unwrap();
        assert!(config.validate().is_empty());

        let panel = config.to_panel().unwrap();
        assert_eq!(panel.mode(), ExecutionMode::Conversational);
        assert_eq!(panel.max_rounds(), 2);
        assert!(panel.require_consensus());
        assert_eq!(panel.agents()[1].role, "Clinical pharmacist");
        assert!(panel.agents()[1].allow_delegation);

        let settings = config.to_settings().unwrap();
        assert_eq!(settings.deadline, Duration::from_secs(90));
        assert_eq!(settings.quorum_rule, QuorumRule::Unanimous);
        assert!(config.logging.conversation_log.is_some());
    }

    #[test]
    fn test_default_config_has_no_agents() {
        let config = FileConfig::default();
        assert_eq!(config.validate(), vec![ConfigValidationError::NoAgents]);
        assert_eq!(config.orchestrator.deadline_ms, 300_000);
    }

    #[test]
    fn test_validate_reports_framework_mismatch() {
        let config: FileConfig = toml::from_str(
            r#"
[panel]
mode = "hierarchical"
framework = "dialogue"

[[panel.agents]]
id = "a"
"#,
        )
        .unwrap();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ConfigValidationError::InvalidPanel(_)));
    }
}
