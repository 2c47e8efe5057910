//! Orchestrator configuration from TOML (`[orchestrator]` section)

use super::ConfigValidationError;
use consult_application::OrchestratorSettings;
use consult_application::config::settings::DEFAULT_DEADLINE;
use consult_domain::QuorumRule;
use consult_domain::conflict::DEFAULT_CONFIDENCE_THRESHOLD;
use consult_domain::resolution::DEFAULT_CONFIDENCE_MARGIN;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw orchestrator configuration from TOML
///
/// # Example
///
/// ```toml
/// [orchestrator]
/// deadline_ms = 120000
/// confidence_gap_threshold = 0.4
/// confidence_margin = 0.1
/// quorum_rule = "majority"    # majority, unanimous, atleast:N, N%
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestratorConfig {
    /// Consultation deadline in milliseconds
    pub deadline_ms: u64,
    pub confidence_gap_threshold: f64,
    pub confidence_margin: f64,
    pub quorum_rule: String,
}

impl Default for FileOrchestratorConfig {
    fn default() -> Self {
        Self {
            deadline_ms: DEFAULT_DEADLINE.as_millis() as u64,
            confidence_gap_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            confidence_margin: DEFAULT_CONFIDENCE_MARGIN,
            quorum_rule: QuorumRule::Majority.to_string(),
        }
    }
}

impl FileOrchestratorConfig {
    pub(super) fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.deadline_ms == 0 {
            errors.push(ConfigValidationError::ZeroDeadline);
        }
        for (field, value) in [
            ("confidence_gap_threshold", self.confidence_gap_threshold),
            ("confidence_margin", self.confidence_margin),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ConfigValidationError::InvalidThreshold { field, value });
            }
        }
        if self.quorum_rule.parse::<QuorumRule>().is_err() {
            errors.push(ConfigValidationError::InvalidQuorumRule(
                self.quorum_rule.clone(),
            ));
        }

        errors
    }

    pub fn to_settings(&self) -> Result<OrchestratorSettings, ConfigValidationError> {
        if let Some(error) = self.validate().into_iter().next() {
            return Err(error);
        }
        let quorum_rule = self
            .quorum_rule
            .parse::<QuorumRule>()
            .map_err(|_| ConfigValidationError::InvalidQuorumRule(self.quorum_rule.clone()))?;

        Ok(OrchestratorSettings::default()
            .with_deadline(Duration::from_millis(self.deadline_ms))
            .with_confidence_gap_threshold(self.confidence_gap_threshold)
            .with_confidence_margin(self.confidence_margin)
            .with_quorum_rule(quorum_rule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_settings() {
        let settings = FileOrchestratorConfig::default().to_settings().unwrap();
        assert_eq!(settings, OrchestratorSettings::default());
    }

    #[test]
    fn test_to_settings() {
        let config = FileOrchestratorConfig {
            deadline_ms: 500,
            quorum_rule: "atleast:4".into(),
            ..Default::default()
        };
        let settings = config.to_settings().unwrap();
        assert_eq!(settings.deadline, Duration::from_millis(500));
        assert_eq!(settings.quorum_rule, QuorumRule::AtLeast(4));
    }

    #[test]
    fn test_out_of_range_threshold() {
        let config = FileOrchestratorConfig {
            confidence_margin: 1.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            vec![ConfigValidationError::InvalidThreshold {
                field: "confidence_margin",
                value: 1.5
            }]
        );
    }
}
