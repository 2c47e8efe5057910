//! CLI command definitions

use clap::{Parser, ValueEnum};
use consult_application::OrchestratorSettings;
use consult_domain::{
    DomainError, ExecutionMode, FrameworkChoice, HistoryEntry, PanelConfiguration, QuorumRule,
};
use std::path::PathBuf;
use std::time::Duration;

/// Output format for consultation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every agent response, conflict and resolution
    Full,
    /// Only the final recommendation
    Summary,
    /// JSON output
    Json,
}

/// CLI arguments for consult-quorum
#[derive(Parser, Debug)]
#[command(name = "consult-quorum")]
#[command(author, version, about = "Consult a panel of expert agents and reconcile their answers")]
#[command(long_about = r#"
Consult Quorum puts one question to a panel of expert agents and reconciles
their answers into a single recommendation.

A consultation runs in stages:
1. Selection: pick the orchestration framework for the panel
2. Execution: run the agents (sequential, parallel, conversational, hierarchical)
3. Deliberation: validate responses, detect and resolve conflicts, check quorum

Configuration files are loaded from (in priority order):
1. CONSULT_* environment variables
2. --config <path>     Explicit config file
3. ./consult.toml      Project-level config
4. ~/.config/consult-quorum/config.toml   Global config

Example:
  consult-quorum "Should the patient start anticoagulation?"
  consult-quorum --mode conversational --max-rounds 2 --require-consensus "Approve the plan?"
  consult-quorum --output json --conversation-log consultations.jsonl "Discharge today?"
"#)]
pub struct Cli {
    /// The question to put to the panel
    pub question: Option<String>,

    /// Execution mode (sequential, parallel, conversational, hierarchical)
    #[arg(long, value_name = "MODE")]
    pub mode: Option<ExecutionMode>,

    /// Framework (auto, direct, state_graph, dialogue, crew)
    #[arg(long, value_name = "FRAMEWORK")]
    pub framework: Option<FrameworkChoice>,

    /// Maximum discussion rounds for conversational mode
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<usize>,

    /// Consultation deadline in milliseconds
    #[arg(long, value_name = "MS")]
    pub deadline_ms: Option<u64>,

    /// Stop conversational rounds early once the panel agrees
    #[arg(long)]
    pub require_consensus: bool,

    /// Let a moderator close each discussion round
    #[arg(long)]
    pub allow_debate: bool,

    /// Quorum rule (majority, unanimous, atleast:N, N%)
    #[arg(long, value_name = "RULE")]
    pub quorum: Option<QuorumRule>,

    /// Earlier user turns handed to every agent (repeatable)
    #[arg(long = "history", value_name = "TEXT")]
    pub history: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append consultation events to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,
}

impl Cli {
    /// Apply panel flags on top of the configured panel
    pub fn apply_panel_overrides(
        &self,
        panel: PanelConfiguration,
    ) -> Result<PanelConfiguration, DomainError> {
        let mut builder = panel.to_builder();
        if let Some(mode) = self.mode {
            builder = builder.mode(mode);
        }
        if let Some(framework) = self.framework {
            builder = builder.framework(framework);
        }
        if let Some(rounds) = self.max_rounds {
            builder = builder.max_rounds(rounds);
        }
        if self.require_consensus {
            builder = builder.require_consensus(true);
        }
        if self.allow_debate {
            builder = builder.allow_debate(true);
        }
        builder.build()
    }

    /// Apply orchestrator flags on top of the configured settings
    pub fn apply_settings_overrides(
        &self,
        settings: OrchestratorSettings,
    ) -> Result<OrchestratorSettings, DomainError> {
        let mut settings = settings;
        if let Some(ms) = self.deadline_ms {
            if ms == 0 {
                return Err(DomainError::invalid("--deadline-ms must be greater than 0"));
            }
            settings = settings.with_deadline(Duration::from_millis(ms));
        }
        if let Some(rule) = self.quorum {
            settings = settings.with_quorum_rule(rule);
        }
        Ok(settings)
    }

    /// `--history` turns as conversation history
    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history.iter().map(HistoryEntry::user).collect()
    }
}
