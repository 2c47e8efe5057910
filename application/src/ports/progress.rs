//! Progress notification port
//!
//! Defines the interface for reporting progress during a consultation.

use consult_domain::{AgentId, Framework, Stage};

/// Callback for progress updates during a consultation
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console bars, plain lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage starts; `total_tasks` is zero for stages that
    /// do not invoke agents
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize);

    /// Called when an agent invocation finishes
    fn on_agent_complete(&self, stage: &Stage, agent: &AgentId, success: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: &Stage);

    /// Called once the framework is chosen
    fn on_framework_selected(&self, _framework: Framework) {}

    /// Called when a discussion round starts
    fn on_round_start(&self, _round: usize, _max_rounds: usize) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: &Stage, _total_tasks: usize) {}
    fn on_agent_complete(&self, _stage: &Stage, _agent: &AgentId, _success: bool) {}
    fn on_stage_complete(&self, _stage: &Stage) {}
}
