//! Orchestrate use case
//!
//! Runs one consultation end to end: framework selection, topology
//! execution, validation, conflict detection, resolution and consensus.

use crate::config::OrchestratorSettings;
use crate::ports::agent_invoker::AgentInvoker;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_types,
};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::topology::{InvocationBudget, TopologyInput, executor_for};
use consult_domain::{
    AgentResponse, ClaimComparator, ClaimContext, Deliberation, DomainError, ExecutionMetadata,
    ExecutionResult, FrameworkSelector, HistoryEntry, PanelConfiguration, PolarityComparator,
    Question, Stage,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that abort a consultation.
///
/// Agent-level failures never show up here; they are recorded on the
/// responses instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestrateError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No viable responses: every agent failed")]
    NoViableResponses,
}

impl OrchestrateError {
    /// HTTP status a transport layer would map this error to
    pub fn status_hint(&self) -> u16 {
        match self {
            OrchestrateError::InvalidConfiguration(_) => 400,
            OrchestrateError::NoViableResponses => 500,
        }
    }
}

impl From<DomainError> for OrchestrateError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidConfiguration(message) => {
                OrchestrateError::InvalidConfiguration(message)
            }
            DomainError::NoViableResponses => OrchestrateError::NoViableResponses,
        }
    }
}

/// Use case for running a consultation
pub struct ConsultationOrchestrator<I: AgentInvoker + 'static> {
    invoker: Arc<I>,
    settings: OrchestratorSettings,
    comparator: Arc<dyn ClaimComparator>,
    conversation_logger: Arc<dyn ConversationLogger>,
    cancellation: Option<CancellationToken>,
}

impl<I: AgentInvoker + 'static> ConsultationOrchestrator<I> {
    pub fn new(invoker: Arc<I>, settings: OrchestratorSettings) -> Self {
        Self {
            invoker,
            settings,
            comparator: Arc::new(PolarityComparator::new()),
            conversation_logger: Arc::new(NoConversationLogger),
            cancellation: None,
        }
    }

    /// Replace the default keyword-based claim comparator
    pub fn with_comparator(mut self, comparator: Arc<dyn ClaimComparator>) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Cancelling the token ends every consultation in flight the same way
    /// the deadline does
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Run a consultation with default (no-op) progress
    pub async fn orchestrate(
        &self,
        question: &str,
        config: &PanelConfiguration,
        history: &[HistoryEntry],
    ) -> Result<ExecutionResult, OrchestrateError> {
        self.orchestrate_with_progress(question, config, history, &NoProgress)
            .await
    }

    /// Run a consultation with progress callbacks
    pub async fn orchestrate_with_progress(
        &self,
        question: &str,
        config: &PanelConfiguration,
        history: &[HistoryEntry],
        progress: &dyn ProgressNotifier,
    ) -> Result<ExecutionResult, OrchestrateError> {
        let started = Instant::now();
        let question = Question::try_new(question)?;
        let question = question.content();

        // Stage 1: Framework selection
        progress.on_stage_start(&Stage::Selection, 0);
        let framework = FrameworkSelector::resolve(config)?;
        progress.on_framework_selected(framework);
        progress.on_stage_complete(&Stage::Selection);
        info!(
            "Consulting {} agents in {} mode on the {} framework",
            config.agent_count(),
            config.mode(),
            framework
        );

        // Stage 2: Execution
        let deliberation = Deliberation::new(self.comparator.clone(), self.settings.deliberation());
        let mut budget = InvocationBudget::new(self.settings.deadline);
        if let Some(token) = &self.cancellation {
            budget = budget.with_cancellation(token.child_token());
        }

        progress.on_stage_start(&Stage::Execution, config.agent_count());
        let input = TopologyInput {
            invoker: self.invoker.clone(),
            panel: config,
            question,
            history,
            budget: &budget,
            deliberation: &deliberation,
            progress,
        };
        let run = executor_for(config.mode()).execute(&input).await;
        progress.on_stage_complete(&Stage::Execution);

        let mut responses = run.responses;
        if responses.iter().all(AgentResponse::is_failure) {
            warn!("Every agent failed; no viable responses");
            for response in &responses {
                self.log_response(response);
            }
            return Err(OrchestrateError::NoViableResponses);
        }

        // Stage 3: Validation
        progress.on_stage_start(&Stage::Validation, responses.len());
        let valid_count = deliberation.annotate(&mut responses, config);
        for response in &responses {
            if !response.invalid_reasons.is_empty() {
                debug!(
                    "Response from {} excluded: {}",
                    response.agent_id,
                    response.invalid_reasons.join("; ")
                );
            }
            self.log_response(response);
        }
        progress.on_stage_complete(&Stage::Validation);
        info!("{} of {} responses passed validation", valid_count, responses.len());

        let positions = deliberation.final_positions(&responses, config);
        let context = ClaimContext::new(question, history);

        // Stage 4: Conflict detection
        progress.on_stage_start(&Stage::ConflictDetection, 0);
        let conflicts = deliberation.detect(&positions, &context);
        for conflict in &conflicts {
            info!(
                "Conflict {} ({}): {}",
                conflict.id, conflict.severity, conflict.description
            );
            self.conversation_logger.log(ConversationEvent::new(
                event_types::CONFLICT_DETECTED,
                serde_json::json!({
                    "conflict_id": conflict.id,
                    "severity": conflict.severity,
                    "agents": conflict.involved_agent_ids,
                    "triggers": conflict.triggers,
                    "description": conflict.description,
                }),
            ));
        }
        progress.on_stage_complete(&Stage::ConflictDetection);

        // Stage 5: Resolution
        progress.on_stage_start(&Stage::Resolution, 0);
        let resolutions = deliberation.resolve(&conflicts, &positions, &context);
        for resolution in &resolutions {
            info!(
                "Conflict {} resolved by {}",
                resolution.conflict_id, resolution.strategy
            );
            self.conversation_logger.log(ConversationEvent::new(
                event_types::RESOLUTION_APPLIED,
                serde_json::to_value(resolution).unwrap_or_default(),
            ));
        }
        progress.on_stage_complete(&Stage::Resolution);

        // Stage 6: Consensus
        progress.on_stage_start(&Stage::Consensus, 0);
        let consensus = deliberation.build_consensus(&positions, &resolutions, config, &context);
        if let Some(consensus) = &consensus {
            info!(
                "Consensus {} ({} supporting, quorum {})",
                if consensus.reached { "reached" } else { "not reached" },
                consensus.supporting_agent_ids.len(),
                consensus.quorum
            );
            self.conversation_logger.log(ConversationEvent::new(
                event_types::CONSENSUS,
                serde_json::to_value(consensus).unwrap_or_default(),
            ));
        }
        progress.on_stage_complete(&Stage::Consensus);

        let agent_ids: Vec<_> = config.agents().iter().map(|a| a.id.clone()).collect();
        let mut metadata = ExecutionMetadata::from_responses(&agent_ids, &responses)
            .with_duration_ms(started.elapsed().as_millis() as u64);
        metadata.rounds_completed = run.rounds_completed;
        metadata.timed_out |= run.timed_out;
        metadata.degraded |= run.degraded;

        Ok(ExecutionResult {
            success: valid_count > 0,
            question: question.to_string(),
            framework,
            mode: config.mode(),
            responses,
            conflicts,
            resolutions,
            consensus,
            metadata,
        })
    }

    fn log_response(&self, response: &AgentResponse) {
        self.conversation_logger.log(ConversationEvent::new(
            event_types::AGENT_RESPONSE,
            serde_json::json!({
                "agent": response.agent_id,
                "round": response.round,
                "kind": response.kind,
                "confidence": response.confidence,
                "content": response.content,
                "failure": response.failure,
                "invalid_reasons": response.invalid_reasons,
            }),
        ));
    }
}
