//! Deadline and cancellation shared by every call of a consultation.

use crate::ports::agent_invoker::{AgentInvoker, AgentOutput, InvocationContext, InvocationError};
use consult_domain::{AgentDefinition, AgentFailure, AgentResponse, FailureKind};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One deadline and one cancellation token for a whole consultation.
///
/// Cheap to clone into spawned tasks; every clone observes the same
/// deadline and token.
#[derive(Debug, Clone)]
pub struct InvocationBudget {
    deadline: Instant,
    cancellation: CancellationToken,
}

impl InvocationBudget {
    /// Budget expiring `timeout` from now
    pub fn new(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Why no further call may start, if any
    pub fn exhausted(&self) -> Option<FailureKind> {
        if self.cancellation.is_cancelled() {
            Some(FailureKind::Cancelled)
        } else if Instant::now() >= self.deadline {
            Some(FailureKind::TimedOut)
        } else {
            None
        }
    }

    /// Drive `call` until it finishes, the deadline passes or the
    /// consultation is cancelled. The call is dropped in the latter cases.
    pub async fn run<F>(&self, call: F) -> Result<AgentOutput, InvocationError>
    where
        F: Future<Output = Result<AgentOutput, InvocationError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(InvocationError::Cancelled),
            _ = tokio::time::sleep_until(self.deadline) => Err(InvocationError::Timeout),
            result = call => result,
        }
    }
}

fn failure_for(error: &InvocationError) -> AgentFailure {
    match error {
        InvocationError::Timeout => AgentFailure::timed_out(),
        InvocationError::Cancelled => AgentFailure::cancelled(),
        other => AgentFailure::error(other.to_string()),
    }
}

/// Invoke one agent within the budget and record the outcome as a response.
///
/// Never fails: errors, timeouts and cancellation become failed responses
/// carrying the agent's configuration position.
pub async fn invoke_agent(
    invoker: &dyn AgentInvoker,
    agent: &AgentDefinition,
    position: usize,
    question: &str,
    context: &InvocationContext,
    budget: &InvocationBudget,
) -> AgentResponse {
    let result = match budget.exhausted() {
        Some(FailureKind::Cancelled) => Err(InvocationError::Cancelled),
        Some(_) => Err(InvocationError::Timeout),
        None => budget.run(invoker.invoke(agent, question, context)).await,
    };

    let response = match result {
        Ok(output) => {
            debug!(
                "Agent {} answered as {} (confidence {:.2})",
                agent.id,
                context.role.as_str(),
                output.confidence
            );
            AgentResponse::success(agent.id.clone(), position, output.content, output.confidence)
                .with_structured(output.structured)
        }
        Err(e) => {
            warn!("Agent {} failed as {}: {}", agent.id, context.role.as_str(), e);
            AgentResponse::failed(agent.id.clone(), position, failure_for(&e))
        }
    };

    response
        .with_round(context.round)
        .with_kind(context.role.response_kind())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_invoker::InvocationRole;
    use crate::testing::{Behavior, StubInvoker};
    use consult_domain::ResponseKind;

    #[tokio::test]
    async fn test_success_becomes_response() {
        let invoker = StubInvoker::new().on("a", Behavior::reply("approve", 0.8));
        let agent = AgentDefinition::new("a", "cardiologist");
        let context = InvocationContext::new(InvocationRole::Panelist, 2);
        let budget = InvocationBudget::new(Duration::from_secs(5));

        let response = invoke_agent(&invoker, &agent, 3, "Q?", &context, &budget).await;
        assert!(!response.is_failure());
        assert_eq!(response.content, "approve");
        assert_eq!(response.sequence_index, 3);
        assert_eq!(response.round, 2);
        assert_eq!(response.kind, ResponseKind::Answer);
    }

    #[tokio::test]
    async fn test_error_becomes_failed_response() {
        let invoker = StubInvoker::new().on("a", Behavior::fail("upstream 502"));
        let agent = AgentDefinition::new("a", "cardiologist");
        let context = InvocationContext::new(InvocationRole::Moderator, 1);
        let budget = InvocationBudget::new(Duration::from_secs(5));

        let response = invoke_agent(&invoker, &agent, 0, "Q?", &context, &budget).await;
        assert_eq!(response.failure_kind(), Some(FailureKind::Error));
        assert_eq!(response.kind, ResponseKind::Moderation);
    }

    #[tokio::test]
    async fn test_deadline_aborts_hanging_call() {
        let invoker = StubInvoker::new().on("a", Behavior::Hang);
        let agent = AgentDefinition::new("a", "cardiologist");
        let context = InvocationContext::new(InvocationRole::Panelist, 1);
        let budget = InvocationBudget::new(Duration::from_millis(20));

        let response = invoke_agent(&invoker, &agent, 0, "Q?", &context, &budget).await;
        assert_eq!(response.failure_kind(), Some(FailureKind::TimedOut));
    }

    #[tokio::test]
    async fn test_cancelled_budget_skips_call() {
        let invoker = StubInvoker::new().on("a", Behavior::reply("approve", 0.8));
        let agent = AgentDefinition::new("a", "cardiologist");
        let context = InvocationContext::new(InvocationRole::Panelist, 1);
        let token = CancellationToken::new();
        token.cancel();
        let budget = InvocationBudget::new(Duration::from_secs(5)).with_cancellation(token);

        let response = invoke_agent(&invoker, &agent, 0, "Q?", &context, &budget).await;
        assert_eq!(response.failure_kind(), Some(FailureKind::Cancelled));
        assert!(invoker.calls().is_empty());
    }
}
