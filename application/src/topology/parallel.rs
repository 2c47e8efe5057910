//! Parallel topology: every agent answers independently and concurrently.

use super::budget::invoke_agent;
use super::{Executor, TopologyInput, TopologyRun};
use crate::ports::agent_invoker::{InvocationContext, InvocationRole};
use async_trait::async_trait;
use consult_domain::{AgentDefinition, AgentFailure, AgentResponse, PromptTemplate, Stage};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

pub struct ParallelExecutor;

#[async_trait]
impl Executor for ParallelExecutor {
    async fn execute(&self, input: &TopologyInput<'_>) -> TopologyRun {
        info!("Running {} agents in parallel", input.panel.agent_count());

        let prompt = PromptTemplate::initial_query(input.question, input.history);
        let calls = input
            .panel
            .agents()
            .iter()
            .map(|agent| {
                let context = InvocationContext::new(InvocationRole::Panelist, 1)
                    .with_history(input.history)
                    .with_prompt(prompt.clone());
                (agent.clone(), context)
            })
            .collect();

        let responses = run_concurrently(input, calls).await;
        TopologyRun::from_responses(responses, 1)
    }
}

/// Invoke every agent of the panel at once, one call per configuration
/// slot, and return the responses in configuration order.
///
/// One failure never cancels its siblings. Deadline and cancellation are
/// enforced inside every call, so the join loop always drains. A slot whose
/// task died without reporting is recorded as a failure.
pub(crate) async fn run_concurrently(
    input: &TopologyInput<'_>,
    calls: Vec<(AgentDefinition, InvocationContext)>,
) -> Vec<AgentResponse> {
    let mut join_set = JoinSet::new();
    let rounds: Vec<usize> = calls.iter().map(|(_, c)| c.round).collect();
    let ids: Vec<_> = calls.iter().map(|(a, _)| a.id.clone()).collect();

    for (position, (agent, context)) in calls.into_iter().enumerate() {
        let invoker = Arc::clone(&input.invoker);
        let question = input.question.to_string();
        let budget = input.budget.clone();

        join_set.spawn(async move {
            let response =
                invoke_agent(invoker.as_ref(), &agent, position, &question, &context, &budget)
                    .await;
            (position, response)
        });
    }

    let mut slots: Vec<Option<AgentResponse>> = vec![None; ids.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((position, response)) => {
                input.progress.on_agent_complete(
                    &Stage::Execution,
                    &response.agent_id,
                    !response.is_failure(),
                );
                slots[position] = Some(response);
            }
            Err(e) => {
                warn!("Agent task join error: {}", e);
            }
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(position, slot)| {
            slot.unwrap_or_else(|| {
                AgentResponse::failed(
                    ids[position].clone(),
                    position,
                    AgentFailure::error("agent task ended without a response"),
                )
                .with_round(rounds[position])
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Behavior, StubInvoker, agents, run_topology};
    use consult_domain::{ExecutionMode, FailureKind, PanelConfiguration};
    use std::time::{Duration, Instant};

    fn panel(ids: &[&str]) -> PanelConfiguration {
        PanelConfiguration::builder(agents(ids))
            .mode(ExecutionMode::Parallel)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_one_response_per_agent_in_configuration_order() {
        // Completion order c, b, a must not leak into the result
        let invoker = Arc::new(
            StubInvoker::new()
                .on("a", Behavior::delayed(60, "approve", 0.8))
                .on("b", Behavior::delayed(30, "approve", 0.7))
                .on("c", Behavior::reply("reject", 0.6)),
        );
        let run = run_topology(&ParallelExecutor, invoker, &panel(&["a", "b", "c"]), Duration::from_secs(5)).await;

        assert_eq!(run.responses.len(), 3);
        let order: Vec<(&str, usize)> = run
            .responses
            .iter()
            .map(|r| (r.agent_id.as_str(), r.sequence_index))
            .collect();
        assert_eq!(order, vec![("a", 0), ("b", 1), ("c", 2)]);
        assert!(!run.degraded);
    }

    #[tokio::test]
    async fn test_failure_does_not_cancel_siblings() {
        let invoker = Arc::new(
            StubInvoker::new()
                .on("a", Behavior::fail("boom"))
                .on("b", Behavior::delayed(20, "approve", 0.7)),
        );
        let run = run_topology(&ParallelExecutor, invoker, &panel(&["a", "b"]), Duration::from_secs(5)).await;

        assert!(run.degraded);
        assert_eq!(run.responses[0].failure_kind(), Some(FailureKind::Error));
        assert_eq!(run.responses[1].content, "approve");
    }

    #[tokio::test]
    async fn test_agents_run_concurrently() {
        let invoker = Arc::new(
            StubInvoker::new()
                .on("a", Behavior::delayed(100, "approve", 0.8))
                .on("b", Behavior::delayed(100, "approve", 0.8))
                .on("c", Behavior::delayed(100, "approve", 0.8)),
        );
        let started = Instant::now();
        let run = run_topology(&ParallelExecutor, invoker, &panel(&["a", "b", "c"]), Duration::from_secs(5)).await;

        assert_eq!(run.responses.len(), 3);
        assert!(started.elapsed() < Duration::from_millis(280));
    }

    #[tokio::test]
    async fn test_deadline_keeps_finished_responses() {
        let invoker = Arc::new(
            StubInvoker::new()
                .on("a", Behavior::reply("approve", 0.8))
                .on("b", Behavior::Hang),
        );
        let started = Instant::now();
        let run = run_topology(&ParallelExecutor, invoker, &panel(&["a", "b"]), Duration::from_millis(50)).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(run.timed_out);
        assert_eq!(run.responses[0].content, "approve");
        assert_eq!(run.responses[1].failure_kind(), Some(FailureKind::TimedOut));
    }
}
