//! Conversational topology: rounds of discussion over a shared transcript.
//!
//! Within a round every panelist answers concurrently against the
//! transcript as it stood when the round began; their answers are appended
//! in configuration order. With debate enabled, the first delegating agent
//! closes each round (except the last) with a moderation turn. With
//! consensus required, the deliberation pipeline runs after every round and
//! the discussion stops as soon as the panel agrees.

use super::budget::invoke_agent;
use super::parallel::run_concurrently;
use super::{Executor, TopologyInput, TopologyRun};
use crate::ports::agent_invoker::{InvocationContext, InvocationRole};
use async_trait::async_trait;
use consult_domain::{Contribution, FailureKind, PromptTemplate, Stage};
use tracing::{debug, info, warn};

pub struct ConversationalExecutor;

#[async_trait]
impl Executor for ConversationalExecutor {
    async fn execute(&self, input: &TopologyInput<'_>) -> TopologyRun {
        let panel = input.panel;
        let max_rounds = panel.max_rounds();
        let moderator = if panel.allow_debate() {
            panel.first_delegating_agent()
        } else {
            None
        };
        info!(
            "Running conversation of {} agents for up to {} rounds",
            panel.agent_count(),
            max_rounds
        );

        let mut responses = Vec::new();
        let mut transcript: Vec<Contribution> = Vec::new();
        let mut rounds_completed = 0;
        let mut stopped_by_deadline = false;

        for round in 1..=max_rounds {
            if round > 1
                && let Some(reason) = input.budget.exhausted()
            {
                warn!("Conversation stopped before round {}: {:?}", round, reason);
                stopped_by_deadline = reason == FailureKind::TimedOut;
                break;
            }
            input.progress.on_round_start(round, max_rounds);

            let prompt = PromptTemplate::conversation_turn(
                input.question,
                input.history,
                &transcript,
                round,
                max_rounds,
            );
            let calls = panel
                .agents()
                .iter()
                .map(|agent| {
                    let context = InvocationContext::new(InvocationRole::Panelist, round)
                        .with_history(input.history)
                        .with_transcript(transcript.clone())
                        .with_prompt(prompt.clone());
                    (agent.clone(), context)
                })
                .collect();

            let round_responses = run_concurrently(input, calls).await;
            for (agent, response) in panel.agents().iter().zip(&round_responses) {
                if !response.is_failure() {
                    transcript.push(Contribution::from_response(response, agent.role.clone()));
                }
            }
            responses.extend(round_responses);
            rounds_completed = round;

            if panel.require_consensus() {
                let outcome =
                    input
                        .deliberation
                        .evaluate(&responses, panel, input.question, input.history);
                if outcome.consensus_reached() {
                    info!("Consensus reached after round {}", round);
                    break;
                }
                debug!("No consensus after round {}", round);
            }

            if let Some(position) = moderator
                && round < max_rounds
            {
                let agent = &panel.agents()[position];
                let context = InvocationContext::new(InvocationRole::Moderator, round)
                    .with_history(input.history)
                    .with_transcript(transcript.clone())
                    .with_prompt(PromptTemplate::moderation(input.question, &transcript, round));
                let response = invoke_agent(
                    input.invoker.as_ref(),
                    agent,
                    position,
                    input.question,
                    &context,
                    input.budget,
                )
                .await;
                input
                    .progress
                    .on_agent_complete(&Stage::Execution, &agent.id, !response.is_failure());
                if !response.is_failure() {
                    transcript.push(Contribution::from_response(
                        &response,
                        format!("{} (moderator)", agent.role),
                    ));
                }
                responses.push(response);
            }
        }

        let mut run = TopologyRun::from_responses(responses, rounds_completed);
        run.timed_out |= stopped_by_deadline;
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Behavior, StubInvoker, agents, run_topology};
    use consult_domain::{ExecutionMode, PanelConfiguration, ResponseKind};
    use std::sync::Arc;
    use std::time::Duration;

    fn builder(ids: &[&str]) -> consult_domain::PanelConfigurationBuilder {
        PanelConfiguration::builder(agents(ids)).mode(ExecutionMode::Conversational)
    }

    #[tokio::test]
    async fn test_runs_all_rounds_without_consensus_requirement() {
        let panel = builder(&["a", "b"]).max_rounds(3).build().unwrap();
        let invoker = Arc::new(
            StubInvoker::new()
                .on("a", Behavior::reply("approve", 0.8))
                .on("b", Behavior::reply("approve", 0.8)),
        );
        let run = run_topology(&ConversationalExecutor, invoker.clone(), &panel, Duration::from_secs(5)).await;

        assert_eq!(run.rounds_completed, 3);
        assert_eq!(run.responses.len(), 6);
        let rounds: Vec<usize> = run.responses.iter().map(|r| r.round).collect();
        assert_eq!(rounds, vec![1, 1, 2, 2, 3, 3]);

        // round 2 sees the whole of round 1
        let b_calls = invoker.calls_for("b");
        assert!(b_calls[0].context.transcript.is_empty());
        assert_eq!(b_calls[1].context.transcript.len(), 2);
        assert_eq!(b_calls[2].context.transcript.len(), 4);
    }

    #[tokio::test]
    async fn test_stops_early_once_consensus_is_reached() {
        let panel = builder(&["a", "b", "c"])
            .max_rounds(4)
            .require_consensus(true)
            .build()
            .unwrap();
        let invoker = Arc::new(
            StubInvoker::new()
                .on("a", Behavior::reply("approve", 0.8))
                .on("b", Behavior::reply("reject", 0.8))
                .on("b", Behavior::reply("I now approve", 0.75))
                .on("c", Behavior::reply("order more labs", 0.6)),
        );
        let run = run_topology(&ConversationalExecutor, invoker, &panel, Duration::from_secs(5)).await;

        assert_eq!(run.rounds_completed, 2);
        assert_eq!(run.responses.len(), 6);
    }

    #[tokio::test]
    async fn test_moderator_closes_each_round_but_the_last() {
        let mut ids = agents(&["a", "b"]);
        ids[1] = ids[1].clone().with_delegation(true);
        let panel = PanelConfiguration::builder(ids)
            .mode(ExecutionMode::Conversational)
            .max_rounds(2)
            .allow_debate(true)
            .build()
            .unwrap();
        let invoker = Arc::new(
            StubInvoker::new()
                .on("a", Behavior::reply("approve", 0.8))
                .on("b", Behavior::reply("reject", 0.7))
                .on_role("b", InvocationRole::Moderator, Behavior::reply("Settle the dosing", 0.9)),
        );
        let run = run_topology(&ConversationalExecutor, invoker.clone(), &panel, Duration::from_secs(5)).await;

        let moderation: Vec<_> = run
            .responses
            .iter()
            .filter(|r| r.kind == ResponseKind::Moderation)
            .collect();
        assert_eq!(moderation.len(), 1);
        assert_eq!(moderation[0].round, 1);
        assert_eq!(moderation[0].agent_id.as_str(), "b");
        // the moderator still answers as a panelist
        assert_eq!(
            run.responses
                .iter()
                .filter(|r| r.agent_id.as_str() == "b" && r.is_answer())
                .count(),
            2
        );
        let a_calls = invoker.calls_for("a");
        assert!(
            a_calls[1]
                .context
                .transcript
                .iter()
                .any(|c| c.content == "Settle the dosing")
        );
    }
}
