//! Hierarchical topology: a lead decomposes, delegates and aggregates.

use super::budget::invoke_agent;
use super::{Executor, TopologyInput, TopologyRun};
use crate::ports::agent_invoker::{InvocationContext, InvocationRole};
use async_trait::async_trait;
use consult_domain::{AgentDefinition, Contribution, PromptTemplate, Stage};
use tracing::{info, warn};

/// The lead is the first agent allowed to delegate, or the first agent.
/// Delegates run one at a time with delegation disabled, so the hierarchy
/// never grows past one level. If the decomposition call fails, delegates
/// get the raw question as their instruction and the run is degraded.
pub struct HierarchicalExecutor;

#[async_trait]
impl Executor for HierarchicalExecutor {
    async fn execute(&self, input: &TopologyInput<'_>) -> TopologyRun {
        let agents = input.panel.agents();
        let lead_position = input.panel.first_delegating_agent().unwrap_or(0);
        let lead = &agents[lead_position];
        let delegates: Vec<(usize, AgentDefinition)> = agents
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != lead_position)
            .map(|(position, agent)| (position, agent.as_delegate()))
            .collect();
        info!("Lead {} delegating to {} agents", lead.id, delegates.len());

        let mut responses = Vec::with_capacity(agents.len() + 1);

        if delegates.is_empty() {
            let context = InvocationContext::new(InvocationRole::Panelist, 1)
                .with_history(input.history)
                .with_prompt(PromptTemplate::initial_query(input.question, input.history));
            let response = self.call(input, lead, lead_position, &context).await;
            responses.push(response);
            return TopologyRun::from_responses(responses, 1);
        }

        let roster: Vec<&AgentDefinition> = delegates.iter().map(|(_, d)| d).collect();
        let context = InvocationContext::new(InvocationRole::Decomposer, 1)
            .with_history(input.history)
            .with_prompt(PromptTemplate::decomposition(
                input.question,
                input.history,
                &roster,
            ));
        let decomposition = self.call(input, lead, lead_position, &context).await;
        let decomposition_failed = decomposition.is_failure();
        let instruction = if decomposition_failed {
            warn!("Decomposition by {} failed; delegates get the raw question", lead.id);
            input.question.to_string()
        } else {
            decomposition.content.clone()
        };
        responses.push(decomposition);

        let mut findings = Vec::with_capacity(delegates.len());
        for (position, delegate) in &delegates {
            let context = InvocationContext::new(InvocationRole::Delegate, 1)
                .with_history(input.history)
                .with_instruction(instruction.clone())
                .with_prompt(PromptTemplate::delegated_task(input.question, &instruction));
            let response = self.call(input, delegate, *position, &context).await;
            if !response.is_failure() {
                findings.push(Contribution::from_response(&response, delegate.role.clone()));
            }
            responses.push(response);
        }

        let context = InvocationContext::new(InvocationRole::Aggregator, 1)
            .with_history(input.history)
            .with_transcript(findings.clone())
            .with_prompt(PromptTemplate::aggregation(input.question, &findings));
        let aggregate = self.call(input, lead, lead_position, &context).await;
        responses.push(aggregate);

        let mut run = TopologyRun::from_responses(responses, 1);
        run.degraded |= decomposition_failed;
        run
    }
}

impl HierarchicalExecutor {
    async fn call(
        &self,
        input: &TopologyInput<'_>,
        agent: &AgentDefinition,
        position: usize,
        context: &InvocationContext,
    ) -> consult_domain::AgentResponse {
        let response = invoke_agent(
            input.invoker.as_ref(),
            agent,
            position,
            input.question,
            context,
            input.budget,
        )
        .await;
        input
            .progress
            .on_agent_complete(&Stage::Execution, &agent.id, !response.is_failure());
        response
    }
}
