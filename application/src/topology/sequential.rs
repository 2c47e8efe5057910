//! Sequential topology: agents answer one after another in configuration
//! order, each seeing the successful answers before it.

use super::budget::invoke_agent;
use super::{Executor, TopologyInput, TopologyRun};
use crate::ports::agent_invoker::{InvocationContext, InvocationRole};
use async_trait::async_trait;
use consult_domain::{Contribution, PromptTemplate, Stage};
use tracing::{info, warn};

pub struct SequentialExecutor;

#[async_trait]
impl Executor for SequentialExecutor {
    async fn execute(&self, input: &TopologyInput<'_>) -> TopologyRun {
        let agents = input.panel.agents();
        info!("Running {} agents sequentially", agents.len());

        let mut responses = Vec::with_capacity(agents.len());
        let mut prior: Vec<Contribution> = Vec::new();

        for (position, agent) in agents.iter().enumerate() {
            let context = InvocationContext::new(InvocationRole::Panelist, 1)
                .with_history(input.history)
                .with_prior_outputs(prior.clone())
                .with_prompt(PromptTemplate::sequential_query(
                    input.question,
                    input.history,
                    &prior,
                ));

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
            if response.is_failure() {
                warn!("Agent {} contributes no context to later agents", agent.id);
            } else {
                prior.push(Contribution::from_response(&response, agent.role.clone()));
            }
            responses.push(response);
        }

        TopologyRun::from_responses(responses, 1)
    }
}
