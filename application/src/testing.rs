//! Scripted invoker used by the unit tests of this crate.

use crate::ports::agent_invoker::{
    AgentInvoker, AgentOutput, InvocationContext, InvocationError, InvocationRole,
};
use async_trait::async_trait;
use consult_domain::AgentDefinition;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// How the stub answers one call
#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(AgentOutput),
    Delayed(Duration, AgentOutput),
    Fail(String),
    Hang,
}

impl Behavior {
    pub fn reply(content: &str, confidence: f64) -> Self {
        Behavior::Reply(AgentOutput::new(content, confidence))
    }

    pub fn delayed(ms: u64, content: &str, confidence: f64) -> Self {
        Behavior::Delayed(Duration::from_millis(ms), AgentOutput::new(content, confidence))
    }

    pub fn fail(message: &str) -> Self {
        Behavior::Fail(message.to_string())
    }
}

/// One recorded call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub agent_id: String,
    pub allow_delegation: bool,
    pub question: String,
    pub context: InvocationContext,
}

/// Invoker replaying scripted behaviors per agent (and optionally per role).
///
/// A script with several entries is consumed one call at a time; its last
/// entry repeats. Agents without a script fail.
#[derive(Default)]
pub struct StubInvoker {
    scripts: Mutex<HashMap<(String, Option<InvocationRole>), VecDeque<Behavior>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, agent: &str, behavior: Behavior) -> Self {
        self.push((agent.to_string(), None), behavior);
        self
    }

    pub fn on_role(self, agent: &str, role: InvocationRole, behavior: Behavior) -> Self {
        self.push((agent.to_string(), Some(role)), behavior);
        self
    }

    fn push(&self, key: (String, Option<InvocationRole>), behavior: Behavior) {
        self.scripts
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .push_back(behavior);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, agent: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.agent_id == agent)
            .collect()
    }

    fn next_behavior(&self, agent: &str, role: InvocationRole) -> Option<Behavior> {
        let mut scripts = self.scripts.lock().unwrap();
        let role_key = (agent.to_string(), Some(role));
        let key = if scripts.contains_key(&role_key) {
            role_key
        } else {
            (agent.to_string(), None)
        };
        let script = scripts.get_mut(&key)?;
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }
}

#[async_trait]
impl AgentInvoker for StubInvoker {
    async fn invoke(
        &self,
        agent: &AgentDefinition,
        question: &str,
        context: &InvocationContext,
    ) -> Result<AgentOutput, InvocationError> {
        self.calls.lock().unwrap().push(RecordedCall {
            agent_id: agent.id.to_string(),
            allow_delegation: agent.allow_delegation,
            question: question.to_string(),
            context: context.clone(),
        });

        match self.next_behavior(agent.id.as_str(), context.role) {
            Some(Behavior::Reply(output)) => Ok(output),
            Some(Behavior::Delayed(delay, output)) => {
                tokio::time::sleep(delay).await;
                Ok(output)
            }
            Some(Behavior::Fail(message)) => Err(InvocationError::RequestFailed(message)),
            Some(Behavior::Hang) => std::future::pending().await,
            None => Err(InvocationError::Unavailable(agent.id.to_string())),
        }
    }
}

pub fn agents(ids: &[&str]) -> Vec<AgentDefinition> {
    ids.iter()
        .map(|id| AgentDefinition::new(*id, format!("{} specialist", id)))
        .collect()
}

pub const QUESTION: &str = "Approve the treatment plan?";

/// Run one topology against a stub with default deliberation settings
pub async fn run_topology(
    executor: &dyn crate::topology::Executor,
    invoker: std::sync::Arc<StubInvoker>,
    panel: &consult_domain::PanelConfiguration,
    timeout: Duration,
) -> crate::topology::TopologyRun {
    use consult_domain::{Deliberation, DeliberationSettings, PolarityComparator};

    let budget = crate::topology::InvocationBudget::new(timeout);
    let deliberation = Deliberation::new(
        std::sync::Arc::new(PolarityComparator::new()),
        DeliberationSettings::default(),
    );
    let input = crate::topology::TopologyInput {
        invoker,
        panel,
        question: QUESTION,
        history: &[],
        budget: &budget,
        deliberation: &deliberation,
        progress: &crate::ports::progress::NoProgress,
    };
    executor.execute(&input).await
}
