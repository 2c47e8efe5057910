//! Scripted agent invoker
//!
//! Replays canned replies instead of reaching a live agent. Used for dry
//! runs and demos of a panel configuration.

use crate::config::{FileInvokerConfig, FileScriptEntry};
use async_trait::async_trait;
use consult_application::{
    AgentInvoker, AgentOutput, InvocationContext, InvocationError, InvocationRole,
};
use consult_domain::AgentDefinition;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// One canned reply
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedReply {
    pub result: Result<AgentOutput, InvocationError>,
    pub delay: Duration,
}

impl ScriptedReply {
    pub fn answer(output: AgentOutput) -> Self {
        Self {
            result: Ok(output),
            delay: Duration::ZERO,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: Err(InvocationError::RequestFailed(message.into())),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl From<&FileScriptEntry> for ScriptedReply {
    fn from(entry: &FileScriptEntry) -> Self {
        let reply = match &entry.fail {
            Some(message) => ScriptedReply::failure(message.clone()),
            None => ScriptedReply::answer(AgentOutput {
                content: entry.content.clone(),
                confidence: entry.confidence,
                structured: entry.fields.clone(),
            }),
        };
        reply.after(Duration::from_millis(entry.delay_ms))
    }
}

type ScriptKey = (String, Option<InvocationRole>);

struct Script {
    replies: Vec<ScriptedReply>,
    cursor: usize,
}

impl Script {
    /// Next reply; the last one repeats once the script runs out
    fn next(&mut self) -> Option<ScriptedReply> {
        let reply = self
            .replies
            .get(self.cursor)
            .or_else(|| self.replies.last())
            .cloned();
        self.cursor += 1;
        reply
    }
}

/// Invoker that replays scripted replies per agent and role.
///
/// A script registered for a specific [`InvocationRole`] wins over the
/// agent's role-less script. Agents without any script are reported as
/// unavailable.
#[derive(Default)]
pub struct ScriptedInvoker {
    scripts: Mutex<HashMap<ScriptKey, Script>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[[invoker.script]]` entries, in file order
    pub fn from_config(config: &FileInvokerConfig) -> Self {
        config.script.iter().fold(Self::new(), |invoker, entry| {
            invoker.with_reply(entry.agent.clone(), entry.role, ScriptedReply::from(entry))
        })
    }

    /// Append a reply for `agent`, optionally only for one role
    pub fn with_reply(
        self,
        agent: impl Into<String>,
        role: Option<InvocationRole>,
        reply: ScriptedReply,
    ) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts
                .entry((agent.into(), role))
                .or_insert_with(|| Script {
                    replies: Vec::new(),
                    cursor: 0,
                })
                .replies
                .push(reply);
        }
        self
    }

    fn next_reply(&self, agent: &str, role: InvocationRole) -> Option<ScriptedReply> {
        let mut scripts = self.scripts.lock().ok()?;
        let specific = (agent.to_string(), Some(role));
        let key = if scripts.contains_key(&specific) {
            specific
        } else {
            (agent.to_string(), None)
        };
        scripts.get_mut(&key).and_then(Script::next)
    }
}

#[async_trait]
impl AgentInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        agent: &AgentDefinition,
        _question: &str,
        context: &InvocationContext,
    ) -> Result<AgentOutput, InvocationError> {
        let reply = self
            .next_reply(agent.id.as_str(), context.role)
            .ok_or_else(|| {
                InvocationError::Unavailable(format!("no script for agent '{}'", agent.id))
            })?;

        debug!(
            "Replaying scripted {} reply for {} (round {})",
            context.role.as_str(),
            agent.id,
            context.round
        );
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;

    fn agent(id: &str) -> AgentDefinition {
        AgentDefinition::new(id, "Specialist")
    }

    async fn content(
        invoker: &ScriptedInvoker,
        id: &str,
        role: InvocationRole,
    ) -> Result<String, InvocationError> {
        invoker
            .invoke(&agent(id), "q", &InvocationContext::new(role, 1))
            .await
            .map(|o| o.content)
    }

    #[tokio::test]
    async fn test_replays_in_order_then_repeats_last() {
        let invoker = ScriptedInvoker::new()
            .with_reply("a", None, ScriptedReply::answer(AgentOutput::new("first", 0.6)))
            .with_reply("a", None, ScriptedReply::answer(AgentOutput::new("second", 0.7)));

        let panelist = InvocationRole::Panelist;
        assert_eq!(content(&invoker, "a", panelist).await.unwrap(), "first");
        assert_eq!(content(&invoker, "a", panelist).await.unwrap(), "second");
        assert_eq!(content(&invoker, "a", panelist).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_role_specific_script_wins() {
        let invoker = ScriptedInvoker::new()
            .with_reply("lead", None, ScriptedReply::answer(AgentOutput::new("answer", 0.8)))
            .with_reply(
                "lead",
                Some(InvocationRole::Decomposer),
                ScriptedReply::answer(AgentOutput::new("split", 0.9)),
            );

        assert_eq!(
            content(&invoker, "lead", InvocationRole::Decomposer).await.unwrap(),
            "split"
        );
        assert_eq!(
            content(&invoker, "lead", InvocationRole::Aggregator).await.unwrap(),
            "answer"
        );
    }

    #[tokio::test]
    async fn test_unscripted_agent_is_unavailable() {
        let invoker = ScriptedInvoker::new();
        assert!(matches!(
            content(&invoker, "ghost", InvocationRole::Panelist).await,
            Err(InvocationError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_from_config() {
        let config: FileConfig = toml::from_str(
            r#"
[[invoker.script]]
agent = "a"
content = "approve"
confidence = 0.9
fields = { recommendation = "approve" }

[[invoker.script]]
agent = "b"
fail = "service offline"
"#,
        )
        .unwrap();
        let invoker = ScriptedInvoker::from_config(&config.invoker);
        let ctx = InvocationContext::new(InvocationRole::Panelist, 1);

        let output = invoker.invoke(&agent("a"), "q", &ctx).await.unwrap();
        assert_eq!(output.confidence, 0.9);
        assert_eq!(output.structured["recommendation"], "approve");

        let failure = invoker.invoke(&agent("b"), "q", &ctx).await.unwrap_err();
        assert_eq!(
            failure,
            InvocationError::RequestFailed("service offline".into())
        );
    }

    #[tokio::test]
    async fn test_delay_is_honored() {
        let invoker = ScriptedInvoker::new().with_reply(
            "slow",
            None,
            ScriptedReply::answer(AgentOutput::new("late", 0.5)).after(Duration::from_millis(40)),
        );
        let started = std::time::Instant::now();
        content(&invoker, "slow", InvocationRole::Panelist).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
