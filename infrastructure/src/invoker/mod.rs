//! Agent invoker adapters
//!
//! - [`ScriptedInvoker`]: canned replies from configuration
//! - [`HttpAgentInvoker`]: JSON over HTTP (feature `http`)
//! - [`ConfiguredInvoker`]: whichever of the two `[invoker]` selects

#[cfg(feature = "http")]
mod http;
mod scripted;

#[cfg(feature = "http")]
pub use http::HttpAgentInvoker;
pub use scripted::{ScriptedInvoker, ScriptedReply};

use crate::config::{FileInvokerConfig, InvokerKind};
use async_trait::async_trait;
use consult_application::{AgentInvoker, AgentOutput, InvocationContext, InvocationError};
use consult_domain::AgentDefinition;

/// The invoker adapter selected by configuration
pub enum ConfiguredInvoker {
    Scripted(ScriptedInvoker),
    #[cfg(feature = "http")]
    Http(HttpAgentInvoker),
}

impl ConfiguredInvoker {
    pub fn from_config(config: &FileInvokerConfig) -> Result<Self, InvocationError> {
        match config.kind {
            InvokerKind::Scripted => Ok(Self::Scripted(ScriptedInvoker::from_config(config))),
            #[cfg(feature = "http")]
            InvokerKind::Http => HttpAgentInvoker::from_config(config).map(Self::Http),
            #[cfg(not(feature = "http"))]
            InvokerKind::Http => Err(InvocationError::Unavailable(
                "the http invoker requires the `http` feature".into(),
            )),
        }
    }

    pub fn kind(&self) -> InvokerKind {
        match self {
            Self::Scripted(_) => InvokerKind::Scripted,
            #[cfg(feature = "http")]
            Self::Http(_) => InvokerKind::Http,
        }
    }
}

#[async_trait]
impl AgentInvoker for ConfiguredInvoker {
    async fn invoke(
        &self,
        agent: &AgentDefinition,
        question: &str,
        context: &InvocationContext,
    ) -> Result<AgentOutput, InvocationError> {
        match self {
            Self::Scripted(invoker) => invoker.invoke(agent, question, context).await,
            #[cfg(feature = "http")]
            Self::Http(invoker) => invoker.invoke(agent, question, context).await,
        }
    }
}
