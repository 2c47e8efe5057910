//! HTTP agent invoker
//!
//! Each invocation is one JSON `POST` to a configured endpoint:
//!
//! ```json
//! {"agent": {...}, "system_prompt": "...", "question": "...", "context": {...}}
//! ```
//!
//! The endpoint answers with `{"content": "...", "confidence": 0.8, "fields": {...}}`.

use crate::config::FileInvokerConfig;
use async_trait::async_trait;
use consult_application::{AgentInvoker, AgentOutput, InvocationContext, InvocationError};
use consult_domain::{AgentDefinition, PromptTemplate};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct InvokeRequest<'a> {
    agent: &'a AgentDefinition,
    system_prompt: String,
    question: &'a str,
    context: &'a InvocationContext,
}

/// Invoker that forwards every call to an HTTP endpoint
pub struct HttpAgentInvoker {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAgentInvoker {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, InvocationError> {
        Self::with_headers(endpoint, timeout, HeaderMap::new())
    }

    fn with_headers(
        endpoint: impl Into<String>,
        timeout: Duration,
        headers: HeaderMap,
    ) -> Result<Self, InvocationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| InvocationError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Build from the `[invoker]` section
    pub fn from_config(config: &FileInvokerConfig) -> Result<Self, InvocationError> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| InvocationError::Unavailable("no invoker endpoint configured".into()))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| InvocationError::Unavailable(format!("header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| InvocationError::Unavailable(format!("header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        Self::with_headers(endpoint, Duration::from_millis(config.timeout_ms), headers)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AgentInvoker for HttpAgentInvoker {
    async fn invoke(
        &self,
        agent: &AgentDefinition,
        question: &str,
        context: &InvocationContext,
    ) -> Result<AgentOutput, InvocationError> {
        debug!(
            "POST {} for {} as {}",
            self.endpoint,
            agent.id,
            context.role.as_str()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&InvokeRequest {
                agent,
                system_prompt: PromptTemplate::system(agent),
                question,
                context,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InvocationError::Timeout
                } else {
                    InvocationError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(InvocationError::RequestFailed(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<AgentOutput>()
            .await
            .map_err(|e| InvocationError::InvalidOutput(e.to_string()))
    }
}
