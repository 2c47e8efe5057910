//! Invoker configuration from TOML (`[invoker]` section)

use super::ConfigValidationError;
use consult_application::InvocationRole;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Which agent invoker adapter backs the consultation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvokerKind {
    /// Replay `[[invoker.script]]` entries
    #[default]
    Scripted,
    /// POST to `endpoint`
    Http,
}

/// Raw invoker configuration from TOML
///
/// # Example
///
/// ```toml
/// [invoker]
/// kind = "http"
/// endpoint = "http://localhost:8080/agents/invoke"
/// timeout_ms = 60000
///
/// [invoker.headers]
/// x-team = "oncology"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileInvokerConfig {
    pub kind: InvokerKind,
    /// HTTP endpoint (required for `kind = "http"`)
    pub endpoint: Option<String>,
    /// Per-request timeout for HTTP calls
    pub timeout_ms: u64,
    /// Extra HTTP headers
    pub headers: BTreeMap<String, String>,
    pub script: Vec<FileScriptEntry>,
}

impl Default for FileInvokerConfig {
    fn default() -> Self {
        Self {
            kind: InvokerKind::default(),
            endpoint: None,
            timeout_ms: 60_000,
            headers: BTreeMap::new(),
            script: Vec::new(),
        }
    }
}

/// One canned reply for the scripted invoker.
///
/// Entries for the same agent (and role) are replayed in order; the last
/// one repeats once the script runs out.
///
/// ```toml
/// [[invoker.script]]
/// agent = "cardiology"
/// content = "Approve with monitoring"
/// confidence = 0.8
/// fields = { recommendation = "approve" }
/// delay_ms = 200
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileScriptEntry {
    pub agent: String,
    /// Only replay for this invocation role
    pub role: Option<InvocationRole>,
    pub content: String,
    pub confidence: f64,
    pub fields: BTreeMap<String, Value>,
    pub delay_ms: u64,
    /// Fail with this message instead of replying
    pub fail: Option<String>,
}

impl Default for FileScriptEntry {
    fn default() -> Self {
        Self {
            agent: String::new(),
            role: None,
            content: String::new(),
            confidence: 0.5,
            fields: BTreeMap::new(),
            delay_ms: 0,
            fail: None,
        }
    }
}

impl FileInvokerConfig {
    pub(super) fn validate(&self, agent_ids: &[&str]) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.kind == InvokerKind::Http
            && self.endpoint.as_deref().is_none_or(|e| e.trim().is_empty())
        {
            errors.push(ConfigValidationError::MissingEndpoint);
        }
        for entry in &self.script {
            if !agent_ids.contains(&entry.agent.as_str()) {
                errors.push(ConfigValidationError::UnknownScriptAgent(
                    entry.agent.clone(),
                ));
            }
        }

        errors
    }
}
