//! External report model strategy.
//!
//! The generator calls an injected `ReportModel`; any error it returns sends
//! the report down the rule-based path. `OllamaReportModel` talks to a local
//! Ollama server. `ScriptedModel` replays canned replies for tests.

use crate::config::ModelConfig;
use async_trait::async_trait;
use phantom_shared::{PhantomError, ReportData};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

const SHAPE_INSTRUCTION: &str = "Respond with only a JSON object containing the string fields \
\"location\", \"quality\", \"intensity\", \"recommendation\" and \"summary\".";

// ============================================================================
// Model Trait
// ============================================================================

#[async_trait]
pub trait ReportModel: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Produce a complete report for `prompt`, or fail
    async fn generate(&self, prompt: &str) -> Result<ReportData, PhantomError>;
}

// ============================================================================
// Ollama Backend
// ============================================================================

pub struct OllamaReportModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaReportModel {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self, PhantomError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PhantomError::Model(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &ModelConfig, timeout: Duration) -> Result<Self, PhantomError> {
        Self::new(&config.endpoint, &config.model, timeout)
    }
}

#[async_trait]
impl ReportModel for OllamaReportModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<ReportData, PhantomError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": format!("{}\n\n{}", prompt, SHAPE_INSTRUCTION),
            "stream": false
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| PhantomError::Model(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PhantomError::Model(format!(
                "request failed: {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PhantomError::Model(e.to_string()))?;
        let text = json
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("");

        debug!("Model {} replied with {} bytes", self.model, text.len());
        parse_report_response(text)
    }
}

/// Parse a model reply into a complete report
pub fn parse_report_response(text: &str) -> Result<ReportData, PhantomError> {
    let json = extract_json(text)
        .ok_or_else(|| PhantomError::MalformedReport("no JSON object in reply".to_string()))?;
    let report: ReportData = serde_json::from_str(json)?;
    report.validate()?;
    Ok(report)
}

/// Locate the JSON object in a reply: bare, ```json fenced, plain fenced,
/// or embedded in prose
fn extract_json(text: &str) -> Option<&str> {
    let t = text.trim();
    if t.starts_with('{') && t.ends_with('}') {
        return Some(t);
    }

    if let Some(start) = t.find("```json") {
        let body = &t[start + 7..];
        if let Some(end) = body.find("```") {
            let inner = body[..end].trim();
            if !inner.is_empty() {
                return Some(inner);
            }
        }
    }

    if let Some(start) = t.find("```") {
        let body = &t[start + 3..];
        if let Some(end) = body.find("```") {
            let inner = body[..end].trim();
            if let Some(brace) = inner.find('{') {
                return Some(&inner[brace..]);
            }
        }
    }

    match (t.find('{'), t.rfind('}')) {
        (Some(s), Some(e)) if s < e => Some(&t[s..=e]),
        _ => None,
    }
}

// ============================================================================
// Scripted Model (Testing)
// ============================================================================

/// One canned reply
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Report(ReportData),
    /// Raw model text, run through `parse_report_response`
    Raw(String),
    Fail(String),
    /// Never completes
    Hang,
}

/// Model that replays scripted replies in order, optionally after a delay
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Option<ScriptedReply> {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
    }
}

#[async_trait]
impl ReportModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str) -> Result<ReportData, PhantomError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.next_reply();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match reply {
            Some(ScriptedReply::Report(report)) => Ok(report),
            Some(ScriptedReply::Raw(text)) => parse_report_response(&text),
            Some(ScriptedReply::Fail(msg)) => Err(PhantomError::Model(msg)),
            Some(ScriptedReply::Hang) => std::future::pending().await,
            None => Err(PhantomError::Model("no scripted reply left".to_string())),
        }
    }
}
