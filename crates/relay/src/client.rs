//! Relay HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). One request per
//! operation: no streaming, no retry, and deliberately no timeout — a hung
//! relay hangs the invocation, and transient failures surface verbatim.

use serde_json::Value;

use alchemist_config::ai::{AiConfigStatus, ResolvedAiConfig};
use alchemist_config::settings::AiProvider;

use crate::prompt;
use crate::snapshot::DatasetSnapshot;

/// Error type for relay operations.
#[derive(Debug)]
pub enum RelayError {
    /// AI features are disabled (provider = none)
    Disabled,
    /// Provider configured but no API key found
    MissingKey(String),
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Relay answered, but not in the shape the endpoint requires
    Shape(String),
    /// Relay reported an error of its own ({"error": ...} payload)
    Service(String),
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Disabled => write!(f, "AI is disabled (provider=none)"),
            RelayError::MissingKey(msg) => write!(f, "{}", msg),
            RelayError::Network(msg) => write!(f, "Network error: {}", msg),
            RelayError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            RelayError::Shape(msg) => write!(f, "Unexpected relay response: {}", msg),
            RelayError::Service(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RelayError {}

/// Relay client (blocking). One instance per resolved configuration.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::blocking::Client,
    provider: AiProvider,
    model: String,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl RelayClient {
    /// Build a client from the resolved configuration. Disabled or
    /// key-less configurations never produce a client.
    pub fn from_config(config: &ResolvedAiConfig) -> Result<Self, RelayError> {
        match config.status {
            AiConfigStatus::Disabled => return Err(RelayError::Disabled),
            AiConfigStatus::MissingKey => {
                return Err(RelayError::MissingKey(
                    config
                        .blocking_reason
                        .clone()
                        .unwrap_or_else(|| "No API key configured".to_string()),
                ))
            }
            AiConfigStatus::Ready => {}
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("alch/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::Network(e.to_string()))?;

        Ok(Self {
            http,
            provider: config.provider,
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    // ── Relay operations (endpoints A-D) ────────────────────────────

    /// Endpoint A: free-text query plus dataset snapshot → result text.
    pub fn ask(&self, query: &str, snapshot: &DatasetSnapshot) -> Result<String, RelayError> {
        self.complete(&prompt::query_prompt(snapshot, query))
    }

    /// Endpoint B: dataset snapshot → list of data-quality issues.
    pub fn validate_dataset(&self, snapshot: &DatasetSnapshot) -> Result<Vec<Value>, RelayError> {
        let reply = self.complete(&prompt::validate_prompt(snapshot))?;
        extract_array(&reply, "issues")
    }

    /// Endpoint C: dataset snapshot → recommended rules as raw JSON text.
    /// The engine's schema gate decides what actually merges.
    pub fn recommend_rules(&self, snapshot: &DatasetSnapshot) -> Result<String, RelayError> {
        let reply = self.complete(&prompt::recommend_prompt(snapshot))?;
        let rules = extract_array(&reply, "rules")?;
        serde_json::to_string(&rules).map_err(|e| RelayError::Shape(e.to_string()))
    }

    /// Endpoint D: current rule list → list of rule issues.
    pub fn check_rules(&self, rules_json: &str) -> Result<Vec<Value>, RelayError> {
        let reply = self.complete(&prompt::rule_check_prompt(rules_json))?;
        extract_array(&reply, "issues")
    }

    // ── Provider dispatch ───────────────────────────────────────────

    /// One completion round-trip: prompt in, reply text out.
    fn complete(&self, prompt: &str) -> Result<String, RelayError> {
        match self.provider {
            AiProvider::OpenAI => self.complete_openai(prompt),
            AiProvider::Anthropic => self.complete_anthropic(prompt),
            AiProvider::Local => self.complete_ollama(prompt),
            AiProvider::None => Err(RelayError::Disabled),
        }
    }

    fn base(&self, default: &str) -> String {
        let base = self.endpoint.as_deref().unwrap_or(default);
        base.trim_end_matches('/').to_string()
    }

    fn complete_openai(&self, prompt: &str) -> Result<String, RelayError> {
        let url = format!("{}/v1/chat/completions", self.base("https://api.openai.com"));
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let request = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.as_deref().unwrap_or_default())
            .json(&body);
        let json = send(request)?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RelayError::Shape("missing choices[0].message.content".to_string()))
    }

    fn complete_anthropic(&self, prompt: &str) -> Result<String, RelayError> {
        let url = format!("{}/v1/messages", self.base("https://api.anthropic.com"));
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 1024,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let request = self
            .http
            .post(&url)
            .header("x-api-key", self.api_key.as_deref().unwrap_or_default())
            .header("anthropic-version", "2023-06-01")
            .json(&body);
        let json = send(request)?;

        json["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RelayError::Shape("missing content[0].text".to_string()))
    }

    fn complete_ollama(&self, prompt: &str) -> Result<String, RelayError> {
        let url = format!("{}/api/chat", self.base("http://localhost:11434"));
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
        });

        let json = send(self.http.post(&url).json(&body))?;

        json["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RelayError::Shape("missing message.content".to_string()))
    }
}

// ── Free functions ──────────────────────────────────────────────────

fn send(request: reqwest::blocking::RequestBuilder) -> Result<Value, RelayError> {
    let response = request.send().map_err(|e| RelayError::Network(e.to_string()))?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().unwrap_or_default();
        return Err(RelayError::Http(status, error_message(&body)));
    }

    response
        .json::<Value>()
        .map_err(|e| RelayError::Shape(e.to_string()))
}

/// Pull a human-readable message out of a provider error body, falling back
/// to the raw body.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json["error"]["message"].as_str() {
            return msg.to_string();
        }
        if let Some(msg) = json["error"].as_str() {
            return msg.to_string();
        }
    }
    body.to_string()
}

/// Parse a JSON-expecting reply and pull out the named array field.
/// An `{"error": ...}` payload is the relay's own failure, relayed verbatim.
fn extract_array(reply: &str, field: &str) -> Result<Vec<Value>, RelayError> {
    let payload: Value = serde_json::from_str(strip_code_fences(reply))
        .map_err(|e| RelayError::Shape(format!("expected JSON, got: {}", e)))?;

    if let Some(msg) = payload["error"].as_str() {
        return Err(RelayError::Service(msg.to_string()));
    }

    payload[field]
        .as_array()
        .cloned()
        .ok_or_else(|| RelayError::Shape(format!("missing \"{}\" array", field)))
}

/// Strip a Markdown code fence (```json ... ```) wrapped around a reply.
/// Models love fences; the parsers downstream do not.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(stripped) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", …) on the opening fence line
    match stripped.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => stripped.trim(),
    }
}
