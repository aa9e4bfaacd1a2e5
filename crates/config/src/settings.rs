// Application settings
// Loaded from ~/.config/alchemist/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// AI provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// AI features disabled (default)
    #[default]
    None,
    /// Local model via Ollama
    Local,
    /// OpenAI API
    #[serde(rename = "openai")]
    OpenAI,
    /// Anthropic API
    Anthropic,
}

impl AiProvider {
    /// Returns true if AI features are enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AiProvider::None)
    }

    /// Whether this provider needs an API key
    pub fn needs_api_key(&self) -> bool {
        matches!(self, AiProvider::OpenAI | AiProvider::Anthropic)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AiProvider::None => "none",
            AiProvider::Local => "local",
            AiProvider::OpenAI => "openai",
            AiProvider::Anthropic => "anthropic",
        }
    }

    pub fn parse(s: &str) -> Option<AiProvider> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Some(AiProvider::None),
            "local" => Some(AiProvider::Local),
            "openai" => Some(AiProvider::OpenAI),
            "anthropic" => Some(AiProvider::Anthropic),
            _ => None,
        }
    }

    /// Returns the default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::None => "",
            AiProvider::Local => "llama3:8b",
            AiProvider::OpenAI => "gpt-3.5-turbo",
            AiProvider::Anthropic => "claude-sonnet-4-20250514",
        }
    }
}

/// AI-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Selected AI provider
    pub provider: AiProvider,

    /// Model identifier (provider-specific, empty = provider default)
    pub model: String,

    /// Privacy mode: dataset snapshots carry headers and row counts only,
    /// never cell values
    pub privacy_mode: bool,

    /// Custom endpoint override (Ollama URL, proxy, mock server)
    pub endpoint: Option<String>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: AiProvider::None,
            model: String::new(),
            privacy_mode: false,
            endpoint: None,
        }
    }
}

impl AiSettings {
    /// Get the effective model (user-specified or provider default)
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "ai")]
    pub ai: AiSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("alchemist");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file();
            return settings;
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&strip_comments(&contents)) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("Error parsing settings.json: {}", e);
                    eprintln!("Using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading settings.json: {}", e);
                Self::default()
            }
        }
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(&path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self) {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // AI relay (disabled by default)
    // Provider options: "none", "local", "openai", "anthropic"
    // API keys are stored in the system keychain or ALCHEMIST_<PROVIDER>_KEY,
    // never in this file
    "ai": {
        "provider": "none",
        "model": "",
        "privacy_mode": false,
        "endpoint": null
    }
}
"#;

        if let Err(e) = fs::write(&path, default_config) {
            eprintln!("Error writing default settings.json: {}", e);
        }
    }
}

/// Strip `//` comment lines so the hand-edited file stays parseable
fn strip_comments(contents: &str) -> String {
    contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}
