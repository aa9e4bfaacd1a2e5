// AI configuration and secrets management
//
// API keys are stored securely using:
// 1. System keychain (preferred)
// 2. Environment variables (fallback for CI/headless)
//
// Keys are NEVER stored in settings.json

use std::env;

use crate::settings::{AiProvider, AiSettings, Settings};

/// Service name for keychain storage
const KEYCHAIN_SERVICE: &str = "alchemist";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Key retrieved from system keychain
    Keychain,
    /// Key retrieved from environment variable
    Environment,
    /// No key found
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

/// Get the environment variable name for a provider
fn env_var_name(provider: &str) -> String {
    format!("ALCHEMIST_{}_KEY", provider.to_uppercase())
}

/// Get the keychain account name for a provider
fn keychain_account(provider: &str) -> String {
    format!("ai/{}", provider.to_lowercase())
}

/// Get an API key for the specified provider
///
/// Checks in order:
/// 1. System keychain
/// 2. Environment variable (ALCHEMIST_OPENAI_KEY, etc.)
pub fn get_api_key(provider: &str) -> KeyLookup {
    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider)) {
            if let Ok(key) = entry.get_password() {
                return KeyLookup {
                    key: Some(key),
                    source: KeySource::Keychain,
                };
            }
        }
    }

    let env_name = env_var_name(provider);
    if let Ok(key) = env::var(&env_name) {
        if !key.is_empty() {
            return KeyLookup {
                key: Some(key),
                source: KeySource::Environment,
            };
        }
    }

    KeyLookup {
        key: None,
        source: KeySource::None,
    }
}

/// Store an API key in the system keychain
#[cfg(feature = "keychain")]
pub fn set_api_key(provider: &str, key: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to create keychain entry: {}", e))?;

    entry
        .set_password(key)
        .map_err(|e| format!("Failed to store key in keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn set_api_key(_provider: &str, _key: &str) -> Result<(), String> {
    Err("Keychain support not enabled. Set ALCHEMIST_<PROVIDER>_KEY environment variable instead.".to_string())
}

/// Delete an API key from the system keychain
#[cfg(feature = "keychain")]
pub fn delete_api_key(provider: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to access keychain entry: {}", e))?;

    entry
        .delete_credential()
        .map_err(|e| format!("Failed to delete key from keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn delete_api_key(_provider: &str) -> Result<(), String> {
    Err("Keychain support not enabled.".to_string())
}

/// Check if keychain support is available
pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "test").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Resolved AI Configuration (single source of truth)
// ============================================================================

/// The effective AI configuration, fully resolved from settings, keychain,
/// and environment. This is the single source of truth for runtime relay
/// behavior.
#[derive(Debug, Clone)]
pub struct ResolvedAiConfig {
    /// Effective provider (None, Local, OpenAI, Anthropic)
    pub provider: AiProvider,
    /// Effective model (resolved from settings or provider default)
    pub model: String,
    /// Endpoint override, any provider (mock servers, proxies, Ollama URL)
    pub endpoint: Option<String>,
    /// Privacy mode setting
    pub privacy_mode: bool,
    /// API key (if available and provider needs one)
    pub api_key: Option<String>,
    /// Source of the API key
    pub key_source: KeySource,
    /// Overall status
    pub status: AiConfigStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

/// Status of the AI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiConfigStatus {
    /// AI is disabled (provider = none)
    Disabled,
    /// Configuration is valid
    Ready,
    /// Provider is configured but API key is missing
    MissingKey,
}

impl AiConfigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl ResolvedAiConfig {
    /// Resolve the effective AI configuration from settings plus environment
    /// overrides (`ALCHEMIST_AI_PROVIDER` / `_MODEL` / `_ENDPOINT`). This is
    /// the single entry point for all AI config resolution.
    pub fn from_settings(settings: &AiSettings) -> Self {
        let provider = env::var("ALCHEMIST_AI_PROVIDER")
            .ok()
            .and_then(|s| AiProvider::parse(&s))
            .unwrap_or(settings.provider);

        let endpoint = env::var("ALCHEMIST_AI_ENDPOINT")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| settings.endpoint.clone());

        if !provider.is_enabled() {
            return Self {
                provider,
                model: String::new(),
                endpoint,
                privacy_mode: settings.privacy_mode,
                api_key: None,
                key_source: KeySource::None,
                status: AiConfigStatus::Disabled,
                blocking_reason: None,
            };
        }

        let model = env::var("ALCHEMIST_AI_MODEL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                let effective = if settings.model.is_empty() {
                    provider.default_model()
                } else {
                    &settings.model
                };
                effective.to_string()
            });

        let (api_key, key_source, status, blocking_reason) = if provider.needs_api_key() {
            let lookup = get_api_key(provider.name());
            match lookup.key {
                Some(key) => (Some(key), lookup.source, AiConfigStatus::Ready, None),
                None => (
                    None,
                    KeySource::None,
                    AiConfigStatus::MissingKey,
                    Some(format!(
                        "No API key found. Set via keychain or {}",
                        env_var_name(provider.name())
                    )),
                ),
            }
        } else {
            // Local provider doesn't need a key
            (None, KeySource::None, AiConfigStatus::Ready, None)
        };

        Self {
            provider,
            model,
            endpoint,
            privacy_mode: settings.privacy_mode,
            api_key,
            key_source,
            status,
            blocking_reason,
        }
    }

    /// Load settings and resolve in one call (convenience method)
    pub fn load() -> Self {
        let settings = Settings::load();
        Self::from_settings(&settings.ai)
    }

    /// Context policy description based on privacy mode
    pub fn context_policy(&self) -> &'static str {
        if self.privacy_mode {
            "headers_and_counts_only"
        } else {
            "truncated_values"
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

// ============================================================================
// Configuration Validation
// ============================================================================

/// Result of configuration validation
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Configuration is valid
    Valid(String),
    /// Configuration has issues
    Invalid(String),
    /// Validation was skipped (AI disabled)
    Skipped(String),
}

impl ValidationResult {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Valid(msg) => msg,
            Self::Invalid(msg) => msg,
            Self::Skipped(msg) => msg,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

impl ResolvedAiConfig {
    /// Validate the AI configuration: credentials present where needed.
    /// No network call — actual API validation happens on first use.
    pub fn validate_config(&self) -> ValidationResult {
        match self.status {
            AiConfigStatus::Disabled => ValidationResult::Skipped("AI is disabled".to_string()),
            AiConfigStatus::MissingKey => {
                ValidationResult::Invalid("No API key configured".to_string())
            }
            AiConfigStatus::Ready => match self.provider {
                AiProvider::Local => ValidationResult::Valid(format!(
                    "Ollama endpoint {}",
                    self.endpoint.as_deref().unwrap_or("http://localhost:11434")
                )),
                AiProvider::OpenAI | AiProvider::Anthropic => ValidationResult::Valid(format!(
                    "API key present ({})",
                    self.key_source.as_str()
                )),
                AiProvider::None => ValidationResult::Skipped("AI is disabled".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("openai"), "ALCHEMIST_OPENAI_KEY");
        assert_eq!(env_var_name("anthropic"), "ALCHEMIST_ANTHROPIC_KEY");
        assert_eq!(env_var_name("OpenAI"), "ALCHEMIST_OPENAI_KEY");
    }

    #[test]
    fn test_keychain_account() {
        assert_eq!(keychain_account("openai"), "ai/openai");
        assert_eq!(keychain_account("OpenAI"), "ai/openai");
    }

    #[test]
    fn test_key_lookup_from_env() {
        env::set_var("ALCHEMIST_TESTPROVIDER_KEY", "test-key-123");

        let lookup = get_api_key("testprovider");
        assert_eq!(lookup.source, KeySource::Environment);
        assert_eq!(lookup.key, Some("test-key-123".to_string()));

        env::remove_var("ALCHEMIST_TESTPROVIDER_KEY");
    }

    #[test]
    fn test_key_lookup_missing() {
        let lookup = get_api_key("nonexistent_provider_xyz");
        assert_eq!(lookup.source, KeySource::None);
        assert!(lookup.key.is_none());
    }

    #[test]
    fn disabled_provider_resolves_disabled() {
        let config = ResolvedAiConfig::from_settings(&AiSettings::default());
        assert_eq!(config.status, AiConfigStatus::Disabled);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn local_provider_needs_no_key() {
        let settings = AiSettings { provider: AiProvider::Local, ..Default::default() };
        let config = ResolvedAiConfig::from_settings(&settings);
        assert_eq!(config.status, AiConfigStatus::Ready);
        assert_eq!(config.model, "llama3:8b");
    }

    #[test]
    fn missing_key_blocks_cloud_provider() {
        // No keychain entry, no env var for this made-up run
        env::remove_var("ALCHEMIST_ANTHROPIC_KEY");
        let settings = AiSettings { provider: AiProvider::Anthropic, ..Default::default() };
        let config = ResolvedAiConfig::from_settings(&settings);
        if config.key_source != KeySource::Keychain {
            assert_eq!(config.status, AiConfigStatus::MissingKey);
            assert!(config.blocking_reason.is_some());
        }
    }
}
