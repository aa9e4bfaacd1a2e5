//! AI relay commands: ask, dataset validation, key management, doctor.

use clap::Subcommand;

use alchemist_config::ai::{AiConfigStatus, ResolvedAiConfig};
use alchemist_config::settings::AiProvider;

use crate::exit_codes::{EXIT_AI_DISABLED, EXIT_AI_KEYCHAIN_ERR, EXIT_AI_MISSING_KEY};
use crate::{CliError, LoadArgs};

#[derive(Subcommand)]
pub enum AiCommands {
    /// Ask the relay to review the loaded dataset for quality issues
    Validate {
        #[command(flatten)]
        load: LoadArgs,
    },

    /// Manage API keys in the system keychain
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Check AI configuration
    Doctor {
        /// Emit diagnostics as JSON
        #[arg(long)]
        json: bool,

        /// Also validate the configuration (credentials present, etc.)
        #[arg(long)]
        test: bool,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Store a provider's API key in the keychain
    #[command(after_help = "\
The key is read from stdin when --key is omitted, keeping it out of
shell history:
  alch ai key set openai < key.txt")]
    Set {
        /// Provider the key belongs to (openai, anthropic)
        provider: String,

        /// The key itself
        #[arg(long, value_name = "KEY")]
        key: Option<String>,
    },

    /// Remove a provider's API key from the keychain
    Clear {
        /// Provider whose key to remove
        provider: String,
    },
}

pub fn run(command: AiCommands) -> Result<(), CliError> {
    match command {
        AiCommands::Validate { load } => cmd_validate_dataset(load),
        AiCommands::Key { command } => match command {
            KeyCommands::Set { provider, key } => cmd_key_set(provider, key),
            KeyCommands::Clear { provider } => cmd_key_clear(provider),
        },
        AiCommands::Doctor { json, test } => cmd_doctor(json, test),
    }
}

// ============================================================================
// ask
// ============================================================================

pub fn cmd_ask(query: String, load: LoadArgs) -> Result<(), CliError> {
    let client = crate::rules::relay_client()?;
    let snapshot = crate::rules::capture_snapshot(&load);

    let reply = client.ask(&query, &snapshot).map_err(CliError::relay)?;
    println!("{}", reply);
    Ok(())
}

// ============================================================================
// ai validate
// ============================================================================

fn cmd_validate_dataset(load: LoadArgs) -> Result<(), CliError> {
    let client = crate::rules::relay_client()?;
    let snapshot = crate::rules::capture_snapshot(&load);

    let issues = client.validate_dataset(&snapshot).map_err(CliError::relay)?;
    let out = serde_json::to_string_pretty(&issues)
        .map_err(|e| CliError::general(e.to_string()))?;
    println!("{}", out);
    Ok(())
}

// ============================================================================
// ai key
// ============================================================================

fn cmd_key_set(provider: String, key: Option<String>) -> Result<(), CliError> {
    let provider = cloud_provider(&provider)?;

    let key = match key {
        Some(key) => key,
        None => {
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .map_err(|e| CliError::general(format!("failed to read key from stdin: {}", e)))?;
            line.trim().to_string()
        }
    };
    if key.is_empty() {
        return Err(CliError::usage("empty API key"));
    }

    alchemist_config::ai::set_api_key(provider.name(), &key).map_err(keychain_err)?;
    println!("Stored {} API key in the keychain", provider.name());
    Ok(())
}

fn cmd_key_clear(provider: String) -> Result<(), CliError> {
    let provider = cloud_provider(&provider)?;
    alchemist_config::ai::delete_api_key(provider.name()).map_err(keychain_err)?;
    println!("Removed {} API key from the keychain", provider.name());
    Ok(())
}

fn cloud_provider(name: &str) -> Result<AiProvider, CliError> {
    let provider = AiProvider::parse(name)
        .ok_or_else(|| CliError::usage(format!("unknown provider '{}'", name)))?;
    if !provider.needs_api_key() {
        return Err(CliError::usage(format!(
            "provider '{}' does not use an API key",
            provider.name()
        )));
    }
    Ok(provider)
}

fn keychain_err(msg: String) -> CliError {
    CliError { code: EXIT_AI_KEYCHAIN_ERR, message: msg, hint: None }
}

// ============================================================================
// ai doctor
// ============================================================================

fn cmd_doctor(json: bool, test: bool) -> Result<(), CliError> {
    let config = ResolvedAiConfig::load();
    let keychain_available = alchemist_config::ai::keychain_available();

    let test_result = test.then(|| config.validate_config());

    if json {
        let out = serde_json::json!({
            "schema_version": 1,
            "status": config.status.as_str(),
            "blocking_reason": config.blocking_reason,
            "provider": config.provider_name(),
            "model": config.model,
            "privacy_mode": config.privacy_mode,
            "context_policy": config.context_policy(),
            "key": if config.api_key.is_some() { "present" } else { "missing" },
            "key_source": config.key_source.as_str(),
            "keychain": if keychain_available { "ok" } else { "unavailable" },
            "endpoint": config.endpoint,
            "test": match &test_result {
                None => "skipped",
                Some(result) => result.as_str(),
            },
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).map_err(|e| CliError::general(e.to_string()))?
        );
    } else {
        println!("AI Doctor");
        println!("---------");
        println!("status:          {}", config.status.as_str());
        if let Some(reason) = &config.blocking_reason {
            println!("blocking_reason: {}", reason);
        }
        println!("provider:        {}", config.provider_name());
        println!("model:           {}", if config.model.is_empty() { "(none)" } else { &config.model });
        println!("privacy_mode:    {}", config.privacy_mode);
        println!("context_policy:  {}", config.context_policy());
        println!("key:             {}", if config.api_key.is_some() { "present" } else { "missing" });
        println!("key_source:      {}", config.key_source.as_str());
        println!("keychain:        {}", if keychain_available { "ok" } else { "unavailable" });
        if let Some(endpoint) = &config.endpoint {
            println!("endpoint:        {}", endpoint);
        }
        match &test_result {
            None => println!("test:            skipped (use --test)"),
            Some(result) => println!("test:            {}", result.as_str()),
        }

        // Actionable fix suggestions
        match config.status {
            AiConfigStatus::Disabled => {
                println!();
                println!("AI is disabled. To enable:");
                println!("  Set ai.provider in ~/.config/alchemist/settings.json");
                println!("  or export ALCHEMIST_AI_PROVIDER=openai|anthropic|local");
            }
            AiConfigStatus::MissingKey => {
                println!();
                println!(
                    "Fix: set ALCHEMIST_{}_KEY or store the key in the keychain",
                    config.provider_name().to_uppercase()
                );
            }
            AiConfigStatus::Ready => {}
        }
    }

    match config.status {
        AiConfigStatus::Disabled => Err(CliError {
            code: EXIT_AI_DISABLED,
            message: "AI is disabled".to_string(),
            hint: None,
        }),
        AiConfigStatus::MissingKey => Err(CliError {
            code: EXIT_AI_MISSING_KEY,
            message: format!(
                "AI misconfigured: {}",
                config.blocking_reason.as_deref().unwrap_or("unknown")
            ),
            hint: None,
        }),
        AiConfigStatus::Ready => Ok(()),
    }
}
