// Data Alchemist CLI - headless data entry, validation, and rule building

mod ai;
mod exit_codes;
mod rules;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use alchemist_engine::dataset::RecordKind;
use alchemist_engine::state::AppState;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE, EXIT_VALIDATION_ISSUES};

#[derive(Parser)]
#[command(name = "alch")]
#[command(about = "Data Alchemist - tabular data validation and allocation rules (headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load data files, apply cell edits, and report validation issues
    #[command(after_help = "\
Examples:
  alch validate --clients clients.csv --workers workers.csv --tasks tasks.xlsx
  alch validate --tasks tasks.csv --set tasks:0:Duration=3
  alch validate --clients clients.csv --json")]
    Validate {
        #[command(flatten)]
        load: LoadArgs,

        /// Apply a cell edit before validating (KIND:ROW:FIELD=VALUE). Repeatable.
        #[arg(long = "set", value_name = "EDIT")]
        sets: Vec<String>,

        /// Emit issues as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Ask the AI relay a free-text question about the loaded data
    #[command(after_help = "\
Examples:
  alch ask 'which tasks have no worker with matching skills?' --tasks tasks.csv --workers workers.csv")]
    Ask {
        /// The question, in plain English
        query: String,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Build, inspect, and AI-assist allocation rules
    Rules {
        #[command(subcommand)]
        command: rules::RulesCommands,
    },

    /// AI relay operations and diagnostics
    Ai {
        #[command(subcommand)]
        command: ai::AiCommands,
    },
}

/// The three upload surfaces. Any subset may be provided; each file replaces
/// its kind's collection wholesale.
#[derive(Args)]
pub struct LoadArgs {
    /// Clients file (.csv, .xlsx)
    #[arg(long, value_name = "FILE")]
    pub clients: Option<PathBuf>,

    /// Workers file (.csv, .xlsx)
    #[arg(long, value_name = "FILE")]
    pub workers: Option<PathBuf>,

    /// Tasks file (.csv, .xlsx)
    #[arg(long, value_name = "FILE")]
    pub tasks: Option<PathBuf>,
}

impl LoadArgs {
    pub fn is_empty(&self) -> bool {
        self.clients.is_none() && self.workers.is_none() && self.tasks.is_none()
    }

    /// Ingest every provided file, echoing each status message. Files that
    /// fail leave their collection untouched.
    pub fn load(&self) -> AppState {
        let mut state = AppState::new();
        let uploads = [
            (RecordKind::Clients, &self.clients),
            (RecordKind::Workers, &self.workers),
            (RecordKind::Tasks, &self.tasks),
        ];
        for (kind, path) in uploads {
            if let Some(path) = path {
                alchemist_io::ingest(&mut state, kind, path);
                if let Some(status) = state.status() {
                    eprintln!("{}", status);
                }
            }
        }
        state
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { load, sets, json } => cmd_validate(load, sets, json),
        Commands::Ask { query, load } => ai::cmd_ask(query, load),
        Commands::Rules { command } => rules::run(command),
        Commands::Ai { command } => ai::run(command),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: exit_codes::EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Exit code without any stderr output (the command already reported).
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }

    /// Map a relay failure to the exit-code registry.
    pub fn relay(err: alchemist_relay::RelayError) -> Self {
        use alchemist_relay::RelayError;
        use exit_codes::*;

        match err {
            RelayError::Disabled => Self {
                code: EXIT_AI_DISABLED,
                message: "AI is disabled".to_string(),
                hint: Some("set ai.provider in settings.json or ALCHEMIST_AI_PROVIDER".to_string()),
            },
            RelayError::MissingKey(msg) => {
                Self { code: EXIT_AI_MISSING_KEY, message: msg, hint: None }
            }
            RelayError::Network(msg) => Self {
                code: EXIT_RELAY_NETWORK,
                message: format!("Error contacting relay: {}", msg),
                hint: None,
            },
            RelayError::Http(code, msg) => Self {
                code: EXIT_RELAY_NETWORK,
                message: format!("Relay returned HTTP {}: {}", code, msg),
                hint: None,
            },
            RelayError::Shape(msg) => {
                Self { code: EXIT_AI_BAD_REPLY, message: msg, hint: None }
            }
            RelayError::Service(msg) => {
                Self { code: EXIT_RELAY_NETWORK, message: msg, hint: None }
            }
        }
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(load: LoadArgs, sets: Vec<String>, json: bool) -> Result<(), CliError> {
    if load.is_empty() {
        return Err(CliError::usage("no input files")
            .with_hint("pass at least one of --clients, --workers, --tasks"));
    }

    let mut state = load.load();

    for edit in &sets {
        let (kind, row, field, value) = parse_edit(edit)?;
        state
            .set_cell(kind, row, field, Value::String(value.to_string()))
            .map_err(|e| CliError::usage(format!("--set {}: {}", edit, e)))?;
    }

    let issues = state.issues();

    if json {
        let out = serde_json::json!({
            "issues": issues,
            "count": issues.len(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).map_err(|e| CliError::general(e.to_string()))?
        );
    } else {
        for issue in &issues {
            println!("{}", issue);
        }
        println!("Found {} validation issues.", issues.len());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(CliError::silent(EXIT_VALIDATION_ISSUES))
    }
}

/// Parse a `--set` edit: `KIND:ROW:FIELD=VALUE`.
fn parse_edit(edit: &str) -> Result<(RecordKind, usize, &str, &str), CliError> {
    let bad = || {
        CliError::usage(format!("invalid edit '{}'", edit))
            .with_hint("expected KIND:ROW:FIELD=VALUE, e.g. tasks:0:Duration=3")
    };

    let (target, value) = edit.split_once('=').ok_or_else(bad)?;
    let mut parts = target.splitn(3, ':');
    let kind = parts
        .next()
        .and_then(RecordKind::parse)
        .ok_or_else(bad)?;
    let row: usize = parts
        .next()
        .and_then(|r| r.parse().ok())
        .ok_or_else(bad)?;
    let field = parts.next().filter(|f| !f.is_empty()).ok_or_else(bad)?;

    Ok((kind, row, field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_edit_happy_path() {
        let (kind, row, field, value) = parse_edit("tasks:2:Duration=5").unwrap();
        assert_eq!(kind, RecordKind::Tasks);
        assert_eq!(row, 2);
        assert_eq!(field, "Duration");
        assert_eq!(value, "5");
    }

    #[test]
    fn parse_edit_value_may_contain_colons() {
        let (_, _, field, value) = parse_edit("clients:0:AttributesJSON={\"a\":1}").unwrap();
        assert_eq!(field, "AttributesJSON");
        assert_eq!(value, "{\"a\":1}");
    }

    #[test]
    fn parse_edit_rejects_garbage() {
        assert!(parse_edit("tasks:2:Duration").is_err());
        assert!(parse_edit("sheets:0:A=1").is_err());
        assert!(parse_edit("tasks:x:A=1").is_err());
        assert!(parse_edit("tasks:0:=1").is_err());
    }
}
