//! Rule subcommands: add, list, convert, recommend, check.
//!
//! Rules accumulate in a JSON file (default `rules.json`), the artifact a
//! downstream allocator consumes. Every command loads the file through the
//! schema gate, mutates in memory, and rewrites it whole.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use alchemist_engine::rules::{parse_relay_rules, Rule, RuleSet};
use alchemist_io::rules_file;
use alchemist_relay::{strip_code_fences, DatasetSnapshot, RelayClient};

use crate::exit_codes::EXIT_AI_BAD_REPLY;
use crate::{CliError, LoadArgs};

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Append a manually built rule to the rules file
    #[command(after_help = "\
Examples:
  alch rules add --type co-run --tasks T1,T2
  alch rules add --type phase-window --tasks T3 --phases 1,2,3
  alch rules add --type slot-restriction --group sales --min-common-slots 2")]
    Add {
        #[command(flatten)]
        file: RulesFileArg,

        /// Rule type
        #[arg(long = "type", value_enum)]
        rule_type: RuleTypeArg,

        /// Task IDs (comma separated)
        #[arg(long, value_delimiter = ',', value_name = "IDS")]
        tasks: Vec<String>,

        /// Allowed phases for phase-window rules (comma separated)
        #[arg(long, value_delimiter = ',', value_name = "PHASES")]
        phases: Vec<i64>,

        /// Worker group label for slot-restriction rules
        #[arg(long)]
        group: Option<String>,

        /// Minimum common slots for slot-restriction rules
        #[arg(long)]
        min_common_slots: Option<u32>,
    },

    /// Show the accumulated rules
    List {
        #[command(flatten)]
        file: RulesFileArg,

        /// Print the export artifact itself (pretty JSON)
        #[arg(long)]
        json: bool,
    },

    /// Convert a plain-English sentence into rules via the AI relay
    #[command(after_help = "\
Examples:
  alch rules convert 'tasks T1 and T2 must always run together' --tasks tasks.csv
  alch rules convert 'limit T9 to phases 1-2' --clients clients.csv --workers workers.csv --tasks tasks.csv")]
    Convert {
        /// The rule, in plain English
        query: String,

        #[command(flatten)]
        file: RulesFileArg,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Ask the AI relay to recommend rules for the loaded dataset
    Recommend {
        #[command(flatten)]
        file: RulesFileArg,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Ask the AI relay to flag problems in the accumulated rules
    Check {
        #[command(flatten)]
        file: RulesFileArg,
    },
}

#[derive(Args)]
pub struct RulesFileArg {
    /// Rules file to read and append to
    #[arg(long = "file", value_name = "FILE", default_value = "rules.json")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleTypeArg {
    /// Tasks that must be scheduled together
    CoRun,
    /// Restrict one task to specific phases
    PhaseWindow,
    /// Require a worker group to share common slots
    SlotRestriction,
}

pub fn run(command: RulesCommands) -> Result<(), CliError> {
    match command {
        RulesCommands::Add { file, rule_type, tasks, phases, group, min_common_slots } => {
            cmd_add(file, rule_type, tasks, phases, group, min_common_slots)
        }
        RulesCommands::List { file, json } => cmd_list(file, json),
        RulesCommands::Convert { query, file, load } => cmd_convert(query, file, load),
        RulesCommands::Recommend { file, load } => cmd_recommend(file, load),
        RulesCommands::Check { file } => cmd_check(file),
    }
}

// ── add / list ──────────────────────────────────────────────────────

fn cmd_add(
    file: RulesFileArg,
    rule_type: RuleTypeArg,
    tasks: Vec<String>,
    phases: Vec<i64>,
    group: Option<String>,
    min_common_slots: Option<u32>,
) -> Result<(), CliError> {
    let tasks: Vec<String> = tasks.into_iter().filter(|t| !t.is_empty()).collect();

    let rule = match rule_type {
        RuleTypeArg::CoRun => Rule::co_run(tasks),
        RuleTypeArg::PhaseWindow => Rule::phase_window(tasks, phases),
        RuleTypeArg::SlotRestriction => {
            let group = group.ok_or_else(|| {
                CliError::usage("slot-restriction requires --group")
            })?;
            let slots = min_common_slots.ok_or_else(|| {
                CliError::usage("slot-restriction requires --min-common-slots")
            })?;
            Rule::slot_restriction(group, slots, tasks)
        }
    }
    .map_err(|e| CliError::usage(e.to_string()))?;

    let mut rules = load_rules(&file)?;
    rules.append(rule);
    save_rules(&file, &rules)?;

    println!("Added {} rule ({} total)", rules.rules()[rules.len() - 1].kind(), rules.len());
    Ok(())
}

fn cmd_list(file: RulesFileArg, json: bool) -> Result<(), CliError> {
    let rules = load_rules(&file)?;

    if json {
        let out = rules.export_json().map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    if rules.is_empty() {
        println!("No rules yet.");
        return Ok(());
    }
    for (idx, rule) in rules.rules().iter().enumerate() {
        println!("{:>3}. {}", idx + 1, rule.summary());
    }
    Ok(())
}

// ── relay-assisted commands ─────────────────────────────────────────

fn cmd_convert(query: String, file: RulesFileArg, load: LoadArgs) -> Result<(), CliError> {
    let client = relay_client()?;
    let snapshot = capture_snapshot(&load);

    let reply = client.ask(&query, &snapshot).map_err(CliError::relay)?;
    println!("AI Result:\n{}", reply);

    // The reply is free text; only a JSON-shaped rule (or list) merges.
    let parsed = match parse_relay_rules(strip_code_fences(&reply)) {
        Ok(rules) => rules,
        Err(e) => {
            return Err(CliError {
                code: EXIT_AI_BAD_REPLY,
                message: "Could not parse AI output as valid rules.".to_string(),
                hint: Some(e.to_string()),
            })
        }
    };

    let mut rules = load_rules(&file)?;
    let added = parsed.len();
    rules.extend(parsed);
    save_rules(&file, &rules)?;

    println!("Added {} rule(s) ({} total)", added, rules.len());
    Ok(())
}

fn cmd_recommend(file: RulesFileArg, load: LoadArgs) -> Result<(), CliError> {
    let client = relay_client()?;
    let snapshot = capture_snapshot(&load);

    let reply = client.recommend_rules(&snapshot).map_err(CliError::relay)?;
    let parsed = parse_relay_rules(&reply).map_err(|e| CliError {
        code: EXIT_AI_BAD_REPLY,
        message: "Could not parse AI recommendations as rules.".to_string(),
        hint: Some(e.to_string()),
    })?;

    let mut rules = load_rules(&file)?;
    let added = parsed.len();
    for rule in &parsed {
        println!("+ {}", rule.summary());
    }
    rules.extend(parsed);
    save_rules(&file, &rules)?;

    println!("AI recommendations added: {} rule(s) ({} total)", added, rules.len());
    Ok(())
}

fn cmd_check(file: RulesFileArg) -> Result<(), CliError> {
    let rules = load_rules(&file)?;
    let rules_json = rules.export_json().map_err(|e| CliError::general(e.to_string()))?;

    let client = relay_client()?;
    let issues = client.check_rules(&rules_json).map_err(CliError::relay)?;

    let out = serde_json::to_string_pretty(&issues)
        .map_err(|e| CliError::general(e.to_string()))?;
    println!("{}", out);
    Ok(())
}

// ── shared helpers ──────────────────────────────────────────────────

pub(crate) fn relay_client() -> Result<RelayClient, CliError> {
    let config = alchemist_config::ai::ResolvedAiConfig::load();
    RelayClient::from_config(&config).map_err(CliError::relay)
}

pub(crate) fn capture_snapshot(load: &LoadArgs) -> DatasetSnapshot {
    let config = alchemist_config::ai::ResolvedAiConfig::load();
    let state = load.load();
    DatasetSnapshot::capture(&state.dataset, config.privacy_mode)
}

fn load_rules(file: &RulesFileArg) -> Result<RuleSet, CliError> {
    rules_file::load_or_default(&file.path).map_err(CliError::general)
}

fn save_rules(file: &RulesFileArg, rules: &RuleSet) -> Result<(), CliError> {
    rules_file::save(&file.path, rules).map_err(CliError::general)
}
