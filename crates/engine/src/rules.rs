//! Allocation rules
//!
//! Rules are append-only constraint objects consumed by a downstream
//! allocator outside this tool. The `type` tag on the wire matches what that
//! allocator expects (`coRun`, `phaseWindow`, `slotRestriction`).
//!
//! Arity is enforced where a human builds a rule by hand (the constructors
//! below). [`RuleSet::append`] takes any well-formed rule without re-checking,
//! so rules parsed out of a relay reply land ungated; the downstream
//! allocator tolerates odd arity, a hand-typed rule should not get that
//! latitude. External JSON never becomes a `Rule` except through
//! [`parse_relay_rules`], which rejects unknown tags and mistyped fields
//! outright.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A structured allocation constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Rule {
    /// The listed tasks must be scheduled together.
    #[serde(rename = "coRun")]
    CoRun { tasks: Vec<String> },

    /// A single task may only run in the listed phases.
    #[serde(rename = "phaseWindow")]
    PhaseWindow {
        tasks: Vec<String>,
        #[serde(rename = "allowedPhases")]
        allowed_phases: Vec<i64>,
    },

    /// A worker group must share at least this many common slots.
    #[serde(rename = "slotRestriction")]
    SlotRestriction {
        group: String,
        #[serde(rename = "minCommonSlots")]
        min_common_slots: u32,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tasks: Vec<String>,
    },
}

/// Manual-builder rejection. These never fire on the relay path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// coRun needs at least two task identifiers.
    TooFewTasks(usize),
    /// phaseWindow references exactly one task.
    NotOneTask(usize),
    /// phaseWindow needs a non-empty phase list.
    NoPhases,
    /// slotRestriction needs a group label.
    NoGroup,
}

impl std::fmt::Display for RuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleError::TooFewTasks(got) => {
                write!(f, "coRun requires at least 2 task IDs (got {})", got)
            }
            RuleError::NotOneTask(got) => {
                write!(f, "phaseWindow requires exactly 1 task ID (got {})", got)
            }
            RuleError::NoPhases => write!(f, "phaseWindow requires at least one allowed phase"),
            RuleError::NoGroup => write!(f, "slotRestriction requires a group label"),
        }
    }
}

impl std::error::Error for RuleError {}

impl Rule {
    /// Build a coRun rule by hand. Rejects fewer than two tasks.
    pub fn co_run(tasks: Vec<String>) -> Result<Rule, RuleError> {
        if tasks.len() < 2 {
            return Err(RuleError::TooFewTasks(tasks.len()));
        }
        Ok(Rule::CoRun { tasks })
    }

    /// Build a phaseWindow rule by hand. Exactly one task, at least one phase.
    pub fn phase_window(tasks: Vec<String>, allowed_phases: Vec<i64>) -> Result<Rule, RuleError> {
        if tasks.len() != 1 {
            return Err(RuleError::NotOneTask(tasks.len()));
        }
        if allowed_phases.is_empty() {
            return Err(RuleError::NoPhases);
        }
        Ok(Rule::PhaseWindow { tasks, allowed_phases })
    }

    /// Build a slotRestriction rule by hand.
    pub fn slot_restriction(
        group: String,
        min_common_slots: u32,
        tasks: Vec<String>,
    ) -> Result<Rule, RuleError> {
        if group.is_empty() {
            return Err(RuleError::NoGroup);
        }
        Ok(Rule::SlotRestriction { group, min_common_slots, tasks })
    }

    /// The wire-format tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::CoRun { .. } => "coRun",
            Rule::PhaseWindow { .. } => "phaseWindow",
            Rule::SlotRestriction { .. } => "slotRestriction",
        }
    }

    pub fn tasks(&self) -> &[String] {
        match self {
            Rule::CoRun { tasks }
            | Rule::PhaseWindow { tasks, .. }
            | Rule::SlotRestriction { tasks, .. } => tasks,
        }
    }

    /// One-line display summary ("coRun: T1, T2" plus type-specific chips).
    pub fn summary(&self) -> String {
        let mut out = format!("{}: {}", self.kind(), self.tasks().join(", "));
        match self {
            Rule::PhaseWindow { allowed_phases, .. } => {
                let phases: Vec<String> = allowed_phases.iter().map(i64::to_string).collect();
                out.push_str(&format!("  Phases: {}", phases.join(",")));
            }
            Rule::SlotRestriction { group, min_common_slots, .. } => {
                out.push_str(&format!("  Group: {}  MinCommonSlots: {}", group, min_common_slots));
            }
            Rule::CoRun { .. } => {}
        }
        out
    }
}

// ── Accumulator ─────────────────────────────────────────────────────

/// Ordered, append-only rule list. No deduplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn extend(&mut self, rules: impl IntoIterator<Item = Rule>) {
        self.rules.extend(rules);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Serialize the full ordered list as formatted JSON, the `rules.json`
    /// artifact. Parsing the output back yields the in-memory list exactly.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rules)
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self { rules: iter.into_iter().collect() }
    }
}

// ── Schema gate for external JSON ───────────────────────────────────

/// Rejection from the relay-JSON schema gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleParseError {
    /// The text is not JSON at all.
    NotJson(String),
    /// The JSON is not a rule object or array of rule objects.
    NotRuleShaped(String),
    /// Element `index` failed to match any known rule shape.
    BadRule { index: usize, message: String },
}

impl std::fmt::Display for RuleParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleParseError::NotJson(msg) => write!(f, "not valid JSON: {}", msg),
            RuleParseError::NotRuleShaped(found) => {
                write!(f, "expected a rule object or array, found {}", found)
            }
            RuleParseError::BadRule { index, message } => {
                write!(f, "rule {}: {}", index, message)
            }
        }
    }
}

impl std::error::Error for RuleParseError {}

/// Parse relay-supplied text into rules.
///
/// Accepts a single rule object or an array of them. Unknown `type` tags and
/// mistyped fields are rejected; nothing reaches the accumulator on failure.
/// Arity is deliberately not checked here.
pub fn parse_relay_rules(text: &str) -> Result<Vec<Rule>, RuleParseError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| RuleParseError::NotJson(e.to_string()))?;

    let items: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        other => return Err(RuleParseError::NotRuleShaped(json_type_name(&other).to_string())),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(RuleParseError::BadRule {
                    index,
                    message: format!("expected an object, found {}", json_type_name(&item)),
                });
            }
            serde_json::from_value(item)
                .map_err(|e| RuleParseError::BadRule { index, message: e.to_string() })
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
