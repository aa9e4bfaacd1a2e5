// Application state - single owner of the dataset, rules, and status line

use serde_json::Value;

use crate::dataset::{Dataset, RecordKind};
use crate::record::Record;
use crate::rules::{Rule, RuleSet};
use crate::validation::{self, Issue};

/// The whole application state, mutated only through the named entry points
/// below. Nothing here persists; state lives and dies with the process.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub dataset: Dataset,
    pub rules: RuleSet,
    status: Option<String>,
}

/// Cell-edit rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    RowOutOfBounds { kind: RecordKind, row: usize, len: usize },
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::RowOutOfBounds { kind, row, len } => {
                write!(f, "{} has {} rows, no row {}", kind, len, row)
            }
        }
    }
}

impl std::error::Error for EditError {}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last status message, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Replace a kind's collection wholesale (successful file upload).
    pub fn replace_records(&mut self, kind: RecordKind, records: Vec<Record>) {
        self.dataset.replace(kind, records);
        self.status = Some(format!("{} loaded successfully", kind));
    }

    /// Direct in-place cell edit. Any value may land in any cell;
    /// validation happens when issues are read, not here.
    pub fn set_cell(
        &mut self,
        kind: RecordKind,
        row: usize,
        field: &str,
        value: Value,
    ) -> Result<(), EditError> {
        let records = self.dataset.records_mut(kind);
        let len = records.len();
        let record = records
            .get_mut(row)
            .ok_or(EditError::RowOutOfBounds { kind, row, len })?;
        record.set(field, value);
        Ok(())
    }

    /// Append one rule. Callers on the manual path have already been through
    /// the builder constructors; relay-parsed rules arrive here directly.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.append(rule);
    }

    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = Rule>) {
        self.rules.extend(rules);
    }

    /// Current validation issues, recomputed from cell values on every call.
    pub fn issues(&self) -> Vec<Issue> {
        validation::scan(&self.dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task_record(id: &str, duration: Value) -> Record {
        [
            ("TaskID".to_string(), json!(id)),
            ("Duration".to_string(), duration),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn replace_sets_status() {
        let mut state = AppState::new();
        state.replace_records(RecordKind::Workers, vec![]);
        assert_eq!(state.status(), Some("workers loaded successfully"));
    }

    #[test]
    fn edit_then_revalidate() {
        let mut state = AppState::new();
        state.replace_records(RecordKind::Tasks, vec![task_record("T1", json!(0))]);
        assert_eq!(state.issues().len(), 1);

        state
            .set_cell(RecordKind::Tasks, 0, "Duration", json!(3))
            .unwrap();
        assert!(state.issues().is_empty());
    }

    #[test]
    fn edit_out_of_bounds() {
        let mut state = AppState::new();
        state.replace_records(RecordKind::Tasks, vec![task_record("T1", json!(1))]);
        let err = state
            .set_cell(RecordKind::Tasks, 5, "Duration", json!(3))
            .unwrap_err();
        assert_eq!(
            err,
            EditError::RowOutOfBounds { kind: RecordKind::Tasks, row: 5, len: 1 }
        );
    }

    #[test]
    fn rules_accumulate_in_order() {
        let mut state = AppState::new();
        state.add_rule(Rule::co_run(vec!["T1".into(), "T2".into()]).unwrap());
        state.add_rules([Rule::phase_window(vec!["T3".into()], vec![1]).unwrap()]);
        assert_eq!(state.rules.len(), 2);
        assert_eq!(state.rules.rules()[0].kind(), "coRun");
        assert_eq!(state.rules.rules()[1].kind(), "phaseWindow");
    }
}
