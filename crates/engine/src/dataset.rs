// The three record collections, distinguished by which file they came from

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Which upload surface a record collection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Clients,
    Workers,
    Tasks,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Clients, RecordKind::Workers, RecordKind::Tasks];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Clients => "clients",
            RecordKind::Workers => "workers",
            RecordKind::Tasks => "tasks",
        }
    }

    pub fn parse(s: &str) -> Option<RecordKind> {
        match s.to_ascii_lowercase().as_str() {
            "clients" => Some(RecordKind::Clients),
            "workers" => Some(RecordKind::Workers),
            "tasks" => Some(RecordKind::Tasks),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The in-memory dataset: three collections, replaced wholesale per kind on
/// file load and mutated cell-by-cell through [`crate::state::AppState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub clients: Vec<Record>,
    pub workers: Vec<Record>,
    pub tasks: Vec<Record>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self, kind: RecordKind) -> &[Record] {
        match kind {
            RecordKind::Clients => &self.clients,
            RecordKind::Workers => &self.workers,
            RecordKind::Tasks => &self.tasks,
        }
    }

    pub fn records_mut(&mut self, kind: RecordKind) -> &mut Vec<Record> {
        match kind {
            RecordKind::Clients => &mut self.clients,
            RecordKind::Workers => &mut self.workers,
            RecordKind::Tasks => &mut self.tasks,
        }
    }

    /// Replace a kind's collection wholesale (file upload semantics).
    pub fn replace(&mut self, kind: RecordKind, records: Vec<Record>) {
        *self.records_mut(kind) = records;
    }

    /// True when no file has been loaded into any collection.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty() && self.workers.is_empty() && self.tasks.is_empty()
    }
}
