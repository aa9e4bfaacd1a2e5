// Records - one row of uploaded tabular data

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names with dedicated validation rules.
///
/// Everything else flows through the generic accessor; these four are the
/// only columns the validator knows by name.
pub mod fields {
    pub const PRIORITY_LEVEL: &str = "PriorityLevel";
    pub const DURATION: &str = "Duration";
    pub const ATTRIBUTES_JSON: &str = "AttributesJSON";
}

/// One row of uploaded data: an ordered mapping from column name to a JSON
/// scalar. There is no declared schema — the field set is whatever the
/// uploaded file's header row said it was.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Generic accessor. `None` means the field is absent from this row
    /// (distinct from a field holding JSON null).
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Column names in file order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // ── Typed accessors for the validated fields ────────────────────

    pub fn priority_level(&self) -> Option<f64> {
        self.get(fields::PRIORITY_LEVEL).and_then(coerce_number)
    }

    pub fn duration(&self) -> Option<f64> {
        self.get(fields::DURATION).and_then(coerce_number)
    }

    /// The raw attributes payload, if present and textual.
    pub fn attributes_json(&self) -> Option<&str> {
        self.get(fields::ATTRIBUTES_JSON).and_then(Value::as_str)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Loose numeric coercion: numbers pass through, numeric strings parse,
/// everything else refuses to coerce. Range checks skip values that do not
/// coerce, the same way a NaN comparison never fires.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
