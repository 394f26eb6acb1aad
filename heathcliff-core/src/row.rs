//! Flat report rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat mapping of column name to scalar value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportRow(Map<String, Value>);

impl ReportRow {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(column.into(), value)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.0.remove(column)
    }

    /// Overlay every field of `other`, replacing existing columns.
    pub fn extend(&mut self, other: Map<String, Value>) {
        self.0.extend(other);
    }

    /// Keep only the columns named in `allowed`.
    pub fn retain_columns(&mut self, allowed: &[String]) {
        self.0.retain(|key, _| allowed.iter().any(|c| c == key));
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical string form of the identifier held in `column`, if any.
    pub fn id(&self, column: &str) -> Option<String> {
        self.get(column).and_then(canonical_id)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ReportRow {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for ReportRow {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Coerce an identifier value to its canonical string form.
///
/// Integral numbers print without a fractional part (`117310.0` becomes
/// `"117310"`); strings are kept; null and non-scalar values have no id.
pub fn canonical_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
