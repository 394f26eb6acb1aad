//! Append-only report table.

use crate::{ReportError, ReportResult, ReportRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column schema of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnSchema {
    /// Exactly these columns, in this order. Rows with other columns are rejected.
    Fixed(Vec<String>),
    /// Starts with these columns; further columns are added in first-seen order.
    Open(Vec<String>),
}

impl ColumnSchema {
    pub fn columns(&self) -> &[String] {
        match self {
            ColumnSchema::Fixed(columns) | ColumnSchema::Open(columns) => columns,
        }
    }
}

/// Builder that owns the column schema and validates every appended batch.
#[derive(Debug, Clone)]
pub struct ReportTableBuilder {
    schema: ColumnSchema,
    rows: Vec<ReportRow>,
}

impl ReportTableBuilder {
    pub fn new(schema: ColumnSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Schema built from an optional column allow-list plus columns the
    /// caller will stamp onto every row.
    pub fn for_columns(allowed: Option<&[String]>, stamped: &[&str]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for column in allowed.unwrap_or_default().iter().map(String::as_str).chain(stamped.iter().copied()) {
            if !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
        match allowed {
            Some(_) => Self::new(ColumnSchema::Fixed(columns)),
            None => Self::new(ColumnSchema::Open(columns)),
        }
    }

    /// Append a batch. The whole batch is checked before any row is kept.
    pub fn append(&mut self, batch: Vec<ReportRow>) -> ReportResult<()> {
        if let ColumnSchema::Fixed(columns) = &self.schema {
            for row in &batch {
                if let Some(column) = row.columns().find(|c| !columns.contains(*c)) {
                    return Err(ReportError::SchemaMismatch {
                        column: column.clone(),
                    });
                }
            }
        }
        if let ColumnSchema::Open(columns) = &mut self.schema {
            for row in &batch {
                for column in row.columns() {
                    if !columns.contains(column) {
                        columns.push(column.clone());
                    }
                }
            }
        }
        self.rows.extend(batch);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finish the table; every row carries every schema column.
    pub fn finish(self) -> ReportTable {
        let columns = match self.schema {
            ColumnSchema::Fixed(columns) | ColumnSchema::Open(columns) => columns,
        };
        let rows = self
            .rows
            .into_iter()
            .map(|mut row| {
                for column in &columns {
                    if !row.contains(column) {
                        row.insert(column.clone(), Value::Null);
                    }
                }
                row
            })
            .collect();
        ReportTable { columns, rows }
    }
}

/// A finished table of uniform rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of `column`, in row order.
    pub fn column(&self, column: &str) -> Vec<&Value> {
        self.rows.iter().filter_map(|row| row.get(column)).collect()
    }

    /// Distinct canonical ids held in `column`, in first-seen order.
    pub fn unique_ids(&self, column: &str) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for id in self.rows.iter().filter_map(|row| row.id(column)) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// Rename a column in the schema and in every row.
    ///
    /// Values of `from` replace existing values of `to`.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if from == to || !self.columns.iter().any(|c| c == from) {
            return;
        }
        if self.columns.iter().any(|c| c == to) {
            self.columns.retain(|c| c != from);
        } else {
            for column in self.columns.iter_mut() {
                if column == from {
                    *column = to.to_string();
                }
            }
        }
        for row in self.rows.iter_mut() {
            if let Some(value) = row.remove(from) {
                row.insert(to, value);
            }
        }
    }

    /// Keep rows for which `keep` returns true.
    pub fn retain_rows(&mut self, keep: impl FnMut(&ReportRow) -> bool) {
        self.rows.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> ReportRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_open_schema_pads_missing_columns() {
        let mut builder = ReportTableBuilder::new(ColumnSchema::Open(vec!["campaignId".into()]));
        builder.append(vec![row(&[("campaignId", json!(1)), ("a", json!(1))])]).unwrap();
        builder.append(vec![row(&[("campaignId", json!(2)), ("b", json!(2))])]).unwrap();
        let table = builder.finish();
        assert_eq!(table.columns, vec!["campaignId", "a", "b"]);
        for r in &table.rows {
            assert_eq!(r.len(), 3);
        }
        assert_eq!(table.rows[0].get("b"), Some(&Value::Null));
    }

    #[test]
    fn test_fixed_schema_rejects_whole_batch() {
        let mut builder = ReportTableBuilder::new(ColumnSchema::Fixed(vec!["a".into()]));
        let err = builder
            .append(vec![row(&[("a", json!(1))]), row(&[("z", json!(1))])])
            .unwrap_err();
        assert_eq!(err, ReportError::SchemaMismatch { column: "z".into() });
        assert!(builder.is_empty());
    }

    #[test]
    fn test_for_columns_dedupes_stamped() {
        let allowed = vec!["campaignId".to_string(), "impressions".to_string()];
        let table = ReportTableBuilder::for_columns(Some(allowed.as_slice()), &["campaignId", "appName"]).finish();
        assert_eq!(table.columns, vec!["campaignId", "impressions", "appName"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_unique_ids_preserve_order() {
        let table = ReportTable {
            columns: vec!["id".into()],
            rows: vec![
                row(&[("id", json!(3))]),
                row(&[("id", json!(1.0))]),
                row(&[("id", json!(3))]),
                row(&[("id", Value::Null)]),
            ],
        };
        assert_eq!(table.unique_ids("id"), vec!["3", "1"]);
    }

    #[test]
    fn test_rename_column() {
        let mut table = ReportTable {
            columns: vec!["id".into()],
            rows: vec![row(&[("id", json!(3))])],
        };
        table.rename_column("id", "campaignId");
        assert_eq!(table.columns, vec!["campaignId"]);
        assert_eq!(table.rows[0].get("campaignId"), Some(&json!(3)));
    }
}
