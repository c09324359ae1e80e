// Query result models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A result column as described by the data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(default)]
    pub data_type: Option<String>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), data_type: None }
    }
}

/// One row; cells are positional and line up with `QueryResult::columns`.
pub type Row = Vec<Value>;

/// Result set returned by `DataSource::execute_query`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Row>,
    /// Rows touched by a non-SELECT statement, when the driver reports it.
    #[serde(default)]
    pub affected_rows: Option<u64>,
}

impl QueryResult {
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Row>) -> Self {
        Self { columns, rows, affected_rows: None }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
