use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::{ColumnMeta, Row};

pub fn format_number(value: u64) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (index, ch) in raw.chars().rev().enumerate() {
        if index > 0 && index % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

/// Text format used when copying result rows to the clipboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum CopyFormat {
    #[default]
    Csv,
    Json,
}

impl CopyFormat {
    pub fn label(self) -> &'static str {
        match self {
            CopyFormat::Csv => "CSV",
            CopyFormat::Json => "JSON",
        }
    }
}

/// Render rows in `format`. CSV output starts with a header line. Rows are
/// shaped to `columns`: missing cells are empty, extra cells are dropped.
pub fn format_rows(columns: &[ColumnMeta], rows: &[Row], format: CopyFormat) -> Result<String> {
    match format {
        CopyFormat::Csv => rows_to_csv(columns, rows),
        CopyFormat::Json => rows_to_json(columns, rows),
    }
}

fn rows_to_csv(columns: &[ColumnMeta], rows: &[Row]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|column| column.name.as_str()))?;
    for row in rows {
        let cells = (0..columns.len()).map(|index| row.get(index).map(cell_to_text));
        writer.write_record(cells.map(Option::unwrap_or_default))?;
    }
    let bytes = writer.into_inner().map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn rows_to_json(columns: &[ColumnMeta], rows: &[Row]) -> Result<String> {
    let objects: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for (index, column) in columns.iter().enumerate() {
                let value = row.get(index).cloned().unwrap_or(Value::Null);
                object.insert(column.name.clone(), value);
            }
            Value::Object(object)
        })
        .collect();
    Ok(serde_json::to_string_pretty(&objects)?)
}

fn cell_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
