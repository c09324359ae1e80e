// Metadata entries listed by a data source

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewInfo {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutineKind {
    Function,
    Procedure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineInfo {
    pub name: String,
    pub kind: RoutineKind,
    #[serde(default)]
    pub definition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerInfo {
    pub name: String,
    #[serde(default)]
    pub timing: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
}

impl DatabaseInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TableInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), schema: None }
    }
}

impl ViewInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), schema: None }
    }
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self { name: name.into(), data_type: data_type.into(), nullable: true }
    }
}

impl TriggerInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), timing: None, event: None }
    }
}
