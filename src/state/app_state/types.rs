//! Type definitions for application state.

use std::path::PathBuf;
use std::time::Duration;

use crate::models::QueryResult;

/// Identifier of an open query tab. Allocated in creation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryId(pub(crate) u64);

impl QueryId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for QueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl ExecutionStatus {
    pub fn is_running(self) -> bool {
        matches!(self, ExecutionStatus::Running)
    }
}

/// One query tab: editor text plus the outcome of its last execution.
#[derive(Debug, Clone)]
pub struct QuerySession {
    pub id: QueryId,
    pub name: String,
    pub database: String,
    pub text: String,
    pub status: ExecutionStatus,
    pub result: Option<QueryResult>,
    pub error: Option<String>,
    /// Statement sent by the last execution (may differ from `text` when a
    /// selection was executed).
    pub executed_query: Option<String>,
    pub saved_path: Option<PathBuf>,
    /// True while `text` is an untouched generated preview query.
    pub is_default_select: bool,
    pub elapsed: Option<Duration>,
}

impl QuerySession {
    pub(crate) fn new(id: QueryId, database: String) -> Self {
        Self {
            id,
            name: format!("Query {id}"),
            database,
            text: String::new(),
            status: ExecutionStatus::Idle,
            result: None,
            error: None,
            executed_query: None,
            saved_path: None,
            is_default_select: false,
            elapsed: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    /// Holds text the user typed (not empty, not a generated preview).
    pub fn has_user_text(&self) -> bool {
        !self.is_default_select && !self.text.trim().is_empty()
    }
}
