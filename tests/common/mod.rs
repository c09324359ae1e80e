//! Common test utilities for integration tests.
//!
//! [`MockSource`] stands in for a database driver. It counts calls per method,
//! can hold a method's responses behind a gate until the test releases them,
//! and can be told to fail a method.

#![allow(dead_code)]

pub mod fixtures;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use querybench::connection::{Clipboard, DataSource, FileSaver};
use querybench::error::{Error, Result};
use querybench::models::{
    ColumnInfo, ColumnMeta, ConnectionInfo, DatabaseInfo, QueryResult, RoutineInfo, Server,
    TableInfo, TriggerInfo, ViewInfo,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =============================================================================
// Mock data source
// =============================================================================

#[derive(Default)]
pub struct MockSource {
    calls: Mutex<HashMap<&'static str, usize>>,
    gates: Mutex<HashMap<&'static str, Arc<Semaphore>>>,
    failures: Mutex<HashMap<&'static str, String>>,
    databases: Mutex<Vec<DatabaseInfo>>,
    tables: Mutex<HashMap<String, Vec<TableInfo>>>,
    columns: Mutex<HashMap<(String, String), Vec<ColumnInfo>>>,
    results: Mutex<HashMap<String, QueryResult>>,
    executed: Mutex<Vec<(String, String)>>,
}

impl MockSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of calls `method` has received so far (counted on entry).
    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().get(method).copied().unwrap_or(0)
    }

    /// Make later calls to `method` wait until released.
    pub fn hold(&self, method: &'static str) {
        self.gates.lock().insert(method, Arc::new(Semaphore::new(0)));
    }

    /// Let `count` held calls to `method` through.
    pub fn release(&self, method: &'static str, count: usize) {
        if let Some(gate) = self.gates.lock().get(method) {
            gate.add_permits(count);
        }
    }

    pub fn fail(&self, method: &'static str, message: &str) {
        self.failures.lock().insert(method, message.to_string());
    }

    pub fn succeed(&self, method: &'static str) {
        self.failures.lock().remove(method);
    }

    pub fn set_databases(&self, names: &[&str]) {
        *self.databases.lock() = names.iter().map(|name| DatabaseInfo::named(*name)).collect();
    }

    pub fn set_tables(&self, database: &str, names: &[&str]) {
        self.tables.lock().insert(
            database.to_string(),
            names.iter().map(|name| TableInfo::named(*name)).collect(),
        );
    }

    pub fn set_columns(&self, database: &str, table: &str, columns: Vec<ColumnInfo>) {
        self.columns.lock().insert((database.to_string(), table.to_string()), columns);
    }

    pub fn set_result(&self, sql: &str, result: QueryResult) {
        self.results.lock().insert(sql.to_string(), result);
    }

    /// `(database, sql)` pairs in execution order.
    pub fn executed(&self) -> Vec<(String, String)> {
        self.executed.lock().clone()
    }

    async fn enter(&self, method: &'static str) -> Result<()> {
        *self.calls.lock().entry(method).or_default() += 1;

        let gate = self.gates.lock().get(method).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.map_err(|e| Error::driver(e.to_string()))?.forget();
        }

        match self.failures.lock().get(method) {
            Some(message) => Err(Error::driver(message.clone())),
            None => Ok(()),
        }
    }
}

/// Single-column result used when a statement has no canned result.
pub fn one_row(value: i64) -> QueryResult {
    QueryResult::new(vec![ColumnMeta::new("?column?")], vec![vec![serde_json::json!(value)]])
}

#[async_trait]
impl DataSource for MockSource {
    async fn connect(&self, server: &Server, database: Option<&str>) -> Result<ConnectionInfo> {
        self.enter("connect").await?;
        Ok(ConnectionInfo {
            database: database.map(str::to_string).or_else(|| server.database.clone()),
            server_version: Some("16.2".into()),
            connected_at: Some(Utc::now()),
        })
    }

    async fn disconnect(&self) -> Result<()> {
        self.enter("disconnect").await
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        self.enter("list_databases").await?;
        Ok(self.databases.lock().clone())
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<TableInfo>> {
        self.enter("list_tables").await?;
        Ok(self.tables.lock().get(database).cloned().unwrap_or_default())
    }

    async fn list_views(&self, _database: &str) -> Result<Vec<ViewInfo>> {
        self.enter("list_views").await?;
        Ok(Vec::new())
    }

    async fn list_routines(&self, _database: &str) -> Result<Vec<RoutineInfo>> {
        self.enter("list_routines").await?;
        Ok(Vec::new())
    }

    async fn list_table_columns(&self, database: &str, table: &str) -> Result<Vec<ColumnInfo>> {
        self.enter("list_table_columns").await?;
        let key = (database.to_string(), table.to_string());
        Ok(self.columns.lock().get(&key).cloned().unwrap_or_default())
    }

    async fn list_table_triggers(&self, _database: &str, table: &str) -> Result<Vec<TriggerInfo>> {
        self.enter("list_table_triggers").await?;
        Ok(vec![TriggerInfo::named(format!("{table}_audit"))])
    }

    async fn execute_query(&self, database: &str, sql: &str) -> Result<QueryResult> {
        self.executed.lock().push((database.to_string(), sql.to_string()));
        self.enter("execute_query").await?;
        Ok(self.results.lock().get(sql).cloned().unwrap_or_else(|| one_row(1)))
    }
}

// =============================================================================
// Collaborators
// =============================================================================

#[derive(Default)]
pub struct MockClipboard {
    pub writes: Mutex<Vec<String>>,
}

#[async_trait]
impl Clipboard for MockClipboard {
    async fn write_clipboard(&self, text: String) -> Result<()> {
        self.writes.lock().push(text);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockSaver {
    pub saves: Mutex<Vec<(PathBuf, String)>>,
    pub failure: Mutex<Option<String>>,
}

#[async_trait]
impl FileSaver for MockSaver {
    async fn save_to_file(&self, path: &Path, text: String) -> Result<()> {
        if let Some(message) = self.failure.lock().clone() {
            return Err(Error::Io(std::io::Error::other(message)));
        }
        self.saves.lock().push((path.to_path_buf(), text));
        Ok(())
    }
}
