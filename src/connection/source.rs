//! Data source port: the driver-facing side of the engine.
//!
//! Implementations wrap a real database client. Every method may fail with
//! [`Error::Driver`](crate::error::Error::Driver); callers in
//! `state::commands` turn those failures into state and never retry.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    ColumnInfo, ConnectionInfo, DatabaseInfo, QueryResult, RoutineInfo, Server, TableInfo,
    TriggerInfo, ViewInfo,
};

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Open a connection to `server`, optionally switching to `database`.
    async fn connect(&self, server: &Server, database: Option<&str>) -> Result<ConnectionInfo>;

    /// Close the live connection, if any.
    async fn disconnect(&self) -> Result<()>;

    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>>;

    async fn list_tables(&self, database: &str) -> Result<Vec<TableInfo>>;

    async fn list_views(&self, database: &str) -> Result<Vec<ViewInfo>>;

    async fn list_routines(&self, database: &str) -> Result<Vec<RoutineInfo>>;

    async fn list_table_columns(&self, database: &str, table: &str) -> Result<Vec<ColumnInfo>>;

    async fn list_table_triggers(&self, database: &str, table: &str)
    -> Result<Vec<TriggerInfo>>;

    async fn execute_query(&self, database: &str, sql: &str) -> Result<QueryResult>;
}
