//! Data source stand-in for unit tests that never reach the network.

use async_trait::async_trait;

use crate::connection::DataSource;
use crate::error::{Error, Result};
use crate::models::{
    ColumnInfo, ConnectionInfo, DatabaseInfo, QueryResult, RoutineInfo, Server, TableInfo,
    TriggerInfo, ViewInfo,
};

pub(crate) struct UnreachableSource;

#[async_trait]
impl DataSource for UnreachableSource {
    async fn connect(&self, _server: &Server, _database: Option<&str>) -> Result<ConnectionInfo> {
        Err(Error::driver("unreachable"))
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        Err(Error::driver("unreachable"))
    }

    async fn list_tables(&self, _database: &str) -> Result<Vec<TableInfo>> {
        Err(Error::driver("unreachable"))
    }

    async fn list_views(&self, _database: &str) -> Result<Vec<ViewInfo>> {
        Err(Error::driver("unreachable"))
    }

    async fn list_routines(&self, _database: &str) -> Result<Vec<RoutineInfo>> {
        Err(Error::driver("unreachable"))
    }

    async fn list_table_columns(&self, _database: &str, _table: &str) -> Result<Vec<ColumnInfo>> {
        Err(Error::driver("unreachable"))
    }

    async fn list_table_triggers(
        &self,
        _database: &str,
        _table: &str,
    ) -> Result<Vec<TriggerInfo>> {
        Err(Error::driver("unreachable"))
    }

    async fn execute_query(&self, _database: &str, _sql: &str) -> Result<QueryResult> {
        Err(Error::driver("unreachable"))
    }
}
