// Server configuration models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Database engine a server speaks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum ClientKind {
    #[default]
    Postgres,
    MySql,
    SqlServer,
    Sqlite,
    Cassandra,
}

impl ClientKind {
    pub fn label(self) -> &'static str {
        match self {
            ClientKind::Postgres => "PostgreSQL",
            ClientKind::MySql => "MySQL",
            ClientKind::SqlServer => "Microsoft SQL Server",
            ClientKind::Sqlite => "SQLite",
            ClientKind::Cassandra => "Cassandra",
        }
    }

    pub fn all() -> &'static [ClientKind] {
        &[
            ClientKind::Postgres,
            ClientKind::MySql,
            ClientKind::SqlServer,
            ClientKind::Sqlite,
            ClientKind::Cassandra,
        ]
    }
}

/// A saved server configuration (persisted to disk)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub client: ClientKind,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Database opened when a connect request names none.
    #[serde(default)]
    pub database: Option<String>,
}

impl Server {
    pub fn new(name: impl Into<String>, client: ClientKind, host: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            client,
            host: host.into(),
            port: None,
            user: None,
            password: None,
            database: None,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

/// What the data source reports back for an established connection
/// (runtime only, not persisted)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Database the session ended up in
    pub database: Option<String>,
    pub server_version: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
}
