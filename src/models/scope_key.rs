//! Type-safe keys for cached metadata entries.

/// Identifies which part of the metadata hierarchy a cached list belongs to.
/// Replaces ad-hoc "database.table" string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScopeKey {
    /// The whole server (database list)
    Server,
    /// A database (tables, views, routines)
    Database(String),
    /// A table within a database (columns, triggers)
    Table { database: String, table: String },
}

impl ScopeKey {
    /// Create a database scope
    pub fn database(database: impl Into<String>) -> Self {
        Self::Database(database.into())
    }

    /// Create a table scope
    pub fn table(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self::Table { database: database.into(), table: table.into() }
    }

    /// Get the database name if this is a database or table scope
    pub fn database_name(&self) -> Option<&str> {
        match self {
            Self::Server => None,
            Self::Database(database) => Some(database),
            Self::Table { database, .. } => Some(database),
        }
    }

    /// Get the table name if this is a table scope
    pub fn table_name(&self) -> Option<&str> {
        match self {
            Self::Table { table, .. } => Some(table),
            _ => None,
        }
    }

    /// Whether this scope sits at or below `database`.
    pub fn belongs_to(&self, database: &str) -> bool {
        self.database_name() == Some(database)
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Database(database) => write!(f, "{database}"),
            Self::Table { database, table } => write!(f, "{database}.{table}"),
        }
    }
}
