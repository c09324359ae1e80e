// Data structures and types

pub mod metadata;
pub mod query;
mod scope_key;
pub mod server;

pub use metadata::{
    ColumnInfo, DatabaseInfo, RoutineInfo, RoutineKind, TableInfo, TriggerInfo, ViewInfo,
};
pub use query::{ColumnMeta, QueryResult, Row};
pub use scope_key::ScopeKey;
pub use server::{ClientKind, ConnectionInfo, Server};
