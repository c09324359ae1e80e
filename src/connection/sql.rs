//! Dialect-aware SQL snippets generated by the engine itself.

use crate::models::ClientKind;

/// Quote an identifier for `client`, escaping embedded quote characters.
pub fn quote_identifier(client: ClientKind, name: &str) -> String {
    match client {
        ClientKind::MySql => format!("`{}`", name.replace('`', "``")),
        ClientKind::SqlServer => format!("[{}]", name.replace(']', "]]")),
        ClientKind::Postgres | ClientKind::Sqlite | ClientKind::Cassandra => {
            format!("\"{}\"", name.replace('"', "\"\""))
        }
    }
}

/// Canonical preview query for a table.
pub fn select_top_query(client: ClientKind, table: &str, limit: u32) -> String {
    let table = quote_identifier(client, table);
    match client {
        ClientKind::SqlServer => format!("SELECT TOP {limit} * FROM {table}"),
        _ => format!("SELECT * FROM {table} LIMIT {limit}"),
    }
}
