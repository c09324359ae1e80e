//! Application settings with persistence.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::helpers::CopyFormat;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppSettings {
    #[serde(default)]
    pub query: QuerySettings,
}

/// Query tab settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuerySettings {
    /// Row limit of the generated table preview query
    #[serde(default = "default_select_limit")]
    pub default_select_limit: u32,
    /// Folder new query files are saved to; the documents folder when unset
    #[serde(default)]
    pub queries_dir: Option<PathBuf>,
    #[serde(default)]
    pub copy_format: CopyFormat,
    /// Open a first query tab once a view connects with no tabs open
    #[serde(default = "default_true")]
    pub open_tab_on_connect: bool,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_select_limit: default_select_limit(),
            queries_dir: None,
            copy_format: CopyFormat::default(),
            open_tab_on_connect: true,
        }
    }
}

impl QuerySettings {
    pub fn resolved_queries_dir(&self) -> PathBuf {
        self.queries_dir.clone().unwrap_or_else(default_queries_dir)
    }
}

fn default_select_limit() -> u32 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_queries_dir() -> PathBuf {
    dirs::document_dir().unwrap_or_else(std::env::temp_dir).join("querybench")
}

/// File name a never-saved query tab gets.
pub fn default_query_filename(database: &str, query_number: u64) -> String {
    let database: String = database
        .chars()
        .map(|ch| if ch.is_alphanumeric() || ch == '_' || ch == '-' { ch } else { '_' })
        .collect();
    format!("{database}-query-{query_number}.sql")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.query.default_select_limit, 1000);
        assert_eq!(settings.query.copy_format, CopyFormat::Csv);
        assert!(settings.query.open_tab_on_connect);
        assert!(settings.query.queries_dir.is_none());
    }

    #[test]
    fn test_default_query_filename_sanitizes() {
        assert_eq!(default_query_filename("db1", 2), "db1-query-2.sql");
        assert_eq!(default_query_filename("my db/x", 1), "my_db_x-query-1.sql");
    }
}
