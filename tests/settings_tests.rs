//! Integration tests for settings serialization and persistence.

use querybench::helpers::CopyFormat;
use querybench::state::ConfigManager;
use querybench::state::settings::{AppSettings, default_query_filename};

// =============================================================================
// Default settings verification
// =============================================================================

#[test]
fn test_default_settings() {
    let settings = AppSettings::default();

    assert_eq!(settings.query.default_select_limit, 1000);
    assert_eq!(settings.query.copy_format, CopyFormat::Csv);
    assert!(settings.query.open_tab_on_connect);
    assert!(settings.query.queries_dir.is_none());
    assert!(settings.query.resolved_queries_dir().ends_with("querybench"));
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_partial_settings_fill_defaults() {
    let json = r#"{ "query": { "default_select_limit": 200 } }"#;
    let settings: AppSettings = serde_json::from_str(json).expect("parse settings");

    assert_eq!(settings.query.default_select_limit, 200);
    assert_eq!(settings.query.copy_format, CopyFormat::Csv);
    assert!(settings.query.open_tab_on_connect);
}

#[test]
fn test_empty_settings_object() {
    let settings: AppSettings = serde_json::from_str("{}").expect("parse settings");
    assert_eq!(settings, AppSettings::default());
}

#[test]
fn test_settings_roundtrip_through_config() {
    let temp_dir = tempfile::TempDir::new().expect("failed to create temp dir");
    let manager = ConfigManager::with_config_dir(temp_dir.path()).expect("config dir");

    let mut settings = AppSettings::default();
    settings.query.copy_format = CopyFormat::Json;
    settings.query.queries_dir = Some(temp_dir.path().join("sql"));
    settings.query.open_tab_on_connect = false;
    manager.save_settings(&settings).expect("save settings");

    assert_eq!(manager.load_settings().expect("load settings"), settings);
}

// =============================================================================
// default_query_filename
// =============================================================================

#[test]
fn test_default_query_filename() {
    assert_eq!(default_query_filename("shop", 3), "shop-query-3.sql");
    assert_eq!(default_query_filename("my db/prod", 1), "my_db_prod-query-1.sql");
}
