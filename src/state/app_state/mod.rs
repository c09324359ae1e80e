//! Global application state.

mod connection;
mod metadata;
mod queries;
mod status;
mod types;

pub use connection::{ConnectionState, ConnectionStatus, PendingTeardown};
pub use metadata::{
    CollectionFlags, FetchFailure, Invalidation, MetadataCollection, MetadataEntry, MetadataKind,
    MetadataStore,
};
pub use queries::QueryStore;
pub use types::{ExecutionStatus, QueryId, QuerySession};

use std::sync::Arc;

use crate::connection::DataSource;
use crate::models::Server;
use crate::state::StatusMessage;
use crate::state::config::ConfigManager;
use crate::state::settings::AppSettings;

/// Global application state
pub struct AppState {
    // Persisted state
    pub servers: Vec<Server>,
    pub settings: AppSettings,

    // Data source (injected for testability)
    source: Arc<dyn DataSource>,

    // Organized sub-states
    conn: ConnectionState,
    metadata: MetadataStore,
    queries: QueryStore,

    status_message: Option<StatusMessage>,

    // Config manager for persistence; `None` keeps everything in memory
    pub(crate) config: Option<ConfigManager>,
}

impl AppState {
    /// Create in-memory state around `source`; nothing is read from or written to disk.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            servers: Vec::new(),
            settings: AppSettings::default(),
            source,
            conn: ConnectionState::default(),
            metadata: MetadataStore::new(),
            queries: QueryStore::new(),
            status_message: None,
            config: None,
        }
    }

    /// Create state, loading saved servers and settings through `config`
    pub fn with_config(source: Arc<dyn DataSource>, config: ConfigManager) -> Self {
        let servers = config.load_servers().unwrap_or_else(|e| {
            log::warn!("Failed to load servers: {}", e);
            Vec::new()
        });
        let settings = config.load_settings().unwrap_or_else(|e| {
            log::warn!("Failed to load settings: {}", e);
            AppSettings::default()
        });

        Self { servers, settings, config: Some(config), ..Self::new(source) }
    }

    /// Get the data source
    pub fn data_source(&self) -> Arc<dyn DataSource> {
        self.source.clone()
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.metadata
    }

    pub(crate) fn conn_mut(&mut self) -> &mut ConnectionState {
        &mut self.conn
    }

    pub(crate) fn queries_mut(&mut self) -> &mut QueryStore {
        &mut self.queries
    }

    pub fn status_message(&self) -> Option<StatusMessage> {
        self.status_message.clone()
    }

    pub fn set_status_message(&mut self, message: Option<StatusMessage>) {
        self.status_message = message;
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    /// Save settings to disk
    pub fn save_settings(&self) {
        let Some(config) = &self.config else {
            return;
        };
        if let Err(e) = config.save_settings(&self.settings) {
            log::error!("Failed to save settings: {}", e);
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("servers", &self.servers.len())
            .field("conn", &self.conn)
            .field("queries", &self.queries.len())
            .finish_non_exhaustive()
    }
}
