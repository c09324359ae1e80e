// Application state management

pub mod app_state;
pub mod commands;
pub mod config;
pub mod events;
pub mod handle;
pub mod settings;
pub mod status;

pub use app_state::{
    AppState, ConnectionState, ConnectionStatus, ExecutionStatus, FetchFailure, Invalidation,
    MetadataKind, MetadataStore, QueryId, QuerySession, QueryStore,
};
pub use commands::AppCommands;
pub use config::ConfigManager;
pub use events::AppEvent;
pub use handle::{Context, StateHandle};
pub use settings::AppSettings;
pub use status::{StatusLevel, StatusMessage};
