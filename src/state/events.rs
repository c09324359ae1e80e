//! Application events for reactive UI updates

use std::path::PathBuf;

use uuid::Uuid;

use crate::models::ScopeKey;
use crate::state::app_state::{MetadataKind, QueryId};

/// Events broadcast by [`StateHandle`](crate::state::StateHandle) after each update
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    // Saved servers
    ServerAdded,
    ServerUpdated,
    ServerRemoved,

    // Connection state changes
    Connecting { server: Uuid, database: Option<String> },
    Connected { server: Uuid, database: Option<String> },
    Disconnected(Uuid),
    ConnectionFailed(String),

    // Metadata cache
    MetadataLoaded { kind: MetadataKind, scope: ScopeKey, count: usize },
    MetadataFailed { kind: MetadataKind, scope: ScopeKey, error: String },
    MetadataInvalidated { kind: MetadataKind },

    // Query tabs
    QueryCreated(QueryId),
    QuerySelected(QueryId),
    QueryRemoved(QueryId),
    QueryTextChanged(QueryId),
    QueryStarted(QueryId),
    QueryCompleted { query: QueryId, rows: usize },
    QueryFailed { query: QueryId, error: String },
    QuerySaved { query: QueryId, path: PathBuf },
    QuerySaveFailed { query: QueryId, error: String },
    CopiedToClipboard { rows: usize },
    CopyFailed { error: String },
}
