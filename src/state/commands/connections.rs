//! Connect, reconnect and disconnect commands.

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::Error;
use crate::state::app_state::PendingTeardown;
use crate::state::{AppEvent, StateHandle};

use super::AppCommands;

const ABORTED_BY_CONNECT: &str = "Connection was replaced while the query was running";
const ABORTED_BY_DISCONNECT: &str = "Disconnected while the query was running";

impl AppCommands {
    /// Connect to a saved server, optionally on a specific database.
    ///
    /// Rejected (logged, `None`) while another attempt is connecting. When the
    /// previous connection was to the same server the metadata cache is only
    /// invalidated; any other server starts from an empty cache.
    pub fn connect(
        state: &StateHandle,
        server_id: Uuid,
        database: Option<String>,
    ) -> Option<JoinHandle<()>> {
        let dispatch = state.update(|state, cx| {
            let Some(server) = state.server(server_id).cloned() else {
                let error = Error::ServerNotFound(server_id).to_string();
                log::error!("{error}");
                let event = AppEvent::ConnectionFailed(error);
                state.update_status_from_event(&event);
                cx.emit(event);
                return None;
            };

            let previous = state.connection().server().map(|server| server.id);
            let was_connected = state.connection().is_connected();

            let epoch = match state.conn_mut().begin_connect(server.clone(), database.clone()) {
                Ok(epoch) => epoch,
                Err(e) => {
                    log::warn!("Ignoring connect to {}: {}", server.name, e);
                    return None;
                }
            };

            let teardown = state.conn_mut().take_teardown();

            if previous == Some(server_id) {
                state.metadata_mut().invalidate_all();
            } else {
                state.metadata_mut().reset();
            }
            for id in state.queries_mut().abort_running(ABORTED_BY_CONNECT) {
                cx.emit(AppEvent::QueryFailed { query: id, error: ABORTED_BY_CONNECT.into() });
            }

            log::info!("Connecting to {} ({})", server.name, server.client.label());
            let event = AppEvent::Connecting { server: server_id, database: database.clone() };
            state.update_status_from_event(&event);
            cx.emit(event);

            Some((state.data_source(), server, epoch, was_connected, teardown))
        });

        let (source, server, epoch, was_connected, teardown) = dispatch?;
        let state = state.clone();
        Some(tokio::spawn(async move {
            if let Some(teardown) = teardown {
                log::debug!("Waiting for previous connection to close");
                teardown.wait().await;
            }
            if was_connected && let Err(e) = source.disconnect().await {
                log::warn!("Failed to close previous connection: {}", e);
            }

            let result = source.connect(&server, database.as_deref()).await;

            state.update(|state, cx| {
                let event = match result {
                    Ok(info) => {
                        if !state.conn_mut().complete_connect(epoch, info) {
                            log::debug!("Discarding stale connect to {}", server.name);
                            return;
                        }
                        log::info!("Connected to {}", server.name);
                        AppEvent::Connected { server: server.id, database }
                    }
                    Err(e) => {
                        let message = e.to_string();
                        if !state.conn_mut().fail_connect(epoch, message.clone()) {
                            log::debug!("Discarding stale connect failure for {}", server.name);
                            return;
                        }
                        log::error!("Failed to connect to {}: {}", server.name, message);
                        AppEvent::ConnectionFailed(message)
                    }
                };
                state.update_status_from_event(&event);
                cx.emit(event);
            });
        }))
    }

    /// Connect again to `server_id`, keeping the current database when none
    /// is given.
    pub fn reconnect(
        state: &StateHandle,
        server_id: Uuid,
        database: Option<String>,
    ) -> Option<JoinHandle<()>> {
        let database = database.or_else(|| {
            state.read(|state| state.connection().requested_database().map(str::to_string))
        });
        Self::connect(state, server_id, database)
    }

    /// Drop the live connection. Cached metadata and query tabs are kept.
    ///
    /// The driver is closed in the background; a following connect waits for
    /// it to finish.
    pub fn disconnect(state: &StateHandle) -> Option<JoinHandle<()>> {
        let dispatch = state.update(|state, cx| {
            let server = match state.conn_mut().disconnect() {
                Ok(server) => server,
                Err(e) => {
                    log::warn!("Ignoring disconnect: {}", e);
                    return None;
                }
            };
            state.metadata_mut().invalidate_all();
            for id in state.queries_mut().abort_running(ABORTED_BY_DISCONNECT) {
                cx.emit(AppEvent::QueryFailed { query: id, error: ABORTED_BY_DISCONNECT.into() });
            }

            log::info!("Disconnected from {}", server.name);
            let event = AppEvent::Disconnected(server.id);
            state.update_status_from_event(&event);
            cx.emit(event);

            let source = state.data_source();
            let teardown = PendingTeardown::new(async move {
                if let Err(e) = source.disconnect().await {
                    log::warn!("Failed to close connection: {}", e);
                }
            });
            state.conn_mut().set_teardown(teardown.clone());
            Some(teardown)
        });

        let teardown = dispatch?;
        Some(tokio::spawn(teardown.wait()))
    }
}
