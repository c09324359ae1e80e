//! Connection lifecycle state machine and server bookkeeping for AppState.
//!
//! ```text
//! Disconnected --connect--> Connecting --success--> Connected
//!                              |                        |
//!                              +--failure--> Error      +--disconnect--> Disconnected
//! Connected --reconnect--> Connecting
//! Error --connect/reconnect--> Connecting
//! ```
//!
//! Every connect attempt bumps `epoch`. Async completions carry the epoch they
//! were started under and are ignored once it is no longer current.
//!
//! A driver teardown started by `disconnect` is kept as a [`PendingTeardown`];
//! the next connect waits for it before opening a new driver connection.

use futures::FutureExt as _;
use futures::future::{BoxFuture, Shared};
use uuid::Uuid;

use super::AppState;
use crate::error::{Error, Result};
use crate::models::{ConnectionInfo, Server};
use crate::state::events::AppEvent;
use crate::state::handle::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "in error",
        };
        f.write_str(label)
    }
}

/// Driver `disconnect` still in flight. Cloning shares the same call.
#[derive(Clone)]
pub struct PendingTeardown(Shared<BoxFuture<'static, ()>>);

impl PendingTeardown {
    pub fn new(teardown: impl Future<Output = ()> + Send + 'static) -> Self {
        Self(teardown.boxed().shared())
    }

    /// Resolves once the teardown has finished, whoever polled it.
    pub async fn wait(self) {
        self.0.await
    }
}

impl std::fmt::Debug for PendingTeardown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PendingTeardown")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    server: Option<Server>,
    /// Database requested by the last connect call.
    database: Option<String>,
    status: ConnectionStatus,
    error: Option<String>,
    info: Option<ConnectionInfo>,
    epoch: u64,
    teardown: Option<PendingTeardown>,
}

impl ConnectionState {
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn server(&self) -> Option<&Server> {
        self.server.as_ref()
    }

    pub fn requested_database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Database queries and metadata fetches run against.
    pub fn active_database(&self) -> Option<&str> {
        self.database
            .as_deref()
            .or_else(|| self.info.as_ref().and_then(|info| info.database.as_deref()))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn info(&self) -> Option<&ConnectionInfo> {
        self.info.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn is_connecting(&self) -> bool {
        self.status == ConnectionStatus::Connecting
    }

    /// Epoch of the live connection, if connected.
    pub fn live_epoch(&self) -> Option<u64> {
        self.is_connected().then_some(self.epoch)
    }

    /// Whether a completion started under `epoch` may still be applied.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch && self.is_connected()
    }

    /// Whether the connection (live or in progress) targets `server_id` and
    /// `database`.
    pub fn is_same_target(&self, server_id: Uuid, database: Option<&str>) -> bool {
        self.server.as_ref().is_some_and(|server| server.id == server_id)
            && self.database.as_deref() == database
    }

    /// `Disconnected | Error | Connected` → `Connecting`. Returns the new epoch.
    pub fn begin_connect(&mut self, server: Server, database: Option<String>) -> Result<u64> {
        if self.status == ConnectionStatus::Connecting {
            return Err(Error::InvalidTransition { from: self.status, action: "connect" });
        }
        self.epoch += 1;
        self.server = Some(server);
        self.database = database;
        self.status = ConnectionStatus::Connecting;
        self.error = None;
        self.info = None;
        Ok(self.epoch)
    }

    /// `Connecting` → `Connected`, only for the attempt identified by `epoch`.
    pub fn complete_connect(&mut self, epoch: u64, info: ConnectionInfo) -> bool {
        if epoch != self.epoch || self.status != ConnectionStatus::Connecting {
            return false;
        }
        self.status = ConnectionStatus::Connected;
        self.info = Some(info);
        true
    }

    /// `Connecting` → `Error`, only for the attempt identified by `epoch`.
    pub fn fail_connect(&mut self, epoch: u64, message: impl Into<String>) -> bool {
        if epoch != self.epoch || self.status != ConnectionStatus::Connecting {
            return false;
        }
        self.status = ConnectionStatus::Error;
        self.error = Some(message.into());
        true
    }

    /// `Connected` → `Disconnected`. Returns the server that was connected.
    pub fn disconnect(&mut self) -> Result<Server> {
        if self.status != ConnectionStatus::Connected {
            return Err(Error::InvalidTransition { from: self.status, action: "disconnect" });
        }
        self.epoch += 1;
        self.status = ConnectionStatus::Disconnected;
        self.info = None;
        self.error = None;
        self.database = None;
        self.server.take().ok_or(Error::NotConnected)
    }

    pub fn set_teardown(&mut self, teardown: PendingTeardown) {
        self.teardown = Some(teardown);
    }

    /// Teardown the next driver connect must wait for, if any.
    pub fn take_teardown(&mut self) -> Option<PendingTeardown> {
        self.teardown.take()
    }
}

impl AppState {
    pub fn connection(&self) -> &ConnectionState {
        &self.conn
    }

    pub fn server(&self, server_id: Uuid) -> Option<&Server> {
        self.servers.iter().find(|server| server.id == server_id)
    }

    /// Add a new server and persist to disk
    pub fn add_server(&mut self, server: Server, cx: &mut Context) {
        self.servers.push(server);
        self.save_servers();
        cx.emit(AppEvent::ServerAdded);
    }

    pub fn update_server(&mut self, server: Server, cx: &mut Context) {
        let Some(existing) = self.servers.iter_mut().find(|existing| existing.id == server.id)
        else {
            self.add_server(server, cx);
            return;
        };
        *existing = server;
        self.save_servers();

        let event = AppEvent::ServerUpdated;
        self.update_status_from_event(&event);
        cx.emit(event);
    }

    /// Remove a saved server. A live connection to it stays up until the
    /// caller disconnects.
    pub fn remove_server(&mut self, server_id: Uuid, cx: &mut Context) {
        let before = self.servers.len();
        self.servers.retain(|server| server.id != server_id);
        if self.servers.len() == before {
            return;
        }
        self.save_servers();

        let event = AppEvent::ServerRemoved;
        self.update_status_from_event(&event);
        cx.emit(event);
    }

    /// Save servers to disk
    pub(super) fn save_servers(&self) {
        let Some(config) = &self.config else {
            return;
        };
        if let Err(e) = config.save_servers(&self.servers) {
            log::error!("Failed to save servers: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientKind;

    fn server() -> Server {
        Server::new("S1", ClientKind::Postgres, "localhost")
    }

    #[test]
    fn connect_then_success() {
        let mut conn = ConnectionState::default();
        let epoch = conn.begin_connect(server(), Some("db1".into())).unwrap();
        assert_eq!(conn.status(), ConnectionStatus::Connecting);

        assert!(conn.complete_connect(epoch, ConnectionInfo::default()));
        assert_eq!(conn.status(), ConnectionStatus::Connected);
        assert_eq!(conn.active_database(), Some("db1"));
        assert!(conn.is_current(epoch));
    }

    #[test]
    fn connecting_is_not_reentered() {
        let mut conn = ConnectionState::default();
        let epoch = conn.begin_connect(server(), None).unwrap();

        let err = conn.begin_connect(server(), None).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition { from: ConnectionStatus::Connecting, action: "connect" }
        ));
        assert_eq!(conn.epoch(), epoch);
    }

    #[test]
    fn stale_attempt_cannot_complete() {
        let mut conn = ConnectionState::default();
        let first = conn.begin_connect(server(), None).unwrap();
        assert!(conn.fail_connect(first, "refused"));
        assert_eq!(conn.status(), ConnectionStatus::Error);
        assert_eq!(conn.error(), Some("refused"));

        let second = conn.begin_connect(server(), None).unwrap();
        assert!(!conn.complete_connect(first, ConnectionInfo::default()));
        assert!(conn.complete_connect(second, ConnectionInfo::default()));
        assert_eq!(conn.error(), None);
    }

    #[test]
    fn disconnect_only_from_connected() {
        let mut conn = ConnectionState::default();
        assert!(conn.disconnect().is_err());

        let epoch = conn.begin_connect(server(), None).unwrap();
        assert!(conn.disconnect().is_err());
        conn.complete_connect(epoch, ConnectionInfo::default());

        let server = conn.disconnect().unwrap();
        assert_eq!(server.name, "S1");
        assert_eq!(conn.status(), ConnectionStatus::Disconnected);
        assert!(!conn.is_current(epoch));
    }

    #[test]
    fn active_database_falls_back_to_reported() {
        let mut conn = ConnectionState::default();
        let epoch = conn.begin_connect(server(), None).unwrap();
        conn.complete_connect(
            epoch,
            ConnectionInfo { database: Some("postgres".into()), ..Default::default() },
        );

        assert_eq!(conn.requested_database(), None);
        assert_eq!(conn.active_database(), Some("postgres"));
    }

    #[test]
    fn same_target_compares_server_and_database() {
        let mut conn = ConnectionState::default();
        let server = server();
        let id = server.id;
        conn.begin_connect(server, Some("db1".into())).unwrap();

        assert!(conn.is_same_target(id, Some("db1")));
        assert!(!conn.is_same_target(id, Some("db2")));
        assert!(!conn.is_same_target(Uuid::new_v4(), Some("db1")));
    }

    #[tokio::test]
    async fn teardown_is_taken_once() {
        let mut conn = ConnectionState::default();
        assert!(conn.take_teardown().is_none());

        let teardown = PendingTeardown::new(async {});
        conn.set_teardown(teardown.clone());
        teardown.wait().await;

        conn.take_teardown().unwrap().wait().await;
        assert!(conn.take_teardown().is_none());
    }
}
