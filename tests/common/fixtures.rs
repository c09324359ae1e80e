//! Shared state fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use querybench::models::{ClientKind, Server};
use querybench::state::{AppCommands, AppState, StateHandle};

use super::MockSource;

pub struct Fixture {
    pub state: StateHandle,
    pub source: Arc<MockSource>,
    pub server_id: Uuid,
}

/// In-memory state with one saved Postgres server named "S1".
pub fn fixture() -> Fixture {
    fixture_with(ClientKind::Postgres)
}

pub fn fixture_with(client: ClientKind) -> Fixture {
    super::init_logger();
    let source = MockSource::new();
    source.set_databases(&["db1", "db2"]);
    source.set_tables("db1", &["users", "orders"]);
    source.set_tables("db2", &["events"]);

    let state = StateHandle::new(AppState::new(source.clone()));
    let server = Server::new("S1", client, "localhost");
    let server_id = server.id;
    state.update(|state, cx| state.add_server(server, cx));

    Fixture { state, source, server_id }
}

/// Fixture already connected to `database`.
pub async fn connected(database: &str) -> Fixture {
    let fixture = fixture();
    fixture.connect(database).await;
    fixture
}

impl Fixture {
    pub async fn connect(&self, database: &str) {
        let task = AppCommands::connect(&self.state, self.server_id, Some(database.to_string()))
            .expect("connect should be dispatched");
        task.await.expect("connect task panicked");
        assert!(self.state.read(|state| state.connection().is_connected()));
    }

    /// Add a second saved server and return its id.
    pub fn add_server(&self, name: &str) -> Uuid {
        let server = Server::new(name, ClientKind::Postgres, "other-host");
        let id = server.id;
        self.state.update(|state, cx| state.add_server(server, cx));
        id
    }
}

pub async fn join_all(tasks: impl IntoIterator<Item = JoinHandle<()>>) {
    for task in tasks {
        task.await.expect("task panicked");
    }
}
