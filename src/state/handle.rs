//! Shared ownership of [`AppState`] with event fan-out.
//!
//! All reads and writes go through [`StateHandle::read`] and
//! [`StateHandle::update`]. An update runs under one lock acquisition, so the
//! result of an async operation is applied in a single step. Events emitted
//! during the update are broadcast after the lock is released.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::AppState;
use super::events::AppEvent;

const EVENT_CAPACITY: usize = 256;

/// Collects events emitted while an update is running.
#[derive(Debug, Default)]
pub struct Context {
    events: Vec<AppEvent>,
}

impl Context {
    pub fn emit(&mut self, event: AppEvent) {
        self.events.push(event);
    }

    pub fn emitted(&self) -> &[AppEvent] {
        &self.events
    }
}

#[derive(Clone)]
pub struct StateHandle {
    state: Arc<Mutex<AppState>>,
    events: broadcast::Sender<AppEvent>,
}

impl StateHandle {
    pub fn new(state: AppState) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { state: Arc::new(Mutex::new(state)), events }
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let state = self.state.lock();
        f(&state)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut AppState, &mut Context) -> R) -> R {
        let mut cx = Context::default();
        let result = {
            let mut state = self.state.lock();
            f(&mut state, &mut cx)
        };
        for event in cx.events {
            // No subscribers is fine; nobody is watching yet.
            let _ = self.events.send(event);
        }
        result
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }
}

impl std::fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateHandle").field("subscribers", &self.events.receiver_count()).finish()
    }
}
