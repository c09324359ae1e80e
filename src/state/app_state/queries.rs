//! Query tabs for AppState.

use std::time::Duration;

use super::AppState;
use super::types::{ExecutionStatus, QueryId, QuerySession};
use crate::models::QueryResult;
use crate::state::events::AppEvent;
use crate::state::handle::Context;

#[derive(Debug, Default)]
pub struct QueryStore {
    sessions: Vec<QuerySession>,
    current: Option<QueryId>,
    next_id: u64,
}

impl QueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sessions in display (creation) order.
    pub fn iter(&self) -> impl Iterator<Item = &QuerySession> {
        self.sessions.iter()
    }

    pub fn ids(&self) -> Vec<QueryId> {
        self.sessions.iter().map(|session| session.id).collect()
    }

    pub fn get(&self, id: QueryId) -> Option<&QuerySession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn get_mut(&mut self, id: QueryId) -> Option<&mut QuerySession> {
        self.sessions.iter_mut().find(|session| session.id == id)
    }

    pub fn contains(&self, id: QueryId) -> bool {
        self.get(id).is_some()
    }

    pub fn current_id(&self) -> Option<QueryId> {
        self.current
    }

    pub fn current(&self) -> Option<&QuerySession> {
        self.current.and_then(|id| self.get(id))
    }

    pub fn current_mut(&mut self) -> Option<&mut QuerySession> {
        let id = self.current?;
        self.get_mut(id)
    }

    /// Append a session bound to `database` and make it current.
    pub fn push(&mut self, database: impl Into<String>) -> QueryId {
        self.next_id += 1;
        let id = QueryId(self.next_id);
        self.sessions.push(QuerySession::new(id, database.into()));
        self.current = Some(id);
        id
    }

    /// Returns false when `id` is unknown or already current.
    pub fn select(&mut self, id: QueryId) -> bool {
        if self.current == Some(id) || !self.contains(id) {
            return false;
        }
        self.current = Some(id);
        true
    }

    /// Remove a session. If it was current, the session that took its slot
    /// becomes current, else the one before it; `None` once the set is empty.
    pub fn remove(&mut self, id: QueryId) -> Option<QuerySession> {
        let index = self.sessions.iter().position(|session| session.id == id)?;
        let removed = self.sessions.remove(index);

        if self.current == Some(id) {
            self.current = if self.sessions.is_empty() {
                None
            } else {
                let next_index = index.min(self.sessions.len() - 1);
                Some(self.sessions[next_index].id)
            };
        }
        Some(removed)
    }

    /// Mark `id` running with `sql`. Returns false when it is already running
    /// or does not exist.
    pub fn begin_execution(&mut self, id: QueryId, sql: &str) -> bool {
        let Some(session) = self.get_mut(id) else {
            return false;
        };
        if session.is_running() {
            return false;
        }
        session.status = ExecutionStatus::Running;
        session.executed_query = Some(sql.to_string());
        session.error = None;
        true
    }

    /// Apply an execution outcome. Returns false when the session is gone or
    /// no longer running (for instance after its connection was replaced).
    pub fn finish_execution(
        &mut self,
        id: QueryId,
        outcome: std::result::Result<QueryResult, String>,
        elapsed: Duration,
    ) -> bool {
        let Some(session) = self.get_mut(id) else {
            return false;
        };
        if !session.is_running() {
            return false;
        }
        session.elapsed = Some(elapsed);
        match outcome {
            Ok(result) => {
                session.status = ExecutionStatus::Succeeded;
                session.result = Some(result);
                session.error = None;
            }
            Err(error) => {
                session.status = ExecutionStatus::Failed;
                session.error = Some(error);
            }
        }
        true
    }

    /// Fail every running session; their completions will be ignored.
    pub fn abort_running(&mut self, reason: &str) -> Vec<QueryId> {
        let mut aborted = Vec::new();
        for session in self.sessions.iter_mut().filter(|session| session.is_running()) {
            session.status = ExecutionStatus::Failed;
            session.error = Some(reason.to_string());
            aborted.push(session.id);
        }
        aborted
    }
}

impl AppState {
    pub fn queries(&self) -> &QueryStore {
        &self.queries
    }

    pub fn current_query(&self) -> Option<&QuerySession> {
        self.queries.current()
    }

    pub fn query(&self, id: QueryId) -> Option<&QuerySession> {
        self.queries.get(id)
    }

    pub fn new_query(&mut self, database: impl Into<String>, cx: &mut Context) -> QueryId {
        let id = self.queries.push(database);
        log::debug!("Opened query tab {id}");
        cx.emit(AppEvent::QueryCreated(id));
        id
    }

    pub fn select_query(&mut self, id: QueryId, cx: &mut Context) -> bool {
        if !self.queries.select(id) {
            return false;
        }
        cx.emit(AppEvent::QuerySelected(id));
        true
    }

    pub fn remove_query(&mut self, id: QueryId, cx: &mut Context) -> bool {
        let was_current = self.queries.current_id() == Some(id);
        if self.queries.remove(id).is_none() {
            return false;
        }
        log::debug!("Closed query tab {id}");
        cx.emit(AppEvent::QueryRemoved(id));
        if was_current && let Some(current) = self.queries.current_id() {
            cx.emit(AppEvent::QuerySelected(current));
        }
        true
    }

    /// Replace the current session's text when it differs. Editing turns a
    /// generated preview into user text.
    pub fn update_query_if_needed(&mut self, text: impl Into<String>, cx: &mut Context) -> bool {
        let text = text.into();
        let Some(session) = self.queries.current_mut() else {
            return false;
        };
        if session.text == text {
            return false;
        }
        session.text = text;
        session.is_default_select = false;
        cx.emit(AppEvent::QueryTextChanged(session.id));
        true
    }

    /// Put a generated preview statement into `id`.
    pub(crate) fn set_default_select(&mut self, id: QueryId, sql: &str, cx: &mut Context) {
        let Some(session) = self.queries.get_mut(id) else {
            return;
        };
        let changed = session.text != sql;
        session.text = sql.to_string();
        session.is_default_select = true;
        if changed {
            cx.emit(AppEvent::QueryTextChanged(id));
        }
    }
}
