//! Query tab execution, saving and copying.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use crate::connection::{Clipboard, DataSource, FileSaver, select_top_query};
use crate::error::Error;
use crate::helpers::{CopyFormat, format_rows};
use crate::state::settings::default_query_filename;
use crate::state::{AppEvent, AppState, Context, QueryId, StateHandle};

use super::AppCommands;

impl AppCommands {
    /// Run `sql` in the current tab. Blank `sql` runs the tab's own text.
    ///
    /// No-op when there is no current tab, nothing to run, no live connection,
    /// or the tab is already running.
    pub fn execute_query_if_needed(state: &StateHandle, sql: &str) -> Option<JoinHandle<()>> {
        let id = state.read(|state| state.queries().current_id());
        let Some(id) = id else {
            log::debug!("No query tab to execute in");
            return None;
        };
        Self::execute_query_for(state, id, sql)
    }

    /// Run `sql` in tab `id`; see [`AppCommands::execute_query_if_needed`].
    pub fn execute_query_for(
        state: &StateHandle,
        id: QueryId,
        sql: &str,
    ) -> Option<JoinHandle<()>> {
        let dispatch = state.update(|state, cx| {
            let session = state.query(id)?;
            let sql = if sql.trim().is_empty() { session.text.clone() } else { sql.to_string() };
            if sql.trim().is_empty() {
                log::debug!("Nothing to execute in {id}");
                return None;
            }
            Self::begin_execution(state, id, sql, cx)
        });

        let (source, epoch, database, sql) = dispatch?;
        Some(Self::spawn_execution(state, id, epoch, source, database, sql))
    }

    /// Preview `table`: put a row-limited `SELECT` into a suitable tab and run it.
    ///
    /// Reuses the current tab unless it belongs to another database or holds
    /// text the user typed, in which case a new tab is opened. No-op while the
    /// current tab is running.
    pub fn execute_default_select_query_if_needed(
        state: &StateHandle,
        database: &str,
        table: &str,
    ) -> Option<JoinHandle<()>> {
        let dispatch = state.update(|state, cx| {
            if state.current_query().is_some_and(|session| session.is_running()) {
                log::debug!("Current query tab is running; not previewing {table}");
                return None;
            }
            let Some(client) = state
                .connection()
                .live_epoch()
                .and_then(|_| state.connection().server())
                .map(|server| server.client)
            else {
                log::warn!("Cannot preview {table}: not connected");
                return None;
            };

            let limit = state.settings.query.default_select_limit;
            let sql = select_top_query(client, table, limit);

            let reuse = state
                .current_query()
                .filter(|session| session.database == database && !session.has_user_text())
                .map(|session| session.id);
            let id = match reuse {
                Some(id) => id,
                None => state.new_query(database, cx),
            };
            state.set_default_select(id, &sql, cx);

            let (source, epoch, database, sql) = Self::begin_execution(state, id, sql, cx)?;
            Some((id, source, epoch, database, sql))
        });

        let (id, source, epoch, database, sql) = dispatch?;
        Some(Self::spawn_execution(state, id, epoch, source, database, sql))
    }

    /// Save the current tab to its file, or to the default file in the
    /// queries folder when it was never saved.
    pub fn save_query(state: &StateHandle, saver: Arc<dyn FileSaver>) -> Option<JoinHandle<()>> {
        let id = state.read(|state| state.queries().current_id())?;
        Self::save_query_for(state, saver, id)
    }

    pub fn save_query_for(
        state: &StateHandle,
        saver: Arc<dyn FileSaver>,
        id: QueryId,
    ) -> Option<JoinHandle<()>> {
        let path = state.read(|state| {
            let session = state.query(id)?;
            Some(session.saved_path.clone().unwrap_or_else(|| {
                state
                    .settings
                    .query
                    .resolved_queries_dir()
                    .join(default_query_filename(&session.database, id.get()))
            }))
        })?;
        Self::save_query_as(state, saver, id, path)
    }

    /// Save tab `id` to `path` and remember it as the tab's file.
    pub fn save_query_as(
        state: &StateHandle,
        saver: Arc<dyn FileSaver>,
        id: QueryId,
        path: PathBuf,
    ) -> Option<JoinHandle<()>> {
        let text = state.read(|state| state.query(id).map(|session| session.text.clone()))?;

        let state = state.clone();
        Some(tokio::spawn(async move {
            let result = saver.save_to_file(&path, text).await;
            state.update(|state, cx| {
                let event = match result {
                    Ok(()) => {
                        log::info!("Saved {id} to {}", path.display());
                        if let Some(session) = state.queries_mut().get_mut(id) {
                            session.saved_path = Some(path.clone());
                        }
                        AppEvent::QuerySaved { query: id, path }
                    }
                    Err(e) => {
                        log::error!("Failed to save {id} to {}: {}", path.display(), e);
                        AppEvent::QuerySaveFailed { query: id, error: e.to_string() }
                    }
                };
                state.update_status_from_event(&event);
                cx.emit(event);
            });
        }))
    }

    /// Copy rows of the current tab's result. `rows` are row indices; an
    /// empty slice copies every row. Indices past the end are skipped.
    pub fn copy_to_clipboard(
        state: &StateHandle,
        clipboard: Arc<dyn Clipboard>,
        rows: &[usize],
        format: CopyFormat,
    ) -> Option<JoinHandle<()>> {
        let formatted = state.update(|state, cx| {
            let result = state.current_query()?.result.as_ref()?;
            let selected: Vec<_> = if rows.is_empty() {
                result.rows.clone()
            } else {
                rows.iter().filter_map(|&index| result.rows.get(index).cloned()).collect()
            };
            let count = selected.len();
            match format_rows(&result.columns, &selected, format) {
                Ok(text) => Some((text, count)),
                Err(e) => {
                    log::error!("Failed to format rows as {}: {}", format.label(), e);
                    let event = AppEvent::CopyFailed { error: e.to_string() };
                    state.update_status_from_event(&event);
                    cx.emit(event);
                    None
                }
            }
        });

        let (text, count) = formatted?;
        let state = state.clone();
        Some(tokio::spawn(async move {
            let event = match clipboard.write_clipboard(text).await {
                Ok(()) => AppEvent::CopiedToClipboard { rows: count },
                Err(e) => {
                    log::error!("Failed to write clipboard: {}", e);
                    AppEvent::CopyFailed { error: e.to_string() }
                }
            };
            state.update(|state, cx| {
                state.update_status_from_event(&event);
                cx.emit(event);
            });
        }))
    }

    /// Mark `id` running. Returns what the execution task needs, or `None`
    /// when the tab is busy or there is no live connection.
    fn begin_execution(
        state: &mut AppState,
        id: QueryId,
        sql: String,
        cx: &mut Context,
    ) -> Option<(Arc<dyn DataSource>, u64, String, String)> {
        let Some(epoch) = state.connection().live_epoch() else {
            log::warn!("Cannot execute {id}: not connected");
            return None;
        };
        if !state.queries_mut().begin_execution(id, &sql) {
            log::debug!("{id} is already running");
            return None;
        }
        let database = state.query(id).map(|session| session.database.clone())?;

        log::debug!("Executing {id} on {database}");
        let event = AppEvent::QueryStarted(id);
        state.update_status_from_event(&event);
        cx.emit(event);
        Some((state.data_source(), epoch, database, sql))
    }

    fn spawn_execution(
        state: &StateHandle,
        id: QueryId,
        epoch: u64,
        source: Arc<dyn DataSource>,
        database: String,
        sql: String,
    ) -> JoinHandle<()> {
        let state = state.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            let result = source.execute_query(&database, &sql).await;
            let elapsed = started.elapsed();

            state.update(|state, cx| {
                if !state.connection().is_current(epoch) {
                    log::debug!("Discarding result of {id}: connection changed");
                    return;
                }
                let outcome = result.map_err(|e| e.to_string());
                let event = match &outcome {
                    Ok(result) => AppEvent::QueryCompleted { query: id, rows: result.row_count() },
                    Err(error) => AppEvent::QueryFailed { query: id, error: error.clone() },
                };
                if !state.queries_mut().finish_execution(id, outcome, elapsed) {
                    log::debug!("Discarding result of {id}: tab closed or no longer running");
                    return;
                }
                if let AppEvent::QueryFailed { error, .. } = &event {
                    log::error!("{id}: {}", Error::Execution(error.clone()));
                }
                state.update_status_from_event(&event);
                cx.emit(event);
            });
        })
    }
}
