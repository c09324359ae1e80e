use std::sync::Arc;

use futures::FutureExt as _;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;

use crate::connection::DataSource;
use crate::error::{Error, Result};
use crate::models::{
    ColumnInfo, DatabaseInfo, RoutineInfo, ScopeKey, TableInfo, TriggerInfo, ViewInfo,
};
use crate::state::app_state::{Invalidation, MetadataEntry, MetadataKind};
use crate::state::{AppEvent, StateHandle};

use super::AppCommands;

type Loader<T> = Box<dyn FnOnce(Arc<dyn DataSource>) -> BoxFuture<'static, Result<Vec<T>>> + Send>;

impl AppCommands {
    pub fn fetch_databases_if_needed(state: &StateHandle) -> Option<JoinHandle<()>> {
        Self::fetch_if_needed::<DatabaseInfo>(
            state,
            ScopeKey::Server,
            Box::new(|source: Arc<dyn DataSource>| {
                async move { source.list_databases().await }.boxed()
            }),
        )
    }

    pub fn fetch_tables_if_needed(state: &StateHandle, database: &str) -> Option<JoinHandle<()>> {
        let database = database.to_string();
        Self::fetch_if_needed::<TableInfo>(
            state,
            ScopeKey::database(database.clone()),
            Box::new(move |source: Arc<dyn DataSource>| {
                async move { source.list_tables(&database).await }.boxed()
            }),
        )
    }

    pub fn fetch_views_if_needed(state: &StateHandle, database: &str) -> Option<JoinHandle<()>> {
        let database = database.to_string();
        Self::fetch_if_needed::<ViewInfo>(
            state,
            ScopeKey::database(database.clone()),
            Box::new(move |source: Arc<dyn DataSource>| {
                async move { source.list_views(&database).await }.boxed()
            }),
        )
    }

    pub fn fetch_routines_if_needed(
        state: &StateHandle,
        database: &str,
    ) -> Option<JoinHandle<()>> {
        let database = database.to_string();
        Self::fetch_if_needed::<RoutineInfo>(
            state,
            ScopeKey::database(database.clone()),
            Box::new(move |source: Arc<dyn DataSource>| {
                async move { source.list_routines(&database).await }.boxed()
            }),
        )
    }

    pub fn fetch_table_columns_if_needed(
        state: &StateHandle,
        database: &str,
        table: &str,
    ) -> Option<JoinHandle<()>> {
        let (database, table) = (database.to_string(), table.to_string());
        Self::fetch_if_needed::<ColumnInfo>(
            state,
            ScopeKey::table(database.clone(), table.clone()),
            Box::new(move |source: Arc<dyn DataSource>| {
                async move { source.list_table_columns(&database, &table).await }.boxed()
            }),
        )
    }

    pub fn fetch_table_triggers_if_needed(
        state: &StateHandle,
        database: &str,
        table: &str,
    ) -> Option<JoinHandle<()>> {
        let (database, table) = (database.to_string(), table.to_string());
        Self::fetch_if_needed::<TriggerInfo>(
            state,
            ScopeKey::table(database.clone(), table.clone()),
            Box::new(move |source: Arc<dyn DataSource>| {
                async move { source.list_table_triggers(&database, &table).await }.boxed()
            }),
        )
    }

    /// Databases plus tables, views and routines of `database`: what a freshly
    /// connected view needs to render its tree.
    pub fn fetch_baseline(state: &StateHandle, database: &str) -> Vec<JoinHandle<()>> {
        [
            Self::fetch_databases_if_needed(state),
            Self::fetch_tables_if_needed(state, database),
            Self::fetch_views_if_needed(state, database),
            Self::fetch_routines_if_needed(state, database),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn invalidate_metadata(
        state: &StateHandle,
        kind: MetadataKind,
        invalidation: Invalidation,
    ) {
        state.update(|state, cx| {
            if state.metadata_mut().invalidate(kind, &invalidation) {
                log::debug!("Invalidated {kind} ({invalidation:?})");
                cx.emit(AppEvent::MetadataInvalidated { kind });
            }
        });
    }

    /// Re-list tables, views and routines of `database` even if cached.
    /// Cached columns and triggers of its tables go stale and reload on demand.
    pub fn refresh_database(state: &StateHandle, database: &str) -> Vec<JoinHandle<()>> {
        for kind in MetadataKind::all().iter().filter(|kind| **kind != MetadataKind::Databases) {
            Self::invalidate_metadata(state, *kind, Invalidation::Database(database.to_string()));
        }
        [
            Self::fetch_tables_if_needed(state, database),
            Self::fetch_views_if_needed(state, database),
            Self::fetch_routines_if_needed(state, database),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn fetch_if_needed<T: MetadataEntry>(
        state: &StateHandle,
        scope: ScopeKey,
        load: Loader<T>,
    ) -> Option<JoinHandle<()>> {
        let dispatch = state.update(|state, _cx| {
            let epoch = state.connection().live_epoch()?;
            let collection = state.metadata_mut().collection_mut::<T>();
            if !collection.should_fetch(&scope) {
                return None;
            }
            collection.mark_fetching(scope.clone());
            Some((state.data_source(), epoch))
        });

        let Some((source, epoch)) = dispatch else {
            log::trace!("Skipping {} fetch for {}", T::KIND, scope);
            return None;
        };

        log::debug!("Fetching {} for {}", T::KIND, scope);
        let request = load(source);
        let state = state.clone();
        Some(tokio::spawn(async move {
            let result = request.await;
            state.update(|state, cx| {
                if !state.connection().is_current(epoch) {
                    log::debug!("Discarding {} for {}: connection changed", T::KIND, scope);
                    return;
                }

                let collection = state.metadata_mut().collection_mut::<T>();
                let event = match result {
                    Ok(entries) => {
                        let count = entries.len();
                        collection.put(scope.clone(), entries);
                        AppEvent::MetadataLoaded { kind: T::KIND, scope, count }
                    }
                    Err(e) => {
                        let message = e.to_string();
                        log::error!(
                            "{} (scope {})",
                            Error::Fetch { kind: T::KIND, message: message.clone() },
                            scope
                        );
                        collection.fail(&scope, message.clone());
                        AppEvent::MetadataFailed { kind: T::KIND, scope, error: message }
                    }
                };
                state.update_status_from_event(&event);
                cx.emit(event);
            });
        }))
    }
}
