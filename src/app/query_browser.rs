//! Controller behind the query browser view: keeps its connection on target,
//! drives metadata loading and owns the view's menu bindings.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::connection::{Clipboard, FileSaver};
use crate::models::{DatabaseInfo, ScopeKey};
use crate::state::{AppCommands, ConnectionStatus, MetadataKind, QueryId, StateHandle};

use super::menus::{MenuAction, MenuCommand, MenuHandler, MenuRegistry};

/// Values the menu closures capture. Bindings are rebuilt when they change.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MenuDeps {
    query: Option<QueryId>,
    database: Option<String>,
    status: ConnectionStatus,
}

/// Menu bindings of one browser. Handlers that switch tabs rebind through a
/// weak reference, so the registry never keeps the browser alive.
struct MenuBinder {
    state: StateHandle,
    menus: MenuHandler,
    saver: Arc<dyn FileSaver>,
    bound: Option<MenuDeps>,
}

impl MenuBinder {
    /// Rebuild bindings for `database` if the current tab, database or
    /// connection status changed. Returns whether bindings were replaced.
    fn bind(this: &Arc<Mutex<Self>>, database: Option<String>) -> bool {
        let mut binder = this.lock();
        let deps = binder.state.read(|state| MenuDeps {
            query: state.queries().current_id(),
            database,
            status: state.connection().status(),
        });
        if binder.bound.as_ref() == Some(&deps) {
            return false;
        }

        let bindings = binder.bindings(Arc::downgrade(this), &deps);
        log::trace!("Binding {} menu command(s) for {:?}", bindings.len(), deps);
        binder.menus.set_menus(bindings);
        binder.bound = Some(deps);
        true
    }

    /// Rebind after a handler changed the current tab.
    fn rebind(this: &Weak<Mutex<Self>>) {
        let Some(this) = this.upgrade() else {
            return;
        };
        let database = this.lock().bound.as_ref().and_then(|deps| deps.database.clone());
        Self::bind(&this, database);
    }

    fn bindings(
        &self,
        this: Weak<Mutex<Self>>,
        deps: &MenuDeps,
    ) -> Vec<(MenuCommand, MenuAction)> {
        let mut bindings: Vec<(MenuCommand, MenuAction)> = Vec::new();

        if let Some(id) = deps.query {
            if deps.status == ConnectionStatus::Connected {
                let state = self.state.clone();
                bindings.push((
                    MenuCommand::ExecuteQuery,
                    Arc::new(move || {
                        AppCommands::execute_query_for(&state, id, "");
                    }),
                ));
            }

            let state = self.state.clone();
            let saver = self.saver.clone();
            bindings.push((
                MenuCommand::SaveQuery,
                Arc::new(move || {
                    AppCommands::save_query_for(&state, saver.clone(), id);
                }),
            ));

            let state = self.state.clone();
            let binder = this.clone();
            bindings.push((
                MenuCommand::CloseTab,
                Arc::new(move || {
                    state.update(|state, cx| state.remove_query(id, cx));
                    Self::rebind(&binder);
                }),
            ));
        }

        if let Some(database) = deps.database.clone() {
            let state = self.state.clone();
            let new_tab_database = database.clone();
            bindings.push((
                MenuCommand::NewTab,
                Arc::new(move || {
                    state.update(|state, cx| state.new_query(new_tab_database.clone(), cx));
                    Self::rebind(&this);
                }),
            ));

            if deps.status == ConnectionStatus::Connected {
                let state = self.state.clone();
                bindings.push((
                    MenuCommand::RefreshDatabase,
                    Arc::new(move || {
                        AppCommands::refresh_database(&state, &database);
                    }),
                ));
            }
        }

        bindings
    }
}

pub struct QueryBrowser {
    state: StateHandle,
    menus: Arc<Mutex<MenuBinder>>,
    server_id: Uuid,
    database: Option<String>,
    saver: Arc<dyn FileSaver>,
    clipboard: Arc<dyn Clipboard>,
    filter: String,
}

impl QueryBrowser {
    /// Attach a browser for `server_id` and bind its menus. Call
    /// [`QueryBrowser::sync`] to start connecting.
    pub fn mount(
        state: StateHandle,
        registry: &MenuRegistry,
        server_id: Uuid,
        database: Option<String>,
        saver: Arc<dyn FileSaver>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let menus = MenuBinder {
            state: state.clone(),
            menus: registry.handler(),
            saver: saver.clone(),
            bound: None,
        };
        let mut browser = Self {
            state,
            menus: Arc::new(Mutex::new(menus)),
            server_id,
            database,
            saver,
            clipboard,
            filter: String::new(),
        };
        browser.set_menus();
        browser
    }

    pub fn server_id(&self) -> Uuid {
        self.server_id
    }

    /// Database the browser works in: the one asked for, else the one the
    /// server reported on connect.
    pub fn database(&self) -> Option<String> {
        self.database.clone().or_else(|| {
            self.state.read(|state| {
                let conn = state.connection();
                conn.is_same_target(self.server_id, None)
                    .then(|| conn.active_database().map(str::to_string))
                    .flatten()
            })
        })
    }

    /// Bring the connection and cache in line with this browser's target.
    ///
    /// Reconnects when the connection is in error or points elsewhere. Once
    /// connected, opens a first tab if none exist and loads the baseline
    /// metadata. Menus are rebound when their inputs changed.
    pub fn sync(&mut self) -> Vec<JoinHandle<()>> {
        let (status, same_target) = self.state.read(|state| {
            let conn = state.connection();
            (conn.status(), conn.is_same_target(self.server_id, self.database.as_deref()))
        });

        let mut tasks = Vec::new();
        match status {
            ConnectionStatus::Connecting if same_target => {}
            ConnectionStatus::Connected if same_target => {
                if let Some(database) = self.database() {
                    self.open_initial_tab(&database);
                    tasks.extend(AppCommands::fetch_baseline(&self.state, &database));
                } else {
                    tasks.extend(AppCommands::fetch_databases_if_needed(&self.state));
                }
            }
            _ => {
                log::debug!("Browser for {} is off target ({status}); connecting", self.server_id);
                tasks.extend(AppCommands::connect(
                    &self.state,
                    self.server_id,
                    self.database.clone(),
                ));
            }
        }

        self.set_menus();
        tasks
    }

    /// Switch to another database on the same server.
    pub fn select_database(&mut self, database: impl Into<String>) -> Vec<JoinHandle<()>> {
        let database = database.into();
        if self.database.as_deref() == Some(database.as_str()) {
            return Vec::new();
        }
        self.database = Some(database);
        self.sync()
    }

    /// Preview `table` in a tab and load its columns.
    pub fn select_table(&mut self, table: &str) -> Vec<JoinHandle<()>> {
        let Some(database) = self.database() else {
            return Vec::new();
        };
        let tasks = [
            AppCommands::execute_default_select_query_if_needed(&self.state, &database, table),
            AppCommands::fetch_table_columns_if_needed(&self.state, &database, table),
        ];
        self.set_menus();
        tasks.into_iter().flatten().collect()
    }

    /// Load what the tree shows under an expanded table.
    pub fn expand_table(&self, table: &str) -> Vec<JoinHandle<()>> {
        let Some(database) = self.database() else {
            return Vec::new();
        };
        [
            AppCommands::fetch_table_columns_if_needed(&self.state, &database, table),
            AppCommands::fetch_table_triggers_if_needed(&self.state, &database, table),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Editor text changed.
    pub fn sql_change(&self, text: impl Into<String>) -> bool {
        self.state.update(|state, cx| state.update_query_if_needed(text, cx))
    }

    pub fn execute_current_query(&self) -> Option<JoinHandle<()>> {
        AppCommands::execute_query_if_needed(&self.state, "")
    }

    pub fn save_current_query(&self) -> Option<JoinHandle<()>> {
        AppCommands::save_query(&self.state, self.saver.clone())
    }

    /// Copy rows of the current result in the configured format.
    pub fn copy_rows(&self, rows: &[usize]) -> Option<JoinHandle<()>> {
        let format = self.state.read(|state| state.settings.query.copy_format);
        AppCommands::copy_to_clipboard(&self.state, self.clipboard.clone(), rows, format)
    }

    pub fn new_tab(&mut self) -> Option<QueryId> {
        let database = self.database()?;
        let id = self.state.update(|state, cx| state.new_query(database, cx));
        self.set_menus();
        Some(id)
    }

    pub fn select_tab(&mut self, id: QueryId) -> bool {
        let selected = self.state.update(|state, cx| state.select_query(id, cx));
        self.set_menus();
        selected
    }

    pub fn close_tab(&mut self, id: QueryId) -> bool {
        let removed = self.state.update(|state, cx| state.remove_query(id, cx));
        self.set_menus();
        removed
    }

    pub fn refresh_database(&self) -> Vec<JoinHandle<()>> {
        match self.database() {
            Some(database) => AppCommands::refresh_database(&self.state, &database),
            None => Vec::new(),
        }
    }

    pub fn set_filter(&mut self, pattern: impl Into<String>) {
        self.filter = pattern.into();
    }

    /// Cached databases matching the sidebar filter.
    pub fn filtered_databases(&self) -> Vec<DatabaseInfo> {
        self.state.read(|state| state.metadata().filter_databases(&self.filter))
    }

    /// Whether the sidebar should show a spinner.
    pub fn is_loading(&self) -> bool {
        self.state.read(|state| {
            state.connection().is_connecting()
                || [
                    MetadataKind::Databases,
                    MetadataKind::Tables,
                    MetadataKind::Views,
                    MetadataKind::Routines,
                ]
                .into_iter()
                .any(|kind| state.metadata().flags(kind).is_fetching())
        })
    }

    /// Whether the tree has what it needs for the current database.
    pub fn is_loaded(&self) -> bool {
        let Some(database) = self.database() else {
            return false;
        };
        let scope = ScopeKey::database(database);
        self.state.read(|state| {
            let metadata = state.metadata();
            metadata.flags(MetadataKind::Databases).contains(&ScopeKey::Server)
                && [MetadataKind::Tables, MetadataKind::Views, MetadataKind::Routines]
                    .into_iter()
                    .all(|kind| metadata.flags(kind).contains(&scope))
        })
    }

    /// Rebind menu handlers if the current tab, database or connection status
    /// changed since the last binding. Returns whether bindings were replaced.
    pub fn set_menus(&mut self) -> bool {
        MenuBinder::bind(&self.menus, self.database())
    }

    /// Release menu bindings. Dropping the browser does the same.
    pub fn unmount(self) {
        self.menus.lock().menus.remove_all_menus();
    }

    fn open_initial_tab(&self, database: &str) {
        self.state.update(|state, cx| {
            if state.queries().is_empty() && state.settings.query.open_tab_on_connect {
                state.new_query(database, cx);
            }
        });
    }
}

impl std::fmt::Debug for QueryBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBrowser")
            .field("server_id", &self.server_id)
            .field("database", &self.database)
            .field("menus", &self.menus.lock().menus)
            .finish_non_exhaustive()
    }
}
