//! Command routing for menu items and keyboard shortcuts.
//!
//! A [`MenuRegistry`] is shared by every view. Each view owns one
//! [`MenuHandler`] and binds closures for the commands it can serve; the
//! bindings live as long as the handler (or until replaced) so a torn-down
//! view never receives a command.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Commands the browser exposes to menus and shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MenuCommand {
    ExecuteQuery,
    SaveQuery,
    NewTab,
    CloseTab,
    RefreshDatabase,
}

impl MenuCommand {
    pub fn all() -> &'static [MenuCommand] {
        &[
            MenuCommand::ExecuteQuery,
            MenuCommand::SaveQuery,
            MenuCommand::NewTab,
            MenuCommand::CloseTab,
            MenuCommand::RefreshDatabase,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            MenuCommand::ExecuteQuery => "browser:query-execute",
            MenuCommand::SaveQuery => "browser:save-query",
            MenuCommand::NewTab => "browser:new-tab",
            MenuCommand::CloseTab => "browser:close-tab",
            MenuCommand::RefreshDatabase => "browser:refresh-database",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|command| command.name() == name)
    }
}

impl std::fmt::Display for MenuCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub type MenuAction = Arc<dyn Fn() + Send + Sync>;

/// Identifies the view that owns a set of bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

impl ViewId {
    fn next() -> Self {
        Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Default)]
struct Bindings {
    // Dispatch order follows view ids.
    by_view: HashMap<ViewId, HashMap<MenuCommand, MenuAction>>,
}

impl Bindings {
    fn actions_for(&self, command: MenuCommand) -> Vec<MenuAction> {
        let mut views: Vec<_> = self.by_view.keys().copied().collect();
        views.sort();
        views
            .into_iter()
            .filter_map(|view| self.by_view.get(&view)?.get(&command).cloned())
            .collect()
    }
}

/// Shared command → handler table.
#[derive(Clone, Default)]
pub struct MenuRegistry {
    inner: Arc<Mutex<Bindings>>,
}

impl MenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// New handler owning a fresh view id.
    pub fn handler(&self) -> MenuHandler {
        MenuHandler { view: ViewId::next(), registry: self.clone() }
    }

    /// Fire every handler bound to the command called `name`. Returns false
    /// for unknown names or when nothing is bound.
    pub fn dispatch(&self, name: &str) -> bool {
        let Some(command) = MenuCommand::from_name(name) else {
            log::debug!("Ignoring unknown command {name:?}");
            return false;
        };
        self.dispatch_command(command)
    }

    pub fn dispatch_command(&self, command: MenuCommand) -> bool {
        // Handlers run outside the lock so they may rebind menus.
        let actions = self.inner.lock().actions_for(command);
        if actions.is_empty() {
            log::debug!("No handler bound for {command}");
            return false;
        }
        for action in actions {
            action();
        }
        true
    }

    pub fn is_registered(&self, command: MenuCommand) -> bool {
        self.inner.lock().by_view.values().any(|bindings| bindings.contains_key(&command))
    }

    /// Number of views holding at least one binding.
    pub fn view_count(&self) -> usize {
        self.inner.lock().by_view.len()
    }
}

impl std::fmt::Debug for MenuRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuRegistry").field("views", &self.view_count()).finish()
    }
}

/// One view's bindings in a [`MenuRegistry`]. Dropping it unbinds them.
pub struct MenuHandler {
    view: ViewId,
    registry: MenuRegistry,
}

impl MenuHandler {
    pub fn view_id(&self) -> ViewId {
        self.view
    }

    /// Replace this view's bindings with `bindings`.
    pub fn set_menus(&self, bindings: impl IntoIterator<Item = (MenuCommand, MenuAction)>) {
        let bindings: HashMap<_, _> = bindings.into_iter().collect();
        let mut inner = self.registry.inner.lock();
        if bindings.is_empty() {
            inner.by_view.remove(&self.view);
        } else {
            inner.by_view.insert(self.view, bindings);
        }
    }

    pub fn remove_all_menus(&self) {
        self.registry.inner.lock().by_view.remove(&self.view);
    }
}

impl Drop for MenuHandler {
    fn drop(&mut self) {
        self.remove_all_menus();
    }
}

impl std::fmt::Debug for MenuHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuHandler").field("view", &self.view).finish()
    }
}
