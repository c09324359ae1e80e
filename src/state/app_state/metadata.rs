//! Cached database metadata, one collection per kind.
//!
//! A collection maps a [`ScopeKey`] to the ordered entries the data source
//! returned for it. Alongside the entries it tracks which keys have a fetch in
//! flight, which keys were invalidated, and the last fetch failure. The fetch
//! commands consult [`MetadataCollection::should_fetch`] before touching the
//! data source; this module never performs I/O itself.

use std::collections::{HashMap, HashSet};

use regex::RegexBuilder;

use crate::models::{
    ColumnInfo, DatabaseInfo, RoutineInfo, ScopeKey, TableInfo, TriggerInfo, ViewInfo,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKind {
    Databases,
    Tables,
    Views,
    Routines,
    Columns,
    Triggers,
}

impl MetadataKind {
    pub fn all() -> &'static [MetadataKind] {
        &[
            MetadataKind::Databases,
            MetadataKind::Tables,
            MetadataKind::Views,
            MetadataKind::Routines,
            MetadataKind::Columns,
            MetadataKind::Triggers,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            MetadataKind::Databases => "databases",
            MetadataKind::Tables => "tables",
            MetadataKind::Views => "views",
            MetadataKind::Routines => "routines",
            MetadataKind::Columns => "columns",
            MetadataKind::Triggers => "triggers",
        }
    }
}

impl std::fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub scope: ScopeKey,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Scope(ScopeKey),
    /// Every cached scope at or below a database.
    Database(String),
    All,
}

#[derive(Debug, Clone)]
pub struct MetadataCollection<T> {
    items: HashMap<ScopeKey, Vec<T>>,
    fetching: HashSet<ScopeKey>,
    invalidated: HashSet<ScopeKey>,
    error: Option<FetchFailure>,
}

impl<T> Default for MetadataCollection<T> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            fetching: HashSet::new(),
            invalidated: HashSet::new(),
            error: None,
        }
    }
}

impl<T> MetadataCollection<T> {
    pub fn get(&self, scope: &ScopeKey) -> Option<&[T]> {
        self.items.get(scope).map(Vec::as_slice)
    }

    pub fn contains(&self, scope: &ScopeKey) -> bool {
        self.items.contains_key(scope)
    }

    pub fn scopes(&self) -> impl Iterator<Item = &ScopeKey> {
        self.items.keys()
    }

    /// Any fetch in flight for this collection.
    pub fn is_fetching(&self) -> bool {
        !self.fetching.is_empty()
    }

    pub fn is_fetching_scope(&self, scope: &ScopeKey) -> bool {
        self.fetching.contains(scope)
    }

    /// Any cached key marked stale.
    pub fn did_invalidate(&self) -> bool {
        !self.invalidated.is_empty()
    }

    pub fn is_invalidated(&self, scope: &ScopeKey) -> bool {
        self.invalidated.contains(scope)
    }

    pub fn error(&self) -> Option<&FetchFailure> {
        self.error.as_ref()
    }

    pub fn should_fetch(&self, scope: &ScopeKey) -> bool {
        if self.fetching.contains(scope) {
            return false;
        }
        if !self.items.contains_key(scope) {
            return true;
        }
        self.invalidated.contains(scope)
    }

    pub fn mark_fetching(&mut self, scope: ScopeKey) {
        self.fetching.insert(scope);
    }

    pub fn put(&mut self, scope: ScopeKey, entries: Vec<T>) {
        self.fetching.remove(&scope);
        self.invalidated.remove(&scope);
        if self.error.as_ref().is_some_and(|error| error.scope == scope) {
            self.error = None;
        }
        self.items.insert(scope, entries);
    }

    /// Record a failed fetch. Entries already cached for `scope` are kept.
    pub fn fail(&mut self, scope: &ScopeKey, message: impl Into<String>) {
        self.fetching.remove(scope);
        self.error = Some(FetchFailure { scope: scope.clone(), message: message.into() });
    }

    /// Returns true when at least one cached key became stale.
    pub fn invalidate(&mut self, invalidation: &Invalidation) -> bool {
        match invalidation {
            Invalidation::Scope(scope) => {
                if !self.items.contains_key(scope) {
                    return false;
                }
                self.invalidated.insert(scope.clone())
            }
            Invalidation::Database(database) => {
                let stale: Vec<_> = self
                    .items
                    .keys()
                    .filter(|scope| scope.belongs_to(database))
                    .cloned()
                    .collect();
                let any = !stale.is_empty();
                self.invalidated.extend(stale);
                any
            }
            Invalidation::All => {
                self.invalidated.extend(self.items.keys().cloned());
                !self.items.is_empty()
            }
        }
    }

    /// Forget in-flight markers whose completions will never be applied.
    pub fn abandon_in_flight(&mut self) {
        self.fetching.clear();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.fetching.clear();
        self.invalidated.clear();
        self.error = None;
    }
}

/// Kind-level operations shared by every collection regardless of entry type.
pub trait CollectionFlags {
    fn is_fetching(&self) -> bool;
    fn did_invalidate(&self) -> bool;
    fn error(&self) -> Option<&FetchFailure>;
    fn should_fetch(&self, scope: &ScopeKey) -> bool;
    fn contains(&self, scope: &ScopeKey) -> bool;
}

impl<T> CollectionFlags for MetadataCollection<T> {
    fn is_fetching(&self) -> bool {
        MetadataCollection::is_fetching(self)
    }

    fn did_invalidate(&self) -> bool {
        MetadataCollection::did_invalidate(self)
    }

    fn error(&self) -> Option<&FetchFailure> {
        MetadataCollection::error(self)
    }

    fn should_fetch(&self, scope: &ScopeKey) -> bool {
        MetadataCollection::should_fetch(self, scope)
    }

    fn contains(&self, scope: &ScopeKey) -> bool {
        MetadataCollection::contains(self, scope)
    }
}

/// Ties an entry type to the collection that stores it.
pub trait MetadataEntry: Clone + Send + Sync + 'static {
    const KIND: MetadataKind;

    fn collection(store: &MetadataStore) -> &MetadataCollection<Self>;

    fn collection_mut(store: &mut MetadataStore) -> &mut MetadataCollection<Self>;
}

macro_rules! metadata_entry {
    ($ty:ty, $kind:ident, $field:ident) => {
        impl MetadataEntry for $ty {
            const KIND: MetadataKind = MetadataKind::$kind;

            fn collection(store: &MetadataStore) -> &MetadataCollection<Self> {
                &store.$field
            }

            fn collection_mut(store: &mut MetadataStore) -> &mut MetadataCollection<Self> {
                &mut store.$field
            }
        }
    };
}

metadata_entry!(DatabaseInfo, Databases, databases);
metadata_entry!(TableInfo, Tables, tables);
metadata_entry!(ViewInfo, Views, views);
metadata_entry!(RoutineInfo, Routines, routines);
metadata_entry!(ColumnInfo, Columns, columns);
metadata_entry!(TriggerInfo, Triggers, triggers);

#[derive(Debug, Default)]
pub struct MetadataStore {
    databases: MetadataCollection<DatabaseInfo>,
    tables: MetadataCollection<TableInfo>,
    views: MetadataCollection<ViewInfo>,
    routines: MetadataCollection<RoutineInfo>,
    columns: MetadataCollection<ColumnInfo>,
    triggers: MetadataCollection<TriggerInfo>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: MetadataEntry>(&self, scope: &ScopeKey) -> Option<&[T]> {
        T::collection(self).get(scope)
    }

    pub fn collection<T: MetadataEntry>(&self) -> &MetadataCollection<T> {
        T::collection(self)
    }

    pub fn collection_mut<T: MetadataEntry>(&mut self) -> &mut MetadataCollection<T> {
        T::collection_mut(self)
    }

    pub fn put<T: MetadataEntry>(&mut self, scope: ScopeKey, entries: Vec<T>) {
        T::collection_mut(self).put(scope, entries);
    }

    pub fn mark_fetching<T: MetadataEntry>(&mut self, scope: ScopeKey) {
        T::collection_mut(self).mark_fetching(scope);
    }

    pub fn flags(&self, kind: MetadataKind) -> &dyn CollectionFlags {
        match kind {
            MetadataKind::Databases => &self.databases,
            MetadataKind::Tables => &self.tables,
            MetadataKind::Views => &self.views,
            MetadataKind::Routines => &self.routines,
            MetadataKind::Columns => &self.columns,
            MetadataKind::Triggers => &self.triggers,
        }
    }

    pub fn invalidate(&mut self, kind: MetadataKind, invalidation: &Invalidation) -> bool {
        match kind {
            MetadataKind::Databases => self.databases.invalidate(invalidation),
            MetadataKind::Tables => self.tables.invalidate(invalidation),
            MetadataKind::Views => self.views.invalidate(invalidation),
            MetadataKind::Routines => self.routines.invalidate(invalidation),
            MetadataKind::Columns => self.columns.invalidate(invalidation),
            MetadataKind::Triggers => self.triggers.invalidate(invalidation),
        }
    }

    /// Mark everything stale and drop in-flight markers (same server reconnect).
    pub fn invalidate_all(&mut self) {
        for kind in MetadataKind::all() {
            self.invalidate(*kind, &Invalidation::All);
        }
        self.databases.abandon_in_flight();
        self.tables.abandon_in_flight();
        self.views.abandon_in_flight();
        self.routines.abandon_in_flight();
        self.columns.abandon_in_flight();
        self.triggers.abandon_in_flight();
    }

    /// Drop everything (different server).
    pub fn reset(&mut self) {
        self.databases.clear();
        self.tables.clear();
        self.views.clear();
        self.routines.clear();
        self.columns.clear();
        self.triggers.clear();
    }

    pub fn databases(&self) -> &[DatabaseInfo] {
        self.databases.get(&ScopeKey::Server).unwrap_or_default()
    }

    /// Databases whose name matches `pattern`, case-insensitively. The pattern
    /// is a regular expression; an invalid one is matched as plain text.
    pub fn filter_databases(&self, pattern: &str) -> Vec<DatabaseInfo> {
        let databases = self.databases();
        if pattern.is_empty() {
            return databases.to_vec();
        }

        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => databases.iter().filter(|db| regex.is_match(&db.name)).cloned().collect(),
            Err(_) => {
                let needle = pattern.to_lowercase();
                databases
                    .iter()
                    .filter(|db| db.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(names: &[&str]) -> Vec<TableInfo> {
        names.iter().map(|name| TableInfo::named(*name)).collect()
    }

    #[test]
    fn should_fetch_follows_presence_fetching_and_invalidation() {
        let mut collection = MetadataCollection::<TableInfo>::default();
        let db1 = ScopeKey::database("db1");

        assert!(collection.should_fetch(&db1));

        collection.mark_fetching(db1.clone());
        assert!(!collection.should_fetch(&db1));
        assert!(collection.is_fetching());

        collection.put(db1.clone(), tables(&["users"]));
        assert!(!collection.is_fetching());
        assert!(!collection.should_fetch(&db1));

        assert!(collection.invalidate(&Invalidation::Scope(db1.clone())));
        assert!(collection.did_invalidate());
        assert!(collection.should_fetch(&db1));

        collection.put(db1.clone(), tables(&["users", "orders"]));
        assert!(!collection.did_invalidate());
        assert_eq!(collection.get(&db1).map(<[_]>::len), Some(2));
    }

    #[test]
    fn different_scopes_fetch_independently() {
        let mut collection = MetadataCollection::<TableInfo>::default();
        collection.mark_fetching(ScopeKey::database("db1"));

        assert!(collection.should_fetch(&ScopeKey::database("db2")));
    }

    #[test]
    fn fail_keeps_prior_entries() {
        let mut collection = MetadataCollection::<TableInfo>::default();
        let db1 = ScopeKey::database("db1");
        collection.put(db1.clone(), tables(&["users"]));
        collection.invalidate(&Invalidation::All);
        collection.mark_fetching(db1.clone());

        collection.fail(&db1, "boom");

        assert!(!collection.is_fetching());
        assert_eq!(collection.get(&db1).map(<[_]>::len), Some(1));
        assert_eq!(collection.error().map(|e| e.message.as_str()), Some("boom"));
        assert!(collection.should_fetch(&db1));
    }

    #[test]
    fn invalidate_database_marks_only_its_tables() {
        let mut collection = MetadataCollection::<ColumnInfo>::default();
        let users = ScopeKey::table("db1", "users");
        let events = ScopeKey::table("db2", "events");
        collection.put(users.clone(), Vec::new());
        collection.put(events.clone(), Vec::new());

        assert!(collection.invalidate(&Invalidation::Database("db1".into())));
        assert!(collection.should_fetch(&users));
        assert!(!collection.should_fetch(&events));
        assert!(!collection.invalidate(&Invalidation::Database("db3".into())));
    }

    #[test]
    fn invalidate_all_marks_every_cached_kind() {
        let mut store = MetadataStore::new();
        store.put(ScopeKey::Server, vec![DatabaseInfo::named("db1")]);
        store.put(ScopeKey::database("db1"), tables(&["users"]));
        store.mark_fetching::<ViewInfo>(ScopeKey::database("db1"));

        store.invalidate_all();

        assert!(store.flags(MetadataKind::Databases).did_invalidate());
        assert!(store.flags(MetadataKind::Tables).did_invalidate());
        assert!(!store.flags(MetadataKind::Views).is_fetching());
        assert!(store.flags(MetadataKind::Tables).should_fetch(&ScopeKey::database("db1")));
    }

    #[test]
    fn filter_databases_is_case_insensitive() {
        let mut store = MetadataStore::new();
        store.put(
            ScopeKey::Server,
            vec![
                DatabaseInfo::named("Sales"),
                DatabaseInfo::named("analytics"),
                DatabaseInfo::named("sales_archive"),
            ],
        );

        let names = |dbs: Vec<DatabaseInfo>| dbs.into_iter().map(|db| db.name).collect::<Vec<_>>();
        assert_eq!(names(store.filter_databases("sales")), vec!["Sales", "sales_archive"]);
        assert_eq!(names(store.filter_databases("^an")), vec!["analytics"]);
        assert_eq!(names(store.filter_databases("")).len(), 3);
        assert!(store.filter_databases("sales(").is_empty());
    }
}
