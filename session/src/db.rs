//! The host database session.

use std::path::Path;

use rewind_core::{Element, ElementId, Props, TxnId, Value};
use rewind_graph::{Change, Graph, Schema};
use rewind_journal::{ChangeLog, FileJournal, MemoryJournal};
use rewind_transaction::{LoggedStore, SessionState, TxnManager, Txns};
use tracing::{debug, warn};

use crate::config::DbConfig;
use crate::error::SessionResult;

/// The store a [`Db`] manages.
pub type DbStore = LoggedStore<Box<dyn ChangeLog>>;

/// A local object database with undo/redo.
///
/// Edits are applied immediately and stay unsaved until
/// [`save_changes`](Self::save_changes) records them as a transaction.
pub struct Db {
    store: DbStore,
    txns: TxnManager,
    config: DbConfig,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("config", &self.config)
            .field("elements", &self.store.graph().element_count())
            .field("txns", &self.txns)
            .finish()
    }
}

impl Db {
    /// Open a database.
    pub fn open(config: DbConfig) -> SessionResult<Self> {
        let mut log: Box<dyn ChangeLog> = match &config.path {
            None => Box::new(MemoryJournal::new()),
            Some(path) => Box::new(FileJournal::open_with(
                path,
                config.create_if_missing,
                config.sync_on_commit,
            )?),
        };
        if config.compact_on_open {
            log.compact()?;
        }

        let store = LoggedStore::open(log)?;
        debug!(
            path = ?config.path,
            cursor = %store.log().sequencer().current(),
            "database opened"
        );

        Ok(Self {
            store,
            txns: TxnManager::new(),
            config,
        })
    }

    /// Open a database with an in-memory journal.
    pub fn open_in_memory() -> SessionResult<Self> {
        Self::open(DbConfig::in_memory())
    }

    /// Open a database over a journal file, creating it if missing.
    pub fn open_file(path: impl AsRef<Path>) -> SessionResult<Self> {
        Self::open(DbConfig::file(path))
    }

    /// Get the configuration the database was opened with.
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Get the object graph.
    pub fn graph(&self) -> &Graph {
        self.store.graph()
    }

    // ========== Elements ==========

    /// Insert an element. Returns its id.
    pub fn insert_element(&mut self, class: &str, props: Props) -> SessionResult<ElementId> {
        let element = self.store.graph_mut().insert_element(class, props)?.clone();
        let id = element.id;
        self.txns.record(Change::Insert(element));
        Ok(id)
    }

    /// Get an element.
    pub fn get_element(&self, id: ElementId) -> SessionResult<&Element> {
        Ok(self.store.graph().get_element(id)?)
    }

    /// Replace an element's class and properties.
    pub fn update_element(&mut self, element: Element) -> SessionResult<()> {
        let before = self.store.graph_mut().update_element(element.clone())?;
        self.txns.record(Change::Update {
            before,
            after: element,
        });
        Ok(())
    }

    /// Set one property. Returns the previous value.
    pub fn set_element_prop(
        &mut self,
        id: ElementId,
        name: &str,
        value: impl Into<Value>,
    ) -> SessionResult<Option<Value>> {
        let mut element = self.get_element(id)?.clone();
        let previous = element.set_prop(name, value);
        self.update_element(element)?;
        Ok(previous)
    }

    /// Delete an element. Returns it as it was.
    pub fn delete_element(&mut self, id: ElementId) -> SessionResult<Element> {
        let removed = self.store.graph_mut().delete_element(id)?;
        self.txns.record(Change::Delete(removed.clone()));
        Ok(removed)
    }

    /// Number of elements.
    pub fn element_count(&self) -> usize {
        self.store.graph().element_count()
    }

    // ========== Schemas ==========

    /// Import a schema as an unsaved edit.
    pub fn import_schema(&mut self, schema: Schema) -> SessionResult<()> {
        self.store.graph_mut().import_schema(schema.clone())?;
        debug!(schema = %schema.name, classes = schema.classes.len(), "schema imported");
        self.txns.record(Change::ImportSchema(schema));
        Ok(())
    }

    /// Import a schema from a JSON string.
    pub fn import_schema_json(&mut self, json: &str) -> SessionResult<()> {
        let schema = Schema::from_json(json)?;
        self.import_schema(schema)
    }

    /// Import a schema from a JSON file.
    pub fn import_schema_file(&mut self, path: impl AsRef<Path>) -> SessionResult<()> {
        let schema = Schema::from_file(path)?;
        self.import_schema(schema)
    }

    // ========== Transactions ==========

    /// Save unsaved edits as a transaction. Returns `None` if there were none.
    pub fn save_changes(&mut self, description: &str) -> SessionResult<Option<TxnId>> {
        Ok(self.txns.save_changes(&mut self.store, description)?)
    }

    /// Discard unsaved edits.
    pub fn abandon_changes(&mut self) -> SessionResult<()> {
        Ok(self.txns.abandon_changes(&mut self.store)?)
    }

    /// Check if there are edits not yet saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.txns.has_unsaved_changes()
    }

    /// Undo/redo and listener operations.
    pub fn txns(&mut self) -> Txns<'_, DbStore> {
        Txns::new(&mut self.txns, &mut self.store)
    }

    /// Snapshot of unsaved, pending and local state.
    pub fn state(&self) -> SessionState {
        self.txns.state(&self.store)
    }

    // ========== Lifecycle ==========

    /// Rewrite the journal with only what is retained.
    pub fn compact(&mut self) -> SessionResult<()> {
        self.store.log_mut().compact()?;
        Ok(())
    }

    /// Sync the journal and close the database. Unsaved edits are lost.
    pub fn close(mut self) -> SessionResult<()> {
        if self.txns.has_unsaved_changes() {
            warn!(
                changes = self.txns.unsaved_changes().len(),
                "closing with unsaved changes"
            );
        }
        self.store.log_mut().sync()?;
        Ok(())
    }
}
