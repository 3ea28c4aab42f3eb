//! Core object graph implementation.

use rewind_core::{split_class_name, Element, ElementId, GraphError, GraphResult, Props};
use std::collections::{BTreeMap, HashMap};
use tracing::error;

use crate::{Change, ChangeSet, Schema};

/// ID allocator for elements.
#[derive(Debug)]
struct IdAllocator {
    next_element_id: u64,
}

impl IdAllocator {
    fn new() -> Self {
        Self { next_element_id: 1 }
    }

    fn alloc_element_id(&mut self) -> ElementId {
        let id = ElementId::new(self.next_element_id);
        self.next_element_id += 1;
        id
    }

    /// Make sure `id` is never handed out again.
    fn reserve(&mut self, id: ElementId) {
        if id.raw() >= self.next_element_id {
            self.next_element_id = id.raw() + 1;
        }
    }
}

/// The in-memory object graph.
#[derive(Debug)]
pub struct Graph {
    /// Element storage
    elements: HashMap<ElementId, Element>,
    /// Imported schemas by name
    schemas: BTreeMap<String, Schema>,
    /// ID allocator
    id_alloc: IdAllocator,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            elements: HashMap::new(),
            schemas: BTreeMap::new(),
            id_alloc: IdAllocator::new(),
        }
    }

    // ==================== Element Operations ====================

    /// Insert a new element of a known class. Returns the inserted element.
    pub fn insert_element(&mut self, class: &str, props: Props) -> GraphResult<&Element> {
        if !self.has_class(class) {
            return Err(GraphError::unknown_class(class));
        }

        let id = self.id_alloc.alloc_element_id();
        let element = Element::new(id, class, props);
        Ok(self.elements.entry(id).or_insert(element))
    }

    /// Get an element by ID.
    pub fn get_element(&self, id: ElementId) -> GraphResult<&Element> {
        self.elements.get(&id).ok_or(GraphError::ElementNotFound(id))
    }

    /// Get an element by ID, if present.
    pub fn find_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Returns true if the element exists.
    pub fn contains_element(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Replace an existing element. Returns the element as it was before.
    pub fn update_element(&mut self, element: Element) -> GraphResult<Element> {
        if element.class != self.get_element(element.id)?.class && !self.has_class(&element.class) {
            return Err(GraphError::unknown_class(&element.class));
        }

        let slot = self
            .elements
            .get_mut(&element.id)
            .ok_or(GraphError::ElementNotFound(element.id))?;
        Ok(std::mem::replace(slot, element))
    }

    /// Delete an element. Returns the removed element.
    pub fn delete_element(&mut self, id: ElementId) -> GraphResult<Element> {
        self.elements
            .remove(&id)
            .ok_or(GraphError::ElementNotFound(id))
    }

    // ==================== Schema Operations ====================

    /// Import a schema.
    pub fn import_schema(&mut self, schema: Schema) -> GraphResult<()> {
        if self.schemas.contains_key(&schema.name) {
            return Err(GraphError::SchemaAlreadyImported(schema.name));
        }
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Remove an imported schema. Returns the removed schema.
    pub fn drop_schema(&mut self, name: &str) -> GraphResult<Schema> {
        self.schemas
            .remove(name)
            .ok_or_else(|| GraphError::SchemaNotFound(name.to_string()))
    }

    /// Get an imported schema by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Returns true if `"Schema:Class"` names a class of an imported schema.
    pub fn has_class(&self, full_name: &str) -> bool {
        split_class_name(full_name)
            .and_then(|(schema, class)| self.schemas.get(schema)?.class(class))
            .is_some()
    }

    // ==================== Change Application ====================

    /// Apply a single change.
    pub fn apply(&mut self, change: &Change) -> GraphResult<()> {
        match change {
            Change::Insert(element) => {
                if self.elements.contains_key(&element.id) {
                    return Err(GraphError::ElementExists(element.id));
                }
                self.id_alloc.reserve(element.id);
                self.elements.insert(element.id, element.clone());
            }

            Change::Delete(element) => {
                self.delete_element(element.id)?;
            }

            Change::Update { after, .. } => {
                let slot = self
                    .elements
                    .get_mut(&after.id)
                    .ok_or(GraphError::ElementNotFound(after.id))?;
                *slot = after.clone();
            }

            Change::ImportSchema(schema) => {
                self.import_schema(schema.clone())?;
            }

            Change::DropSchema(schema) => {
                self.drop_schema(&schema.name)?;
            }
        }
        Ok(())
    }

    /// Apply every change in order, or none of them.
    ///
    /// If a change fails, the ones already applied are undone in reverse
    /// order before the error is returned.
    pub fn apply_all(&mut self, changes: &ChangeSet) -> GraphResult<()> {
        for (applied, change) in changes.iter().enumerate() {
            if let Err(err) = self.apply(change) {
                for done in changes.iter().take(applied).rev() {
                    if let Err(undo_err) = self.apply(&done.inverse()) {
                        error!(
                            change = done.kind(),
                            error = %undo_err,
                            "failed to roll back partially applied change-set"
                        );
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Reserve every element id inserted by `changes` without applying them.
    ///
    /// Used for change-sets that are retained but not applied (redoable
    /// transactions), so that new inserts never collide with them.
    pub fn reserve_ids(&mut self, changes: &ChangeSet) {
        for id in changes.element_ids() {
            self.id_alloc.reserve(id);
        }
    }

    // ==================== Statistics ====================

    /// Get the number of elements in the graph.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Get all element IDs.
    pub fn all_element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.keys().copied()
    }

    /// Get the number of imported schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}
