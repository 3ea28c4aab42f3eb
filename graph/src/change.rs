//! Invertible changes to the object graph.

use rewind_core::{Element, ElementId};
use serde::{Deserialize, Serialize};

use crate::Schema;

/// A single reversible mutation.
///
/// Every variant carries enough state to build its exact inverse, so a
/// change-set can be reversed without consulting the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Change {
    /// Insert an element.
    Insert(Element),

    /// Delete an element. Holds the element as it was before deletion.
    Delete(Element),

    /// Replace an element's class and properties.
    Update { before: Element, after: Element },

    /// Import a schema.
    ImportSchema(Schema),

    /// Remove a previously imported schema.
    DropSchema(Schema),
}

impl Change {
    /// Build the change that undoes this one.
    pub fn inverse(&self) -> Change {
        match self {
            Change::Insert(element) => Change::Delete(element.clone()),
            Change::Delete(element) => Change::Insert(element.clone()),
            Change::Update { before, after } => Change::Update {
                before: after.clone(),
                after: before.clone(),
            },
            Change::ImportSchema(schema) => Change::DropSchema(schema.clone()),
            Change::DropSchema(schema) => Change::ImportSchema(schema.clone()),
        }
    }

    /// The element this change touches, if any.
    pub fn element_id(&self) -> Option<ElementId> {
        match self {
            Change::Insert(element) | Change::Delete(element) => Some(element.id),
            Change::Update { after, .. } => Some(after.id),
            Change::ImportSchema(_) | Change::DropSchema(_) => None,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Change::Insert(_) => "insert",
            Change::Delete(_) => "delete",
            Change::Update { .. } => "update",
            Change::ImportSchema(_) => "import_schema",
            Change::DropSchema(_) => "drop_schema",
        }
    }
}

/// An ordered list of changes applied as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Create an empty change-set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a change.
    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Returns true if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Iterate the changes in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// The change-set that undoes this one: inverted changes in reverse order.
    pub fn inverse(&self) -> ChangeSet {
        ChangeSet {
            changes: self.changes.iter().rev().map(Change::inverse).collect(),
        }
    }

    /// Element ids touched by this change-set.
    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.changes.iter().filter_map(Change::element_id)
    }
}

impl From<Vec<Change>> for ChangeSet {
    fn from(changes: Vec<Change>) -> Self {
        Self { changes }
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
