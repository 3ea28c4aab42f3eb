//! The element structure stored in the object graph.

use crate::{ElementId, Props, Value};
use serde::{Deserialize, Serialize};

/// An element: a typed bag of properties with a stable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier for this element.
    pub id: ElementId,
    /// Full class name, `"Schema:Class"`.
    pub class: String,
    /// Property values.
    pub props: Props,
}

impl Element {
    /// Create a new element with the given properties.
    pub fn new(id: ElementId, class: impl Into<String>, props: Props) -> Self {
        Self {
            id,
            class: class.into(),
            props,
        }
    }

    /// Get a property value by name.
    pub fn get_prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    /// Set a property value, returning the previous one.
    pub fn set_prop(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.props.insert(name.into(), value.into())
    }

    /// Remove a property.
    pub fn remove_prop(&mut self, name: &str) -> Option<Value> {
        self.props.remove(name)
    }

    /// Split the class name into its schema and class parts.
    pub fn class_parts(&self) -> Option<(&str, &str)> {
        split_class_name(&self.class)
    }
}

/// Split `"Schema:Class"` into `("Schema", "Class")`.
pub fn split_class_name(full_name: &str) -> Option<(&str, &str)> {
    let (schema, class) = full_name.split_once(':')?;
    if schema.is_empty() || class.is_empty() {
        return None;
    }
    Some((schema, class))
}
