//! Schema definitions.
//!
//! A schema names a set of element classes. The graph only uses schemas to
//! decide which class names are known; property definitions are carried
//! along for callers but never enforced here.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// IO error while reading the schema file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not a valid schema.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Schema or class name is empty or contains a ':' separator.
    #[error("invalid name: {name:?}")]
    InvalidName { name: String },
}

impl SchemaError {
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }
}

/// A property declared on a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    /// Type name as written in the schema document (e.g. `"int"`).
    pub kind: String,
}

/// An element class declared by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
}

/// A named set of classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub classes: Vec<ClassDef>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: String::new(),
            classes: Vec::new(),
        }
    }

    /// Add a class with the given property names, builder style.
    pub fn with_class(mut self, name: impl Into<String>, properties: &[(&str, &str)]) -> Self {
        self.classes.push(ClassDef {
            name: name.into(),
            properties: properties
                .iter()
                .map(|(name, kind)| PropertyDef {
                    name: name.to_string(),
                    kind: kind.to_string(),
                })
                .collect(),
        });
        self
    }

    /// Parse a schema from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.check_names()?;
        Ok(schema)
    }

    /// Load a schema from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Look up a class by its short name.
    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Full names (`"Schema:Class"`) of every class.
    pub fn full_class_names(&self) -> impl Iterator<Item = String> + '_ {
        self.classes
            .iter()
            .map(move |c| format!("{}:{}", self.name, c.name))
    }

    fn check_names(&self) -> Result<(), SchemaError> {
        let bad = |name: &str| name.is_empty() || name.contains(':');
        if bad(&self.name) {
            return Err(SchemaError::invalid_name(&self.name));
        }
        if let Some(class) = self.classes.iter().find(|c| bad(&c.name)) {
            return Err(SchemaError::invalid_name(&class.name));
        }
        Ok(())
    }
}
