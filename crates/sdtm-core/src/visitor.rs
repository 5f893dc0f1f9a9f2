//! Visitor dispatch: one callback per record type.
//!
//! Each level of the node table has a visitor that maps an instance of that
//! record type to the [`PartialRecord`] it contributes. Visitors are looked up
//! in a [`VisitorRegistry`] by record type name; the registry is checked
//! against the node table when the export definition is built, so a missing
//! visitor is a configuration error rather than a failure halfway through an
//! export.
//!
//! Any `Fn(&O) -> anyhow::Result<PartialRecord<V>>` closure is a visitor:
//!
//! ```ignore
//! registry.register("Participant", |participant: &Participant| {
//!     Ok(PartialRecord::new().with(Cm::Usubjid, participant.usubjid.as_str()))
//! })?;
//! ```

use std::collections::HashMap;

use anyhow::Result;
use sdtm_model::{ConfigurationError, PartialRecord, Variable};

use crate::nodes::NodeTable;

/// Maps one instance of a record type to its field contribution.
///
/// Visitors must not mutate the store; they may read related objects.
pub trait Visitor<V: Variable, O>: Send + Sync {
    fn visit(&self, object: &O) -> Result<PartialRecord<V>>;
}

impl<V, O, F> Visitor<V, O> for F
where
    V: Variable,
    F: Fn(&O) -> Result<PartialRecord<V>> + Send + Sync,
{
    fn visit(&self, object: &O) -> Result<PartialRecord<V>> {
        self(object)
    }
}

/// Registry of visitors indexed by record type.
pub struct VisitorRegistry<V: Variable, O> {
    visitors: HashMap<String, Box<dyn Visitor<V, O>>>,
}

impl<V: Variable, O> Default for VisitorRegistry<V, O> {
    fn default() -> Self {
        Self {
            visitors: HashMap::new(),
        }
    }
}

impl<V: Variable, O> VisitorRegistry<V, O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the visitor for a record type.
    ///
    /// # Errors
    ///
    /// Fails if the record type already has a visitor.
    pub fn register(
        &mut self,
        record_type: impl Into<String>,
        visitor: impl Visitor<V, O> + 'static,
    ) -> Result<(), ConfigurationError> {
        self.insert(record_type.into(), Box::new(visitor))
    }

    pub(crate) fn insert(
        &mut self,
        record_type: String,
        visitor: Box<dyn Visitor<V, O>>,
    ) -> Result<(), ConfigurationError> {
        if self.visitors.contains_key(&record_type) {
            return Err(ConfigurationError::DuplicateVisitor { record_type });
        }
        self.visitors.insert(record_type, visitor);
        Ok(())
    }

    pub fn get(&self, record_type: &str) -> Option<&dyn Visitor<V, O>> {
        self.visitors.get(record_type).map(Box::as_ref)
    }

    /// Registered record types, sorted.
    pub fn record_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.visitors.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    /// Checks that every level has a visitor and every visitor has a level.
    pub fn validate(&self, nodes: &NodeTable) -> Result<(), ConfigurationError> {
        for record_type in nodes.record_types() {
            if !self.visitors.contains_key(record_type) {
                return Err(ConfigurationError::MissingVisitor {
                    record_type: record_type.to_string(),
                });
            }
        }
        for record_type in self.record_types() {
            if nodes.level_of(record_type).is_none() {
                return Err(ConfigurationError::UnknownVisitor {
                    record_type: record_type.to_string(),
                });
            }
        }
        Ok(())
    }
}
