//! Depth-first traversal of the object graph.
//!
//! The walk follows the node table strictly top-down. Each level's visitor
//! output is pushed onto a chain of ancestor contributions; reaching a leaf
//! merges the chain into one [`FlatRecord`]. The chain is popped on the way
//! back up, so siblings never see each other's values.

use sdtm_model::{ConfigurationError, ExportError, FlatRecord, TraversalError, Variable};
use tracing::{debug, trace};

use crate::definition::ExportDefinition;
use crate::merge::{Contribution, merge, resolve};
use crate::nodes::NodeDescriptor;
use crate::store::DomainObject;

pub(crate) struct Traversal<'d, V: Variable, O> {
    definition: &'d ExportDefinition<V, O>,
    chain: Vec<Contribution<V>>,
    records: Vec<FlatRecord<V>>,
}

impl<'d, V: Variable, O: DomainObject> Traversal<'d, V, O> {
    pub(crate) fn new(definition: &'d ExportDefinition<V, O>) -> Self {
        Self {
            definition,
            chain: Vec::with_capacity(definition.nodes().len()),
            records: Vec::new(),
        }
    }

    /// Visits an ancestor of a subtree without descending from it.
    pub(crate) fn enter(&mut self, object: &O, level: usize) -> Result<(), ExportError> {
        let descriptor = self.descriptor(level)?;
        check_record_type(object, level, descriptor)?;
        let contribution = self.visit(object, descriptor)?;
        self.chain.push(contribution);
        Ok(())
    }

    /// Walks `object` at `level` and everything below it.
    ///
    /// `sequence` is the object's 1-based position in its parent's collection;
    /// only leaves use it.
    pub(crate) fn walk(&mut self, object: &O, level: usize, sequence: u32) -> Result<(), ExportError> {
        let descriptor = self.descriptor(level)?;
        check_record_type(object, level, descriptor)?;
        let contribution = self.visit(object, descriptor)?;
        self.chain.push(contribution);
        let result = match descriptor.child_relation() {
            None => self.emit(object, sequence),
            Some(relation) => self.descend(object, level, relation),
        };
        self.chain.pop();
        result
    }

    pub(crate) fn finish(self) -> Vec<FlatRecord<V>> {
        self.records
    }

    fn descriptor(&self, level: usize) -> Result<&'d NodeDescriptor, TraversalError> {
        let nodes = self.definition.nodes();
        nodes.get(level).ok_or(TraversalError::LevelOutOfRange {
            level,
            depth: nodes.len(),
        })
    }

    fn visit(&self, object: &O, descriptor: &NodeDescriptor) -> Result<Contribution<V>, ExportError> {
        let record_type = descriptor.record_type();
        let identity = object.identity();
        let visitor = self.definition.visitors().get(record_type).ok_or_else(|| {
            ConfigurationError::MissingVisitor {
                record_type: record_type.to_string(),
            }
        })?;
        let partial = visitor
            .visit(object)
            .map_err(|source| TraversalError::Visitor {
                record_type: record_type.to_string(),
                identity: identity.clone(),
                source,
            })?;
        let values = resolve(
            partial,
            record_type,
            self.definition.lookup(),
            self.definition.reserved(),
        )?;
        trace!(
            record_type = %record_type,
            identity = %identity,
            fields = values.len(),
            "visited node"
        );
        Ok(Contribution {
            record_type: record_type.to_string(),
            identity,
            values,
        })
    }

    fn descend(&mut self, object: &O, level: usize, relation: &str) -> Result<(), ExportError> {
        let children = fetch_children(self.definition, object, relation)?;
        if children.is_empty() {
            debug!(
                record_type = %object.record_type(),
                identity = %object.identity(),
                relation = %relation,
                "empty child collection"
            );
        }
        for (index, child) in children.iter().enumerate() {
            let sequence = u32::try_from(index + 1).unwrap_or(u32::MAX);
            self.walk(child, level + 1, sequence)?;
        }
        Ok(())
    }

    fn emit(&mut self, object: &O, sequence: u32) -> Result<(), ExportError> {
        let mut values = merge(&self.chain)?;
        self.definition.apply_derived(&mut values, sequence);
        if let Some(parent) = self.chain.iter().rev().nth(1) {
            trace!(
                parent_type = %parent.record_type,
                parent = %parent.identity,
                sequence,
                "emitted record"
            );
        }
        self.records
            .push(FlatRecord::new(values, object.identity(), sequence));
        Ok(())
    }
}

/// Fetches and orders the members of a child collection.
pub(crate) fn fetch_children<V: Variable, O: DomainObject>(
    definition: &ExportDefinition<V, O>,
    object: &O,
    relation: &str,
) -> Result<Vec<O>, TraversalError> {
    let children = object
        .children(relation)
        .map_err(|source| TraversalError::Relation {
            record_type: object.record_type().to_string(),
            identity: object.identity(),
            relation: relation.to_string(),
            source,
        })?;
    Ok(definition.order_children(children))
}

fn check_record_type<O: DomainObject>(
    object: &O,
    level: usize,
    descriptor: &NodeDescriptor,
) -> Result<(), TraversalError> {
    if object.record_type() == descriptor.record_type() {
        return Ok(());
    }
    Err(TraversalError::UnexpectedRecordType {
        level,
        expected: descriptor.record_type().to_string(),
        found: object.record_type().to_string(),
        identity: object.identity(),
    })
}
