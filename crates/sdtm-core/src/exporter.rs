//! The export facade: one definition applied to one root instance.

use sdtm_model::{ExportError, Result, TraversalError, Variable};
use tracing::{debug, info, info_span};

use crate::dataset::{Dataset, sort_records};
use crate::definition::ExportDefinition;
use crate::store::DomainObject;
use crate::traversal::{Traversal, fetch_children};

/// Runs an [`ExportDefinition`] from one root instance.
///
/// Holds no state between runs: every call re-reads the store, so repeated
/// exports reflect its current contents.
#[derive(Debug)]
pub struct Exporter<'d, V: Variable, O> {
    definition: &'d ExportDefinition<V, O>,
    root: O,
}

impl<'d, V: Variable, O: DomainObject> Exporter<'d, V, O> {
    pub fn new(definition: &'d ExportDefinition<V, O>, root: O) -> Self {
        Self { definition, root }
    }

    pub fn definition(&self) -> &'d ExportDefinition<V, O> {
        self.definition
    }

    pub fn root(&self) -> &O {
        &self.root
    }

    /// Produces one flat record per root-to-leaf path below the root.
    ///
    /// # Errors
    ///
    /// Fails on the first visitor, relation, merge or configuration error;
    /// no partial result is returned.
    pub fn export(&self) -> Result<Dataset<V>> {
        let span = info_span!(
            "export",
            domain = %self.definition.domain(),
            root = %self.root.identity()
        );
        let _guard = span.enter();

        let mut traversal = Traversal::new(self.definition);
        traversal.walk(&self.root, 0, 1)?;
        let dataset = self.finish(traversal);
        info!(records = dataset.len(), "export complete");
        Ok(dataset)
    }

    /// Exports only the records below `node`, which must lie inside this
    /// exporter's tree.
    ///
    /// Ancestors are found through parent relations and visited root-first
    /// so their fields still reach every row. When `node` is a leaf its
    /// sequence number is its position in its parent's collection.
    ///
    /// # Errors
    ///
    /// Besides the errors of [`Exporter::export`], fails when `node` is the
    /// root, its record type is not in the node table, a parent is missing,
    /// or its ancestry ends somewhere other than this exporter's root.
    pub fn export_subtree(&self, node: &O) -> Result<Dataset<V>> {
        let span = info_span!(
            "export_subtree",
            domain = %self.definition.domain(),
            root = %self.root.identity(),
            node = %node.identity()
        );
        let _guard = span.enter();

        let nodes = self.definition.nodes();
        let level = nodes
            .level_of(node.record_type())
            .ok_or_else(|| TraversalError::UnknownRecordType {
                record_type: node.record_type().to_string(),
                identity: node.identity(),
            })?;
        if level == 0 {
            return Err(TraversalError::SubtreeIsRoot {
                identity: node.identity(),
            }
            .into());
        }

        // ancestors[0] is the direct parent, the last entry is the root.
        let mut ancestors: Vec<O> = Vec::with_capacity(level);
        for current in (1..=level).rev() {
            let child = ancestors.last().unwrap_or(node);
            let parent = self.parent_of(child, current)?;
            ancestors.push(parent);
        }
        let top = ancestors.last().ok_or_else(|| TraversalError::SubtreeIsRoot {
            identity: node.identity(),
        })?;
        if !top.same_object(&self.root) {
            return Err(TraversalError::ForeignSubtree {
                identity: node.identity(),
                root: self.root.identity(),
            }
            .into());
        }
        debug!(depth = ancestors.len(), "resolved subtree ancestry");

        let sequence = if level == nodes.leaf_level() {
            self.position_in_parent(node, &ancestors[0], level)?
        } else {
            1
        };

        let mut traversal = Traversal::new(self.definition);
        for (ancestor_level, ancestor) in ancestors.iter().rev().enumerate() {
            traversal.enter(ancestor, ancestor_level)?;
        }
        traversal.walk(node, level, sequence)?;
        let dataset = self.finish(traversal);
        info!(records = dataset.len(), "subtree export complete");
        Ok(dataset)
    }

    fn finish(&self, traversal: Traversal<'d, V, O>) -> Dataset<V> {
        let mut records = traversal.finish();
        sort_records(&mut records, self.definition.sort_by());
        Dataset::new(
            self.definition.domain().clone(),
            self.definition.label(),
            self.root.identity(),
            records,
        )
    }

    /// Resolves the parent of `child`, which sits at `level` (> 0).
    fn parent_of(&self, child: &O, level: usize) -> Result<O> {
        let relation = self
            .definition
            .nodes()
            .get(level)
            .and_then(|descriptor| descriptor.parent_relation())
            .unwrap_or_default();
        let parent = child
            .parent(relation)
            .map_err(|source| TraversalError::Relation {
                record_type: child.record_type().to_string(),
                identity: child.identity(),
                relation: relation.to_string(),
                source,
            })?;
        parent.ok_or_else(|| {
            ExportError::from(TraversalError::MissingParent {
                record_type: child.record_type().to_string(),
                identity: child.identity(),
                relation: relation.to_string(),
            })
        })
    }

    fn position_in_parent(&self, node: &O, parent: &O, level: usize) -> Result<u32> {
        let relation = self
            .definition
            .nodes()
            .get(level - 1)
            .and_then(|descriptor| descriptor.child_relation())
            .unwrap_or_default();
        let siblings = fetch_children(self.definition, parent, relation)?;
        let index = siblings
            .iter()
            .position(|sibling| sibling.same_object(node))
            .ok_or_else(|| TraversalError::NotAChild {
                record_type: node.record_type().to_string(),
                identity: node.identity(),
            })?;
        Ok(u32::try_from(index + 1).unwrap_or(u32::MAX))
    }
}
