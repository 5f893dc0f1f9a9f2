//! Node descriptor table: the root-to-leaf path an export walks.

use sdtm_model::ConfigurationError;

/// One level of the export path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    record_type: String,
    child_relation: Option<String>,
    parent_relation: Option<String>,
}

impl NodeDescriptor {
    pub fn new(
        record_type: impl Into<String>,
        child_relation: Option<&str>,
        parent_relation: Option<&str>,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            child_relation: child_relation.map(str::to_string),
            parent_relation: parent_relation.map(str::to_string),
        }
    }

    /// First level: descends through `child_relation`, has no parent.
    pub fn root(record_type: impl Into<String>, child_relation: &str) -> Self {
        Self::new(record_type, Some(child_relation), None)
    }

    /// Intermediate level.
    pub fn branch(record_type: impl Into<String>, child_relation: &str, parent_relation: &str) -> Self {
        Self::new(record_type, Some(child_relation), Some(parent_relation))
    }

    /// Last level: one flat record per instance.
    pub fn leaf(record_type: impl Into<String>, parent_relation: &str) -> Self {
        Self::new(record_type, None, Some(parent_relation))
    }

    /// A one-level table: the root is also the leaf.
    pub fn single(record_type: impl Into<String>) -> Self {
        Self::new(record_type, None, None)
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn child_relation(&self) -> Option<&str> {
        self.child_relation.as_deref()
    }

    pub fn parent_relation(&self) -> Option<&str> {
        self.parent_relation.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.child_relation.is_none()
    }
}

/// A validated, non-empty sequence of node descriptors.
///
/// Only the first descriptor lacks a parent relation, only the last lacks a
/// child relation, and every record type appears once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTable {
    nodes: Vec<NodeDescriptor>,
}

impl NodeTable {
    pub fn new(nodes: Vec<NodeDescriptor>) -> Result<Self, ConfigurationError> {
        if nodes.is_empty() {
            return Err(ConfigurationError::EmptyNodeTable);
        }
        let last = nodes.len() - 1;
        for (level, node) in nodes.iter().enumerate() {
            if node.record_type.trim().is_empty() {
                return Err(ConfigurationError::BlankRecordType { level });
            }
            if nodes[..level]
                .iter()
                .any(|earlier| earlier.record_type == node.record_type)
            {
                return Err(ConfigurationError::DuplicateRecordType {
                    record_type: node.record_type.clone(),
                });
            }
            match (level == 0, node.parent_relation.is_some()) {
                (true, true) => {
                    return Err(ConfigurationError::RootHasParent {
                        record_type: node.record_type.clone(),
                    });
                }
                (false, false) => {
                    return Err(ConfigurationError::MissingParentRelation {
                        record_type: node.record_type.clone(),
                        level,
                    });
                }
                _ => {}
            }
            match (level == last, node.child_relation.is_some()) {
                (true, true) => {
                    return Err(ConfigurationError::LeafHasChild {
                        record_type: node.record_type.clone(),
                    });
                }
                (false, false) => {
                    return Err(ConfigurationError::MissingChildRelation {
                        record_type: node.record_type.clone(),
                        level,
                    });
                }
                _ => {}
            }
        }
        Ok(Self { nodes })
    }

    pub fn root(&self) -> &NodeDescriptor {
        &self.nodes[0]
    }

    pub fn leaf(&self) -> &NodeDescriptor {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn get(&self, level: usize) -> Option<&NodeDescriptor> {
        self.nodes.get(level)
    }

    /// Level of a record type, 0 being the root.
    pub fn level_of(&self, record_type: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.record_type == record_type)
    }

    pub fn leaf_level(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeDescriptor> {
        self.nodes.iter()
    }

    pub fn record_types(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(NodeDescriptor::record_type)
    }
}
