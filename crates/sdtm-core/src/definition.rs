//! Export definitions: the immutable configuration of one exportable domain.
//!
//! A definition binds the variable set, the node table, one visitor per node
//! type and the domain metadata. It is assembled with
//! [`ExportDefinition::builder`] and validated once in
//! [`ExportDefinitionBuilder::build`]; an invalid definition never reaches
//! traversal.
//!
//! ```ignore
//! let definition = ExportDefinition::<Cm, Node>::builder("CM", "Concomitant Medications")
//!     .domain_variable(Cm::Domain)
//!     .sequence_variable(Cm::Cmseq)
//!     .node(NodeDescriptor::root("Study", "participants"))
//!     .node(NodeDescriptor::branch("Participant", "medications", "study"))
//!     .node(NodeDescriptor::leaf("Medication", "participant"))
//!     .visitor("Study", visit_study)
//!     .visitor("Participant", visit_participant)
//!     .visitor("Medication", visit_medication)
//!     .build()?;
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use sdtm_model::{
    ConfigurationError, DomainCode, ObjectId, Value, Variable, VariableLookup,
};

use crate::nodes::{NodeDescriptor, NodeTable};
use crate::store::DomainObject;
use crate::visitor::{Visitor, VisitorRegistry};

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// How the members of a child collection are ordered before they are walked.
///
/// Sequence numbers follow this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildOrdering {
    /// Keep the order the store returns.
    #[default]
    Store,
    /// Stable sort by identity, numerically when identities are integers.
    ByIdentity,
}

/// Validated configuration of one exportable domain.
pub struct ExportDefinition<V: Variable, O> {
    domain: DomainCode,
    label: String,
    domain_variable: Option<V>,
    sequence_variable: Option<V>,
    nodes: NodeTable,
    visitors: VisitorRegistry<V, O>,
    constants: BTreeMap<V, Value>,
    sort_by: Vec<(V, SortOrder)>,
    child_ordering: ChildOrdering,
    lookup: VariableLookup<V>,
    reserved: BTreeSet<V>,
}

impl<V: Variable, O> ExportDefinition<V, O> {
    pub fn builder(domain: impl Into<String>, label: impl Into<String>) -> ExportDefinitionBuilder<V, O> {
        ExportDefinitionBuilder::new(domain, label)
    }

    pub fn domain(&self) -> &DomainCode {
        &self.domain
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn domain_variable(&self) -> Option<V> {
        self.domain_variable
    }

    pub fn sequence_variable(&self) -> Option<V> {
        self.sequence_variable
    }

    pub fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    pub fn visitors(&self) -> &VisitorRegistry<V, O> {
        &self.visitors
    }

    pub fn constants(&self) -> &BTreeMap<V, Value> {
        &self.constants
    }

    pub fn sort_by(&self) -> &[(V, SortOrder)] {
        &self.sort_by
    }

    pub fn child_ordering(&self) -> ChildOrdering {
        self.child_ordering
    }

    /// Replaces the child ordering of an already validated definition.
    #[must_use]
    pub fn with_child_ordering(mut self, ordering: ChildOrdering) -> Self {
        self.child_ordering = ordering;
        self
    }

    /// Every output variable, in column order.
    pub fn variables(&self) -> &'static [V] {
        V::ALL
    }

    pub(crate) fn lookup(&self) -> &VariableLookup<V> {
        &self.lookup
    }

    /// Variables filled by the definition itself, which visitors may not set.
    pub(crate) fn reserved(&self) -> &BTreeSet<V> {
        &self.reserved
    }

    /// Writes the domain code, sequence number and constants into a merged row.
    pub(crate) fn apply_derived(&self, values: &mut BTreeMap<V, Value>, sequence: u32) {
        if let Some(variable) = self.domain_variable {
            values.insert(variable, Value::Text(self.domain.to_string()));
        }
        if let Some(variable) = self.sequence_variable {
            values.insert(variable, Value::Integer(i64::from(sequence)));
        }
        for (variable, value) in &self.constants {
            values.insert(*variable, value.clone());
        }
    }
}

impl<V: Variable, O: DomainObject> ExportDefinition<V, O> {
    /// Applies the configured ordering to a fetched child collection.
    pub(crate) fn order_children(&self, mut children: Vec<O>) -> Vec<O> {
        if self.child_ordering == ChildOrdering::ByIdentity {
            let mut keyed: Vec<(ObjectId, O)> = children
                .into_iter()
                .map(|child| (child.identity(), child))
                .collect();
            keyed.sort_by(|(left, _), (right, _)| left.natural_cmp(right));
            children = keyed.into_iter().map(|(_, child)| child).collect();
        }
        children
    }
}

impl<V: Variable, O> fmt::Debug for ExportDefinition<V, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportDefinition")
            .field("domain", &self.domain)
            .field("label", &self.label)
            .field("domain_variable", &self.domain_variable)
            .field("sequence_variable", &self.sequence_variable)
            .field("nodes", &self.nodes)
            .field("visitors", &self.visitors.record_types())
            .field("constants", &self.constants)
            .field("sort_by", &self.sort_by)
            .field("child_ordering", &self.child_ordering)
            .finish()
    }
}

/// Collects the parts of an [`ExportDefinition`]; nothing is checked until `build`.
pub struct ExportDefinitionBuilder<V: Variable, O> {
    domain: String,
    label: String,
    domain_variable: Option<V>,
    sequence_variable: Option<V>,
    nodes: Vec<NodeDescriptor>,
    visitors: Vec<(String, Box<dyn Visitor<V, O>>)>,
    constants: BTreeMap<V, Value>,
    sort_by: Vec<(V, SortOrder)>,
    child_ordering: ChildOrdering,
}

impl<V: Variable, O> ExportDefinitionBuilder<V, O> {
    pub fn new(domain: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            label: label.into(),
            domain_variable: None,
            sequence_variable: None,
            nodes: Vec::new(),
            visitors: Vec::new(),
            constants: BTreeMap::new(),
            sort_by: Vec::new(),
            child_ordering: ChildOrdering::default(),
        }
    }

    /// Variable that receives the domain code on every row.
    #[must_use]
    pub fn domain_variable(mut self, variable: V) -> Self {
        self.domain_variable = Some(variable);
        self
    }

    /// Variable that receives the per-parent sequence number.
    #[must_use]
    pub fn sequence_variable(mut self, variable: V) -> Self {
        self.sequence_variable = Some(variable);
        self
    }

    /// Appends the next level of the node table.
    #[must_use]
    pub fn node(mut self, node: NodeDescriptor) -> Self {
        self.nodes.push(node);
        self
    }

    #[must_use]
    pub fn nodes(mut self, nodes: impl IntoIterator<Item = NodeDescriptor>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    #[must_use]
    pub fn visitor(
        mut self,
        record_type: impl Into<String>,
        visitor: impl Visitor<V, O> + 'static,
    ) -> Self {
        let visitor: Box<dyn Visitor<V, O>> = Box::new(visitor);
        self.visitors.push((record_type.into(), visitor));
        self
    }

    /// Fixed value written into every row.
    #[must_use]
    pub fn constant(mut self, variable: V, value: impl Into<Value>) -> Self {
        self.constants.insert(variable, value.into());
        self
    }

    /// Adds a sort key; keys apply in the order they are added.
    #[must_use]
    pub fn sort_by(mut self, variable: V, order: SortOrder) -> Self {
        self.sort_by.push((variable, order));
        self
    }

    #[must_use]
    pub fn child_ordering(mut self, ordering: ChildOrdering) -> Self {
        self.child_ordering = ordering;
        self
    }

    /// Validates and freezes the definition.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for an invalid domain code, an invalid
    /// variable set, a malformed node table, duplicate or missing or unknown
    /// visitors, a domain variable that doubles as the sequence variable, or
    /// a constant on either of them.
    pub fn build(self) -> Result<ExportDefinition<V, O>, ConfigurationError> {
        let domain = DomainCode::new(self.domain)?;
        let lookup = VariableLookup::new()?;
        let nodes = NodeTable::new(self.nodes)?;

        let mut visitors = VisitorRegistry::new();
        for (record_type, visitor) in self.visitors {
            visitors.insert(record_type, visitor)?;
        }
        visitors.validate(&nodes)?;

        if let (Some(domain_variable), Some(sequence_variable)) =
            (self.domain_variable, self.sequence_variable)
            && domain_variable == sequence_variable
        {
            return Err(ConfigurationError::DomainVariableIsSequence {
                variable: domain_variable.name().to_string(),
            });
        }

        let mut reserved: BTreeSet<V> = self
            .domain_variable
            .into_iter()
            .chain(self.sequence_variable)
            .collect();
        if let Some(variable) = self.constants.keys().find(|variable| reserved.contains(*variable)) {
            return Err(ConfigurationError::ConstantOnDerivedVariable {
                variable: variable.name().to_string(),
            });
        }
        reserved.extend(self.constants.keys().copied());

        Ok(ExportDefinition {
            domain,
            label: self.label,
            domain_variable: self.domain_variable,
            sequence_variable: self.sequence_variable,
            nodes,
            visitors,
            constants: self.constants,
            sort_by: self.sort_by,
            child_ordering: self.child_ordering,
            lookup,
            reserved,
        })
    }
}
