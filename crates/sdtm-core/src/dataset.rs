use std::cmp::Ordering;

use sdtm_model::{DomainCode, FlatRecord, ObjectId, Variable};

use crate::definition::SortOrder;

/// The flat records of one export run, with the metadata needed to render them.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<V: Variable> {
    domain: DomainCode,
    label: String,
    root: ObjectId,
    records: Vec<FlatRecord<V>>,
}

impl<V: Variable> Dataset<V> {
    pub fn new(
        domain: DomainCode,
        label: impl Into<String>,
        root: ObjectId,
        records: Vec<FlatRecord<V>>,
    ) -> Self {
        Self {
            domain,
            label: label.into(),
            root,
            records,
        }
    }

    pub fn domain(&self) -> &DomainCode {
        &self.domain
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Identity of the root instance the export started from.
    pub fn root(&self) -> &ObjectId {
        &self.root
    }

    /// Output columns, in order.
    pub fn columns(&self) -> &'static [V] {
        V::ALL
    }

    pub fn records(&self) -> &[FlatRecord<V>] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FlatRecord<V>> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Stable multi-key sort; earlier keys take precedence.
pub(crate) fn sort_records<V: Variable>(records: &mut [FlatRecord<V>], keys: &[(V, SortOrder)]) {
    if keys.is_empty() {
        return;
    }
    records.sort_by(|left, right| {
        keys.iter()
            .map(|(variable, order)| {
                let ordering = left.get(*variable).sort_cmp(right.get(*variable));
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}
