//! Partial and flat records.

use std::collections::BTreeMap;

use crate::ids::ObjectId;
use crate::value::Value;
use crate::variable::Variable;

static NULL: Value = Value::Null;

/// Field values contributed by one visited node.
///
/// Values are keyed by variable member. Values may also be keyed by column
/// name with [`PartialRecord::set_named`]; those are resolved against the
/// definition's variables when the node is merged, and an unknown name fails
/// the export with a configuration error.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRecord<V: Variable> {
    values: BTreeMap<V, Value>,
    named: Vec<(String, Value)>,
}

impl<V: Variable> Default for PartialRecord<V> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
            named: Vec::new(),
        }
    }
}

impl<V: Variable> PartialRecord<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, variable: V, value: impl Into<Value>) -> &mut Self {
        self.values.insert(variable, value.into());
        self
    }

    #[must_use]
    pub fn with(mut self, variable: V, value: impl Into<Value>) -> Self {
        self.set(variable, value);
        self
    }

    pub fn set_named(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.named.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_named(name, value);
        self
    }

    pub fn get(&self, variable: V) -> Option<&Value> {
        self.values.get(&variable)
    }

    pub fn len(&self) -> usize {
        self.values.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.named.is_empty()
    }

    /// Splits into values keyed by member and values keyed by column name.
    pub fn into_parts(self) -> (BTreeMap<V, Value>, Vec<(String, Value)>) {
        (self.values, self.named)
    }
}

impl<V: Variable> FromIterator<(V, Value)> for PartialRecord<V> {
    fn from_iter<I: IntoIterator<Item = (V, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            named: Vec::new(),
        }
    }
}

/// One complete output row, produced for one leaf instance.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord<V: Variable> {
    values: BTreeMap<V, Value>,
    source: ObjectId,
    sequence: u32,
}

impl<V: Variable> FlatRecord<V> {
    pub fn new(values: BTreeMap<V, Value>, source: ObjectId, sequence: u32) -> Self {
        Self {
            values,
            source,
            sequence,
        }
    }

    /// Value of a variable; members nobody set read as [`Value::Null`].
    pub fn get(&self, variable: V) -> &Value {
        self.values.get(&variable).unwrap_or(&NULL)
    }

    pub fn contains(&self, variable: V) -> bool {
        self.values.contains_key(&variable)
    }

    /// Every variable with its value, in column order.
    pub fn iter(&self) -> impl Iterator<Item = (V, &Value)> + '_ {
        V::ALL.iter().map(move |variable| (*variable, self.get(*variable)))
    }

    /// Identity of the leaf instance this record was produced for.
    pub fn source(&self) -> &ObjectId {
        &self.source
    }

    /// Ordinal of the leaf within its parent's collection, starting at 1.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}
