//! Resolution and merging of per-level field contributions.

use std::collections::{BTreeMap, BTreeSet};

use sdtm_model::{
    ConfigurationError, ObjectId, PartialRecord, Value, Variable, VariableLookup,
};

/// The resolved output of one visited node.
#[derive(Debug, Clone)]
pub(crate) struct Contribution<V: Variable> {
    pub(crate) record_type: String,
    pub(crate) identity: ObjectId,
    pub(crate) values: BTreeMap<V, Value>,
}

/// Resolves name-keyed entries and rejects variables the definition derives.
pub(crate) fn resolve<V: Variable>(
    partial: PartialRecord<V>,
    record_type: &str,
    lookup: &VariableLookup<V>,
    reserved: &BTreeSet<V>,
) -> Result<BTreeMap<V, Value>, ConfigurationError> {
    let (mut values, named) = partial.into_parts();
    for (name, value) in named {
        let Some(variable) = lookup.get(&name) else {
            return Err(ConfigurationError::UnknownVariable {
                name,
                record_type: record_type.to_string(),
            });
        };
        if values.insert(variable, value).is_some() {
            return Err(ConfigurationError::ConflictingValue {
                variable: variable.name().to_string(),
                first: record_type.to_string(),
                second: record_type.to_string(),
            });
        }
    }
    if let Some(variable) = values.keys().find(|variable| reserved.contains(*variable)) {
        return Err(ConfigurationError::ReservedVariable {
            variable: variable.name().to_string(),
            record_type: record_type.to_string(),
        });
    }
    Ok(values)
}

/// Unions the contributions of a root-to-leaf chain into one field map.
///
/// A variable contributed by two levels is rejected, whatever the values.
pub(crate) fn merge<V: Variable>(
    chain: &[Contribution<V>],
) -> Result<BTreeMap<V, Value>, ConfigurationError> {
    let mut merged: BTreeMap<V, Value> = BTreeMap::new();
    let mut origin: BTreeMap<V, &str> = BTreeMap::new();
    for contribution in chain {
        for (variable, value) in &contribution.values {
            if let Some(first) = origin.insert(*variable, contribution.record_type.as_str()) {
                return Err(ConfigurationError::ConflictingValue {
                    variable: variable.name().to_string(),
                    first: first.to_string(),
                    second: contribution.record_type.clone(),
                });
            }
            merged.insert(*variable, value.clone());
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdtm_model::{VariableSpec, VariableType};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    enum Field {
        Study,
        Subject,
        Seq,
    }

    impl Variable for Field {
        const ALL: &'static [Self] = &[Field::Study, Field::Subject, Field::Seq];

        fn spec(self) -> VariableSpec {
            match self {
                Field::Study => VariableSpec::new("STUDYID", "Study", VariableType::String),
                Field::Subject => VariableSpec::new("USUBJID", "Subject", VariableType::String),
                Field::Seq => VariableSpec::new("SEQ", "Sequence", VariableType::Integer),
            }
        }
    }

    fn contribution(record_type: &str, values: &[(Field, &str)]) -> Contribution<Field> {
        Contribution {
            record_type: record_type.to_string(),
            identity: ObjectId::from("1"),
            values: values
                .iter()
                .map(|(variable, value)| (*variable, Value::from(*value)))
                .collect(),
        }
    }

    #[test]
    fn resolve_maps_names_to_members() {
        let lookup = VariableLookup::<Field>::new().unwrap();
        let partial = PartialRecord::new().with_named("usubjid", "S-1");
        let values = resolve(partial, "Participant", &lookup, &BTreeSet::new()).unwrap();
        assert_eq!(values.get(&Field::Subject), Some(&Value::from("S-1")));
    }

    #[test]
    fn resolve_rejects_unknown_names() {
        let lookup = VariableLookup::<Field>::new().unwrap();
        let partial = PartialRecord::<Field>::new().with_named("ARM", "A");
        let err = resolve(partial, "Participant", &lookup, &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownVariable { ref name, .. } if name == "ARM"));
    }

    #[test]
    fn resolve_rejects_reserved_members() {
        let lookup = VariableLookup::<Field>::new().unwrap();
        let reserved: BTreeSet<Field> = [Field::Seq].into_iter().collect();
        let partial = PartialRecord::new().with(Field::Seq, 4_i64);
        let err = resolve(partial, "Medication", &lookup, &reserved).unwrap_err();
        assert!(matches!(err, ConfigurationError::ReservedVariable { .. }));
    }

    #[test]
    fn merge_unions_disjoint_levels() {
        let chain = vec![
            contribution("Study", &[(Field::Study, "S1")]),
            contribution("Participant", &[(Field::Subject, "S1-001")]),
        ];
        let merged = merge(&chain).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(&Field::Study), Some(&Value::from("S1")));
    }

    #[test]
    fn merge_rejects_overlap_even_with_equal_values() {
        let chain = vec![
            contribution("Study", &[(Field::Study, "S1")]),
            contribution("Participant", &[(Field::Study, "S1")]),
        ];
        let err = merge(&chain).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::ConflictingValue { ref first, ref second, .. }
                if first == "Study" && second == "Participant"
        ));
    }
}
