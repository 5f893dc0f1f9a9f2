use std::collections::HashMap;

use crate::error::ConfigurationError;
use crate::variable::Variable;

/// Case-insensitive lookup from column name to variable member.
///
/// Building the lookup validates the variable set: it must be non-empty and
/// column names must be unique ignoring ASCII case.
#[derive(Debug, Clone)]
pub struct VariableLookup<V: Variable> {
    map: HashMap<String, V>,
}

impl<V: Variable> VariableLookup<V> {
    pub fn new() -> Result<Self, ConfigurationError> {
        if V::ALL.is_empty() {
            return Err(ConfigurationError::NoVariables);
        }
        let mut map = HashMap::with_capacity(V::ALL.len());
        for variable in V::ALL {
            let name = variable.name();
            if name.trim().is_empty() {
                return Err(ConfigurationError::BlankColumnName {
                    variable: format!("{variable:?}"),
                });
            }
            if map.insert(name.to_ascii_uppercase(), *variable).is_some() {
                return Err(ConfigurationError::DuplicateColumn {
                    name: name.to_string(),
                });
            }
        }
        Ok(Self { map })
    }

    pub fn get(&self, name: &str) -> Option<V> {
        self.map.get(&name.trim().to_ascii_uppercase()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
