//! Data model for declarative SDTM exports.
//!
//! - [`Variable`]: the closed set of output columns of one domain
//! - [`Value`]: raw values produced by visitors
//! - [`PartialRecord`] / [`FlatRecord`]: per-level contributions and complete rows
//! - [`error`]: configuration, traversal and serialization errors

pub mod error;
pub mod ids;
pub mod lookup;
pub mod record;
pub mod value;
pub mod variable;

pub use error::{
    ConfigurationError, ExportError, Result, SerializationError, TraversalError,
};
pub use ids::{DomainCode, ObjectId};
pub use lookup::VariableLookup;
pub use record::{FlatRecord, PartialRecord};
pub use value::Value;
pub use variable::{Variable, VariableSpec, VariableType};
