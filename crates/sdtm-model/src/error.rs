//! Error types for export definitions, traversal and rendering.
//!
//! [`ExportError`] is what the export operations return. It wraps the three
//! failure families plus destination I/O, so callers can match on the family
//! while the message keeps the record type and instance that caused it.

use std::path::PathBuf;

use thiserror::Error;

use crate::ids::ObjectId;
use crate::variable::VariableType;

/// A malformed export definition, or visitor output the definition does not allow.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    // === Variables ===
    /// The variable enum has no members.
    #[error("export definition declares no variables")]
    NoVariables,

    /// A variable maps to an empty column name.
    #[error("variable {variable} has a blank column name")]
    BlankColumnName { variable: String },

    /// Two variables share a column name.
    #[error("duplicate output column name '{name}'")]
    DuplicateColumn { name: String },

    #[error("invalid domain code '{0}'")]
    InvalidDomainCode(String),

    /// Dataset-JSON output needs a dataset label.
    #[error("domain {domain} has no label; Dataset-JSON output requires one")]
    MissingLabel { domain: String },

    /// The domain variable and the sequence variable are the same member.
    #[error("variable {variable} cannot be both the domain and the sequence variable")]
    DomainVariableIsSequence { variable: String },

    /// A constant targets the domain or sequence variable.
    #[error("constant assigned to {variable}, which the definition derives")]
    ConstantOnDerivedVariable { variable: String },

    // === Node table ===
    #[error("node table is empty")]
    EmptyNodeTable,

    #[error("node at level {level} has a blank record type")]
    BlankRecordType { level: usize },

    /// Each level must be a distinct record type.
    #[error("record type '{record_type}' appears more than once in the node table")]
    DuplicateRecordType { record_type: String },

    #[error("root node '{record_type}' must not declare a parent relation")]
    RootHasParent { record_type: String },

    #[error("leaf node '{record_type}' must not declare a child relation")]
    LeafHasChild { record_type: String },

    /// A node after the first has no parent relation (a second root).
    #[error("node '{record_type}' at level {level} has no parent relation; only the first node may be the root")]
    MissingParentRelation { record_type: String, level: usize },

    /// A node before the last has no child relation (a second leaf).
    #[error("node '{record_type}' at level {level} has no child relation; only the last node may be the leaf")]
    MissingChildRelation { record_type: String, level: usize },

    // === Visitors ===
    #[error("no visitor registered for record type '{record_type}'")]
    MissingVisitor { record_type: String },

    #[error("visitor registered for '{record_type}', which is not in the node table")]
    UnknownVisitor { record_type: String },

    #[error("visitor for '{record_type}' registered more than once")]
    DuplicateVisitor { record_type: String },

    // === Visitor output ===
    /// A visitor produced a column name that is not one of the variables.
    #[error("visitor for '{record_type}' produced unknown variable '{name}'")]
    UnknownVariable { name: String, record_type: String },

    /// Two levels contributed the same variable.
    #[error("variable {variable} set by both '{first}' and '{second}'")]
    ConflictingValue {
        variable: String,
        first: String,
        second: String,
    },

    /// A visitor set a variable the definition fills itself.
    #[error("visitor for '{record_type}' set {variable}, which the definition derives")]
    ReservedVariable {
        variable: String,
        record_type: String,
    },
}

/// Failure while walking the object graph.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// A visitor callback returned an error.
    #[error("visitor for {record_type} {identity} failed: {source}")]
    Visitor {
        record_type: String,
        identity: ObjectId,
        #[source]
        source: anyhow::Error,
    },

    /// The data store could not resolve a declared relation.
    #[error("cannot resolve relation '{relation}' on {record_type} {identity}: {source}")]
    Relation {
        record_type: String,
        identity: ObjectId,
        relation: String,
        #[source]
        source: anyhow::Error,
    },

    /// An instance does not have the record type its level declares.
    #[error("expected {expected} at level {level}, found {found} {identity}")]
    UnexpectedRecordType {
        level: usize,
        expected: String,
        found: String,
        identity: ObjectId,
    },

    /// A subtree node's record type is not in the node table.
    #[error("record type '{record_type}' of {identity} is not part of this export")]
    UnknownRecordType {
        record_type: String,
        identity: ObjectId,
    },

    #[error("cannot export a subtree rooted at the root node {identity}")]
    SubtreeIsRoot { identity: ObjectId },

    /// The subtree's ancestry does not end at the exporter's root.
    #[error("{identity} does not belong to the tree rooted at {root}")]
    ForeignSubtree { identity: ObjectId, root: ObjectId },

    /// A non-root instance resolved no parent.
    #[error("{record_type} {identity} has no parent through '{relation}'")]
    MissingParent {
        record_type: String,
        identity: ObjectId,
        relation: String,
    },

    /// A walk reached a level the node table does not have.
    #[error("level {level} is beyond the {depth}-level node table")]
    LevelOutOfRange { level: usize, depth: usize },

    /// A leaf instance is absent from its own parent's child collection.
    #[error("{record_type} {identity} is not among its parent's children")]
    NotAChild {
        record_type: String,
        identity: ObjectId,
    },
}

/// A value that cannot be written in the requested format.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("cannot render {value:?} as {expected} for {variable} in row {row}")]
    InvalidValue {
        variable: String,
        expected: VariableType,
        value: String,
        row: usize,
    },

    /// The underlying encoder failed.
    #[error("failed to encode {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    #[error("transposed output needs exactly one record, found {count}")]
    TransposeRowCount { count: usize },
}

impl SerializationError {
    pub fn encode(format: &'static str, source: impl std::fmt::Display) -> Self {
        Self::Encode {
            format,
            message: source.to_string(),
        }
    }
}

/// Error returned by export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Traversal(#[from] TraversalError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The destination could not be created or written.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A caller-supplied writer failed.
    #[error("failed to write output: {0}")]
    Write(#[source] std::io::Error),
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
