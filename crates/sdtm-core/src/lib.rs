//! Tree-traversal export engine.
//!
//! An [`ExportDefinition`] describes a linear path of record types (the
//! [`NodeTable`]), one [`Visitor`] per record type, and the output variables.
//! An [`Exporter`] walks that path depth-first from one root object held in a
//! data store reached through [`DomainObject`], merges the per-level
//! contributions into one [`FlatRecord`](sdtm_model::FlatRecord) per leaf
//! instance, and numbers each leaf within its parent.
//!
//! Rendering the resulting [`Dataset`] to CSV or Dataset-JSON lives in
//! `sdtm-report`.

pub mod dataset;
pub mod definition;
pub mod exporter;
mod merge;
pub mod memory;
pub mod nodes;
pub mod store;
mod traversal;
pub mod visitor;

pub use dataset::Dataset;
pub use definition::{ChildOrdering, ExportDefinition, ExportDefinitionBuilder, SortOrder};
pub use exporter::Exporter;
pub use memory::{MemoryObject, load_graph, parse_graph, read_graph};
pub use nodes::{NodeDescriptor, NodeTable};
pub use store::DomainObject;
pub use visitor::{Visitor, VisitorRegistry};
