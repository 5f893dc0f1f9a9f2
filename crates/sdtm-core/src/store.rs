//! Interface to the data store that owns the exported objects.

use anyhow::Result;
use sdtm_model::{ObjectId, Value};

/// A handle to one stored object.
///
/// The engine never mutates objects. It reads the record type to check each
/// level of the node table, follows named relations down (children) and up
/// (parent), and passes the handle to the visitor registered for its type.
///
/// Hosts typically implement this for an enum over their row types, or use
/// [`MemoryObject`](crate::memory::MemoryObject).
pub trait DomainObject: Sized {
    /// Record type name, matched against node descriptors.
    fn record_type(&self) -> &str;

    /// Stable identity (primary key) of the object.
    fn identity(&self) -> ObjectId;

    /// Scalar attribute by name, for visitors that read objects generically.
    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Members of a named child collection, in the store's order.
    ///
    /// An unknown relation is an error; a known but empty one is `Ok(vec![])`.
    fn children(&self, relation: &str) -> Result<Vec<Self>>;

    /// The object referenced by a named parent relation, if any.
    fn parent(&self, relation: &str) -> Result<Option<Self>>;

    /// True when both handles point at the same stored object.
    fn same_object(&self, other: &Self) -> bool {
        self.record_type() == other.record_type() && self.identity() == other.identity()
    }
}
