//! In-memory object graph implementing [`DomainObject`].
//!
//! Useful for tests, fixtures and the command line, where the records come
//! from a JSON document instead of a database. Children are held strongly and
//! parents weakly, so dropping the root drops the graph.
//!
//! # JSON layout
//!
//! ```json
//! {
//!   "type": "Study",
//!   "id": "CDISC01",
//!   "attributes": { "name": "Pilot" },
//!   "relations": {
//!     "participants": {
//!       "parent": "study",
//!       "items": [ { "type": "Participant", "id": 1, "attributes": { "subject_id": "001" } } ]
//!     }
//!   }
//! }
//! ```
//!
//! Every key under `relations` declares a child collection (possibly empty);
//! `parent` names the reverse relation set on each item.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::rc::{Rc, Weak};

use anyhow::{Context, Result, anyhow, bail};
use sdtm_model::{ObjectId, Value};
use serde::Deserialize;

use crate::store::DomainObject;

struct MemoryNode {
    record_type: String,
    identity: ObjectId,
    attributes: RefCell<BTreeMap<String, Value>>,
    children: RefCell<BTreeMap<String, Vec<MemoryObject>>>,
    parents: RefCell<BTreeMap<String, Weak<MemoryNode>>>,
}

/// Shared handle to one in-memory object.
#[derive(Clone)]
pub struct MemoryObject(Rc<MemoryNode>);

impl MemoryObject {
    pub fn new(record_type: impl Into<String>, identity: impl Into<ObjectId>) -> Self {
        Self(Rc::new(MemoryNode {
            record_type: record_type.into(),
            identity: identity.into(),
            attributes: RefCell::new(BTreeMap::new()),
            children: RefCell::new(BTreeMap::new()),
            parents: RefCell::new(BTreeMap::new()),
        }))
    }

    #[must_use]
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.0
            .attributes
            .borrow_mut()
            .insert(name.into(), value.into());
    }

    /// Declares a child collection without adding members.
    #[must_use]
    pub fn with_relation(self, relation: impl Into<String>) -> Self {
        self.declare_relation(relation);
        self
    }

    pub fn declare_relation(&self, relation: impl Into<String>) {
        self.0.children.borrow_mut().entry(relation.into()).or_default();
    }

    /// Appends `child` to `relation` and points the child's `parent_relation` back here.
    pub fn add_child(&self, relation: &str, child: &MemoryObject, parent_relation: &str) {
        self.0
            .children
            .borrow_mut()
            .entry(relation.to_string())
            .or_default()
            .push(child.clone());
        child
            .0
            .parents
            .borrow_mut()
            .insert(parent_relation.to_string(), Rc::downgrade(&self.0));
    }

    /// Removes every member of a child collection, keeping the relation declared.
    pub fn clear_children(&self, relation: &str) {
        if let Some(children) = self.0.children.borrow_mut().get_mut(relation) {
            children.clear();
        }
    }

    pub fn ptr_eq(&self, other: &MemoryObject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl DomainObject for MemoryObject {
    fn record_type(&self) -> &str {
        &self.0.record_type
    }

    fn identity(&self) -> ObjectId {
        self.0.identity.clone()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.0.attributes.borrow().get(name).cloned()
    }

    fn children(&self, relation: &str) -> Result<Vec<Self>> {
        self.0
            .children
            .borrow()
            .get(relation)
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "{} {} has no relation '{relation}'",
                    self.0.record_type,
                    self.0.identity
                )
            })
    }

    fn parent(&self, relation: &str) -> Result<Option<Self>> {
        let parents = self.0.parents.borrow();
        let Some(parent) = parents.get(relation) else {
            return Ok(None);
        };
        parent.upgrade().map(|node| Some(Self(node))).ok_or_else(|| {
            anyhow!(
                "parent '{relation}' of {} {} no longer exists",
                self.0.record_type,
                self.0.identity
            )
        })
    }

    fn same_object(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.0.record_type == other.0.record_type && self.0.identity == other.0.identity)
    }
}

impl fmt::Debug for MemoryObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryObject")
            .field("record_type", &self.0.record_type)
            .field("identity", &self.0.identity)
            .field("attributes", &self.0.attributes.borrow().len())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GraphId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct GraphNode {
    #[serde(rename = "type")]
    record_type: String,
    id: GraphId,
    #[serde(default)]
    attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    relations: BTreeMap<String, GraphRelation>,
}

#[derive(Debug, Deserialize)]
struct GraphRelation {
    parent: String,
    #[serde(default)]
    items: Vec<GraphNode>,
}

/// Loads a graph from a JSON file and returns its root.
pub fn load_graph(path: &Path) -> Result<MemoryObject> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_graph(BufReader::new(file)).with_context(|| format!("read graph {}", path.display()))
}

pub fn read_graph<R: Read>(reader: R) -> Result<MemoryObject> {
    let node: GraphNode = serde_json::from_reader(reader).context("parse graph JSON")?;
    build_node(node)
}

pub fn parse_graph(json: &str) -> Result<MemoryObject> {
    read_graph(json.as_bytes())
}

fn build_node(node: GraphNode) -> Result<MemoryObject> {
    let identity = match node.id {
        GraphId::Number(value) => ObjectId::from(value),
        GraphId::Text(value) => ObjectId::from(value),
    };
    let object = MemoryObject::new(node.record_type, identity);
    for (name, raw) in node.attributes {
        let value = json_to_value(&raw).with_context(|| {
            format!(
                "attribute '{name}' of {} {}",
                object.record_type(),
                object.identity()
            )
        })?;
        object.set_attribute(name, value);
    }
    for (relation, group) in node.relations {
        object.declare_relation(relation.as_str());
        for item in group.items {
            let child = build_node(item)?;
            object.add_child(&relation, &child, &group.parent);
        }
    }
    Ok(object)
}

fn json_to_value(raw: &serde_json::Value) -> Result<Value> {
    Ok(match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(flag) => Value::Boolean(*flag),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(integer) => Value::Integer(integer),
            None => Value::Float(
                number
                    .as_f64()
                    .ok_or_else(|| anyhow!("number {number} out of range"))?,
            ),
        },
        serde_json::Value::String(text) => Value::Text(text.clone()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            bail!("only scalar attribute values are supported")
        }
    })
}
