//! Shared type definitions for the txpanel crates.
//!
//! Identities, argument maps and the built transaction artifact live here so
//! the collaborator traits in `txpanel-engine` and the node tree in
//! `txpanel-ui` agree on them without depending on each other.

mod layout;

pub use layout::{
    ArgType, ButtonSpec, Denomination, FunctionSpec, InputSpec, LookupKind, NodeSpec, load_layout_from_file, parse_layout,
};

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identity of a node within one tree session.
///
/// Ids are assigned once at construction from a monotonic counter and are
/// never reused or reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Position of the node in the owning arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a region in the rendered presentation.
///
/// Every node owns a primary region (`id{n}`); inputs and checkboxes also own
/// a separate info region (`infoId{n}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    /// Primary region of a node.
    pub fn primary(node: NodeId) -> Self {
        Self(format!("id{}", node.0))
    }

    /// Secondary info-display region of a node.
    pub fn info(node: NodeId) -> Self {
        Self(format!("infoId{}", node.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Current argument values keyed by argument name, in declaration order.
pub type ArgValues = IndexMap<String, String>;

/// Submittable artifact produced by a successful build pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque payload understood by the submitter.
    pub payload: Value,
}

impl Transaction {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }
}
