//! Node arena.
//!
//! Nodes live in a `Vec` indexed by [`NodeId`]. Ownership flows downward
//! through `children`; `parent` is a plain back-reference used only for
//! upward propagation. Ids are assigned on insertion and never reused.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use txpanel_engine::TransactionBuilder;
use txpanel_types::{ElementId, InputSpec, NodeId};

use crate::dispatch::NodeEvent;
use crate::error::UiError;
use crate::surface::SurfaceHandle;
use crate::workflow::WorkflowState;

/// Per-node reaction hook, invoked after the variant's own reaction.
pub type Listener = Arc<dyn Fn(&NodeEvent) + Send + Sync>;

/// The closed set of node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeVariant {
    Banner,
    Label,
    Panel,
    Button,
    CheckBox,
    Input,
    Function,
}

pub(crate) enum NodeKind {
    Banner,
    Label { text: String },
    Panel { name: String, top_level: bool },
    Button { name: String, enabled: bool },
    CheckBox { label: String },
    Input(InputSpec),
    Function(FunctionNode),
}

impl NodeKind {
    pub(crate) fn variant(&self) -> NodeVariant {
        match self {
            NodeKind::Banner => NodeVariant::Banner,
            NodeKind::Label { .. } => NodeVariant::Label,
            NodeKind::Panel { .. } => NodeVariant::Panel,
            NodeKind::Button { .. } => NodeVariant::Button,
            NodeKind::CheckBox { .. } => NodeVariant::CheckBox,
            NodeKind::Input(_) => NodeVariant::Input,
            NodeKind::Function(_) => NodeVariant::Function,
        }
    }
}

/// Workflow node payload: trigger button, argument inputs and build state.
pub(crate) struct FunctionNode {
    pub method_name: String,
    pub kind: String,
    pub button: NodeId,
    pub args: IndexMap<String, NodeId>,
    pub builder: Arc<dyn TransactionBuilder>,
    pub state: WorkflowState,
}

/// Live handles bound at attach time.
#[derive(Clone)]
pub(crate) struct Binding {
    pub primary: Arc<dyn SurfaceHandle>,
    pub info: Arc<dyn SurfaceHandle>,
}

pub(crate) struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub binding: Option<Binding>,
    pub listeners: Vec<Listener>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Assembling,
    Rendered { root: NodeId },
    Attached { root: NodeId },
}

pub(crate) struct Arena {
    nodes: Vec<Node>,
    pub lifecycle: Lifecycle,
    /// Primary element id to node, filled at attach time.
    pub elements: HashMap<ElementId, NodeId>,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            lifecycle: Lifecycle::Assembling,
            elements: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            kind,
            parent: None,
            children: Vec::new(),
            binding: None,
            listeners: Vec::new(),
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, UiError> {
        self.nodes.get(id.index()).ok_or(UiError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, UiError> {
        self.nodes.get_mut(id.index()).ok_or(UiError::UnknownNode(id))
    }

    pub fn function(&self, id: NodeId) -> Result<&FunctionNode, UiError> {
        match &self.node(id)?.kind {
            NodeKind::Function(function) => Ok(function),
            _ => Err(UiError::WrongKind {
                node: id,
                expected: "a function",
            }),
        }
    }

    pub fn function_mut(&mut self, id: NodeId) -> Result<&mut FunctionNode, UiError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Function(function) => Ok(function),
            _ => Err(UiError::WrongKind {
                node: id,
                expected: "a function",
            }),
        }
    }

    pub fn binding(&self, id: NodeId) -> Result<&Binding, UiError> {
        self.node(id)?.binding.as_ref().ok_or(UiError::NotAttached(id))
    }

    pub fn ensure_assembling(&self) -> Result<(), UiError> {
        match self.lifecycle {
            Lifecycle::Assembling => Ok(()),
            _ => Err(UiError::Sealed),
        }
    }

    /// Fails unless `child` exists, has no parent, and the tree is still open.
    pub fn check_orphan(&self, child: NodeId) -> Result<(), UiError> {
        self.ensure_assembling()?;
        if self.node(child)?.parent.is_some() {
            return Err(UiError::AlreadyParented(child));
        }
        Ok(())
    }

    /// Fails unless `child` could be appended to `parent` right now. Only
    /// panels render arbitrary children, so only panels accept them.
    pub fn check_appendable(&self, parent: NodeId, child: NodeId) -> Result<(), UiError> {
        let parent_node = self.node(parent)?;
        if parent == child {
            return Err(UiError::SelfAppend(child));
        }
        self.check_orphan(child)?;
        match parent_node.kind {
            NodeKind::Panel { .. } => Ok(()),
            _ => Err(UiError::WrongKind {
                node: parent,
                expected: "a panel",
            }),
        }
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, UiError> {
        self.check_appendable(parent, child)?;
        self.link(parent, child)
    }

    /// Link an orphan under any parent. Workflows own their trigger and
    /// inputs this way.
    pub fn link(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, UiError> {
        self.check_orphan(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(child)
    }

    /// Depth-first pre-order walk from `root`.
    pub fn preorder(&self, root: NodeId) -> Result<Vec<NodeId>, UiError> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id)?.children.iter().rev().copied());
        }
        Ok(order)
    }
}
