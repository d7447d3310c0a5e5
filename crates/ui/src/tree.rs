//! The tree handle and its construction API.

use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;
use tracing::debug;
use txpanel_engine::{Services, TransactionBuilder};
use txpanel_types::{FunctionSpec, InputSpec, NodeId};
use txpanel_util::UiConfig;

use crate::dispatch::NodeEvent;
use crate::error::UiError;
use crate::node::{Arena, FunctionNode, NodeKind, NodeVariant};
use crate::workflow::WorkflowState;

/// A UI session: one node arena plus the collaborators its nodes call.
///
/// `Tree` is a cheap handle; clones share the same nodes. The arena lock is
/// only held for short synchronous sections and never across an `.await`,
/// so several event dispatches may be in progress at once.
#[derive(Clone)]
pub struct Tree {
    inner: Arc<Mutex<Arena>>,
    pub(crate) services: Services,
    pub(crate) config: Arc<UiConfig>,
}

impl Tree {
    pub fn new(services: Services) -> Self {
        Self::with_config(services, UiConfig::default())
    }

    pub fn with_config(services: Services, config: UiConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Arena::new())),
            services,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Arena> {
        self.inner.lock().expect("tree lock poisoned")
    }

    fn insert(&self, kind: NodeKind) -> NodeId {
        let id = self.lock().insert(kind);
        debug!(node = %id, "node constructed");
        id
    }

    pub fn banner(&self) -> NodeId {
        self.insert(NodeKind::Banner)
    }

    pub fn label(&self, text: impl Into<String>) -> NodeId {
        self.insert(NodeKind::Label { text: text.into() })
    }

    pub fn button(&self, name: impl Into<String>, enabled: bool) -> NodeId {
        self.insert(NodeKind::Button {
            name: name.into(),
            enabled,
        })
    }

    pub fn checkbox(&self, label: impl Into<String>) -> NodeId {
        self.insert(NodeKind::CheckBox { label: label.into() })
    }

    pub fn input(&self, spec: InputSpec) -> NodeId {
        self.insert(NodeKind::Input(spec))
    }

    /// Construct a panel and append `children` to it in order.
    pub fn panel(&self, name: impl Into<String>, top_level: bool, children: Vec<NodeId>) -> Result<NodeId, UiError> {
        let mut arena = self.lock();
        for (position, child) in children.iter().enumerate() {
            arena.check_orphan(*child)?;
            if children[..position].contains(child) {
                return Err(UiError::AlreadyParented(*child));
            }
        }
        let id = arena.insert(NodeKind::Panel {
            name: name.into(),
            top_level,
        });
        for child in children {
            arena.append(id, child)?;
        }
        debug!(node = %id, "panel constructed");
        Ok(id)
    }

    /// Construct a transaction workflow with its trigger button and one input
    /// per declared argument, in declaration order.
    pub fn function(&self, spec: &FunctionSpec, builder: Arc<dyn TransactionBuilder>) -> Result<NodeId, UiError> {
        let mut seen = std::collections::HashSet::new();
        if let Some(duplicate) = spec.args.iter().find(|arg| !seen.insert(arg.name.as_str())) {
            return Err(UiError::DuplicateArgument(duplicate.name.clone()));
        }

        let mut arena = self.lock();
        arena.ensure_assembling()?;
        let button = arena.insert(NodeKind::Button {
            name: spec.method_name.clone(),
            enabled: spec.enabled,
        });
        let args: IndexMap<String, NodeId> = spec
            .args
            .iter()
            .map(|arg| (arg.name.clone(), arena.insert(NodeKind::Input(arg.clone()))))
            .collect();
        let id = arena.insert(NodeKind::Function(FunctionNode {
            method_name: spec.method_name.clone(),
            kind: spec.kind.clone(),
            button,
            args: args.clone(),
            builder,
            state: WorkflowState::new(spec.enabled),
        }));
        arena.link(id, button)?;
        for arg in args.values() {
            arena.link(id, *arg)?;
        }
        debug!(node = %id, method = %spec.method_name, args = args.len(), "function constructed");
        Ok(id)
    }

    /// Make `child` the last child of `parent`, which must be a panel.
    pub fn append(&self, parent: NodeId, child: NodeId) -> Result<NodeId, UiError> {
        self.lock().append(parent, child)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn variant(&self, id: NodeId) -> Result<NodeVariant, UiError> {
        Ok(self.lock().node(id)?.kind.variant())
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, UiError> {
        Ok(self.lock().node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>, UiError> {
        Ok(self.lock().node(id)?.children.clone())
    }

    /// Trigger button of a workflow node.
    pub fn function_button(&self, id: NodeId) -> Result<NodeId, UiError> {
        Ok(self.lock().function(id)?.button)
    }

    /// Input node bound to argument `name` of a workflow node.
    pub fn function_arg(&self, id: NodeId, name: &str) -> Result<NodeId, UiError> {
        self.lock()
            .function(id)?
            .args
            .get(name)
            .copied()
            .ok_or_else(|| UiError::UnknownArgument {
                node: id,
                name: name.to_string(),
            })
    }

    /// Register a reaction to events reaching `id`.
    pub fn on_event(&self, id: NodeId, listener: impl Fn(&NodeEvent) + Send + Sync + 'static) -> Result<(), UiError> {
        self.lock().node_mut(id)?.listeners.push(Arc::new(listener));
        Ok(())
    }

    /// Write status text to the node's info region.
    pub fn set_info(&self, id: NodeId, text: &str) -> Result<(), UiError> {
        let info = Arc::clone(&self.lock().binding(id)?.info);
        info.set_text(text);
        Ok(())
    }

    /// Text currently shown in the node's info region.
    pub fn info_text(&self, id: NodeId) -> Result<String, UiError> {
        let info = Arc::clone(&self.lock().binding(id)?.info);
        Ok(info.text())
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree").field("nodes", &self.len()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txpanel_engine::EchoBuilder;
    use txpanel_types::ArgType;

    fn tree() -> Tree {
        Tree::new(Services::default())
    }

    #[test]
    fn panel_owns_children_in_order() {
        let tree = tree();
        let a = tree.label("a");
        let b = tree.checkbox("b");
        let panel = tree.panel("Main", true, vec![a, b]).unwrap();
        assert_eq!(tree.children(panel).unwrap(), vec![a, b]);
        assert_eq!(tree.parent(a).unwrap(), Some(panel));
        assert_eq!(tree.parent(panel).unwrap(), None);
        assert_eq!(tree.variant(panel).unwrap(), NodeVariant::Panel);
    }

    #[test]
    fn panel_rejects_children_owned_elsewhere() {
        let tree = tree();
        let child = tree.banner();
        tree.panel("first", false, vec![child]).unwrap();
        let before = tree.len();
        assert_eq!(tree.panel("second", false, vec![child]), Err(UiError::AlreadyParented(child)));
        let repeated = tree.banner();
        assert_eq!(
            tree.panel("third", false, vec![repeated, repeated]),
            Err(UiError::AlreadyParented(repeated))
        );
        assert_eq!(tree.len(), before + 1);
    }

    #[test]
    fn function_creates_button_then_args() {
        let tree = tree();
        let spec = FunctionSpec {
            method_name: "transfer".into(),
            kind: "send".into(),
            enabled: false,
            args: vec![InputSpec::new("to", ArgType::Address), InputSpec::new("amount", ArgType::Ether)],
        };
        let function = tree.function(&spec, Arc::new(EchoBuilder)).unwrap();
        let button = tree.function_button(function).unwrap();
        let to = tree.function_arg(function, "to").unwrap();
        let amount = tree.function_arg(function, "amount").unwrap();
        assert_eq!(tree.children(function).unwrap(), vec![button, to, amount]);
        assert_eq!(tree.variant(button).unwrap(), NodeVariant::Button);
        assert_eq!(tree.variant(to).unwrap(), NodeVariant::Input);
        assert!(matches!(
            tree.function_arg(function, "memo"),
            Err(UiError::UnknownArgument { .. })
        ));
    }

    #[test]
    fn append_only_extends_panels() {
        let tree = tree();
        let spec = FunctionSpec {
            method_name: "f".into(),
            kind: String::new(),
            enabled: true,
            args: Vec::new(),
        };
        let function = tree.function(&spec, Arc::new(EchoBuilder)).unwrap();
        let label = tree.label("x");
        let extra = tree.banner();
        for parent in [function, label] {
            assert_eq!(
                tree.append(parent, extra),
                Err(UiError::WrongKind {
                    node: parent,
                    expected: "a panel",
                })
            );
        }
        assert_eq!(tree.parent(extra).unwrap(), None);
        let panel = tree.panel("Main", false, Vec::new()).unwrap();
        assert_eq!(tree.append(panel, extra), Ok(extra));
    }

    #[test]
    fn function_rejects_duplicate_argument_names() {
        let tree = tree();
        let spec = FunctionSpec {
            method_name: "f".into(),
            kind: String::new(),
            enabled: true,
            args: vec![InputSpec::new("x", ArgType::Untyped), InputSpec::new("x", ArgType::Untyped)],
        };
        assert_eq!(
            tree.function(&spec, Arc::new(EchoBuilder)),
            Err(UiError::DuplicateArgument("x".into()))
        );
        assert!(tree.is_empty());
    }

    #[test]
    fn info_requires_attachment() {
        let tree = tree();
        let label = tree.label("x");
        assert_eq!(tree.set_info(label, "hi"), Err(UiError::NotAttached(label)));
        assert_eq!(tree.set_info(NodeId(42), "hi"), Err(UiError::UnknownNode(NodeId(42))));
    }
}
