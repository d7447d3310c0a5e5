//! One-shot render and attach.
//!
//! Rendering walks the tree depth-first and produces a static [`View`]
//! together with the regions each node owns. Attaching binds those regions to
//! live handles from a [`Surface`], again depth-first, exactly once.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};
use txpanel_types::{ElementId, NodeId};

use crate::error::UiError;
use crate::node::{Arena, Binding, Lifecycle, Node, NodeKind, NodeVariant};
use crate::surface::Surface;
use crate::tree::Tree;
use crate::view::{Element, View};

/// Regions owned by one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regions {
    /// Interactive region; events arriving here target the node.
    pub primary: ElementId,
    /// Where status text goes. Same as `primary` except for inputs and checkboxes.
    pub info: ElementId,
}

impl Regions {
    pub fn for_node(id: NodeId, variant: NodeVariant) -> Self {
        let primary = ElementId::primary(id);
        let info = match variant {
            NodeVariant::Input | NodeVariant::CheckBox => ElementId::info(id),
            _ => primary.clone(),
        };
        Self { primary, info }
    }
}

/// Output of [`Tree::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub root: NodeId,
    pub view: View,
    /// Regions per node, in depth-first render order.
    pub regions: IndexMap<NodeId, Regions>,
}

impl Presentation {
    pub fn to_html(&self) -> String {
        self.view.to_html()
    }

    pub fn render_order(&self) -> Vec<NodeId> {
        self.regions.keys().copied().collect()
    }
}

impl Tree {
    /// Render the subtree under `root`. The tree can be rendered once; its
    /// structure is fixed afterwards.
    pub fn render(&self, root: NodeId) -> Result<Presentation, UiError> {
        let mut arena = self.lock();
        if arena.lifecycle != Lifecycle::Assembling {
            return Err(UiError::AlreadyRendered);
        }
        let mut regions = IndexMap::new();
        let view = render_node(&arena, root, &mut regions)?;
        arena.lifecycle = Lifecycle::Rendered { root };
        debug!(root = %root, nodes = regions.len(), "tree rendered");
        Ok(Presentation { root, view, regions })
    }

    /// Bind every rendered node to its realized regions, depth-first.
    ///
    /// Returns the nodes in attach order. Nothing is bound unless every
    /// region is realized.
    pub fn attach_all(&self, surface: &dyn Surface) -> Result<Vec<NodeId>, UiError> {
        let mut arena = self.lock();
        let root = match arena.lifecycle {
            Lifecycle::Assembling => return Err(UiError::NotRendered),
            Lifecycle::Attached { .. } => return Err(UiError::AlreadyAttached),
            Lifecycle::Rendered { root } => root,
        };

        let order = arena.preorder(root)?;
        let mut bindings = Vec::with_capacity(order.len());
        for id in &order {
            let regions = Regions::for_node(*id, arena.node(*id)?.kind.variant());
            let primary = surface
                .realize(&regions.primary)
                .ok_or_else(|| UiError::NotRealized(regions.primary.clone()))?;
            let info = if regions.info == regions.primary {
                Arc::clone(&primary)
            } else {
                surface
                    .realize(&regions.info)
                    .ok_or_else(|| UiError::NotRealized(regions.info.clone()))?
            };
            trace!(node = %id, primary = %regions.primary, info = %regions.info, "binding regions");
            bindings.push((*id, regions.primary, Binding { primary, info }));
        }

        for (id, primary, binding) in bindings {
            arena.node_mut(id)?.binding = Some(binding);
            arena.elements.insert(primary, id);
        }
        arena.lifecycle = Lifecycle::Attached { root };
        debug!(root = %root, nodes = order.len(), "tree attached");
        Ok(order)
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.lock().lifecycle, Lifecycle::Attached { .. })
    }
}

fn render_node(arena: &Arena, id: NodeId, regions: &mut IndexMap<NodeId, Regions>) -> Result<View, UiError> {
    let node = arena.node(id)?;
    regions.insert(node.id, Regions::for_node(node.id, node.kind.variant()));
    let primary = ElementId::primary(node.id);

    let element = match &node.kind {
        NodeKind::Banner => Element::new("div")
            .class("banner")
            .child(Element::new("p").id(primary)),
        NodeKind::Label { text } => {
            let label = Element::new("div").child(Element::new("span").class("label").text(text));
            let info = Element::new("div").child(Element::new("span").id(primary));
            Element::new("div")
                .class("group")
                .child(Element::new("div").class("labelGroup").child(label).child(info))
        }
        NodeKind::Panel { name, top_level } => Element::new("div")
            .class(if *top_level { "topLevel" } else { "panel" })
            .id(primary)
            .child(Element::new("div").class("panelHeader").text(name))
            .child(Element::new("div").class("panelBody").children(render_children(arena, node, regions)?)),
        NodeKind::Button { name, enabled } => {
            let mut button = Element::new("button").class("functionButton btn").id(primary);
            if !enabled {
                button = button.attr("disabled", "true");
            }
            Element::new("div").class("functionButtonDiv").child(button.text(name))
        }
        NodeKind::CheckBox { label } => Element::new("div")
            .class("group")
            .child(Element::new("span").class("label").text(label))
            .child(Element::new("input").attr("type", "checkbox").id(primary))
            .child(Element::new("span").class("label").id(ElementId::info(node.id))),
        NodeKind::Input(spec) => {
            let input = Element::new("input")
                .class("textInput")
                .id(primary)
                .attr("type", "text")
                .attr("placeholder", spec.placeholder.as_str());
            let info = Element::new("div")
                .class("textInputInfo")
                .child(Element::new("span").class("label").id(ElementId::info(node.id)));
            if spec.standalone {
                Element::new("div")
                    .class("group")
                    .child(Element::new("span").class("label").text(spec.label.clone().unwrap_or_default()))
                    .child(input)
                    .child(info)
            } else {
                Element::new("div").child(input).child(info)
            }
        }
        NodeKind::Function(function) => {
            let button = render_node(arena, function.button, regions)?;
            let args = function
                .args
                .values()
                .map(|arg| render_node(arena, *arg, regions))
                .collect::<Result<Vec<_>, _>>()?;
            let inputs = Element::new("div")
                .class("functionInputDiv")
                .child(button)
                .child(Element::new("div").class("functionArgGroup").children(args));
            let info = Element::new("div")
                .class("functionInfoDiv")
                .child(Element::new("span").class("functionInfo").id(primary));
            Element::new("div")
                .class("group")
                .child(Element::new("div").class("functionHeader").text(&function.method_name))
                .child(
                    Element::new("div")
                        .class("functionGroup")
                        .attr("id", format!("functionGroup{}", node.id))
                        .child(inputs)
                        .child(info),
                )
        }
    };
    Ok(element.into())
}

fn render_children(arena: &Arena, node: &Node, regions: &mut IndexMap<NodeId, Regions>) -> Result<Vec<View>, UiError> {
    node.children
        .iter()
        .map(|child| render_node(arena, *child, regions))
        .collect()
}
