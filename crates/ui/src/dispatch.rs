//! Event routing and flood propagation.
//!
//! An event delivered to a node runs that node's reaction, then its
//! listeners, then repeats on the parent until the root is reached. There is
//! no way for a node to stop the walk. Two variants deviate:
//!
//! - inputs ignore activation entirely, and validate their value before a
//!   mutation starts walking;
//! - workflows build on mutation and submit on activation as their own
//!   reaction.

use tracing::debug;
use txpanel_types::{ElementId, NodeId};

use crate::error::UiError;
use crate::node::{NodeKind, NodeVariant};
use crate::tree::Tree;

/// Logical interaction channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEvent {
    /// Click.
    Activate,
    /// Value change or commit.
    Mutate,
}

/// Interaction as reported by a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    Click,
    Change,
    /// Key released; `Enter` commits the value.
    KeyUp(String),
}

impl RawEvent {
    pub fn to_ui_event(&self) -> Option<UiEvent> {
        match self {
            RawEvent::Click => Some(UiEvent::Activate),
            RawEvent::Change => Some(UiEvent::Mutate),
            RawEvent::KeyUp(key) if key == "Enter" => Some(UiEvent::Mutate),
            RawEvent::KeyUp(_) => None,
        }
    }
}

/// What a listener sees when an event reaches its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeEvent {
    /// Node currently reacting.
    pub node: NodeId,
    /// Node the event was delivered to.
    pub target: NodeId,
    pub event: UiEvent,
}

impl Tree {
    /// Route a surface interaction on `element` to the node bound to it.
    pub async fn handle_raw(&self, element: &ElementId, raw: RawEvent) -> Result<Vec<NodeId>, UiError> {
        let target = self
            .lock()
            .elements
            .get(element)
            .copied()
            .ok_or_else(|| UiError::UnknownElement(element.clone()))?;
        match raw.to_ui_event() {
            Some(event) => self.dispatch(target, event).await,
            None => Ok(Vec::new()),
        }
    }

    /// Deliver `event` to `target` and flood it to the root.
    ///
    /// Returns every node that reacted, target first.
    pub async fn dispatch(&self, target: NodeId, event: UiEvent) -> Result<Vec<NodeId>, UiError> {
        let variant = {
            let arena = self.lock();
            arena.binding(target)?;
            arena.node(target)?.kind.variant()
        };
        debug!(node = %target, event = ?event, "dispatching event");

        if variant == NodeVariant::Input {
            match event {
                UiEvent::Activate => return Ok(Vec::new()),
                UiEvent::Mutate => self.validate_input(target).await?,
            }
        }

        let mut reached = Vec::new();
        let mut current = Some(target);
        while let Some(id) = current {
            self.react(id, target, event).await?;
            reached.push(id);
            current = self.lock().node(id)?.parent;
        }
        Ok(reached)
    }

    async fn react(&self, id: NodeId, target: NodeId, event: UiEvent) -> Result<(), UiError> {
        let (is_function, listeners) = {
            let arena = self.lock();
            let node = arena.node(id)?;
            (matches!(node.kind, NodeKind::Function(_)), node.listeners.clone())
        };
        debug!(node = %id, event = ?event, "node reached");

        if is_function {
            match event {
                UiEvent::Mutate => {
                    // Reflected in the status text and gate; the event carries on.
                    let _ = self.build_transaction(id).await;
                }
                UiEvent::Activate => {
                    let message = self.send_transaction(id).await;
                    debug!(node = %id, message = %message, "activation handled by workflow");
                }
            }
        }

        let node_event = NodeEvent {
            node: id,
            target,
            event,
        };
        for listener in &listeners {
            listener(&node_event);
        }
        Ok(())
    }
}
