//! Realized presentation surfaces.
//!
//! A [`Surface`] turns element ids from a rendered [`Presentation`] into live
//! handles. Hosts backed by a real display implement it; [`MemorySurface`]
//! keeps handle state in memory for headless use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use txpanel_types::{ElementId, NodeId};

use crate::render::Presentation;
use crate::view::View;

/// A live, interactive region.
pub trait SurfaceHandle: Send + Sync {
    /// Current user-entered value.
    fn value(&self) -> String;
    /// Displayed text.
    fn text(&self) -> String;
    fn set_text(&self, text: &str);
    fn is_disabled(&self) -> bool;
    fn set_disabled(&self, disabled: bool);
}

/// Locates live handles for rendered regions.
pub trait Surface: Send + Sync {
    /// `None` when the region has not been realized.
    fn realize(&self, element: &ElementId) -> Option<Arc<dyn SurfaceHandle>>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct HandleState {
    value: String,
    text: String,
    disabled: bool,
}

/// In-memory handle.
#[derive(Debug, Default)]
pub struct MemoryHandle {
    state: Mutex<HandleState>,
}

impl MemoryHandle {
    fn with_disabled(disabled: bool) -> Self {
        Self {
            state: Mutex::new(HandleState {
                disabled,
                ..HandleState::default()
            }),
        }
    }

    /// Simulate the user typing into the region.
    pub fn set_value(&self, value: impl Into<String>) {
        self.lock().value = value.into();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HandleState> {
        self.state.lock().expect("handle lock poisoned")
    }
}

impl SurfaceHandle for MemoryHandle {
    fn value(&self) -> String {
        self.lock().value.clone()
    }

    fn text(&self) -> String {
        self.lock().text.clone()
    }

    fn set_text(&self, text: &str) {
        self.lock().text = text.to_string();
    }

    fn is_disabled(&self) -> bool {
        self.lock().disabled
    }

    fn set_disabled(&self, disabled: bool) {
        self.lock().disabled = disabled;
    }
}

/// Surface realizing every region of one presentation in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    handles: HashMap<ElementId, Arc<MemoryHandle>>,
}

impl MemorySurface {
    /// Realize each region of `presentation`. Initial disabled state is taken
    /// from the rendered `disabled` attribute.
    pub fn from_presentation(presentation: &Presentation) -> Self {
        let mut handles = HashMap::new();
        for regions in presentation.regions.values() {
            for element_id in [&regions.primary, &regions.info] {
                handles.entry(element_id.clone()).or_insert_with(|| {
                    let disabled = rendered_disabled(&presentation.view, element_id);
                    Arc::new(MemoryHandle::with_disabled(disabled))
                });
            }
        }
        Self { handles }
    }

    pub fn handle(&self, element: &ElementId) -> Option<Arc<MemoryHandle>> {
        self.handles.get(element).cloned()
    }

    /// Set the value of a node's primary region.
    pub fn set_value(&self, node: NodeId, value: impl Into<String>) {
        if let Some(handle) = self.handles.get(&ElementId::primary(node)) {
            handle.set_value(value);
        }
    }

    /// Whether a node's primary region is disabled.
    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.handles
            .get(&ElementId::primary(node))
            .is_some_and(|handle| handle.is_disabled())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Surface for MemorySurface {
    fn realize(&self, element: &ElementId) -> Option<Arc<dyn SurfaceHandle>> {
        self.handles
            .get(element)
            .map(|handle| Arc::clone(handle) as Arc<dyn SurfaceHandle>)
    }
}

fn rendered_disabled(view: &View, element_id: &ElementId) -> bool {
    view.find(element_id)
        .and_then(|element| element.attribute("disabled"))
        .is_some_and(|value| value == "true")
}
