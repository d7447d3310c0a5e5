//! # Txpanel UI
//!
//! A small tree of renderable, stateful nodes. A tree is assembled top-down,
//! rendered once to a static [`Presentation`], attached once to a live
//! [`Surface`], and then driven by events that flood from the target node up
//! to the root.
//!
//! ## Lifecycle
//!
//! 1. **Assemble**: construct nodes through [`Tree`] (or [`Tree::assemble`]
//!    from a layout document) and link them with panels and `append`.
//! 2. **Render**: [`Tree::render`] walks depth-first and returns the view plus
//!    the regions each node owns. Structure is fixed from here on.
//! 3. **Attach**: [`Tree::attach_all`] binds every node to the handles a
//!    surface realizes for its regions.
//! 4. **Dispatch**: [`Tree::dispatch`] / [`Tree::handle_raw`] deliver
//!    activate and mutate events.
//!
//! ## Modules
//!
//! - **`tree`**: the session handle and construction API
//! - **`node`**: the node arena and variant set
//! - **`render`** / **`view`**: presentation structure and HTML output
//! - **`surface`**: live handles, plus an in-memory surface
//! - **`dispatch`**: event routing and flood propagation
//! - **`input`**: input values and change validation
//! - **`workflow`**: the build/submit state machine

mod assemble;
mod dispatch;
mod error;
mod input;
mod node;
mod render;
mod surface;
mod tree;
mod view;
mod workflow;

pub use dispatch::{NodeEvent, RawEvent, UiEvent};
pub use error::{UiError, WorkflowError};
pub use node::{Listener, NodeVariant};
pub use render::{Presentation, Regions};
pub use surface::{MemoryHandle, MemorySurface, Surface, SurfaceHandle};
pub use tree::Tree;
pub use view::{Element, View};
pub use workflow::{WorkflowPhase, WorkflowSnapshot};
