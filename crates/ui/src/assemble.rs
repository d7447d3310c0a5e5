//! Assemble trees from layout documents.

use std::path::Path;

use anyhow::{Context, Result};
use txpanel_engine::BuilderRegistry;
use txpanel_types::{NodeId, NodeSpec, load_layout_from_file};

use crate::error::UiError;
use crate::tree::Tree;

impl Tree {
    /// Construct the nodes described by `spec`, children before their panel,
    /// and return the root. Each function takes the builder registered for
    /// its method name.
    pub fn assemble(&self, spec: &NodeSpec, builders: &BuilderRegistry) -> Result<NodeId, UiError> {
        match spec {
            NodeSpec::Banner => Ok(self.banner()),
            NodeSpec::Label { text } => Ok(self.label(text.as_str())),
            NodeSpec::Panel {
                name,
                top_level,
                children,
            } => {
                let children = children
                    .iter()
                    .map(|child| self.assemble(child, builders))
                    .collect::<Result<Vec<_>, _>>()?;
                self.panel(name.as_str(), *top_level, children)
            }
            NodeSpec::Button(button) => Ok(self.button(button.name.as_str(), button.enabled)),
            NodeSpec::CheckBox { label } => Ok(self.checkbox(label.as_str())),
            NodeSpec::Input(input) => Ok(self.input(input.clone())),
            NodeSpec::Function(function) => {
                let builder = builders
                    .resolve(&function.method_name)
                    .ok_or_else(|| UiError::MissingBuilder(function.method_name.clone()))?;
                self.function(function, builder)
            }
        }
    }

    /// Load a YAML or JSON layout from `path` and assemble it.
    pub fn assemble_from_file(&self, path: impl AsRef<Path>, builders: &BuilderRegistry) -> Result<NodeId> {
        let path = path.as_ref();
        let spec = load_layout_from_file(path)?;
        self.assemble(&spec, builders)
            .with_context(|| format!("Failed to assemble layout: {}", path.display()))
    }
}
