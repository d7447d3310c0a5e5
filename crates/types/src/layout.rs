//! Declarative node specifications used to assemble a tree.
//!
//! A layout is a nested [`NodeSpec`] document, authored in YAML or JSON. The
//! order of `children` and `args` is significant: it is render order, and for
//! function arguments it is also the order in which argument values are
//! collected for a build pass.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Classification of an input that selects its validation on change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    /// Any account address.
    Address,
    /// The sending account; an empty value falls back to the default account.
    AddressFrom,
    /// A contract address.
    Contract,
    /// An ERC-721 token contract address.
    Erc721,
    /// An amount denominated in ether.
    Ether,
    /// An amount denominated in gwei.
    Gwei,
    /// A function signature.
    Function,
    /// No validation.
    #[default]
    #[serde(alias = "text")]
    Untyped,
}

impl ArgType {
    pub fn as_str(self) -> &'static str {
        match self {
            ArgType::Address => "address",
            ArgType::AddressFrom => "addressfrom",
            ArgType::Contract => "contract",
            ArgType::Erc721 => "erc721",
            ArgType::Ether => "ether",
            ArgType::Gwei => "gwei",
            ArgType::Function => "function",
            ArgType::Untyped => "untyped",
        }
    }
}

/// Kind hint passed to account/contract lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    #[default]
    Unspecified,
    Person,
    Contract,
    Erc721,
}

/// Currency denominations understood by currency validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    Ether,
    Gwei,
}

impl Denomination {
    /// Number of decimal places between this denomination and wei.
    pub fn decimals(self) -> u32 {
        match self {
            Denomination::Ether => 18,
            Denomination::Gwei => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Denomination::Ether => "ether",
            Denomination::Gwei => "gwei",
        }
    }
}

/// One node of a layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeSpec {
    /// Text-only status strip.
    Banner,
    /// Grouped label with an info region.
    Label { text: String },
    /// Container rendering its children in order.
    Panel {
        #[serde(default)]
        name: String,
        #[serde(default)]
        top_level: bool,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    Button(ButtonSpec),
    #[serde(rename = "checkbox")]
    CheckBox { label: String },
    /// Standalone input outside a function.
    Input(InputSpec),
    /// Transaction workflow: trigger button plus one input per argument.
    Function(FunctionSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Declares a single argument input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Argument name used as the key in collected argument values.
    pub name: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Render with its own label group instead of inline.
    #[serde(default)]
    pub standalone: bool,
    #[serde(default, rename = "type")]
    pub arg_type: ArgType,
    /// Accept a leading negation marker in function signatures.
    #[serde(default)]
    pub allow_negate: bool,
}

impl InputSpec {
    pub fn new(name: impl Into<String>, arg_type: ArgType) -> Self {
        Self {
            name: name.into(),
            placeholder: String::new(),
            label: None,
            standalone: false,
            arg_type,
            allow_negate: false,
        }
    }
}

/// Declares a transaction workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub method_name: String,
    /// Transaction kind forwarded to the submitter.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Initial state of the trigger button.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub args: Vec<InputSpec>,
}

fn default_enabled() -> bool {
    true
}

/// Parse a layout document. YAML is a superset of JSON, so both are accepted.
pub fn parse_layout(content: &str) -> Result<NodeSpec> {
    serde_yaml::from_str(content).context("Failed to parse layout document")
}

/// Read and parse a layout document from disk.
pub fn load_layout_from_file(path: impl AsRef<Path>) -> Result<NodeSpec> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read layout file: {}", path.display()))?;
    parse_layout(&content).with_context(|| format!("Invalid layout file: {}", path.display()))
}
