//! Tree usage and workflow errors.

use thiserror::Error;
use txpanel_engine::{BuildError, SubmitError};
use txpanel_types::{ElementId, NodeId};

/// Misuse of the tree API: unknown ids, wrong node kinds, or lifecycle
/// steps taken out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UiError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("unknown element {0}")]
    UnknownElement(ElementId),
    #[error("node {node} is not {expected}")]
    WrongKind { node: NodeId, expected: &'static str },
    #[error("node {0} already has a parent")]
    AlreadyParented(NodeId),
    #[error("node {0} cannot be appended to itself")]
    SelfAppend(NodeId),
    #[error("duplicate argument '{0}'")]
    DuplicateArgument(String),
    #[error("node {node} has no argument named '{name}'")]
    UnknownArgument { node: NodeId, name: String },
    #[error("no transaction builder registered for '{0}'")]
    MissingBuilder(String),
    #[error("tree structure is fixed once rendered")]
    Sealed,
    #[error("tree has already been rendered")]
    AlreadyRendered,
    #[error("tree has not been rendered")]
    NotRendered,
    #[error("tree has already been attached")]
    AlreadyAttached,
    #[error("node {0} is not attached")]
    NotAttached(NodeId),
    #[error("element {0} was not realized by the surface")]
    NotRealized(ElementId),
}

/// Failure of a build or submit pass.
///
/// `Display` of the build and submit variants is the bare failure detail,
/// which is what the workflow writes to its status message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("a submission is already in flight")]
    Busy,
    #[error(transparent)]
    Ui(#[from] UiError),
}
