// Errors raised by scene backends.
//
// The layout crate wraps these in `LayoutError::Scene` together with the
// parameters of the build that triggered them.

use crate::scene::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The handle does not name a live node.
    #[error("unknown scene node {0}")]
    UnknownNode(NodeId),

    /// A curve-only call was made on a non-curve node.
    #[error("node {0} is not a curve")]
    NotACurve(NodeId),

    #[error("join called with no objects")]
    JoinEmpty,

    /// Joined objects must share a parent.
    #[error("cannot join {0} and {1}: they have different parents")]
    JoinAcrossParents(NodeId, NodeId),

    #[error("boolean target and tool are the same node {0}")]
    SelfSubtract(NodeId),

    /// A primitive was requested with a non-finite or non-positive dimension.
    #[error("invalid {what} for {name}: {value}")]
    InvalidDimension { name: String, what: &'static str, value: f64 },

    /// The geometry kernel rejected the operation.
    #[error("geometry kernel failure: {0}")]
    Kernel(String),
}

pub type SceneResult<T> = Result<T, SceneError>;
