//! Configuration errors.
//!
//! Infeasibility is never an error: an arc that does not exist yields `Ok(None)`
//! from extension and a violated window yields `Ok(false)` from the feasibility
//! check. Everything in here is a setup bug and should abort the search.

use thiserror::Error;

use crate::NodeId;

#[derive(Debug, Error)]
pub enum EspprcError {
    /// A label carries a resource for which no extension function was registered.
    #[error("no resource extension function registered for resource `{resource}`")]
    MissingRef { resource : String },

    /// A label carries a resource that has no entry in the window table.
    #[error("no resource window defined for resource `{resource}`")]
    MissingWindow { resource : String },

    /// Lower bound above upper bound (or NaN) in a window.
    #[error("invalid window for `{resource}` at index {index}: lower {lower} > upper {upper}")]
    InvalidWindow {
        resource : String,
        index : usize,
        lower : f64,
        upper : f64,
    },

    /// Lower and upper bound arrays disagree in length, or are empty.
    #[error("window for `{resource}` has {lower_len} lower and {upper_len} upper bounds")]
    WindowShape {
        resource : String,
        lower_len : usize,
        upper_len : usize,
    },

    /// A resource vector does not have the shape it was declared with.
    #[error("shape mismatch for `{resource}`: expected {expected} elements, got {got}")]
    ShapeMismatch {
        resource : String,
        expected : usize,
        got : usize,
    },

    /// A node id indexes past a node-indexed window.
    #[error("node {node} is out of range for `{resource}` ({len} nodes)")]
    NodeOutOfRange {
        resource : String,
        node : NodeId,
        len : usize,
    },

    #[error("malformed problem data: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EspprcError>;
