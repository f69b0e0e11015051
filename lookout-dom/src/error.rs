use crate::{NodeId, SelectorError};

#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// The frame's content document belongs to another origin.
    #[error("frame {0:?} is cross-origin")]
    CrossOriginFrame(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("invalid path `{0}`")]
    InvalidPath(String),
}
