use thiserror::Error;

use crate::node::NodeId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node does not exist: {0}")]
    InvalidReference(NodeId),

    #[error("invalid parent node: {0}")]
    InvalidParent(NodeId),

    #[error("path already taken: {0}")]
    DuplicatePath(String),

    #[error("invalid item descriptor: {0}")]
    Parse(String),

    #[error("config error: {message}")]
    Config { message: String },
}

pub type TreeResult<T> = Result<T, TreeError>;
