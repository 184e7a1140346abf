use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Why a graph load was rejected.
///
/// Every token variant carries the normalized (trimmed, uppercased) token
/// that failed. A load that returns any of these leaves the published graph
/// exactly as it was.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid edge token: {token:?}")]
    MalformedToken { token: String },

    #[error("self-loop not allowed: {token:?}")]
    SelfLoop { token: String },

    #[error("distance must be positive in token {token:?}")]
    NonPositiveDistance { token: String },

    #[error("distance out of range in token {token:?}")]
    DistanceOutOfRange { token: String },

    #[error("duplicate edge: {token:?}")]
    DuplicateEdge { token: String },

    #[error("cannot read graph file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// The offending token, if the failure was caused by one.
    pub fn token(&self) -> Option<&str> {
        match self {
            LoadError::MalformedToken { token }
            | LoadError::SelfLoop { token }
            | LoadError::NonPositiveDistance { token }
            | LoadError::DistanceOutOfRange { token }
            | LoadError::DuplicateEdge { token } => Some(token),
            LoadError::Io { .. } => None,
        }
    }
}

/// Query-time failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// A fixed path has a consecutive pair with no direct edge.
    #[error("NO SUCH ROUTE")]
    NoSuchRoute { from: NodeId, to: NodeId },

    /// No walk of at least one edge leads from `from` to `to`.
    #[error("NO SUCH ROUTE")]
    Unreachable { from: NodeId, to: NodeId },

    #[error("invalid bounds: {0}")]
    InvalidBounds(String),
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
