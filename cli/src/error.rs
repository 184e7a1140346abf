//! Error types for the rail-graph host.

use std::io;

use rail_graph_core::{LoadError, RouteError};
use thiserror::Error;

/// Everything a request can fail with, from validation down to the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("empty town name")]
    EmptyTown,

    #[error("invalid town id: {0:?}")]
    InvalidTown(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("graph parse error: {0}")]
    Load(#[from] LoadError),

    #[error("invalid request body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Stable machine-readable category, reported next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::EmptyTown | Error::InvalidTown(_) => "invalidTown",
            Error::InvalidArgument(_) => "invalidArgument",
            Error::Route(RouteError::NoSuchRoute { .. }) => "noSuchRoute",
            Error::Route(RouteError::Unreachable { .. }) => "unreachable",
            Error::Route(RouteError::InvalidBounds(_)) => "invalidBounds",
            Error::Load(LoadError::Io { .. }) | Error::Io(_) => "io",
            Error::Load(_) => "graphParse",
            Error::Json(_) => "badRequest",
        }
    }
}

/// A specialized Result type for host operations.
pub type Result<T> = std::result::Result<T, Error>;
