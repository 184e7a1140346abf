//! rail-graph: host layer around rail-graph-core.
//!
//! Validates caller input, resolves configuration, and exposes the engine's
//! queries as CLI subcommands and as a newline-delimited JSON service. The
//! engine itself is never called with unvalidated town ids or bounds.

pub mod config;
pub mod error;
pub mod handler;
pub mod serve;
pub mod validate;

pub use config::{Cli, Command, GraphSource, Settings};
pub use error::{Error, Result};
pub use handler::{Handler, Request, Response};
