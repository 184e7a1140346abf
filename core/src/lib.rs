//! rail-graph-core: In-memory route graph and query engine.
//!
//! A pure Rust library that holds a small weighted directed graph of towns
//! and answers route queries over it: distance along a fixed path, trip
//! counts bounded by stops or distance, shortest walks (cycles allowed),
//! and constrained route enumeration.
//!
//! [`GraphStore`] publishes each successfully loaded graph as an immutable
//! snapshot; queries run against one snapshot for their whole duration, so
//! concurrent reloads never show a reader a half-replaced edge table.

mod error;
mod graph;
mod store;
mod traversal;

pub use error::{LoadError, LoadResult, RouteError};
pub use graph::{parse_text, parse_token, Distance, Edge, EdgeRecord, Graph, NodeId};
pub use store::{GraphState, GraphStore};
pub use traversal::{
    count_trips_by_distance, count_trips_by_stops, distance, search_routes, shortest_path, Route,
    SearchConstraints,
};
