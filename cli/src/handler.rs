//! Request handling: validate, query one snapshot, shape the response.

use std::collections::BTreeMap;

use rail_graph_core::{Edge, GraphStore, Route, SearchConstraints};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::validate;

/// One operation against the store, as accepted on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Request {
    /// Replace the graph with a comma-separated edge list.
    Load { edges: String },
    Graph,
    Status,
    Distance { path: Vec<String> },
    #[serde(rename_all = "camelCase")]
    CountByStops {
        from: String,
        to: String,
        #[serde(default)]
        min_stops: i64,
        max_stops: i64,
    },
    #[serde(rename_all = "camelCase")]
    CountByDistance {
        from: String,
        to: String,
        max_distance: i64,
    },
    Shortest { from: String, to: String },
    Search {
        from: String,
        to: String,
        #[serde(default)]
        constraints: SearchConstraints,
        #[serde(default)]
        limit: i64,
    },
}

impl Request {
    pub fn op(&self) -> &'static str {
        match self {
            Request::Load { .. } => "load",
            Request::Graph => "graph",
            Request::Status => "status",
            Request::Distance { .. } => "distance",
            Request::CountByStops { .. } => "countByStops",
            Request::CountByDistance { .. } => "countByDistance",
            Request::Shortest { .. } => "shortest",
            Request::Search { .. } => "search",
        }
    }
}

/// Response bodies. Serialized without a tag, field names as on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Loaded {
        status: &'static str,
        message: &'static str,
        generation: u64,
    },
    Graph {
        edges: BTreeMap<String, Vec<Edge>>,
        node_count: usize,
    },
    Status {
        status: &'static str,
        generation: u64,
        node_count: usize,
        edge_count: usize,
        load_time_ms: f64,
        loaded_secs_ago: u64,
    },
    Distance {
        distance: u64,
    },
    Count {
        count: u64,
    },
    Route {
        distance: u64,
        path: Vec<String>,
    },
    Routes {
        routes: Vec<Route>,
    },
    Error {
        error: String,
        kind: &'static str,
    },
}

impl Response {
    pub fn from_error(err: &Error) -> Self {
        Response::Error {
            error: err.to_string(),
            kind: err.kind(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

/// Serves requests against a store it does not own.
pub struct Handler<'a> {
    store: &'a GraphStore,
    settings: &'a Settings,
}

impl<'a> Handler<'a> {
    pub fn new(store: &'a GraphStore, settings: &'a Settings) -> Self {
        Self { store, settings }
    }

    /// Like [`Handler::handle`], with failures folded into `Response::Error`.
    pub fn respond(&self, request: Request) -> Response {
        self.handle(request)
            .unwrap_or_else(|err| Response::from_error(&err))
    }

    pub fn handle(&self, request: Request) -> Result<Response> {
        match request {
            Request::Load { edges } => {
                let tokens = validate::sanitize_edges_input(&edges);
                let generation = self.store.load_edges(&tokens)?;
                info!(generation, tokens = tokens.len(), "rail_graph: graph replaced");
                Ok(Response::Loaded {
                    status: "ok",
                    message: "graph loaded",
                    generation,
                })
            }
            Request::Graph => {
                let state = self.store.snapshot();
                let edges = state
                    .graph
                    .adjacency()
                    .into_iter()
                    .map(|(from, edges)| (from.to_string(), edges.to_vec()))
                    .collect();
                Ok(Response::Graph {
                    edges,
                    node_count: state.graph.source_count(),
                })
            }
            Request::Status => {
                let state = self.store.snapshot();
                Ok(Response::Status {
                    status: if state.graph.is_empty() { "empty" } else { "loaded" },
                    generation: state.generation,
                    node_count: state.graph.node_count(),
                    edge_count: state.graph.edge_count(),
                    load_time_ms: state.load_time_ms(),
                    loaded_secs_ago: state.loaded_at.elapsed().as_secs(),
                })
            }
            Request::Distance { path } => {
                let path = validate::validate_path(&path)?;
                let distance = self.store.distance(&path)?;
                Ok(Response::Distance { distance })
            }
            Request::CountByStops {
                from,
                to,
                min_stops,
                max_stops,
            } => {
                let from = validate::validate_town(&from)?;
                let to = validate::validate_town(&to)?;
                let min_stops = if min_stops == 0 {
                    i64::from(self.settings.default_min_stops)
                } else {
                    min_stops
                };
                let (min, max) = validate::stop_bounds(min_stops, max_stops)?;
                let count = self.store.count_trips_by_stops(&from, &to, min, max);
                Ok(Response::Count { count })
            }
            Request::CountByDistance {
                from,
                to,
                max_distance,
            } => {
                let from = validate::validate_town(&from)?;
                let to = validate::validate_town(&to)?;
                let max_distance = validate::distance_bound(max_distance)?;
                let count = self.store.count_trips_by_distance(&from, &to, max_distance);
                Ok(Response::Count { count })
            }
            Request::Shortest { from, to } => {
                let from = validate::validate_town(&from)?;
                let to = validate::validate_town(&to)?;
                let route = self.store.shortest_path(&from, &to)?;
                Ok(Response::Route {
                    distance: route.distance,
                    path: route.path,
                })
            }
            Request::Search {
                from,
                to,
                constraints,
                limit,
            } => {
                let from = validate::validate_town(&from)?;
                let to = validate::validate_town(&to)?;
                let routes = self.store.search_routes(
                    &from,
                    &to,
                    &constraints,
                    validate::route_limit(limit),
                );
                Ok(Response::Routes { routes })
            }
        }
    }
}
