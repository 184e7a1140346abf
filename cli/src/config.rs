//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rail_graph_core::{GraphStore, SearchConstraints};
use tracing::info;

use crate::error::Result;
use crate::handler::Request;
use crate::validate;

#[derive(Debug, Parser)]
#[command(name = "rail-graph", version, about = "Route queries over a weighted town graph")]
pub struct Cli {
    /// Graph definition file: lines of comma-separated edge tokens like AB5
    #[arg(long, env = "RAIL_GRAPH_FILE", global = true, conflicts_with = "edges")]
    pub graph: Option<PathBuf>,

    /// Inline graph definition, e.g. "AB5, BC4, CD8"
    #[arg(long, env = "RAIL_GRAPH_EDGES", global = true)]
    pub edges: Option<String>,

    /// minStops used when a count-by-stops request leaves it at 0
    #[arg(long, env = "RAIL_GRAPH_DEFAULT_MIN_STOPS", default_value_t = 1, global = true)]
    pub default_min_stops: u32,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Total distance along a fixed sequence of towns
    Distance {
        #[arg(required = true, num_args = 1..)]
        path: Vec<String>,
    },
    /// Count trips between two towns by number of stops
    CountByStops {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        min_stops: i64,
        #[arg(long, allow_negative_numbers = true)]
        max_stops: i64,
    },
    /// Count trips between two towns shorter than a distance
    CountByDistance {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, allow_negative_numbers = true)]
        max_distance: i64,
    },
    /// Shortest route between two towns (at least one stop)
    Shortest {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Enumerate routes under optional constraints, shortest first
    Search {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// 0 = unbounded
        #[arg(long, default_value_t = 0)]
        max_stops: usize,
        /// 0 = unbounded
        #[arg(long, default_value_t = 0)]
        max_distance: u64,
        #[arg(long)]
        distinct_nodes: bool,
        /// 0 or negative = all results
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        limit: i64,
    },
    /// Print the current edge table
    Graph,
    /// Print graph generation and size
    Status,
    /// Answer newline-delimited JSON requests from stdin
    Serve,
}

impl Command {
    /// The equivalent wire request. `Serve` has none.
    pub fn into_request(self) -> Option<Request> {
        let request = match self {
            Command::Distance { path } => Request::Distance { path },
            Command::CountByStops {
                from,
                to,
                min_stops,
                max_stops,
            } => Request::CountByStops {
                from,
                to,
                min_stops,
                max_stops,
            },
            Command::CountByDistance {
                from,
                to,
                max_distance,
            } => Request::CountByDistance {
                from,
                to,
                max_distance,
            },
            Command::Shortest { from, to } => Request::Shortest { from, to },
            Command::Search {
                from,
                to,
                max_stops,
                max_distance,
                distinct_nodes,
                limit,
            } => Request::Search {
                from,
                to,
                constraints: SearchConstraints {
                    max_stops,
                    max_distance,
                    distinct_nodes,
                },
                limit,
            },
            Command::Graph => Request::Graph,
            Command::Status => Request::Status,
            Command::Serve => return None,
        };
        Some(request)
    }
}

/// Where the initial graph comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GraphSource {
    #[default]
    Empty,
    File(PathBuf),
    Inline(String),
}

/// Resolved runtime settings, independent of how they were supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: GraphSource,
    pub default_min_stops: u32,
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: GraphSource::Empty,
            default_min_stops: 1,
            pretty: false,
        }
    }
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        let source = match (&cli.graph, &cli.edges) {
            (Some(path), _) => GraphSource::File(path.clone()),
            (None, Some(edges)) => GraphSource::Inline(edges.clone()),
            (None, None) => GraphSource::Empty,
        };
        Self {
            source,
            default_min_stops: cli.default_min_stops,
            pretty: cli.pretty,
        }
    }

    /// Load the configured graph into `store`. An empty source is a no-op.
    pub fn load_initial(&self, store: &GraphStore) -> Result<()> {
        match &self.source {
            GraphSource::Empty => {
                info!("rail_graph: no graph source configured, starting empty");
            }
            GraphSource::File(path) => {
                store.load_file(path)?;
            }
            GraphSource::Inline(edges) => {
                store.load_edges(validate::sanitize_edges_input(edges))?;
            }
        }
        Ok(())
    }
}
