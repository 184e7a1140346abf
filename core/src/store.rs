use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{LoadError, LoadResult, RouteError};
use crate::graph::{parse_text, Graph};
use crate::traversal::{self, Route, SearchConstraints};

/// A published graph plus metadata about the load that produced it.
#[derive(Debug)]
pub struct GraphState {
    pub graph: Graph,
    /// Successful loads so far. 0 = the initial empty graph.
    pub generation: u64,
    pub load_time: Duration,
    pub loaded_at: Instant,
}

impl GraphState {
    pub fn load_time_ms(&self) -> f64 {
        self.load_time.as_secs_f64() * 1000.0
    }
}

/// Shared owner of the current graph.
///
/// Readers take an `Arc` snapshot and traverse it without holding any lock.
/// A load validates and builds the whole candidate graph first, then takes
/// the write lock only to swap the pointer, so a query sees either the old
/// graph or the new one, never a mix.
#[derive(Debug)]
pub struct GraphStore {
    current: RwLock<Arc<GraphState>>,
}

impl GraphStore {
    /// An empty store at generation 0.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(GraphState {
                graph: Graph::new(),
                generation: 0,
                load_time: Duration::ZERO,
                loaded_at: Instant::now(),
            })),
        }
    }

    /// Point-in-time view of the graph. Stays valid across later reloads.
    pub fn snapshot(&self) -> Arc<GraphState> {
        // The guarded value is a single Arc, so a poisoned lock still holds a whole graph.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }

    /// Replace the whole graph with the edges in `tokens`.
    ///
    /// Returns the new generation. On error the previous graph stays published.
    pub fn load_edges<I, S>(&self, tokens: I) -> LoadResult<u64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let start = Instant::now();
        match Graph::from_tokens(tokens) {
            Ok(graph) => Ok(self.publish(graph, start.elapsed())),
            Err(e) => {
                warn!(error = %e, "rail_graph: graph load rejected, keeping current graph");
                Err(e)
            }
        }
    }

    /// Load from definition text: newline-separated records of comma-separated tokens.
    pub fn load_text(&self, text: &str) -> LoadResult<u64> {
        self.load_edges(parse_text(text))
    }

    /// Load from a definition file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> LoadResult<u64> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| {
            warn!(path = %path.display(), error = %source, "rail_graph: cannot read graph file");
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!(path = %path.display(), "rail_graph: loading graph file");
        self.load_text(&text)
    }

    fn publish(&self, graph: Graph, load_time: Duration) -> u64 {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let generation = guard.generation + 1;
        *guard = Arc::new(GraphState {
            graph,
            generation,
            load_time,
            loaded_at: Instant::now(),
        });
        drop(guard);

        info!(
            generation,
            node_count,
            edge_count,
            load_time_ms = load_time.as_secs_f64() * 1000.0,
            "rail_graph: graph loaded"
        );
        generation
    }

    /// Sum of edge distances along `path`.
    pub fn distance<S: AsRef<str>>(&self, path: &[S]) -> Result<u64, RouteError> {
        let state = self.snapshot();
        let result = traversal::distance(&state.graph, path);
        debug!(hops = path.len().saturating_sub(1), ok = result.is_ok(), "rail_graph: distance");
        result
    }

    pub fn count_trips_by_stops(&self, from: &str, to: &str, min_stops: u32, max_stops: u32) -> u64 {
        let state = self.snapshot();
        let count = traversal::count_trips_by_stops(&state.graph, from, to, min_stops, max_stops);
        debug!(from, to, min_stops, max_stops, count, "rail_graph: trips by stops");
        count
    }

    pub fn count_trips_by_distance(&self, from: &str, to: &str, max_distance: u64) -> u64 {
        let state = self.snapshot();
        let count = traversal::count_trips_by_distance(&state.graph, from, to, max_distance);
        debug!(from, to, max_distance, count, "rail_graph: trips by distance");
        count
    }

    /// Shortest walk of at least one edge, or `Unreachable`.
    pub fn shortest_path(&self, from: &str, to: &str) -> Result<Route, RouteError> {
        let state = self.snapshot();
        let route = traversal::shortest_path(&state.graph, from, to);
        debug!(from, to, distance = route.as_ref().map(|r| r.distance), "rail_graph: shortest path");
        route.ok_or_else(|| RouteError::Unreachable {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    pub fn search_routes(
        &self,
        from: &str,
        to: &str,
        constraints: &SearchConstraints,
        limit: usize,
    ) -> Vec<Route> {
        let state = self.snapshot();
        let routes = traversal::search_routes(&state.graph, from, to, constraints, limit);
        debug!(from, to, ?constraints, limit, found = routes.len(), "rail_graph: route search");
        routes
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::thread;

    const SEED: &str = "AB5, BC4, CD8, DC8, DE6, AD5, CE2, EB3, AE7";

    fn seeded() -> GraphStore {
        let store = GraphStore::new();
        store.load_text(SEED).unwrap();
        store
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = GraphStore::new();
        let snap = store.snapshot();
        assert!(snap.graph.is_empty());
        assert_eq!(snap.generation, 0);
    }

    #[test]
    fn test_load_bumps_generation() {
        let store = GraphStore::new();
        assert_eq!(store.load_edges(["AB5"]).unwrap(), 1);
        assert_eq!(store.load_edges(["AB5", "BC4"]).unwrap(), 2);
        assert_eq!(store.generation(), 2);
        assert_eq!(store.snapshot().graph.edge_count(), 2);
    }

    #[test]
    fn test_failed_load_leaves_graph_untouched() {
        let store = seeded();
        let before = store.snapshot();

        let err = store.load_edges(["AB5", "BC4", "CC3", "CD8"]).unwrap_err();
        assert!(matches!(err, LoadError::SelfLoop { .. }));

        let after = store.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.generation, 1);
        assert_eq!(after.graph.edge_count(), 9);
    }

    #[test]
    fn test_empty_load_clears_graph() {
        let store = seeded();
        store.load_edges(Vec::<String>::new()).unwrap();
        let snap = store.snapshot();
        assert!(snap.graph.is_empty());
        assert_eq!(snap.generation, 2);
    }

    #[test]
    fn test_snapshot_outlives_reload() {
        let store = seeded();
        let old = store.snapshot();
        store.load_edges(["XY1"]).unwrap();

        assert_eq!(old.graph.edge_count(), 9);
        assert!(old.graph.contains("A"));
        let new = store.snapshot();
        assert!(!new.graph.contains("A"));
        assert_eq!(new.generation, old.generation + 1);
    }

    #[test]
    fn test_queries_through_store() {
        let store = seeded();
        assert_eq!(store.distance(&["A", "B", "C"]), Ok(9));
        assert_eq!(store.count_trips_by_stops("C", "C", 1, 3), 2);
        assert_eq!(store.count_trips_by_distance("C", "C", 30), 7);

        let route = store.shortest_path("A", "C").unwrap();
        assert_eq!(route.path, vec!["A", "B", "C"]);
        assert!(matches!(
            store.shortest_path("B", "A"),
            Err(RouteError::Unreachable { .. })
        ));

        let constraints = SearchConstraints {
            max_stops: 3,
            ..Default::default()
        };
        assert_eq!(store.search_routes("C", "C", &constraints, 1).len(), 1);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "AB5, BC4, CD8").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "dc8,DE6").unwrap();

        let store = GraphStore::new();
        assert_eq!(store.load_file(file.path()).unwrap(), 1);
        let snap = store.snapshot();
        assert_eq!(snap.graph.edge_count(), 5);
        assert_eq!(snap.graph.edge("D", "C").map(|e| e.distance), Some(8));
    }

    #[test]
    fn test_load_missing_file() {
        let store = seeded();
        let dir = tempfile::tempdir().unwrap();
        let err = store.load_file(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.token().is_none());
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn test_load_file_with_bad_token_keeps_graph() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "AB5,B5").unwrap();

        let store = seeded();
        let err = store.load_file(file.path()).unwrap_err();
        assert_eq!(err.token(), Some("B5"));
        assert_eq!(store.snapshot().graph.edge_count(), 9);
    }

    #[test]
    fn test_concurrent_readers_and_reloads() {
        let seed = Graph::from_tokens(parse_text(SEED)).unwrap();
        let small = Graph::from_tokens(["AB5", "BC4", "CD8"]).unwrap();

        let store = GraphStore::new();
        store.load_text(SEED).unwrap();

        thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| {
                    for _ in 0..50 {
                        let snap = store.snapshot();
                        assert!(snap.graph == seed || snap.graph == small);

                        let route = traversal::shortest_path(&snap.graph, "A", "C").unwrap();
                        assert_eq!(route.distance, 9);
                        let trips = traversal::count_trips_by_distance(&snap.graph, "C", "C", 30);
                        assert!(trips == 7 || trips == 0);

                        for edge in snap.graph.edges() {
                            assert!(
                                seed.edge(&edge.from, &edge.to).is_some()
                                    || small.edge(&edge.from, &edge.to).is_some()
                            );
                        }
                    }
                });
            }
            for i in 0..4 {
                let store = &store;
                s.spawn(move || {
                    for j in 0..20 {
                        if (i + j) % 2 == 0 {
                            store.load_edges(["AB5", "BC4", "CD8"]).unwrap();
                        } else {
                            store.load_text(SEED).unwrap();
                        }
                        // Rejected loads race alongside and must never publish.
                        assert!(store.load_edges(["AB5", "AB6"]).is_err());
                    }
                });
            }
        });

        assert_eq!(store.generation(), 1 + 4 * 20);
    }
}
