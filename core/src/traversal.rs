use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::graph::{Graph, NodeId};

/// A walk through the graph with its total distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: Vec<NodeId>,
    pub distance: u64,
}

impl Route {
    /// Number of edges taken.
    pub fn stops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Town names concatenated, the secondary sort key for equal distances.
    pub fn key(&self) -> String {
        self.path.concat()
    }
}

/// Optional limits on [`search_routes`]. A zero bound means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConstraints {
    pub max_stops: usize,
    pub max_distance: u64,
    pub distinct_nodes: bool,
}

/// Total distance along a fixed sequence of towns.
///
/// Every consecutive pair must be joined by a direct edge; the first missing
/// hop fails the whole query. Sequences shorter than two towns cover no
/// edges and sum to 0.
pub fn distance<S: AsRef<str>>(graph: &Graph, path: &[S]) -> Result<u64, RouteError> {
    let mut total = 0u64;
    for pair in path.windows(2) {
        let (from, to) = (pair[0].as_ref(), pair[1].as_ref());
        match graph.edge(from, to) {
            Some(edge) => total = total.saturating_add(edge.distance),
            None => {
                return Err(RouteError::NoSuchRoute {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
        }
    }
    Ok(total)
}

/// Count walks from `from` to `to` taking between `min_stops` and
/// `max_stops` edges, inclusive.
///
/// Walks may repeat towns and edges. A walk that matches is still extended,
/// so `C-D-C` and `C-D-C-D-C` both count when the bounds allow. Returns 0
/// when `min_stops > max_stops`.
pub fn count_trips_by_stops(
    graph: &Graph,
    from: &str,
    to: &str,
    min_stops: u32,
    max_stops: u32,
) -> u64 {
    if min_stops > max_stops {
        return 0;
    }

    let mut count = 0u64;
    let mut stack: Vec<(&str, u32)> = vec![(from, 0)];

    while let Some((town, stops)) = stack.pop() {
        if stops >= min_stops && town == to {
            count += 1;
        }
        if stops < max_stops {
            for edge in graph.neighbors_out(town) {
                stack.push((edge.to.as_str(), stops + 1));
            }
        }
    }

    count
}

/// Count walks from `from` to `to` whose total distance is strictly less
/// than `max_distance`.
///
/// An edge is only taken if the distance after taking it stays below the
/// bound. Each arrival at `to` counts once, so a walk passing through `to`
/// several times contributes several trips. Returns 0 when `max_distance` is 0.
pub fn count_trips_by_distance(graph: &Graph, from: &str, to: &str, max_distance: u64) -> u64 {
    if max_distance == 0 {
        return 0;
    }

    let mut count = 0u64;
    let mut stack: Vec<(&str, u64)> = vec![(from, 0)];

    while let Some((town, travelled)) = stack.pop() {
        for edge in graph.neighbors_out(town) {
            let next = travelled.saturating_add(edge.distance);
            if next >= max_distance {
                continue;
            }
            if edge.to == to {
                count += 1;
            }
            stack.push((edge.to.as_str(), next));
        }
    }

    count
}

/// A pending walk in the shortest-path queue.
///
/// Ordered so that `BinaryHeap` pops the smallest distance first and, among
/// equal distances, the lexicographically smallest concatenated path.
#[derive(Debug)]
struct Candidate<'a> {
    distance: u64,
    key: String,
    town: &'a str,
    path: Vec<NodeId>,
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.key == other.key
    }
}

impl Eq for Candidate<'_> {}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.key.cmp(&self.key))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Minimum-distance walk from `from` to `to` (Dijkstra).
///
/// The walk must take at least one edge, so `from == to` asks for the
/// shortest cycle through that town. The start town is not settled at
/// distance 0, which keeps it reachable again later. Ties on distance go to
/// the lexicographically smallest concatenation of town names.
///
/// Returns None for empty endpoints or when no such walk exists.
pub fn shortest_path<'a>(graph: &'a Graph, from: &'a str, to: &str) -> Option<Route> {
    if from.is_empty() || to.is_empty() {
        return None;
    }

    let mut settled: HashMap<&'a str, u64> = HashMap::new();
    let mut queue = BinaryHeap::new();
    queue.push(Candidate {
        distance: 0,
        key: from.to_string(),
        town: from,
        path: vec![from.to_string()],
    });

    while let Some(current) = queue.pop() {
        if let Some(&best) = settled.get(current.town) {
            if best <= current.distance {
                continue;
            }
        }
        if current.distance > 0 || current.town != from {
            settled.insert(current.town, current.distance);
        }

        // The heap order makes the first eligible arrival the answer.
        if current.town == to && current.distance > 0 {
            return Some(Route {
                path: current.path,
                distance: current.distance,
            });
        }

        for edge in graph.neighbors_out(current.town) {
            // Copy-on-extend: every queued walk owns its path.
            let mut path = current.path.clone();
            path.push(edge.to.clone());
            let mut key = current.key.clone();
            key.push_str(&edge.to);
            queue.push(Candidate {
                distance: current.distance.saturating_add(edge.distance),
                key,
                town: edge.to.as_str(),
                path,
            });
        }
    }

    None
}

struct Pending {
    path: Vec<NodeId>,
    distance: u64,
}

/// Enumerate walks from `from` to `to` under `constraints`, sorted by
/// distance and then by concatenated path.
///
/// A walk is reported once it reaches `to` with at least one edge taken, and
/// stays eligible for extension, so a route and a longer route sharing its
/// prefix can both appear. Without `distinct_nodes` and without any bound
/// this does not terminate on a cyclic graph; callers supply the bounds.
///
/// `limit` of 0 returns everything, otherwise at most `limit` routes.
pub fn search_routes(
    graph: &Graph,
    from: &str,
    to: &str,
    constraints: &SearchConstraints,
    limit: usize,
) -> Vec<Route> {
    let mut found: Vec<(String, Route)> = Vec::new();
    let mut stack = vec![Pending {
        path: vec![from.to_string()],
        distance: 0,
    }];

    while let Some(current) = stack.pop() {
        let Some(town) = current.path.last() else {
            continue;
        };

        for edge in graph.neighbors_out(town) {
            let distance = current.distance.saturating_add(edge.distance);
            let stops = current.path.len();

            if constraints.max_stops > 0 && stops > constraints.max_stops {
                continue;
            }
            if constraints.max_distance > 0 && distance > constraints.max_distance {
                continue;
            }
            if constraints.distinct_nodes && current.path.contains(&edge.to) {
                continue;
            }

            let mut path = current.path.clone();
            path.push(edge.to.clone());
            stack.push(Pending { path, distance });
        }

        if current.path.len() > 1 && town == to {
            let route = Route {
                path: current.path,
                distance: current.distance,
            };
            found.push((route.key(), route));
        }
    }

    // Stable: equal (distance, key) pairs keep discovery order.
    found.sort_by(|(ka, a), (kb, b)| a.distance.cmp(&b.distance).then_with(|| ka.cmp(kb)));

    if limit > 0 && limit < found.len() {
        found.truncate(limit);
    }

    found.into_iter().map(|(_, route)| route).collect()
}
