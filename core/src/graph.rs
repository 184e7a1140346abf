use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{LoadError, LoadResult};

/// Town identifier: 1-16 uppercase ASCII letters.
pub type NodeId = String;

/// Edge distance. Always strictly positive once loaded.
pub type Distance = u64;

/// A directed, weighted edge in the adjacency list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub to: NodeId,
    pub distance: Distance,
}

/// One (from, to, distance) triple, as it appeared in the definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeRecord {
    pub from: NodeId,
    pub to: NodeId,
    pub distance: Distance,
}

/// Immutable in-memory route graph: outgoing adjacency lists keyed by town.
///
/// Built in one go by [`Graph::from_tokens`]; never mutated afterwards, so a
/// shared reference can be traversed without any locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    outgoing: HashMap<NodeId, Vec<Edge>>,
    /// Every town touched by an edge, either end.
    towns: HashSet<NodeId>,
    edge_count: usize,
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"^([A-Z]{1,16})([A-Z]{1,16})([0-9]+)$").expect("edge token pattern is valid")
    })
}

/// Parse a single `<FROM><TO><DISTANCE>` token.
///
/// The token is trimmed and uppercased first; errors carry that normalized form.
pub fn parse_token(raw: &str) -> LoadResult<EdgeRecord> {
    let token = raw.trim().to_ascii_uppercase();
    let parts = token_regex()
        .captures(&token)
        .map(|caps| (caps[1].to_string(), caps[2].to_string(), caps[3].to_string()));
    let Some((from, to, digits)) = parts else {
        return Err(LoadError::MalformedToken { token });
    };

    if from == to {
        return Err(LoadError::SelfLoop { token });
    }

    // The pattern guarantees ASCII digits, so the only parse failure is overflow.
    let Ok(distance) = digits.parse::<Distance>() else {
        return Err(LoadError::DistanceOutOfRange { token });
    };
    if distance == 0 {
        return Err(LoadError::NonPositiveDistance { token });
    }

    Ok(EdgeRecord { from, to, distance })
}

/// Split a graph definition into edge tokens.
///
/// Records are newline-separated, tokens inside a record comma-separated.
/// Blank lines are skipped; empty tokens between commas are kept so the
/// loader rejects them as malformed.
pub fn parse_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(|line| line.split(','))
        .map(|token| token.trim().to_string())
        .collect()
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a full edge token list into a fresh graph.
    ///
    /// Fails on the first invalid token; nothing outside the candidate is
    /// touched, so a caller holding a previous graph keeps it intact.
    pub fn from_tokens<I, S>(tokens: I) -> LoadResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut graph = Graph::new();
        for raw in tokens {
            let record = parse_token(raw.as_ref())?;
            let edges = graph.outgoing.entry(record.from.clone()).or_default();
            if edges.iter().any(|e| e.to == record.to) {
                return Err(LoadError::DuplicateEdge {
                    token: raw.as_ref().trim().to_ascii_uppercase(),
                });
            }
            edges.push(Edge {
                to: record.to.clone(),
                distance: record.distance,
            });
            graph.towns.insert(record.from);
            graph.towns.insert(record.to);
            graph.edge_count += 1;
        }
        Ok(graph)
    }

    /// Outgoing edges of `town`, in load order. Unknown towns have none.
    pub fn neighbors_out(&self, town: &str) -> &[Edge] {
        self.outgoing.get(town).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The direct edge `from -> to`, if one was loaded.
    pub fn edge(&self, from: &str, to: &str) -> Option<&Edge> {
        self.neighbors_out(from).iter().find(|e| e.to == to)
    }

    pub fn contains(&self, town: &str) -> bool {
        self.towns.contains(town)
    }

    pub fn node_count(&self) -> usize {
        self.towns.len()
    }

    /// Towns with at least one outgoing edge.
    pub fn source_count(&self) -> usize {
        self.outgoing.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    /// Edge table sorted by source town, each list in load order.
    pub fn adjacency(&self) -> BTreeMap<&str, &[Edge]> {
        self.outgoing
            .iter()
            .map(|(from, edges)| (from.as_str(), edges.as_slice()))
            .collect()
    }

    /// All edges as flat records, sorted by source town.
    pub fn edges(&self) -> Vec<EdgeRecord> {
        self.adjacency()
            .into_iter()
            .flat_map(|(from, edges)| {
                edges.iter().map(move |e| EdgeRecord {
                    from: from.to_string(),
                    to: e.to.clone(),
                    distance: e.distance,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_token_basic() {
        let rec = parse_token("AB5").unwrap();
        assert_eq!(rec.from, "A");
        assert_eq!(rec.to, "B");
        assert_eq!(rec.distance, 5);
    }

    #[test]
    fn test_parse_token_normalizes_case_and_whitespace() {
        let rec = parse_token("  ab12 ").unwrap();
        assert_eq!((rec.from.as_str(), rec.to.as_str(), rec.distance), ("A", "B", 12));
    }

    #[test]
    fn test_parse_token_multi_letter_towns() {
        // Leftmost-first matching: the first group takes as much as it can.
        let rec = parse_token("ABCDEF50").unwrap();
        assert_eq!(rec.from, "ABCDE");
        assert_eq!(rec.to, "F");
        assert_eq!(rec.distance, 50);
    }

    #[rstest]
    #[case("A5")]
    #[case("")]
    #[case("AB")]
    #[case("AB-5")]
    #[case("A B5")]
    #[case("AB5X")]
    #[case("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAB5")]
    fn test_parse_token_malformed(#[case] token: &str) {
        assert!(matches!(parse_token(token), Err(LoadError::MalformedToken { .. })));
    }

    #[test]
    fn test_parse_token_self_loop() {
        let err = parse_token("aa3").unwrap_err();
        assert!(matches!(err, LoadError::SelfLoop { .. }));
        assert_eq!(err.token(), Some("AA3"));
    }

    #[test]
    fn test_parse_token_zero_distance() {
        assert!(matches!(
            parse_token("AB0"),
            Err(LoadError::NonPositiveDistance { .. })
        ));
        assert!(matches!(
            parse_token("AB000"),
            Err(LoadError::NonPositiveDistance { .. })
        ));
    }

    #[test]
    fn test_parse_token_wide_distance() {
        let rec = parse_token("AB5000000000").unwrap();
        assert_eq!(rec.distance, 5_000_000_000);

        let g = Graph::from_tokens(["AB5000000000", "BC1"]).unwrap();
        assert_eq!(g.edge("A", "B").map(|e| e.distance), Some(5_000_000_000));
    }

    #[test]
    fn test_parse_token_non_ascii_is_malformed() {
        // Full Unicode uppercasing would turn 'ß' into "SS".
        assert!(matches!(parse_token("ßb5"), Err(LoadError::MalformedToken { .. })));
        assert!(matches!(parse_token("Äb5"), Err(LoadError::MalformedToken { .. })));
    }

    #[test]
    fn test_parse_token_overflowing_distance() {
        assert!(matches!(
            parse_token("AB99999999999999999999"),
            Err(LoadError::DistanceOutOfRange { .. })
        ));
    }

    #[test]
    fn test_from_tokens_duplicate() {
        let err = Graph::from_tokens(["AB5", "ab7"]).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateEdge { .. }));
        assert_eq!(err.token(), Some("AB7"));
    }

    #[test]
    fn test_from_tokens_reverse_edge_is_not_duplicate() {
        let g = Graph::from_tokens(["AB5", "BA5"]).unwrap();
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn test_node_and_source_counts() {
        let g = Graph::from_tokens(["XY3", "YZ4"]).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.source_count(), 2);
    }

    #[test]
    fn test_from_tokens_empty() {
        let g = Graph::from_tokens(Vec::<String>::new()).unwrap();
        assert!(g.is_empty());
        assert_eq!(g.node_count(), 0);
    }

    #[test]
    fn test_neighbors_keep_load_order() {
        let g = Graph::from_tokens(["AC1", "AB2", "AD3"]).unwrap();
        let targets: Vec<&str> = g.neighbors_out("A").iter().map(|e| e.to.as_str()).collect();
        assert_eq!(targets, vec!["C", "B", "D"]);
        assert!(g.neighbors_out("B").is_empty());
        assert!(g.neighbors_out("ZZ").is_empty());
    }

    #[test]
    fn test_edge_lookup() {
        let g = Graph::from_tokens(["AB5", "BC4"]).unwrap();
        assert_eq!(g.edge("A", "B").map(|e| e.distance), Some(5));
        assert!(g.edge("B", "A").is_none());
        assert!(g.contains("C"));
        assert!(!g.contains("D"));
    }

    #[test]
    fn test_parse_text_lines_and_commas() {
        let tokens = parse_text("AB5, BC4\n\n  CD8,DC8  \n");
        assert_eq!(tokens, vec!["AB5", "BC4", "CD8", "DC8"]);
    }

    #[test]
    fn test_parse_text_keeps_empty_tokens() {
        let tokens = parse_text("AB5,,BC4");
        assert_eq!(tokens, vec!["AB5", "", "BC4"]);
        assert!(Graph::from_tokens(&tokens).is_err());
    }

    #[test]
    fn test_edges_sorted_by_source() {
        let g = Graph::from_tokens(["CB1", "AB2", "AC3"]).unwrap();
        let flat: Vec<(String, String)> = g.edges().into_iter().map(|r| (r.from, r.to)).collect();
        assert_eq!(
            flat,
            vec![
                ("A".to_string(), "B".to_string()),
                ("A".to_string(), "C".to_string()),
                ("C".to_string(), "B".to_string()),
            ]
        );
    }
}
