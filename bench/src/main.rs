use rail_graph_core::{GraphStore, SearchConstraints};
use std::collections::HashSet;
use std::time::Instant;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let node_count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(2_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: rail-graph-bench [mode] [node_count]");
        println!();
        println!("Modes:");
        println!("  all      Run all generators and benchmark each (default)");
        println!("  ring     Ring lattice, each town linked to its next 3 neighbors");
        println!("  random   Uniform random edges, ~3 per town");
        println!("  barbell  Two dense clusters connected by a thin bridge");
        println!();
        println!("Default node_count: 2000");
        return;
    }

    if node_count < 16 {
        eprintln!("node_count must be at least 16");
        return;
    }

    println!("rail-graph-bench");
    println!("================");
    println!();

    let generators: Vec<(&str, fn(u64) -> Vec<String>)> = match mode {
        "ring" => vec![("Ring lattice", gen_ring)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "barbell" => vec![("Barbell (cluster-bridge-cluster)", gen_barbell)],
        "all" => vec![
            ("Ring lattice", gen_ring as fn(u64) -> Vec<String>),
            ("Erdos-Renyi random", gen_random),
            ("Barbell (cluster-bridge-cluster)", gen_barbell),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in generators {
        run_benchmark(name, generator, node_count);
    }
}

fn run_benchmark(name: &str, generator: fn(u64) -> Vec<String>, node_count: u64) {
    println!("--- {} ---", name);
    println!("Target: {} towns", node_count);

    let t = Instant::now();
    let tokens = generator(node_count);
    let gen_time = t.elapsed();

    let store = GraphStore::new();
    let t = Instant::now();
    if let Err(e) = store.load_edges(&tokens) {
        eprintln!("Load failed: {}", e);
        return;
    }
    let load_time = t.elapsed();
    let snap = store.snapshot();
    println!(
        "Generated in {:.2}s, loaded in {:.1}ms: {} towns, {} edges",
        gen_time.as_secs_f64(),
        load_time.as_secs_f64() * 1000.0,
        snap.graph.node_count(),
        snap.graph.edge_count()
    );

    let start = town(0);
    let far = town(node_count / 2);

    println!();
    println!("{:>28} {:>12} {:>10}", "query", "result", "time");
    println!("{:->28} {:->12} {:->10}", "", "", "");

    for max_stops in [2u32, 4, 6] {
        let t = Instant::now();
        let count = store.count_trips_by_stops(&start, &start, 1, max_stops);
        report(&format!("trips by stops (1..={})", max_stops), count, t);
    }

    for max_distance in [20u64, 40, 60] {
        let t = Instant::now();
        let count = store.count_trips_by_distance(&start, &start, max_distance);
        report(&format!("trips by distance (<{})", max_distance), count, t);
    }

    let t = Instant::now();
    match store.shortest_path(&start, &far) {
        Ok(route) => report("shortest path (stops)", route.stops() as u64, t),
        Err(_) => report("shortest path (none)", 0, t),
    }

    let t = Instant::now();
    match store.shortest_path(&start, &start) {
        Ok(route) => report("shortest cycle (distance)", route.distance, t),
        Err(_) => report("shortest cycle (none)", 0, t),
    }

    for (label, constraints) in [
        (
            "search stops<=5",
            SearchConstraints {
                max_stops: 5,
                ..Default::default()
            },
        ),
        (
            "search stops<=6 distinct",
            SearchConstraints {
                max_stops: 6,
                distinct_nodes: true,
                ..Default::default()
            },
        ),
    ] {
        let t = Instant::now();
        let routes = store.search_routes(&start, &start, &constraints, 10);
        report(label, routes.len() as u64, t);
    }

    println!();
}

fn report(label: &str, value: u64, started: Instant) {
    println!(
        "{:>28} {:>12} {:>8.1}ms",
        label,
        value,
        started.elapsed().as_secs_f64() * 1000.0
    );
}

// ---------------------------------------------------------------------------
// Generators: deterministic, emit edge tokens for GraphStore::load_edges
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
}

/// Town name for an index: 16 letters, base-26 with 'A' padding.
///
/// Full-width names keep `<FROM><TO><DISTANCE>` unambiguous, since the token
/// grammar gives the first name as many letters as it can take.
fn town(mut index: u64) -> String {
    let mut letters = [b'A'; 16];
    for slot in letters.iter_mut().rev() {
        *slot = b'A' + (index % 26) as u8;
        index /= 26;
    }
    letters.iter().map(|&b| b as char).collect()
}

struct TokenSink {
    tokens: Vec<String>,
    seen: HashSet<(u64, u64)>,
}

impl TokenSink {
    fn with_capacity(edges: usize) -> Self {
        Self {
            tokens: Vec::with_capacity(edges),
            seen: HashSet::with_capacity(edges),
        }
    }

    /// Add `from -> to` unless it is a self-loop or already present.
    fn add(&mut self, from: u64, to: u64, distance: u64) {
        if from != to && self.seen.insert((from, to)) {
            self.tokens.push(format!("{}{}{}", town(from), town(to), distance));
        }
    }
}

/// Ring lattice: each town reaches its next 3 neighbors. Every town lies on
/// many short cycles, which is the worst case for trip enumeration.
fn gen_ring(node_count: u64) -> Vec<String> {
    let k = 3u64;
    let mut sink = TokenSink::with_capacity((node_count * k) as usize);
    let mut rng = FastRng::new(67890);

    for i in 0..node_count {
        for j in 1..=k {
            sink.add(i, (i + j) % node_count, 1 + rng.next(20));
        }
    }
    // Back edges so cycles exist within small stop counts.
    for i in 0..node_count {
        sink.add(i, (i + node_count - 2) % node_count, 1 + rng.next(20));
    }

    sink.tokens
}

/// Erdos-Renyi: uniform random edges, ~3 per town. Baseline topology.
fn gen_random(node_count: u64) -> Vec<String> {
    let target_edges = node_count * 3;
    let mut sink = TokenSink::with_capacity(target_edges as usize);
    let mut rng = FastRng::new(54321);

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        sink.add(from, to, 1 + rng.next(20));
    }

    sink.tokens
}

/// Barbell: two dense clusters joined by a one-way chain of bridge towns.
///
/// Worst case for shortest path through a bottleneck.
fn gen_barbell(node_count: u64) -> Vec<String> {
    let bridge_len = 10u64;
    let cluster_size = (node_count - bridge_len) / 2;
    let mut sink = TokenSink::with_capacity((cluster_size * 8 + bridge_len) as usize);
    let mut rng = FastRng::new(99999);

    let b_start = cluster_size + bridge_len;
    for base in [0, b_start] {
        for i in 0..cluster_size {
            for _ in 0..4u64.min(cluster_size - 1) {
                let target = rng.next(cluster_size);
                sink.add(base + i, base + target, 1 + rng.next(20));
            }
        }
    }

    // Bridge: last town of the first cluster, through the chain, into the second.
    let mut prev = cluster_size.saturating_sub(1);
    for id in cluster_size..=b_start {
        sink.add(prev, id, 1 + rng.next(20));
        prev = id;
    }

    sink.tokens
}
