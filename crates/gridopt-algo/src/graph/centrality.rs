//! Betweenness centrality (Brandes) and clustering coefficients.
//!
//! Both measures work on the *simple* projection of the network: parallel
//! lines collapse into one adjacency, keeping the shortest length when
//! shortest paths are weighted by length. Shortest-path counts therefore do
//! not multiply with the number of parallel lines.
//!
//! Betweenness is reported as raw pair dependency: for every unordered pair
//! `{s, t}`, each node strictly between them receives the fraction of
//! shortest `s`-`t` paths through it. [`Betweenness::normalized`] divides by
//! `(n-1)(n-2)/2` as an optional post-step.

use gridopt_core::{GridError, GridResult, Network, NodeId};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

/// How shortest paths are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentralityWeight {
    /// Every line counts as one hop (BFS)
    #[default]
    Hops,
    /// Line length in km (Dijkstra)
    Length,
}

/// Betweenness score per node, ordered by node identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Betweenness {
    scores: BTreeMap<NodeId, f64>,
    normalized: bool,
}

impl Betweenness {
    pub fn get(&self, node: &str) -> Option<f64> {
        self.scores.get(node).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, f64)> {
        self.scores.iter().map(|(id, score)| (id, *score))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Scores divided by the number of pairs not involving the node.
    /// Networks with fewer than three nodes are returned unscaled.
    pub fn normalized(&self) -> Betweenness {
        if self.normalized {
            return self.clone();
        }
        let n = self.scores.len() as f64;
        let scale = if n > 2.0 {
            2.0 / ((n - 1.0) * (n - 2.0))
        } else {
            1.0
        };
        Betweenness {
            scores: self
                .scores
                .iter()
                .map(|(id, score)| (id.clone(), score * scale))
                .collect(),
            normalized: true,
        }
    }

    /// Node with the highest score; ties go to the lowest identifier.
    pub fn most_critical(&self) -> GridResult<(&NodeId, f64)> {
        let mut best: Option<(&NodeId, f64)> = None;
        for (id, score) in self.iter() {
            match best {
                Some((_, top)) if score <= top + SCORE_TOLERANCE * top.abs().max(1.0) => {}
                _ => best = Some((id, score)),
            }
        }
        best.ok_or(GridError::EmptyGraph(
            "most critical node is undefined without nodes",
        ))
    }
}

const SCORE_TOLERANCE: f64 = 1e-12;

/// Distinct neighbors per node index, sorted, with the shortest parallel length.
fn simple_adjacency(network: &Network, weight: CentralityWeight) -> Vec<Vec<(usize, f64)>> {
    let graph = network.graph();
    let mut adjacency: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); graph.node_count()];
    for edge in graph.edge_references() {
        let (a, b) = (edge.source().index(), edge.target().index());
        let w = match weight {
            CentralityWeight::Hops => 1.0,
            CentralityWeight::Length => edge.weight().length.value(),
        };
        for (from, to) in [(a, b), (b, a)] {
            adjacency[from]
                .entry(to)
                .and_modify(|current| *current = current.min(w))
                .or_insert(w);
        }
    }
    adjacency
        .into_iter()
        .map(|neighbors| neighbors.into_iter().collect())
        .collect()
}

/// Shortest-path DAG from one source: visit order, predecessors, path counts.
struct ShortestPaths {
    order: Vec<usize>,
    predecessors: Vec<Vec<usize>>,
    sigma: Vec<f64>,
}

fn bfs_paths(adjacency: &[Vec<(usize, f64)>], source: usize) -> ShortestPaths {
    let n = adjacency.len();
    let mut order = Vec::with_capacity(n);
    let mut predecessors = vec![Vec::new(); n];
    let mut sigma = vec![0.0; n];
    let mut hops: Vec<Option<usize>> = vec![None; n];

    sigma[source] = 1.0;
    hops[source] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        order.push(v);
        let next = hops[v].map_or(0, |h| h + 1);
        for &(w, _) in &adjacency[v] {
            if hops[w].is_none() {
                hops[w] = Some(next);
                queue.push_back(w);
            }
            if hops[w] == Some(next) {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }
    ShortestPaths {
        order,
        predecessors,
        sigma,
    }
}

#[derive(Debug, Clone, Copy)]
struct Tentative {
    dist: f64,
    node: usize,
}

impl PartialEq for Tentative {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Tentative {}

impl PartialOrd for Tentative {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tentative {
    // Reversed: BinaryHeap pops the smallest distance, then lowest index
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then(other.node.cmp(&self.node))
    }
}

fn dijkstra_paths(adjacency: &[Vec<(usize, f64)>], source: usize) -> ShortestPaths {
    let n = adjacency.len();
    let mut order = Vec::with_capacity(n);
    let mut predecessors = vec![Vec::new(); n];
    let mut sigma = vec![0.0; n];
    let mut dist = vec![f64::INFINITY; n];
    let mut settled = vec![false; n];

    sigma[source] = 1.0;
    dist[source] = 0.0;
    let mut heap = BinaryHeap::from([Tentative {
        dist: 0.0,
        node: source,
    }]);
    while let Some(Tentative { dist: d, node: v }) = heap.pop() {
        if settled[v] {
            continue;
        }
        settled[v] = true;
        order.push(v);
        for &(w, len) in &adjacency[v] {
            if settled[w] {
                continue;
            }
            let candidate = d + len;
            if candidate < dist[w] {
                dist[w] = candidate;
                sigma[w] = sigma[v];
                predecessors[w] = vec![v];
                heap.push(Tentative {
                    dist: candidate,
                    node: w,
                });
            } else if candidate == dist[w] {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }
    ShortestPaths {
        order,
        predecessors,
        sigma,
    }
}

/// Brandes' betweenness centrality. O(VE) for hops, O(VE log V) for lengths.
pub fn betweenness_centrality(network: &Network, weight: CentralityWeight) -> Betweenness {
    let adjacency = simple_adjacency(network, weight);
    let n = adjacency.len();
    let mut centrality = vec![0.0; n];

    for source in 0..n {
        let paths = match weight {
            CentralityWeight::Hops => bfs_paths(&adjacency, source),
            CentralityWeight::Length => dijkstra_paths(&adjacency, source),
        };
        let mut delta = vec![0.0; n];
        for &w in paths.order.iter().rev() {
            for &v in &paths.predecessors[w] {
                delta[v] += paths.sigma[v] / paths.sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                centrality[w] += delta[w];
            }
        }
    }

    let graph = network.graph();
    Betweenness {
        // Each unordered pair was accumulated once from each endpoint
        scores: graph
            .node_indices()
            .map(|idx| (graph[idx].id.clone(), centrality[idx.index()] / 2.0))
            .collect(),
        normalized: false,
    }
}

/// Local clustering coefficient per node. Nodes with fewer than two distinct
/// neighbors get 0.
pub fn clustering_coefficients(network: &Network) -> BTreeMap<NodeId, f64> {
    let adjacency = simple_adjacency(network, CentralityWeight::Hops);
    let graph = network.graph();
    graph
        .node_indices()
        .map(|idx| {
            let neighbors = &adjacency[idx.index()];
            let k = neighbors.len();
            let coefficient = if k < 2 {
                0.0
            } else {
                let mut links = 0usize;
                for (i, &(u, _)) in neighbors.iter().enumerate() {
                    for &(w, _) in &neighbors[i + 1..] {
                        if adjacency[u].binary_search_by_key(&w, |&(x, _)| x).is_ok() {
                            links += 1;
                        }
                    }
                }
                2.0 * links as f64 / (k * (k - 1)) as f64
            };
            (graph[idx].id.clone(), coefficient)
        })
        .collect()
}

/// Mean clustering coefficient over *all* nodes, degree < 2 counting as 0.
pub fn average_clustering(network: &Network) -> GridResult<f64> {
    if network.is_empty() {
        return Err(GridError::EmptyGraph(
            "average clustering is undefined without nodes",
        ));
    }
    let coefficients = clustering_coefficients(network);
    Ok(coefficients.values().sum::<f64>() / coefficients.len() as f64)
}

/// Sum of node degrees over node count, i.e. `2E / N`.
pub fn average_degree(network: &Network) -> GridResult<f64> {
    if network.is_empty() {
        return Err(GridError::EmptyGraph(
            "average degree is undefined without nodes",
        ));
    }
    let graph = network.graph();
    let total: usize = graph
        .node_indices()
        .map(|idx| graph.edges(idx).count())
        .sum();
    Ok(total as f64 / graph.node_count() as f64)
}
