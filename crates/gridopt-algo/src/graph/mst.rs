//! Minimum-length spanning sub-network.
//!
//! Lines are weighted by `length`. Ties are broken by [`LineId`], i.e. by the
//! order lines were added, which makes the edge order total: the minimum
//! spanning forest is then unique and Kruskal and Prim select the same lines.
//!
//! A disconnected network yields a spanning *forest* with
//! `|V| - components` lines. That outcome is reported through
//! [`MstSummary::is_spanning_tree`] and [`MstSummary::components`], never
//! folded into a plain success.

use super::union_find::UnionFind;
use gridopt_core::{GridError, GridResult, Kilometers, LineId, Network, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{info, warn};

/// Spanning tree construction method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MstMethod {
    /// Sort all lines, merge components with union-find. O(E log E).
    #[default]
    Kruskal,
    /// Grow each component from its lowest-index node with a heap. O(E log E).
    Prim,
}

/// Metrics of a spanning tree run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MstSummary {
    pub method: MstMethod,
    /// Selected lines in the order the method picked them
    pub lines: Vec<LineId>,
    pub original_length: Kilometers,
    pub optimized_length: Kilometers,
    /// `(original - optimized) / original * 100`; 0 when every line has zero length
    pub reduction_percent: f64,
    /// Connected components of the source network (trees in the forest)
    pub components: usize,
    pub is_spanning_tree: bool,
}

/// The derived sub-network plus its metrics.
#[derive(Debug, Clone)]
pub struct SpanningForest {
    /// Every node of the source network, only the selected lines
    pub network: Network,
    pub summary: MstSummary,
}

impl SpanningForest {
    /// True when the source network was disconnected.
    pub fn is_forest(&self) -> bool {
        !self.summary.is_spanning_tree
    }
}

/// Compute the minimum-length spanning tree (or forest) of `network`.
///
/// Fails with [`GridError::EmptyGraph`] when the network has no lines, since
/// the length reduction is undefined.
pub fn minimum_spanning_tree(network: &Network, method: MstMethod) -> GridResult<SpanningForest> {
    if network.line_count() == 0 {
        return Err(GridError::EmptyGraph(
            "spanning tree requires at least one line",
        ));
    }

    let lines = match method {
        MstMethod::Kruskal => kruskal(network),
        MstMethod::Prim => prim(network),
    };
    let components = network.node_count() - lines.len();
    let sub = network.sub_network(lines.iter().copied())?;

    let original_length = network.total_length();
    let optimized_length = sub.total_length();
    let reduction_percent = if original_length.value() > 0.0 {
        (original_length - optimized_length) / original_length * 100.0
    } else {
        0.0
    };

    if components > 1 {
        warn!(
            components,
            "network is disconnected; result is a spanning forest"
        );
    }
    info!(
        ?method,
        lines = lines.len(),
        original_km = original_length.value(),
        optimized_km = optimized_length.value(),
        reduction_percent,
        "spanning tree computed"
    );

    Ok(SpanningForest {
        network: sub,
        summary: MstSummary {
            method,
            lines,
            original_length,
            optimized_length,
            reduction_percent,
            components,
            is_spanning_tree: components == 1,
        },
    })
}

fn compare_lines(a: (Kilometers, LineId), b: (Kilometers, LineId)) -> Ordering {
    a.0.value().total_cmp(&b.0.value()).then(a.1.cmp(&b.1))
}

fn kruskal(network: &Network) -> Vec<LineId> {
    let graph = network.graph();
    let mut edges: Vec<_> = graph.edge_references().collect();
    edges.sort_by(|a, b| {
        compare_lines(
            (a.weight().length, a.weight().id),
            (b.weight().length, b.weight().id),
        )
    });

    let target = graph.node_count().saturating_sub(1);
    let mut sets = UnionFind::new(graph.node_count());
    let mut chosen = Vec::with_capacity(target);
    for edge in edges {
        if chosen.len() == target {
            break;
        }
        if sets.union(edge.source().index(), edge.target().index()) {
            chosen.push(edge.weight().id);
        }
    }
    chosen
}

/// Heap entry ordered so that `BinaryHeap` pops the shortest line first.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    length: Kilometers,
    id: LineId,
    node: NodeIndex,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_lines((other.length, other.id), (self.length, self.id))
    }
}

fn prim(network: &Network) -> Vec<LineId> {
    let graph = network.graph();
    let mut visited = vec![false; graph.node_count()];
    let mut chosen = Vec::with_capacity(graph.node_count().saturating_sub(1));
    let mut heap = BinaryHeap::new();

    let push_incident = |heap: &mut BinaryHeap<Frontier>, visited: &[bool], node: NodeIndex| {
        for edge in graph.edges(node) {
            let other = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            if !visited[other.index()] {
                heap.push(Frontier {
                    length: edge.weight().length,
                    id: edge.weight().id,
                    node: other,
                });
            }
        }
    };

    for start in graph.node_indices() {
        if visited[start.index()] {
            continue;
        }
        visited[start.index()] = true;
        push_incident(&mut heap, visited.as_slice(), start);

        while let Some(Frontier { id, node, .. }) = heap.pop() {
            if visited[node.index()] {
                continue;
            }
            visited[node.index()] = true;
            chosen.push(id);
            push_incident(&mut heap, visited.as_slice(), node);
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridopt_core::{NodeRole, Ohms};

    fn cycle(lengths: [f64; 4]) -> Network {
        let mut network = Network::new();
        for id in ["A", "B", "C", "D"] {
            network.add_node(id, NodeRole::Junction, 0.0).unwrap();
        }
        let pairs = [("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")];
        for ((a, b), len) in pairs.into_iter().zip(lengths) {
            network
                .add_line(a, b, Ohms(0.1), 10.0, Kilometers(len))
                .unwrap();
        }
        network
    }

    #[test]
    fn test_four_cycle_drops_longest_line() {
        let network = cycle([1.0, 2.0, 3.0, 4.0]);
        let forest = minimum_spanning_tree(&network, MstMethod::Kruskal).unwrap();

        assert_eq!(forest.summary.lines.len(), 3);
        assert_eq!(forest.summary.original_length, Kilometers(10.0));
        assert_eq!(forest.summary.optimized_length, Kilometers(6.0));
        assert!((forest.summary.reduction_percent - 40.0).abs() < 1e-12);
        assert!(forest.summary.is_spanning_tree);
        assert!(!forest
            .network
            .lines()
            .any(|line| line.connects("D", "A")));
        // Input is untouched
        assert_eq!(network.line_count(), 4);
    }

    #[test]
    fn test_ties_follow_insertion_order() {
        let network = cycle([1.0, 1.0, 1.0, 1.0]);
        let forest = minimum_spanning_tree(&network, MstMethod::Kruskal).unwrap();
        assert_eq!(
            forest.summary.lines,
            vec![LineId::new(0), LineId::new(1), LineId::new(2)]
        );
    }

    #[test]
    fn test_prim_matches_kruskal() {
        let network = cycle([2.0, 2.0, 1.0, 3.0]);
        let mut kruskal = minimum_spanning_tree(&network, MstMethod::Kruskal)
            .unwrap()
            .summary
            .lines;
        let mut prim = minimum_spanning_tree(&network, MstMethod::Prim)
            .unwrap()
            .summary
            .lines;
        kruskal.sort();
        prim.sort();
        assert_eq!(kruskal, prim);
    }

    #[test]
    fn test_no_lines_is_empty_graph() {
        let mut network = Network::new();
        network.add_node("A", NodeRole::Junction, 0.0).unwrap();
        assert!(matches!(
            minimum_spanning_tree(&network, MstMethod::Kruskal),
            Err(GridError::EmptyGraph(_))
        ));
    }

    #[test]
    fn test_zero_length_lines_report_zero_reduction() {
        let network = cycle([0.0, 0.0, 0.0, 0.0]);
        let forest = minimum_spanning_tree(&network, MstMethod::Prim).unwrap();
        assert_eq!(forest.summary.reduction_percent, 0.0);
        assert_eq!(forest.summary.lines.len(), 3);
    }
}
