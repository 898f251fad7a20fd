use crate::{Network, NodeId};
use petgraph::algo::connected_components;
use serde::Serialize;
use std::collections::VecDeque;

/// Summary statistics (density/degree/connected components).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
}

/// One connected island of the network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IslandSummary {
    pub island_id: usize,
    pub node_count: usize,
    /// Whether the island contains at least one substation
    pub has_substation: bool,
}

/// Island membership of a single node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeAssignment {
    pub node_index: usize,
    pub node: NodeId,
    pub island_id: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IslandAnalysis {
    pub islands: Vec<IslandSummary>,
    pub assignments: Vec<NodeAssignment>,
}

impl IslandAnalysis {
    pub fn count(&self) -> usize {
        self.islands.len()
    }

    /// Exactly one island. An empty network is not connected.
    pub fn is_connected(&self) -> bool {
        self.islands.len() == 1
    }

    pub fn island_of(&self, node: &str) -> Option<usize> {
        self.assignments
            .iter()
            .find(|a| a.node.as_str() == node)
            .map(|a| a.island_id)
    }
}

/// Graph-level statistics. Degrees count parallel lines separately; density
/// is `2E / (N(N-1))` and can exceed 1 on multigraphs.
pub fn graph_stats(network: &Network) -> GraphStats {
    let graph = network.graph();
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    let degrees: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.edges(node).count())
        .collect();
    let min_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / node_count as f64
    };
    let density = if node_count < 2 {
        0.0
    } else {
        2.0 * edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };
    GraphStats {
        node_count,
        edge_count,
        connected_components: connected_components(graph),
        min_degree,
        avg_degree,
        max_degree,
        density,
    }
}

/// Labels connected components with a breadth-first traversal. Island ids
/// follow the insertion order of each island's first node.
pub fn find_islands(network: &Network) -> IslandAnalysis {
    let graph = network.graph();
    let mut visited = vec![false; graph.node_count()];
    let mut islands = Vec::new();
    let mut assignments = Vec::with_capacity(graph.node_count());

    for start in graph.node_indices() {
        if visited[start.index()] {
            continue;
        }
        let island_id = islands.len();
        let mut queue = VecDeque::from([start]);
        visited[start.index()] = true;
        let mut node_count = 0;
        let mut has_substation = false;

        while let Some(node) = queue.pop_front() {
            node_count += 1;
            has_substation |= graph[node].role == crate::NodeRole::Substation;
            assignments.push(NodeAssignment {
                node_index: node.index(),
                node: graph[node].id.clone(),
                island_id,
            });
            for neighbor in graph.neighbors(node) {
                if !visited[neighbor.index()] {
                    visited[neighbor.index()] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        islands.push(IslandSummary {
            island_id,
            node_count,
            has_substation,
        });
    }

    assignments.sort_by_key(|assignment| assignment.node_index);
    IslandAnalysis {
        islands,
        assignments,
    }
}
