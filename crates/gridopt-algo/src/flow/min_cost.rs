//! Successive shortest augmenting paths with node potentials.
//!
//! # Model
//!
//! Every line `u - v` becomes two directed arcs `u -> v` and `v -> u`, each
//! with the line's full capacity and a unit cost equal to its resistance.
//! This is a modeling choice for distribution feeders whose flow direction is
//! not fixed in advance; it is not a property of flow networks in general.
//!
//! A super source feeds every node with negative demand (up to its supply)
//! and every node with positive demand drains into a super sink. Each round
//! finds the cheapest source-sink path under reduced costs and pushes the
//! bottleneck amount along it. Potentials start from Bellman-Ford and are
//! then maintained by Dijkstra, so reduced costs stay non-negative.
//!
//! # Failure policy
//!
//! - [`GridError::UnbalancedDemand`] if signed demands do not sum to zero;
//!   checked before any arc is built
//! - [`GridError::InfeasibleFlow`] when the sink becomes unreachable with
//!   demand left over
//! - [`GridError::IterationLimitExceeded`] after `max_iterations` paths
//!
//! A partial flow is never returned: routing stops only once the unmet
//! demand is within the absolute `tolerance`, whatever the demand scale.
//!
//! # Tolerance
//!
//! A node whose demand magnitude is at or below `tolerance` is treated as a
//! transshipment node. The same threshold closes residual arcs, so such a
//! demand could never be routed anyway.

use super::assignment::{ArcFlow, FlowAssignment};
use super::residual::ResidualGraph;
use crate::config::FlowConfig;
use gridopt_core::{GridError, GridResult, Network};
use petgraph::visit::EdgeRef;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, info};

/// Compute a minimum-cost flow meeting every node's signed demand.
pub fn min_cost_flow(network: &Network, config: &FlowConfig) -> GridResult<FlowAssignment> {
    let tolerance = config.tolerance;
    check_balance(network, tolerance)?;

    let graph = network.graph();
    let n = graph.node_count();
    let (source, sink) = (n, n + 1);
    let mut residual = ResidualGraph::new(n + 2);

    let mut line_arcs = Vec::with_capacity(graph.edge_count());
    for edge in graph.edge_references() {
        let line = edge.weight();
        let (a, b) = (edge.source().index(), edge.target().index());
        let cost = line.resistance.value();
        let forward = residual.add_arc(a, b, line.capacity, cost);
        let backward = residual.add_arc(b, a, line.capacity, cost);
        line_arcs.push((line, forward, backward));
    }

    let mut required = 0.0;
    for idx in graph.node_indices() {
        let demand = graph[idx].demand;
        if demand < -tolerance {
            residual.add_arc(source, idx.index(), -demand, 0.0);
        } else if demand > tolerance {
            residual.add_arc(idx.index(), sink, demand, 0.0);
            required += demand;
        }
    }

    let mut potential = bellman_ford(&residual, source, tolerance);
    let mut sent = 0.0;
    let mut iterations = 0;

    while required - sent > tolerance {
        if iterations >= config.max_iterations {
            return Err(GridError::IterationLimitExceeded { iterations });
        }

        let (dist, parent) = dijkstra(&residual, source, &potential, tolerance);
        if !dist[sink].is_finite() {
            return Err(GridError::InfeasibleFlow {
                unmet: required - sent,
            });
        }
        for (h, d) in potential.iter_mut().zip(&dist) {
            if d.is_finite() {
                *h += d;
            }
        }

        let mut path = Vec::new();
        let mut node = sink;
        while let Some(arc) = parent[node] {
            path.push(arc);
            node = residual.tail(arc);
        }
        let amount = path
            .iter()
            .map(|&arc| residual.arcs[arc].residual())
            .fold(required - sent, f64::min);
        for &arc in &path {
            residual.push(arc, amount);
        }

        sent += amount;
        iterations += 1;
        debug!(
            iteration = iterations,
            amount,
            unit_cost = potential[sink] - potential[source],
            hops = path.len(),
            "augmenting path"
        );
    }

    let mut arcs = Vec::new();
    let mut total_cost = 0.0;
    for (line, forward, backward) in line_arcs {
        // Opposite arcs on one line cancel; with non-negative costs this never raises cost
        let net = residual.arcs[forward].flow - residual.arcs[backward].flow;
        if net.abs() <= tolerance {
            continue;
        }
        let (from, to) = if net > 0.0 {
            (line.from.clone(), line.to.clone())
        } else {
            (line.to.clone(), line.from.clone())
        };
        let flow = ArcFlow {
            line: line.id,
            from,
            to,
            flow: net.abs(),
            unit_cost: line.resistance,
        };
        total_cost += flow.cost();
        arcs.push(flow);
    }

    info!(
        routed = sent,
        lines = arcs.len(),
        total_cost,
        iterations,
        "min-cost flow solved"
    );
    Ok(FlowAssignment {
        arcs,
        total_cost,
        iterations,
    })
}

fn check_balance(network: &Network, tolerance: f64) -> GridResult<()> {
    let total = network.demand_balance();
    let scale: f64 = network.nodes().map(|node| node.demand.abs()).sum();
    if total.abs() > tolerance * scale.max(1.0) {
        return Err(GridError::UnbalancedDemand { total });
    }
    Ok(())
}

/// Shortest distances from `source` over open arcs. Unreachable nodes get 0,
/// which is safe because no open arc ever leads into them.
fn bellman_ford(residual: &ResidualGraph, source: usize, tolerance: f64) -> Vec<f64> {
    let n = residual.node_count();
    let mut dist = vec![f64::INFINITY; n];
    dist[source] = 0.0;

    for _ in 1..n {
        let mut changed = false;
        for u in 0..n {
            if !dist[u].is_finite() {
                continue;
            }
            for arc in residual.open_arcs(u, tolerance) {
                let a = &residual.arcs[arc];
                let candidate = dist[u] + a.cost;
                if candidate < dist[a.to] {
                    dist[a.to] = candidate;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    dist.into_iter()
        .map(|d| if d.is_finite() { d } else { 0.0 })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Label {
    dist: f64,
    node: usize,
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Label {}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then(other.node.cmp(&self.node))
    }
}

/// Dijkstra on reduced costs. Returns distances (infinite when unreachable)
/// and the arc used to reach each node.
fn dijkstra(
    residual: &ResidualGraph,
    source: usize,
    potential: &[f64],
    tolerance: f64,
) -> (Vec<f64>, Vec<Option<usize>>) {
    let n = residual.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut parent = vec![None; n];
    let mut settled = vec![false; n];

    dist[source] = 0.0;
    let mut heap = BinaryHeap::from([Label {
        dist: 0.0,
        node: source,
    }]);
    while let Some(Label { dist: d, node: u }) = heap.pop() {
        if settled[u] {
            continue;
        }
        settled[u] = true;
        for arc in residual.open_arcs(u, tolerance) {
            let a = &residual.arcs[arc];
            if settled[a.to] {
                continue;
            }
            // Rounding can push a reduced cost slightly below zero
            let reduced = (a.cost + potential[u] - potential[a.to]).max(0.0);
            let candidate = d + reduced;
            if candidate < dist[a.to] {
                dist[a.to] = candidate;
                parent[a.to] = Some(arc);
                heap.push(Label {
                    dist: candidate,
                    node: a.to,
                });
            }
        }
    }
    (dist, parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridopt_core::{Kilometers, NodeRole, Ohms};

    fn node(network: &mut Network, id: &str, demand: f64) {
        let role = match demand {
            d if d < 0.0 => NodeRole::Substation,
            d if d > 0.0 => NodeRole::Consumer,
            _ => NodeRole::Junction,
        };
        network.add_node(id, role, demand).unwrap();
    }

    fn line(network: &mut Network, a: &str, b: &str, r: f64, cap: f64) {
        network
            .add_line(a, b, Ohms(r), cap, Kilometers(1.0))
            .unwrap();
    }

    fn assert_conserved(network: &Network, flows: &FlowAssignment) {
        for n in network.nodes() {
            assert!(
                (flows.net_inflow(n.id.as_str()) - n.demand).abs() < 1e-6,
                "conservation violated at {}",
                n.id
            );
        }
        for arc in &flows.arcs {
            let capacity = network.line(arc.line).unwrap().capacity;
            assert!(arc.flow <= capacity + 1e-9);
        }
    }

    #[test]
    fn test_cheaper_detour_is_preferred() {
        let mut network = Network::new();
        node(&mut network, "S", -10.0);
        node(&mut network, "J", 0.0);
        node(&mut network, "C", 10.0);
        line(&mut network, "S", "J", 1.0, 100.0);
        line(&mut network, "J", "C", 1.0, 100.0);
        line(&mut network, "S", "C", 3.0, 100.0);

        let flows = min_cost_flow(&network, &FlowConfig::default()).unwrap();
        assert!((flows.total_cost - 20.0).abs() < 1e-9);
        assert_eq!(flows.flow_on("S", "C"), 0.0);
        assert_eq!(flows.flow_on("S", "J"), 10.0);
        assert_conserved(&network, &flows);
    }

    #[test]
    fn test_parallel_lines_fill_cheapest_first() {
        let mut network = Network::new();
        node(&mut network, "S", -10.0);
        node(&mut network, "C", 10.0);
        line(&mut network, "S", "C", 2.0, 10.0);
        line(&mut network, "S", "C", 1.0, 6.0);

        let flows = min_cost_flow(&network, &FlowConfig::default()).unwrap();
        assert!((flows.total_cost - 14.0).abs() < 1e-9);
        assert_eq!(flows.arcs.len(), 2);
        assert_eq!(flows.iterations, 2);
        assert_conserved(&network, &flows);
    }

    #[test]
    fn test_flow_can_run_against_line_orientation() {
        let mut network = Network::new();
        node(&mut network, "C", 4.0);
        node(&mut network, "S", -4.0);
        line(&mut network, "C", "S", 0.5, 10.0);

        let flows = min_cost_flow(&network, &FlowConfig::default()).unwrap();
        assert_eq!(flows.arcs[0].from.as_str(), "S");
        assert_eq!(flows.arcs[0].to.as_str(), "C");
        assert!((flows.total_cost - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_sources_and_sinks() {
        let mut network = Network::new();
        node(&mut network, "S1", -6.0);
        node(&mut network, "S2", -4.0);
        node(&mut network, "A", 5.0);
        node(&mut network, "B", 5.0);
        line(&mut network, "S1", "A", 1.0, 10.0);
        line(&mut network, "A", "B", 1.0, 10.0);
        line(&mut network, "S2", "B", 1.0, 10.0);

        let flows = min_cost_flow(&network, &FlowConfig::default()).unwrap();
        // S1 -> A (6), A -> B (1), S2 -> B (4)
        assert!((flows.total_cost - 11.0).abs() < 1e-9);
        assert_conserved(&network, &flows);
    }

    #[test]
    fn test_infinite_capacity_lines() {
        let mut network = Network::new();
        node(&mut network, "S", -1e6);
        node(&mut network, "C", 1e6);
        line(&mut network, "S", "C", 0.1, f64::INFINITY);

        let flows = min_cost_flow(&network, &FlowConfig::default()).unwrap();
        assert_eq!(flows.flow_on("S", "C"), 1e6);
    }

    #[test]
    fn test_unbalanced_demand_rejected() {
        let mut network = Network::new();
        node(&mut network, "S", -10.0);
        node(&mut network, "C", 12.0);
        line(&mut network, "S", "C", 1.0, 100.0);

        let err = min_cost_flow(&network, &FlowConfig::default()).unwrap_err();
        assert!(matches!(err, GridError::UnbalancedDemand { total } if (total - 2.0).abs() < 1e-12));
    }

    #[test]
    fn test_insufficient_capacity_is_infeasible() {
        let mut network = Network::new();
        node(&mut network, "S", -10.0);
        node(&mut network, "C", 10.0);
        line(&mut network, "S", "C", 1.0, 4.0);

        let err = min_cost_flow(&network, &FlowConfig::default()).unwrap_err();
        assert!(matches!(err, GridError::InfeasibleFlow { unmet } if (unmet - 6.0).abs() < 1e-9));
    }

    #[test]
    fn test_disconnected_demand_is_infeasible() {
        let mut network = Network::new();
        node(&mut network, "S", -5.0);
        node(&mut network, "C", 5.0);
        let err = min_cost_flow(&network, &FlowConfig::default()).unwrap_err();
        assert!(matches!(err, GridError::InfeasibleFlow { .. }));
    }

    #[test]
    fn test_iteration_cap() {
        let mut network = Network::new();
        node(&mut network, "S", -10.0);
        node(&mut network, "C", 10.0);
        line(&mut network, "S", "C", 2.0, 10.0);
        line(&mut network, "S", "C", 1.0, 6.0);

        let config = FlowConfig {
            max_iterations: 1,
            ..FlowConfig::default()
        };
        let err = min_cost_flow(&network, &config).unwrap_err();
        assert!(matches!(err, GridError::IterationLimitExceeded { iterations: 1 }));
    }

    #[test]
    fn test_no_demand_yields_empty_assignment() {
        let mut network = Network::new();
        node(&mut network, "A", 0.0);
        node(&mut network, "B", 0.0);
        line(&mut network, "A", "B", 1.0, 1.0);

        let flows = min_cost_flow(&network, &FlowConfig::default()).unwrap();
        assert!(flows.is_empty());
        assert_eq!(flows.total_cost, 0.0);
        assert_eq!(flows.iterations, 0);
    }
}
