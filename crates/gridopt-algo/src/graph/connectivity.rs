//! Connectivity and vulnerability indicators bundled into one report.

use super::centrality::{
    average_clustering, average_degree, betweenness_centrality, Betweenness,
};
use crate::config::CentralityConfig;
use gridopt_core::{find_islands, graph_stats, GraphStats, GridError, GridResult, Network, NodeId};
use serde::Serialize;
use tracing::info;

/// Number of connected components (BFS over every node).
pub fn component_count(network: &Network) -> usize {
    find_islands(network).count()
}

/// True iff the network has exactly one component.
pub fn is_connected(network: &Network) -> bool {
    component_count(network) == 1
}

/// Topology and criticality metrics for one network.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectivityReport {
    pub is_connected: bool,
    pub components: usize,
    pub most_critical_node: NodeId,
    pub most_critical_score: f64,
    pub average_clustering: f64,
    pub average_degree: f64,
    pub betweenness: Betweenness,
    pub stats: GraphStats,
}

/// Run every connectivity metric. Fails with [`GridError::EmptyGraph`] on a
/// network without nodes.
pub fn analyze_connectivity(
    network: &Network,
    config: &CentralityConfig,
) -> GridResult<ConnectivityReport> {
    if network.is_empty() {
        return Err(GridError::EmptyGraph(
            "connectivity analysis requires at least one node",
        ));
    }

    let raw = betweenness_centrality(network, config.weight);
    let betweenness = if config.normalized {
        raw.normalized()
    } else {
        raw
    };
    let (critical, score) = betweenness.most_critical()?;
    let most_critical_node = critical.clone();

    let components = component_count(network);
    let report = ConnectivityReport {
        is_connected: components == 1,
        components,
        most_critical_node,
        most_critical_score: score,
        average_clustering: average_clustering(network)?,
        average_degree: average_degree(network)?,
        betweenness,
        stats: graph_stats(network),
    };

    info!(
        components = report.components,
        critical = %report.most_critical_node,
        score = report.most_critical_score,
        clustering = report.average_clustering,
        degree = report.average_degree,
        "Connectivity analysis complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::centrality::CentralityWeight;
    use gridopt_core::{Kilometers, NodeRole, Ohms};

    fn two_feeders() -> Network {
        let mut network = Network::new();
        for id in ["A", "B", "C", "X", "Y"] {
            network.add_node(id, NodeRole::Junction, 0.0).unwrap();
        }
        for (a, b) in [("A", "B"), ("B", "C"), ("X", "Y")] {
            network
                .add_line(a, b, Ohms(0.1), 10.0, Kilometers(1.0))
                .unwrap();
        }
        network
    }

    #[test]
    fn test_components_and_connectivity() {
        let network = two_feeders();
        assert_eq!(component_count(&network), 2);
        assert!(!is_connected(&network));

        let mut single = Network::new();
        single.add_node("A", NodeRole::Junction, 0.0).unwrap();
        assert!(is_connected(&single));
    }

    #[test]
    fn test_report_on_disconnected_network() {
        let report = analyze_connectivity(&two_feeders(), &CentralityConfig::default()).unwrap();
        assert!(!report.is_connected);
        assert_eq!(report.components, 2);
        assert_eq!(report.most_critical_node.as_str(), "B");
        assert_eq!(report.most_critical_score, 1.0);
        assert_eq!(report.average_clustering, 0.0);
        assert!((report.average_degree - 6.0 / 5.0).abs() < 1e-12);
        assert_eq!(report.stats.node_count, 5);
    }

    #[test]
    fn test_report_respects_normalization() {
        let config = CentralityConfig {
            weight: CentralityWeight::Hops,
            normalized: true,
        };
        let report = analyze_connectivity(&two_feeders(), &config).unwrap();
        assert!(report.betweenness.is_normalized());
        // n = 5: scale 2 / (4 * 3)
        assert!((report.most_critical_score - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_network_fails() {
        let err = analyze_connectivity(&Network::new(), &CentralityConfig::default()).unwrap_err();
        assert!(matches!(err, GridError::EmptyGraph(_)));
    }
}
