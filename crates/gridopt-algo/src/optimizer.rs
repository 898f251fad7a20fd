//! Facade that runs every analysis over one frozen network.
//!
//! The network is moved into an [`Arc`] when the optimizer is built and is
//! never handed out mutably, so the analyses in [`GridOptimizer::run_all`]
//! can read it from several threads at once.

use crate::config::AnalysisConfig;
use crate::flow::{min_cost_flow, FlowReport};
use crate::graph::{analyze_connectivity, minimum_spanning_tree, ConnectivityReport, SpanningForest};
use crate::losses::{LossComparison, LossModel};
use crate::results::ResultsRegistry;
use gridopt_core::{GridResult, Network};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of each analysis in a [`GridOptimizer::run_all`] pass.
#[derive(Debug)]
pub struct AnalysisOutcomes {
    pub spanning_tree: GridResult<SpanningForest>,
    pub min_cost_flow: GridResult<FlowReport>,
    pub connectivity: GridResult<ConnectivityReport>,
}

impl AnalysisOutcomes {
    pub fn all_succeeded(&self) -> bool {
        self.spanning_tree.is_ok() && self.min_cost_flow.is_ok() && self.connectivity.is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct GridOptimizer {
    network: Arc<Network>,
    config: AnalysisConfig,
    registry: ResultsRegistry,
}

impl GridOptimizer {
    pub fn new(network: Network) -> Self {
        Self::from_shared(Arc::new(network))
    }

    pub fn from_shared(network: Arc<Network>) -> Self {
        Self {
            network,
            config: AnalysisConfig::default(),
            registry: ResultsRegistry::new(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Another handle to the frozen network.
    pub fn shared_network(&self) -> Arc<Network> {
        Arc::clone(&self.network)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn registry(&self) -> &ResultsRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> ResultsRegistry {
        self.registry
    }

    fn loss_model(&self) -> LossModel {
        LossModel::from_config(&self.config.losses)
    }

    /// Minimum-length spanning tree; the summary is recorded.
    pub fn spanning_tree(&mut self) -> GridResult<SpanningForest> {
        let forest = minimum_spanning_tree(&self.network, self.config.mst.method)?;
        self.registry.insert(forest.summary.clone());
        Ok(forest)
    }

    /// Minimum-cost flow plus the losses of its flow-carrying sub-network.
    pub fn min_cost_flow(&mut self) -> GridResult<FlowReport> {
        let report = solve_flow(&self.network, &self.config, self.loss_model())?;
        self.registry.insert(report.clone());
        Ok(report)
    }

    pub fn connectivity(&mut self) -> GridResult<ConnectivityReport> {
        let report = analyze_connectivity(&self.network, &self.config.centrality)?;
        self.registry.insert(report.clone());
        Ok(report)
    }

    /// Score `candidate` against the frozen network and record it.
    pub fn compare_losses(&mut self, candidate: &Network) -> LossComparison {
        let comparison = self.loss_model().compare(&self.network, candidate);
        self.registry.insert(comparison);
        comparison
    }

    /// Run spanning tree, flow and connectivity, then score the spanning tree
    /// on losses. Successful results are recorded; failures are returned
    /// without touching the registry entry of that kind.
    pub fn run_all(&mut self) -> AnalysisOutcomes {
        let network = self.network.as_ref();
        let config = &self.config;
        let model = self.loss_model();

        let (spanning_tree, (min_cost_flow, connectivity)) = join(
            || minimum_spanning_tree(network, config.mst.method),
            || {
                join(
                    || solve_flow(network, config, model),
                    || analyze_connectivity(network, &config.centrality),
                )
            },
        );

        match &spanning_tree {
            Ok(forest) => {
                self.registry.insert(forest.summary.clone());
                let comparison = model.compare(network, &forest.network);
                self.registry.insert(comparison);
            }
            Err(e) => warn!(error = %e, "spanning tree analysis failed"),
        }
        match &min_cost_flow {
            Ok(report) => {
                self.registry.insert(report.clone());
            }
            Err(e) => warn!(error = %e, "min-cost flow analysis failed"),
        }
        match &connectivity {
            Ok(report) => {
                self.registry.insert(report.clone());
            }
            Err(e) => warn!(error = %e, "connectivity analysis failed"),
        }

        info!(recorded = self.registry.len(), "analysis pass complete");
        AnalysisOutcomes {
            spanning_tree,
            min_cost_flow,
            connectivity,
        }
    }
}

fn solve_flow(network: &Network, config: &AnalysisConfig, model: LossModel) -> GridResult<FlowReport> {
    let assignment = min_cost_flow(network, &config.flow)?;
    let carrying = assignment.to_network(network)?;
    let losses = model.compare(network, &carrying);
    Ok(FlowReport { assignment, losses })
}

#[cfg(feature = "parallel")]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

#[cfg(not(feature = "parallel"))]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA,
    B: FnOnce() -> RB,
{
    (a(), b())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{AnalysisKind, AnalysisResult};
    use gridopt_core::{GridError, Kilometers, NodeRole, Ohms};

    fn ring() -> Network {
        let mut network = Network::new();
        network.add_node("S", NodeRole::Substation, -6.0).unwrap();
        network.add_node("A", NodeRole::Consumer, 2.0).unwrap();
        network.add_node("B", NodeRole::Consumer, 2.0).unwrap();
        network.add_node("C", NodeRole::Consumer, 2.0).unwrap();
        for (a, b, r, km) in [
            ("S", "A", 0.1, 1.0),
            ("A", "B", 0.2, 2.0),
            ("B", "C", 0.3, 3.0),
            ("C", "S", 0.4, 4.0),
        ] {
            network
                .add_line(a, b, Ohms(r), 10.0, Kilometers(km))
                .unwrap();
        }
        network
    }

    #[test]
    fn test_run_all_records_every_analysis() {
        let mut optimizer = GridOptimizer::new(ring());
        let outcomes = optimizer.run_all();
        assert!(outcomes.all_succeeded());

        let registry = optimizer.registry();
        for kind in [
            AnalysisKind::SpanningTree,
            AnalysisKind::MinCostFlow,
            AnalysisKind::Connectivity,
            AnalysisKind::Losses,
        ] {
            assert!(registry.contains(kind), "missing {kind}");
        }

        // MST drops the 0.4 Ω line: 100² * (1.0 - 0.6)
        match registry.get(AnalysisKind::Losses) {
            Some(AnalysisResult::Losses(c)) => {
                assert!((c.savings().value() - 4000.0).abs() < 1e-6);
            }
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn test_failed_analysis_is_not_recorded() {
        let mut network = ring();
        network.add_node("D", NodeRole::Consumer, 1.0).unwrap();
        let mut optimizer = GridOptimizer::new(network);

        let outcomes = optimizer.run_all();
        assert!(matches!(
            outcomes.min_cost_flow,
            Err(GridError::UnbalancedDemand { .. })
        ));
        assert!(!optimizer.registry().contains(AnalysisKind::MinCostFlow));
        assert!(optimizer.registry().contains(AnalysisKind::SpanningTree));
    }

    #[test]
    fn test_individual_calls_overwrite_entries() {
        let mut optimizer = GridOptimizer::new(ring());
        optimizer.spanning_tree().unwrap();
        let forest = optimizer.spanning_tree().unwrap();
        assert_eq!(optimizer.registry().len(), 1);
        assert_eq!(forest.summary.optimized_length, Kilometers(6.0));

        let report = optimizer.min_cost_flow().unwrap();
        assert!(report.losses.candidate.value() <= report.losses.baseline.value());
        assert_eq!(optimizer.registry().len(), 2);
    }

    #[test]
    fn test_shared_network_is_not_copied() {
        let optimizer = GridOptimizer::new(ring());
        let shared = optimizer.shared_network();
        assert!(Arc::ptr_eq(&shared, &optimizer.shared_network()));
        assert_eq!(shared.line_count(), 4);
    }
}
