//! # gridopt-algo: Distribution Network Analyses
//!
//! Structural optimizations and resilience metrics over a
//! [`gridopt_core::Network`]. Every analysis takes `&Network` and returns a
//! derived value; the input is never modified.
//!
//! | Analysis | Entry point | Result |
//! |----------|-------------|--------|
//! | Minimum-length spanning tree | [`minimum_spanning_tree`] | [`SpanningForest`] |
//! | Demand-balanced min-cost flow | [`min_cost_flow`] | [`FlowAssignment`] |
//! | Connectivity and centrality | [`analyze_connectivity`] | [`ConnectivityReport`] |
//! | Resistive losses | [`LossModel`] | [`LossComparison`] |
//!
//! [`GridOptimizer`] wraps a frozen network, runs the analyses (concurrently
//! with the `parallel` feature) and collects their output in a
//! [`ResultsRegistry`].
//!
//! ## Example
//!
//! ```
//! use gridopt_algo::{AnalysisKind, GridOptimizer};
//! use gridopt_core::{Kilometers, Network, NodeRole, Ohms};
//!
//! let mut network = Network::new();
//! network.add_node("S1", NodeRole::Substation, -3.0)?;
//! network.add_node("C1", NodeRole::Consumer, 1.0)?;
//! network.add_node("C2", NodeRole::Consumer, 2.0)?;
//! network.add_line("S1", "C1", Ohms(0.2), 10.0, Kilometers(1.0))?;
//! network.add_line("C1", "C2", Ohms(0.2), 10.0, Kilometers(1.0))?;
//! network.add_line("S1", "C2", Ohms(0.5), 10.0, Kilometers(2.5))?;
//!
//! let mut optimizer = GridOptimizer::new(network);
//! let outcomes = optimizer.run_all();
//! assert!(outcomes.all_succeeded());
//! assert!(optimizer.registry().contains(AnalysisKind::SpanningTree));
//! # Ok::<(), gridopt_core::GridError>(())
//! ```

pub mod config;
pub mod flow;
pub mod graph;
pub mod losses;
pub mod optimizer;
pub mod results;

pub use config::{
    AnalysisConfig, CentralityConfig, FlowConfig, LoggingConfig, LossConfig, MstConfig,
};
pub use flow::{min_cost_flow, ArcFlow, FlowAssignment, FlowReport};
pub use graph::{
    analyze_connectivity, average_clustering, average_degree, betweenness_centrality,
    clustering_coefficients, component_count, is_connected, minimum_spanning_tree, Betweenness,
    CentralityWeight, ConnectivityReport, MstMethod, MstSummary, SpanningForest, UnionFind,
};
pub use losses::{LossComparison, LossModel, ResistiveElement};
pub use optimizer::{AnalysisOutcomes, GridOptimizer};
pub use results::{AnalysisKind, AnalysisResult, ResultsRegistry};
