//! Graph algorithms over a distribution [`Network`](gridopt_core::Network).
//!
//! - **Spanning trees**: minimum-length backbone via Kruskal or Prim
//! - **Centrality**: Brandes betweenness, clustering, average degree
//! - **Connectivity**: components plus a combined vulnerability report
//!
//! ```
//! use gridopt_algo::graph::{minimum_spanning_tree, MstMethod};
//! use gridopt_core::{Kilometers, Network, NodeRole, Ohms};
//!
//! let mut network = Network::new();
//! for id in ["A", "B", "C", "D"] {
//!     network.add_node(id, NodeRole::Junction, 0.0)?;
//! }
//! for (a, b, km) in [("A", "B", 1.0), ("B", "C", 2.0), ("C", "D", 3.0), ("D", "A", 4.0)] {
//!     network.add_line(a, b, Ohms(0.1), 10.0, Kilometers(km))?;
//! }
//!
//! let tree = minimum_spanning_tree(&network, MstMethod::Kruskal)?;
//! assert_eq!(tree.summary.optimized_length, Kilometers(6.0));
//! assert!((tree.summary.reduction_percent - 40.0).abs() < 1e-9);
//! # Ok::<(), gridopt_core::GridError>(())
//! ```

pub mod centrality;
pub mod connectivity;
pub mod mst;
pub mod union_find;

pub use centrality::{
    average_clustering, average_degree, betweenness_centrality, clustering_coefficients,
    Betweenness, CentralityWeight,
};
pub use connectivity::{analyze_connectivity, component_count, is_connected, ConnectivityReport};
pub use mst::{minimum_spanning_tree, MstMethod, MstSummary, SpanningForest};
pub use union_find::UnionFind;
