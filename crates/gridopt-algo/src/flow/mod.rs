//! Demand-balanced minimum-cost flow.
//!
//! Node demands follow one signed convention: positive values must be
//! received, negative values are supplied, zero is transshipment. Line
//! resistance is the unit cost.
//!
//! ```
//! use gridopt_algo::config::FlowConfig;
//! use gridopt_algo::flow::min_cost_flow;
//! use gridopt_core::{Kilometers, Network, NodeRole, Ohms};
//!
//! let mut network = Network::new();
//! network.add_node("S", NodeRole::Substation, -5.0)?;
//! network.add_node("C", NodeRole::Consumer, 5.0)?;
//! network.add_line("S", "C", Ohms(0.2), 10.0, Kilometers(1.0))?;
//!
//! let flows = min_cost_flow(&network, &FlowConfig::default())?;
//! assert_eq!(flows.flow_on("S", "C"), 5.0);
//! assert!((flows.total_cost - 1.0).abs() < 1e-12);
//! # Ok::<(), gridopt_core::GridError>(())
//! ```

mod assignment;
mod min_cost;
mod residual;

pub use assignment::{ArcFlow, FlowAssignment, FlowReport};
pub use min_cost::min_cost_flow;
