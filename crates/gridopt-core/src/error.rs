//! Unified error type for network construction and analysis.
//!
//! Construction errors (`DuplicateNode`, `UnknownNode`, `SelfLoop`,
//! `InvalidAttribute`, `MissingAttribute`) are raised by [`Network`](crate::Network)
//! mutators and leave the network untouched. Analysis errors are returned by the
//! algorithms in `gridopt-algo` and are terminal for that invocation.
//!
//! # Example
//!
//! ```
//! use gridopt_core::{GridError, GridResult, Network, NodeRole};
//!
//! fn build() -> GridResult<Network> {
//!     let mut network = Network::new();
//!     network.add_node("S1", NodeRole::Substation, -10.0)?;
//!     network.add_node("S1", NodeRole::Consumer, 10.0)?;
//!     Ok(network)
//! }
//!
//! assert!(matches!(build(), Err(GridError::DuplicateNode(_))));
//! ```

use crate::{LineId, NodeId};
use thiserror::Error;

/// Error type for all gridopt operations.
#[derive(Error, Debug)]
pub enum GridError {
    /// A node with this identifier already exists
    #[error("Duplicate node: {0}")]
    DuplicateNode(NodeId),

    /// A line references a node that was never added
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// A line identifier that does not belong to this network
    #[error("Unknown line: {0}")]
    UnknownLine(LineId),

    /// A line connects a node to itself
    #[error("Self-loop rejected at node {0}")]
    SelfLoop(NodeId),

    /// An attribute value violates its domain (negative length, zero capacity, ...)
    #[error("Invalid attribute '{attribute}' on {entity}: {reason}")]
    InvalidAttribute {
        entity: String,
        attribute: &'static str,
        reason: String,
    },

    /// A required attribute was not supplied
    #[error("Missing attribute '{attribute}' on {entity}")]
    MissingAttribute {
        entity: String,
        attribute: &'static str,
    },

    /// The analysis is undefined on a graph without nodes or lines
    #[error("Empty graph: {0}")]
    EmptyGraph(&'static str),

    /// Signed demands do not sum to zero
    #[error("Unbalanced demand: signed demands sum to {total}")]
    UnbalancedDemand { total: f64 },

    /// Demands balance but capacities cannot route them
    #[error("Infeasible flow: {unmet} units of demand cannot be routed")]
    InfeasibleFlow { unmet: f64 },

    /// The flow solver hit its augmentation cap
    #[error("Iteration limit exceeded after {iterations} augmentations")]
    IterationLimitExceeded { iterations: usize },

    /// Configuration could not be parsed or is out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results using GridError.
pub type GridResult<T> = Result<T, GridError>;

impl GridError {
    pub fn invalid(
        entity: impl Into<String>,
        attribute: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        GridError::InvalidAttribute {
            entity: entity.into(),
            attribute,
            reason: reason.into(),
        }
    }

    pub fn missing(entity: impl Into<String>, attribute: &'static str) -> Self {
        GridError::MissingAttribute {
            entity: entity.into(),
            attribute,
        }
    }
}
