//! Solver output: per-arc flows and their cost.

use crate::losses::LossComparison;
use gridopt_core::{GridResult, LineId, Network, NodeId, Ohms};
use serde::Serialize;

/// Net flow carried by one line in one direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcFlow {
    pub line: LineId,
    pub from: NodeId,
    pub to: NodeId,
    /// Always positive; zero-flow lines are omitted
    pub flow: f64,
    pub unit_cost: Ohms,
}

impl ArcFlow {
    pub fn cost(&self) -> f64 {
        self.flow * self.unit_cost.value()
    }
}

/// A feasible minimum-cost flow. Immutable once returned by the solver.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowAssignment {
    /// One entry per line with non-zero net flow, in line order
    pub arcs: Vec<ArcFlow>,
    pub total_cost: f64,
    /// Augmenting paths used
    pub iterations: usize,
}

impl FlowAssignment {
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Flow from `from` to `to`, summed over parallel lines. Opposite
    /// direction is not subtracted.
    pub fn flow_on(&self, from: &str, to: &str) -> f64 {
        self.arcs
            .iter()
            .filter(|arc| arc.from.as_str() == from && arc.to.as_str() == to)
            .map(|arc| arc.flow)
            .sum()
    }

    /// Inflow minus outflow at `node`; equals its demand in a solved network.
    pub fn net_inflow(&self, node: &str) -> f64 {
        self.arcs
            .iter()
            .map(|arc| {
                if arc.to.as_str() == node {
                    arc.flow
                } else if arc.from.as_str() == node {
                    -arc.flow
                } else {
                    0.0
                }
            })
            .sum()
    }

    /// Lines that carry flow.
    pub fn lines(&self) -> impl Iterator<Item = LineId> + '_ {
        self.arcs.iter().map(|arc| arc.line)
    }

    /// The flow-carrying sub-network of `network`, keeping every node.
    pub fn to_network(&self, network: &Network) -> GridResult<Network> {
        network.sub_network(self.lines())
    }
}

/// Flow assignment plus how its sub-network scores on losses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowReport {
    pub assignment: FlowAssignment,
    pub losses: LossComparison,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridopt_core::{Kilometers, NodeRole};

    fn assignment() -> FlowAssignment {
        let arc = |line, from: &str, to: &str, flow| ArcFlow {
            line: LineId::new(line),
            from: from.into(),
            to: to.into(),
            flow,
            unit_cost: Ohms(0.5),
        };
        FlowAssignment {
            arcs: vec![arc(0, "S", "A", 5.0), arc(1, "A", "B", 2.0), arc(2, "S", "A", 1.0)],
            total_cost: 4.0,
            iterations: 2,
        }
    }

    #[test]
    fn test_accessors() {
        let flows = assignment();
        assert_eq!(flows.flow_on("S", "A"), 6.0);
        assert_eq!(flows.flow_on("A", "S"), 0.0);
        assert_eq!(flows.net_inflow("A"), 4.0);
        assert_eq!(flows.net_inflow("S"), -6.0);
        assert_eq!(flows.arcs[1].cost(), 1.0);
    }

    #[test]
    fn test_to_network_keeps_nodes() {
        let mut network = Network::new();
        network.add_node("S", NodeRole::Substation, -4.0).unwrap();
        network.add_node("A", NodeRole::Consumer, 4.0).unwrap();
        network.add_node("B", NodeRole::Junction, 0.0).unwrap();
        network
            .add_line("S", "A", Ohms(0.5), 10.0, Kilometers(1.0))
            .unwrap();
        network
            .add_line("A", "B", Ohms(0.5), 10.0, Kilometers(1.0))
            .unwrap();

        let flows = FlowAssignment {
            arcs: vec![ArcFlow {
                line: LineId::new(0),
                from: "S".into(),
                to: "A".into(),
                flow: 4.0,
                unit_cost: Ohms(0.5),
            }],
            total_cost: 2.0,
            iterations: 1,
        };
        let sub = flows.to_network(&network).unwrap();
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.line_count(), 1);
    }
}
