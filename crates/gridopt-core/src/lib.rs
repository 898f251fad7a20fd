//! # gridopt-core: Distribution Network Model
//!
//! Provides the graph model that every gridopt analysis runs against.
//!
//! ## Design
//!
//! A distribution network is an **undirected multigraph** where:
//! - **Nodes** are substations (supply), consumers (load) or junctions
//! - **Edges** are lines carrying resistance, capacity and length
//!
//! Nodes carry a single signed `demand`: positive values must be received,
//! negative values are supplied, zero is pure transshipment. The role fixes
//! which sign is allowed:
//!
//! | Role | Demand |
//! |------|--------|
//! | [`NodeRole::Substation`] | `<= 0` (magnitude is the supply) |
//! | [`NodeRole::Consumer`] | `>= 0` |
//! | [`NodeRole::Junction`] | `== 0` |
//!
//! Parallel lines are kept as independent edges. Self-loops, unknown
//! endpoints, duplicate node identifiers and out-of-range attributes are
//! rejected when the element is added, so every [`Network`] value satisfies
//! the model invariants.
//!
//! ## Quick Start
//!
//! ```
//! use gridopt_core::*;
//!
//! let mut network = Network::new();
//! network.add_node("S1", NodeRole::Substation, -30.0)?;
//! network.add_node("C1", NodeRole::Consumer, 10.0)?;
//! network.add_node("C2", NodeRole::Consumer, 20.0)?;
//!
//! network.add_line("S1", "C1", Ohms(0.4), 50.0, Kilometers(2.0))?;
//! network.add_line("C1", "C2", Ohms(0.3), 50.0, Kilometers(1.5))?;
//!
//! assert_eq!(network.degree("C1")?, 2);
//! assert_eq!(network.total_length(), Kilometers(3.5));
//! # Ok::<(), GridError>(())
//! ```
//!
//! ## Modules
//!
//! - [`diagnostics`] - Non-fatal validation findings
//! - [`graph_utils`] - Topology statistics and island detection
//! - [`units`] - Unit newtypes for resistance, length, current and power
//!
//! Algorithms (spanning trees, min-cost flow, centrality, losses) live in the
//! `gridopt-algo` crate and only ever take `&Network`.

use petgraph::visit::EdgeRef;
use petgraph::Undirected;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;

pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{GridError, GridResult};
pub use graph_utils::*;
pub use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
pub use units::{Amperes, Kilometers, Ohms, Watts};

/// Opaque, comparable node identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId(value)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Line identifier, assigned in insertion order.
///
/// Sub-networks keep the identifiers of the lines they were derived from, so
/// a line can be traced back to the original network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(usize);

impl LineId {
    #[inline]
    pub fn new(value: usize) -> Self {
        LineId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Role of a node in the distribution network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Source of power; demand is zero or negative
    Substation,
    /// Load; demand is zero or positive
    Consumer,
    /// Pure transshipment point; demand is zero
    Junction,
}

impl NodeRole {
    /// Whether `demand` is consistent with this role.
    pub fn admits(self, demand: f64) -> bool {
        match self {
            NodeRole::Substation => demand <= 0.0,
            NodeRole::Consumer => demand >= 0.0,
            NodeRole::Junction => demand == 0.0,
        }
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            NodeRole::Substation => "substation",
            NodeRole::Consumer => "consumer",
            NodeRole::Junction => "junction",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub role: NodeRole,
    /// Signed demand: positive = must receive, negative = supplies `|demand|`
    pub demand: f64,
}

impl Node {
    /// Supply offered by this node (zero for consumers and junctions).
    pub fn supply(&self) -> f64 {
        (-self.demand).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub id: LineId,
    pub from: NodeId,
    pub to: NodeId,
    pub resistance: Ohms,
    /// Maximum flow in either direction
    pub capacity: f64,
    pub length: Kilometers,
}

impl Line {
    /// Human-readable label, e.g. `L3 (S1-C2)`.
    pub fn label(&self) -> String {
        format!("{} ({}-{})", self.id, self.from, self.to)
    }

    /// True if the line joins `a` and `b` in either orientation.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from.as_str() == a && self.to.as_str() == b)
            || (self.from.as_str() == b && self.to.as_str() == a)
    }
}

/// Line data as handed over by a loading collaborator.
///
/// Attributes are optional here because tabular sources can leave cells
/// empty. [`Network::add_line_record`] turns every absent attribute into
/// [`GridError::MissingAttribute`] instead of defaulting it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
}

impl LineRecord {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Self::default()
        }
    }

    pub fn with_resistance(mut self, ohms: f64) -> Self {
        self.resistance = Some(ohms);
        self
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_length(mut self, km: f64) -> Self {
        self.length = Some(km);
        self
    }

    pub fn label(&self) -> String {
        format!("line {}-{}", self.from, self.to)
    }
}

impl From<&Line> for LineRecord {
    fn from(line: &Line) -> Self {
        Self {
            from: line.from.clone(),
            to: line.to.clone(),
            resistance: Some(line.resistance.value()),
            capacity: Some(line.capacity),
            length: Some(line.length.value()),
        }
    }
}

/// Plain-data form of a network for exchange with external collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
}

/// The distribution network graph.
///
/// Mutation goes through [`Network::add_node`] and [`Network::add_line`]
/// only; analyses take `&Network` and return derived values or new
/// networks, never modifying the input.
#[derive(Debug, Clone)]
pub struct Network {
    graph: Graph<Node, Line, Undirected>,
    index: HashMap<NodeId, NodeIndex>,
    line_index: HashMap<LineId, EdgeIndex>,
    next_line: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            graph: Graph::new_undirected(),
            index: HashMap::new(),
            line_index: HashMap::new(),
            next_line: 0,
        }
    }

    /// Add a node. Fails with [`GridError::DuplicateNode`] if the identifier
    /// is taken, or [`GridError::InvalidAttribute`] if `demand` is not finite
    /// or contradicts the role.
    pub fn add_node(
        &mut self,
        id: impl Into<NodeId>,
        role: NodeRole,
        demand: f64,
    ) -> GridResult<NodeIndex> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(GridError::DuplicateNode(id));
        }
        if !demand.is_finite() {
            return Err(GridError::invalid(
                format!("node {id}"),
                "demand",
                "must be finite",
            ));
        }
        if !role.admits(demand) {
            return Err(GridError::invalid(
                format!("node {id}"),
                "demand",
                format!("{demand} is not valid for a {role}"),
            ));
        }
        let idx = self.graph.add_node(Node {
            id: id.clone(),
            role,
            demand,
        });
        self.index.insert(id, idx);
        Ok(idx)
    }

    /// Add a line between two existing nodes.
    ///
    /// Fails with [`GridError::UnknownNode`] if an endpoint is absent,
    /// [`GridError::SelfLoop`] if both endpoints are the same node, and
    /// [`GridError::InvalidAttribute`] for negative or non-finite
    /// resistance/length or a capacity that is not strictly positive.
    pub fn add_line(
        &mut self,
        from: &str,
        to: &str,
        resistance: Ohms,
        capacity: f64,
        length: Kilometers,
    ) -> GridResult<LineId> {
        let a = self.require(from)?;
        let b = self.require(to)?;
        if a == b {
            return Err(GridError::SelfLoop(self.graph[a].id.clone()));
        }

        let id = LineId(self.next_line);
        let entity = || format!("line {id} ({from}-{to})");
        if !resistance.is_non_negative() {
            return Err(GridError::invalid(
                entity(),
                "resistance",
                format!("{} must be finite and >= 0", resistance.value()),
            ));
        }
        if !length.is_non_negative() {
            return Err(GridError::invalid(
                entity(),
                "length",
                format!("{} must be finite and >= 0", length.value()),
            ));
        }
        if !(capacity > 0.0) {
            return Err(GridError::invalid(
                entity(),
                "capacity",
                format!("{capacity} must be > 0"),
            ));
        }

        let line = Line {
            id,
            from: self.graph[a].id.clone(),
            to: self.graph[b].id.clone(),
            resistance,
            capacity,
            length,
        };
        Ok(self.insert_line(a, b, line))
    }

    /// Add a line from a record, rejecting absent attributes with
    /// [`GridError::MissingAttribute`].
    pub fn add_line_record(&mut self, record: &LineRecord) -> GridResult<LineId> {
        let entity = record.label();
        let resistance = record
            .resistance
            .ok_or_else(|| GridError::missing(entity.clone(), "resistance"))?;
        let capacity = record
            .capacity
            .ok_or_else(|| GridError::missing(entity.clone(), "capacity"))?;
        let length = record
            .length
            .ok_or_else(|| GridError::missing(entity, "length"))?;
        self.add_line(
            record.from.as_str(),
            record.to.as_str(),
            Ohms(resistance),
            capacity,
            Kilometers(length),
        )
    }

    fn require(&self, id: &str) -> GridResult<NodeIndex> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GridError::UnknownNode(NodeId::from(id)))
    }

    fn insert_line(&mut self, a: NodeIndex, b: NodeIndex, line: Line) -> LineId {
        let id = line.id;
        let edge = self.graph.add_edge(a, b, line);
        self.line_index.insert(id, edge);
        self.next_line = self.next_line.max(id.0 + 1);
        id
    }

    /// Read-only access to the underlying petgraph graph.
    ///
    /// Node indices are dense (`0..node_count`) and follow insertion order.
    pub fn graph(&self) -> &Graph<Node, Line, Undirected> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn line_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index(id).map(|idx| &self.graph[idx])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.graph.edge_weights()
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.line_index.get(&id).map(|&edge| &self.graph[edge])
    }

    /// Graph endpoints of a line, in `from`/`to` order.
    pub fn line_endpoints(&self, id: LineId) -> Option<(NodeIndex, NodeIndex)> {
        self.line_index
            .get(&id)
            .and_then(|&edge| self.graph.edge_endpoints(edge))
    }

    /// Number of line ends incident to the node (parallel lines count separately).
    pub fn degree(&self, id: &str) -> GridResult<usize> {
        let idx = self.require(id)?;
        Ok(self.graph.edges(idx).count())
    }

    /// Distinct neighbors of the node, sorted by identifier.
    pub fn neighbors(&self, id: &str) -> GridResult<Vec<&NodeId>> {
        let idx = self.require(id)?;
        let mut neighbors: Vec<&NodeId> = self
            .graph
            .neighbors(idx)
            .map(|n| &self.graph[n].id)
            .collect();
        neighbors.sort();
        neighbors.dedup();
        Ok(neighbors)
    }

    /// All lines joining `a` and `b`, in insertion order.
    pub fn lines_between(&self, a: &str, b: &str) -> GridResult<Vec<&Line>> {
        let ia = self.require(a)?;
        let ib = self.require(b)?;
        let mut lines: Vec<&Line> = self
            .graph
            .edges(ia)
            .filter(|e| {
                let other = if e.source() == ia { e.target() } else { e.source() };
                other == ib
            })
            .map(|e| e.weight())
            .collect();
        lines.sort_by_key(|line| line.id);
        Ok(lines)
    }

    pub fn total_length(&self) -> Kilometers {
        self.lines().map(|line| line.length).sum()
    }

    /// Sum of positive demands.
    pub fn total_demand(&self) -> f64 {
        self.nodes().map(|n| n.demand.max(0.0)).sum()
    }

    /// Sum of supplies offered by substations.
    pub fn total_supply(&self) -> f64 {
        self.nodes().map(Node::supply).sum()
    }

    /// Sum of all signed demands; zero for a balanced network.
    pub fn demand_balance(&self) -> f64 {
        self.nodes().map(|n| n.demand).sum()
    }

    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats::default();
        for node in self.nodes() {
            match node.role {
                NodeRole::Substation => stats.num_substations += 1,
                NodeRole::Consumer => stats.num_consumers += 1,
                NodeRole::Junction => stats.num_junctions += 1,
            }
        }
        stats.num_lines = self.line_count();
        stats.total_demand = self.total_demand();
        stats.total_supply = self.total_supply();
        stats.total_length = self.total_length();
        stats
    }

    /// Derive a network holding every node of `self` and only the given lines.
    ///
    /// Nodes keep their insertion order, so node indices match the source
    /// network. Lines keep their [`LineId`]; repeated identifiers are added once.
    pub fn sub_network<I>(&self, lines: I) -> GridResult<Network>
    where
        I: IntoIterator<Item = LineId>,
    {
        let mut sub = Network::new();
        for node in self.nodes() {
            let idx = sub.graph.add_node(node.clone());
            sub.index.insert(node.id.clone(), idx);
        }
        for id in lines {
            if sub.line_index.contains_key(&id) {
                continue;
            }
            let edge = *self.line_index.get(&id).ok_or(GridError::UnknownLine(id))?;
            let (a, b) = self
                .graph
                .edge_endpoints(edge)
                .ok_or(GridError::UnknownLine(id))?;
            sub.insert_line(a, b, self.graph[edge].clone());
        }
        Ok(sub)
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            nodes: self.nodes().cloned().collect(),
            lines: self.lines().map(LineRecord::from).collect(),
        }
    }

    /// Rebuild a network from plain data, applying every construction check.
    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> GridResult<Network> {
        let mut network = Network::new();
        for node in &snapshot.nodes {
            network.add_node(node.id.clone(), node.role, node.demand)?;
        }
        for record in &snapshot.lines {
            network.add_line_record(record)?;
        }
        Ok(network)
    }

    /// Report conditions that construction accepts but analyses will trip on.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        let stats = self.stats();

        if self.is_empty() {
            diag.add_error("structure", "Network has no nodes");
            return;
        }

        if stats.num_lines == 0 && self.node_count() > 1 {
            diag.add_error("structure", "Network has multiple nodes but no lines");
        }

        if stats.num_substations == 0 && stats.total_demand > 0.0 {
            diag.add_error("demand", "Network has demand but no substations");
        }
        if stats.num_consumers == 0 {
            diag.add_warning("demand", "Network has no consumers");
        }

        let balance = self.demand_balance();
        if balance.abs() > 1e-9 {
            diag.add_warning(
                "demand",
                &format!(
                    "Signed demands sum to {balance:.3} (supply {:.3}, demand {:.3})",
                    stats.total_supply, stats.total_demand
                ),
            );
        }

        for idx in self.graph.node_indices() {
            if self.graph.edges(idx).next().is_none() && self.node_count() > 1 {
                diag.add_warning_with_entity(
                    "topology",
                    "Isolated node",
                    self.graph[idx].id.as_str(),
                );
            }
        }

        let islands = find_islands(self);
        if islands.count() > 1 {
            diag.add_warning(
                "topology",
                &format!("Network splits into {} islands", islands.count()),
            );
        }
    }
}

/// Counts and totals describing a network.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkStats {
    pub num_substations: usize,
    pub num_consumers: usize,
    pub num_junctions: usize,
    pub num_lines: usize,
    pub total_demand: f64,
    pub total_supply: f64,
    pub total_length: Kilometers,
}

impl std::fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} substations ({:.1} supply), {} consumers ({:.1} demand), {} junctions, {} lines ({:.2} km)",
            self.num_substations,
            self.total_supply,
            self.num_consumers,
            self.total_demand,
            self.num_junctions,
            self.num_lines,
            self.total_length.value()
        )
    }
}
