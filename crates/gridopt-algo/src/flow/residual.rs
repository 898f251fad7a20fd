//! Residual network with paired arcs.
//!
//! Arc `i` and arc `i ^ 1` are mates: pushing `δ` on one adds `δ` of
//! residual capacity to the other. Flow is stored per arc instead of
//! mutating capacities, so an infinite line capacity never meets
//! `∞ - ∞`.

#[derive(Debug, Clone)]
pub(crate) struct ResidualArc {
    pub to: usize,
    pub capacity: f64,
    pub cost: f64,
    pub flow: f64,
}

impl ResidualArc {
    #[inline]
    pub fn residual(&self) -> f64 {
        self.capacity - self.flow
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResidualGraph {
    pub arcs: Vec<ResidualArc>,
    pub adjacency: Vec<Vec<usize>>,
}

impl ResidualGraph {
    pub fn new(node_count: usize) -> Self {
        Self {
            arcs: Vec::new(),
            adjacency: vec![Vec::new(); node_count],
        }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Add `from -> to` plus its zero-capacity mate. Returns the forward arc id.
    pub fn add_arc(&mut self, from: usize, to: usize, capacity: f64, cost: f64) -> usize {
        let id = self.arcs.len();
        self.arcs.push(ResidualArc {
            to,
            capacity,
            cost,
            flow: 0.0,
        });
        self.arcs.push(ResidualArc {
            to: from,
            capacity: 0.0,
            cost: -cost,
            flow: 0.0,
        });
        self.adjacency[from].push(id);
        self.adjacency[to].push(id + 1);
        id
    }

    #[inline]
    pub fn tail(&self, arc: usize) -> usize {
        self.arcs[arc ^ 1].to
    }

    pub fn push(&mut self, arc: usize, amount: f64) {
        self.arcs[arc].flow += amount;
        self.arcs[arc ^ 1].flow -= amount;
    }

    /// Arcs leaving `node` with residual capacity above `tolerance`.
    pub fn open_arcs(&self, node: usize, tolerance: f64) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[node]
            .iter()
            .copied()
            .filter(move |&arc| self.arcs[arc].residual() > tolerance)
    }
}
