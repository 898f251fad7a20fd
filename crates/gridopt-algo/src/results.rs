//! Analysis results and the caller-owned registry that collects them.

use crate::flow::FlowReport;
use crate::graph::{ConnectivityReport, MstSummary};
use crate::losses::LossComparison;
use serde::Serialize;
use std::collections::BTreeMap;

/// Registry key: one slot per analysis type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    SpanningTree,
    MinCostFlow,
    Connectivity,
    Losses,
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AnalysisKind::SpanningTree => "spanning_tree",
            AnalysisKind::MinCostFlow => "min_cost_flow",
            AnalysisKind::Connectivity => "connectivity",
            AnalysisKind::Losses => "losses",
        })
    }
}

/// Metrics bundle produced by one analysis invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisResult {
    SpanningTree(MstSummary),
    MinCostFlow(FlowReport),
    Connectivity(ConnectivityReport),
    Losses(LossComparison),
}

impl AnalysisResult {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisResult::SpanningTree(_) => AnalysisKind::SpanningTree,
            AnalysisResult::MinCostFlow(_) => AnalysisKind::MinCostFlow,
            AnalysisResult::Connectivity(_) => AnalysisKind::Connectivity,
            AnalysisResult::Losses(_) => AnalysisKind::Losses,
        }
    }
}

impl From<MstSummary> for AnalysisResult {
    fn from(summary: MstSummary) -> Self {
        AnalysisResult::SpanningTree(summary)
    }
}

impl From<FlowReport> for AnalysisResult {
    fn from(report: FlowReport) -> Self {
        AnalysisResult::MinCostFlow(report)
    }
}

impl From<ConnectivityReport> for AnalysisResult {
    fn from(report: ConnectivityReport) -> Self {
        AnalysisResult::Connectivity(report)
    }
}

impl From<LossComparison> for AnalysisResult {
    fn from(comparison: LossComparison) -> Self {
        AnalysisResult::Losses(comparison)
    }
}

/// Latest result per analysis kind. Inserting a kind that is already present
/// replaces it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ResultsRegistry {
    entries: BTreeMap<AnalysisKind, AnalysisResult>,
}

impl ResultsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `result`, returning the entry it replaced.
    pub fn insert(&mut self, result: impl Into<AnalysisResult>) -> Option<AnalysisResult> {
        let result = result.into();
        self.entries.insert(result.kind(), result)
    }

    pub fn get(&self, kind: AnalysisKind) -> Option<&AnalysisResult> {
        self.entries.get(&kind)
    }

    pub fn remove(&mut self, kind: AnalysisKind) -> Option<AnalysisResult> {
        self.entries.remove(&kind)
    }

    pub fn contains(&self, kind: AnalysisKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnalysisKind, &AnalysisResult)> {
        self.entries.iter().map(|(kind, result)| (*kind, result))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridopt_core::Watts;

    #[test]
    fn test_insert_overwrites_same_kind() {
        let mut registry = ResultsRegistry::new();
        assert!(registry
            .insert(LossComparison::new(Watts(10.0), Watts(5.0)))
            .is_none());

        let previous = registry
            .insert(LossComparison::new(Watts(10.0), Watts(2.0)))
            .unwrap();
        assert!(matches!(previous, AnalysisResult::Losses(c) if c.candidate == Watts(5.0)));
        assert_eq!(registry.len(), 1);

        match registry.get(AnalysisKind::Losses) {
            Some(AnalysisResult::Losses(c)) => assert_eq!(c.candidate, Watts(2.0)),
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn test_json_is_keyed_by_kind() {
        let mut registry = ResultsRegistry::new();
        registry.insert(LossComparison::new(Watts(10.0), Watts(5.0)));

        let value: serde_json::Value =
            serde_json::from_str(&registry.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["losses"]["kind"], "losses");
        assert_eq!(value["losses"]["reduction_percent"], 50.0);
    }

    #[test]
    fn test_remove_and_contains() {
        let mut registry = ResultsRegistry::new();
        registry.insert(LossComparison::new(Watts(1.0), Watts(1.0)));
        assert!(registry.contains(AnalysisKind::Losses));
        assert!(registry.remove(AnalysisKind::Losses).is_some());
        assert!(registry.is_empty());
    }
}
