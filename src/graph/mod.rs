//! petgraph-based dependency graph over processing steps.
//!
//! Node `i` is the step at `StepIndex(i)`. An edge `u -> v` means `u` must
//! run before `v`. The graph is derived from a document and rebuilt for
//! every validation; nothing mutates it after `build`.

pub mod consistency;
pub mod topo;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::resolve::{Resolution, StepIndex, StepTable};

/// Why an edge exists. Declared and data edges between the same pair
/// collapse into one edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeOrigin {
    pub declared: bool,
    pub data: bool,
}

pub struct DependencyGraph {
    pub graph: DiGraph<StepIndex, EdgeOrigin>,
}

impl DependencyGraph {
    pub fn build(table: &StepTable<'_>, resolution: &Resolution) -> Self {
        let mut graph = DiGraph::with_capacity(table.len(), resolution.declared.len());

        for (index, _) in table.iter() {
            graph.add_node(index);
        }

        for edge in &resolution.declared {
            let (from, to) = (node(edge.dependency), node(edge.dependent));
            let idx = match graph.find_edge(from, to) {
                Some(idx) => idx,
                None => graph.add_edge(from, to, EdgeOrigin::default()),
            };
            graph[idx].declared = true;
        }

        for edge in &resolution.data {
            let (from, to) = (node(edge.producer), node(edge.consumer));
            let idx = match graph.find_edge(from, to) {
                Some(idx) => idx,
                None => graph.add_edge(from, to, EdgeOrigin::default()),
            };
            graph[idx].data = true;
        }

        DependencyGraph { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn origin(&self, from: StepIndex, to: StepIndex) -> Option<EdgeOrigin> {
        self.graph
            .find_edge(node(from), node(to))
            .map(|idx| self.graph[idx])
    }

    /// Steps that must run before `step`, in document order.
    pub fn predecessors(&self, step: StepIndex) -> Vec<StepIndex> {
        let mut preds: Vec<StepIndex> = self
            .graph
            .neighbors_directed(node(step), Direction::Incoming)
            .map(|n| self.graph[n])
            .collect();
        preds.sort();
        preds
    }
}

fn node(index: StepIndex) -> NodeIndex {
    NodeIndex::new(index.0)
}
