//! Deterministic topological sort of the dependency graph.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use petgraph::Direction;

use super::DependencyGraph;
use crate::resolve::StepIndex;

/// Members of one dependency cycle, in document order.
pub type Cycle = Vec<StepIndex>;

/// Kahn's algorithm. Among steps that are ready at the same time the one
/// appearing first in the document runs first, so the order is stable
/// across runs.
///
/// On failure returns every cycle: each strongly connected component with
/// more than one member, or a single member depending on itself. Steps that
/// are only downstream of a cycle are not part of any returned cycle.
pub fn execution_order(graph: &DependencyGraph) -> Result<Vec<StepIndex>, Vec<Cycle>> {
    let g = &graph.graph;
    let n = g.node_count();

    let mut in_degree: Vec<usize> = g
        .node_indices()
        .map(|idx| g.neighbors_directed(idx, Direction::Incoming).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(i)) = ready.pop() {
        order.push(g[NodeIndex::new(i)]);
        for next in g.neighbors_directed(NodeIndex::new(i), Direction::Outgoing) {
            let degree = &mut in_degree[next.index()];
            *degree -= 1;
            if *degree == 0 {
                ready.push(Reverse(next.index()));
            }
        }
    }

    if order.len() == n {
        return Ok(order);
    }

    tracing::debug!(
        sorted = order.len(),
        total = n,
        "topological sort stalled, extracting cycles"
    );
    Err(find_cycles(graph))
}

fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let g = &graph.graph;
    let mut cycles: Vec<Cycle> = tarjan_scc(g)
        .into_iter()
        .filter(|component| match component.as_slice() {
            [single] => g.find_edge(*single, *single).is_some(),
            _ => true,
        })
        .map(|component| {
            let mut members: Vec<StepIndex> = component.into_iter().map(|idx| g[idx]).collect();
            members.sort();
            members
        })
        .collect();
    cycles.sort();
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeOrigin;
    use petgraph::graph::DiGraph;

    fn graph(n: usize, edges: &[(usize, usize)]) -> DependencyGraph {
        let mut g = DiGraph::new();
        for i in 0..n {
            g.add_node(StepIndex(i));
        }
        for &(a, b) in edges {
            g.add_edge(NodeIndex::new(a), NodeIndex::new(b), EdgeOrigin::default());
        }
        DependencyGraph { graph: g }
    }

    fn ids(v: &[usize]) -> Vec<StepIndex> {
        v.iter().map(|&i| StepIndex(i)).collect()
    }

    #[test]
    fn ties_follow_document_order() {
        // 2 must precede 0; 1 is independent.
        let order = execution_order(&graph(3, &[(2, 0)])).unwrap();
        assert_eq!(order, ids(&[1, 2, 0]));
    }

    #[test]
    fn diamond() {
        let order = execution_order(&graph(4, &[(0, 2), (0, 1), (1, 3), (2, 3)])).unwrap();
        assert_eq!(order, ids(&[0, 1, 2, 3]));
    }

    #[test]
    fn downstream_of_cycle_is_not_in_cycle() {
        let cycles = execution_order(&graph(4, &[(0, 1), (1, 2), (2, 0), (2, 3)])).unwrap_err();
        assert_eq!(cycles, vec![ids(&[0, 1, 2])]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let cycles = execution_order(&graph(2, &[(1, 1)])).unwrap_err();
        assert_eq!(cycles, vec![ids(&[1])]);
    }

    #[test]
    fn two_disjoint_cycles() {
        let cycles =
            execution_order(&graph(5, &[(3, 4), (4, 3), (0, 1), (1, 0), (2, 2)])).unwrap_err();
        assert_eq!(cycles, vec![ids(&[0, 1]), ids(&[2]), ids(&[3, 4])]);
    }
}
