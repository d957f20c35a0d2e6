//! Declared vs. resolved dependency consistency.

use super::DependencyGraph;
use crate::error::ErrorRecord;
use crate::resolve::StepTable;

/// One `MissingDeclaredDependency` warning per graph edge that carries data
/// but was never declared in the consumer's `dependsOn`. Consumers are
/// visited in document order, producers likewise.
///
/// `dependsOn` is advisory; the resolved references are what the graph is
/// sorted on, so these never block validation.
pub fn missing_declared_dependencies(
    table: &StepTable<'_>,
    graph: &DependencyGraph,
) -> Vec<ErrorRecord> {
    let mut warnings = Vec::new();

    for (consumer, step) in table.iter() {
        for producer in graph.predecessors(consumer) {
            let undeclared = graph
                .origin(producer, consumer)
                .is_some_and(|origin| origin.data && !origin.declared);
            if undeclared {
                warnings.push(ErrorRecord::missing_declared(&step.step_id, table.id(producer)));
            }
        }
    }

    warnings
}
