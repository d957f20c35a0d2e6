//! Reference resolution: step-ID and output-label references → index edges.
//!
//! Labels are resolved to opaque `OutputId`s once per pass so later phases
//! only ever see indices.

pub mod index;

pub use index::{OutputId, OutputIndex, StepIndex, StepTable};

use crate::error::ErrorRecord;

/// An ordering edge taken at face value from `dependsOn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredEdge {
    pub dependency: StepIndex,
    pub dependent: StepIndex,
}

/// A data edge: `consumer` reads `output`, which `producer` emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataEdge {
    pub producer: StepIndex,
    pub consumer: StepIndex,
    pub output: OutputId,
}

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub declared: Vec<DeclaredEdge>,
    pub data: Vec<DataEdge>,
    pub errors: Vec<ErrorRecord>,
}

/// Resolve every `previousStepOutput` input and `dependsOn` entry of every
/// indexed step. Errors are accumulated, never raised.
pub fn resolve(table: &StepTable<'_>) -> Resolution {
    let outputs = OutputIndex::build(table);
    let mut resolution = Resolution::default();

    for (consumer, step) in table.iter() {
        for reference in step.output_references() {
            let Some(producer) = table.lookup(&reference.step_id) else {
                if !table.is_opaque(&reference.step_id) {
                    resolution.errors.push(ErrorRecord::unknown_step(
                        &step.step_id,
                        &reference.step_id,
                        "previousStepOutput",
                    ));
                }
                continue;
            };

            match outputs.find(producer, &reference.output_id) {
                [] => resolution.errors.push(ErrorRecord::unknown_output(
                    &step.step_id,
                    &reference.step_id,
                    &reference.output_id,
                )),
                [output] => resolution.data.push(DataEdge {
                    producer,
                    consumer,
                    output: *output,
                }),
                matches => resolution.errors.push(ErrorRecord::ambiguous_output(
                    &step.step_id,
                    &reference.step_id,
                    &reference.output_id,
                    matches.len(),
                )),
            }
        }

        for dependency_id in &step.depends_on {
            match table.lookup(dependency_id) {
                Some(dependency) => resolution.declared.push(DeclaredEdge {
                    dependency,
                    dependent: consumer,
                }),
                None if table.is_opaque(dependency_id) => {}
                None => resolution.errors.push(ErrorRecord::unknown_step(
                    &step.step_id,
                    dependency_id,
                    "dependsOn",
                )),
            }
        }
    }

    tracing::debug!(
        declared = resolution.declared.len(),
        data = resolution.data.len(),
        errors = resolution.errors.len(),
        "resolved step references"
    );

    resolution
}
