//! Step and output indices built once per validation pass.

use std::collections::{HashMap, HashSet};

use crate::parse::types::ProcessingStep;

/// Position of an indexed step. Indices follow document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepIndex(pub usize);

/// Opaque handle to one `OutputTarget` of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId {
    pub step: StepIndex,
    /// Position in the step's `outputTargets`.
    pub ordinal: usize,
}

/// Steps addressable by ID. Steps with a blank ID, and every repeat of an ID
/// after its first occurrence, are left out.
#[derive(Debug, Default)]
pub struct StepTable<'a> {
    steps: Vec<&'a ProcessingStep>,
    by_id: HashMap<&'a str, StepIndex>,
    /// IDs of steps that exist but could not be decoded.
    opaque: HashSet<&'a str>,
}

impl<'a> StepTable<'a> {
    pub fn build(steps: &'a [ProcessingStep]) -> Self {
        let mut table = StepTable::default();
        for step in steps {
            let id = step.step_id.as_str();
            if id.trim().is_empty() || table.by_id.contains_key(id) {
                continue;
            }
            table.by_id.insert(id, StepIndex(table.steps.len()));
            table.steps.push(step);
        }
        table
    }

    /// Register IDs that references may legitimately name even though no
    /// decoded step carries them.
    pub fn with_opaque<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in ids {
            if !self.by_id.contains_key(id) {
                self.opaque.insert(id);
            }
        }
        self
    }

    pub fn lookup(&self, step_id: &str) -> Option<StepIndex> {
        self.by_id.get(step_id).copied()
    }

    pub fn is_opaque(&self, step_id: &str) -> bool {
        self.opaque.contains(step_id)
    }

    pub fn step(&self, index: StepIndex) -> &'a ProcessingStep {
        self.steps[index.0]
    }

    pub fn id(&self, index: StepIndex) -> &'a str {
        self.steps[index.0].step_id.as_str()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StepIndex, &'a ProcessingStep)> + '_ {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| (StepIndex(i), *step))
    }
}

/// `(step, label)` → every output of that step answering to the label.
#[derive(Debug, Default)]
pub struct OutputIndex<'a> {
    by_label: HashMap<(StepIndex, &'a str), Vec<OutputId>>,
}

impl<'a> OutputIndex<'a> {
    pub fn build(table: &StepTable<'a>) -> Self {
        let mut by_label: HashMap<(StepIndex, &'a str), Vec<OutputId>> = HashMap::new();
        for (index, step) in table.iter() {
            for (ordinal, target) in step.output_targets.iter().enumerate() {
                let id = OutputId {
                    step: index,
                    ordinal,
                };
                // labels() is deduplicated per target, so one target is
                // never counted twice under the same label.
                for label in target.labels() {
                    by_label.entry((index, label)).or_default().push(id);
                }
            }
        }
        OutputIndex { by_label }
    }

    pub fn find<'b>(&'b self, step: StepIndex, label: &'b str) -> &'b [OutputId] {
        self.by_label
            .get(&(step, label))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(value: serde_json::Value) -> ProcessingStep {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn first_duplicate_wins() {
        let steps = vec![
            step(json!({"stepId": "a", "name": "first", "description": "d"})),
            step(json!({"stepId": "a", "name": "second", "description": "d"})),
            step(json!({"stepId": "b", "name": "b", "description": "d"})),
        ];
        let table = StepTable::build(&steps);
        assert_eq!(table.len(), 2);
        assert_eq!(table.step(table.lookup("a").unwrap()).name, "first");
        assert_eq!(table.lookup("b"), Some(StepIndex(1)));
    }

    #[test]
    fn variable_name_and_description_are_one_target() {
        let steps = vec![step(json!({
            "stepId": "a", "name": "n", "description": "d",
            "outputTargets": [
                {"targetType": "variable", "name": "epochs", "description": "epochs"},
                {"targetType": "file", "location": "out.fif", "description": "Filtered data"}
            ]
        }))];
        let table = StepTable::build(&steps);
        let outputs = OutputIndex::build(&table);
        assert_eq!(outputs.find(StepIndex(0), "epochs").len(), 1);
        assert_eq!(
            outputs.find(StepIndex(0), "Filtered data"),
            &[OutputId { step: StepIndex(0), ordinal: 1 }]
        );
        assert!(outputs.find(StepIndex(0), "out.fif").is_empty());
    }
}
