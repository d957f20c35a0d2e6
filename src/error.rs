//! Report records shared by every validation phase.
//!
//! Validation never aborts on the first problem: each phase pushes
//! `ErrorRecord`s and the orchestrator splits them into errors and warnings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// Top-level contract failure (missing keys, bad version strings, no steps).
    MalformedDocument,
    MalformedStep,
    DuplicateStepId,
    UnknownStepReference,
    UnknownOutputReference,
    AmbiguousOutputReference,
    CyclicDependency,
    /// Warning: a resolved data dependency is not mirrored in `dependsOn`.
    MissingDeclaredDependency,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MalformedDocument => "MalformedDocument",
            IssueKind::MalformedStep => "MalformedStep",
            IssueKind::DuplicateStepId => "DuplicateStepId",
            IssueKind::UnknownStepReference => "UnknownStepReference",
            IssueKind::UnknownOutputReference => "UnknownOutputReference",
            IssueKind::AmbiguousOutputReference => "AmbiguousOutputReference",
            IssueKind::CyclicDependency => "CyclicDependency",
            IssueKind::MissingDeclaredDependency => "MissingDeclaredDependency",
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, IssueKind::MissingDeclaredDependency)
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub kind: IssueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    pub detail: String,
    /// Members of the offending cycle, in document order. Only set for
    /// `CyclicDependency`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<String>>,
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.step_id {
            Some(id) => write!(f, "[{}] {} (step '{}')", self.kind, self.detail, id),
            None => write!(f, "[{}] {}", self.kind, self.detail),
        }
    }
}

impl std::error::Error for ErrorRecord {}

impl ErrorRecord {
    pub fn new(kind: IssueKind, step_id: Option<String>, detail: impl Into<String>) -> Self {
        ErrorRecord {
            kind,
            step_id,
            detail: detail.into(),
            cycle: None,
        }
    }

    pub fn malformed_document(detail: impl Into<String>) -> Self {
        Self::new(IssueKind::MalformedDocument, None, detail)
    }

    pub fn malformed_step(step_id: Option<String>, detail: impl Into<String>) -> Self {
        Self::new(IssueKind::MalformedStep, step_id, detail)
    }

    pub fn duplicate_step(step_id: &str, first_position: usize) -> Self {
        Self::new(
            IssueKind::DuplicateStepId,
            Some(step_id.to_string()),
            format!(
                "Step ID '{}' is already used by processing step #{}",
                step_id, first_position
            ),
        )
    }

    pub fn unknown_step(step_id: &str, referenced: &str, via: &str) -> Self {
        Self::new(
            IssueKind::UnknownStepReference,
            Some(step_id.to_string()),
            format!("{} references unknown step '{}'", via, referenced),
        )
    }

    pub fn unknown_output(step_id: &str, referenced_step: &str, output_id: &str) -> Self {
        Self::new(
            IssueKind::UnknownOutputReference,
            Some(step_id.to_string()),
            format!(
                "previousStepOutput references output '{}' which step '{}' does not produce",
                output_id, referenced_step
            ),
        )
    }

    pub fn ambiguous_output(
        step_id: &str,
        referenced_step: &str,
        output_id: &str,
        matches: usize,
    ) -> Self {
        Self::new(
            IssueKind::AmbiguousOutputReference,
            Some(step_id.to_string()),
            format!(
                "previousStepOutput label '{}' matches {} outputs of step '{}'",
                output_id, matches, referenced_step
            ),
        )
    }

    pub fn cyclic(members: Vec<String>) -> Self {
        let detail = if members.len() == 1 {
            format!("Step '{}' depends on itself", members[0])
        } else {
            format!("Dependency cycle among steps: {}", members.join(", "))
        };
        ErrorRecord {
            kind: IssueKind::CyclicDependency,
            step_id: members.first().cloned(),
            detail,
            cycle: Some(members),
        }
    }

    pub fn missing_declared(step_id: &str, producer: &str) -> Self {
        Self::new(
            IssueKind::MissingDeclaredDependency,
            Some(step_id.to_string()),
            format!(
                "Step consumes output of '{}' but does not list it in dependsOn",
                producer
            ),
        )
    }
}
