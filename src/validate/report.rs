//! The single result returned by document validation.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorRecord, IssueKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    /// Step IDs in a valid execution order. `None` unless `valid`.
    pub execution_order: Option<Vec<String>>,
    pub errors: Vec<ErrorRecord>,
    pub warnings: Vec<ErrorRecord>,
}

impl ValidationReport {
    /// Report for input rejected before any graph analysis.
    pub fn fatal(error: ErrorRecord) -> Self {
        ValidationReport {
            valid: false,
            execution_order: None,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    pub fn errors_of(&self, kind: IssueKind) -> impl Iterator<Item = &ErrorRecord> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    pub fn warnings_of(&self, kind: IssueKind) -> impl Iterator<Item = &ErrorRecord> {
        self.warnings.iter().filter(move |e| e.kind == kind)
    }

    pub fn has_error(&self, kind: IssueKind) -> bool {
        self.errors_of(kind).next().is_some()
    }

    /// Errors then warnings attributed to `step_id`.
    pub fn for_step<'a>(&'a self, step_id: &'a str) -> impl Iterator<Item = &'a ErrorRecord> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |e| e.step_id.as_deref() == Some(step_id))
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.valid {
            writeln!(f, "valid ({} warnings)", self.warnings.len())?;
        } else {
            writeln!(
                f,
                "invalid ({} errors, {} warnings)",
                self.errors.len(),
                self.warnings.len()
            )?;
        }
        for e in &self.errors {
            writeln!(f, "  error: {}", e)?;
        }
        for w in &self.warnings {
            writeln!(f, "  warning: {}", w)?;
        }
        Ok(())
    }
}
