//! Validation options.

use serde::{Deserialize, Serialize};

/// Knobs for [`crate::validate::validate_with`]. Deserializes from a partial
/// JSON object; absent keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationOptions {
    /// Treat warnings as errors: the report is invalid when any warning
    /// was emitted.
    pub deny_warnings: bool,
    /// Emit `MissingDeclaredDependency` warnings.
    pub check_declared_dependencies: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            deny_warnings: false,
            check_declared_dependencies: true,
        }
    }
}

impl ValidationOptions {
    pub fn strict() -> Self {
        ValidationOptions {
            deny_warnings: true,
            ..Self::default()
        }
    }

    /// Parse options from JSON. An empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }
}
