//! Rust types for the signalJourney provenance document.
//!
//! These are the serde target for `*_signalJourney.json` files. Field names
//! follow the JSON Schema set: camelCase everywhere except the two version
//! keys at the top level.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// TOP-LEVEL DOCUMENT
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDocument {
    #[serde(rename = "sj_version")]
    pub sj_version: String,
    #[serde(rename = "schema_version")]
    pub schema_version: String,
    pub description: String,
    pub pipeline_info: PipelineInfo,
    pub processing_steps: Vec<ProcessingStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_metrics: Option<Map<String, Value>>,
    /// Namespaced key-value bag (`eeg`, `nemar`, ...). Opaque to validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl PipelineDocument {
    pub fn step(&self, step_id: &str) -> Option<&ProcessingStep> {
        self.processing_steps.iter().find(|s| s.step_id == step_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pipeline_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// =============================================================================
// PROCESSING STEP
// =============================================================================

/// One recorded operation. `step_id`, `name` and `description` default to
/// empty so a typed document can still be loaded and then reported on;
/// `parse::step::parse_step` rejects records where they are missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStep {
    #[serde(default)]
    pub step_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software: Option<SoftwareReference>,
    #[serde(default, skip_serializing_if = "Parameters::is_absent")]
    pub parameters: Parameters,
    #[serde(default)]
    pub input_sources: Vec<InputSource>,
    #[serde(default)]
    pub output_targets: Vec<OutputTarget>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<Map<String, Value>>,
}

impl ProcessingStep {
    /// Parameter name -> `{value, unit, dataType}`, whichever shape the
    /// document used.
    pub fn parameter_map(&self) -> &IndexMap<String, ParameterEntry> {
        &self.parameters.entries
    }

    /// `(stepId, outputId)` of every `previousStepOutput` input, in order.
    pub fn output_references(&self) -> impl Iterator<Item = &StepOutputRef> {
        self.input_sources.iter().filter_map(|s| match s {
            InputSource::PreviousStepOutput(r) => Some(r),
            _ => None,
        })
    }

    pub fn declares_dependency_on(&self, step_id: &str) -> bool {
        self.depends_on.iter().any(|d| d == step_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareReference {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,
    /// Literal invocation string, e.g. `raw.filter(l_freq=1.0, h_freq=None)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<String>,
}

// =============================================================================
// PARAMETERS — object map OR array of records, one canonical shape in memory
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterShape {
    #[default]
    Absent,
    Map,
    Records,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterEntry {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

impl ParameterEntry {
    pub fn value(value: Value) -> Self {
        ParameterEntry {
            value,
            unit: None,
            data_type: None,
        }
    }
}

/// Canonical parameters. The authored shape is kept only so the step
/// serializes back the way it was written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawParameters", into = "RawParameters")]
pub struct Parameters {
    pub shape: ParameterShape,
    pub entries: IndexMap<String, ParameterEntry>,
    /// Names repeated in the list-of-records shape. The first record with a
    /// name is kept; later ones are dropped and listed here.
    pub duplicates: Vec<String>,
}

impl Parameters {
    pub fn is_absent(&self) -> bool {
        self.shape == ParameterShape::Absent
    }

    pub fn get(&self, name: &str) -> Option<&ParameterEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRecord {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawParameters {
    Records(Vec<ParameterRecord>),
    Map(Map<String, Value>),
}

impl From<RawParameters> for Parameters {
    fn from(raw: RawParameters) -> Self {
        match raw {
            RawParameters::Map(map) => Parameters {
                shape: ParameterShape::Map,
                entries: map
                    .into_iter()
                    .map(|(k, v)| (k, ParameterEntry::value(v)))
                    .collect(),
                duplicates: Vec::new(),
            },
            RawParameters::Records(records) => {
                let mut entries = IndexMap::with_capacity(records.len());
                let mut duplicates = Vec::new();
                for r in records {
                    if entries.contains_key(&r.name) {
                        duplicates.push(r.name);
                        continue;
                    }
                    entries.insert(
                        r.name,
                        ParameterEntry {
                            value: r.value,
                            unit: r.unit,
                            data_type: r.data_type,
                        },
                    );
                }
                Parameters {
                    shape: ParameterShape::Records,
                    entries,
                    duplicates,
                }
            }
        }
    }
}

impl From<Parameters> for RawParameters {
    fn from(params: Parameters) -> Self {
        match params.shape {
            ParameterShape::Records => RawParameters::Records(
                params
                    .entries
                    .into_iter()
                    .map(|(name, e)| ParameterRecord {
                        name,
                        value: e.value,
                        unit: e.unit,
                        data_type: e.data_type,
                    })
                    .collect(),
            ),
            ParameterShape::Map | ParameterShape::Absent => RawParameters::Map(
                params
                    .entries
                    .into_iter()
                    .map(|(name, e)| (name, e.value))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// INPUT SOURCES — tagged union over `sourceType`
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "sourceType")]
pub enum InputSource {
    #[serde(rename = "file")]
    File(LocatedSource),
    #[serde(rename = "resource")]
    Resource(LocatedSource),
    #[serde(rename = "previousStepOutput")]
    PreviousStepOutput(StepOutputRef),
    #[serde(rename = "variable")]
    Variable(NamedSource),
    #[serde(rename = "inlineData")]
    InlineData(InlineSource),
    #[serde(rename = "userDefined")]
    UserDefined(UserDefinedSource),
}

impl InputSource {
    pub fn source_type(&self) -> &'static str {
        match self {
            InputSource::File(_) => "file",
            InputSource::Resource(_) => "resource",
            InputSource::PreviousStepOutput(_) => "previousStepOutput",
            InputSource::Variable(_) => "variable",
            InputSource::InlineData(_) => "inlineData",
            InputSource::UserDefined(_) => "userDefined",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatedSource {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Weak reference to another step's output: `output_id` is matched against
/// the target step's output labels, not an index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutputRef {
    pub step_id: String,
    pub output_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineSource {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDefinedSource {
    pub details: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =============================================================================
// OUTPUT TARGETS — tagged union over `targetType`
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "targetType")]
pub enum OutputTarget {
    #[serde(rename = "file")]
    File(FileTarget),
    #[serde(rename = "in-memory")]
    InMemory(InMemoryTarget),
    #[serde(rename = "variable")]
    Variable(VariableTarget),
    #[serde(rename = "report")]
    Report(ReportTarget),
    #[serde(rename = "userDefined")]
    UserDefined(UserDefinedTarget),
    #[serde(rename = "inlineData")]
    InlineData(InlineTarget),
}

impl OutputTarget {
    pub fn target_type(&self) -> &'static str {
        match self {
            OutputTarget::File(_) => "file",
            OutputTarget::InMemory(_) => "in-memory",
            OutputTarget::Variable(_) => "variable",
            OutputTarget::Report(_) => "report",
            OutputTarget::UserDefined(_) => "userDefined",
            OutputTarget::InlineData(_) => "inlineData",
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            OutputTarget::File(t) => t.description.as_deref(),
            OutputTarget::InMemory(t) => t.description.as_deref(),
            OutputTarget::Variable(t) => t.description.as_deref(),
            OutputTarget::Report(t) => t.description.as_deref(),
            OutputTarget::UserDefined(t) => t.description.as_deref(),
            OutputTarget::InlineData(t) => t.description.as_deref(),
        }
    }

    /// Labels a `previousStepOutput.outputId` may match: the description,
    /// plus the name for variable and inlineData targets. Deduplicated.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.description().into_iter().collect();
        let name = match self {
            OutputTarget::Variable(t) => Some(t.name.as_str()),
            OutputTarget::InlineData(t) => t.name.as_deref(),
            _ => None,
        };
        if let Some(name) = name {
            if !labels.contains(&name) {
                labels.push(name);
            }
        }
        labels
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTarget {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemoryTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableTarget {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDefinedTarget {
    pub details: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineTarget {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
