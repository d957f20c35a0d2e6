pub mod error;
pub mod graph;
pub mod normalize;
pub mod options;
pub mod parse;
pub mod parser;
pub mod resolve;
pub mod validate;
pub mod wasm;

pub use error::{ErrorRecord, IssueKind};
pub use options::ValidationOptions;
pub use parse::PipelineDocument;
pub use validate::{validate, validate_json, validate_with, ValidationReport};
