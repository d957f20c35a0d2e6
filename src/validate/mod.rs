//! Document validation: contract checks → reference resolution → graph
//! validation, aggregated into one `ValidationReport`.
//!
//! Pure and synchronous. Each call builds its own indices and graph, so
//! independent documents can be validated in parallel.

pub mod document;
pub mod report;

pub use report::ValidationReport;

use crate::error::ErrorRecord;
use crate::graph::{consistency, topo, DependencyGraph};
use crate::options::ValidationOptions;
use crate::parse::{self, ParsedDocument, PipelineDocument};
use crate::resolve::{self, StepTable};

/// Validate a typed document with default options.
pub fn validate(document: &PipelineDocument) -> ValidationReport {
    validate_with(document, &ValidationOptions::default())
}

pub fn validate_with(doc: &PipelineDocument, options: &ValidationOptions) -> ValidationReport {
    let positions: Vec<usize> = (1..=doc.processing_steps.len()).collect();
    let mut errors = document::check_header(doc, doc.processing_steps.len());
    errors.extend(document::check_steps(&doc.processing_steps, &positions, &[]));
    analyze(doc, std::iter::empty::<&str>(), errors, options)
}

/// Parse and validate a JSON string. Input that is not a signalJourney
/// document at all yields a report with exactly one error.
pub fn validate_json(json: &str, options: &ValidationOptions) -> ValidationReport {
    match parse::parse_document(json) {
        Ok(parsed) => validate_parsed(&parsed, options),
        Err(fatal) => {
            tracing::info!(error = %fatal, "signalJourney document rejected");
            ValidationReport::fatal(fatal)
        }
    }
}

/// Validate the output of [`parse::parse_document`], including the steps
/// it had to reject.
pub fn validate_parsed(parsed: &ParsedDocument, options: &ValidationOptions) -> ValidationReport {
    let doc = &parsed.document;
    let mut errors = document::check_header(doc, doc.processing_steps.len() + parsed.rejected.len());
    errors.extend(parsed.rejected.iter().flat_map(|r| r.errors.iter().cloned()));
    errors.extend(document::check_steps(
        &doc.processing_steps,
        &parsed.positions,
        &parsed.rejected,
    ));
    analyze(doc, parsed.rejected_ids(), errors, options)
}

fn analyze<'a, I>(
    document: &'a PipelineDocument,
    rejected_ids: I,
    mut errors: Vec<ErrorRecord>,
    options: &ValidationOptions,
) -> ValidationReport
where
    I: IntoIterator<Item = &'a str>,
{
    let table = StepTable::build(&document.processing_steps).with_opaque(rejected_ids);

    let resolution = resolve::resolve(&table);
    errors.extend(resolution.errors.iter().cloned());

    let graph = DependencyGraph::build(&table, &resolution);
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built dependency graph"
    );

    let warnings = if options.check_declared_dependencies {
        consistency::missing_declared_dependencies(&table, &graph)
    } else {
        Vec::new()
    };

    let order = match topo::execution_order(&graph) {
        Ok(order) => Some(order),
        Err(cycles) => {
            errors.extend(cycles.into_iter().map(|cycle| {
                ErrorRecord::cyclic(cycle.into_iter().map(|i| table.id(i).to_string()).collect())
            }));
            None
        }
    };

    let valid = errors.is_empty() && !(options.deny_warnings && !warnings.is_empty());
    let execution_order = order
        .filter(|_| valid)
        .map(|order| order.into_iter().map(|i| table.id(i).to_string()).collect());

    tracing::info!(
        pipeline = %document.pipeline_info.name,
        valid,
        errors = errors.len(),
        warnings = warnings.len(),
        "validated signalJourney document"
    );

    ValidationReport {
        valid,
        execution_order,
        errors,
        warnings,
    }
}
