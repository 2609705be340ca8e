use std::path::Path;

use tracing::{debug, info, instrument};

use crate::diagnostics::DiagnosticSink;
use crate::enrich::{EnrichSummary, Enricher, Geocoder};
use crate::error::{MapError, Result};
use crate::flatten::build_workbook;
use crate::io::{excel_read, excel_write, json};
use crate::model::EntityGraph;
use crate::roster;

/// File formats the pipeline reads and writes, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Excel,
    Json,
}

/// Guesses the format of a file from its extension.
pub fn detect_format(path: &Path) -> Option<FileFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "xlsx" | "xlsm" => Some(FileFormat::Excel),
        "json" => Some(FileFormat::Json),
        _ => None,
    }
}

fn require_format(path: &Path) -> Result<FileFormat> {
    detect_format(path).ok_or_else(|| MapError::UnsupportedFormat(path.to_path_buf()))
}

/// Loads the raw string matrix of a roster.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn load_table(input: &Path, sheet: Option<&str>) -> Result<Vec<Vec<String>>> {
    if !input.exists() {
        return Err(MapError::MissingInput(input.to_path_buf()));
    }
    let table = match require_format(input)? {
        FileFormat::Excel => excel_read::read_table(input, sheet)?,
        FileFormat::Json => json::read_table(input)?,
    };
    info!(row_count = table.len(), "read roster table");
    Ok(table)
}

/// Loads and parses a roster file.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn parse_file(
    input: &Path,
    sheet: Option<&str>,
    sink: &mut dyn DiagnosticSink,
) -> Result<EntityGraph> {
    let table = load_table(input, sheet)?;
    let graph = roster::parse(&table, sink)?;
    info!(
        guardians = graph.guardians.len(),
        dependents = graph.dependents.len(),
        vehicles = graph.vehicles.len(),
        locations = graph.locations.len(),
        "parsed roster"
    );
    Ok(graph)
}

/// Loads, parses and geocodes a roster file.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub async fn map_file<G: Geocoder>(
    input: &Path,
    sheet: Option<&str>,
    enricher: &Enricher<G>,
    sink: &mut dyn DiagnosticSink,
) -> Result<(EntityGraph, EnrichSummary)> {
    let mut graph = parse_file(input, sheet, sink)?;
    let summary = enricher.enrich(&mut graph.locations, sink).await;
    info!(
        resolved = summary.resolved,
        failed = summary.failed,
        flagged = summary.flagged,
        "geocoded locations"
    );
    Ok((graph, summary))
}

/// Writes the graph in the format implied by the output extension.
#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub fn export(graph: &EntityGraph, output: &Path) -> Result<()> {
    match require_format(output)? {
        FileFormat::Json => json::write_graph(output, graph),
        FileFormat::Excel => {
            let workbook = build_workbook(graph);
            debug!(sheet_count = workbook.tables.len(), "workbook constructed");
            excel_write::write_workbook(output, &workbook)
        }
    }
}
