//! Row processing: applies a [`Schema`] to the data rows of a roster sheet.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::diagnostics::{DiagnosticSink, Diagnostics};
use crate::error::{MapError, Result};
use crate::model::{Attributes, Dependent, EntityGraph, Guardian, Location, Vehicle};
use crate::schema::{Group, Schema};

/// Parses a roster table whose first row is the header.
///
/// Any fatal problem aborts the whole parse; nothing of the graph built so far
/// is returned. Duplicate names only produce warnings.
#[instrument(level = "debug", skip_all, fields(rows = table.len()))]
pub fn parse<R, S>(table: &[R], sink: &mut dyn DiagnosticSink) -> Result<EntityGraph>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let Some((header, rows)) = table.split_first() else {
        return Err(Diagnostics::new(sink).fatal(MapError::EmptyTable));
    };
    let schema = Schema::infer(header.as_ref(), sink)?;
    apply(&schema, rows, sink)
}

/// Builds the entity graph from data rows (header excluded).
pub fn apply<R, S>(schema: &Schema, rows: &[R], sink: &mut dyn DiagnosticSink) -> Result<EntityGraph>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut diag = Diagnostics::new(sink);
    let mut seen = SeenNames::default();
    let mut graph = EntityGraph::default();

    for (index, row) in rows.iter().enumerate() {
        let row = RowView(row.as_ref());
        if row.is_blank() {
            debug!(row = index + 2, "skipping blank row");
            continue;
        }

        let mut guardian_names: Vec<String> = Vec::new();
        for group in &schema.guardian_groups {
            let name = row.cell(group.column);
            if name.is_empty() {
                continue;
            }
            if !seen.guardians.insert(name.to_string()) {
                diag.warn(format!(
                    "Duplicate parent '{name}' on row {}, keeping the first entry",
                    index + 2
                ));
                continue;
            }
            guardian_names.push(name.to_string());
            graph.guardians.insert(
                name.to_string(),
                Guardian {
                    name: name.to_string(),
                    data: row.attributes(group),
                    row: index,
                    dependents: Vec::new(),
                },
            );
        }

        let mut dependent_names: Vec<String> = Vec::new();
        for group in &schema.dependent_groups {
            let name = row.cell(group.column);
            if name.is_empty() {
                continue;
            }
            if !seen.dependents.insert(name.to_string()) {
                diag.warn(format!(
                    "Duplicate child '{name}' on row {}, keeping the first entry",
                    index + 2
                ));
                continue;
            }
            dependent_names.push(name.to_string());
            graph.dependents.insert(
                name.to_string(),
                Dependent {
                    name: name.to_string(),
                    data: row.attributes(group),
                    row: index,
                    guardians: guardian_names.clone(),
                },
            );
        }

        // Guardians learn their dependents only once the whole row is read.
        for name in &guardian_names {
            if let Some(guardian) = graph.guardians.get_mut(name) {
                guardian.dependents = dependent_names.clone();
            }
        }

        let capacity = row.cell(schema.capacity_column);
        let vehicle = if capacity.is_empty() {
            None
        } else {
            let capacity = capacity.parse::<u32>().map_err(|_| {
                diag.fatal(MapError::InvalidCapacity {
                    row: index + 2,
                    value: capacity.to_string(),
                })
            })?;
            graph.vehicles.push(Vehicle {
                row: index,
                capacity,
                guardians: guardian_names.clone(),
            });
            Some(index)
        };

        let address = row.cell(schema.address_column);
        if address.is_empty() {
            return Err(diag.fatal(MapError::BlankAddress { row: index + 2 }));
        }
        let mut location = Location::new(index, address);
        location.vehicle = vehicle;
        location.dependents = dependent_names;
        location.guardians = guardian_names;
        graph.locations.push(location);
    }

    debug!(
        guardians = graph.guardians.len(),
        dependents = graph.dependents.len(),
        vehicles = graph.vehicles.len(),
        locations = graph.locations.len(),
        "roster parsed"
    );
    Ok(graph)
}

/// Names already turned into entities during one parse.
#[derive(Debug, Default)]
struct SeenNames {
    guardians: HashSet<String>,
    dependents: HashSet<String>,
}

struct RowView<'a, S>(&'a [S]);

impl<S: AsRef<str>> RowView<'_, S> {
    /// Trimmed cell text; cells past the end of a short row read as empty.
    fn cell(&self, column: usize) -> &str {
        self.0.get(column).map(|cell| cell.as_ref().trim()).unwrap_or("")
    }

    fn is_blank(&self) -> bool {
        self.0.iter().all(|cell| cell.as_ref().trim().is_empty())
    }

    fn attributes(&self, group: &Group) -> Attributes {
        group
            .fields
            .iter()
            .map(|field| (field.name.clone(), self.cell(field.column).to_string()))
            .collect()
    }
}
