use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::{MapError, Result};
use crate::model::{EntityGraph, Marker};

/// Reads a table stored as JSON.
///
/// Accepts either a bare array of rows or an object carrying the rows under
/// `values`, the shape spreadsheet APIs return. Numbers and booleans are
/// rendered as text and `null` becomes an empty cell.
pub fn read_table(path: &Path) -> Result<Vec<Vec<String>>> {
    let source = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&source)?;
    parse_table(&document)
}

/// Converts an already parsed JSON document into a table.
pub fn parse_table(document: &Value) -> Result<Vec<Vec<String>>> {
    let rows = match document {
        Value::Array(rows) => rows,
        Value::Object(object) => match object.get("values") {
            Some(Value::Array(rows)) => rows,
            Some(_) => {
                return Err(MapError::InvalidTable("'values' must be an array".into()));
            }
            // Sheets APIs omit `values` entirely for an empty range.
            None => return Ok(Vec::new()),
        },
        _ => {
            return Err(MapError::InvalidTable(
                "expected an array of rows or an object with 'values'".into(),
            ));
        }
    };

    rows.iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Array(cells) => cells.iter().map(cell_to_string).collect(),
            _ => Err(MapError::InvalidTable(format!(
                "row {} is not an array",
                index + 1
            ))),
        })
        .collect()
}

fn cell_to_string(cell: &Value) -> Result<String> {
    Ok(match cell {
        Value::String(value) => value.clone(),
        Value::Number(value) => value.to_string(),
        Value::Bool(value) => value.to_string(),
        Value::Null => String::new(),
        other => {
            return Err(MapError::InvalidTable(format!(
                "cells must be scalars, found {other}"
            )));
        }
    })
}

#[derive(Serialize)]
struct GraphDocument<'a> {
    #[serde(flatten)]
    graph: &'a EntityGraph,
    /// Glyph per location, in location order.
    markers: Vec<Marker>,
}

/// Writes the graph as pretty-printed JSON together with the marker chosen
/// for every location.
pub fn write_graph(path: &Path, graph: &EntityGraph) -> Result<()> {
    let json_string = graph_to_string(graph)?;
    fs::write(path, json_string)?;
    Ok(())
}

pub fn graph_to_string(graph: &EntityGraph) -> Result<String> {
    let document = GraphDocument {
        graph,
        markers: graph
            .locations
            .iter()
            .map(|location| graph.marker_for(location))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
