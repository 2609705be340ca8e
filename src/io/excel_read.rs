use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::error::{MapError, Result};

/// Reads one worksheet as a matrix of strings, header row first.
///
/// Without a sheet name the first worksheet of the workbook is used.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let range = match sheet {
        Some(name) => read_required_sheet(&mut workbook, name)?,
        None => read_first_sheet(&mut workbook)?,
    };

    let table: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
        .collect();
    debug!(rows = table.len(), width = range.width(), "worksheet loaded");
    Ok(table)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| MapError::InvalidTable(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(MapError::from)?;
    Ok(range)
}

fn read_first_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| MapError::InvalidTable("workbook has no worksheets".into()))?;
    let range = range_result.map_err(MapError::from)?;
    Ok(range)
}

/// Renders a cell the way a spreadsheet UI would show it. Whole numbers lose
/// their fractional part so `4.0` reads back as `4`.
fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
