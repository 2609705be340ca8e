use std::collections::{BTreeSet, HashSet};

use crate::model::{Attributes, EntityGraph};

/// Sheet listing guardians.
pub const GUARDIANS_SHEET: &str = "Guardians";
/// Sheet listing dependents.
pub const DEPENDENTS_SHEET: &str = "Dependents";
/// Sheet listing vehicles.
pub const VEHICLES_SHEET: &str = "Vehicles";
/// Sheet listing locations and their coordinates.
pub const LOCATIONS_SHEET: &str = "Locations";

/// Separator used when a list of names is stored in one cell.
const NAME_SEPARATOR: &str = "; ";

/// A single exported cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    fn names(names: &[String]) -> Self {
        Cell::text(names.join(NAME_SEPARATOR))
    }
}

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    fn new(sheet_name: &str, columns: Vec<String>) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }
}

/// Represents all tables required to materialise the Excel workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

impl WorkbookData {
    pub fn table(&self, sheet_name: &str) -> Option<&SheetTable> {
        self.tables.iter().find(|table| table.sheet_name == sheet_name)
    }
}

/// Flattens the graph into one sheet per entity kind. Row numbers are
/// written 1-based as they appear in the source sheet (header is row 1).
pub fn build_workbook(graph: &EntityGraph) -> WorkbookData {
    let guardians = attribute_table(
        GUARDIANS_SHEET,
        "dependents",
        graph.guardians.values().map(|guardian| {
            (
                guardian.name.as_str(),
                guardian.row,
                guardian.dependents.as_slice(),
                &guardian.data,
            )
        }),
    );
    let dependents = attribute_table(
        DEPENDENTS_SHEET,
        "guardians",
        graph.dependents.values().map(|dependent| {
            (
                dependent.name.as_str(),
                dependent.row,
                dependent.guardians.as_slice(),
                &dependent.data,
            )
        }),
    );

    let mut vehicles = SheetTable::new(
        VEHICLES_SHEET,
        columns(&["row", "capacity", "guardians"]),
    );
    for vehicle in &graph.vehicles {
        vehicles.rows.push(vec![
            sheet_row(vehicle.row),
            Cell::Number(f64::from(vehicle.capacity)),
            Cell::names(&vehicle.guardians),
        ]);
    }

    let mut locations = SheetTable::new(
        LOCATIONS_SHEET,
        columns(&[
            "row",
            "address",
            "lat",
            "lng",
            "vehicle row",
            "guardians",
            "dependents",
            "marker",
            "error",
        ]),
    );
    for location in &graph.locations {
        let (lat, lng) = match location.coordinates {
            Some(point) => (Cell::Number(point.lat), Cell::Number(point.lng)),
            None => (Cell::Empty, Cell::Empty),
        };
        locations.rows.push(vec![
            sheet_row(location.row),
            Cell::text(location.name.clone()),
            lat,
            lng,
            location.vehicle.map(sheet_row).unwrap_or(Cell::Empty),
            Cell::names(&location.guardians),
            Cell::names(&location.dependents),
            Cell::Text(graph.marker_for(location).to_string()),
            location.error.clone().map(Cell::text).unwrap_or(Cell::Empty),
        ]);
    }

    WorkbookData {
        tables: vec![guardians, dependents, vehicles, locations],
    }
}

fn attribute_table<'a>(
    sheet_name: &str,
    links_column: &str,
    entries: impl Iterator<Item = (&'a str, usize, &'a [String], &'a Attributes)> + Clone,
) -> SheetTable {
    let fields: BTreeSet<&str> = entries
        .clone()
        .flat_map(|(_, _, _, data)| data.keys().map(String::as_str))
        .collect();

    let mut names = ColumnNames::default();
    let mut header = columns(&["name", "row", links_column]);
    for fixed in &header {
        names.claim(fixed);
    }
    for field in &fields {
        let column = names.assign(field);
        header.push(column);
    }
    let mut table = SheetTable::new(sheet_name, header);

    for (name, row, links, data) in entries {
        let mut cells = Vec::with_capacity(table.columns.len());
        cells.push(Cell::text(name));
        cells.push(sheet_row(row));
        cells.push(Cell::names(links));
        for field in &fields {
            cells.push(data.get(*field).cloned().map(Cell::text).unwrap_or(Cell::Empty));
        }
        table.rows.push(cells);
    }

    table
}

/// Excel tables compare header names case-insensitively, so an attribute
/// called `Name` or `row` collides with a fixed column.
#[derive(Debug, Default)]
struct ColumnNames {
    used: HashSet<String>,
}

impl ColumnNames {
    fn claim(&mut self, name: &str) {
        self.used.insert(name.to_lowercase());
    }

    fn assign(&mut self, raw: &str) -> String {
        if self.used.insert(raw.to_lowercase()) {
            return raw.to_string();
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{raw}_{counter}");
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn sheet_row(index: usize) -> Cell {
    Cell::Number((index + 2) as f64)
}
