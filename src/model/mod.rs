use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-form attribute values keyed by the field name taken from the header.
/// Values are kept as the raw cell text.
pub type Attributes = BTreeMap<String, String>;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Rectangular extent returned by a geocoder, given by its corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }
}

/// Adult entry of the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guardian {
    pub name: String,
    /// Values of the group's attribute columns on the row the guardian came from.
    pub data: Attributes,
    /// Zero-based data row index.
    pub row: usize,
    /// Dependents created on the same row.
    pub dependents: Vec<String>,
}

/// Minor entry of the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependent {
    pub name: String,
    pub data: Attributes,
    pub row: usize,
    /// Guardians of the row as they stood when the dependent was read.
    pub guardians: Vec<String>,
}

/// A car offered on a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub row: usize,
    pub capacity: u32,
    pub guardians: Vec<String>,
}

/// The address of a row, geocoded after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    /// Address text exactly as it appears in the sheet.
    pub name: String,
    /// `None` until enrichment resolves the address.
    pub coordinates: Option<LatLng>,
    /// Row index of the vehicle declared on the same row.
    pub vehicle: Option<usize>,
    pub dependents: Vec<String>,
    pub guardians: Vec<String>,
    pub error: Option<String>,
}

impl Location {
    pub fn new(row: usize, name: impl Into<String>) -> Self {
        Self {
            row,
            name: name.into(),
            coordinates: None,
            vehicle: None,
            dependents: Vec::new(),
            guardians: Vec::new(),
            error: None,
        }
    }
}

/// Glyph a map renderer should use for a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Vehicle,
    Standard,
    Error,
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Marker::Vehicle => write!(f, "vehicle"),
            Marker::Standard => write!(f, "standard"),
            Marker::Error => write!(f, "error"),
        }
    }
}

/// Everything read from one roster sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityGraph {
    pub guardians: BTreeMap<String, Guardian>,
    pub dependents: BTreeMap<String, Dependent>,
    pub vehicles: Vec<Vehicle>,
    pub locations: Vec<Location>,
}

impl EntityGraph {
    /// Looks up the vehicle a location points at.
    pub fn vehicle_for(&self, location: &Location) -> Option<&Vehicle> {
        let row = location.vehicle?;
        self.vehicles.iter().find(|vehicle| vehicle.row == row)
    }

    /// Picks the map glyph for a location.
    pub fn marker_for(&self, location: &Location) -> Marker {
        if location.error.is_some() {
            return Marker::Error;
        }
        match location.vehicle {
            None => Marker::Standard,
            Some(_) if self.vehicle_for(location).is_some() => Marker::Vehicle,
            Some(_) => Marker::Error,
        }
    }

    /// Total seats offered across all vehicles.
    pub fn seat_count(&self) -> u32 {
        self.vehicles.iter().map(|vehicle| vehicle.capacity).sum()
    }
}
