//! Core library for the carpool-map command line application.
//!
//! A carpool roster is a spreadsheet whose header declares groups of parents
//! and children (`Parent 1`, `Parent 1 Phone`, `Child 1`, ...), a
//! `Passenger Capacity` column and an `Address` column. [`schema`] infers that
//! layout from the header, [`roster`] turns the rows into an [`EntityGraph`],
//! and [`enrich`] geocodes every address through a [`enrich::Geocoder`] using
//! the checks in [`geo`]. Loaders and exporters live under [`io`] and
//! [`flatten`]; [`pipeline`] strings them together for the CLI.

pub mod diagnostics;
pub mod enrich;
pub mod error;
pub mod flatten;
pub mod geo;
pub mod io;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod roster;
pub mod schema;

pub use diagnostics::{DiagnosticSink, DiscardSink, Severity};
pub use enrich::{EnrichSummary, Enricher, GeocodeCandidate, Geocoder};
pub use error::{MapError, Result};
pub use model::{Dependent, EntityGraph, Guardian, LatLng, Location, Marker, Vehicle};
pub use roster::parse;
pub use schema::Schema;
