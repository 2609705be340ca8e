use std::path::PathBuf;

use thiserror::Error;

use crate::schema::ColumnRole;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, MapError>;

/// Error type covering the failures that can occur while a roster is loaded,
/// parsed, geocoded, or exported.
#[derive(Debug, Error)]
pub enum MapError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Transport failures talking to a geocoding service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The source contained no header row.
    #[error("The sheet is empty, expected a header row")]
    EmptyTable,

    /// Raised when a table source does not hold a matrix of strings.
    #[error("invalid table: {0}")]
    InvalidTable(String),

    /// Two header cells normalise to the same text.
    #[error("Duplicate header found: {0}")]
    DuplicateHeader(String),

    /// A required role column is absent from the header.
    #[error("No {0} column set")]
    MissingColumn(&'static str),

    /// An attribute column names a group that has no name column.
    #[error(
        "Unknown {} column: {role} {group} referenced in column {column}",
        .role.to_lowercase()
    )]
    UnknownGroup {
        role: &'static str,
        group: String,
        column: usize,
    },

    /// Inference tried to consume a column that already has a role. This is a
    /// bug in the header classifier, not bad input.
    #[error("This is a bug! Column {column} claimed as {second} after {first}")]
    ColumnClaimedTwice {
        column: usize,
        first: ColumnRole,
        second: ColumnRole,
    },

    /// A data row has no address.
    #[error("Address for row {row} is blank!")]
    BlankAddress { row: usize },

    /// A capacity cell holds something other than a non-negative integer.
    #[error("Passenger Capacity for row {row} is not a whole number: '{value}'")]
    InvalidCapacity { row: usize, value: String },

    /// The geocoder answered with an empty candidate list.
    #[error("no geocoding results for '{0}'")]
    NoGeocodeResults(String),

    /// The geocoder answered with something unusable.
    #[error("geocoding failed: {0}")]
    Geocode(String),

    /// Raised when the CLI is pointed at a file type it cannot handle.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
