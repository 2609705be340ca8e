use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;

use crate::enrich::{GeocodeCandidate, Geocoder};
use crate::error::Result;

/// Offline geocoder answering from a fixed query → candidates table.
///
/// The JSON form is an object keyed by query text, each value an array of
/// candidates. Unknown queries resolve to no candidates.
#[derive(Debug, Clone, Default)]
pub struct FixtureGeocoder {
    entries: HashMap<String, Vec<GeocodeCandidate>>,
}

impl FixtureGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        let entries: HashMap<String, Vec<GeocodeCandidate>> = serde_json::from_str(&source)?;
        Ok(Self { entries })
    }

    /// Adds or replaces the answer for a query.
    pub fn insert(&mut self, query: impl Into<String>, candidates: Vec<GeocodeCandidate>) {
        self.entries.insert(query.into(), candidates);
    }

    pub fn with(mut self, query: impl Into<String>, candidates: Vec<GeocodeCandidate>) -> Self {
        self.insert(query, candidates);
        self
    }
}

#[async_trait]
impl Geocoder for FixtureGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        Ok(self.entries.get(query.trim()).cloned().unwrap_or_default())
    }
}
