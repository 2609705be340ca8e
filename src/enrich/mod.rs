//! Geocoding pass over the parsed locations.

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::diagnostics::{DiagnosticSink, Diagnostics};
use crate::error::{MapError, Result};
use crate::geo::{IMPLAUSIBLE_AREA, area_of_bounds};
use crate::model::{Bounds, LatLng, Location};

/// One answer from a geocoding service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub center: LatLng,
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub label: String,
}

/// Resolves free-text addresses. Candidates are ordered best first.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>>;
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        (**self).geocode(query).await
    }
}

/// Counts reported once every lookup has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichSummary {
    pub resolved: usize,
    pub failed: usize,
    /// Resolved locations whose match looked too large to trust.
    pub flagged: usize,
}

/// Outcome of a single lookup, before it is written back.
struct Resolution {
    center: LatLng,
    oversized: Option<(f64, String)>,
}

/// Assigns coordinates to locations through a [`Geocoder`].
pub struct Enricher<G> {
    geocoder: G,
    area_threshold: f64,
}

impl<G: Geocoder> Enricher<G> {
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            area_threshold: IMPLAUSIBLE_AREA,
        }
    }

    /// Overrides the bounding-box area (square metres) above which a match is
    /// reported as suspicious.
    pub fn with_area_threshold(mut self, area_threshold: f64) -> Self {
        self.area_threshold = area_threshold;
        self
    }

    pub fn area_threshold(&self) -> f64 {
        self.area_threshold
    }

    /// Geocodes every location concurrently and writes the results back.
    ///
    /// A failed lookup is recorded on its own location and never stops the
    /// others. The call returns only after every lookup has completed.
    #[instrument(level = "info", skip_all, fields(locations = locations.len()))]
    pub async fn enrich(
        &self,
        locations: &mut [Location],
        sink: &mut dyn DiagnosticSink,
    ) -> EnrichSummary {
        let lookups = locations
            .iter()
            .map(|location| self.resolve(location.name.as_str()));
        let outcomes = join_all(lookups).await;

        let mut diag = Diagnostics::new(sink);
        let mut summary = EnrichSummary::default();
        for (location, outcome) in locations.iter_mut().zip(outcomes) {
            match outcome {
                Ok(resolution) => {
                    if let Some((area, label)) = &resolution.oversized {
                        diag.warn(format!(
                            "Geocode for '{}' matched '{label}' covering {area:.0} m², \
                             the address is probably wrong",
                            location.name
                        ));
                        summary.flagged += 1;
                    }
                    location.coordinates = Some(resolution.center);
                    location.error = None;
                    summary.resolved += 1;
                }
                Err(err) => {
                    diag.error(format!("Could not geocode '{}': {err}", location.name));
                    location.coordinates = None;
                    location.error = Some(err.to_string());
                    summary.failed += 1;
                }
            }
        }

        debug!(?summary, "enrichment finished");
        summary
    }

    async fn resolve(&self, query: &str) -> Result<Resolution> {
        let candidates = self.geocoder.geocode(query).await?;
        let best = candidates
            .into_iter()
            .next()
            .ok_or_else(|| MapError::NoGeocodeResults(query.to_string()))?;

        let oversized = best.bounds.and_then(|bounds| {
            let area = area_of_bounds(&bounds);
            (area > self.area_threshold).then_some((area, best.label.clone()))
        });

        Ok(Resolution {
            center: best.center,
            oversized,
        })
    }
}
