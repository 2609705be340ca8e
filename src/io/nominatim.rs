use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::enrich::{GeocodeCandidate, Geocoder};
use crate::error::{MapError, Result};
use crate::model::{Bounds, LatLng};

/// Public OpenStreetMap Nominatim instance.
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
/// Nominatim's usage policy requires an identifying user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("carpool-map/", env!("CARGO_PKG_VERSION"));

/// Geocoder backed by a Nominatim-compatible `/search` endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(endpoint: impl Into<String>, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn search_url(&self) -> String {
        if self.endpoint.ends_with('/') {
            format!("{}search", self.endpoint)
        } else {
            format!("{}/search", self.endpoint)
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(level = "debug", skip(self))]
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", query), ("format", "jsonv2")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(MapError::Geocode(format!("search returned {status}: {text}")));
        }

        let body = response.text().await?;
        let candidates = parse_search_response(&body)?;
        debug!(count = candidates.len(), "search answered");
        Ok(candidates)
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    /// `[south, north, west, east]`, each as a decimal string.
    #[serde(default)]
    boundingbox: Option<Vec<String>>,
}

/// Decodes the JSON body of a Nominatim `/search?format=jsonv2` response.
pub fn parse_search_response(body: &str) -> Result<Vec<GeocodeCandidate>> {
    let places: Vec<Place> = serde_json::from_str(body)?;
    places.into_iter().map(place_to_candidate).collect()
}

fn place_to_candidate(place: Place) -> Result<GeocodeCandidate> {
    let center = LatLng::new(
        parse_degrees(&place.lat, "latitude")?,
        parse_degrees(&place.lon, "longitude")?,
    );
    let bounds = match place.boundingbox.as_deref() {
        Some([south, north, west, east]) => Some(Bounds::new(
            LatLng::new(parse_degrees(south, "south")?, parse_degrees(west, "west")?),
            LatLng::new(parse_degrees(north, "north")?, parse_degrees(east, "east")?),
        )),
        Some(other) => {
            debug!(len = other.len(), "ignoring malformed bounding box");
            None
        }
        None => None,
    };

    Ok(GeocodeCandidate {
        center,
        bounds,
        label: place.display_name,
    })
}

fn parse_degrees(text: &str, what: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| MapError::Geocode(format!("invalid {what} '{text}'")))
}
