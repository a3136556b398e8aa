//! OpenRouteService client: geocoding and directions.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use shared::{Coordinate, Suggestion, TravelMode};

use crate::error::{UpstreamError, http_client};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";
const AUTOCOMPLETE_SIZE: u32 = 5;

pub fn profile(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walk => "foot-walking",
        TravelMode::Cycle => "cycling-regular",
        TravelMode::Drive => "driving-car",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directions {
    /// `[lat, lon]` pairs.
    pub coordinates: Vec<[f64; 2]>,
    pub distance_m: f64,
    pub duration_s: f64,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection<G> {
    #[serde(default = "Vec::new")]
    features: Vec<Feature<G>>,
}

#[derive(Debug, Deserialize)]
struct Feature<G> {
    geometry: G,
    #[serde(default)]
    properties: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Clone)]
pub struct OrsClient {
    inner: reqwest::Client,
    base: Url,
    api_key: Option<String>,
}

impl OrsClient {
    pub fn new(base: &str, api_key: Option<String>) -> Result<Self, UpstreamError> {
        let base = base
            .parse()
            .map_err(|e| UpstreamError::Url(format!("{base} is not a valid url: {e}")))?;
        Ok(Self {
            inner: http_client(REQUEST_TIMEOUT)?,
            base,
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    /// Replaces the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, UpstreamError> {
        self.inner = http_client(timeout)?;
        Ok(self)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self, path: &str) -> Result<Url, UpstreamError> {
        self.base
            .join(path)
            .map_err(|e| UpstreamError::Url(format!("error joining url: {e}")))
    }

    fn key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    /// Up to five place suggestions for partially typed text.
    pub async fn autocomplete(&self, text: &str) -> Result<Vec<Suggestion>, UpstreamError> {
        let size = AUTOCOMPLETE_SIZE.to_string();
        let response = self
            .inner
            .get(self.url("/geocode/autocomplete")?)
            .query(&[("api_key", self.key()), ("text", text), ("size", size.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }
        let body: FeatureCollection<PointGeometry> = response.json().await?;
        Ok(body
            .features
            .into_iter()
            .filter_map(|feature| {
                let [lon, lat] = feature.geometry.coordinates[..] else {
                    return None;
                };
                let label = feature
                    .properties
                    .get("label")
                    .and_then(|label| label.as_str())
                    .map(str::to_string);
                Some(Suggestion { label, lat, lon })
            })
            .collect())
    }

    /// Best match for free text, `None` when nothing matched or the lookup
    /// was refused.
    pub async fn geocode(&self, text: &str) -> Result<Option<Coordinate>, UpstreamError> {
        let response = self
            .inner
            .get(self.url("/geocode/search")?)
            .query(&[("api_key", self.key()), ("text", text), ("size", "1")])
            .send()
            .await?;
        if !response.status().is_success() {
            tracing::warn!("geocoding '{text}' failed with {}", response.status());
            return Ok(None);
        }
        let body: FeatureCollection<PointGeometry> = response.json().await?;
        Ok(body.features.first().and_then(|feature| {
            match feature.geometry.coordinates[..] {
                [lon, lat, ..] => Some(Coordinate::new(lat, lon)),
                _ => None,
            }
        }))
    }

    pub async fn directions(
        &self,
        start: Coordinate,
        end: Coordinate,
        mode: TravelMode,
    ) -> Result<Directions, UpstreamError> {
        let url = self.url(&format!("/v2/directions/{}/geojson", profile(mode)))?;
        let payload = json!({
            "coordinates": [[start.lon, start.lat], [end.lon, end.lat]],
        });
        let response = self
            .inner
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.key())
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }
        let body: FeatureCollection<LineGeometry> = response.json().await?;
        let feature = body
            .features
            .into_iter()
            .next()
            .ok_or(UpstreamError::EmptyRoute)?;
        let summary: Summary = feature
            .properties
            .get("summary")
            .cloned()
            .and_then(|summary| serde_json::from_value(summary).ok())
            .unwrap_or_default();

        Ok(Directions {
            coordinates: feature
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| [lat, lon])
                .collect(),
            distance_m: summary.distance,
            duration_s: summary.duration,
        })
    }
}
