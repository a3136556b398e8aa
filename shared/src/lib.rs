use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components are finite numbers.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    pub fn from_lat_lon(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[0],
            lon: pair[1],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Walk,
    Cycle,
    Drive,
}

impl TravelMode {
    pub const ALL: [TravelMode; 3] = [TravelMode::Walk, TravelMode::Cycle, TravelMode::Drive];

    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Walk => "walk",
            TravelMode::Cycle => "cycle",
            TravelMode::Drive => "drive",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown travel mode '{0}'")]
pub struct UnknownTravelMode(pub String);

impl FromStr for TravelMode {
    type Err = UnknownTravelMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "walk" => Ok(TravelMode::Walk),
            "cycle" => Ok(TravelMode::Cycle),
            "drive" => Ok(TravelMode::Drive),
            other => Err(UnknownTravelMode(other.to_string())),
        }
    }
}

/// A route endpoint as sent to `/api/route`: either an explicit coordinate or
/// free text the server geocodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteEndpoint {
    Coordinate(Coordinate),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: RouteEndpoint,
    pub end: RouteEndpoint,
    #[serde(default = "default_mode")]
    pub mode: String,
}

pub fn default_mode() -> String {
    TravelMode::default().as_str().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    /// `[lat, lon]` pairs along the route.
    pub coordinates: Vec<[f64; 2]>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub co2_kg: f64,
    pub co2_savings_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl RouteResponse {
    pub fn path(&self) -> Vec<Coordinate> {
        self.coordinates
            .iter()
            .copied()
            .map(Coordinate::from_lat_lon)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl RouteBounds {
    pub fn from_path(path: &[Coordinate]) -> Option<Self> {
        let first = path.first()?;
        let seed = RouteBounds {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };
        Some(path.iter().skip(1).fold(seed, |acc, c| RouteBounds {
            min_lat: acc.min_lat.min(c.lat),
            max_lat: acc.max_lat.max(c.lat),
            min_lon: acc.min_lon.min(c.lon),
            max_lon: acc.max_lon.max(c.lon),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub label: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Suggestion {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    /// Label shown in the suggestion list, falling back to `"lat, lon"`.
    pub fn display_label(&self) -> String {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("{}, {}", self.lat, self.lon),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(rename = "powerKW", default)]
    pub power_kw: Option<f64>,
    #[serde(rename = "currentType", default)]
    pub current_type: Option<String>,
    #[serde(rename = "connectionType", default)]
    pub connection_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub usage_cost: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub num_points: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Station {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.lat?, self.lon?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationsResponse {
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Error body returned by every `/api/*` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_endpoint_accepts_text_or_coordinate() {
        let req: RouteRequest = serde_json::from_str(
            r#"{"start": "MG Road", "end": {"lat": 12.97, "lon": 77.59}, "mode": "cycle"}"#,
        )
        .unwrap();
        assert_eq!(req.start, RouteEndpoint::Text("MG Road".into()));
        assert_eq!(
            req.end,
            RouteEndpoint::Coordinate(Coordinate::new(12.97, 77.59))
        );
        assert_eq!(req.mode, "cycle");
    }

    #[test]
    fn route_request_mode_defaults_to_walk() {
        let req: RouteRequest = serde_json::from_str(r#"{"start": "a", "end": "b"}"#).unwrap();
        assert_eq!(req.mode, "walk");
    }

    #[test]
    fn travel_mode_parses_case_insensitively() {
        assert_eq!(" Drive ".parse::<TravelMode>(), Ok(TravelMode::Drive));
        assert!("fly".parse::<TravelMode>().is_err());
    }

    #[test]
    fn unknown_travel_mode_names_the_input() {
        let err = "Fly".parse::<TravelMode>().unwrap_err();
        assert_eq!(err, UnknownTravelMode("fly".into()));
        assert_eq!(err.to_string(), "unknown travel mode 'fly'");
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn station_connection_uses_camel_case_keys() {
        let station: Station = serde_json::from_str(
            r#"{"lat": 1.0, "lon": 2.0, "connections": [{"powerKW": 22.0, "connectionType": "Type 2"}]}"#,
        )
        .unwrap();
        assert_eq!(station.connections[0].power_kw, Some(22.0));
        assert_eq!(
            station.connections[0].connection_type.as_deref(),
            Some("Type 2")
        );
        assert!(station.name.is_none());
    }

    #[test]
    fn suggestion_label_falls_back_to_coordinates() {
        let s = Suggestion {
            label: None,
            lat: 12.5,
            lon: 77.0,
        };
        assert_eq!(s.display_label(), "12.5, 77");
    }

    #[test]
    fn bounds_cover_whole_path() {
        let path = [
            Coordinate::new(1.0, 5.0),
            Coordinate::new(-2.0, 7.0),
            Coordinate::new(0.5, 4.0),
        ];
        let bounds = RouteBounds::from_path(&path).unwrap();
        assert_eq!(bounds.min_lat, -2.0);
        assert_eq!(bounds.max_lat, 1.0);
        assert_eq!(bounds.min_lon, 4.0);
        assert_eq!(bounds.max_lon, 7.0);
        assert!(RouteBounds::from_path(&[]).is_none());
    }
}
