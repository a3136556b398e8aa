//! OpenChargeMap client and the mapping from its POI records to `Station`s.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use shared::{Connection, Station};

use crate::error::{UpstreamError, http_client};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BASE_URL: &str = "https://api.openchargemap.io";
const MAX_RESULTS: u32 = 50;
const USER_AGENT: &str = "EcoRoute/1.0";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Titled {
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddressInfo {
    title: Option<String>,
    address_line1: Option<String>,
    town: Option<String>,
    state_or_province: Option<String>,
    postcode: Option<String>,
    country: Option<Titled>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PoiConnection {
    #[serde(rename = "PowerKW")]
    power_kw: Option<f64>,
    current_type: Option<Titled>,
    connection_type: Option<Titled>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Poi {
    address_info: Option<AddressInfo>,
    #[serde(default)]
    connections: Option<Vec<PoiConnection>>,
    status_type: Option<Titled>,
    usage_cost: Option<String>,
    operator_info: Option<Titled>,
    data_provider: Option<Titled>,
    number_of_points: Option<u32>,
}

fn title(value: Option<Titled>) -> Option<String> {
    value.and_then(|t| t.title)
}

impl Poi {
    /// `None` for records without address information.
    pub fn into_station(self) -> Option<Station> {
        let addr = self.address_info?;
        let address = [
            addr.address_line1,
            addr.town,
            addr.state_or_province,
            addr.postcode,
            title(addr.country),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        Some(Station {
            lat: addr.latitude,
            lon: addr.longitude,
            name: addr.title,
            address: Some(address),
            operator: title(self.operator_info),
            usage_cost: self.usage_cost,
            network: title(self.data_provider),
            num_points: self.number_of_points,
            status: title(self.status_type),
            connections: self
                .connections
                .unwrap_or_default()
                .into_iter()
                .map(|c| Connection {
                    power_kw: c.power_kw,
                    current_type: title(c.current_type),
                    connection_type: title(c.connection_type),
                })
                .collect(),
        })
    }
}

#[derive(Clone)]
pub struct OcmClient {
    inner: reqwest::Client,
    base: Url,
    api_key: Option<String>,
}

impl OcmClient {
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

    /// Stations within `distance_km` of the given point.
    pub async fn nearby(&self, lat: f64, lon: f64, distance_km: f64) -> Result<Vec<Station>, UpstreamError> {
        let url = self
            .base
            .join("/v3/poi/")
            .map_err(|e| UpstreamError::Url(format!("error joining url: {e}")))?;

        let mut params = vec![
            ("output", "json".to_string()),
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("distance", distance_km.to_string()),
            ("distanceunit", "KM".to_string()),
            ("maxresults", MAX_RESULTS.to_string()),
        ];
        let mut request = self
            .inner
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key.as_str());
            params.push(("key", key.clone()));
        }

        let response = request.query(&params).send().await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }
        let pois: Vec<Poi> = response.json().await?;
        Ok(pois.into_iter().filter_map(Poi::into_station).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poi_maps_to_station() {
        let poi: Poi = serde_json::from_str(
            r#"{
                "AddressInfo": {
                    "Title": "Forum Mall",
                    "AddressLine1": "Hosur Road",
                    "Town": "Bengaluru",
                    "StateOrProvince": "",
                    "Postcode": "560029",
                    "Country": {"Title": "India"},
                    "Latitude": 12.934,
                    "Longitude": 77.611
                },
                "Connections": [
                    {"PowerKW": 60.0, "CurrentType": {"Title": "DC"}, "ConnectionType": {"Title": "CCS (Type 2)"}},
                    {"PowerKW": null, "ConnectionType": null}
                ],
                "StatusType": {"Title": "Operational"},
                "UsageCost": "₹18/kWh",
                "OperatorInfo": {"Title": "Tata Power"},
                "DataProvider": {"Title": "Open Charge Map Contributors"},
                "NumberOfPoints": 2
            }"#,
        )
        .unwrap();

        let station = poi.into_station().unwrap();
        assert_eq!(station.name.as_deref(), Some("Forum Mall"));
        assert_eq!(
            station.address.as_deref(),
            Some("Hosur Road, Bengaluru, 560029, India")
        );
        assert_eq!(station.lat, Some(12.934));
        assert_eq!(station.operator.as_deref(), Some("Tata Power"));
        assert_eq!(station.status.as_deref(), Some("Operational"));
        assert_eq!(station.num_points, Some(2));
        assert_eq!(station.connections.len(), 2);
        assert_eq!(station.connections[0].power_kw, Some(60.0));
        assert_eq!(station.connections[0].current_type.as_deref(), Some("DC"));
        assert_eq!(station.connections[1], Connection::default());
    }

    #[test]
    fn poi_without_address_is_skipped() {
        let poi: Poi = serde_json::from_str(r#"{"UsageCost": "free"}"#).unwrap();
        assert!(poi.into_station().is_none());
    }
}
