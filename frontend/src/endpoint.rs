use serde::{Deserialize, Serialize};
use shared::{Coordinate, RouteEndpoint};

pub const MISSING_ENDPOINTS_MESSAGE: &str =
    "Please provide start and destination by typing or picking on the map";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Start,
    End,
}

impl EndpointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointKind::Start => "start",
            EndpointKind::End => "end",
        }
    }
}

/// Which endpoint the next map click sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickingMode {
    #[default]
    None,
    Start,
    End,
}

impl PickingMode {
    pub fn target(self) -> Option<EndpointKind> {
        match self {
            PickingMode::None => None,
            PickingMode::Start => Some(EndpointKind::Start),
            PickingMode::End => Some(EndpointKind::End),
        }
    }
}

impl From<EndpointKind> for PickingMode {
    fn from(kind: EndpointKind) -> Self {
        match kind {
            EndpointKind::Start => PickingMode::Start,
            EndpointKind::End => PickingMode::End,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Endpoint {
    pub display_text: String,
    pub coordinate: Option<Coordinate>,
}

impl Endpoint {
    /// Sets both the coordinate and the text shown in the input.
    pub fn apply_picked(&mut self, at: Coordinate) {
        self.display_text = format_picked(at);
        self.coordinate = Some(at);
    }

    pub fn valid_coordinate(&self) -> Option<Coordinate> {
        self.coordinate.filter(Coordinate::is_valid)
    }

    pub fn has_text(&self) -> bool {
        !self.display_text.trim().is_empty()
    }

    /// Coordinate when valid, else the trimmed text for server-side lookup.
    pub fn resolve(&self) -> RouteEndpoint {
        match self.valid_coordinate() {
            Some(coord) => RouteEndpoint::Coordinate(coord),
            None => RouteEndpoint::Text(self.display_text.trim().to_string()),
        }
    }

    pub fn clear(&mut self) {
        self.display_text.clear();
        self.coordinate = None;
    }
}

pub fn format_picked(at: Coordinate) -> String {
    format!("{:.5}, {:.5}", at.lat, at.lon)
}

/// Both endpoints typed, or both carrying a valid coordinate.
pub fn validate(start: &Endpoint, end: &Endpoint) -> Result<(RouteEndpoint, RouteEndpoint), &'static str> {
    let both_text = start.has_text() && end.has_text();
    let both_coords = start.valid_coordinate().is_some() && end.valid_coordinate().is_some();
    if !both_text && !both_coords {
        return Err(MISSING_ENDPOINTS_MESSAGE);
    }
    Ok((start.resolve(), end.resolve()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> Endpoint {
        Endpoint {
            display_text: text.into(),
            coordinate: None,
        }
    }

    #[test]
    fn picked_text_uses_five_decimals() {
        let mut endpoint = Endpoint::default();
        endpoint.apply_picked(Coordinate::new(12.9716, 77.5946));
        assert_eq!(endpoint.display_text, "12.97160, 77.59460");
        assert_eq!(endpoint.coordinate, Some(Coordinate::new(12.9716, 77.5946)));
    }

    #[test]
    fn empty_endpoints_fail_validation() {
        let err = validate(&Endpoint::default(), &typed("  ")).unwrap_err();
        assert_eq!(err, MISSING_ENDPOINTS_MESSAGE);
    }

    #[test]
    fn resolution_is_decided_per_endpoint() {
        let start = typed("Indiranagar");
        let mut end = Endpoint::default();
        end.apply_picked(Coordinate::new(12.9, 77.6));

        let (s, e) = validate(&start, &end).unwrap();
        assert_eq!(s, RouteEndpoint::Text("Indiranagar".into()));
        assert_eq!(e, RouteEndpoint::Coordinate(Coordinate::new(12.9, 77.6)));
    }

    #[test]
    fn coordinates_alone_pass_validation() {
        let start = Endpoint {
            display_text: String::new(),
            coordinate: Some(Coordinate::new(1.0, 2.0)),
        };
        let end = Endpoint {
            display_text: String::new(),
            coordinate: Some(Coordinate::new(3.0, 4.0)),
        };
        assert!(validate(&start, &end).is_ok());
    }

    #[test]
    fn nan_coordinate_falls_back_to_text() {
        let endpoint = Endpoint {
            display_text: " Koramangala ".into(),
            coordinate: Some(Coordinate::new(f64::NAN, 77.0)),
        };
        assert_eq!(endpoint.resolve(), RouteEndpoint::Text("Koramangala".into()));
    }
}
