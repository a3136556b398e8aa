//! Map surface: overlay layers, endpoint markers and station popups on top of
//! whatever renders the map (Leaflet in the browser, a recorder in tests).

use serde::Serialize;
use shared::{Coordinate, RouteBounds, Station};

use crate::endpoint::{EndpointKind, PickingMode};

pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 12.9716,
    lon: 77.5946,
};
pub const DEFAULT_ZOOM: u8 = 12;
pub const FIT_PADDING: [u32; 2] = [20, 20];

pub const ROUTE_STYLE: PolylineStyle = PolylineStyle {
    color: "#22c55e",
    weight: 6,
    opacity: 0.9,
};

const START_PIN_COLOR: &str = "#22c55e";
const END_PIN_COLOR: &str = "#ff3b3b";
const DEFAULT_STATION_NAME: &str = "Charging Station";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayLayer {
    Route,
    Stations,
}

impl OverlayLayer {
    pub fn as_str(self) -> &'static str {
        match self {
            OverlayLayer::Route => "route",
            OverlayLayer::Stations => "stations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolylineStyle {
    pub color: &'static str,
    pub weight: u32,
    pub opacity: f64,
}

/// HTML marker icon, mirrors Leaflet's `divIcon` options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinIcon {
    pub class_name: &'static str,
    pub html: String,
    pub icon_size: [u32; 2],
    pub icon_anchor: [u32; 2],
}

impl PinIcon {
    pub fn endpoint(kind: EndpointKind) -> Self {
        let (class_name, color) = match kind {
            EndpointKind::Start => ("pick-pin-start", START_PIN_COLOR),
            EndpointKind::End => ("pick-pin-end", END_PIN_COLOR),
        };
        Self {
            class_name,
            html: svg_pin(color),
            icon_size: [28, 28],
            icon_anchor: [14, 24],
        }
    }

    pub fn station() -> Self {
        Self {
            class_name: "ev-pin",
            html: "⚡".to_string(),
            icon_size: [24, 24],
            icon_anchor: [12, 12],
        }
    }
}

fn svg_pin(color: &str) -> String {
    format!(
        r#"<svg viewBox="0 0 24 24" width="28" height="28" xmlns="http://www.w3.org/2000/svg"><path fill="{color}" d="M12 2C8.134 2 5 5.134 5 9c0 5.25 7 13 7 13s7-7.75 7-13c0-3.866-3.134-7-7-7zm0 9.5a2.5 2.5 0 110-5 2.5 2.5 0 010 5z"/></svg>"#
    )
}

/// Rendering primitives the surface needs from the underlying map widget.
/// Endpoint markers are draggable; the widget reports drag-end back to the
/// app as [`crate::planner::Msg::MarkerDragged`].
pub trait MapView {
    fn set_view(&mut self, center: Coordinate, zoom: u8);
    fn clear_layer(&mut self, layer: OverlayLayer);
    fn add_polyline(&mut self, layer: OverlayLayer, path: &[Coordinate], style: &PolylineStyle);
    fn fit_bounds(&mut self, bounds: RouteBounds, padding: [u32; 2]);
    fn add_marker(&mut self, layer: OverlayLayer, at: Coordinate, icon: &PinIcon, popup_html: &str);
    fn create_endpoint_marker(&mut self, kind: EndpointKind, at: Coordinate, icon: &PinIcon);
    fn move_endpoint_marker(&mut self, kind: EndpointKind, at: Coordinate, icon: &PinIcon);
    fn remove_endpoint_marker(&mut self, kind: EndpointKind);
}

#[derive(Debug, Default, Clone, Copy)]
struct EndpointMarkers {
    start: Option<Coordinate>,
    end: Option<Coordinate>,
}

impl EndpointMarkers {
    fn slot(&mut self, kind: EndpointKind) -> &mut Option<Coordinate> {
        match kind {
            EndpointKind::Start => &mut self.start,
            EndpointKind::End => &mut self.end,
        }
    }

    fn get(&self, kind: EndpointKind) -> Option<Coordinate> {
        match kind {
            EndpointKind::Start => self.start,
            EndpointKind::End => self.end,
        }
    }
}

pub struct MapSurface<V> {
    view: V,
    markers: EndpointMarkers,
}

impl<V: MapView> MapSurface<V> {
    /// Centers the view on the default location with both overlay layers empty.
    pub fn new(mut view: V) -> Self {
        view.set_view(DEFAULT_CENTER, DEFAULT_ZOOM);
        view.clear_layer(OverlayLayer::Route);
        view.clear_layer(OverlayLayer::Stations);
        Self {
            view,
            markers: EndpointMarkers::default(),
        }
    }

    pub fn draw_route(&mut self, path: &[Coordinate]) {
        self.view.clear_layer(OverlayLayer::Route);
        let Some(bounds) = RouteBounds::from_path(path) else {
            return;
        };
        self.view.add_polyline(OverlayLayer::Route, path, &ROUTE_STYLE);
        self.view.fit_bounds(bounds, FIT_PADDING);
    }

    /// Rebuilds the stations layer. Stations lacking a coordinate are skipped.
    pub fn draw_stations(&mut self, stations: &[Station]) {
        self.view.clear_layer(OverlayLayer::Stations);
        let icon = PinIcon::station();
        for (station, at) in stations
            .iter()
            .filter_map(|station| station.coordinate().map(|at| (station, at)))
        {
            self.view
                .add_marker(OverlayLayer::Stations, at, &icon, &station_popup(station));
        }
    }

    /// Places (or moves) the marker for the endpoint targeted by `mode`.
    /// Returns the endpoint to update, `None` when not picking.
    pub fn handle_click(&mut self, mode: PickingMode, at: Coordinate) -> Option<EndpointKind> {
        let kind = mode.target()?;
        self.place_endpoint(kind, at);
        Some(kind)
    }

    pub fn place_endpoint(&mut self, kind: EndpointKind, at: Coordinate) {
        let icon = PinIcon::endpoint(kind);
        if self.markers.get(kind).is_some() {
            self.view.move_endpoint_marker(kind, at, &icon);
        } else {
            self.view.create_endpoint_marker(kind, at, &icon);
        }
        *self.markers.slot(kind) = Some(at);
    }

    /// Moves an existing marker, leaving absent markers absent.
    pub fn sync_endpoint(&mut self, kind: EndpointKind, at: Coordinate) {
        if self.markers.get(kind).is_some() {
            self.place_endpoint(kind, at);
        }
    }

    /// Records a position the widget already moved the marker to.
    pub fn marker_dragged(&mut self, kind: EndpointKind, at: Coordinate) -> bool {
        match self.markers.slot(kind) {
            Some(position) => {
                *position = at;
                true
            }
            None => false,
        }
    }

    pub fn marker(&self, kind: EndpointKind) -> Option<Coordinate> {
        self.markers.get(kind)
    }

    pub fn reset(&mut self) {
        self.view.clear_layer(OverlayLayer::Route);
        self.view.clear_layer(OverlayLayer::Stations);
        for kind in [EndpointKind::Start, EndpointKind::End] {
            if self.markers.slot(kind).take().is_some() {
                self.view.remove_endpoint_marker(kind);
            }
        }
        self.view.set_view(DEFAULT_CENTER, DEFAULT_ZOOM);
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }
}

pub fn station_popup(station: &Station) -> String {
    let name = non_empty(station.name.as_deref()).unwrap_or(DEFAULT_STATION_NAME);
    let mut popup = format!(
        "<b>{}</b><br/>{}<br/>",
        escape_html(name),
        escape_html(non_empty(station.address.as_deref()).unwrap_or_default())
    );
    if let Some(operator) = non_empty(station.operator.as_deref()) {
        popup.push_str(&format!("Operator: {}<br/>", escape_html(operator)));
    }
    if let Some(cost) = non_empty(station.usage_cost.as_deref()) {
        popup.push_str(&format!("Cost: {}<br/>", escape_html(cost)));
    }
    let connections = station
        .connections
        .iter()
        .map(|conn| {
            let power = match conn.power_kw {
                Some(kw) if kw != 0.0 => format!("{kw} kW"),
                _ => "n/a".to_string(),
            };
            let kind = non_empty(conn.connection_type.as_deref()).unwrap_or("—");
            format!("{power} · {}", escape_html(kind))
        })
        .collect::<Vec<_>>()
        .join("<br/>");
    popup.push_str(&connections);
    popup
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeMap, MarkerState};
    use shared::Connection;

    fn surface() -> MapSurface<FakeMap> {
        MapSurface::new(FakeMap::default())
    }

    #[test]
    fn new_surface_starts_at_default_view() {
        let map = surface();
        assert_eq!(map.view().view, Some((DEFAULT_CENTER, DEFAULT_ZOOM)));
        assert!(map.view().route.is_empty());
        assert!(map.view().stations.is_empty());
    }

    #[test]
    fn draw_route_fits_bounds() {
        let mut map = surface();
        let path = [Coordinate::new(12.9, 77.5), Coordinate::new(13.0, 77.7)];
        map.draw_route(&path);

        assert_eq!(map.view().route, vec![path.to_vec()]);
        let (bounds, padding) = map.view().fitted.unwrap();
        assert_eq!(bounds.min_lat, 12.9);
        assert_eq!(bounds.max_lon, 77.7);
        assert_eq!(padding, FIT_PADDING);
    }

    #[test]
    fn empty_route_clears_without_refit() {
        let mut map = surface();
        map.draw_route(&[Coordinate::new(1.0, 1.0)]);
        let fitted = map.view().fitted;
        map.draw_route(&[]);
        assert!(map.view().route.is_empty());
        assert_eq!(map.view().fitted, fitted);
    }

    #[test]
    fn stations_without_coordinates_are_skipped() {
        let mut map = surface();
        let stations = vec![
            Station {
                lat: Some(12.0),
                lon: Some(77.0),
                ..Station::default()
            },
            Station {
                lat: Some(12.0),
                lon: None,
                ..Station::default()
            },
        ];
        map.draw_stations(&stations);
        assert_eq!(map.view().stations.len(), 1);

        map.draw_stations(&[]);
        assert!(map.view().stations.is_empty());
    }

    #[test]
    fn click_without_picking_mode_is_ignored() {
        let mut map = surface();
        assert_eq!(map.handle_click(PickingMode::None, Coordinate::new(1.0, 2.0)), None);
        assert!(map.view().endpoints.is_empty());
    }

    #[test]
    fn second_click_moves_existing_marker() {
        let mut map = surface();
        map.handle_click(PickingMode::End, Coordinate::new(1.0, 2.0));
        map.handle_click(PickingMode::End, Coordinate::new(3.0, 4.0));

        let marker = &map.view().endpoints[&EndpointKind::End];
        assert_eq!(
            *marker,
            MarkerState {
                at: Coordinate::new(3.0, 4.0),
                color_class: "pick-pin-end",
                created: 1,
                moved: 1,
            }
        );
    }

    #[test]
    fn reset_removes_markers_and_layers() {
        let mut map = surface();
        map.draw_route(&[Coordinate::new(1.0, 1.0), Coordinate::new(2.0, 2.0)]);
        map.handle_click(PickingMode::Start, Coordinate::new(1.0, 2.0));
        map.reset();
        map.reset();

        assert!(map.view().endpoints.is_empty());
        assert!(map.view().route.is_empty());
        assert_eq!(map.marker(EndpointKind::Start), None);
        assert_eq!(map.view().view, Some((DEFAULT_CENTER, DEFAULT_ZOOM)));
        assert_eq!(map.view().removed, 1);
    }

    #[test]
    fn popup_lists_connections() {
        let station = Station {
            name: Some("Hub <1>".into()),
            address: Some("MG Road".into()),
            operator: Some("Tata Power".into()),
            usage_cost: None,
            connections: vec![
                Connection {
                    power_kw: Some(22.0),
                    connection_type: Some("Type 2".into()),
                    ..Connection::default()
                },
                Connection::default(),
            ],
            ..Station::default()
        };
        assert_eq!(
            station_popup(&station),
            "<b>Hub &lt;1&gt;</b><br/>MG Road<br/>Operator: Tata Power<br/>22 kW · Type 2<br/>n/a · —"
        );
    }

    #[test]
    fn popup_defaults_name() {
        let popup = station_popup(&Station::default());
        assert!(popup.starts_with("<b>Charging Station</b><br/><br/>"));
        assert!(!popup.contains("Operator"));
        assert!(!popup.contains("Cost"));
    }
}
