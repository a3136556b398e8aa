use std::collections::HashMap;

use shared::{Coordinate, RouteBounds};

use crate::endpoint::EndpointKind;
use crate::map::{MapView, OverlayLayer, PinIcon, PolylineStyle};

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerState {
    pub at: Coordinate,
    pub color_class: &'static str,
    pub created: usize,
    pub moved: usize,
}

/// Records what a real map widget would display.
#[derive(Debug, Default)]
pub struct FakeMap {
    pub view: Option<(Coordinate, u8)>,
    pub route: Vec<Vec<Coordinate>>,
    pub stations: Vec<(Coordinate, String)>,
    pub fitted: Option<(RouteBounds, [u32; 2])>,
    pub endpoints: HashMap<EndpointKind, MarkerState>,
    pub removed: usize,
}

impl MapView for FakeMap {
    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.view = Some((center, zoom));
    }

    fn clear_layer(&mut self, layer: OverlayLayer) {
        match layer {
            OverlayLayer::Route => self.route.clear(),
            OverlayLayer::Stations => self.stations.clear(),
        }
    }

    fn add_polyline(&mut self, layer: OverlayLayer, path: &[Coordinate], _style: &PolylineStyle) {
        assert_eq!(layer, OverlayLayer::Route);
        self.route.push(path.to_vec());
    }

    fn fit_bounds(&mut self, bounds: RouteBounds, padding: [u32; 2]) {
        self.fitted = Some((bounds, padding));
    }

    fn add_marker(&mut self, layer: OverlayLayer, at: Coordinate, _icon: &PinIcon, popup_html: &str) {
        assert_eq!(layer, OverlayLayer::Stations);
        self.stations.push((at, popup_html.to_string()));
    }

    fn create_endpoint_marker(&mut self, kind: EndpointKind, at: Coordinate, icon: &PinIcon) {
        let previous = self.endpoints.insert(
            kind,
            MarkerState {
                at,
                color_class: icon.class_name,
                created: 1,
                moved: 0,
            },
        );
        assert!(previous.is_none(), "marker for {kind:?} created twice");
    }

    fn move_endpoint_marker(&mut self, kind: EndpointKind, at: Coordinate, _icon: &PinIcon) {
        let marker = self
            .endpoints
            .get_mut(&kind)
            .expect("moved a marker that was never created");
        marker.at = at;
        marker.moved += 1;
    }

    fn remove_endpoint_marker(&mut self, kind: EndpointKind) {
        self.endpoints.remove(&kind);
        self.removed += 1;
    }
}
