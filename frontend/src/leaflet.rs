use serde_wasm_bindgen::to_value;
use shared::{Coordinate, RouteBounds};
use wasm_bindgen::prelude::{JsValue, wasm_bindgen};

use crate::endpoint::EndpointKind;
use crate::map::{MapView, OverlayLayer, PinIcon, PolylineStyle};

#[wasm_bindgen(module = "/leaflet_map.js")]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map(container_id: &str);
    #[wasm_bindgen(js_name = setView)]
    fn set_view_js(lat: f64, lon: f64, zoom: u8);
    #[wasm_bindgen(js_name = clearLayer)]
    fn clear_layer_js(layer: &str);
    #[wasm_bindgen(js_name = addPolyline)]
    fn add_polyline_js(layer: &str, coords: JsValue, style: JsValue);
    #[wasm_bindgen(js_name = fitBounds)]
    fn fit_bounds_js(south: f64, west: f64, north: f64, east: f64, pad_x: u32, pad_y: u32);
    #[wasm_bindgen(js_name = addMarker)]
    fn add_marker_js(layer: &str, lat: f64, lon: f64, icon: JsValue, popup_html: &str);
    #[wasm_bindgen(js_name = createEndpointMarker)]
    fn create_endpoint_marker_js(kind: &str, lat: f64, lon: f64, icon: JsValue);
    #[wasm_bindgen(js_name = moveEndpointMarker)]
    fn move_endpoint_marker_js(kind: &str, lat: f64, lon: f64, icon: JsValue);
    #[wasm_bindgen(js_name = removeEndpointMarker)]
    fn remove_endpoint_marker_js(kind: &str);
}

/// Leaflet map living in `leaflet_map.js`. Clicks and marker drags come back
/// as `map-click` / `marker-dragend` window events.
pub struct LeafletMap;

impl LeafletMap {
    pub fn mount(container_id: &str) -> Self {
        init_map(container_id);
        LeafletMap
    }
}

fn js<T: serde::Serialize + ?Sized>(value: &T) -> JsValue {
    to_value(value).unwrap_or_else(|err| {
        log::error!("failed to convert value for leaflet: {err}");
        JsValue::NULL
    })
}

impl MapView for LeafletMap {
    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        set_view_js(center.lat, center.lon, zoom);
    }

    fn clear_layer(&mut self, layer: OverlayLayer) {
        clear_layer_js(layer.as_str());
    }

    fn add_polyline(&mut self, layer: OverlayLayer, path: &[Coordinate], style: &PolylineStyle) {
        let latlngs: Vec<[f64; 2]> = path.iter().map(|c| [c.lat, c.lon]).collect();
        add_polyline_js(layer.as_str(), js(&latlngs), js(style));
    }

    fn fit_bounds(&mut self, bounds: RouteBounds, padding: [u32; 2]) {
        fit_bounds_js(
            bounds.min_lat,
            bounds.min_lon,
            bounds.max_lat,
            bounds.max_lon,
            padding[0],
            padding[1],
        );
    }

    fn add_marker(&mut self, layer: OverlayLayer, at: Coordinate, icon: &PinIcon, popup_html: &str) {
        add_marker_js(layer.as_str(), at.lat, at.lon, js(icon), popup_html);
    }

    fn create_endpoint_marker(&mut self, kind: EndpointKind, at: Coordinate, icon: &PinIcon) {
        create_endpoint_marker_js(kind.as_str(), at.lat, at.lon, js(icon));
    }

    fn move_endpoint_marker(&mut self, kind: EndpointKind, at: Coordinate, icon: &PinIcon) {
        move_endpoint_marker_js(kind.as_str(), at.lat, at.lon, js(icon));
    }

    fn remove_endpoint_marker(&mut self, kind: EndpointKind) {
        remove_endpoint_marker_js(kind.as_str());
    }
}
