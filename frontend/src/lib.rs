pub mod api;
pub mod autocomplete;
pub mod debounce;
pub mod endpoint;
pub mod leaflet;
pub mod map;
pub mod planner;
pub mod stats;
pub mod theme;
mod view;

#[cfg(test)]
mod testing;

use seed::{app::CmdHandle, prelude::*};
use serde::Deserialize;
use shared::Coordinate;
use wasm_bindgen::{JsCast, prelude::wasm_bindgen};

use crate::endpoint::EndpointKind;
use crate::leaflet::LeafletMap;
use crate::planner::{Effect, Msg, Planner};
use crate::theme::{AppThemeStore, Theme};

const MAP_CONTAINER_ID: &str = "map";

pub struct Model {
    planner: Planner<LeafletMap, AppThemeStore>,
    timers: DebounceTimers,
}

/// Browser timers backing each field's debouncer. Dropping a handle aborts
/// the timer.
#[derive(Default)]
struct DebounceTimers {
    start: Option<CmdHandle>,
    end: Option<CmdHandle>,
}

impl DebounceTimers {
    fn slot(&mut self, field: EndpointKind) -> &mut Option<CmdHandle> {
        match field {
            EndpointKind::Start => &mut self.start,
            EndpointKind::End => &mut self.end,
        }
    }
}

#[derive(Deserialize)]
struct MapClickPayload {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct MarkerDragPayload {
    kind: EndpointKind,
    lat: f64,
    lon: f64,
}

fn event_detail<T: for<'de> Deserialize<'de>>(event: web_sys::Event) -> Option<T> {
    let event = event.dyn_into::<web_sys::CustomEvent>().ok()?;
    match serde_wasm_bindgen::from_value(event.detail()) {
        Ok(payload) => Some(payload),
        Err(err) => {
            log::warn!("ignoring malformed {} event: {err}", event.type_());
            None
        }
    }
}

fn init(_: Url, orders: &mut impl Orders<Msg>) -> Model {
    orders.stream(streams::window_event(Ev::from("map-click"), |event| {
        event_detail::<MapClickPayload>(event)
            .map(|payload| Msg::MapClicked(Coordinate::new(payload.lat, payload.lon)))
    }));
    orders.stream(streams::window_event(Ev::from("marker-dragend"), |event| {
        event_detail::<MarkerDragPayload>(event).map(|payload| {
            Msg::MarkerDragged(payload.kind, Coordinate::new(payload.lat, payload.lon))
        })
    }));

    let map = LeafletMap::mount(MAP_CONTAINER_ID);
    let (planner, effects) = Planner::create(map, AppThemeStore::open());
    let mut model = Model {
        planner,
        timers: DebounceTimers::default(),
    };
    run_effects(effects, &mut model.timers, orders);
    model
}

fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    let effects = model.planner.update(msg);
    run_effects(effects, &mut model.timers, orders);
}

fn run_effects(effects: Vec<Effect>, timers: &mut DebounceTimers, orders: &mut impl Orders<Msg>) {
    for effect in effects {
        match effect {
            Effect::StartTimer {
                field,
                token,
                delay_ms,
            } => {
                let handle = orders.perform_cmd_with_handle(cmds::timeout(delay_ms, move || {
                    Msg::DebounceElapsed(field, token)
                }));
                *timers.slot(field) = Some(handle);
            }
            Effect::CancelTimer(field) => {
                timers.slot(field).take();
            }
            Effect::FetchSuggestions {
                field,
                token,
                query,
            } => {
                orders.perform_cmd(async move {
                    Msg::SuggestionsFetched(field, token, api::fetch_suggestions(query).await)
                });
            }
            Effect::DismissSuggestionsAfter { field, delay_ms } => {
                orders.perform_cmd(cmds::timeout(delay_ms, move || {
                    Msg::SuggestionsDismissed(field)
                }));
            }
            Effect::FetchRoute(payload) => {
                orders.perform_cmd(async move { Msg::RouteFetched(api::fetch_route(payload).await) });
            }
            Effect::FetchStations {
                center,
                distance_km,
            } => {
                orders.perform_cmd(async move {
                    Msg::StationsFetched(api::fetch_stations(center, distance_km).await)
                });
            }
            Effect::Alert(message) => alert(&message),
            Effect::RequestAnimationFrame => {
                orders.after_next_render(|info| {
                    Msg::AnimationFrame(info.timestamp_delta.unwrap_or_default())
                });
            }
            Effect::ApplyTheme(theme) => apply_theme(theme),
        }
    }
}

fn alert(message: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(err) = window.alert_with_message(message) {
        log::error!("alert failed: {err:?}");
    }
}

fn apply_theme(theme: Theme) {
    let Some(root) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.document_element())
    else {
        return;
    };
    if let Err(err) = root
        .class_list()
        .toggle_with_force("light", theme == Theme::Light)
    {
        log::warn!("failed to apply {} theme: {err:?}", theme.as_str());
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::warn_1(&format!("logger already installed: {err}").into());
    }
    App::start("app", init, update, view::view);
}
