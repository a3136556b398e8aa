//! The planner controller. User actions and network completions arrive as
//! [`Msg`]s; everything the controller needs done outside itself (timers,
//! requests, alerts, frames) leaves as [`Effect`]s for the shell to run.

use shared::{Coordinate, RouteRequest, RouteResponse, StationsResponse, Suggestion, TravelMode};

use crate::api::ApiError;
use crate::autocomplete::{Autocomplete, BLUR_DISMISS_MS, DEBOUNCE_MS};
use crate::debounce::TimerToken;
use crate::endpoint::{Endpoint, EndpointKind, PickingMode, validate};
use crate::map::{MapSurface, MapView};
use crate::stats::StatsPresenter;
use crate::theme::{Theme, ThemeStore, ThemeToggle};

pub const STATION_RADIUS_KM: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    InputChanged(EndpointKind, String),
    InputBlurred(EndpointKind),
    DebounceElapsed(EndpointKind, TimerToken),
    SuggestionsFetched(EndpointKind, TimerToken, Result<Vec<Suggestion>, ApiError>),
    SuggestionSelected(EndpointKind, usize),
    SuggestionsDismissed(EndpointKind),
    PickRequested(EndpointKind),
    MapClicked(Coordinate),
    MarkerDragged(EndpointKind, Coordinate),
    ModeChanged(TravelMode),
    FindRoute,
    RouteFetched(Result<RouteResponse, ApiError>),
    StationsFetched(Result<StationsResponse, ApiError>),
    AnimationFrame(f64),
    Reset,
    ToggleTheme,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartTimer {
        field: EndpointKind,
        token: TimerToken,
        delay_ms: u32,
    },
    CancelTimer(EndpointKind),
    FetchSuggestions {
        field: EndpointKind,
        token: TimerToken,
        query: String,
    },
    DismissSuggestionsAfter {
        field: EndpointKind,
        delay_ms: u32,
    },
    FetchRoute(RouteRequest),
    FetchStations {
        center: Coordinate,
        distance_km: f64,
    },
    Alert(String),
    RequestAnimationFrame,
    ApplyTheme(Theme),
}

#[derive(Debug, Default)]
struct Field {
    endpoint: Endpoint,
    autocomplete: Autocomplete,
}

pub struct Planner<M, S> {
    map: MapSurface<M>,
    theme: ThemeToggle<S>,
    start: Field,
    end: Field,
    picking: PickingMode,
    mode: TravelMode,
    stats: StatsPresenter,
    /// A frame callback is queued in the shell and will come back as
    /// `Msg::AnimationFrame`. Reset does not cancel it.
    frame_pending: bool,
    flows_in_flight: usize,
}

impl<M: MapView, S: ThemeStore> Planner<M, S> {
    /// Builds the controller around its collaborators. The returned effects
    /// apply the stored theme.
    pub fn create(map: M, store: S) -> (Self, Vec<Effect>) {
        let theme = ThemeToggle::load(store);
        let effects = vec![Effect::ApplyTheme(theme.current())];
        let planner = Self {
            map: MapSurface::new(map),
            theme,
            start: Field::default(),
            end: Field::default(),
            picking: PickingMode::None,
            mode: TravelMode::default(),
            stats: StatsPresenter::default(),
            frame_pending: false,
            flows_in_flight: 0,
        };
        (planner, effects)
    }

    /// Clears the map and hands the collaborators back.
    pub fn teardown(mut self) -> (M, S) {
        self.map.reset();
        (self.map.into_view(), self.theme.into_store())
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::InputChanged(kind, text) => {
                let field = self.field_mut(kind);
                field.endpoint.display_text = text;
                let token = field.autocomplete.input_changed();
                vec![Effect::StartTimer {
                    field: kind,
                    token,
                    delay_ms: DEBOUNCE_MS,
                }]
            }
            Msg::DebounceElapsed(kind, token) => {
                let field = self.field_mut(kind);
                match field
                    .autocomplete
                    .timer_fired(token, &field.endpoint.display_text)
                {
                    Some(query) => vec![Effect::FetchSuggestions {
                        field: kind,
                        token,
                        query,
                    }],
                    None => Vec::new(),
                }
            }
            Msg::SuggestionsFetched(kind, token, result) => {
                self.field_mut(kind)
                    .autocomplete
                    .suggestions_fetched(token, result);
                Vec::new()
            }
            Msg::SuggestionSelected(kind, index) => {
                let Some(chosen) = self.field_mut(kind).autocomplete.select(index) else {
                    return Vec::new();
                };
                let at = chosen.coordinate();
                let endpoint = &mut self.field_mut(kind).endpoint;
                endpoint.display_text = chosen.display_label();
                endpoint.coordinate = Some(at);
                self.map.sync_endpoint(kind, at);
                Vec::new()
            }
            Msg::InputBlurred(kind) => vec![Effect::DismissSuggestionsAfter {
                field: kind,
                delay_ms: BLUR_DISMISS_MS,
            }],
            Msg::SuggestionsDismissed(kind) => {
                self.field_mut(kind).autocomplete.dismiss();
                Vec::new()
            }
            Msg::PickRequested(kind) => {
                self.picking = kind.into();
                Vec::new()
            }
            Msg::MapClicked(at) => {
                if let Some(kind) = self.map.handle_click(self.picking, at) {
                    log::debug!("picked {} at {:.5},{:.5}", kind.as_str(), at.lat, at.lon);
                    self.field_mut(kind).endpoint.apply_picked(at);
                    self.picking = PickingMode::None;
                }
                Vec::new()
            }
            Msg::MarkerDragged(kind, at) => {
                if self.map.marker_dragged(kind, at) {
                    self.field_mut(kind).endpoint.apply_picked(at);
                }
                Vec::new()
            }
            Msg::ModeChanged(mode) => {
                self.mode = mode;
                Vec::new()
            }
            Msg::FindRoute => self.find_route(),
            Msg::RouteFetched(result) => self.route_fetched(result),
            Msg::StationsFetched(result) => {
                let stations = match result {
                    Ok(body) => {
                        if let Some(warning) = body.warning {
                            log::warn!("{warning}");
                        }
                        body.stations
                    }
                    Err(err) => {
                        log::warn!("stations fetch failed: {err}");
                        Vec::new()
                    }
                };
                self.map.draw_stations(&stations);
                self.finish_flow();
                Vec::new()
            }
            Msg::AnimationFrame(delta_ms) => {
                self.frame_pending = false;
                let mut effects = Vec::new();
                if self.stats.tick(delta_ms) {
                    self.request_frame(&mut effects);
                }
                effects
            }
            Msg::Reset => self.reset(),
            Msg::ToggleTheme => vec![Effect::ApplyTheme(self.theme.toggle())],
        }
    }

    fn find_route(&mut self) -> Vec<Effect> {
        let (start, end) = match validate(&self.start.endpoint, &self.end.endpoint) {
            Ok(resolved) => resolved,
            Err(message) => return vec![Effect::Alert(message.to_string())],
        };
        self.flows_in_flight += 1;
        vec![Effect::FetchRoute(RouteRequest {
            start,
            end,
            mode: self.mode.as_str().to_string(),
        })]
    }

    fn route_fetched(&mut self, result: Result<RouteResponse, ApiError>) -> Vec<Effect> {
        let route = match result {
            Ok(route) => route,
            Err(err) => {
                log::error!("route request failed: {err}");
                self.finish_flow();
                return vec![Effect::Alert(err.route_message())];
            }
        };

        let path = route.path();
        self.map.draw_route(&path);

        let mut effects = Vec::new();
        self.request_frame(&mut effects);
        self.stats.update(
            route.distance_m,
            route.duration_s,
            route.co2_kg,
            route.co2_savings_kg,
        );

        match midpoint(&path) {
            Some(center) => effects.push(Effect::FetchStations {
                center,
                distance_km: STATION_RADIUS_KM,
            }),
            None => self.finish_flow(),
        }
        effects
    }

    /// Keeps at most one frame callback queued.
    fn request_frame(&mut self, effects: &mut Vec<Effect>) {
        if !self.frame_pending {
            self.frame_pending = true;
            effects.push(Effect::RequestAnimationFrame);
        }
    }

    fn finish_flow(&mut self) {
        self.flows_in_flight = self.flows_in_flight.saturating_sub(1);
    }

    fn reset(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        for kind in [EndpointKind::Start, EndpointKind::End] {
            let field = self.field_mut(kind);
            field.endpoint.clear();
            field.autocomplete.reset();
            effects.push(Effect::CancelTimer(kind));
        }
        self.picking = PickingMode::None;
        self.stats.reset();
        self.map.reset();
        effects
    }

    fn field(&self, kind: EndpointKind) -> &Field {
        match kind {
            EndpointKind::Start => &self.start,
            EndpointKind::End => &self.end,
        }
    }

    fn field_mut(&mut self, kind: EndpointKind) -> &mut Field {
        match kind {
            EndpointKind::Start => &mut self.start,
            EndpointKind::End => &mut self.end,
        }
    }

    pub fn endpoint(&self, kind: EndpointKind) -> &Endpoint {
        &self.field(kind).endpoint
    }

    pub fn suggestions(&self, kind: EndpointKind) -> &[Suggestion] {
        self.field(kind).autocomplete.suggestions()
    }

    pub fn picking(&self) -> PickingMode {
        self.picking
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    pub fn stats(&self) -> &StatsPresenter {
        &self.stats
    }

    pub fn is_loading(&self) -> bool {
        self.flows_in_flight > 0
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    pub fn map(&self) -> &MapSurface<M> {
        &self.map
    }
}

/// The coordinate at index `len / 2`.
pub fn midpoint(path: &[Coordinate]) -> Option<Coordinate> {
    path.get(path.len() / 2).copied()
}
