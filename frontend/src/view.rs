use seed::{prelude::*, virtual_dom::AtValue, *};
use shared::TravelMode;

use crate::endpoint::{EndpointKind, PickingMode};
use crate::planner::Msg;
use crate::theme::Theme;
use crate::Model;

pub fn view(model: &Model) -> Node<Msg> {
    let planner = &model.planner;
    div![
        C!["planner"],
        view_header(planner.theme()),
        view_endpoint(model, EndpointKind::Start, "Start"),
        view_endpoint(model, EndpointKind::End, "Destination"),
        view_mode_select(planner.mode()),
        div![
            C!["actions"],
            button![
                "Find route",
                attrs! { At::Type => "button", At::Id => "routeBtn" },
                ev(Ev::Click, |_| Msg::FindRoute),
            ],
            button![
                "Reset",
                attrs! { At::Type => "button", At::Id => "resetBtn" },
                ev(Ev::Click, |_| Msg::Reset),
            ],
        ],
        view_stats(model),
        div![
            C!["loader", IF!(!planner.is_loading() => "hidden")],
            attrs! { At::Id => "loader" },
            "Planning route…",
        ],
    ]
}

fn view_header(theme: Theme) -> Node<Msg> {
    header![
        h1!["EcoRoute planner"],
        button![
            C!["theme-toggle"],
            attrs! { At::Type => "button", At::Id => "themeToggle" },
            match theme {
                Theme::Light => "🌙 Dark",
                Theme::Dark => "☀ Light",
            },
            ev(Ev::Click, |_| Msg::ToggleTheme),
        ],
    ]
}

fn view_endpoint(model: &Model, kind: EndpointKind, label: &str) -> Node<Msg> {
    let planner = &model.planner;
    let picking = planner.picking() == PickingMode::from(kind);
    let suggestions = planner.suggestions(kind);

    div![
        C!["endpoint", format!("endpoint-{}", kind.as_str())],
        label![label],
        div![
            C!["endpoint-row"],
            input![
                attrs! {
                    At::Type => "text",
                    At::Id => format!("{}Input", kind.as_str()),
                    At::Value => planner.endpoint(kind).display_text.as_str(),
                    At::Placeholder => "Type a place or pick on the map",
                    At::AutoComplete => "off",
                    At::SpellCheck => "false",
                },
                input_ev(Ev::Input, move |value| Msg::InputChanged(kind, value)),
                ev(Ev::Blur, move |_| Msg::InputBlurred(kind)),
            ],
            button![
                C!["pick-btn", IF!(picking => "active")],
                attrs! {
                    At::Type => "button",
                    At::Title => "Pick on map",
                },
                "📍",
                ev(Ev::Click, move |_| Msg::PickRequested(kind)),
            ],
        ],
        div![
            C!["suggest"],
            if suggestions.is_empty() {
                empty![]
            } else {
                div![
                    C!["item"],
                    suggestions.iter().enumerate().map(|(idx, suggestion)| {
                        button![
                            attrs! { At::Type => "button" },
                            suggestion.display_label(),
                            ev(Ev::Click, move |_| Msg::SuggestionSelected(kind, idx)),
                        ]
                    }),
                ]
            }
        ],
    ]
}

fn view_mode_select(current: TravelMode) -> Node<Msg> {
    div![
        C!["mode"],
        label!["Travel mode"],
        select![
            attrs! { At::Id => "modeSelect" },
            TravelMode::ALL.iter().map(|mode| {
                option![
                    attrs! {
                        At::Value => mode.as_str(),
                        At::Selected => bool_attr(*mode == current),
                    },
                    match mode {
                        TravelMode::Walk => "Walk",
                        TravelMode::Cycle => "Cycle",
                        TravelMode::Drive => "Drive (EV)",
                    },
                ]
            }),
            input_ev(Ev::Change, |value| value.parse::<TravelMode>().ok().map(Msg::ModeChanged)),
        ],
    ]
}

fn view_stats(model: &Model) -> Node<Msg> {
    let stats = model.planner.stats();
    let card = |label: &str, id: &str, value: &str| {
        div![
            C!["stat-card"],
            span![C!["label"], label],
            strong![attrs! { At::Id => id }, value],
        ]
    };

    div![
        C!["stats"],
        card("Distance", "statDistance", stats.distance()),
        card("Duration", "statDuration", stats.duration()),
        card("CO2", "statCO2", stats.co2()),
        card("CO2 saved", "statCO2Save", stats.co2_savings()),
    ]
}

fn bool_attr(value: bool) -> AtValue {
    if value {
        AtValue::Some("true".into())
    } else {
        AtValue::Ignored
    }
}
