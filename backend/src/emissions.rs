//! Coarse CO2 model: petrol car 192 g/km, EV 50 g/km, walking and cycling
//! emit nothing.

use shared::TravelMode;

const ICE_G_PER_KM: f64 = 192.0;
const EV_G_PER_KM: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Co2Estimate {
    pub co2_kg: f64,
    pub co2_savings_kg: f64,
}

/// Emissions of the trip and savings against a petrol car, in kg rounded to
/// grams. Driving is assumed to be electric.
pub fn estimate_co2(distance_m: f64, mode: TravelMode) -> Co2Estimate {
    let distance_km = distance_m / 1000.0;
    let (emitted_g, saved_g) = match mode {
        TravelMode::Walk | TravelMode::Cycle => (0.0, ICE_G_PER_KM * distance_km),
        TravelMode::Drive => (
            EV_G_PER_KM * distance_km,
            (ICE_G_PER_KM - EV_G_PER_KM) * distance_km,
        ),
    };
    Co2Estimate {
        co2_kg: round_to(emitted_g / 1000.0, 3),
        co2_savings_kg: round_to(saved_g / 1000.0, 3),
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
