//! Trip metrics panel: animated distance/CO2 values and the duration label.

use std::f64::consts::PI;

pub const PLACEHOLDER: &str = "-";
pub const ANIMATION_MS: f64 = 700.0;

/// Ease-out-cosine interpolation between two values, sampled by elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    duration_ms: f64,
    elapsed_ms: f64,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            duration_ms,
            elapsed_ms: 0.0,
        }
    }

    /// Advances by `delta_ms` and returns the value at the new position.
    pub fn advance(&mut self, delta_ms: f64) -> f64 {
        self.elapsed_ms += delta_ms.max(0.0);
        self.value()
    }

    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).min(1.0)
    }

    pub fn value(&self) -> f64 {
        ease_out_cosine(self.from, self.to, self.progress())
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }
}

pub fn ease_out_cosine(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * (1.0 - (PI * t).cos()) / 2.0
}

#[derive(Debug, Clone)]
struct AnimatedStat {
    text: String,
    tween: Option<Tween>,
    format: fn(f64) -> String,
}

impl AnimatedStat {
    fn new(format: fn(f64) -> String) -> Self {
        Self {
            text: PLACEHOLDER.to_string(),
            tween: None,
            format,
        }
    }

    fn animate_to(&mut self, target: f64) {
        let from = parse_leading_number(&self.text);
        self.tween = Some(Tween::new(from, target, ANIMATION_MS));
    }

    /// Returns true while the animation still needs frames.
    fn tick(&mut self, delta_ms: f64) -> bool {
        let Some(tween) = self.tween.as_mut() else {
            return false;
        };
        let value = tween.advance(delta_ms);
        self.text = (self.format)(value);
        if tween.is_finished() {
            self.tween = None;
            false
        } else {
            true
        }
    }

    fn reset(&mut self) {
        self.text = PLACEHOLDER.to_string();
        self.tween = None;
    }
}

#[derive(Debug, Clone)]
pub struct StatsPresenter {
    distance: AnimatedStat,
    duration: String,
    co2: AnimatedStat,
    co2_savings: AnimatedStat,
}

impl Default for StatsPresenter {
    fn default() -> Self {
        Self {
            distance: AnimatedStat::new(format_km),
            duration: PLACEHOLDER.to_string(),
            co2: AnimatedStat::new(format_kg),
            co2_savings: AnimatedStat::new(format_kg),
        }
    }
}

impl StatsPresenter {
    /// Starts animating towards the new metrics. The caller drives frames
    /// through [`StatsPresenter::tick`].
    pub fn update(&mut self, distance_m: f64, duration_s: f64, co2_kg: f64, co2_savings_kg: f64) {
        self.distance.animate_to(distance_m / 1000.0);
        self.duration = format_duration(duration_s);
        self.co2.animate_to(co2_kg);
        self.co2_savings.animate_to(co2_savings_kg);
    }

    pub fn tick(&mut self, delta_ms: f64) -> bool {
        let distance = self.distance.tick(delta_ms);
        let co2 = self.co2.tick(delta_ms);
        let savings = self.co2_savings.tick(delta_ms);
        distance || co2 || savings
    }

    pub fn is_animating(&self) -> bool {
        self.distance.tween.is_some() || self.co2.tween.is_some() || self.co2_savings.tween.is_some()
    }

    pub fn reset(&mut self) {
        self.distance.reset();
        self.duration = PLACEHOLDER.to_string();
        self.co2.reset();
        self.co2_savings.reset();
    }

    pub fn distance(&self) -> &str {
        &self.distance.text
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn co2(&self) -> &str {
        &self.co2.text
    }

    pub fn co2_savings(&self) -> &str {
        &self.co2_savings.text
    }
}

fn format_km(value: f64) -> String {
    format!("{value:.2} km")
}

fn format_kg(value: f64) -> String {
    format!("{value:.3} kg")
}

/// `"<H>h <M>m"` or `"<M>m"` from the rounded number of seconds.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Keeps digits and dots, then reads the longest numeric prefix. Anything
/// unreadable counts as zero.
pub fn parse_leading_number(text: &str) -> f64 {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut seen_dot = false;
    let end = kept
        .char_indices()
        .find(|&(_, c)| {
            if c == '.' {
                if seen_dot {
                    return true;
                }
                seen_dot = true;
            }
            false
        })
        .map(|(idx, _)| idx)
        .unwrap_or(kept.len());

    kept[..end].parse::<f64>().unwrap_or(0.0)
}
