//! Easing curves for tweens.
//!
//! Every curve maps [0, 1] onto [0, 1] and hits both endpoints exactly, so a
//! finished tween lands on its end value without drift. `PowerN` curves use
//! an exponent of N + 1, so `Power1` is quadratic and `Power4` quintic.

/// Shape of a tween's progress over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    Power1Out,
    Power2In,
    Power2Out,
    Power2InOut,
    Power3In,
    Power3Out,
    Power3InOut,
    Power4In,
    Power4Out,
    Power4InOut,
    ExpoInOut,
}

impl Easing {
    /// Applies the curve to a normalized time `t`, clamped to [0, 1].
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::Power1Out => power_out(t, 2),
            Easing::Power2In => power_in(t, 3),
            Easing::Power2Out => power_out(t, 3),
            Easing::Power2InOut => power_in_out(t, 3),
            Easing::Power3In => power_in(t, 4),
            Easing::Power3Out => power_out(t, 4),
            Easing::Power3InOut => power_in_out(t, 4),
            Easing::Power4In => power_in(t, 5),
            Easing::Power4Out => power_out(t, 5),
            Easing::Power4InOut => power_in_out(t, 5),
            Easing::ExpoInOut => expo_in_out(t),
        }
    }
}

fn power_in(t: f64, n: i32) -> f64 {
    t.powi(n)
}

fn power_out(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

fn power_in_out(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

fn expo_in_out(t: f64) -> f64 {
    if t == 0.0 {
        0.0
    } else if t == 1.0 {
        1.0
    } else if t < 0.5 {
        2f64.powf(20.0 * t - 10.0) / 2.0
    } else {
        (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
    }
}
