//! Geometry modes and the strategies that place particles in them.
//!
//! A strategy is a pure function of the particle slot (index, count, chaos
//! anchor) and the clock. The engine picks one through [`StrategyTable::get`]
//! and eases every particle toward whatever it returns, so switching modes is
//! a matter of swapping the strategy; positions are never reset.

use crate::config::LayoutParams;
use glam::DVec2;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;
use tidemark_core::error::EngineError;
use tidemark_core::geometry::CANVAS_CENTER;

/// All mode names, in declaration order.
const MODE_NAMES: &[&str] = &["chaos", "circle", "grid", "lotus"];

/// Layout the particle field converges toward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryMode {
    /// Bounded wander around per-particle anchors, wrapped at the edges.
    #[default]
    Chaos,
    /// Evenly spaced on a slowly rotating ring.
    Circle,
    /// A fixed lattice centered on the canvas.
    Grid,
    /// A polar rose with a soft noise drift.
    Lotus,
}

impl GeometryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryMode::Chaos => "chaos",
            GeometryMode::Circle => "circle",
            GeometryMode::Grid => "grid",
            GeometryMode::Lotus => "lotus",
        }
    }

    /// Names accepted by [`FromStr`].
    pub fn list_names() -> &'static [&'static str] {
        MODE_NAMES
    }
}

impl fmt::Display for GeometryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chaos" => Ok(GeometryMode::Chaos),
            "circle" => Ok(GeometryMode::Circle),
            "grid" => Ok(GeometryMode::Grid),
            "lotus" => Ok(GeometryMode::Lotus),
            _ => Err(EngineError::UnknownMode(s.to_string())),
        }
    }
}

/// Everything a strategy may know about one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub index: usize,
    pub count: usize,
    pub anchor: DVec2,
}

/// Maps a particle slot and the clock to a target in view-box units.
pub trait ModeStrategy {
    fn target(&self, slot: Slot, time_ms: f64) -> DVec2;
}

/// Wander around the particle's chaos anchor.
#[derive(Debug, Clone)]
pub struct Chaos {
    pub amplitude: f64,
    /// Angular speed of the wander, radians per millisecond.
    pub speed: f64,
}

impl ModeStrategy for Chaos {
    fn target(&self, slot: Slot, time_ms: f64) -> DVec2 {
        let phase = time_ms * self.speed + slot.index as f64;
        slot.anchor + DVec2::new(phase.sin(), phase.cos()) * self.amplitude
    }
}

/// Ring of fixed radius around the canvas center.
#[derive(Debug, Clone)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
    /// Common phase rotation, radians per millisecond.
    pub angular_speed: f64,
}

impl Circle {
    /// Angle of slot `index` at `time_ms`.
    pub fn angle(&self, index: usize, count: usize, time_ms: f64) -> f64 {
        TAU * index as f64 / count.max(1) as f64 + time_ms * self.angular_speed
    }
}

impl ModeStrategy for Circle {
    fn target(&self, slot: Slot, time_ms: f64) -> DVec2 {
        let angle = self.angle(slot.index, slot.count, time_ms);
        self.center + DVec2::new(angle.cos(), angle.sin()) * self.radius
    }
}

/// Row-major lattice with a fixed column count, centered on the canvas.
#[derive(Debug, Clone)]
pub struct Grid {
    pub center: DVec2,
    pub cols: usize,
    pub spacing: f64,
}

impl Grid {
    /// Top-left cell of the lattice for `count` particles.
    pub fn origin(&self, count: usize) -> DVec2 {
        let cols = self.cols.max(1);
        let rows = count.div_ceil(cols).max(1);
        let extent = DVec2::new((cols - 1) as f64, (rows - 1) as f64) * self.spacing;
        self.center - extent / 2.0
    }
}

impl ModeStrategy for Grid {
    fn target(&self, slot: Slot, _time_ms: f64) -> DVec2 {
        let cols = self.cols.max(1);
        let cell = DVec2::new((slot.index % cols) as f64, (slot.index / cols) as f64);
        self.origin(slot.count) + cell * self.spacing
    }
}

/// Polar rose `r = R·cos(p/2·θ)` traced `loops` times.
pub struct Lotus {
    pub center: DVec2,
    pub radius: f64,
    pub petals: f64,
    pub loops: f64,
    pub drift: f64,
    noise: Perlin,
}

impl Lotus {
    pub fn new(
        center: DVec2,
        radius: f64,
        petals: f64,
        loops: f64,
        drift: f64,
        seed: u32,
    ) -> Self {
        Self {
            center,
            radius,
            petals,
            loops,
            drift,
            noise: Perlin::new(seed),
        }
    }

    /// Slow noise wobble around the curve, keyed on the particle's angle.
    fn drift_at(&self, angle: f64, time_ms: f64) -> DVec2 {
        let (s, c) = angle.sin_cos();
        let t = time_ms * 0.0002;
        let dx = self.noise.get([c, s, t]);
        let dy = self.noise.get([c + 100.0, s + 100.0, t]);
        DVec2::new(dx, dy) * self.drift
    }
}

impl fmt::Debug for Lotus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lotus")
            .field("center", &self.center)
            .field("radius", &self.radius)
            .field("petals", &self.petals)
            .field("loops", &self.loops)
            .field("drift", &self.drift)
            .finish_non_exhaustive()
    }
}

impl ModeStrategy for Lotus {
    fn target(&self, slot: Slot, time_ms: f64) -> DVec2 {
        let angle = TAU * slot.index as f64 / slot.count.max(1) as f64 * self.loops;
        let r = self.radius * (self.petals / 2.0 * angle).cos();
        self.center + DVec2::new(angle.cos(), angle.sin()) * r + self.drift_at(angle, time_ms)
    }
}

/// One strategy per mode, built once from the layout parameters.
#[derive(Debug)]
pub struct StrategyTable {
    pub chaos: Chaos,
    pub circle: Circle,
    pub grid: Grid,
    pub lotus: Lotus,
}

impl StrategyTable {
    pub fn new(layout: &LayoutParams, seed: u64) -> Self {
        Self {
            chaos: Chaos {
                amplitude: layout.wander_amplitude,
                speed: layout.wander_speed,
            },
            circle: Circle {
                center: CANVAS_CENTER,
                radius: layout.ring_radius,
                angular_speed: layout.rotation_speed,
            },
            grid: Grid {
                center: CANVAS_CENTER,
                cols: layout.grid_cols,
                spacing: layout.grid_spacing,
            },
            lotus: Lotus::new(
                CANVAS_CENTER,
                layout.ring_radius,
                layout.lotus_petals,
                layout.lotus_loops,
                layout.lotus_drift,
                seed as u32,
            ),
        }
    }

    pub fn get(&self, mode: GeometryMode) -> &dyn ModeStrategy {
        match mode {
            GeometryMode::Chaos => &self.chaos,
            GeometryMode::Circle => &self.circle,
            GeometryMode::Grid => &self.grid,
            GeometryMode::Lotus => &self.lotus,
        }
    }
}
