//! Configuration for the particle field.
//!
//! [`FieldConfig::from_json`] follows the parameter-helper rule: missing keys
//! fall back to defaults, while a present key of the wrong type or out of range
//! fails with a config error instead of being replaced silently.

use crate::mode::GeometryMode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tidemark_core::error::EngineError;
use tidemark_core::params::{param_f64, param_i64, param_string, param_u64, param_usize};
use tidemark_core::theme::{ThemeColors, DEFAULT_ACCENT, DEFAULT_SECONDARY};

pub const DEFAULT_COUNT: i64 = 80;
pub const DEFAULT_SEED: u64 = 42;
const DEFAULT_RING_RADIUS: f64 = 350.0;
const DEFAULT_ROTATION_SPEED: f64 = 0.0001;
const DEFAULT_GRID_COLS: usize = 10;
const DEFAULT_GRID_SPACING: f64 = 60.0;
const DEFAULT_LOTUS_PETALS: f64 = 8.0;
const DEFAULT_LOTUS_LOOPS: f64 = 2.0;
const DEFAULT_LOTUS_DRIFT: f64 = 12.0;
const DEFAULT_WANDER_AMPLITUDE: f64 = 40.0;
const DEFAULT_WANDER_SPEED: f64 = 0.0005;

/// Shape parameters shared by the mode strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Radius of the `circle` ring and outer reach of the `lotus` rose.
    pub ring_radius: f64,
    /// Common rotation of the ring, radians per millisecond. Zero holds the phase still.
    pub rotation_speed: f64,
    pub grid_cols: usize,
    pub grid_spacing: f64,
    pub lotus_petals: f64,
    pub lotus_loops: f64,
    /// Amplitude of the lotus noise wobble.
    pub lotus_drift: f64,
    /// Radius of the chaos wander around each anchor.
    pub wander_amplitude: f64,
    /// Angular speed of the chaos wander, radians per millisecond.
    pub wander_speed: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            ring_radius: DEFAULT_RING_RADIUS,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            grid_cols: DEFAULT_GRID_COLS,
            grid_spacing: DEFAULT_GRID_SPACING,
            lotus_petals: DEFAULT_LOTUS_PETALS,
            lotus_loops: DEFAULT_LOTUS_LOOPS,
            lotus_drift: DEFAULT_LOTUS_DRIFT,
            wander_amplitude: DEFAULT_WANDER_AMPLITUDE,
            wander_speed: DEFAULT_WANDER_SPEED,
        }
    }
}

impl LayoutParams {
    /// Reads layout keys from a JSON object, falling back to defaults for absent keys.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let d = Self::default();
        let layout = Self {
            ring_radius: param_f64(params, "ring_radius", d.ring_radius)?,
            rotation_speed: param_f64(params, "rotation_speed", d.rotation_speed)?,
            grid_cols: param_usize(params, "grid_cols", d.grid_cols)?,
            grid_spacing: param_f64(params, "grid_spacing", d.grid_spacing)?,
            lotus_petals: param_f64(params, "lotus_petals", d.lotus_petals)?,
            lotus_loops: param_f64(params, "lotus_loops", d.lotus_loops)?,
            lotus_drift: param_f64(params, "lotus_drift", d.lotus_drift)?,
            wander_amplitude: param_f64(params, "wander_amplitude", d.wander_amplitude)?,
            wander_speed: param_f64(params, "wander_speed", d.wander_speed)?,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Rejects non-finite numbers, an empty grid row and a negative radius.
    pub fn validate(&self) -> Result<(), EngineError> {
        let numbers = [
            ("ring_radius", self.ring_radius),
            ("rotation_speed", self.rotation_speed),
            ("grid_spacing", self.grid_spacing),
            ("lotus_petals", self.lotus_petals),
            ("lotus_loops", self.lotus_loops),
            ("lotus_drift", self.lotus_drift),
            ("wander_amplitude", self.wander_amplitude),
            ("wander_speed", self.wander_speed),
        ];
        if let Some((name, _)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(name, "must be finite"));
        }
        if self.grid_cols == 0 {
            return Err(invalid("grid_cols", "must be at least 1"));
        }
        if self.ring_radius < 0.0 {
            return Err(invalid("ring_radius", "must be >= 0"));
        }
        Ok(())
    }
}

/// Full configuration of a [`ParticleField`](crate::ParticleField).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Requested particle count. Negative values are rejected at initialization.
    pub count: i64,
    pub mode: GeometryMode,
    pub theme: ThemeColors,
    pub seed: u64,
    pub layout: LayoutParams,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            mode: GeometryMode::default(),
            theme: ThemeColors::default(),
            seed: DEFAULT_SEED,
            layout: LayoutParams::default(),
        }
    }
}

impl FieldConfig {
    pub fn new(count: i64, mode: GeometryMode, theme: ThemeColors) -> Self {
        Self {
            count,
            mode,
            theme,
            ..Self::default()
        }
    }

    /// Reads `count`, `mode`, `accent`, `secondary`, `seed` and the layout keys.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let count = param_i64(params, "count", DEFAULT_COUNT)?;
        let mode = param_string(params, "mode", GeometryMode::default().as_str())?.parse()?;
        let theme = ThemeColors::from_hex(
            &param_string(params, "accent", DEFAULT_ACCENT)?,
            &param_string(params, "secondary", DEFAULT_SECONDARY)?,
        )?;
        let config = Self {
            count,
            mode,
            theme,
            seed: param_u64(params, "seed", DEFAULT_SEED)?,
            layout: LayoutParams::from_json(params)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.count < 0 {
            return Err(EngineError::NegativeCount(self.count));
        }
        usize::try_from(self.count).map_err(|_| invalid("count", "too large"))?;
        self.layout.validate()
    }

    /// Current values as a flat JSON object, the same shape `from_json` reads.
    pub fn to_json(&self) -> Value {
        json!({
            "count": self.count,
            "mode": self.mode.as_str(),
            "accent": self.theme.accent.to_hex(),
            "secondary": self.theme.secondary.to_hex(),
            "seed": self.seed,
            "ring_radius": self.layout.ring_radius,
            "rotation_speed": self.layout.rotation_speed,
            "grid_cols": self.layout.grid_cols,
            "grid_spacing": self.layout.grid_spacing,
            "lotus_petals": self.layout.lotus_petals,
            "lotus_loops": self.layout.lotus_loops,
            "lotus_drift": self.layout.lotus_drift,
            "wander_amplitude": self.layout.wander_amplitude,
            "wander_speed": self.layout.wander_speed,
        })
    }

    /// Schema describing every key: type, default and a short description.
    pub fn schema() -> Value {
        let d = LayoutParams::default();
        json!({
            "count": {"type": "integer", "default": DEFAULT_COUNT, "min": 0,
                      "description": "Number of particles, fixed for the engine's lifetime"},
            "mode": {"type": "string", "default": "chaos", "enum": GeometryMode::list_names(),
                     "description": "Initial geometry mode"},
            "accent": {"type": "color", "default": DEFAULT_ACCENT,
                       "description": "Accent color (particles lean toward it; lock-in target)"},
            "secondary": {"type": "color", "default": DEFAULT_SECONDARY,
                          "description": "Secondary color (ring strokes, dim particles)"},
            "seed": {"type": "integer", "default": DEFAULT_SEED,
                     "description": "PRNG seed for initial positions and anchors"},
            "ring_radius": {"type": "number", "default": d.ring_radius, "min": 0.0,
                            "description": "Circle radius and lotus reach, view-box units"},
            "rotation_speed": {"type": "number", "default": d.rotation_speed,
                               "description": "Ring phase rotation, radians per ms"},
            "grid_cols": {"type": "integer", "default": d.grid_cols, "min": 1,
                          "description": "Grid column count"},
            "grid_spacing": {"type": "number", "default": d.grid_spacing,
                             "description": "Distance between grid cells"},
            "lotus_petals": {"type": "number", "default": d.lotus_petals,
                             "description": "Petal count of the rose curve"},
            "lotus_loops": {"type": "number", "default": d.lotus_loops,
                            "description": "Times the rose is traced across all particles"},
            "lotus_drift": {"type": "number", "default": d.lotus_drift,
                            "description": "Noise wobble amplitude in lotus mode"},
            "wander_amplitude": {"type": "number", "default": d.wander_amplitude,
                                 "description": "Chaos wander radius around each anchor"},
            "wander_speed": {"type": "number", "default": d.wander_speed,
                             "description": "Chaos wander speed, radians per ms"}
        })
    }
}

fn invalid(name: &str, reason: &str) -> EngineError {
    EngineError::InvalidParam {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
