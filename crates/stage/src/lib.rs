#![deny(unsafe_code)]
//! The per-frame driver that ties input, overlay and background together.
//!
//! A [`Stage`] owns exactly one [`InputTracker`], one [`ParticleField`] and one
//! [`TransitionController`]. Hosts forward UI events to its hooks and call
//! [`Stage::frame`] once per animation frame, which always runs in the same
//! order: sample input, advance the overlay, tick the field with the overlay's
//! `expanded` flag, render into the sink.
//!
//! Both the CLI and WASM hosts sit on top of this crate so the frame order is
//! written once.

pub mod pixel;
pub mod recorder;
pub mod scene;

#[cfg(feature = "png")]
pub mod snapshot;

pub use recorder::{DrawnParticle, Recorder};
pub use scene::{Scene, SceneReport};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tidemark_core::error::EngineError;
use tidemark_core::geometry::{Rect, Viewport};
use tidemark_core::input::InputTracker;
use tidemark_core::params::param_f64;
use tidemark_core::sink::RenderSink;
use tidemark_core::theme::ThemeColors;
use tidemark_field::{FieldConfig, GeometryMode, ParticleField};
use tidemark_overlay::{OverlayContent, TransitionController, TransitionState};

/// Everything needed to build a [`Stage`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub field: FieldConfig,
    pub viewport: Viewport,
}

impl StageConfig {
    /// Reads the field keys plus `viewport_width` / `viewport_height`.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let d = Viewport::default();
        let viewport = Viewport::new(
            param_f64(params, "viewport_width", d.width)?,
            param_f64(params, "viewport_height", d.height)?,
        );
        let config = Self {
            field: FieldConfig::from_json(params)?,
            viewport,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, v) in [
            ("viewport_width", self.viewport.width),
            ("viewport_height", self.viewport.height),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(EngineError::InvalidParam {
                    name: name.into(),
                    reason: format!("must be a positive number, got {v}"),
                });
            }
        }
        self.field.validate()
    }
}

/// Runs one background and its overlay on a shared frame clock.
pub struct Stage {
    input: InputTracker,
    field: ParticleField,
    overlay: TransitionController,
    forced_expanded: bool,
    frames: u64,
}

impl Stage {
    pub fn new(config: StageConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let field = ParticleField::with_config(config.field)?;
        log::debug!(
            "stage ready: viewport {}x{}",
            config.viewport.width,
            config.viewport.height
        );
        Ok(Self {
            input: InputTracker::new(config.viewport),
            field,
            overlay: TransitionController::new(config.viewport),
            forced_expanded: false,
            frames: 0,
        })
    }

    /// Runs one frame at `now_ms` and draws it into `sink`.
    pub fn frame(&mut self, now_ms: f64, sink: &mut dyn RenderSink) -> Result<(), EngineError> {
        self.ensure_alive("frame")?;
        let pointer = self.input.sample();
        self.overlay.advance(now_ms);
        self.field.tick(now_ms, pointer, self.expanded())?;
        self.field.render(sink)?;
        self.frames += 1;
        Ok(())
    }

    /// The flag the field eases by: the overlay's, or the host's override.
    pub fn expanded(&self) -> bool {
        self.overlay.expanded() || self.forced_expanded
    }

    /// Holds the background in its expanded look regardless of the overlay.
    ///
    /// For hosts that run their own detail view; the overlay keeps driving
    /// the flag whenever it is not closed.
    pub fn set_expanded(&mut self, expanded: bool) -> Result<(), EngineError> {
        self.ensure_alive("set_expanded")?;
        self.forced_expanded = expanded;
        Ok(())
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.input.pointer_moved(x, y);
    }

    /// Resizes both the pointer viewport and the overlay target.
    pub fn resized(&mut self, width: f64, height: f64) {
        self.input.resized(width, height);
        self.overlay.set_viewport(width, height);
    }

    pub fn set_mode(&mut self, mode: GeometryMode) -> Result<(), EngineError> {
        self.field.set_mode(mode)
    }

    pub fn set_theme(&mut self, colors: ThemeColors) -> Result<(), EngineError> {
        self.field.set_theme(colors)
    }

    pub fn open(&mut self, source_rect: Rect, content: OverlayContent) -> Result<(), EngineError> {
        self.ensure_alive("open")?;
        self.overlay.open(source_rect, content)
    }

    pub fn close(&mut self) -> Result<(), EngineError> {
        self.ensure_alive("close")?;
        self.overlay.close();
        Ok(())
    }

    /// Tears everything down. Pending overlay callbacks never run.
    pub fn destroy(&mut self) -> Result<(), EngineError> {
        self.field.destroy()?;
        self.overlay.cancel_all();
        log::debug!("stage destroyed after {} frames", self.frames);
        Ok(())
    }

    pub fn is_destroyed(&self) -> bool {
        self.field.is_destroyed()
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn overlay(&self) -> &TransitionController {
        &self.overlay
    }

    /// Mutable overlay access, for registering completion callbacks.
    pub fn overlay_mut(&mut self) -> &mut TransitionController {
        &mut self.overlay
    }

    pub fn overlay_state(&self) -> TransitionState {
        self.overlay.state()
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn ensure_alive(&self, op: &'static str) -> Result<(), EngineError> {
        if self.field.is_destroyed() {
            log::warn!("{op} rejected: stage destroyed");
            return Err(EngineError::Destroyed(op));
        }
        Ok(())
    }
}
