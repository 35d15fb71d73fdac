//! Reproducible headless run of a stage.
//!
//! A [`Scene`] captures everything needed to replay a sequence of frames:
//! field parameters, viewport, frame count and spacing, a fixed pointer, an
//! optional mode switch and optional overlay open/close frames. Two identical
//! scenes produce bit-identical frames.

use crate::recorder::Recorder;
use crate::{Stage, StageConfig};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tidemark_core::error::EngineError;
use tidemark_core::geometry::{Rect, Viewport, CANVAS_CENTER};
use tidemark_core::theme::ThemeColors;
use tidemark_field::GeometryMode;
use tidemark_overlay::{OverlayContent, TransitionState};

pub const DEFAULT_FRAMES: usize = 200;
pub const DEFAULT_FRAME_MS: f64 = 16.0;

/// Scripted headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Field and viewport parameters, as read by [`StageConfig::from_json`].
    pub params: Value,
    pub frames: usize,
    pub frame_ms: f64,
    /// Pointer position in viewport pixels; `None` leaves it centered.
    pub pointer: Option<DVec2>,
    /// Switches to this mode at the given frame.
    pub switch_mode: Option<(usize, GeometryMode)>,
    /// Frame at which the overlay is opened from a card-sized rect.
    pub open_frame: Option<usize>,
    pub close_frame: Option<usize>,
}

/// What a scene ended up as, for logs and `--json` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneReport {
    pub frames: usize,
    pub elapsed_ms: f64,
    pub mode: GeometryMode,
    pub particles: usize,
    pub overlay: TransitionState,
    pub expanded: bool,
    pub theme: ThemeColors,
    /// Mean distance of the particles from the canvas center.
    pub mean_radius: f64,
    /// Largest deviation of any particle's radius from `mean_radius`.
    pub radius_spread: f64,
}

impl Scene {
    /// Creates a scene with empty params (all defaults) and the default frame count.
    pub fn new() -> Self {
        Self {
            params: Value::Object(Map::new()),
            frames: DEFAULT_FRAMES,
            frame_ms: DEFAULT_FRAME_MS,
            pointer: None,
            switch_mode: None,
            open_frame: None,
            close_frame: None,
        }
    }

    /// Checks the frame clock and the overlay script.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.frame_ms.is_finite() && self.frame_ms > 0.0) {
            return Err(EngineError::InvalidParam {
                name: "frame_ms".into(),
                reason: format!("must be a positive number, got {}", self.frame_ms),
            });
        }
        if let (Some(open), Some(close)) = (self.open_frame, self.close_frame) {
            if close < open {
                return Err(EngineError::InvalidParam {
                    name: "close_frame".into(),
                    reason: format!("frame {close} comes before open frame {open}"),
                });
            }
        }
        Ok(())
    }

    /// Builds a stage and runs every frame into `recorder`.
    ///
    /// The recorder holds the last frame when this returns.
    pub fn run(&self, recorder: &mut Recorder) -> Result<SceneReport, EngineError> {
        self.validate()?;
        let config = StageConfig::from_json(&self.params)?;
        let mut stage = Stage::new(config)?;
        if let Some(p) = self.pointer {
            stage.pointer_moved(p.x, p.y);
        }

        let mut now = 0.0;
        for frame in 0..self.frames {
            if let Some((at, mode)) = self.switch_mode {
                if at == frame {
                    stage.set_mode(mode)?;
                }
            }
            if self.open_frame == Some(frame) {
                stage.open(card_rect(config.viewport), scene_content())?;
            }
            if self.close_frame == Some(frame) {
                stage.close()?;
            }
            now = (frame + 1) as f64 * self.frame_ms;
            recorder.clear();
            stage.frame(now, recorder)?;
        }

        let report = report(&stage, self.frames, now);
        log::info!(
            "scene finished: {} frames, mode {}, overlay {}",
            report.frames,
            report.mode,
            report.overlay
        );
        Ok(report)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// A card in the middle third of the viewport.
fn card_rect(viewport: Viewport) -> Rect {
    Rect::new(
        viewport.height / 3.0,
        viewport.width / 3.0,
        viewport.width / 3.0,
        viewport.height / 3.0,
    )
}

fn scene_content() -> OverlayContent {
    OverlayContent::new("scene", ["title", "subtitle", "body", "footer"])
}

fn report(stage: &Stage, frames: usize, elapsed_ms: f64) -> SceneReport {
    let field = stage.field();
    let radii: Vec<f64> = field
        .particles()
        .iter()
        .map(|p| (p.position - CANVAS_CENTER).length())
        .collect();
    let mean_radius = if radii.is_empty() {
        0.0
    } else {
        radii.iter().sum::<f64>() / radii.len() as f64
    };
    let radius_spread = radii
        .iter()
        .map(|r| (r - mean_radius).abs())
        .fold(0.0, f64::max);
    SceneReport {
        frames,
        elapsed_ms,
        mode: field.mode(),
        particles: field.count(),
        overlay: stage.overlay_state(),
        expanded: stage.expanded(),
        theme: field.theme(),
        mean_radius,
        radius_spread,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_scene_has_default_params_and_frames() {
        let s = Scene::new();
        assert_eq!(s.params, json!({}));
        assert_eq!(s.frames, DEFAULT_FRAMES);
        assert_eq!(s.frame_ms, DEFAULT_FRAME_MS);
        assert!(s.open_frame.is_none());
    }

    #[test]
    fn json_round_trip_with_script() {
        let mut s = Scene::new();
        s.params = json!({"count": 30, "mode": "lotus", "accent": "#64ffda"});
        s.pointer = Some(DVec2::new(100.0, 50.0));
        s.switch_mode = Some((20, GeometryMode::Grid));
        s.open_frame = Some(5);
        s.close_frame = Some(90);

        let text = serde_json::to_string_pretty(&s).unwrap();
        let back: Scene = serde_json::from_str(&text).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn validate_rejects_bad_clock_and_script() {
        let mut s = Scene::new();
        s.frame_ms = 0.0;
        assert!(s.validate().is_err());
        s.frame_ms = f64::NAN;
        assert!(s.validate().is_err());

        let mut s = Scene::new();
        s.open_frame = Some(10);
        s.close_frame = Some(3);
        assert!(s.validate().is_err());
    }

    #[test]
    fn grid_to_circle_scene_settles_on_the_ring() {
        let mut s = Scene::new();
        s.params = json!({"count": 80, "mode": "grid", "accent": "#d4af37", "secondary": "#112240"});
        s.switch_mode = Some((0, GeometryMode::Circle));
        let mut rec = Recorder::default();
        let report = s.run(&mut rec).unwrap();

        assert_eq!(report.particles, 80);
        assert_eq!(report.mode, GeometryMode::Circle);
        assert!((report.mean_radius - 350.0).abs() < 0.5, "{}", report.mean_radius);
        assert!(report.radius_spread < 0.5, "{}", report.radius_spread);
        assert_eq!(rec.len(), 80);
    }

    #[test]
    fn scripted_overlay_round_trip_ends_closed() {
        let mut s = Scene::new();
        s.params = json!({"count": 12});
        s.frames = 300;
        s.open_frame = Some(10);
        s.close_frame = Some(150);
        let report = s.run(&mut Recorder::default()).unwrap();
        assert_eq!(report.overlay, TransitionState::Closed);
        assert!(!report.expanded);
    }

    #[test]
    fn scene_stopped_while_open_reports_expanded() {
        let mut s = Scene::new();
        s.params = json!({"count": 12});
        s.frames = 120;
        s.open_frame = Some(0);
        let report = s.run(&mut Recorder::default()).unwrap();
        assert_eq!(report.overlay, TransitionState::Open);
        assert!(report.expanded);
    }

    #[test]
    fn same_scene_same_frame() {
        let mut s = Scene::new();
        s.params = json!({"count": 40, "mode": "chaos", "seed": 9});
        s.frames = 50;
        s.pointer = Some(DVec2::new(10.0, 10.0));
        let mut a = Recorder::default();
        let mut b = Recorder::default();
        s.run(&mut a).unwrap();
        s.run(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_params_fail_before_any_frame() {
        let mut s = Scene::new();
        s.params = json!({"count": -4});
        let mut rec = Recorder::default();
        assert!(matches!(s.run(&mut rec), Err(EngineError::NegativeCount(-4))));
        assert!(rec.ring.is_none());
    }
}
