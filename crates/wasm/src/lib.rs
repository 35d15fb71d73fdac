#![deny(unsafe_code)]
//! WASM bindings: a [`Background`] class that runs a stage and draws each
//! frame into a `<canvas>` 2D context.
//!
//! The page owns the animation loop and forwards its events:
//!
//! ```js
//! const bg = new Background(canvas, JSON.stringify({ mode: "lotus" }));
//! addEventListener("pointermove", e => bg.pointer_moved(e.clientX, e.clientY));
//! requestAnimationFrame(function loop(t) { bg.frame(t); requestAnimationFrame(loop); });
//! ```

use std::f64::consts::TAU;
use tidemark_core::color::Srgb;
use tidemark_core::error::EngineError;
use tidemark_core::geometry::{Rect, CANVAS_CENTER, VIEW_BOX};
use tidemark_core::sink::{RenderSink, RingTransform};
use tidemark_core::theme::ThemeColors;
use tidemark_field::particle::depth_factor;
use tidemark_field::GeometryMode;
use tidemark_overlay::OverlayContent;
use tidemark_stage::pixel::RING_RADII;
use tidemark_stage::{Stage, StageConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const RING_DASHES: usize = 36;

fn to_js(e: EngineError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn css(color: Srgb) -> String {
    color.to_hex()
}

/// Draws straight into a canvas 2D context scaled from the view box.
struct CanvasSink<'a> {
    ctx: &'a CanvasRenderingContext2d,
    width: f64,
    height: f64,
    error: Option<JsValue>,
}

impl CanvasSink<'_> {
    fn scale(&self) -> f64 {
        self.width.min(self.height) / VIEW_BOX
    }

    fn keep(&mut self, result: Result<(), JsValue>) {
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
    }
}

impl RenderSink for CanvasSink<'_> {
    fn draw_ring_layer(&mut self, ring: RingTransform) {
        let ctx = self.ctx;
        ctx.clear_rect(0.0, 0.0, self.width, self.height);
        let scale = self.scale();
        let center = (CANVAS_CENTER + ring.translate) * scale;
        let phase = ring.rotation_deg.to_radians();
        ctx.set_global_alpha(ring.opacity.clamp(0.0, 1.0) * 0.5);
        ctx.set_stroke_style_str(&css(ring.stroke));
        ctx.set_line_width(1.0);
        let dash = TAU / (RING_DASHES as f64 * 2.0);
        for &base in &RING_RADII {
            let radius = base * ring.scale * scale;
            if !(radius.is_finite() && radius > 0.0) {
                continue;
            }
            ctx.begin_path();
            for d in 0..RING_DASHES {
                let start = phase + d as f64 * dash * 2.0;
                ctx.move_to(center.x + radius * start.cos(), center.y + radius * start.sin());
                let drawn = ctx.arc(center.x, center.y, radius, start, start + dash);
                self.keep(drawn);
            }
            ctx.stroke();
        }
    }

    fn draw_particle(&mut self, index: usize, x: f64, y: f64, color: Srgb, opacity: f64) {
        let ctx = self.ctx;
        let scale = self.scale();
        let radius = ((1.0 + depth_factor(index) * 0.8) * scale).max(0.75);
        ctx.set_global_alpha(opacity.clamp(0.0, 1.0));
        ctx.set_fill_style_str(&css(color));
        ctx.begin_path();
        let drawn = ctx.arc(x * scale, y * scale, radius, 0.0, TAU);
        self.keep(drawn);
        ctx.fill();
    }
}

/// The animated background plus its detail overlay.
#[wasm_bindgen]
pub struct Background {
    stage: Stage,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

#[wasm_bindgen]
impl Background {
    /// Creates a background drawing into `canvas`, configured by a JSON object
    /// (the same keys the CLI's `--params` takes; `"{}"` for defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, params_json: &str) -> Result<Background, JsValue> {
        let params: serde_json::Value = serde_json::from_str(params_json)
            .map_err(|e| JsValue::from_str(&format!("invalid params JSON: {e}")))?;
        let config = StageConfig::from_json(&params).map_err(to_js)?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            stage: Stage::new(config).map_err(to_js)?,
            canvas,
            ctx,
        })
    }

    /// Runs one frame at `now_ms` (the `requestAnimationFrame` timestamp).
    pub fn frame(&mut self, now_ms: f64) -> Result<(), JsValue> {
        let mut sink = CanvasSink {
            ctx: &self.ctx,
            width: self.canvas.width() as f64,
            height: self.canvas.height() as f64,
            error: None,
        };
        self.stage.frame(now_ms, &mut sink).map_err(to_js)?;
        match sink.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.stage.pointer_moved(x, y);
    }

    pub fn resized(&mut self, width: f64, height: f64) {
        self.stage.resized(width, height);
    }

    /// Switches to `chaos`, `circle`, `grid` or `lotus`.
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: GeometryMode = mode.parse().map_err(to_js)?;
        self.stage.set_mode(mode).map_err(to_js)
    }

    /// Cross-fades to a new accent/secondary pair given as `#rrggbb`.
    pub fn set_theme(&mut self, accent: &str, secondary: &str) -> Result<(), JsValue> {
        let colors = ThemeColors::from_hex(accent, secondary).map_err(to_js)?;
        self.stage.set_theme(colors).map_err(to_js)
    }

    pub fn set_expanded(&mut self, expanded: bool) -> Result<(), JsValue> {
        self.stage.set_expanded(expanded).map_err(to_js)
    }

    /// Opens the detail overlay from the clicked element's bounding rect.
    pub fn open(
        &mut self,
        top: f64,
        left: f64,
        width: f64,
        height: f64,
        id: &str,
        elements: usize,
    ) -> Result<(), JsValue> {
        let content = OverlayContent::new(id, (0..elements).map(|i| format!("{id}-{i}")));
        self.stage
            .open(Rect::new(top, left, width, height), content)
            .map_err(to_js)
    }

    pub fn close(&mut self) -> Result<(), JsValue> {
        self.stage.close().map_err(to_js)
    }

    /// Overlay state: `closed`, `expanding`, `open` or `closing`.
    pub fn state(&self) -> String {
        self.stage.overlay_state().to_string()
    }

    pub fn expanded(&self) -> bool {
        self.stage.expanded()
    }

    /// Current overlay rect as `[top, left, width, height]`.
    pub fn overlay_rect(&self) -> Vec<f64> {
        let r = self.stage.overlay().geometry();
        vec![r.top, r.left, r.width, r.height]
    }

    pub fn content_opacity(&self) -> f64 {
        self.stage.overlay().content_opacity()
    }

    /// Current parameters as a JSON string.
    pub fn params(&self) -> String {
        self.stage.field().params().to_string()
    }

    pub fn destroy(&mut self) -> Result<(), JsValue> {
        self.stage.destroy().map_err(to_js)
    }
}
