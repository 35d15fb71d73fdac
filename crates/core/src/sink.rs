//! The drawing surface the background renders into.
//!
//! The engine computes positions and colors only. A host (SVG tree, canvas
//! 2D context, offscreen recorder) implements [`RenderSink`] and decides how
//! those numbers become pixels.

use crate::color::Srgb;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Transform of the decorative concentric-ring layer behind the particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingTransform {
    /// Rotation around the canvas center, in degrees.
    pub rotation_deg: f64,
    /// Offset from the canvas center, in view-box units.
    pub translate: DVec2,
    pub scale: f64,
    pub opacity: f64,
    /// Stroke color of the rings.
    pub stroke: Srgb,
}

impl Default for RingTransform {
    fn default() -> Self {
        Self {
            rotation_deg: 0.0,
            translate: DVec2::ZERO,
            scale: 1.0,
            opacity: 0.6,
            stroke: Srgb::WHITE,
        }
    }
}

/// Host-provided drawing surface.
///
/// Object-safe so hosts can be swapped at runtime behind `&mut dyn RenderSink`.
pub trait RenderSink {
    /// Places particle `index` at `(x, y)` in view-box units.
    fn draw_particle(&mut self, index: usize, x: f64, y: f64, color: Srgb, opacity: f64);

    /// Updates the ring layer. Called once per frame before any particle.
    fn draw_ring_layer(&mut self, transform: RingTransform);
}
