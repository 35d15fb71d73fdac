//! A [`RenderSink`] that keeps the last frame's draw calls in memory.
//!
//! Headless hosts (the CLI, tests) render into a [`Recorder`] and then read
//! the calls back or rasterize them with [`crate::pixel::frame_to_rgba`].

use serde::{Deserialize, Serialize};
use tidemark_core::color::Srgb;
use tidemark_core::sink::{RenderSink, RingTransform};

/// One recorded `draw_particle` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawnParticle {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub color: Srgb,
    pub opacity: f64,
}

/// In-memory render target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recorder {
    pub ring: Option<RingTransform>,
    pub particles: Vec<DrawnParticle>,
}

impl Recorder {
    /// Creates a recorder with room for `count` particles.
    pub fn with_capacity(count: usize) -> Self {
        Self {
            ring: None,
            particles: Vec::with_capacity(count),
        }
    }

    /// Forgets the previous frame, keeping the allocation.
    pub fn clear(&mut self) {
        self.ring = None;
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

impl RenderSink for Recorder {
    fn draw_particle(&mut self, index: usize, x: f64, y: f64, color: Srgb, opacity: f64) {
        self.particles.push(DrawnParticle {
            index,
            x,
            y,
            color,
            opacity,
        });
    }

    fn draw_ring_layer(&mut self, transform: RingTransform) {
        self.ring = Some(transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order_and_clears() {
        let mut rec = Recorder::with_capacity(2);
        rec.draw_ring_layer(RingTransform::default());
        rec.draw_particle(0, 1.0, 2.0, Srgb::WHITE, 0.5);
        rec.draw_particle(1, 3.0, 4.0, Srgb::WHITE, 0.25);
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.particles[1].x, 3.0);
        assert_eq!(rec.ring, Some(RingTransform::default()));

        rec.clear();
        assert!(rec.is_empty());
        assert!(rec.ring.is_none());
    }

    #[test]
    fn usable_as_trait_object() {
        let mut rec = Recorder::default();
        let sink: &mut dyn RenderSink = &mut rec;
        sink.draw_particle(7, 0.0, 0.0, Srgb::WHITE, 1.0);
        assert_eq!(rec.particles[0].index, 7);
    }
}
