//! Pure-computation rasterizer from a recorded frame to an RGBA8 buffer.
//!
//! Always available (no feature gate) so the `png` snapshot path and any
//! `ImageData`-style host can share the same conversion. The square image
//! covers the whole view box.

use crate::recorder::Recorder;
use glam::DVec2;
use std::f64::consts::TAU;
use tidemark_core::color::Srgb;
use tidemark_core::geometry::{CANVAS_CENTER, VIEW_BOX};
use tidemark_core::sink::RingTransform;
use tidemark_field::particle::depth_factor;

/// Radii of the concentric rings at scale 1, in view-box units.
pub const RING_RADII: [f64; 4] = [150.0, 250.0, 350.0, 450.0];

/// Number of dashes per ring; the rotation shifts their phase.
const RING_DASHES: usize = 36;

/// Rasterizes `frame` into a `size × size` RGBA8 buffer over `background`.
///
/// The ring layer is drawn first as dashed circles, then every particle as a
/// disc whose radius grows with its parallax depth. Alpha-blends in sRGB.
pub fn frame_to_rgba(frame: &Recorder, size: u32, background: Srgb) -> Vec<u8> {
    let [r, g, b] = background.to_rgb8();
    let side = size as usize;
    let mut buf: Vec<u8> = std::iter::repeat([r, g, b, 255u8])
        .take(side * side)
        .flatten()
        .collect();
    if side == 0 {
        return buf;
    }
    let scale = size as f64 / VIEW_BOX;
    let mut canvas = Canvas {
        buf: &mut buf,
        side,
    };

    if let Some(ring) = frame.ring {
        draw_rings(&mut canvas, &ring, scale);
    }
    for p in &frame.particles {
        let radius = (1.0 + depth_factor(p.index) * 0.8) * scale;
        canvas.disc(
            DVec2::new(p.x, p.y) * scale,
            radius.max(0.75),
            p.color.to_rgb8(),
            p.opacity,
        );
    }
    buf
}

struct Canvas<'a> {
    buf: &'a mut [u8],
    side: usize,
}

impl Canvas<'_> {
    fn blend(&mut self, x: i64, y: i64, color: [u8; 3], alpha: f64) {
        if x < 0 || y < 0 || x as usize >= self.side || y as usize >= self.side {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let i = (y as usize * self.side + x as usize) * 4;
        for (c, &src) in color.iter().enumerate() {
            let dst = self.buf[i + c] as f64;
            self.buf[i + c] = (dst + (src as f64 - dst) * alpha).round() as u8;
        }
    }

    fn disc(&mut self, center: DVec2, radius: f64, color: [u8; 3], alpha: f64) {
        if !center.is_finite() {
            return;
        }
        let r2 = radius * radius;
        let x0 = (center.x - radius).floor() as i64;
        let x1 = (center.x + radius).ceil() as i64;
        let y0 = (center.y - radius).floor() as i64;
        let y1 = (center.y + radius).ceil() as i64;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = DVec2::new(x as f64 + 0.5, y as f64 + 0.5) - center;
                if d.length_squared() <= r2 {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }
}

fn draw_rings(canvas: &mut Canvas<'_>, ring: &RingTransform, scale: f64) {
    let center = (CANVAS_CENTER + ring.translate) * scale;
    let phase = ring.rotation_deg.to_radians();
    let color = ring.stroke.to_rgb8();
    let alpha = ring.opacity * 0.5;
    for &base in &RING_RADII {
        let radius = base * ring.scale * scale;
        if !(radius.is_finite() && radius > 0.0) {
            continue;
        }
        // Sample densely enough to leave no gaps at one pixel wide.
        let steps = (TAU * radius * 2.0).ceil() as usize;
        for s in 0..steps {
            let t = s as f64 / steps as f64;
            // Even dashes are drawn, odd ones are gaps.
            if (t * RING_DASHES as f64 * 2.0) as usize % 2 == 1 {
                continue;
            }
            let angle = t * TAU + phase;
            let p = center + DVec2::new(angle.cos(), angle.sin()) * radius;
            canvas.blend(p.x.floor() as i64, p.y.floor() as i64, color, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::DrawnParticle;
    use tidemark_core::sink::RenderSink;

    const NAVY: Srgb = Srgb {
        r: 0.0,
        g: 0.0,
        b: 0.25,
    };

    fn pixel(buf: &[u8], size: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * size + x) * 4) as usize;
        [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
    }

    #[test]
    fn buffer_has_four_bytes_per_pixel() {
        let buf = frame_to_rgba(&Recorder::default(), 64, NAVY);
        assert_eq!(buf.len(), 64 * 64 * 4);
    }

    #[test]
    fn empty_frame_is_background_with_opaque_alpha() {
        let buf = frame_to_rgba(&Recorder::default(), 16, NAVY);
        let bg = NAVY.to_rgb8();
        for px in buf.chunks_exact(4) {
            assert_eq!(px, [bg[0], bg[1], bg[2], 255]);
        }
    }

    #[test]
    fn zero_size_yields_empty_buffer() {
        assert!(frame_to_rgba(&Recorder::default(), 0, NAVY).is_empty());
    }

    #[test]
    fn opaque_particle_paints_its_center() {
        let mut rec = Recorder::default();
        rec.particles.push(DrawnParticle {
            index: 4,
            x: 500.0,
            y: 250.0,
            color: Srgb::WHITE,
            opacity: 1.0,
        });
        let buf = frame_to_rgba(&rec, 200, NAVY);
        assert_eq!(pixel(&buf, 200, 100, 50), [255, 255, 255, 255]);
        assert_eq!(pixel(&buf, 200, 10, 10)[..3], NAVY.to_rgb8());
    }

    #[test]
    fn translucent_particle_blends_with_background() {
        let mut rec = Recorder::default();
        rec.draw_particle(0, 500.0, 500.0, Srgb::WHITE, 0.5);
        let buf = frame_to_rgba(&rec, 100, NAVY);
        let px = pixel(&buf, 100, 50, 50);
        assert!(px[0] > 100 && px[0] < 160, "red channel {}", px[0]);
    }

    #[test]
    fn particles_outside_the_image_are_clipped() {
        let mut rec = Recorder::default();
        rec.draw_particle(0, -50.0, 1200.0, Srgb::WHITE, 1.0);
        rec.draw_particle(1, f64::NAN, 0.0, Srgb::WHITE, 1.0);
        let buf = frame_to_rgba(&rec, 32, NAVY);
        assert_eq!(buf, frame_to_rgba(&Recorder::default(), 32, NAVY));
    }

    #[test]
    fn ring_layer_marks_pixels_on_its_radius() {
        let mut rec = Recorder::default();
        rec.draw_ring_layer(RingTransform {
            opacity: 1.0,
            ..RingTransform::default()
        });
        let size = 500;
        let buf = frame_to_rgba(&rec, size, NAVY);
        let bg = frame_to_rgba(&Recorder::default(), size, NAVY);
        assert_ne!(buf, bg);
        // The first dash starts at angle 0: right of center on the 350 ring.
        let x = ((500.0 + 350.0) * 0.5) as u32;
        assert_ne!(pixel(&buf, size, x, 250), pixel(&bg, size, x, 250));
        // Canvas center is never on a ring.
        assert_eq!(pixel(&buf, size, 250, 250), pixel(&bg, size, 250, 250));
    }
}
