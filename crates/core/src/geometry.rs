//! Canvas and viewport geometry.
//!
//! The background lives in a fixed 1000×1000 view box that the host scales
//! onto the screen; the overlay works in viewport pixels.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Side length of the square view box particles live in.
pub const VIEW_BOX: f64 = 1000.0;

/// Center of the view box.
pub const CANVAS_CENTER: DVec2 = DVec2::new(VIEW_BOX / 2.0, VIEW_BOX / 2.0);

/// Size of the browser viewport in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Half the diagonal: the farthest a point inside can be from the center.
    pub fn half_diagonal(&self) -> f64 {
        self.center().length()
    }

    /// The rect covering the whole viewport.
    pub fn full_rect(&self) -> Rect {
        Rect {
            top: 0.0,
            left: 0.0,
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Axis-aligned rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// True when both sides are finite and strictly positive.
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Interpolates every edge toward `to`.
    ///
    /// Written as `a·(1−t) + b·t` so `t = 0` yields `self` and `t = 1` yields
    /// `to` bit-for-bit.
    pub fn lerp(&self, to: &Rect, t: f64) -> Rect {
        let mix = |a: f64, b: f64| a * (1.0 - t) + b * t;
        Rect {
            top: mix(self.top, to.top),
            left: mix(self.left, to.left),
            width: mix(self.width, to.width),
            height: mix(self.height, to.height),
        }
    }
}
