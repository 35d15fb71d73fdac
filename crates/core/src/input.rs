//! Pointer and viewport tracking.
//!
//! The tracker keeps only the most recent sample. It is not a queue: a frame
//! reads whatever value is current and missed intermediate moves are gone.

use crate::geometry::Viewport;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// One snapshot of pointer position and viewport size, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub position: DVec2,
    pub viewport: Viewport,
}

impl PointerSample {
    /// A pointer resting at the center of `viewport`.
    pub fn centered(viewport: Viewport) -> Self {
        Self {
            position: viewport.center(),
            viewport,
        }
    }

    /// Pointer displacement from the viewport center.
    pub fn offset(&self) -> DVec2 {
        self.position - self.viewport.center()
    }

    /// 1 at the viewport center, falling to 0 at the corners.
    pub fn proximity(&self) -> f64 {
        let max = self.viewport.half_diagonal();
        if max <= 0.0 {
            return 1.0;
        }
        1.0 - (self.offset().length() / max).min(1.0)
    }
}

/// Latest-value holder for pointer and viewport events.
#[derive(Debug, Clone)]
pub struct InputTracker {
    latest: PointerSample,
}

impl InputTracker {
    /// Starts with the pointer at the center of `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            latest: PointerSample::centered(viewport),
        }
    }

    /// Records a pointer move. Non-finite coordinates are ignored.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            log::debug!("ignoring non-finite pointer sample ({x}, {y})");
            return;
        }
        self.latest.position = DVec2::new(x, y);
    }

    /// Records a viewport resize. Non-finite, zero or negative sizes are ignored.
    pub fn resized(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring invalid viewport size {width}x{height}");
            return;
        }
        self.latest.viewport = Viewport::new(width, height);
    }

    /// The most recent sample.
    pub fn sample(&self) -> PointerSample {
        self.latest
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}
