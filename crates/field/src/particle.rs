//! Particle records.

use glam::DVec2;
use tidemark_core::color::Srgb;
use tidemark_core::geometry::VIEW_BOX;
use tidemark_core::prng::Xorshift64;
use tidemark_core::theme::ThemeColors;

/// One simulated dot. Owned by the engine; hosts only ever see `&Particle`.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Stable id, equal to the particle's slot in the engine's arena.
    pub index: usize,
    pub position: DVec2,
    /// Drift per frame in chaos mode.
    pub velocity: DVec2,
    /// Fixed point the chaos wander circles around.
    pub chaos_anchor: DVec2,
    pub color: Srgb,
    pub opacity: f64,
    /// Blend between secondary (0) and accent (1) at rest.
    pub tint: f64,
    /// Opacity the particle returns to when the overlay closes.
    pub base_opacity: f64,
    /// Extra pull toward the accent while locked in, in [0, 1].
    pub lock: f64,
}

impl Particle {
    /// Creates particle `index` with randomized placement and look.
    pub(crate) fn spawn(index: usize, rng: &mut Xorshift64, theme: &ThemeColors) -> Self {
        let position = rng.next_in_square(VIEW_BOX);
        let velocity = DVec2::new(rng.next_centered(0.1), rng.next_centered(0.1));
        let chaos_anchor = rng.next_in_square(VIEW_BOX);
        let tint = rng.next_range(0.5, 1.0);
        let base_opacity = rng.next_range(0.1, 0.4);
        let mut particle = Self {
            index,
            position,
            velocity,
            chaos_anchor,
            color: theme.accent,
            opacity: base_opacity,
            tint,
            base_opacity,
            lock: 0.0,
        };
        particle.recolor(theme);
        particle
    }

    /// Recomputes `color` from the theme, the tint and the lock amount.
    pub(crate) fn recolor(&mut self, theme: &ThemeColors) {
        self.color = theme
            .secondary
            .mix(theme.accent, self.tint)
            .mix(theme.accent, self.lock);
    }

    /// Parallax depth: 1 through 5, cycling with the index.
    pub fn depth(&self) -> f64 {
        depth_factor(self.index)
    }
}

/// `(i mod 5) + 1`.
pub fn depth_factor(index: usize) -> f64 {
    ((index % 5) + 1) as f64
}
