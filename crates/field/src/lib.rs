#![deny(unsafe_code)]
//! Particle field engine.
//!
//! A fixed population of particles lives in the 1000×1000 view box. Every
//! tick each particle eases toward the target its [`GeometryMode`] strategy
//! assigns, offset by a pointer parallax that grows with the particle's depth.
//! The engine computes positions and colors only; a host
//! [`RenderSink`] receives read-only snapshots through [`ParticleField::render`].
//!
//! Discrete animations (theme cross-fade, the lock-in onto a ring while the
//! overlay is expanded, the ring layer's scale and fade) run on a
//! [`TweenScheduler`] sharing the tick clock. While a position tween owns a
//! particle, per-frame easing leaves that particle alone; once the tween lands
//! its final value is written and easing resumes from there.

pub mod config;
pub mod mode;
pub mod particle;

pub use config::{FieldConfig, LayoutParams};
pub use mode::{GeometryMode, ModeStrategy, Slot, StrategyTable};
pub use particle::Particle;

use glam::DVec2;
use serde_json::Value;
use std::f64::consts::TAU;
use tidemark_core::easing::Easing;
use tidemark_core::error::EngineError;
use tidemark_core::geometry::{CANVAS_CENTER, VIEW_BOX};
use tidemark_core::input::PointerSample;
use tidemark_core::prng::Xorshift64;
use tidemark_core::sink::{RenderSink, RingTransform};
use tidemark_core::theme::ThemeColors;
use tidemark_core::tween::{Property, TweenScheduler, TweenSpec};

/// Fraction of the remaining distance closed per tick while idle.
pub const EASE_IDLE: f64 = 0.05;
/// Fraction closed per tick while the overlay is expanded.
pub const EASE_EXPANDED: f64 = 0.02;
/// Parallax offset per pixel of pointer displacement, before depth scaling.
pub const PARALLAX_STRENGTH: f64 = 0.05;

const THEME_FADE_MS: f64 = 1800.0;
const LOCK_IN_MS: f64 = 1200.0;
const LOCK_IN_OPACITY: f64 = 0.6;
const RELEASE_MS: f64 = 1500.0;
const RING_EXPAND_MS: f64 = 1500.0;
const RING_COLLAPSE_MS: f64 = 1800.0;
const RING_EXPANDED_SCALE: f64 = 1.5;
const RING_EXPANDED_OPACITY: f64 = 0.1;
const RING_REST_OPACITY: f64 = 0.6;
const RING_ROTATION_PER_PX: f64 = 0.01;
const RING_SHIFT_PER_PX: f64 = 0.03;
const CHAOS_BASE_SPEED: f64 = 0.2;
const CHAOS_PROXIMITY_SPEED: f64 = 1.5;
const CHAOS_JITTER: f64 = 1.0;

/// What a field tween animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTarget {
    Particle(usize),
    Ring,
    Theme,
}

/// The background particle engine.
pub struct ParticleField {
    config: FieldConfig,
    strategies: StrategyTable,
    mode: GeometryMode,
    particles: Vec<Particle>,
    tweens: TweenScheduler<FieldTarget>,
    rng: Xorshift64,
    theme: ThemeColors,
    theme_from: ThemeColors,
    theme_to: ThemeColors,
    ring: RingTransform,
    expanded: bool,
    destroyed: bool,
}

impl ParticleField {
    /// Allocates `count` particles in `mode` with the default layout.
    ///
    /// Returns `EngineError::NegativeCount` if `count < 0`. Zero particles is a
    /// valid, inert engine.
    pub fn initialize(
        count: i64,
        mode: GeometryMode,
        colors: ThemeColors,
    ) -> Result<Self, EngineError> {
        Self::with_config(FieldConfig::new(count, mode, colors))
    }

    /// Allocates the field described by `config`.
    pub fn with_config(config: FieldConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let count = usize::try_from(config.count)
            .map_err(|_| EngineError::NegativeCount(config.count))?;
        let mut rng = Xorshift64::new(config.seed);
        let theme = config.theme;
        let particles: Vec<Particle> = (0..count)
            .map(|i| Particle::spawn(i, &mut rng, &theme))
            .collect();
        log::debug!(
            "particle field initialized: {count} particles, mode {}, seed {}",
            config.mode,
            config.seed
        );
        Ok(Self {
            strategies: StrategyTable::new(&config.layout, config.seed),
            mode: config.mode,
            particles,
            // Four tweens per particle plus ring scale, ring opacity and theme.
            tweens: TweenScheduler::with_capacity(count * 4 + 3),
            rng,
            theme,
            theme_from: theme,
            theme_to: theme,
            ring: RingTransform {
                stroke: theme.accent,
                ..RingTransform::default()
            },
            expanded: false,
            destroyed: false,
            config,
        })
    }

    /// Advances the simulation to `now_ms`.
    ///
    /// Runs in O(count) without allocating. The `expanded` flag selects the
    /// ease factor; a change of the flag since the previous tick starts the
    /// lock-in or release tweens.
    pub fn tick(
        &mut self,
        now_ms: f64,
        pointer: PointerSample,
        expanded: bool,
    ) -> Result<(), EngineError> {
        self.ensure_alive("tick")?;
        if !now_ms.is_finite() {
            return Err(EngineError::InvalidParam {
                name: "now_ms".into(),
                reason: format!("clock value {now_ms} is not finite"),
            });
        }

        self.tweens.advance(now_ms);
        self.land_completed_tweens();

        if expanded != self.expanded {
            self.expanded = expanded;
            if expanded {
                self.lock_in(now_ms);
            } else {
                self.release(now_ms);
            }
        }

        let offset = pointer.offset();
        let offset = if offset.is_finite() { offset } else { DVec2::ZERO };
        let proximity = pointer.proximity().clamp(0.0, 1.0);

        self.theme = match self.tweens.value(FieldTarget::Theme, Property::ThemeMix) {
            Some(t) => self.theme_from.mix(self.theme_to, t),
            None => self.theme_to,
        };

        self.update_ring(offset);
        self.update_particles(now_ms, offset, proximity);
        Ok(())
    }

    /// Hands the ring layer and every particle, in index order, to `sink`.
    pub fn render(&self, sink: &mut dyn RenderSink) -> Result<(), EngineError> {
        self.ensure_alive("render")?;
        sink.draw_ring_layer(self.ring);
        for p in &self.particles {
            sink.draw_particle(p.index, p.position.x, p.position.y, p.color, p.opacity);
        }
        Ok(())
    }

    /// Switches layout. Takes effect on the next tick; positions glide.
    pub fn set_mode(&mut self, mode: GeometryMode) -> Result<(), EngineError> {
        self.ensure_alive("set_mode")?;
        if mode != self.mode {
            log::debug!("geometry mode {} -> {}", self.mode, mode);
            self.mode = mode;
        }
        Ok(())
    }

    /// Starts a cross-fade from the colors currently on screen to `colors`.
    ///
    /// The fade's clock starts at the next tick.
    pub fn set_theme(&mut self, colors: ThemeColors) -> Result<(), EngineError> {
        self.ensure_alive("set_theme")?;
        log::debug!(
            "theme fade to accent {} secondary {}",
            colors.accent.to_hex(),
            colors.secondary.to_hex()
        );
        self.theme_from = self.theme;
        self.theme_to = colors;
        self.tweens.start(
            FieldTarget::Theme,
            Property::ThemeMix,
            TweenSpec::new(0.0, 1.0, THEME_FADE_MS, Easing::Power2InOut),
        );
        Ok(())
    }

    /// Stops the engine, cancels every tween and frees the particles.
    pub fn destroy(&mut self) -> Result<(), EngineError> {
        self.ensure_alive("destroy")?;
        self.tweens.cancel_all();
        self.particles = Vec::new();
        self.destroyed = true;
        log::debug!("particle field destroyed");
        Ok(())
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn mode(&self) -> GeometryMode {
        self.mode
    }

    /// Colors currently on screen (mid-fade if a theme change is running).
    pub fn theme(&self) -> ThemeColors {
        self.theme
    }

    /// Read-only view of every particle.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    /// Ring layer parameters as of the last tick.
    pub fn ring(&self) -> RingTransform {
        self.ring
    }

    pub fn strategies(&self) -> &StrategyTable {
        &self.strategies
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Whether the last tick ran with the overlay expanded.
    pub fn expanded(&self) -> bool {
        self.expanded
    }

    /// True while a position tween owns particle `index`.
    pub fn is_locked(&self, index: usize) -> bool {
        self.tweens.is_active(FieldTarget::Particle(index), Property::X)
            || self.tweens.is_active(FieldTarget::Particle(index), Property::Y)
    }

    /// Current parameters as JSON, including the active mode.
    pub fn params(&self) -> Value {
        let mut params = self.config.to_json();
        params["mode"] = Value::from(self.mode.as_str());
        params["accent"] = Value::from(self.theme_to.accent.to_hex());
        params["secondary"] = Value::from(self.theme_to.secondary.to_hex());
        params
    }

    pub fn param_schema(&self) -> Value {
        FieldConfig::schema()
    }

    fn ensure_alive(&self, op: &'static str) -> Result<(), EngineError> {
        if self.destroyed {
            log::warn!("{op} rejected: engine destroyed");
            return Err(EngineError::Destroyed(op));
        }
        Ok(())
    }

    /// Writes the end value of every tween that finished this tick.
    fn land_completed_tweens(&mut self) {
        for done in self.tweens.completed() {
            match (done.target, done.property) {
                (FieldTarget::Particle(i), property) => {
                    let Some(p) = self.particles.get_mut(i) else {
                        continue;
                    };
                    match property {
                        Property::X => p.position.x = done.value,
                        Property::Y => p.position.y = done.value,
                        Property::ColorLock => p.lock = done.value,
                        Property::Opacity => p.opacity = done.value,
                        _ => {}
                    }
                }
                (FieldTarget::Ring, Property::Scale) => self.ring.scale = done.value,
                (FieldTarget::Ring, Property::Opacity) => self.ring.opacity = done.value,
                (FieldTarget::Theme, Property::ThemeMix) => self.theme_from = self.theme_to,
                _ => {}
            }
        }
    }

    /// Pulls every particle onto the lock-in ring and toward the accent.
    fn lock_in(&mut self, now_ms: f64) {
        log::debug!("lock-in: {} particles onto ring", self.particles.len());
        let n = self.particles.len().max(1) as f64;
        let radius = self.config.layout.ring_radius;
        for p in &self.particles {
            let angle = TAU * p.index as f64 / n;
            let spot = CANVAS_CENTER + DVec2::new(angle.cos(), angle.sin()) * radius;
            let target = FieldTarget::Particle(p.index);
            let spec =
                |from: f64, to: f64| TweenSpec::new(from, to, LOCK_IN_MS, Easing::Power3InOut);
            let tweens = &mut self.tweens;
            tweens.start_at(target, Property::X, spec(p.position.x, spot.x), now_ms);
            tweens.start_at(target, Property::Y, spec(p.position.y, spot.y), now_ms);
            tweens.start_at(target, Property::ColorLock, spec(p.lock, 1.0), now_ms);
            tweens.start_at(
                target,
                Property::Opacity,
                spec(p.opacity, LOCK_IN_OPACITY),
                now_ms,
            );
        }
        self.tween_ring(
            now_ms,
            RING_EXPANDED_SCALE,
            RING_EXPANDED_OPACITY,
            RING_EXPAND_MS,
        );
    }

    /// Lets colors and opacity settle back. A lock-in still in flight is
    /// dropped where it is and easing takes over from that point.
    fn release(&mut self, now_ms: f64) {
        log::debug!("release: {} particles", self.particles.len());
        for p in &self.particles {
            let target = FieldTarget::Particle(p.index);
            self.tweens.cancel(target, Property::X);
            self.tweens.cancel(target, Property::Y);
            let spec =
                |from: f64, to: f64| TweenSpec::new(from, to, RELEASE_MS, Easing::Power2InOut);
            let tweens = &mut self.tweens;
            tweens.start_at(target, Property::ColorLock, spec(p.lock, 0.0), now_ms);
            tweens.start_at(
                target,
                Property::Opacity,
                spec(p.opacity, p.base_opacity),
                now_ms,
            );
        }
        self.tween_ring(now_ms, 1.0, RING_REST_OPACITY, RING_COLLAPSE_MS);
    }

    fn tween_ring(&mut self, now_ms: f64, scale: f64, opacity: f64, duration_ms: f64) {
        self.tweens.start_at(
            FieldTarget::Ring,
            Property::Scale,
            TweenSpec::new(self.ring.scale, scale, duration_ms, Easing::ExpoInOut),
            now_ms,
        );
        self.tweens.start_at(
            FieldTarget::Ring,
            Property::Opacity,
            TweenSpec::new(self.ring.opacity, opacity, duration_ms, Easing::ExpoInOut),
            now_ms,
        );
    }

    fn update_ring(&mut self, offset: DVec2) {
        let ring = &mut self.ring;
        ring.rotation_deg = offset.x * RING_ROTATION_PER_PX;
        ring.translate = -offset * RING_SHIFT_PER_PX;
        ring.stroke = self.theme.accent;
        if let Some(scale) = self.tweens.value(FieldTarget::Ring, Property::Scale) {
            ring.scale = scale;
        }
        if let Some(opacity) = self.tweens.value(FieldTarget::Ring, Property::Opacity) {
            ring.opacity = opacity;
        }
    }

    fn update_particles(&mut self, now_ms: f64, offset: DVec2, proximity: f64) {
        let ease = if self.expanded {
            EASE_EXPANDED
        } else {
            EASE_IDLE
        };
        let wraps = self.mode == GeometryMode::Chaos;
        let drift_speed = CHAOS_BASE_SPEED + proximity * CHAOS_PROXIMITY_SPEED;
        let jitter = proximity * CHAOS_JITTER;
        let count = self.particles.len();
        let strategy = self.strategies.get(self.mode);
        let tweens = &self.tweens;
        let rng = &mut self.rng;
        let theme = self.theme;

        for p in self.particles.iter_mut() {
            let key = FieldTarget::Particle(p.index);
            let tween_x = tweens.value(key, Property::X);
            let tween_y = tweens.value(key, Property::Y);

            if tween_x.is_some() || tween_y.is_some() {
                if let Some(x) = tween_x {
                    p.position.x = x;
                }
                if let Some(y) = tween_y {
                    p.position.y = y;
                }
            } else {
                let slot = Slot {
                    index: p.index,
                    count,
                    anchor: p.chaos_anchor,
                };
                let goal =
                    strategy.target(slot, now_ms) + offset * PARALLAX_STRENGTH * p.depth();
                if wraps {
                    let delta = toroidal_delta(goal - p.position);
                    p.position += delta * ease;
                    p.position += p.velocity * drift_speed;
                    let shake = DVec2::new(rng.next_centered(0.5), rng.next_centered(0.5));
                    p.position += shake * jitter;
                    p.position = wrap_view_box(p.position);
                } else {
                    p.position += (goal - p.position) * ease;
                }
            }

            if let Some(lock) = tweens.value(key, Property::ColorLock) {
                p.lock = lock;
            }
            if let Some(opacity) = tweens.value(key, Property::Opacity) {
                p.opacity = opacity;
            }
            p.recolor(&theme);
        }
    }
}

/// Shortest displacement on the wrapped view box, each axis in [-500, 500).
fn toroidal_delta(d: DVec2) -> DVec2 {
    let half = VIEW_BOX / 2.0;
    DVec2::new(
        (d.x + half).rem_euclid(VIEW_BOX) - half,
        (d.y + half).rem_euclid(VIEW_BOX) - half,
    )
}

/// Wraps into [0, VIEW_BOX) on both axes.
fn wrap_view_box(p: DVec2) -> DVec2 {
    let wrap = |v: f64| {
        let w = v.rem_euclid(VIEW_BOX);
        // rem_euclid can round up to exactly VIEW_BOX for tiny negative inputs.
        if w >= VIEW_BOX {
            0.0
        } else {
            w
        }
    };
    DVec2::new(wrap(p.x), wrap(p.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidemark_core::color::Srgb;
    use tidemark_core::geometry::Viewport;

    const FRAME_MS: f64 = 16.0;

    #[derive(Default)]
    struct RecordingSink {
        rings: Vec<RingTransform>,
        particles: Vec<(usize, f64, f64, Srgb, f64)>,
    }

    impl RenderSink for RecordingSink {
        fn draw_particle(&mut self, index: usize, x: f64, y: f64, color: Srgb, opacity: f64) {
            self.particles.push((index, x, y, color, opacity));
        }

        fn draw_ring_layer(&mut self, transform: RingTransform) {
            self.rings.push(transform);
        }
    }

    fn centered() -> PointerSample {
        PointerSample::centered(Viewport::new(1200.0, 800.0))
    }

    fn gold_navy() -> ThemeColors {
        ThemeColors::from_hex("#d4af37", "#112240").unwrap()
    }

    fn field(count: i64, mode: GeometryMode) -> ParticleField {
        ParticleField::initialize(count, mode, gold_navy()).unwrap()
    }

    fn still_circle(count: i64) -> ParticleField {
        let mut config = FieldConfig::new(count, GeometryMode::Circle, gold_navy());
        config.layout.rotation_speed = 0.0;
        ParticleField::with_config(config).unwrap()
    }

    fn run(field: &mut ParticleField, from_ms: f64, frames: usize, expanded: bool) -> f64 {
        let mut now = from_ms;
        for _ in 0..frames {
            now += FRAME_MS;
            field.tick(now, centered(), expanded).unwrap();
        }
        now
    }

    // ---- Construction ----

    #[test]
    fn negative_count_is_config_error() {
        let err = ParticleField::initialize(-1, GeometryMode::Grid, gold_navy())
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::NegativeCount(-1)));
        assert_eq!(err.category(), tidemark_core::ErrorCategory::Config);
    }

    #[test]
    fn zero_count_is_inert_but_valid() {
        let mut f = field(0, GeometryMode::Lotus);
        f.tick(0.0, centered(), false).unwrap();
        f.tick(16.0, centered(), true).unwrap();
        let mut sink = RecordingSink::default();
        f.render(&mut sink).unwrap();
        assert!(sink.particles.is_empty());
        assert_eq!(sink.rings.len(), 1);
    }

    #[test]
    fn same_seed_same_field() {
        let a = field(50, GeometryMode::Chaos);
        let b = field(50, GeometryMode::Chaos);
        assert_eq!(a.particles(), b.particles());
    }

    // ---- Tick and render ----

    #[test]
    fn render_emits_one_draw_per_particle_in_index_order() {
        for count in [0_i64, 1, 7, 80] {
            let mut f = field(count, GeometryMode::Circle);
            f.tick(16.0, centered(), false).unwrap();
            let mut sink = RecordingSink::default();
            f.render(&mut sink).unwrap();
            assert_eq!(sink.particles.len(), count as usize);
            for (expected, drawn) in sink.particles.iter().enumerate() {
                assert_eq!(drawn.0, expected);
            }
        }
    }

    #[test]
    fn tick_moves_every_particle() {
        let mut f = field(40, GeometryMode::Grid);
        let before: Vec<DVec2> = f.particles().iter().map(|p| p.position).collect();
        f.tick(16.0, centered(), false).unwrap();
        let moved = f
            .particles()
            .iter()
            .zip(&before)
            .filter(|(p, b)| p.position != **b)
            .count();
        assert_eq!(moved, 40);
    }

    #[test]
    fn distance_to_fixed_target_never_grows() {
        let mut f = field(80, GeometryMode::Grid);
        let grid = f.strategies().grid.clone();
        let target = |i: usize| {
            grid.target(
                Slot {
                    index: i,
                    count: 80,
                    anchor: DVec2::ZERO,
                },
                0.0,
            )
        };
        let mut last: Vec<f64> = f
            .particles()
            .iter()
            .map(|p| (p.position - target(p.index)).length())
            .collect();
        let mut now = 0.0;
        for _ in 0..120 {
            now += FRAME_MS;
            f.tick(now, centered(), false).unwrap();
            for p in f.particles() {
                let d = (p.position - target(p.index)).length();
                assert!(d <= last[p.index] + 1e-9, "particle {} moved away", p.index);
                last[p.index] = d;
            }
        }
    }

    #[test]
    fn expanded_eases_slower_than_idle() {
        let mut idle = field(10, GeometryMode::Grid);
        let mut slow = field(10, GeometryMode::Grid);
        let target = idle.strategies().grid.target(
            Slot {
                index: 0,
                count: 10,
                anchor: DVec2::ZERO,
            },
            0.0,
        );
        let start = idle.particles()[0].position;
        idle.tick(16.0, centered(), false).unwrap();
        // Run the expanded field through its lock-in so easing applies again.
        let now = run(&mut slow, 0.0, 100, true);
        let before = slow.particles()[0].position;
        slow.tick(now + FRAME_MS, centered(), true).unwrap();

        let idle_step = (idle.particles()[0].position - start).length() / (target - start).length();
        let slow_step = (slow.particles()[0].position - before).length() / (target - before).length();
        assert!((idle_step - EASE_IDLE).abs() < 1e-9, "idle step {idle_step}");
        assert!((slow_step - EASE_EXPANDED).abs() < 1e-9, "expanded step {slow_step}");
    }

    #[test]
    fn parallax_scales_with_depth() {
        let mut f = field(10, GeometryMode::Grid);
        let viewport = Viewport::new(1000.0, 1000.0);
        let pointer = PointerSample {
            position: DVec2::new(700.0, 500.0),
            viewport,
        };
        let mut now = 0.0;
        for _ in 0..600 {
            now += FRAME_MS;
            f.tick(now, pointer, false).unwrap();
        }
        let base = |i: usize| {
            f.strategies().grid.target(
                Slot {
                    index: i,
                    count: 10,
                    anchor: DVec2::ZERO,
                },
                0.0,
            )
        };
        // 200 px right of center: depth 1 shifts 10, depth 5 shifts 50.
        let shift0 = f.particles()[0].position - base(0);
        let shift4 = f.particles()[4].position - base(4);
        assert!((shift0 - DVec2::new(10.0, 0.0)).length() < 1e-6, "{shift0}");
        assert!((shift4 - DVec2::new(50.0, 0.0)).length() < 1e-6, "{shift4}");
    }

    #[test]
    fn chaos_positions_stay_wrapped() {
        let mut f = field(60, GeometryMode::Chaos);
        let pointer = PointerSample {
            position: DVec2::new(0.0, 0.0),
            viewport: Viewport::new(1200.0, 800.0),
        };
        let mut now = 0.0;
        for _ in 0..400 {
            now += FRAME_MS;
            f.tick(now, pointer, false).unwrap();
            for p in f.particles() {
                assert!(p.position.is_finite());
                assert!((0.0..VIEW_BOX).contains(&p.position.x), "x = {}", p.position.x);
                assert!((0.0..VIEW_BOX).contains(&p.position.y), "y = {}", p.position.y);
            }
        }
    }

    #[test]
    fn non_finite_clock_is_rejected() {
        let mut f = field(3, GeometryMode::Grid);
        assert!(f.tick(f64::NAN, centered(), false).is_err());
        assert!(f.tick(16.0, centered(), false).is_ok());
    }

    // ---- Modes ----

    #[test]
    fn circle_converges_to_even_spacing() {
        let count = 24;
        let mut f = still_circle(count);
        run(&mut f, 0.0, 300, false);
        let angles: Vec<f64> = f
            .particles()
            .iter()
            .map(|p| {
                let d = p.position - CANVAS_CENTER;
                d.y.atan2(d.x)
            })
            .collect();
        let expected = TAU / count as f64;
        for i in 0..(count as usize - 1) {
            let step = (angles[i + 1] - angles[i]).rem_euclid(TAU);
            assert!((step - expected).abs() < 1e-4, "step {i}: {step}");
        }
    }

    #[test]
    fn grid_to_circle_reaches_ring_radius() {
        let mut f = ParticleField::initialize(80, GeometryMode::Grid, gold_navy()).unwrap();
        f.set_mode(GeometryMode::Circle).unwrap();
        run(&mut f, 0.0, 200, false);
        let radius = f.config().layout.ring_radius;
        for p in f.particles() {
            let r = (p.position - CANVAS_CENTER).length();
            assert!((r - radius).abs() < 0.5, "particle {} at radius {r}", p.index);
        }
    }

    #[test]
    fn set_mode_does_not_move_particles_until_next_tick() {
        let mut f = field(20, GeometryMode::Chaos);
        let before: Vec<DVec2> = f.particles().iter().map(|p| p.position).collect();
        f.set_mode(GeometryMode::Lotus).unwrap();
        let after: Vec<DVec2> = f.particles().iter().map(|p| p.position).collect();
        assert_eq!(before, after);
        assert_eq!(f.mode(), GeometryMode::Lotus);
    }

    // ---- Theme ----

    #[test]
    fn theme_cross_fades_and_lands_exactly() {
        let mut f = field(5, GeometryMode::Grid);
        let teal = ThemeColors::from_hex("#64ffda", "#020c1b").unwrap();
        f.tick(0.0, centered(), false).unwrap();
        f.set_theme(teal).unwrap();
        f.tick(16.0, centered(), false).unwrap();
        assert_eq!(f.theme(), gold_navy(), "swap must not be instantaneous");
        f.tick(916.0, centered(), false).unwrap();
        let mid = f.theme();
        assert_ne!(mid, gold_navy());
        assert_ne!(mid, teal);
        f.tick(1816.0, centered(), false).unwrap();
        assert_eq!(f.theme(), teal);
    }

    #[test]
    fn theme_set_before_first_tick_fades_from_host_clock() {
        let mut f = field(5, GeometryMode::Grid);
        let teal = ThemeColors::from_hex("#64ffda", "#020c1b").unwrap();
        f.set_theme(teal).unwrap();
        f.tick(5000.0, centered(), false).unwrap();
        assert_eq!(f.theme(), gold_navy());
        f.tick(5900.0, centered(), false).unwrap();
        assert_ne!(f.theme(), gold_navy());
        assert_ne!(f.theme(), teal);
        f.tick(6800.0, centered(), false).unwrap();
        assert_eq!(f.theme(), teal);
    }

    #[test]
    fn superseding_theme_starts_from_displayed_colors() {
        let mut f = field(5, GeometryMode::Grid);
        let teal = ThemeColors::from_hex("#64ffda", "#020c1b").unwrap();
        let rose = ThemeColors::from_hex("#ff6b81", "#2d0a14").unwrap();
        f.tick(0.0, centered(), false).unwrap();
        f.set_theme(teal).unwrap();
        f.tick(16.0, centered(), false).unwrap();
        f.tick(616.0, centered(), false).unwrap();
        let shown = f.theme();
        assert_ne!(shown, gold_navy());
        f.set_theme(rose).unwrap();
        f.tick(632.0, centered(), false).unwrap();
        assert_eq!(f.theme(), shown, "new fade must start where the old one was");
        f.tick(632.0 + THEME_FADE_MS, centered(), false).unwrap();
        assert_eq!(f.theme(), rose);
    }

    // ---- Expanded lock-in ----

    #[test]
    fn lock_in_owns_positions_until_it_lands() {
        let mut f = field(12, GeometryMode::Grid);
        let now = run(&mut f, 0.0, 10, false);
        let start: Vec<DVec2> = f.particles().iter().map(|p| p.position).collect();

        // Edge tick: tweens start at their current value, no easing applied.
        f.tick(now, centered(), true).unwrap();
        for p in f.particles() {
            assert_eq!(p.position, start[p.index]);
            assert!(f.is_locked(p.index));
        }

        // Halfway through a symmetric curve: exactly the midpoint.
        f.tick(now + LOCK_IN_MS / 2.0, centered(), true).unwrap();
        let radius = f.config().layout.ring_radius;
        for p in f.particles() {
            let angle = TAU * p.index as f64 / 12.0;
            let spot = CANVAS_CENTER + DVec2::new(angle.cos(), angle.sin()) * radius;
            let mid = (start[p.index] + spot) / 2.0;
            assert!((p.position - mid).length() < 1e-9, "particle {}", p.index);
        }

        // Landing tick writes the end value, then easing resumes from it.
        f.tick(now + LOCK_IN_MS, centered(), true).unwrap();
        for p in f.particles() {
            assert!(!f.is_locked(p.index));
            let angle = TAU * p.index as f64 / 12.0;
            let spot = CANVAS_CENTER + DVec2::new(angle.cos(), angle.sin()) * radius;
            let goal = f.strategies().grid.target(
                Slot {
                    index: p.index,
                    count: 12,
                    anchor: p.chaos_anchor,
                },
                0.0,
            );
            let expected = spot + (goal - spot) * EASE_EXPANDED;
            assert!((p.position - expected).length() < 1e-9, "particle {}", p.index);
            assert_eq!(p.color, gold_navy().accent);
            assert_eq!(p.opacity, LOCK_IN_OPACITY);
        }
    }

    #[test]
    fn release_restores_base_opacity_and_ring() {
        let mut f = field(8, GeometryMode::Circle);
        let now = run(&mut f, 0.0, 120, true);
        assert!((f.ring().scale - RING_EXPANDED_SCALE).abs() < 1e-12);
        assert!((f.ring().opacity - RING_EXPANDED_OPACITY).abs() < 1e-12);

        run(&mut f, now, 150, false);
        for p in f.particles() {
            assert_eq!(p.opacity, p.base_opacity);
            assert_eq!(p.lock, 0.0);
        }
        assert_eq!(f.ring().scale, 1.0);
        assert_eq!(f.ring().opacity, RING_REST_OPACITY);
    }

    #[test]
    fn ring_follows_pointer() {
        let mut f = field(1, GeometryMode::Circle);
        let pointer = PointerSample {
            position: DVec2::new(700.0, 300.0),
            viewport: Viewport::new(1000.0, 1000.0),
        };
        f.tick(16.0, pointer, false).unwrap();
        let ring = f.ring();
        assert!((ring.rotation_deg - 2.0).abs() < 1e-12);
        assert!((ring.translate - DVec2::new(-6.0, 6.0)).length() < 1e-12);
        assert_eq!(ring.stroke, gold_navy().accent);
    }

    // ---- Lifecycle ----

    #[test]
    fn destroyed_engine_rejects_every_call() {
        let mut f = field(10, GeometryMode::Lotus);
        f.tick(0.0, centered(), true).unwrap();
        f.destroy().unwrap();
        assert!(f.is_destroyed());
        assert!(f.particles().is_empty());

        let mut sink = RecordingSink::default();
        let errors = [
            f.tick(16.0, centered(), false).unwrap_err(),
            f.set_mode(GeometryMode::Grid).unwrap_err(),
            f.set_theme(gold_navy()).unwrap_err(),
            f.render(&mut sink).unwrap_err(),
            f.destroy().unwrap_err(),
        ];
        for err in errors {
            assert_eq!(err.category(), tidemark_core::ErrorCategory::Lifecycle);
        }
        assert!(sink.particles.is_empty() && sink.rings.is_empty());
    }

    #[test]
    fn params_reflect_active_mode_and_theme() {
        let mut f = field(10, GeometryMode::Grid);
        f.set_mode(GeometryMode::Lotus).unwrap();
        f.set_theme(ThemeColors::from_hex("#64ffda", "#020c1b").unwrap())
            .unwrap();
        let params = f.params();
        assert_eq!(params["mode"], "lotus");
        assert_eq!(params["accent"], "#64ffda");
        assert_eq!(params["count"], 10);
        assert!(f.param_schema().get("ring_radius").is_some());
    }

    #[test]
    fn toroidal_delta_picks_short_way() {
        let d = toroidal_delta(DVec2::new(900.0, -900.0));
        assert!((d - DVec2::new(-100.0, 100.0)).length() < 1e-9);
        let e = toroidal_delta(DVec2::new(10.0, -10.0));
        assert!((e - DVec2::new(10.0, -10.0)).length() < 1e-9);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn any_count_ticks_and_renders(count in 0_i64..200, seed in any::<u64>()) {
                let mut config = FieldConfig::new(count, GeometryMode::Lotus, ThemeColors::default());
                config.seed = seed;
                let mut f = ParticleField::with_config(config).unwrap();
                f.tick(16.0, centered(), false).unwrap();
                f.tick(32.0, centered(), true).unwrap();
                let mut sink = RecordingSink::default();
                f.render(&mut sink).unwrap();
                prop_assert_eq!(sink.particles.len(), count as usize);
                prop_assert!(sink.particles.iter().all(|d| d.1.is_finite() && d.2.is_finite()));
            }

            #[test]
            fn wrap_lands_inside(x in -5000.0_f64..5000.0, y in -5000.0_f64..5000.0) {
                let p = wrap_view_box(DVec2::new(x, y));
                prop_assert!((0.0..VIEW_BOX).contains(&p.x));
                prop_assert!((0.0..VIEW_BOX).contains(&p.y));
            }
        }
    }
}
