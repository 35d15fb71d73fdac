//! A small property-tween scheduler driven by the frame clock.
//!
//! Each active tween animates one `(target, property)` pair from a start value
//! to an end value over a duration with an [`Easing`] curve. Starting a tween
//! on a pair that already has one in flight replaces it: the older tween is
//! dropped and never reported as completed.
//!
//! A tween scheduled with [`TweenScheduler::start`] between advances is
//! anchored to the clock of the next advance, so a host whose clock starts far
//! from zero, or that idles between frames, still sees the whole animation.
//! Code already running inside a frame uses [`TweenScheduler::start_at`].
//!
//! The scheduler never calls back into user code. After [`TweenScheduler::advance`]
//! the caller inspects [`TweenScheduler::completed`] and reacts, which keeps
//! ownership simple and makes a canceled tween's silence structural.

use crate::easing::Easing;
use std::collections::HashMap;
use std::hash::Hash;

/// Animatable properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    X,
    Y,
    Opacity,
    Scale,
    /// How far a particle's color is pulled toward the accent, in [0, 1].
    ColorLock,
    /// Progress of a theme cross-fade, in [0, 1].
    ThemeMix,
    Top,
    Left,
    Width,
    Height,
    /// Vertical offset of a content element, in pixels.
    OffsetY,
}

/// Parameters of a tween before it is scheduled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSpec {
    pub from: f64,
    pub to: f64,
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub easing: Easing,
}

impl TweenSpec {
    pub fn new(from: f64, to: f64, duration_ms: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms,
            delay_ms: 0.0,
            easing,
        }
    }

    /// Returns the same tween starting `delay_ms` after it is scheduled.
    pub fn delayed(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveTween {
    spec: TweenSpec,
    /// `None` until the first advance after scheduling.
    start_ms: Option<f64>,
    value: f64,
}

impl ActiveTween {
    /// Returns `(value, finished)` at `now_ms`, anchoring the tween first if
    /// it has not started yet.
    fn sample(&mut self, now_ms: f64) -> (f64, bool) {
        let spec = self.spec;
        let start_ms = *self.start_ms.get_or_insert(now_ms + spec.delay_ms);
        if now_ms < start_ms {
            return (spec.from, false);
        }
        let elapsed = now_ms - start_ms;
        if spec.duration_ms <= 0.0 || elapsed >= spec.duration_ms {
            return (spec.to, true);
        }
        let eased = spec.easing.apply(elapsed / spec.duration_ms);
        (spec.from * (1.0 - eased) + spec.to * eased, false)
    }
}

/// A tween that reached its end during the last [`TweenScheduler::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completed<T> {
    pub target: T,
    pub property: Property,
    pub value: f64,
}

/// Schedules tweens keyed by `(target, property)` on a shared clock.
#[derive(Debug)]
pub struct TweenScheduler<T> {
    active: HashMap<(T, Property), ActiveTween>,
    completed: Vec<Completed<T>>,
    now_ms: f64,
}

impl<T> Default for TweenScheduler<T>
where
    T: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T> TweenScheduler<T>
where
    T: Copy + Eq + Hash,
{
    /// Creates a scheduler with room for `capacity` simultaneous tweens, so
    /// scheduling and advancing up to that many does not reallocate.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            active: HashMap::with_capacity(capacity),
            completed: Vec::with_capacity(capacity),
            now_ms: 0.0,
        }
    }

    /// Clock time of the most recent `advance`.
    pub fn now(&self) -> f64 {
        self.now_ms
    }

    /// Schedules a tween that starts (after its delay) at the next advance.
    ///
    /// Until then its value is `spec.from`. Returns `true` if an in-flight
    /// tween on the same pair was superseded.
    pub fn start(&mut self, target: T, property: Property, spec: TweenSpec) -> bool {
        self.insert(target, property, spec, None)
    }

    /// Schedules a tween anchored at `at_ms` (plus its delay), for callers
    /// that already know the frame time.
    pub fn start_at(
        &mut self,
        target: T,
        property: Property,
        spec: TweenSpec,
        at_ms: f64,
    ) -> bool {
        self.insert(target, property, spec, Some(at_ms + spec.delay_ms))
    }

    fn insert(
        &mut self,
        target: T,
        property: Property,
        spec: TweenSpec,
        start_ms: Option<f64>,
    ) -> bool {
        let tween = ActiveTween {
            spec,
            start_ms,
            value: spec.from,
        };
        let superseded = self.active.insert((target, property), tween).is_some();
        if superseded {
            log::trace!("tween on {property:?} superseded at t={:.1}ms", self.now_ms);
        }
        superseded
    }

    /// Moves the clock to `now_ms`, anchoring newly scheduled tweens and
    /// collecting the ones that finished.
    pub fn advance(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        self.completed.clear();
        let completed = &mut self.completed;
        self.active.retain(|&(target, property), tween| {
            let (value, finished) = tween.sample(now_ms);
            tween.value = value;
            if finished {
                completed.push(Completed {
                    target,
                    property,
                    value,
                });
            }
            !finished
        });
    }

    /// Current value of the in-flight tween on `(target, property)`.
    pub fn value(&self, target: T, property: Property) -> Option<f64> {
        self.active.get(&(target, property)).map(|t| t.value)
    }

    /// Value of the in-flight tween, or of one that completed on the last advance.
    pub fn current(&self, target: T, property: Property) -> Option<f64> {
        self.value(target, property).or_else(|| {
            self.completed
                .iter()
                .find(|c| c.target == target && c.property == property)
                .map(|c| c.value)
        })
    }

    pub fn is_active(&self, target: T, property: Property) -> bool {
        self.active.contains_key(&(target, property))
    }

    /// True if any tween on `target` is in flight.
    pub fn is_target_active(&self, target: T) -> bool {
        self.active.keys().any(|&(t, _)| t == target)
    }

    /// Tweens that finished during the last `advance`, in no particular order.
    pub fn completed(&self) -> &[Completed<T>] {
        &self.completed
    }

    /// Drops the tween on `(target, property)` without completing it.
    pub fn cancel(&mut self, target: T, property: Property) -> bool {
        self.active.remove(&(target, property)).is_some()
    }

    /// Drops every tween on `target` without completing them.
    pub fn cancel_target(&mut self, target: T) -> usize {
        let before = self.active.len();
        self.active.retain(|&(t, _), _| t != target);
        before - self.active.len()
    }

    /// Drops all tweens and pending completions.
    pub fn cancel_all(&mut self) {
        self.active.clear();
        self.completed.clear();
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
