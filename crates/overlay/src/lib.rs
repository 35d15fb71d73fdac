#![deny(unsafe_code)]
//! Shared-element transition for the full-screen detail overlay.
//!
//! ```text
//! Closed --open(rect)--> Expanding --geometry lands--> Open --close()--> Closing --done--> Closed
//! ```
//!
//! The overlay box grows from the rect of the element that was clicked to the
//! whole viewport, then its content fades in and each content element rises
//! into place on a stagger. Closing runs the elements out in reverse order and
//! then shrinks and fades the box. The controller never touches particles:
//! its only link to the background is [`TransitionController::expanded`].
//!
//! All motion runs on a [`TweenScheduler`] driven by [`TransitionController::advance`].
//! Animations requested by `open` and `close` start at the next advance.

use serde::{Deserialize, Serialize};
use std::fmt;
use tidemark_core::easing::Easing;
use tidemark_core::error::EngineError;
use tidemark_core::geometry::{Rect, Viewport};
use tidemark_core::tween::{Property, TweenScheduler, TweenSpec};

const EXPAND_MS: f64 = 800.0;
const EXPAND_EASING: Easing = Easing::Power4InOut;
const CONTENT_FADE_MS: f64 = 100.0;
const ELEMENT_ENTER_MS: f64 = 800.0;
const ELEMENT_ENTER_STAGGER_MS: f64 = 200.0;
const ELEMENT_ENTER_OFFSET: f64 = 50.0;
const ELEMENT_EXIT_MS: f64 = 400.0;
const ELEMENT_EXIT_STAGGER_MS: f64 = 50.0;
const ELEMENT_EXIT_OFFSET: f64 = -20.0;
const DISMISS_MS: f64 = 500.0;
const DISMISS_SCALE: f64 = 0.95;

/// Lifecycle of the overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionState {
    #[default]
    Closed,
    Expanding,
    Open,
    Closing,
}

impl TransitionState {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionState::Closed => "closed",
            TransitionState::Expanding => "expanding",
            TransitionState::Open => "open",
            TransitionState::Closing => "closing",
        }
    }
}

impl fmt::Display for TransitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the overlay shows: an id for the host and the labels of the elements
/// that enter one after another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayContent {
    pub id: String,
    pub elements: Vec<String>,
}

impl OverlayContent {
    pub fn new(
        id: impl Into<String>,
        elements: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }
}

/// Visual state of one content element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementVisual {
    /// Vertical offset from the resting position, in pixels.
    pub offset_y: f64,
    pub opacity: f64,
}

impl ElementVisual {
    const HIDDEN: ElementVisual = ElementVisual {
        offset_y: ELEMENT_ENTER_OFFSET,
        opacity: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Part {
    Geometry,
    Container,
    Content,
    Element(usize),
}

type Callback = Box<dyn FnMut()>;

/// Drives the detail overlay through its four states.
pub struct TransitionController {
    state: TransitionState,
    viewport: Viewport,
    source: Rect,
    geometry: Rect,
    container_opacity: f64,
    container_scale: f64,
    content_opacity: f64,
    content: Option<OverlayContent>,
    elements: Vec<ElementVisual>,
    revealing: bool,
    tweens: TweenScheduler<Part>,
    on_open_complete: Option<Callback>,
    on_close_complete: Option<Callback>,
}

impl TransitionController {
    pub fn new(viewport: Viewport) -> Self {
        let full = viewport.full_rect();
        Self {
            state: TransitionState::Closed,
            viewport,
            source: full,
            geometry: full,
            container_opacity: 0.0,
            container_scale: 1.0,
            content_opacity: 0.0,
            content: None,
            elements: Vec::new(),
            revealing: false,
            tweens: TweenScheduler::with_capacity(16),
            on_open_complete: None,
            on_close_complete: None,
        }
    }

    /// Registers the callback run once the last content element has landed.
    pub fn on_open_complete(&mut self, cb: impl FnMut() + 'static) {
        self.on_open_complete = Some(Box::new(cb));
    }

    /// Registers the unmount callback run when the overlay reaches `Closed`.
    pub fn on_close_complete(&mut self, cb: impl FnMut() + 'static) {
        self.on_close_complete = Some(Box::new(cb));
    }

    /// Records a viewport resize; empty or non-finite sizes are ignored. An open
    /// overlay keeps covering the viewport; an expanding one lands on the new size.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring invalid overlay viewport {width}x{height}");
            return;
        }
        self.viewport = Viewport::new(width, height);
        if self.state == TransitionState::Open {
            self.geometry = self.viewport.full_rect();
        }
    }

    /// Starts expanding from `source_rect` toward the full viewport.
    ///
    /// Already expanding or open is a no-op. A rect without area, or a call
    /// while closing, is rejected without touching any state.
    pub fn open(&mut self, source_rect: Rect, content: OverlayContent) -> Result<(), EngineError> {
        if !source_rect.has_area() {
            log::warn!(
                "open rejected: degenerate rect {}x{}",
                source_rect.width,
                source_rect.height
            );
            return Err(EngineError::DegenerateRect {
                width: source_rect.width,
                height: source_rect.height,
            });
        }
        match self.state {
            TransitionState::Expanding | TransitionState::Open => {
                log::debug!("open ignored: overlay already {}", self.state);
                return Ok(());
            }
            TransitionState::Closing => {
                log::warn!("open rejected: overlay is closing");
                return Err(EngineError::InvalidTransition {
                    op: "open",
                    state: self.state.to_string(),
                });
            }
            TransitionState::Closed => {}
        }

        log::debug!("overlay expanding: content '{}'", content.id);
        self.tweens.cancel_all();
        self.source = source_rect;
        self.geometry = source_rect;
        self.container_opacity = 1.0;
        self.container_scale = 1.0;
        self.content_opacity = 0.0;
        self.elements.clear();
        self.elements
            .resize(content.elements.len(), ElementVisual::HIDDEN);
        self.content = Some(content);
        self.revealing = false;

        let full = self.viewport.full_rect();
        for (prop, from, to) in rect_edges(&source_rect, &full) {
            self.tweens.start(
                Part::Geometry,
                prop,
                TweenSpec::new(from, to, EXPAND_MS, EXPAND_EASING),
            );
        }
        self.state = TransitionState::Expanding;
        Ok(())
    }

    /// Starts closing. No-op when closed or already closing.
    ///
    /// From `Open` the elements leave in reverse order before the box is
    /// dismissed. From `Expanding` the geometry tween is dropped where it is
    /// and the box is dismissed at once; the content is never revealed.
    pub fn close(&mut self) {
        match self.state {
            TransitionState::Closed | TransitionState::Closing => {
                log::debug!("close ignored: overlay already {}", self.state);
            }
            TransitionState::Expanding => {
                let dropped = self.tweens.cancel_target(Part::Geometry);
                log::debug!("overlay closing mid-expand ({dropped} geometry tweens dropped)");
                self.dismiss_container(0.0);
                self.state = TransitionState::Closing;
            }
            TransitionState::Open => {
                log::debug!("overlay closing");
                self.revealing = false;
                let n = self.elements.len();
                for (i, el) in self.elements.iter().enumerate() {
                    let delay = (n - 1 - i) as f64 * ELEMENT_EXIT_STAGGER_MS;
                    let spec = |from: f64, to: f64| {
                        TweenSpec::new(from, to, ELEMENT_EXIT_MS, Easing::Power1Out).delayed(delay)
                    };
                    self.tweens.start(
                        Part::Element(i),
                        Property::OffsetY,
                        spec(el.offset_y, ELEMENT_EXIT_OFFSET),
                    );
                    self.tweens
                        .start(Part::Element(i), Property::Opacity, spec(el.opacity, 0.0));
                }
                let elements_done = match n {
                    0 => 0.0,
                    n => (n - 1) as f64 * ELEMENT_EXIT_STAGGER_MS + ELEMENT_EXIT_MS,
                };
                self.dismiss_container(elements_done);
                self.state = TransitionState::Closing;
            }
        }
    }

    /// Moves the overlay clock to `now_ms` and runs any state change that
    /// became due, including the completion callbacks.
    pub fn advance(&mut self, now_ms: f64) {
        self.tweens.advance(now_ms);
        self.sync_visuals();

        match self.state {
            TransitionState::Expanding if !self.tweens.is_target_active(Part::Geometry) => {
                self.geometry = self.viewport.full_rect();
                self.reveal();
            }
            TransitionState::Open if self.revealing && self.tweens.is_empty() => {
                self.revealing = false;
                log::debug!("overlay content revealed");
                if let Some(cb) = self.on_open_complete.as_mut() {
                    cb();
                }
            }
            TransitionState::Closing if self.tweens.is_empty() => {
                self.state = TransitionState::Closed;
                self.content = None;
                self.elements.clear();
                log::debug!("overlay closed");
                if let Some(cb) = self.on_close_complete.as_mut() {
                    cb();
                }
            }
            _ => {}
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// True from the moment `open` succeeds until `Closed` is reached again.
    pub fn expanded(&self) -> bool {
        self.state != TransitionState::Closed
    }

    /// Current rect of the overlay box, in viewport pixels.
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Rect of the expand animation at normalized time `progress`.
    ///
    /// `0` is the source rect and `1` the full viewport, both exactly.
    pub fn geometry_at(&self, progress: f64) -> Rect {
        self.source
            .lerp(&self.viewport.full_rect(), EXPAND_EASING.apply(progress))
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Opacity of the overlay box itself.
    pub fn container_opacity(&self) -> f64 {
        self.container_opacity
    }

    pub fn container_scale(&self) -> f64 {
        self.container_scale
    }

    /// Opacity of the content layer inside the box.
    pub fn content_opacity(&self) -> f64 {
        self.content_opacity
    }

    pub fn element(&self, index: usize) -> Option<ElementVisual> {
        self.elements.get(index).copied()
    }

    pub fn content(&self) -> Option<&OverlayContent> {
        self.content.as_ref()
    }

    /// Drops every tween without running callbacks. Used on teardown.
    pub fn cancel_all(&mut self) {
        self.tweens.cancel_all();
        self.revealing = false;
    }

    /// Geometry landed: fade the content in and stagger the elements up.
    fn reveal(&mut self) {
        log::debug!("overlay open, revealing {} elements", self.elements.len());
        self.state = TransitionState::Open;
        self.revealing = true;
        let now = self.tweens.now();
        self.tweens.start_at(
            Part::Content,
            Property::Opacity,
            TweenSpec::new(self.content_opacity, 1.0, CONTENT_FADE_MS, Easing::Linear),
            now,
        );
        for i in 0..self.elements.len() {
            let delay = i as f64 * ELEMENT_ENTER_STAGGER_MS;
            let spec = |from: f64, to: f64| {
                TweenSpec::new(from, to, ELEMENT_ENTER_MS, Easing::Power3Out).delayed(delay)
            };
            self.tweens.start_at(
                Part::Element(i),
                Property::OffsetY,
                spec(ELEMENT_ENTER_OFFSET, 0.0),
                now,
            );
            self.tweens
                .start_at(Part::Element(i), Property::Opacity, spec(0.0, 1.0), now);
        }
    }

    fn dismiss_container(&mut self, delay_ms: f64) {
        let spec = |from: f64, to: f64| {
            TweenSpec::new(from, to, DISMISS_MS, Easing::Power3InOut).delayed(delay_ms)
        };
        self.tweens.start(
            Part::Container,
            Property::Opacity,
            spec(self.container_opacity, 0.0),
        );
        self.tweens.start(
            Part::Container,
            Property::Scale,
            spec(self.container_scale, DISMISS_SCALE),
        );
    }

    /// Copies tween values (including ones that just landed) into the visuals.
    fn sync_visuals(&mut self) {
        let tweens = &self.tweens;
        let read = |part: Part, prop: Property, fallback: f64| {
            tweens.current(part, prop).unwrap_or(fallback)
        };

        let g = self.geometry;
        self.geometry = Rect {
            top: read(Part::Geometry, Property::Top, g.top),
            left: read(Part::Geometry, Property::Left, g.left),
            width: read(Part::Geometry, Property::Width, g.width),
            height: read(Part::Geometry, Property::Height, g.height),
        };
        self.container_opacity = read(Part::Container, Property::Opacity, self.container_opacity);
        self.container_scale = read(Part::Container, Property::Scale, self.container_scale);
        self.content_opacity = read(Part::Content, Property::Opacity, self.content_opacity);
        for (i, el) in self.elements.iter_mut().enumerate() {
            el.offset_y = read(Part::Element(i), Property::OffsetY, el.offset_y);
            el.opacity = read(Part::Element(i), Property::Opacity, el.opacity);
        }
    }
}

impl fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionController")
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("geometry", &self.geometry)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

fn rect_edges(from: &Rect, to: &Rect) -> [(Property, f64, f64); 4] {
    [
        (Property::Top, from.top, to.top),
        (Property::Left, from.left, to.left),
        (Property::Width, from.width, to.width),
        (Property::Height, from.height, to.height),
    ]
}
