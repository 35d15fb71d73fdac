#![deny(unsafe_code)]
//! Core types for the tidemark background and overlay.
//!
//! Provides the [`EngineError`] type, sRGB/OKLab colors and [`ThemeColors`],
//! view-box and viewport geometry, easing curves, the generic
//! [`TweenScheduler`], the [`InputTracker`], the [`RenderSink`] trait the
//! host implements, the `Xorshift64` PRNG and JSON parameter helpers.

pub mod color;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod input;
pub mod params;
pub mod prng;
pub mod sink;
pub mod theme;
pub mod tween;

pub use color::Srgb;
pub use easing::Easing;
pub use error::{EngineError, ErrorCategory};
pub use geometry::{Rect, Viewport, CANVAS_CENTER, VIEW_BOX};
pub use input::{InputTracker, PointerSample};
pub use prng::Xorshift64;
pub use sink::{RenderSink, RingTransform};
pub use theme::ThemeColors;
pub use tween::{Completed, Property, TweenScheduler, TweenSpec};

pub use glam::DVec2;
