//! Per-surface pointer state machines.
//!
//! Surfaces translate pointer events into coordinate/snap math and intent
//! calls on the [`TimelineController`](crate::controller::TimelineController).
//! They own only transient state (drags, previews, open menus) and never
//! mutate the store on pointer-move; a command is built on pointer-up (or
//! pointer-down, for the razor), so a cancelled drag leaves no trace in the
//! store or the history.

pub mod header;
pub mod ruler;
pub mod timeline;

use crate::constants::{BASE_PIXELS_PER_SECOND, DEFAULT_ZOOM, TRACK_HEIGHT};
use crate::timeline_math::{pixels_to_time, time_to_pixels};

/// A pointer position in surface-local pixels. `y` is measured from the top
/// of the track lanes (the ruler is its own surface).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Razor,
}

/// Per-frame view geometry shared by the surfaces. Keeping it in one value
/// guarantees ruler, lanes, and previews convert coordinates identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Time at the left edge of the visible area.
    pub start: f64,
    pub zoom: f64,
    pub pixels_per_second: f64,
    /// Pixel offset of the timeline content within its container.
    pub container_left: f64,
    /// Clamp limit for pixel→time conversion.
    pub max_duration: f64,
    pub track_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            start: 0.0,
            zoom: DEFAULT_ZOOM,
            pixels_per_second: BASE_PIXELS_PER_SECOND,
            container_left: 0.0,
            max_duration: 0.0,
            track_height: TRACK_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn time_at(&self, x: f64) -> f64 {
        pixels_to_time(
            x,
            self.container_left,
            self.start,
            self.pixels_per_second,
            self.zoom,
            self.max_duration,
        )
    }

    pub fn pixel_at(&self, time: f64) -> f64 {
        time_to_pixels(time - self.start, self.pixels_per_second, self.zoom) + self.container_left
    }

    /// Track lane index under `y`, if any.
    pub fn track_index_at(&self, y: f64, track_count: usize) -> Option<usize> {
        if y < 0.0 || self.track_height <= 0.0 {
            return None;
        }
        let index = (y / self.track_height) as usize;
        (index < track_count).then_some(index)
    }
}
