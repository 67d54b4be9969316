//! Ruler interaction: playhead scrubbing and tick generation.

use super::{PointerEvent, Viewport};
use crate::controller::TimelineController;
use crate::timeline_math::{Tick, format_time, generate_ticks, tick_intervals, time_to_pixels};

#[derive(Debug, Default)]
pub struct RulerSurface {
    scrubbing: bool,
}

impl RulerSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    /// Press seeks immediately and starts a scrub.
    pub fn pointer_down(
        &mut self,
        ev: PointerEvent,
        vp: &Viewport,
        controller: &mut TimelineController,
    ) {
        self.scrubbing = true;
        controller.seek(vp.time_at(ev.x));
    }

    pub fn pointer_move(
        &mut self,
        ev: PointerEvent,
        vp: &Viewport,
        controller: &mut TimelineController,
    ) {
        if self.scrubbing {
            controller.seek(vp.time_at(ev.x));
        }
    }

    pub fn pointer_up(&mut self) {
        self.scrubbing = false;
    }

    /// Ruler ticks for the current zoom. Major spacing widens as the view
    /// zooms out; only major ticks are labeled.
    pub fn ticks(&self, vp: &Viewport, duration: f64) -> Vec<Tick> {
        let (major, minor) = tick_intervals(vp.zoom);
        generate_ticks(
            duration,
            major,
            minor,
            |t| time_to_pixels(t, vp.pixels_per_second, vp.zoom),
            format_time,
        )
    }
}
