//! Track-header interaction: reordering by drag and inline rename.
//!
//! Mute/solo/volume widgets on the header call the controller's mix intents
//! directly; the state machine here covers the gestures that need one.

use super::{PointerEvent, Viewport};
use crate::controller::TimelineController;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ReorderDrag {
    from_index: usize,
    current_index: usize,
}

#[derive(Debug, Default)]
pub struct HeaderSurface {
    drag: Option<ReorderDrag>,
    rename: Option<(u64, String)>,
}

impl HeaderSurface {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Reorder drag ----------------------------------------------------

    pub fn pointer_down(&mut self, ev: PointerEvent, vp: &Viewport, controller: &TimelineController) {
        if let Some(index) = vp.track_index_at(ev.y, controller.store().track_count()) {
            self.drag = Some(ReorderDrag {
                from_index: index,
                current_index: index,
            });
        }
    }

    pub fn pointer_move(&mut self, ev: PointerEvent, vp: &Viewport, controller: &TimelineController) {
        let Some(drag) = &mut self.drag else {
            return;
        };
        let count = controller.store().track_count();
        if count == 0 {
            return;
        }
        // Clamp to the lane range so dragging past the ends pins to the
        // first/last position instead of cancelling.
        let index = (ev.y.max(0.0) / vp.track_height) as usize;
        drag.current_index = index.min(count - 1);
    }

    /// Commit the reorder, if the drag actually moved.
    pub fn pointer_up(&mut self, controller: &mut TimelineController) {
        if let Some(drag) = self.drag.take() {
            if drag.from_index != drag.current_index {
                controller.request_track_reorder(drag.from_index, drag.current_index);
            }
        }
    }

    pub fn dragged_to(&self) -> Option<usize> {
        self.drag.map(|d| d.current_index)
    }

    // --- Inline rename ---------------------------------------------------

    pub fn begin_rename(&mut self, track_id: u64, controller: &TimelineController) {
        if let Some(track) = controller.store().track(track_id) {
            self.rename = Some((track_id, track.name.clone()));
        }
    }

    pub fn rename_input(&mut self, text: impl Into<String>) {
        if let Some((_, buffer)) = &mut self.rename {
            *buffer = text.into();
        }
    }

    pub fn editing(&self) -> Option<(u64, &str)> {
        self.rename.as_ref().map(|(id, text)| (*id, text.as_str()))
    }

    pub fn commit_rename(&mut self, controller: &mut TimelineController) {
        if let Some((track_id, name)) = self.rename.take() {
            if !name.trim().is_empty() {
                controller.request_track_rename(track_id, name);
            }
        }
    }

    pub fn cancel_rename(&mut self) {
        self.rename = None;
    }
}
