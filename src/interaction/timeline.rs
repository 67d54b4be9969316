//! Timeline-canvas interaction: clip dragging with snap preview, razor
//! splitting, rubber-band selection, and the clip/track context menu.

use log::debug;
use smallvec::SmallVec;

use super::{PointerEvent, Tool, Viewport};
use crate::controller::TimelineController;

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineState {
    Idle,
    DraggingClip {
        clip_id: u64,
        origin_track: u64,
        /// Distance from the clip's start to where the pointer grabbed it,
        /// so the clip does not jump to the cursor.
        grab_offset: f64,
        preview: DragPreview,
    },
    DraggingSelection {
        anchor: f64,
        current: f64,
    },
    RazorHover {
        clip_id: u64,
        time: f64,
    },
    ContextMenuOpen {
        x: f64,
        y: f64,
        target: ContextTarget,
    },
}

/// Transient ghost shown while a clip is dragged. Never persisted; the
/// store only changes when the drag commits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPreview {
    pub clip_id: u64,
    pub snap_time: f64,
    pub duration: f64,
    pub target_track: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContextTarget {
    Clip(u64),
    Track(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContextAction {
    Delete,
    Mute,
    Solo,
    /// Split the clip at its midpoint.
    Cut,
    Undo,
    Redo,
}

pub struct TimelineSurface {
    state: TimelineState,
    tool: Tool,
    /// Last committed rubber-band range.
    selection: Option<(f64, f64)>,
    selected_clips: SmallVec<[u64; 8]>,
}

impl Default for TimelineSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineSurface {
    pub fn new() -> Self {
        Self {
            state: TimelineState::Idle,
            tool: Tool::Select,
            selection: None,
            selected_clips: SmallVec::new(),
        }
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        if tool != Tool::Razor {
            if let TimelineState::RazorHover { .. } = self.state {
                self.state = TimelineState::Idle;
            }
        }
    }

    pub fn selection(&self) -> Option<(f64, f64)> {
        self.selection
    }

    pub fn selected_clips(&self) -> &[u64] {
        &self.selected_clips
    }

    /// Add or remove a clip from the selection without clearing it
    /// (ctrl-click semantics; the host decides when to use it).
    pub fn toggle_select(&mut self, clip_id: u64) {
        match self.selected_clips.iter().position(|&id| id == clip_id) {
            Some(index) => {
                self.selected_clips.remove(index);
            }
            None => self.selected_clips.push(clip_id),
        }
    }

    pub fn drag_preview(&self) -> Option<&DragPreview> {
        match &self.state {
            TimelineState::DraggingClip { preview, .. } => Some(preview),
            _ => None,
        }
    }

    pub fn pointer_down(
        &mut self,
        ev: PointerEvent,
        vp: &Viewport,
        controller: &mut TimelineController,
    ) {
        if let TimelineState::ContextMenuOpen { .. } = self.state {
            self.state = TimelineState::Idle;
            return;
        }

        let time = vp.time_at(ev.x);
        let hit = hit_test(ev, vp, controller);

        match self.tool {
            Tool::Razor => {
                // A razor press is the whole edit: split immediately, one
                // atomic command, no drag.
                if let Some((clip_id, _)) = hit {
                    controller.request_clip_split(clip_id, time);
                }
            }
            Tool::Select => match hit {
                Some((clip_id, track_id)) => {
                    let clip = match controller.store().find_clip(clip_id) {
                        Some(clip) => clip,
                        None => return,
                    };
                    if !self.selected_clips.contains(&clip_id) {
                        self.selected_clips.clear();
                        self.selected_clips.push(clip_id);
                    }
                    self.state = TimelineState::DraggingClip {
                        clip_id,
                        origin_track: track_id,
                        grab_offset: time - clip.start_time,
                        preview: DragPreview {
                            clip_id,
                            snap_time: clip.start_time,
                            duration: clip.duration(),
                            target_track: Some(track_id),
                        },
                    };
                }
                None => {
                    self.state = TimelineState::DraggingSelection {
                        anchor: time,
                        current: time,
                    };
                }
            },
        }
    }

    /// Pointer motion only updates transient state; the store is never
    /// touched here, so mid-drag frames cannot spam the history.
    pub fn pointer_move(
        &mut self,
        ev: PointerEvent,
        vp: &Viewport,
        controller: &TimelineController,
    ) {
        let time = vp.time_at(ev.x);
        match &mut self.state {
            TimelineState::DraggingClip {
                clip_id,
                grab_offset,
                preview,
                ..
            } => {
                let candidate = (time - *grab_offset).max(0.0);
                preview.snap_time = controller.snap_time(candidate, Some(*clip_id));
                preview.target_track = vp
                    .track_index_at(ev.y, controller.store().track_count())
                    .and_then(|index| controller.store().track_order().get(index).copied());
            }
            TimelineState::DraggingSelection { current, .. } => {
                *current = time;
            }
            TimelineState::Idle | TimelineState::RazorHover { .. } => {
                if self.tool == Tool::Razor {
                    self.state = match hit_test(ev, vp, controller) {
                        Some((clip_id, _)) => TimelineState::RazorHover { clip_id, time },
                        None => TimelineState::Idle,
                    };
                }
            }
            TimelineState::ContextMenuOpen { .. } => {}
        }
    }

    pub fn pointer_up(
        &mut self,
        _ev: PointerEvent,
        _vp: &Viewport,
        controller: &mut TimelineController,
    ) {
        match std::mem::replace(&mut self.state, TimelineState::Idle) {
            TimelineState::DraggingClip {
                clip_id, preview, ..
            } => match preview.target_track {
                Some(target) => {
                    controller.request_clip_move(clip_id, target, preview.snap_time);
                }
                None => {
                    debug!("drag of clip {clip_id} released outside a track, cancelled");
                }
            },
            TimelineState::DraggingSelection { anchor, current } => {
                let (start, end) = if anchor <= current {
                    (anchor, current)
                } else {
                    (current, anchor)
                };
                self.selection = (end > start).then_some((start, end));
                self.selected_clips.clear();
                if let Some((start, end)) = self.selection {
                    for track in controller.store().ordered_tracks() {
                        for clip in &track.clips {
                            if clip.start_time < end && clip.end_time > start {
                                self.selected_clips.push(clip.id);
                            }
                        }
                    }
                }
            }
            other => self.state = other,
        }
    }

    pub fn open_context_menu(&mut self, ev: PointerEvent, target: ContextTarget) {
        self.state = TimelineState::ContextMenuOpen {
            x: ev.x,
            y: ev.y,
            target,
        };
    }

    pub fn close_context_menu(&mut self) {
        if let TimelineState::ContextMenuOpen { .. } = self.state {
            self.state = TimelineState::Idle;
        }
    }

    /// Dispatch a context-menu choice, then close the menu.
    pub fn context_menu_action(
        &mut self,
        action: ContextAction,
        controller: &mut TimelineController,
    ) {
        let TimelineState::ContextMenuOpen { target, .. } = &self.state else {
            return;
        };
        let target = *target;
        match (action, target) {
            (ContextAction::Delete, ContextTarget::Clip(clip_id)) => {
                controller.request_clip_delete(clip_id);
            }
            (ContextAction::Delete, ContextTarget::Track(track_id)) => {
                controller.request_track_delete(track_id);
            }
            (ContextAction::Mute, ContextTarget::Track(track_id)) => {
                controller.toggle_mute(track_id);
            }
            (ContextAction::Solo, ContextTarget::Track(track_id)) => {
                controller.toggle_solo(track_id);
            }
            (ContextAction::Cut, ContextTarget::Clip(clip_id)) => {
                if let Some(clip) = controller.store().find_clip(clip_id) {
                    let midpoint = clip.start_time + clip.duration() / 2.0;
                    controller.request_clip_split(clip_id, midpoint);
                }
            }
            (ContextAction::Undo, _) => {
                controller.undo();
            }
            (ContextAction::Redo, _) => {
                controller.redo();
            }
            (action, target) => {
                debug!("context action {action:?} does not apply to {target:?}");
            }
        }
        self.state = TimelineState::Idle;
    }
}

/// Clip and track under the pointer, if any. Edges count as inside so a
/// razor press on a boundary still resolves to a clip.
fn hit_test(
    ev: PointerEvent,
    vp: &Viewport,
    controller: &TimelineController,
) -> Option<(u64, u64)> {
    let store = controller.store();
    let index = vp.track_index_at(ev.y, store.track_count())?;
    let track_id = store.track_order().get(index).copied()?;
    let track = store.track(track_id)?;
    let time = vp.time_at(ev.x);
    track
        .clips
        .iter()
        .find(|c| time >= c.start_time && time <= c.end_time)
        .map(|c| (c.id, track_id))
}
