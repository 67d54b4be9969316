//! Authoritative in-memory model of tracks and clips.
//!
//! Tracks live in a flat arena keyed by id with a separate ordering index;
//! a clip's `track_id` is a lookup key into that arena. Mutating operations
//! never panic on bad input: unknown ids and out-of-range times are silent
//! no-ops, out-of-domain parameters are clamped, and invalid reorder indices
//! are logged and ignored. Callers that need user-facing feedback validate
//! before calling.

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_TRACK_PREFIX, DEFAULT_TRACK_VOLUME, MAX_PLAYBACK_RATE, MAX_TRACK_PAN,
    MAX_TRACK_VOLUME, MIN_PLAYBACK_RATE, MIN_TRACK_PAN, MIN_TRACK_VOLUME, TRACK_COLORS,
};
use crate::idgen;
use crate::model::{AudioSource, Clip, ClipPatch, Track, TrackPatch};

pub struct TrackBuilder {
    order_hint: usize,
    name: Option<String>,
    source: Option<AudioSource>,
    volume: Option<f32>,
    pan: Option<f32>,
}

impl TrackBuilder {
    pub fn new(order_hint: usize) -> Self {
        Self {
            order_hint,
            name: None,
            source: None,
            volume: None,
            pan: None,
        }
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Audio content for the track; `build` spans it with an initial clip,
    /// matching what a file load produces.
    pub fn with_source(mut self, source: AudioSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_pan(mut self, pan: f32) -> Self {
        self.pan = Some(pan);
        self
    }

    pub fn build(self) -> Track {
        let id = idgen::next();
        let name = self
            .name
            .unwrap_or_else(|| format!("{} {}", DEFAULT_TRACK_PREFIX, self.order_hint + 1));

        let mut clips = Vec::new();
        if let Some(source) = self.source {
            clips.push(Clip::new(id, name.clone(), 0.0, source.duration, source));
        }

        Track {
            id,
            name,
            order: self.order_hint,
            color: TRACK_COLORS[self.order_hint % TRACK_COLORS.len()],
            muted: false,
            solo: false,
            volume: self.volume.unwrap_or(DEFAULT_TRACK_VOLUME),
            pan: self.pan.unwrap_or(0.0),
            playback_rate: 1.0,
            reversed: false,
            clips,
        }
    }
}

/// Deep copy of the whole store, used for compound undo entries, change
/// notifications, and persistence. Tracks appear in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub tracks: Vec<Track>,
    pub active_track: Option<u64>,
}

#[derive(Debug, Default)]
pub struct TrackStore {
    tracks: HashMap<u64, Track>,
    track_order: Vec<u64>,
    active_track: Option<u64>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Read access -----------------------------------------------------

    pub fn track_count(&self) -> usize {
        self.track_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_order.is_empty()
    }

    pub fn track(&self, track_id: u64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    pub fn track_order(&self) -> &[u64] {
        &self.track_order
    }

    /// Tracks in display order.
    pub fn ordered_tracks(&self) -> Vec<&Track> {
        self.track_order
            .iter()
            .filter_map(|id| self.tracks.get(id))
            .collect()
    }

    pub fn active_track(&self) -> Option<u64> {
        self.active_track
    }

    pub fn set_active_track(&mut self, track_id: Option<u64>) {
        match track_id {
            Some(id) if !self.tracks.contains_key(&id) => {
                debug!("set_active_track: unknown track {id}, ignoring");
            }
            other => self.active_track = other,
        }
    }

    pub fn find_clip(&self, clip_id: u64) -> Option<&Clip> {
        self.track_order
            .iter()
            .filter_map(|id| self.tracks.get(id))
            .find_map(|t| t.find_clip(clip_id))
    }

    pub fn has_solo(&self) -> bool {
        self.tracks.values().any(|t| t.solo)
    }

    /// Max clip end across the whole store, 0 when there are no clips.
    pub fn max_duration(&self) -> f64 {
        self.tracks
            .values()
            .fold(0.0, |acc, t| acc.max(t.end_time()))
    }

    // --- Track operations ------------------------------------------------

    /// Create a track at the end of the ordering. With a source, the track
    /// starts with one clip spanning the full buffer. The first track in an
    /// empty store becomes active.
    pub fn create_track(&mut self, source: Option<AudioSource>, name: Option<String>) -> u64 {
        let mut builder = TrackBuilder::new(self.track_order.len());
        if let Some(name) = name {
            builder = builder.with_name(name);
        }
        if let Some(source) = source {
            builder = builder.with_source(source);
        }
        let track = builder.build();
        let id = track.id;
        self.insert_track_at(track, self.track_order.len());
        id
    }

    /// Insert a prebuilt track at `index` (clamped) and renumber. An empty
    /// store adopts the inserted track as active.
    pub fn insert_track_at(&mut self, track: Track, index: usize) {
        let was_empty = self.track_order.is_empty();
        let index = index.min(self.track_order.len());
        let id = track.id;
        self.track_order.insert(index, id);
        self.tracks.insert(id, track);
        self.renumber();
        if was_empty {
            self.active_track = Some(id);
        }
    }

    /// Remove a track, returning it with its former index. Survivors are
    /// renumbered densely; the active pointer moves to the first survivor.
    pub fn remove_track(&mut self, track_id: u64) -> Option<(Track, usize)> {
        let index = self.track_order.iter().position(|&id| id == track_id)?;
        self.track_order.remove(index);
        let track = self.tracks.remove(&track_id)?;
        self.renumber();
        if self.active_track == Some(track_id) {
            self.active_track = self.track_order.first().copied();
        }
        Some((track, index))
    }

    pub fn delete_track(&mut self, track_id: u64) {
        if self.remove_track(track_id).is_none() {
            debug!("delete_track: unknown track {track_id}, ignoring");
        }
    }

    pub fn rename_track(&mut self, track_id: u64, name: impl Into<String>) {
        match self.tracks.get_mut(&track_id) {
            Some(track) => track.name = name.into(),
            None => debug!("rename_track: unknown track {track_id}, ignoring"),
        }
    }

    /// Move a track between display positions. Invalid indices are logged
    /// and ignored; this is the one no-op that warrants a diagnostic.
    pub fn reorder_tracks(&mut self, from: usize, to: usize) {
        let len = self.track_order.len();
        if from >= len || to >= len {
            warn!("reorder_tracks: invalid indices {from} -> {to} (len {len})");
            return;
        }
        if from == to {
            return;
        }
        let id = self.track_order.remove(from);
        self.track_order.insert(to, id);
        self.renumber();
    }

    // --- Mix state -------------------------------------------------------

    pub fn toggle_mute(&mut self, track_id: u64) {
        match self.tracks.get_mut(&track_id) {
            Some(track) => track.muted = !track.muted,
            None => debug!("toggle_mute: unknown track {track_id}, ignoring"),
        }
    }

    /// Toggle solo with global exclusivity: enabling solo on one track
    /// clears it on every other track in the same state transition.
    pub fn toggle_solo(&mut self, track_id: u64) {
        let Some(track) = self.tracks.get(&track_id) else {
            debug!("toggle_solo: unknown track {track_id}, ignoring");
            return;
        };
        let enable = !track.solo;
        for (id, track) in self.tracks.iter_mut() {
            track.solo = enable && *id == track_id;
        }
    }

    pub fn set_track_volume(&mut self, track_id: u64, volume: f32) {
        match self.tracks.get_mut(&track_id) {
            Some(track) => track.volume = volume.clamp(MIN_TRACK_VOLUME, MAX_TRACK_VOLUME),
            None => debug!("set_track_volume: unknown track {track_id}, ignoring"),
        }
    }

    pub fn set_track_pan(&mut self, track_id: u64, pan: f32) {
        match self.tracks.get_mut(&track_id) {
            Some(track) => track.pan = pan.clamp(MIN_TRACK_PAN, MAX_TRACK_PAN),
            None => debug!("set_track_pan: unknown track {track_id}, ignoring"),
        }
    }

    pub fn set_track_playback_rate(&mut self, track_id: u64, rate: f32) {
        match self.tracks.get_mut(&track_id) {
            Some(track) => {
                track.playback_rate = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE)
            }
            None => debug!("set_track_playback_rate: unknown track {track_id}, ignoring"),
        }
    }

    pub fn toggle_reverse(&mut self, track_id: u64) {
        match self.tracks.get_mut(&track_id) {
            Some(track) => track.reversed = !track.reversed,
            None => debug!("toggle_reverse: unknown track {track_id}, ignoring"),
        }
    }

    /// Bulk property update. Clamps range-limited fields and keeps solo
    /// globally exclusive even through this path.
    pub fn apply_track_patch(&mut self, track_id: u64, patch: &TrackPatch) {
        {
            let Some(track) = self.tracks.get_mut(&track_id) else {
                debug!("apply_track_patch: unknown track {track_id}, ignoring");
                return;
            };
            if let Some(name) = &patch.name {
                track.name = name.clone();
            }
            if let Some(color) = patch.color {
                track.color = color;
            }
            if let Some(muted) = patch.muted {
                track.muted = muted;
            }
            if let Some(volume) = patch.volume {
                track.volume = volume.clamp(MIN_TRACK_VOLUME, MAX_TRACK_VOLUME);
            }
            if let Some(pan) = patch.pan {
                track.pan = pan.clamp(MIN_TRACK_PAN, MAX_TRACK_PAN);
            }
            if let Some(rate) = patch.playback_rate {
                track.playback_rate = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
            }
            if let Some(reversed) = patch.reversed {
                track.reversed = reversed;
            }
        }
        match patch.solo {
            Some(true) => {
                for (id, track) in self.tracks.iter_mut() {
                    track.solo = *id == track_id;
                }
            }
            Some(false) => {
                if let Some(track) = self.tracks.get_mut(&track_id) {
                    track.solo = false;
                }
            }
            None => {}
        }
    }

    // --- Clip operations -------------------------------------------------

    /// Append a clip to a track, assigning an id when the clip has none.
    /// Returns the clip id, or `None` when the track does not exist.
    pub fn add_clip_to_track(&mut self, track_id: u64, mut clip: Clip) -> Option<u64> {
        let Some(track) = self.tracks.get_mut(&track_id) else {
            debug!("add_clip_to_track: unknown track {track_id}, ignoring");
            return None;
        };
        if clip.id == 0 {
            clip.id = idgen::next();
        }
        clip.track_id = track_id;
        let id = clip.id;
        track.clips.push(clip);
        Some(id)
    }

    /// Insert a clip at a precise position within a track's sequence.
    /// Used by undo/redo to reproduce prior state exactly.
    pub fn insert_clip_at(&mut self, track_id: u64, mut clip: Clip, index: usize) {
        let Some(track) = self.tracks.get_mut(&track_id) else {
            debug!("insert_clip_at: unknown track {track_id}, ignoring");
            return;
        };
        clip.track_id = track_id;
        let index = index.min(track.clips.len());
        track.clips.insert(index, clip);
    }

    /// Detach a clip wherever it lives, returning it with its owning track
    /// and former index.
    pub fn take_clip(&mut self, clip_id: u64) -> Option<(Clip, u64, usize)> {
        for &track_id in &self.track_order {
            if let Some(track) = self.tracks.get_mut(&track_id) {
                if let Some(index) = track.clip_index(clip_id) {
                    return Some((track.clips.remove(index), track_id, index));
                }
            }
        }
        None
    }

    pub fn remove_clip(&mut self, clip_id: u64) {
        if self.take_clip(clip_id).is_none() {
            debug!("remove_clip: unknown clip {clip_id}, ignoring");
        }
    }

    /// Replace a clip in place (same track position). Returns false when the
    /// clip is unknown.
    pub fn replace_clip(&mut self, clip_id: u64, replacement: Clip) -> bool {
        for track in self.tracks.values_mut() {
            if let Some(index) = track.clip_index(clip_id) {
                let mut replacement = replacement;
                replacement.track_id = track.id;
                track.clips[index] = replacement;
                return true;
            }
        }
        false
    }

    /// Move a clip, optionally patching its fields in the same transition.
    /// Same-track moves replace in place; cross-track moves remove from the
    /// source and append to the destination with `track_id` rewritten.
    /// Returns the resulting clip, or `None` (no state change) when the clip
    /// is not on `from_track` or the destination does not exist.
    pub fn move_clip_to_track(
        &mut self,
        clip_id: u64,
        from_track: u64,
        to_track: u64,
        patch: Option<&ClipPatch>,
    ) -> Option<Clip> {
        let source = self.tracks.get(&from_track)?;
        let clip = source.find_clip(clip_id);
        let Some(clip) = clip else {
            debug!("move_clip_to_track: clip {clip_id} not found on track {from_track}");
            return None;
        };
        if from_track != to_track && !self.tracks.contains_key(&to_track) {
            debug!("move_clip_to_track: unknown destination track {to_track}");
            return None;
        }

        let mut moved = clip.clone();
        if let Some(patch) = patch {
            patch.apply_to(&mut moved);
        }
        moved.track_id = to_track;

        if from_track == to_track {
            self.replace_clip(clip_id, moved.clone());
        } else {
            self.take_clip(clip_id);
            if let Some(dest) = self.tracks.get_mut(&to_track) {
                dest.clips.push(moved.clone());
            }
        }
        Some(moved)
    }

    /// Patch a clip in place. Declines (no-op) when the patch would produce
    /// a non-positive duration or a negative audio offset.
    pub fn update_clip(&mut self, clip_id: u64, patch: &ClipPatch) -> Option<Clip> {
        let current = self.find_clip(clip_id)?;
        let mut updated = current.clone();
        patch.apply_to(&mut updated);
        if updated.end_time <= updated.start_time || updated.audio_offset < 0.0 {
            debug!("update_clip: patch for clip {clip_id} yields invalid range, ignoring");
            return None;
        }
        self.replace_clip(clip_id, updated.clone());
        Some(updated)
    }

    /// Split a clip at `time`, replacing it in place with the two halves.
    /// Offsets follow the split arithmetic on [`Clip::split_at`]; the parent
    /// clip ceases to exist. No-op unless `time` is strictly interior.
    pub fn split_clip(&mut self, clip_id: u64, time: f64) -> Option<(Clip, Clip)> {
        let clip = self.find_clip(clip_id)?;
        let (first, second) = clip.split_at(time)?;
        let (_, track_id, index) = self.take_clip(clip_id)?;
        self.insert_clip_at(track_id, first.clone(), index);
        self.insert_clip_at(track_id, second.clone(), index + 1);
        Some((first, second))
    }

    // --- Snapshots -------------------------------------------------------

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tracks: self
                .ordered_tracks()
                .into_iter()
                .cloned()
                .collect(),
            active_track: self.active_track,
        }
    }

    /// Restore a snapshot captured from this store. Snapshots are valid by
    /// construction; loading external data goes through project validation.
    pub fn restore(&mut self, snapshot: StoreSnapshot) {
        self.track_order = snapshot.tracks.iter().map(|t| t.id).collect();
        self.tracks = snapshot.tracks.into_iter().map(|t| (t.id, t)).collect();
        self.active_track = snapshot.active_track;
        self.renumber();
    }

    fn renumber(&mut self) {
        for (index, id) in self.track_order.iter().enumerate() {
            if let Some(track) = self.tracks.get_mut(id) {
                track.order = index;
            }
        }
    }
}
