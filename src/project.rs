//! Lossless project (de)serialization.
//!
//! The document is a plain nested-value form of the whole track/clip state:
//! no handles to live objects, no cycles, safe to hand to any repository.
//! Loading validates structural invariants and fails with a [`CoreError`]
//! rather than building a broken store; range-limited mix parameters are
//! clamped rather than rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::DEFAULT_PROJECT_NAME;
use crate::error::{CoreError, Result};
use crate::idgen;
use crate::model::{Track, TrackPatch};
use crate::store::TrackStore;

pub const PROJECT_FORMAT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub version: String,
    pub name: String,
    /// Tracks in display order.
    pub tracks: Vec<Track>,
    pub active_track: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl ProjectDocument {
    pub fn from_store(name: impl Into<String>, store: &TrackStore) -> Self {
        let snapshot = store.snapshot();
        Self {
            version: PROJECT_FORMAT_VERSION.to_string(),
            name: name.into(),
            tracks: snapshot.tracks,
            active_track: snapshot.active_track,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    pub fn untitled(store: &TrackStore) -> Self {
        Self::from_store(DEFAULT_PROJECT_NAME, store)
    }

    /// Parse a serialized document. Syntax errors surface as
    /// `CoreError::Project`; invariants are checked by [`into_store`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a store from the document, validating every invariant the
    /// model relies on. The caller's existing store is untouched on failure.
    pub fn into_store(self) -> Result<TrackStore> {
        self.validate()?;

        let mut max_id = 0u64;
        let mut store = TrackStore::new();
        for (index, mut track) in self.tracks.into_iter().enumerate() {
            max_id = max_id.max(track.id);
            for clip in &track.clips {
                max_id = max_id.max(clip.id);
            }
            // Clamp mix parameters through the store's own path.
            let patch = TrackPatch {
                volume: Some(track.volume),
                pan: Some(track.pan),
                playback_rate: Some(track.playback_rate),
                ..Default::default()
            };
            track.order = index;
            let id = track.id;
            store.insert_track_at(track, index);
            store.apply_track_patch(id, &patch);
        }
        store.set_active_track(self.active_track);
        if self.active_track.is_none() {
            store.set_active_track(store.track_order().first().copied());
        }
        idgen::seed_from_max(max_id);
        Ok(store)
    }

    fn validate(&self) -> Result<()> {
        let mut track_ids = HashSet::new();
        let mut clip_ids = HashSet::new();
        let mut solo_count = 0usize;

        for track in &self.tracks {
            if track.id == 0 {
                return Err(CoreError::Project("track with id 0".into()));
            }
            if !track_ids.insert(track.id) {
                return Err(CoreError::Project(format!("duplicate track id {}", track.id)));
            }
            if track.solo {
                solo_count += 1;
            }

            for clip in &track.clips {
                if clip.id == 0 {
                    return Err(CoreError::Project("clip with id 0".into()));
                }
                if !clip_ids.insert(clip.id) {
                    return Err(CoreError::Project(format!("duplicate clip id {}", clip.id)));
                }
                if clip.track_id != track.id {
                    return Err(CoreError::Project(format!(
                        "clip {} claims track {} but lives on track {}",
                        clip.id, clip.track_id, track.id
                    )));
                }
                if !clip.start_time.is_finite()
                    || !clip.end_time.is_finite()
                    || !clip.audio_offset.is_finite()
                {
                    return Err(CoreError::Project(format!(
                        "clip {} has non-finite timing",
                        clip.id
                    )));
                }
                if clip.end_time <= clip.start_time {
                    return Err(CoreError::Project(format!(
                        "clip {} has end {} <= start {}",
                        clip.id, clip.end_time, clip.start_time
                    )));
                }
                if clip.start_time < 0.0 {
                    return Err(CoreError::Project(format!(
                        "clip {} starts before 0",
                        clip.id
                    )));
                }
                if clip.audio_offset < 0.0 {
                    return Err(CoreError::Project(format!(
                        "clip {} has negative audio offset",
                        clip.id
                    )));
                }
            }
        }

        if solo_count > 1 {
            return Err(CoreError::Project(format!(
                "{solo_count} tracks marked solo, at most one allowed"
            )));
        }

        if let Some(active) = self.active_track {
            if !track_ids.contains(&active) {
                return Err(CoreError::Project(format!(
                    "active track {active} does not exist"
                )));
            }
        }

        Ok(())
    }
}
