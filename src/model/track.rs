use serde::{Deserialize, Serialize};

use super::clip::Clip;
use crate::constants::DEFAULT_TRACK_VOLUME;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    /// Dense, zero-based display position maintained by the store.
    pub order: usize,
    pub color: (u8, u8, u8),
    pub muted: bool,
    pub solo: bool,
    pub volume: f32,
    pub pan: f32,
    pub playback_rate: f32,
    pub reversed: bool,
    pub clips: Vec<Clip>,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            id: 0,
            name: "New Track".to_string(),
            order: 0,
            color: (255, 107, 107),
            muted: false,
            solo: false,
            volume: DEFAULT_TRACK_VOLUME,
            pan: 0.0,
            playback_rate: 1.0,
            reversed: false,
            clips: Vec::new(),
        }
    }
}

impl Track {
    pub fn find_clip(&self, clip_id: u64) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    pub fn clip_index(&self, clip_id: u64) -> Option<usize> {
        self.clips.iter().position(|c| c.id == clip_id)
    }

    /// Clips in display order. Insertion order is irrelevant to correctness;
    /// rendering sorts by start time.
    pub fn sorted_clips(&self) -> Vec<&Clip> {
        let mut clips: Vec<&Clip> = self.clips.iter().collect();
        clips.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        clips
    }

    /// End of the last clip on this track, 0 when empty.
    pub fn end_time(&self) -> f64 {
        self.clips.iter().fold(0.0, |acc, c| acc.max(c.end_time))
    }
}

/// Partial update applied to a track's display and mix state. Range-limited
/// fields are clamped by the store when applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackPatch {
    pub name: Option<String>,
    pub color: Option<(u8, u8, u8)>,
    pub muted: Option<bool>,
    pub solo: Option<bool>,
    pub volume: Option<f32>,
    pub pan: Option<f32>,
    pub playback_rate: Option<f32>,
    pub reversed: Option<bool>,
}
