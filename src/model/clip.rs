use serde::{Deserialize, Serialize};

use crate::idgen;

/// Handle to decoded audio content owned by the audio engine. The core never
/// touches sample data; it stores the handle and the duration it reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioSource {
    pub source_id: u64,
    pub duration: f64,
}

/// A bounded time-range reference into a track's audio content.
///
/// `audio_offset` is the point within the source audio that corresponds to
/// `start_time` on the timeline. It is what keeps playback aligned after a
/// clip is split or trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    #[serde(default)]
    pub id: u64,
    /// Owning track, as a lookup key into the store (never a reference).
    pub track_id: u64,
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub audio_offset: f64,
    pub source: AudioSource,
}

impl Clip {
    pub fn new(track_id: u64, name: impl Into<String>, start_time: f64, end_time: f64, source: AudioSource) -> Self {
        Self {
            id: idgen::next(),
            track_id,
            name: name.into(),
            start_time,
            end_time,
            audio_offset: 0.0,
            source,
        }
    }

    /// Duration is derived from the time range; it is never stored so it
    /// cannot drift from `start_time`/`end_time`.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    #[inline]
    pub fn contains(&self, time: f64) -> bool {
        time > self.start_time && time < self.end_time
    }

    /// Split into two clips at `time`, consuming nothing: the caller decides
    /// what to do with the products. Returns `None` unless `time` lies
    /// strictly inside the clip's range.
    ///
    /// The first half keeps the original `audio_offset`; the second half's
    /// offset advances by the distance from the original start to the split
    /// point, so both halves keep playing the same source material.
    pub fn split_at(&self, time: f64) -> Option<(Clip, Clip)> {
        if !self.contains(time) {
            return None;
        }

        let mut first = self.clone();
        first.id = idgen::next();
        first.end_time = time;

        let mut second = self.clone();
        second.id = idgen::next();
        second.name = format!("{} (2)", self.name);
        second.start_time = time;
        second.audio_offset = self.audio_offset + (time - self.start_time);

        Some((first, second))
    }
}

/// Partial update applied to a clip by move/update operations. Unset fields
/// leave the clip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipPatch {
    pub name: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub audio_offset: Option<f64>,
}

impl ClipPatch {
    pub fn apply_to(&self, clip: &mut Clip) {
        if let Some(name) = &self.name {
            clip.name = name.clone();
        }
        if let Some(start) = self.start_time {
            clip.start_time = start;
        }
        if let Some(end) = self.end_time {
            clip.end_time = end;
        }
        if let Some(offset) = self.audio_offset {
            clip.audio_offset = offset;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.audio_offset.is_none()
    }
}
