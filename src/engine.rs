//! Audio-engine collaborator boundary.
//!
//! The core never touches sample data or a live audio graph; it drives an
//! implementation of [`AudioEngine`] and trusts the durations it reports.
//! Decoding, mixing, and transport are the engine's problem.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::Track;

/// Decoded-file info reported back by the engine on load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAudio {
    pub source_id: u64,
    pub duration: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

pub trait AudioEngine {
    /// Decode a file and register its content, returning a handle the core
    /// stores in clips.
    fn load_audio_file(&mut self, path: &Path) -> Result<LoadedAudio>;

    /// Push current mix state (volume/pan/mute/solo/rate/reverse) down to
    /// the live graph.
    fn update_playback_parameters(&mut self, tracks: &[&Track]);

    fn play(&mut self, tracks: &[&Track], position: f64);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position: f64);
}

/// Engine double that records every call. Used by tests and as a stand-in
/// until a host wires a real engine.
#[derive(Debug, Default)]
pub struct NullAudioEngine {
    pub calls: Vec<EngineCall>,
    next_source_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(PathBuf),
    UpdateParams { track_count: usize },
    Play { track_count: usize, position: f64 },
    Pause,
    Stop,
    Seek(f64),
}

impl NullAudioEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioEngine for NullAudioEngine {
    fn load_audio_file(&mut self, path: &Path) -> Result<LoadedAudio> {
        self.calls.push(EngineCall::Load(path.to_path_buf()));
        self.next_source_id += 1;
        Ok(LoadedAudio {
            source_id: self.next_source_id,
            duration: 10.0,
            sample_rate: 44100,
            channels: 2,
        })
    }

    fn update_playback_parameters(&mut self, tracks: &[&Track]) {
        self.calls.push(EngineCall::UpdateParams {
            track_count: tracks.len(),
        });
    }

    fn play(&mut self, tracks: &[&Track], position: f64) {
        self.calls.push(EngineCall::Play {
            track_count: tracks.len(),
            position,
        });
    }

    fn pause(&mut self) {
        self.calls.push(EngineCall::Pause);
    }

    fn stop(&mut self) {
        self.calls.push(EngineCall::Stop);
    }

    fn seek(&mut self, position: f64) {
        self.calls.push(EngineCall::Seek(position));
    }
}
