//! Cohesive intent surface over the store and history.
//!
//! Interaction surfaces never reach into the store; they call intent methods
//! here. Structural edits are wrapped in commands so they are atomically
//! undoable; mix-parameter edits deliberately bypass the history (continuous
//! sliders would flood it) and mutate the store directly. Every mutation
//! emits a fresh snapshot to subscribers, and duration recomputation after
//! track-list changes is debounced so bulk edits coalesce into one update.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;
use parking_lot::RwLock;

use crate::commands::Command;
use crate::config::Config;
use crate::constants::DURATION_RECOMPUTE_DEBOUNCE_MS;
use crate::debounce::{Clock, Debouncer, SystemClock};
use crate::engine::AudioEngine;
use crate::error::Result;
use crate::history::CommandHistory;
use crate::messages::StoreEvent;
use crate::model::{AudioSource, Clip, ClipPatch, TrackPatch};
use crate::snap::SnapContext;
use crate::store::{StoreSnapshot, TrackBuilder, TrackStore};

pub struct TimelineController {
    store: TrackStore,
    history: CommandHistory,
    engine: Box<dyn AudioEngine>,
    snap: SnapContext,
    snap_enabled: bool,
    playhead: f64,
    subscribers: Vec<Sender<StoreEvent>>,
    shared: Arc<RwLock<StoreSnapshot>>,
    duration_debounce: Debouncer<()>,
    clock: Arc<dyn Clock>,
}

impl TimelineController {
    pub fn new(config: &Config, engine: Box<dyn AudioEngine>) -> Self {
        Self::with_clock(config, engine, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &Config,
        engine: Box<dyn AudioEngine>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: TrackStore::new(),
            history: CommandHistory::new(config.history.max_entries),
            engine,
            snap: SnapContext {
                threshold_px: config.snap.threshold_px,
                grid_interval: config.snap.grid_interval,
                ..SnapContext::default()
            },
            snap_enabled: config.snap.enabled,
            playhead: 0.0,
            subscribers: Vec::new(),
            shared: Arc::new(RwLock::new(StoreSnapshot::default())),
            duration_debounce: Debouncer::new(Duration::from_millis(
                DURATION_RECOMPUTE_DEBOUNCE_MS,
            )),
            clock,
        }
    }

    // --- Read access -----------------------------------------------------

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn max_duration(&self) -> f64 {
        self.store.max_duration()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    /// Latest snapshot, shared with rendering surfaces that poll rather
    /// than subscribe.
    pub fn shared_snapshot(&self) -> Arc<RwLock<StoreSnapshot>> {
        self.shared.clone()
    }

    /// Register a change listener. Events arrive after every mutation.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    /// Snap a candidate time against the current clip edges, playhead, and
    /// grid. Pass the dragged clip so it does not snap to itself. Identity
    /// when snapping is disabled.
    pub fn snap_time(&self, candidate: f64, exclude_clip: Option<u64>) -> f64 {
        if !self.snap_enabled {
            return candidate;
        }
        self.snap
            .snap(&self.store, self.playhead, candidate, exclude_clip)
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    // --- Structural intents (undoable) -----------------------------------

    /// Create a track, optionally seeded with audio content (which becomes
    /// a clip spanning the whole buffer).
    pub fn request_track_create(
        &mut self,
        source: Option<AudioSource>,
        name: Option<String>,
    ) -> u64 {
        let mut builder = TrackBuilder::new(self.store.track_count());
        if let Some(name) = name {
            builder = builder.with_name(name);
        }
        if let Some(source) = source {
            builder = builder.with_source(source);
        }
        let track = builder.build();
        let id = track.id;
        self.execute(Command::track_create(track));
        id
    }

    /// Decode a file through the engine and add a track carrying it.
    pub fn request_file_load(&mut self, path: &Path) -> Result<u64> {
        let loaded = self.engine.load_audio_file(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string());
        let source = AudioSource {
            source_id: loaded.source_id,
            duration: loaded.duration,
        };
        Ok(self.request_track_create(Some(source), name))
    }

    pub fn request_track_delete(&mut self, track_id: u64) {
        let Some(track) = self.store.track(track_id).cloned() else {
            debug!("request_track_delete: unknown track {track_id}");
            return;
        };
        let index = track.order;
        let active = self.store.active_track();
        self.execute(Command::track_delete(track, index, active));
    }

    pub fn request_track_rename(&mut self, track_id: u64, name: impl Into<String>) {
        let name = name.into();
        let Some(track) = self.store.track(track_id) else {
            debug!("request_track_rename: unknown track {track_id}");
            return;
        };
        if track.name == name {
            return;
        }
        self.execute(Command::track_rename(track_id, track.name.clone(), name));
    }

    pub fn request_track_reorder(&mut self, from: usize, to: usize) {
        let len = self.store.track_count();
        if from >= len || to >= len || from == to {
            debug!("request_track_reorder: rejected {from} -> {to} (len {len})");
            return;
        }
        self.execute(Command::track_reorder(from, to));
    }

    pub fn request_clip_create(&mut self, track_id: u64, clip: Clip) -> Option<u64> {
        if self.store.track(track_id).is_none() {
            debug!("request_clip_create: unknown track {track_id}");
            return None;
        }
        let id = clip.id;
        self.execute(Command::clip_create(track_id, clip));
        Some(id)
    }

    pub fn request_clip_delete(&mut self, clip_id: u64) {
        let Some(clip) = self.store.find_clip(clip_id).cloned() else {
            debug!("request_clip_delete: unknown clip {clip_id}");
            return;
        };
        let track_id = clip.track_id;
        let Some(index) = self
            .store
            .track(track_id)
            .and_then(|t| t.clip_index(clip_id))
        else {
            return;
        };
        self.execute(Command::clip_delete(track_id, index, clip));
    }

    /// Move a clip to `to_track` starting at `new_start`, preserving its
    /// duration. The destination may be its own track (a plain retime).
    pub fn request_clip_move(&mut self, clip_id: u64, to_track: u64, new_start: f64) {
        let Some(before) = self.store.find_clip(clip_id).cloned() else {
            debug!("request_clip_move: unknown clip {clip_id}");
            return;
        };
        if self.store.track(to_track).is_none() {
            debug!("request_clip_move: unknown destination track {to_track}");
            return;
        }
        let new_start = new_start.max(0.0);
        let mut after = before.clone();
        after.track_id = to_track;
        after.start_time = new_start;
        after.end_time = new_start + before.duration();
        if after == before {
            return;
        }
        let Some(from_index) = self
            .store
            .track(before.track_id)
            .and_then(|t| t.clip_index(clip_id))
        else {
            return;
        };
        self.execute(Command::clip_move(before, after, from_index));
    }

    /// Patch a clip's fields in place. Declines patches that would invert
    /// the time range or push the offset negative.
    pub fn request_clip_update(&mut self, clip_id: u64, patch: &ClipPatch) {
        if patch.is_empty() {
            return;
        }
        let Some(before) = self.store.find_clip(clip_id).cloned() else {
            debug!("request_clip_update: unknown clip {clip_id}");
            return;
        };
        let mut after = before.clone();
        patch.apply_to(&mut after);
        if after.end_time <= after.start_time || after.audio_offset < 0.0 {
            debug!("request_clip_update: invalid range for clip {clip_id}");
            return;
        }
        if after == before {
            return;
        }
        self.execute(Command::clip_update(before, after));
    }

    /// Split a clip at `time` as one atomic command. No-op unless `time` is
    /// strictly inside the clip.
    pub fn request_clip_split(&mut self, clip_id: u64, time: f64) {
        let Some(original) = self.store.find_clip(clip_id).cloned() else {
            debug!("request_clip_split: unknown clip {clip_id}");
            return;
        };
        let Some((first, second)) = original.split_at(time) else {
            debug!("request_clip_split: {time} outside clip {clip_id}");
            return;
        };
        let Some(index) = self
            .store
            .track(original.track_id)
            .and_then(|t| t.clip_index(clip_id))
        else {
            return;
        };
        self.execute(Command::clip_split(original, index, first, second));
    }

    pub fn undo(&mut self) -> bool {
        let done = self.history.undo(&mut self.store);
        if done {
            self.duration_debounce.push((), self.clock.as_ref());
            self.after_mutation();
        }
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.history.redo(&mut self.store);
        if done {
            self.duration_debounce.push((), self.clock.as_ref());
            self.after_mutation();
        }
        done
    }

    // --- Mix intents (not undoable by design) -----------------------------

    pub fn toggle_mute(&mut self, track_id: u64) {
        self.store.toggle_mute(track_id);
        self.after_mutation();
    }

    pub fn toggle_solo(&mut self, track_id: u64) {
        self.store.toggle_solo(track_id);
        self.after_mutation();
    }

    pub fn set_track_volume(&mut self, track_id: u64, volume: f32) {
        self.store.set_track_volume(track_id, volume);
        self.after_mutation();
    }

    pub fn set_track_pan(&mut self, track_id: u64, pan: f32) {
        self.store.set_track_pan(track_id, pan);
        self.after_mutation();
    }

    pub fn set_track_playback_rate(&mut self, track_id: u64, rate: f32) {
        self.store.set_track_playback_rate(track_id, rate);
        self.after_mutation();
    }

    pub fn toggle_reverse(&mut self, track_id: u64) {
        self.store.toggle_reverse(track_id);
        self.after_mutation();
    }

    pub fn apply_track_patch(&mut self, track_id: u64, patch: &TrackPatch) {
        self.store.apply_track_patch(track_id, patch);
        self.after_mutation();
    }

    pub fn set_active_track(&mut self, track_id: Option<u64>) {
        self.store.set_active_track(track_id);
        self.after_mutation();
    }

    // --- Transport ---------------------------------------------------------

    pub fn play(&mut self) {
        let tracks = self.store.ordered_tracks();
        self.engine.play(&tracks, self.playhead);
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn stop(&mut self) {
        self.engine.stop();
        self.playhead = 0.0;
    }

    pub fn seek(&mut self, time: f64) {
        self.playhead = time.clamp(0.0, self.store.max_duration());
        self.engine.seek(self.playhead);
    }

    // --- Housekeeping ------------------------------------------------------

    /// Drive deferred work: delivers the debounced duration recomputation
    /// once its window elapses. Hosts call this from their event loop.
    pub fn tick(&mut self) {
        let clock = self.clock.clone();
        if self.duration_debounce.poll(clock.as_ref()).is_some() {
            let duration = self.store.max_duration();
            self.emit(StoreEvent::DurationChanged(duration));
        }
    }

    fn execute(&mut self, command: Command) {
        self.history.execute(command, &mut self.store);
        self.duration_debounce.push((), self.clock.as_ref());
        self.after_mutation();
    }

    fn after_mutation(&mut self) {
        let snapshot = self.store.snapshot();
        *self.shared.write() = snapshot.clone();
        let tracks = self.store.ordered_tracks();
        self.engine.update_playback_parameters(&tracks);
        self.emit(StoreEvent::Changed(snapshot));
        self.emit(StoreEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn emit(&mut self, event: StoreEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::VirtualClock;
    use crate::engine::{EngineCall, NullAudioEngine};

    fn controller_with_clock() -> (TimelineController, Arc<VirtualClock>) {
        let _ = env_logger::builder().is_test(true).try_init();
        let clock = Arc::new(VirtualClock::new());
        let controller = TimelineController::with_clock(
            &Config::default(),
            Box::new(NullAudioEngine::new()),
            clock.clone(),
        );
        (controller, clock)
    }

    fn source(duration: f64) -> AudioSource {
        AudioSource {
            source_id: crate::idgen::next(),
            duration,
        }
    }

    #[test]
    fn structural_intents_are_undoable() {
        let (mut controller, _) = controller_with_clock();
        let initial = controller.snapshot();

        let track = controller.request_track_create(Some(source(10.0)), Some("one".into()));
        let clip_id = controller.store().track(track).unwrap().clips[0].id;
        controller.request_clip_split(clip_id, 4.0);

        assert!(controller.can_undo());
        assert!(controller.undo());
        assert!(controller.undo());
        assert_eq!(controller.snapshot(), initial);
        assert!(!controller.can_undo());
        assert!(controller.can_redo());
    }

    #[test]
    fn mix_edits_do_not_enter_history() {
        let (mut controller, _) = controller_with_clock();
        let track = controller.request_track_create(None, None);
        assert_eq!(controller.undo_description(), Some("Create track 'Track 1'"));

        controller.set_track_volume(track, 1.5);
        controller.set_track_pan(track, 0.25);
        controller.toggle_mute(track);
        controller.toggle_solo(track);
        controller.toggle_reverse(track);
        controller.set_track_playback_rate(track, 2.0);

        // Still only the create on the stack.
        assert_eq!(controller.undo_description(), Some("Create track 'Track 1'"));
        assert!(controller.undo());
        assert!(!controller.can_undo());
    }

    #[test]
    fn clip_move_via_intent_round_trips() {
        let (mut controller, _) = controller_with_clock();
        let a = controller.request_track_create(Some(source(10.0)), Some("a".into()));
        let b = controller.request_track_create(None, Some("b".into()));
        let clip_id = controller.store().track(a).unwrap().clips[0].id;
        let before_move = controller.snapshot();

        controller.request_clip_move(clip_id, b, 5.0);
        let clip = controller.store().find_clip(clip_id).unwrap();
        assert_eq!(clip.track_id, b);
        assert_eq!(clip.start_time, 5.0);
        assert_eq!(clip.end_time, 15.0);

        controller.undo();
        assert_eq!(controller.snapshot(), before_move);
    }

    #[test]
    fn razor_split_is_one_atomic_undo_step() {
        let (mut controller, _) = controller_with_clock();
        let track = controller.request_track_create(Some(source(10.0)), None);
        let clip_id = controller.store().track(track).unwrap().clips[0].id;
        let before = controller.snapshot();

        controller.request_clip_split(clip_id, 6.0);
        assert_eq!(controller.store().track(track).unwrap().clips.len(), 2);

        controller.undo();
        assert_eq!(controller.snapshot(), before);
    }

    #[test]
    fn subscribers_receive_snapshots_per_mutation() {
        let (mut controller, _) = controller_with_clock();
        let rx = controller.subscribe();

        controller.request_track_create(None, None);

        let mut saw_changed = false;
        let mut saw_history = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                StoreEvent::Changed(snapshot) => {
                    assert_eq!(snapshot.tracks.len(), 1);
                    saw_changed = true;
                }
                StoreEvent::HistoryChanged { can_undo, .. } => {
                    assert!(can_undo);
                    saw_history = true;
                }
                StoreEvent::DurationChanged(_) => {}
            }
        }
        assert!(saw_changed);
        assert!(saw_history);
    }

    #[test]
    fn shared_snapshot_tracks_mutations() {
        let (mut controller, _) = controller_with_clock();
        let shared = controller.shared_snapshot();
        assert!(shared.read().tracks.is_empty());
        controller.request_track_create(None, None);
        assert_eq!(shared.read().tracks.len(), 1);
    }

    #[test]
    fn duration_recompute_is_debounced_and_coalesced() {
        let (mut controller, clock) = controller_with_clock();
        let rx = controller.subscribe();

        controller.request_track_create(Some(source(10.0)), None);
        controller.request_track_create(Some(source(25.0)), None);
        controller.request_track_create(Some(source(5.0)), None);

        // Window has not elapsed; no duration event yet.
        controller.tick();
        let early: Vec<StoreEvent> = rx.try_iter().collect();
        assert!(
            !early
                .iter()
                .any(|e| matches!(e, StoreEvent::DurationChanged(_)))
        );

        clock.advance(Duration::from_millis(DURATION_RECOMPUTE_DEBOUNCE_MS + 1));
        controller.tick();
        let late: Vec<StoreEvent> = rx.try_iter().collect();
        let durations: Vec<f64> = late
            .iter()
            .filter_map(|e| match e {
                StoreEvent::DurationChanged(d) => Some(*d),
                _ => None,
            })
            .collect();
        // Three rapid creates coalesced into a single recompute.
        assert_eq!(durations, vec![25.0]);
    }

    /// Engine double sharing its call log with the test body.
    struct SharedEngine(Arc<parking_lot::Mutex<NullAudioEngine>>);

    impl AudioEngine for SharedEngine {
        fn load_audio_file(&mut self, path: &std::path::Path) -> crate::error::Result<crate::engine::LoadedAudio> {
            self.0.lock().load_audio_file(path)
        }
        fn update_playback_parameters(&mut self, tracks: &[&crate::model::Track]) {
            self.0.lock().update_playback_parameters(tracks)
        }
        fn play(&mut self, tracks: &[&crate::model::Track], position: f64) {
            self.0.lock().play(tracks, position)
        }
        fn pause(&mut self) {
            self.0.lock().pause()
        }
        fn stop(&mut self) {
            self.0.lock().stop()
        }
        fn seek(&mut self, position: f64) {
            self.0.lock().seek(position)
        }
    }

    #[test]
    fn engine_receives_parameter_updates_and_transport() {
        let log = Arc::new(parking_lot::Mutex::new(NullAudioEngine::new()));
        let mut controller = TimelineController::with_clock(
            &Config::default(),
            Box::new(SharedEngine(log.clone())),
            Arc::new(VirtualClock::new()),
        );

        controller.request_track_create(Some(source(10.0)), None);
        controller.seek(3.0);
        controller.play();
        controller.pause();
        controller.stop();

        let calls = log.lock().calls.clone();
        assert!(calls.contains(&EngineCall::Seek(3.0)));
        assert!(
            calls
                .iter()
                .any(|c| matches!(c, EngineCall::UpdateParams { track_count: 1 }))
        );
        assert!(calls.contains(&EngineCall::Play {
            track_count: 1,
            position: 3.0
        }));
        assert!(calls.contains(&EngineCall::Pause));
        assert!(calls.contains(&EngineCall::Stop));
    }

    #[test]
    fn file_load_creates_track_with_engine_reported_duration() {
        let (mut controller, _) = controller_with_clock();
        let track_id = controller
            .request_file_load(std::path::Path::new("/tmp/take.wav"))
            .unwrap();
        let track = controller.store().track(track_id).unwrap();
        assert_eq!(track.name, "take");
        assert_eq!(track.clips.len(), 1);
        // NullAudioEngine reports 10s buffers.
        assert_eq!(track.clips[0].end_time, 10.0);
        assert!(controller.can_undo());
    }

    #[test]
    fn invalid_intents_leave_state_untouched() {
        let (mut controller, _) = controller_with_clock();
        controller.request_track_create(Some(source(10.0)), None);
        let before = controller.snapshot();

        controller.request_clip_split(u64::MAX, 4.0);
        controller.request_clip_move(u64::MAX, u64::MAX - 1, 0.0);
        controller.request_track_delete(u64::MAX);
        controller.request_track_reorder(0, 7);
        assert_eq!(controller.snapshot(), before);
        // None of those registered as undoable work.
        assert_eq!(controller.history.len(), 1);
    }

    #[test]
    fn seek_clamps_to_timeline() {
        let (mut controller, _) = controller_with_clock();
        controller.request_track_create(Some(source(10.0)), None);
        controller.seek(25.0);
        assert_eq!(controller.playhead(), 10.0);
        controller.seek(-5.0);
        assert_eq!(controller.playhead(), 0.0);
    }

    #[test]
    fn snap_respects_enable_flag() {
        let (mut controller, _) = controller_with_clock();
        controller.request_track_create(Some(source(10.0)), None);
        let snapped = controller.snap_time(5.03, None);
        assert_eq!(snapped, 5.0);
        controller.set_snap_enabled(false);
        assert_eq!(controller.snap_time(5.03, None), 5.03);
    }
}
