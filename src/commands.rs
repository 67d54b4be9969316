//! Reversible descriptions of structural edits.
//!
//! Each command carries enough before/after data to apply itself to a store
//! and to revert that application exactly. Commands are built up front from
//! a read of the current state (ids for split products are generated once,
//! at build time), so applying, reverting, and re-applying always reproduce
//! the same structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Clip, Track};
use crate::store::{StoreSnapshot, TrackStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub description: String,
    pub timestamp: DateTime<Utc>,
    kind: CommandKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum CommandKind {
    TrackCreate {
        track: Track,
    },
    TrackDelete {
        track: Track,
        index: usize,
        active_before: Option<u64>,
    },
    TrackRename {
        track_id: u64,
        before: String,
        after: String,
    },
    TrackReorder {
        from: usize,
        to: usize,
    },
    ClipCreate {
        track_id: u64,
        clip: Clip,
    },
    ClipDelete {
        track_id: u64,
        index: usize,
        clip: Clip,
    },
    ClipMove {
        before: Clip,
        after: Clip,
        from_index: usize,
    },
    ClipUpdate {
        before: Clip,
        after: Clip,
    },
    ClipSplit {
        index: usize,
        original: Clip,
        first: Clip,
        second: Clip,
    },
    Snapshot {
        before: StoreSnapshot,
        after: StoreSnapshot,
    },
}

impl Command {
    fn new(description: String, kind: CommandKind) -> Self {
        Self {
            description,
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn track_create(track: Track) -> Self {
        Self::new(
            format!("Create track '{}'", track.name),
            CommandKind::TrackCreate { track },
        )
    }

    pub fn track_delete(track: Track, index: usize, active_before: Option<u64>) -> Self {
        Self::new(
            format!("Delete track '{}'", track.name),
            CommandKind::TrackDelete {
                track,
                index,
                active_before,
            },
        )
    }

    pub fn track_rename(track_id: u64, before: String, after: String) -> Self {
        Self::new(
            format!("Rename track to '{}'", after),
            CommandKind::TrackRename {
                track_id,
                before,
                after,
            },
        )
    }

    pub fn track_reorder(from: usize, to: usize) -> Self {
        Self::new(
            format!("Move track {} to {}", from, to),
            CommandKind::TrackReorder { from, to },
        )
    }

    pub fn clip_create(track_id: u64, clip: Clip) -> Self {
        Self::new(
            format!("Create clip '{}'", clip.name),
            CommandKind::ClipCreate { track_id, clip },
        )
    }

    pub fn clip_delete(track_id: u64, index: usize, clip: Clip) -> Self {
        Self::new(
            format!("Delete clip '{}'", clip.name),
            CommandKind::ClipDelete {
                track_id,
                index,
                clip,
            },
        )
    }

    /// `before` must be the clip as currently stored, `after` the clip as it
    /// should exist once applied (possibly on another track), `from_index`
    /// its position on the source track.
    pub fn clip_move(before: Clip, after: Clip, from_index: usize) -> Self {
        Self::new(
            format!("Move clip '{}'", before.name),
            CommandKind::ClipMove {
                before,
                after,
                from_index,
            },
        )
    }

    pub fn clip_update(before: Clip, after: Clip) -> Self {
        Self::new(
            format!("Edit clip '{}'", before.name),
            CommandKind::ClipUpdate { before, after },
        )
    }

    /// `first`/`second` are the precomputed split products (see
    /// [`Clip::split_at`]); `index` is the original clip's position on its
    /// track.
    pub fn clip_split(original: Clip, index: usize, first: Clip, second: Clip) -> Self {
        Self::new(
            format!("Split clip '{}' at {:.2}s", original.name, first.end_time),
            CommandKind::ClipSplit {
                index,
                original,
                first,
                second,
            },
        )
    }

    /// Catch-all for compound edits: whole-store before/after images.
    pub fn snapshot(description: impl Into<String>, before: StoreSnapshot, after: StoreSnapshot) -> Self {
        Self::new(description.into(), CommandKind::Snapshot { before, after })
    }

    pub fn apply(&self, store: &mut TrackStore) {
        match &self.kind {
            CommandKind::TrackCreate { track } => {
                store.insert_track_at(track.clone(), track.order);
            }
            CommandKind::TrackDelete { track, .. } => {
                store.delete_track(track.id);
            }
            CommandKind::TrackRename { track_id, after, .. } => {
                store.rename_track(*track_id, after.clone());
            }
            CommandKind::TrackReorder { from, to } => {
                store.reorder_tracks(*from, *to);
            }
            CommandKind::ClipCreate { track_id, clip } => {
                store.insert_clip_at(*track_id, clip.clone(), usize::MAX);
            }
            CommandKind::ClipDelete { clip, .. } => {
                store.remove_clip(clip.id);
            }
            CommandKind::ClipMove { before, after, .. } => {
                if before.track_id == after.track_id {
                    store.replace_clip(before.id, after.clone());
                } else {
                    store.take_clip(before.id);
                    store.insert_clip_at(after.track_id, after.clone(), usize::MAX);
                }
            }
            CommandKind::ClipUpdate { before, after } => {
                store.replace_clip(before.id, after.clone());
            }
            CommandKind::ClipSplit {
                index,
                original,
                first,
                second,
            } => {
                store.take_clip(original.id);
                store.insert_clip_at(original.track_id, first.clone(), *index);
                store.insert_clip_at(original.track_id, second.clone(), index + 1);
            }
            CommandKind::Snapshot { after, .. } => {
                store.restore(after.clone());
            }
        }
    }

    pub fn revert(&self, store: &mut TrackStore) {
        match &self.kind {
            CommandKind::TrackCreate { track } => {
                store.delete_track(track.id);
            }
            CommandKind::TrackDelete {
                track,
                index,
                active_before,
            } => {
                store.insert_track_at(track.clone(), *index);
                store.set_active_track(*active_before);
            }
            CommandKind::TrackRename {
                track_id, before, ..
            } => {
                store.rename_track(*track_id, before.clone());
            }
            CommandKind::TrackReorder { from, to } => {
                store.reorder_tracks(*to, *from);
            }
            CommandKind::ClipCreate { clip, .. } => {
                store.remove_clip(clip.id);
            }
            CommandKind::ClipDelete {
                track_id,
                index,
                clip,
            } => {
                store.insert_clip_at(*track_id, clip.clone(), *index);
            }
            CommandKind::ClipMove {
                before,
                after,
                from_index,
            } => {
                if before.track_id == after.track_id {
                    store.replace_clip(after.id, before.clone());
                } else {
                    store.take_clip(after.id);
                    store.insert_clip_at(before.track_id, before.clone(), *from_index);
                }
            }
            CommandKind::ClipUpdate { before, after } => {
                store.replace_clip(after.id, before.clone());
            }
            CommandKind::ClipSplit {
                index,
                original,
                first,
                second,
            } => {
                store.remove_clip(first.id);
                store.remove_clip(second.id);
                store.insert_clip_at(original.track_id, original.clone(), *index);
            }
            CommandKind::Snapshot { before, .. } => {
                store.restore(before.clone());
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AudioSource, ClipPatch};

    fn source(duration: f64) -> AudioSource {
        AudioSource {
            source_id: crate::idgen::next(),
            duration,
        }
    }

    fn seeded_store() -> (TrackStore, u64, u64) {
        let mut store = TrackStore::new();
        let track_id = store.create_track(Some(source(10.0)), Some("one".into()));
        let clip_id = store.track(track_id).unwrap().clips[0].id;
        (store, track_id, clip_id)
    }

    fn assert_apply_revert_exact(command: Command, store: &mut TrackStore) {
        let before = store.snapshot();
        command.apply(store);
        let after = store.snapshot();
        assert_ne!(before, after, "{}: apply changed nothing", command.description);
        command.revert(store);
        assert_eq!(before, store.snapshot(), "{}: revert mismatch", command.description);
        command.apply(store);
        assert_eq!(after, store.snapshot(), "{}: re-apply mismatch", command.description);
        command.revert(store);
    }

    #[test]
    fn track_create_round_trips() {
        let (mut store, _, _) = seeded_store();
        let track = crate::store::TrackBuilder::new(store.track_count())
            .with_name("new".into())
            .build();
        assert_apply_revert_exact(Command::track_create(track), &mut store);
    }

    #[test]
    fn track_create_on_empty_store_round_trips_active_pointer() {
        let mut store = TrackStore::new();
        let track = crate::store::TrackBuilder::new(0).build();
        let command = Command::track_create(track.clone());
        command.apply(&mut store);
        assert_eq!(store.active_track(), Some(track.id));
        command.revert(&mut store);
        assert_eq!(store.active_track(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn track_delete_restores_position_and_active() {
        let mut store = TrackStore::new();
        let a = store.create_track(None, Some("a".into()));
        let b = store.create_track(None, Some("b".into()));
        store.create_track(None, Some("c".into()));
        store.set_active_track(Some(b));

        let (track, index) = (store.track(b).unwrap().clone(), 1);
        let command = Command::track_delete(track, index, Some(b));
        assert_apply_revert_exact(command, &mut store);
        let _ = a;
    }

    #[test]
    fn clip_move_cross_track_restores_source_position() {
        let (mut store, track_a, clip_id) = seeded_store();
        let track_b = store.create_track(None, Some("two".into()));

        let before = store.find_clip(clip_id).unwrap().clone();
        let mut after = before.clone();
        after.track_id = track_b;
        after.start_time = 5.0;
        after.end_time = 15.0;
        let from_index = store.track(track_a).unwrap().clip_index(clip_id).unwrap();

        assert_apply_revert_exact(Command::clip_move(before, after, from_index), &mut store);
    }

    #[test]
    fn clip_split_round_trips_and_redo_reuses_ids() {
        let (mut store, track_id, clip_id) = seeded_store();
        let original = store.find_clip(clip_id).unwrap().clone();
        let (first, second) = original.split_at(4.0).unwrap();
        let index = store.track(track_id).unwrap().clip_index(clip_id).unwrap();
        let command = Command::clip_split(original, index, first.clone(), second.clone());

        command.apply(&mut store);
        let ids_first: Vec<u64> = store.track(track_id).unwrap().clips.iter().map(|c| c.id).collect();
        command.revert(&mut store);
        command.apply(&mut store);
        let ids_second: Vec<u64> = store.track(track_id).unwrap().clips.iter().map(|c| c.id).collect();
        assert_eq!(ids_first, ids_second);
        assert_eq!(ids_first, vec![first.id, second.id]);
    }

    #[test]
    fn clip_update_round_trips() {
        let (mut store, _, clip_id) = seeded_store();
        let before = store.find_clip(clip_id).unwrap().clone();
        let mut after = before.clone();
        ClipPatch {
            name: Some("renamed".into()),
            start_time: Some(1.0),
            ..Default::default()
        }
        .apply_to(&mut after);
        assert_apply_revert_exact(Command::clip_update(before, after), &mut store);
    }

    #[test]
    fn clip_create_and_delete_round_trip() {
        let (mut store, track_id, clip_id) = seeded_store();

        let clip = Clip::new(track_id, "extra", 12.0, 14.0, source(2.0));
        assert_apply_revert_exact(Command::clip_create(track_id, clip), &mut store);

        let stored = store.find_clip(clip_id).unwrap().clone();
        let index = store.track(track_id).unwrap().clip_index(clip_id).unwrap();
        assert_apply_revert_exact(Command::clip_delete(track_id, index, stored), &mut store);
    }

    #[test]
    fn track_reorder_is_self_inverse() {
        let mut store = TrackStore::new();
        store.create_track(None, Some("a".into()));
        store.create_track(None, Some("b".into()));
        store.create_track(None, Some("c".into()));
        assert_apply_revert_exact(Command::track_reorder(0, 2), &mut store);
    }

    #[test]
    fn snapshot_command_round_trips_compound_edit() {
        let (mut store, track_id, clip_id) = seeded_store();
        let before = store.snapshot();

        let mut scratch = TrackStore::new();
        scratch.restore(before.clone());
        scratch.split_clip(clip_id, 2.0);
        scratch.rename_track(track_id, "edited");
        let after = scratch.snapshot();

        assert_apply_revert_exact(Command::snapshot("Compound edit", before, after), &mut store);
    }
}
