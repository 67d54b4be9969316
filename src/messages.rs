use serde::{Deserialize, Serialize};

use crate::store::StoreSnapshot;

/// Change notifications pushed to subscribers after controller mutations.
/// Subscribers (rendering, autosave) react to snapshots instead of reaching
/// into the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StoreEvent {
    /// A mutation produced this new state image.
    Changed(StoreSnapshot),
    /// Debounced recomputation of the timeline's total duration settled.
    DurationChanged(f64),
    /// Undo/redo availability moved.
    HistoryChanged { can_undo: bool, can_redo: bool },
}
