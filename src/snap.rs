//! Nearest-snap-point search for dragged and placed times.
//!
//! Candidate times gravitate toward "interesting" timeline positions (clip
//! edges, the playhead, uniform grid lines) when they land within a pixel
//! threshold of one; otherwise they pass through unchanged.

use crate::constants::{BASE_PIXELS_PER_SECOND, GRID_SNAP_INTERVAL, SNAP_THRESHOLD_PX};
use crate::store::TrackStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapContext {
    pub pixels_per_second: f64,
    pub threshold_px: f64,
    pub grid_interval: f64,
}

impl Default for SnapContext {
    fn default() -> Self {
        Self {
            pixels_per_second: BASE_PIXELS_PER_SECOND,
            threshold_px: SNAP_THRESHOLD_PX,
            grid_interval: GRID_SNAP_INTERVAL,
        }
    }
}

impl SnapContext {
    /// Snap `candidate` against the store's interesting positions, excluding
    /// the clip currently being dragged.
    pub fn snap(
        &self,
        store: &TrackStore,
        playhead: f64,
        candidate: f64,
        exclude_clip: Option<u64>,
    ) -> f64 {
        let points = collect_snap_points(store, playhead, self.grid_interval, exclude_clip);
        snap_time_to_points(candidate, &points, self.pixels_per_second, self.threshold_px)
    }
}

/// Deduplicated, ascending set of snap targets: timeline start, every clip
/// edge (minus the excluded clip), the playhead, and grid lines up to the
/// store's max duration.
pub fn collect_snap_points(
    store: &TrackStore,
    playhead: f64,
    grid_interval: f64,
    exclude_clip: Option<u64>,
) -> Vec<f64> {
    let mut points = vec![0.0];

    for track in store.ordered_tracks() {
        for clip in &track.clips {
            if Some(clip.id) == exclude_clip {
                continue;
            }
            points.push(clip.start_time);
            points.push(clip.end_time);
        }
    }

    points.push(playhead);

    if grid_interval > 0.0 {
        let max = store.max_duration();
        let mut line = 0.0;
        while line <= max {
            points.push(line);
            line += grid_interval;
        }
    }

    points.sort_by(|a, b| a.total_cmp(b));
    points.dedup();
    points
}

/// Nearest point within `threshold_px` of `candidate` (distances measured in
/// pixels), or `candidate` unchanged. Ties break toward the earliest point,
/// which is deterministic because `points` is sorted ascending. Snapping an
/// already-snapped time is a fixed point.
pub fn snap_time_to_points(
    candidate: f64,
    points: &[f64],
    pixels_per_second: f64,
    threshold_px: f64,
) -> f64 {
    let mut best = candidate;
    let mut best_distance = f64::INFINITY;

    for &point in points {
        let distance = ((point - candidate) * pixels_per_second).abs();
        if distance <= threshold_px && distance < best_distance {
            best_distance = distance;
            best = point;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AudioSource;

    fn store_with_clips() -> TrackStore {
        let mut store = TrackStore::new();
        store.create_track(
            Some(AudioSource {
                source_id: 1,
                duration: 10.0,
            }),
            None,
        );
        store
    }

    #[test]
    fn collects_edges_playhead_and_grid() {
        let store = store_with_clips();
        let points = collect_snap_points(&store, 2.5, 1.0, None);
        // Grid covers 0..=10, plus the playhead; clip edges 0 and 10 dedup
        // into the grid.
        assert_eq!(points.len(), 12);
        assert!(points.contains(&0.0));
        assert!(points.contains(&2.5));
        assert!(points.contains(&10.0));
        assert!(points.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn excluded_clip_contributes_no_edges() {
        let mut store = store_with_clips();
        let clip_id = store.ordered_tracks()[0].clips[0].id;
        store
            .update_clip(
                clip_id,
                &crate::model::ClipPatch {
                    start_time: Some(3.3),
                    end_time: Some(7.7),
                    ..Default::default()
                },
            )
            .unwrap();

        let with = collect_snap_points(&store, 0.0, 1.0, None);
        assert!(with.contains(&3.3));
        let without = collect_snap_points(&store, 0.0, 1.0, Some(clip_id));
        assert!(!without.contains(&3.3));
        assert!(!without.contains(&7.7));
    }

    #[test]
    fn snaps_within_threshold() {
        // 8px threshold at 100 px/s = 0.08s reach.
        let points = vec![0.0, 5.0, 10.0];
        assert_eq!(snap_time_to_points(5.05, &points, 100.0, 8.0), 5.0);
        assert_eq!(snap_time_to_points(4.95, &points, 100.0, 8.0), 5.0);
    }

    #[test]
    fn passes_through_outside_threshold() {
        let points = vec![0.0, 5.0, 10.0];
        assert_eq!(snap_time_to_points(5.2, &points, 100.0, 8.0), 5.2);
        assert_eq!(snap_time_to_points(2.5, &points, 100.0, 8.0), 2.5);
    }

    #[test]
    fn tie_breaks_toward_earlier_point() {
        // 4.5 is exactly 0.5s from both neighbors; with a wide threshold the
        // earlier point wins.
        let points = vec![4.0, 5.0];
        assert_eq!(snap_time_to_points(4.5, &points, 100.0, 60.0), 4.0);
    }

    #[test]
    fn snapping_is_idempotent() {
        let store = store_with_clips();
        let ctx = SnapContext::default();
        for candidate in [0.03, 2.9, 4.96, 7.5, 9.99] {
            let once = ctx.snap(&store, 2.5, candidate, None);
            let twice = ctx.snap(&store, 2.5, once, None);
            assert_eq!(once, twice, "candidate {candidate}");
        }
    }

    #[test]
    fn zero_grid_interval_disables_grid_lines() {
        let store = store_with_clips();
        let points = collect_snap_points(&store, 0.0, 0.0, None);
        // Clip edges and playhead only.
        assert_eq!(points, vec![0.0, 10.0]);
    }
}
