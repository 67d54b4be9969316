// Timeline Constants
pub const BASE_PIXELS_PER_SECOND: f64 = 100.0;
pub const DEFAULT_ZOOM: f64 = 1.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

// Interaction Constants
pub const SNAP_THRESHOLD_PX: f64 = 8.0;
pub const GRID_SNAP_INTERVAL: f64 = 1.0; // seconds
pub const HISTORY_LIMIT: usize = 50;
pub const TRACK_HEIGHT: f64 = 80.0;
pub const RULER_HEIGHT: f64 = 30.0;

// Track Parameter Domains
pub const MIN_TRACK_VOLUME: f32 = 0.0;
pub const MAX_TRACK_VOLUME: f32 = 2.0;
pub const MIN_TRACK_PAN: f32 = -1.0;
pub const MAX_TRACK_PAN: f32 = 1.0;
pub const MIN_PLAYBACK_RATE: f32 = 0.1;
pub const MAX_PLAYBACK_RATE: f32 = 4.0;
pub const DEFAULT_TRACK_VOLUME: f32 = 1.0;

// Coalescing delay for duration recomputation after bulk track changes
pub const DURATION_RECOMPUTE_DEBOUNCE_MS: u64 = 10;

// Tolerance for major-tick detection in ruler generation
pub const TICK_EPSILON: f64 = 1e-9;

// Default Names
pub const DEFAULT_TRACK_PREFIX: &str = "Track";
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

// File Extensions
pub const PROJECT_EXTENSION: &str = "clipline";

// Track colors, cycled by creation order
pub const TRACK_COLORS: &[(u8, u8, u8)] = &[
    (255, 107, 107),
    (78, 205, 196),
    (69, 183, 209),
    (249, 202, 36),
    (240, 147, 43),
    (235, 77, 75),
    (108, 92, 231),
    (253, 121, 168),
    (0, 184, 148),
    (116, 185, 255),
    (253, 203, 110),
    (225, 112, 85),
];
