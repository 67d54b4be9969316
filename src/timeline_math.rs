//! Pure time↔pixel conversion for the timeline surfaces.
//!
//! Every view of the timeline (ruler, clip lanes, playhead, drag previews)
//! goes through these functions so they agree pixel-for-pixel on where a
//! given time falls. Nothing here touches state or does I/O.

use crate::constants::TICK_EPSILON;

/// Horizontal pixel position of `time`. No clamping; callers clamp.
#[inline]
pub fn time_to_pixels(time: f64, pixels_per_second: f64, zoom: f64) -> f64 {
    time * pixels_per_second * zoom
}

/// Time under pixel `pixel_x`, clamped to `[0, max_duration]`.
#[inline]
pub fn pixels_to_time(
    pixel_x: f64,
    container_left: f64,
    viewport_start: f64,
    pixels_per_second: f64,
    zoom: f64,
    max_duration: f64,
) -> f64 {
    let time = viewport_start + (pixel_x - container_left) / (pixels_per_second * zoom);
    time.clamp(0.0, max_duration)
}

/// Total width of the scrollable timeline content.
#[inline]
pub fn calculate_timeline_width(duration: f64, pixels_per_second: f64, zoom: f64) -> f64 {
    duration * pixels_per_second * zoom
}

/// One ruler tick. Only major ticks carry a label.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub is_major: bool,
    pub label: Option<String>,
    pub time: f64,
}

/// Ticks at `minor_interval` steps from 0 through `duration` inclusive.
/// A tick is major iff its time is a whole multiple of `major_interval`
/// (within floating-point epsilon).
pub fn generate_ticks(
    duration: f64,
    major_interval: f64,
    minor_interval: f64,
    time_to_pixel: impl Fn(f64) -> f64,
    format: impl Fn(f64) -> String,
) -> Vec<Tick> {
    let mut ticks = Vec::new();
    if duration < 0.0 || minor_interval <= 0.0 || major_interval <= 0.0 {
        return ticks;
    }

    let mut step = 0u64;
    loop {
        let time = step as f64 * minor_interval;
        if time > duration + TICK_EPSILON {
            break;
        }
        let rem = time % major_interval;
        let is_major = rem.abs() < TICK_EPSILON || (major_interval - rem).abs() < TICK_EPSILON;
        ticks.push(Tick {
            position: time_to_pixel(time),
            is_major,
            label: is_major.then(|| format(time)),
            time,
        });
        step += 1;
    }
    ticks
}

/// Major/minor tick spacing for a zoom level: coarser labels when zoomed out,
/// tenth subdivisions in between.
pub fn tick_intervals(zoom: f64) -> (f64, f64) {
    let major = (10.0 / zoom).floor().max(1.0);
    let minor = (major / 10.0).max(0.1);
    (major, minor)
}

/// Format seconds as `m:ss.cc` for ruler labels.
pub fn format_time(seconds: f64) -> String {
    let mins = (seconds / 60.0).floor() as i64;
    let secs = (seconds % 60.0).floor() as i64;
    let centis = ((seconds % 1.0) * 100.0).floor() as i64;
    format!("{}:{:02}.{:02}", mins, secs, centis)
}
