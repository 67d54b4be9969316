pub mod clip;
pub mod track;

pub use clip::{AudioSource, Clip, ClipPatch};
pub use track::{Track, TrackPatch};
