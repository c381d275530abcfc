//! Layout engine: time-to-pixel mapping, track baselines, and the pan/zoom
//! view transform. Everything here is pure geometry over the normalized
//! model — no rendering, no I/O.

pub mod scale;
pub mod tracks;
pub mod transform;

pub use scale::TimeScale;
pub use tracks::{LayoutError, TrackLayout};
pub use transform::ViewTransform;

/// Fixed padding around the drawable area, in device pixels.
pub const PADDING_LEFT: f64 = 20.0;
pub const PADDING_RIGHT: f64 = 20.0;
pub const PADDING_TOP: f64 = 40.0;
pub const PADDING_BOTTOM: f64 = 40.0;

/// Vertical distance between consecutive track baselines on one side of
/// the axis.
pub const TRACK_STEP: f64 = 100.0;
/// Distance from the axis to the nearest track baseline on either side.
pub const TRACK_BASE_OFFSET: f64 = 40.0;

/// Height of a range bar / one lane slot.
pub const LANE_HEIGHT: f64 = 24.0;
/// Gap between stacked lanes within a track.
pub const LANE_GAP: f64 = 4.0;
