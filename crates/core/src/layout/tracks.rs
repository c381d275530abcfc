//! Track baseline bookkeeping.
//!
//! Tracks are partitioned by position and stacked outward from the central
//! axis in declaration order: baseline for index `i` in the top partition is
//! `axis_y - (TRACK_BASE_OFFSET + i * TRACK_STEP)`, mirrored below the axis
//! for the bottom partition.

use thiserror::Error;

use crate::layout::{LANE_GAP, LANE_HEIGHT, TRACK_BASE_OFFSET, TRACK_STEP};
use crate::model::{Track, TrackPosition};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("unknown track {0:?}")]
    UnknownTrack(String),
}

/// Resolved vertical positions for every declared track.
///
/// Rebuilt whenever the viewport height changes (resize recomputes the axis
/// center); cheap enough to rebuild per layout pass.
#[derive(Debug, Clone)]
pub struct TrackLayout {
    axis_y: f64,
    baselines: Vec<(String, f64)>,
}

impl TrackLayout {
    pub fn new(tracks: &[Track], axis_y: f64) -> Self {
        let mut baselines = Vec::with_capacity(tracks.len());
        let mut top_index = 0u32;
        let mut bottom_index = 0u32;
        for track in tracks {
            let y = match track.position {
                TrackPosition::Top => {
                    let y = axis_y - (TRACK_BASE_OFFSET + f64::from(top_index) * TRACK_STEP);
                    top_index += 1;
                    y
                }
                TrackPosition::Bottom => {
                    let y = axis_y + (TRACK_BASE_OFFSET + f64::from(bottom_index) * TRACK_STEP);
                    bottom_index += 1;
                    y
                }
            };
            baselines.push((track.id.clone(), y));
        }
        Self { axis_y, baselines }
    }

    /// The central axis Y — the vertical center of the drawable viewport.
    pub fn axis_y(&self) -> f64 {
        self.axis_y
    }

    /// Baseline Y for a track. A normalized model never carries an unknown
    /// track id, but the resolver still refuses rather than guessing — the
    /// caller skips the item and the render pass continues.
    pub fn baseline_y(&self, track_id: &str) -> Result<f64, LayoutError> {
        self.baselines
            .iter()
            .find(|(id, _)| id == track_id)
            .map(|&(_, y)| y)
            .ok_or_else(|| LayoutError::UnknownTrack(track_id.to_string()))
    }

    /// Lane baseline within a track. Lane indices are trusted as declared;
    /// nothing here prevents overlap (manual lane assignment is a stated
    /// non-goal).
    pub fn lane_y(&self, track_id: &str, lane: u32) -> Result<f64, LayoutError> {
        Ok(self.baseline_y(track_id)? + f64::from(lane) * (LANE_HEIGHT + LANE_GAP))
    }
}
