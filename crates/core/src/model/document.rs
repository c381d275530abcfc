//! Raw document schema — the shape of the JSON a timeline is loaded from.

use chrono::NaiveDate;
use serde::Deserialize;
use yearline_protocol::Color;

/// Top-level document: `{ settings, items[] }`.
///
/// Items are kept as raw JSON values here so one malformed item cannot
/// abort the whole document — each is decoded individually during
/// normalization and skipped (with a log line) on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    pub settings: Settings,
    pub items: Vec<serde_json::Value>,
}

/// Global document settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Declared time domain start. Fallback only — the effective domain is
    /// derived from the items when any exist.
    pub start: NaiveDate,
    /// Declared time domain end.
    pub end: NaiveDate,
    pub default_color: Color,
    pub background_color: Color,
    pub tracks: Vec<Track>,
}

/// A named horizontal lane group anchored above or below the central axis.
///
/// Tracks with the same position stack outward from the axis in declaration
/// order: the first `top` track sits nearest the axis, and so on.
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub id: String,
    pub label: String,
    pub position: TrackPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackPosition {
    Top,
    Bottom,
}

/// A single item as declared in the document, polymorphic over `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawItem {
    /// A dated span on a track. No `end` means ongoing.
    Range {
        #[serde(flatten)]
        common: ItemCommon,
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
    /// A single instant on a track.
    Milestone {
        #[serde(flatten)]
        common: ItemCommon,
        date: NaiveDate,
    },
    /// A full-height background highlight, independent of tracks.
    Band {
        #[serde(flatten)]
        common: ItemCommon,
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
}

impl RawItem {
    pub fn common(&self) -> &ItemCommon {
        match self {
            Self::Range { common, .. }
            | Self::Milestone { common, .. }
            | Self::Band { common, .. } => common,
        }
    }
}

/// Fields shared by every item variant.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemCommon {
    pub id: String,
    pub label: String,
    /// Must reference a declared `Track.id` for non-band items.
    #[serde(default)]
    pub track: Option<String>,
    /// Falls back to `Settings::default_color` when absent.
    #[serde(default)]
    pub color: Option<Color>,
    /// Raw rendering-style hint; resolved to a [`LabelStyle`] during
    /// normalization so an unrecognized hint degrades instead of erroring.
    #[serde(default)]
    pub style: Option<String>,
    /// Tooltip body text.
    #[serde(default)]
    pub desc: Option<String>,
    /// Navigation target — makes the item clickable.
    #[serde(default)]
    pub url: Option<String>,
    /// Manual stacking index within the track. Never auto-assigned.
    #[serde(default)]
    pub lane: u32,
    /// Decorative icon name, carried through untouched.
    #[serde(default)]
    pub icon: Option<String>,
}

/// Label placement hint for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    /// Label inside the bar's left edge when the bar is wide enough,
    /// otherwise relocated past the bar's right edge.
    #[default]
    BarInLabel,
    /// Label below the bar, left-aligned to the bar's start.
    BarBelow,
    /// Milestone label to the right of the marker.
    PointLabel,
}

impl LabelStyle {
    /// Resolve a document style hint. Unrecognized hints degrade to the
    /// default placement rather than rejecting the item.
    pub fn resolve(hint: Option<&str>) -> Self {
        match hint {
            Some("bar-below") => Self::BarBelow,
            Some("point-label") => Self::PointLabel,
            _ => Self::BarInLabel,
        }
    }
}
