pub mod document;
pub mod timeline;

pub use document::{ItemCommon, LabelStyle, RawItem, Settings, Track, TrackPosition};
pub use timeline::{ItemShape, TimeDomain, TimelineItem, TimelineModel};

use thiserror::Error;

/// Failure to load a timeline document as a whole.
///
/// A `LoadError` is fatal to the document, never to the host: frontends
/// surface it as an inline message instead of a scene. Per-item problems
/// (unknown track, missing date field) are not load errors — those items
/// are skipped with a log line and the rest of the document renders.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid timeline document: {0}")]
    Document(#[from] serde_json::Error),
}
