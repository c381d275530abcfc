//! Normalized timeline state — what the layout engine and scene builder see.
//!
//! A document is parsed once per load into an immutable item list plus a
//! derived time domain. Ongoing items are resolved against "today" at parse
//! time, not continuously.

use chrono::NaiveDate;
use log::warn;
use serde::Deserialize;
use yearline_protocol::Color;

use crate::model::document::{LabelStyle, RawDocument, RawItem, Settings};
use crate::model::LoadError;

/// The effective time range covered by the document.
///
/// Derived from the min/max instant across all items; the settings-declared
/// bounds are used only when the document has no items. These are layout
/// inputs, never clipping limits — pan/zoom may move content beyond them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDomain {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeDomain {
    /// Domain span in whole days, never less than one — a zero-length
    /// domain would otherwise poison every density division downstream.
    pub fn span_days(&self) -> f64 {
        (self.end - self.start).num_days().max(1) as f64
    }

    /// Integer years covered, inclusive on both ends. Drives axis ticks.
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        use chrono::Datelike;
        self.start.year()..=self.end.year()
    }
}

/// A normalized item, ready for layout.
#[derive(Debug, Clone)]
pub struct TimelineItem {
    pub id: String,
    pub label: String,
    /// Resolved track id. `None` for bands, which span the full height.
    pub track: Option<String>,
    pub color: Color,
    pub style: LabelStyle,
    pub desc: Option<String>,
    pub url: Option<String>,
    pub lane: u32,
    pub icon: Option<String>,
    pub shape: ItemShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemShape {
    Range {
        start: NaiveDate,
        end: NaiveDate,
        /// Declared without an end — `end` holds the parse-time "today".
        ongoing: bool,
    },
    Milestone { date: NaiveDate },
    Band {
        start: NaiveDate,
        end: NaiveDate,
        ongoing: bool,
    },
}

impl ItemShape {
    /// Earliest instant this item touches.
    pub fn min_date(&self) -> NaiveDate {
        match *self {
            Self::Range { start, .. } | Self::Band { start, .. } => start,
            Self::Milestone { date } => date,
        }
    }

    /// Latest instant this item touches.
    pub fn max_date(&self) -> NaiveDate {
        match *self {
            Self::Range { end, .. } | Self::Band { end, .. } => end,
            Self::Milestone { date } => date,
        }
    }

    pub fn is_band(&self) -> bool {
        matches!(self, Self::Band { .. })
    }
}

/// Parsed, normalized document state. Immutable until a new document loads.
#[derive(Debug, Clone)]
pub struct TimelineModel {
    pub settings: Settings,
    pub items: Vec<TimelineItem>,
    pub domain: TimeDomain,
}

impl TimelineModel {
    /// Parse a JSON document, resolving ongoing items against the local
    /// calendar date.
    pub fn from_json(data: &[u8]) -> Result<Self, LoadError> {
        Self::from_json_at(data, chrono::Local::now().date_naive())
    }

    /// Parse with an explicit "today" — the instant open-ended ranges and
    /// bands resolve to. Split out so tests are deterministic.
    pub fn from_json_at(data: &[u8], today: NaiveDate) -> Result<Self, LoadError> {
        let raw: RawDocument = serde_json::from_slice(data)?;
        Ok(Self::from_raw(raw, today))
    }

    fn from_raw(raw: RawDocument, today: NaiveDate) -> Self {
        let settings = raw.settings;
        let mut items = Vec::with_capacity(raw.items.len());

        for value in raw.items {
            let item = match RawItem::deserialize(&value) {
                Ok(item) => item,
                Err(err) => {
                    warn!("skipping malformed item: {err}");
                    continue;
                }
            };
            match normalize_item(item, &settings, today) {
                Ok(item) => items.push(item),
                Err(skip) => warn!("skipping item: {skip}"),
            }
        }

        let domain = derive_domain(&items, &settings);
        Self {
            settings,
            items,
            domain,
        }
    }

    /// Items that belong to tracks (everything but bands), in document order.
    pub fn track_items(&self) -> impl Iterator<Item = &TimelineItem> {
        self.items.iter().filter(|i| !i.shape.is_band())
    }

    /// Background bands, in document order.
    pub fn bands(&self) -> impl Iterator<Item = &TimelineItem> {
        self.items.iter().filter(|i| i.shape.is_band())
    }
}

/// Why a single item was dropped during normalization.
#[derive(Debug, thiserror::Error)]
enum ItemSkip {
    #[error("{id:?} references unknown track {track:?}")]
    UnknownTrack { id: String, track: String },
    #[error("{id:?} has no track")]
    MissingTrack { id: String },
}

fn normalize_item(
    raw: RawItem,
    settings: &Settings,
    today: NaiveDate,
) -> Result<TimelineItem, ItemSkip> {
    let (common, shape) = match raw {
        RawItem::Range { common, start, end } => {
            let ongoing = end.is_none();
            (
                common,
                ItemShape::Range {
                    start,
                    end: end.unwrap_or(today),
                    ongoing,
                },
            )
        }
        RawItem::Milestone { common, date } => (common, ItemShape::Milestone { date }),
        RawItem::Band { common, start, end } => {
            let ongoing = end.is_none();
            (
                common,
                ItemShape::Band {
                    start,
                    end: end.unwrap_or(today),
                    ongoing,
                },
            )
        }
    };

    // Bands span the full height and ignore any declared track. Everything
    // else must resolve to a declared track or be skipped.
    let track = if shape.is_band() {
        None
    } else {
        let track = common.track.clone().ok_or(ItemSkip::MissingTrack {
            id: common.id.clone(),
        })?;
        if !settings.tracks.iter().any(|t| t.id == track) {
            return Err(ItemSkip::UnknownTrack {
                id: common.id,
                track,
            });
        }
        Some(track)
    };

    Ok(TimelineItem {
        id: common.id,
        label: common.label,
        track,
        color: common.color.unwrap_or(settings.default_color),
        style: LabelStyle::resolve(common.style.as_deref()),
        desc: common.desc,
        url: common.url,
        lane: common.lane,
        icon: common.icon,
        shape,
    })
}

fn derive_domain(items: &[TimelineItem], settings: &Settings) -> TimeDomain {
    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
    for item in items {
        let (lo, hi) = (item.shape.min_date(), item.shape.max_date());
        bounds = Some(match bounds {
            None => (lo, hi),
            Some((min, max)) => (min.min(lo), max.max(hi)),
        });
    }
    match bounds {
        Some((start, end)) => TimeDomain { start, end },
        None => TimeDomain {
            start: settings.start,
            end: settings.end,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    const DOC: &str = r##"{
        "settings": {
            "start": "1990-01-01",
            "end": "2026-01-01",
            "defaultColor": "#0de7e7",
            "backgroundColor": "#2c2d2f",
            "tracks": [
                { "id": "career", "label": "Career", "position": "top" },
                { "id": "life", "label": "Life", "position": "bottom" }
            ]
        },
        "items": [
            { "id": "job-1", "type": "range", "label": "Junior Dev",
              "start": "2014-07-01", "end": "2016-05-01", "track": "career" },
            { "id": "job-2", "type": "range", "label": "Staff Engineer",
              "start": "2020-04-01", "end": null, "track": "career", "lane": 1 },
            { "id": "life-1", "type": "milestone", "label": "Born",
              "date": "1990-05-15", "track": "life" },
            { "id": "era-1", "type": "band", "label": "Formative Years",
              "start": "1990-01-01", "end": "2008-09-01", "track": "life" },
            { "id": "lost", "type": "range", "label": "Orphan",
              "start": "2000-01-01", "end": "2001-01-01", "track": "hobby" },
            { "id": "broken", "type": "milestone", "label": "No date" }
        ]
    }"##;

    #[test]
    fn skips_unresolvable_and_malformed_items() {
        let today = date(2026, 8, 31);
        let model = TimelineModel::from_json_at(DOC.as_bytes(), today).expect("load");
        // "lost" (unknown track) and "broken" (missing date) are dropped.
        assert_eq!(model.items.len(), 4);
        assert!(model.items.iter().all(|i| i.id != "lost" && i.id != "broken"));
    }

    #[test]
    fn ongoing_range_resolves_to_today() {
        let today = date(2026, 8, 31);
        let model = TimelineModel::from_json_at(DOC.as_bytes(), today).expect("load");
        let job = model
            .items
            .iter()
            .find(|i| i.id == "job-2")
            .expect("job-2 survives");
        assert_eq!(
            job.shape,
            ItemShape::Range {
                start: date(2020, 4, 1),
                end: today,
                ongoing: true,
            }
        );
    }

    #[test]
    fn band_ignores_track_and_default_color_applies() {
        let model =
            TimelineModel::from_json_at(DOC.as_bytes(), date(2026, 8, 31)).expect("load");
        let band = model.bands().next().expect("band survives");
        assert!(band.track.is_none());
        assert_eq!(band.color, Color::rgb(0x0d, 0xe7, 0xe7));
    }

    #[test]
    fn domain_spans_items_not_settings() {
        let today = date(2026, 8, 31);
        let model = TimelineModel::from_json_at(DOC.as_bytes(), today).expect("load");
        assert_eq!(model.domain.start, date(1990, 1, 1));
        // The ongoing range stretches the domain to "today".
        assert_eq!(model.domain.end, today);
        assert_eq!(model.domain.years(), 1990..=2026);
    }

    #[test]
    fn empty_document_falls_back_to_settings_domain() {
        let doc = r##"{
            "settings": {
                "start": "1990-01-01", "end": "2026-01-01",
                "defaultColor": "#0de7e7", "backgroundColor": "#2c2d2f",
                "tracks": []
            },
            "items": []
        }"##;
        let model =
            TimelineModel::from_json_at(doc.as_bytes(), date(2026, 8, 31)).expect("load");
        assert_eq!(model.domain.start, date(1990, 1, 1));
        assert_eq!(model.domain.end, date(2026, 1, 1));
        assert!(model.domain.span_days() > 0.0);
    }

    #[test]
    fn zero_length_domain_still_has_positive_span() {
        let d = TimeDomain {
            start: date(2020, 1, 1),
            end: date(2020, 1, 1),
        };
        assert_eq!(d.span_days(), 1.0);
    }

    #[test]
    fn missing_top_level_fields_are_fatal() {
        assert!(TimelineModel::from_json_at(b"{}", date(2026, 1, 1)).is_err());
        assert!(
            TimelineModel::from_json_at(br#"{ "items": [] }"#, date(2026, 1, 1)).is_err()
        );
    }
}
