//! Scene builder: turns the normalized model + layout into an ordered list
//! of drawable primitives.
//!
//! Draw order is a hard contract (back to front): bands → axis + year
//! ticks → track labels → items in document order. Later primitives occlude
//! earlier ones, so the order must be preserved exactly by every renderer.
//!
//! Geometry is world-space and transform-excluded: the scene is rebuilt
//! only on structural change (load, resize), while pan/zoom is applied by
//! renderers on every interaction frame.

use chrono::{Datelike, NaiveDate};
use log::{debug, warn};
use yearline_protocol::{Color, Point, Rect, ScenePrimitive, TextAlign, Viewport};

use crate::layout::{LANE_HEIGHT, PADDING_BOTTOM, PADDING_TOP, TimeScale, TrackLayout};
use crate::model::{ItemShape, LabelStyle, TimelineItem, TimelineModel};

const BAR_HEIGHT: f64 = LANE_HEIGHT;
const MIN_BAR_WIDTH: f64 = 2.0;
const MIN_BAND_WIDTH: f64 = 1.0;
const BAND_OPACITY: f64 = 0.18;
const MILESTONE_RADIUS: f64 = 6.0;
/// Bars narrower than this relocate their inside label past the right edge.
const LABEL_VISIBILITY_WIDTH: f64 = 50.0;
const LABEL_PAD: f64 = 5.0;
/// How far the axis line extends past the first/last year.
const AXIS_MARGIN: f64 = 30.0;
const TICK_HALF_HEIGHT: f64 = 5.0;
const TICK_LABEL_OFFSET: f64 = 20.0;
const TRACK_LABEL_GAP: f64 = 10.0;
const ITEM_FONT_SIZE: f64 = 11.0;
const TICK_FONT_SIZE: f64 = 10.0;
const TRACK_LABEL_FONT_SIZE: f64 = 12.0;

const AXIS_COLOR: Color = Color::rgb(0xcb, 0xd5, 0xe1);
const TEXT_COLOR: Color = Color::rgb(0xe2, 0xe8, 0xf0);
const MUTED_TEXT_COLOR: Color = Color::rgb(0x94, 0xa3, 0xb8);

/// A pointer-interactive region of the scene, in world space.
#[derive(Debug, Clone)]
pub struct HitRegion {
    pub bounds: Rect,
    pub item_id: String,
    pub tooltip: String,
    pub url: Option<String>,
}

/// The full drawable scene plus its interaction surface.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Back-to-front primitive list.
    pub primitives: Vec<ScenePrimitive>,
    /// Hit regions in the same back-to-front order as their primitives;
    /// hit-testing picks the last (topmost) match.
    pub hits: Vec<HitRegion>,
    pub background: Color,
}

/// Build the scene. Deterministic in its inputs; the view transform is
/// deliberately not one of them.
pub fn build_scene(
    model: &TimelineModel,
    layout: &TrackLayout,
    scale: &TimeScale,
    viewport: &Viewport,
) -> Scene {
    let mut scene = Scene {
        primitives: Vec::with_capacity(model.items.len() * 2 + 16),
        hits: Vec::with_capacity(model.items.len()),
        background: model.settings.background_color,
    };

    for band in model.bands() {
        push_band(&mut scene, band, scale, viewport);
    }
    push_axis(&mut scene, model, layout, scale);
    push_track_labels(&mut scene, model, layout, scale);
    for item in model.track_items() {
        push_item(&mut scene, item, layout, scale);
    }

    debug!(
        "scene built: {} primitives, {} hit regions",
        scene.primitives.len(),
        scene.hits.len()
    );
    scene
}

fn push_band(scene: &mut Scene, band: &TimelineItem, scale: &TimeScale, viewport: &Viewport) {
    let ItemShape::Band { start, end, .. } = band.shape else {
        return;
    };
    let x1 = scale.time_to_x(start);
    let w = (scale.time_to_x(end) - x1).max(MIN_BAND_WIDTH);
    let bounds = Rect::new(
        x1,
        PADDING_TOP,
        w,
        (viewport.height - PADDING_TOP - PADDING_BOTTOM).max(0.0),
    );

    scene.primitives.push(ScenePrimitive::Rect {
        rect: bounds,
        fill: band.color,
        opacity: BAND_OPACITY,
        item_id: Some(band.id.clone()),
    });
    scene.primitives.push(ScenePrimitive::Text {
        position: Point::new(x1 + 4.0, PADDING_TOP + 14.0),
        text: band.label.clone(),
        color: band.color,
        font_size: TICK_FONT_SIZE,
        align: TextAlign::Left,
    });
    scene.hits.push(HitRegion {
        bounds,
        item_id: band.id.clone(),
        tooltip: tooltip_text(band),
        url: band.url.clone(),
    });
}

fn push_axis(scene: &mut Scene, model: &TimelineModel, layout: &TrackLayout, scale: &TimeScale) {
    let axis_y = layout.axis_y();
    // The line must reach the outermost year ticks: a domain that starts
    // mid-year puts the first tick (Jan 1) left of the domain start, which
    // at high density falls outside any fixed margin.
    let mut x_start = scale.time_to_x(model.domain.start);
    let mut x_end = scale.time_to_x(model.domain.end);
    if let Some(jan1) = NaiveDate::from_ymd_opt(model.domain.start.year(), 1, 1) {
        x_start = x_start.min(scale.time_to_x(jan1));
    }
    if let Some(jan1) = NaiveDate::from_ymd_opt(model.domain.end.year(), 1, 1) {
        x_end = x_end.max(scale.time_to_x(jan1));
    }
    let x_start = x_start - AXIS_MARGIN;
    let x_end = x_end + AXIS_MARGIN;

    scene.primitives.push(ScenePrimitive::Line {
        from: Point::new(x_start, axis_y),
        to: Point::new(x_end, axis_y),
        color: AXIS_COLOR,
        width: 1.5,
    });

    // One tick per integer year, inclusive. All ticks across the span are
    // emitted — with continuous pan the viewport does the clipping, so
    // pre-filtering would only hide ticks the user can pan to.
    for year in model.domain.years() {
        let Some(jan1) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            continue;
        };
        let x = scale.time_to_x(jan1);
        scene.primitives.push(ScenePrimitive::Line {
            from: Point::new(x, axis_y - TICK_HALF_HEIGHT),
            to: Point::new(x, axis_y + TICK_HALF_HEIGHT),
            color: AXIS_COLOR,
            width: 1.0,
        });
        scene.primitives.push(ScenePrimitive::Text {
            position: Point::new(x, axis_y + TICK_LABEL_OFFSET),
            text: year.to_string(),
            color: MUTED_TEXT_COLOR,
            font_size: TICK_FONT_SIZE,
            align: TextAlign::Center,
        });
    }
}

fn push_track_labels(
    scene: &mut Scene,
    model: &TimelineModel,
    layout: &TrackLayout,
    scale: &TimeScale,
) {
    let label_x = scale.time_to_x(model.domain.start) - TRACK_LABEL_GAP;
    for track in &model.settings.tracks {
        // The layout was built from this same track list, so resolution
        // only fails if the two ever drift apart — degrade, don't die.
        let y = match layout.baseline_y(&track.id) {
            Ok(y) => y,
            Err(err) => {
                warn!("track label dropped: {err}");
                continue;
            }
        };
        scene.primitives.push(ScenePrimitive::Text {
            position: Point::new(label_x, y + 4.0),
            text: track.label.clone(),
            color: TEXT_COLOR,
            font_size: TRACK_LABEL_FONT_SIZE,
            align: TextAlign::Right,
        });
    }
}

fn push_item(scene: &mut Scene, item: &TimelineItem, layout: &TrackLayout, scale: &TimeScale) {
    let Some(track) = item.track.as_deref() else {
        return;
    };
    // Unknown tracks were skipped at normalization; this guard keeps the
    // render pass alive even if a stale scene is built from edited state.
    let lane_y = match layout.lane_y(track, item.lane) {
        Ok(y) => y,
        Err(err) => {
            warn!("item {:?} dropped: {err}", item.id);
            return;
        }
    };

    match item.shape {
        ItemShape::Range { start, end, .. } => {
            let x1 = scale.time_to_x(start);
            // end < start is passed through unvalidated; the width floor
            // keeps such bars visible as slivers at their start date.
            let w = (scale.time_to_x(end) - x1).max(MIN_BAR_WIDTH);
            let bounds = Rect::new(x1, lane_y - BAR_HEIGHT / 2.0, w, BAR_HEIGHT);

            scene.primitives.push(ScenePrimitive::Rect {
                rect: bounds,
                fill: item.color,
                opacity: 1.0,
                item_id: Some(item.id.clone()),
            });
            push_range_label(scene, item, bounds);
            scene.hits.push(HitRegion {
                bounds,
                item_id: item.id.clone(),
                tooltip: tooltip_text(item),
                url: item.url.clone(),
            });
        }
        ItemShape::Milestone { date } => {
            let cx = scale.time_to_x(date);
            scene.primitives.push(ScenePrimitive::Circle {
                center: Point::new(cx, lane_y),
                radius: MILESTONE_RADIUS,
                fill: item.color,
                item_id: Some(item.id.clone()),
            });
            scene.primitives.push(ScenePrimitive::Text {
                position: Point::new(cx + MILESTONE_RADIUS + 4.0, lane_y + 4.0),
                text: item.label.clone(),
                color: TEXT_COLOR,
                font_size: ITEM_FONT_SIZE,
                align: TextAlign::Left,
            });
            scene.hits.push(HitRegion {
                bounds: Rect::new(
                    cx - MILESTONE_RADIUS,
                    lane_y - MILESTONE_RADIUS,
                    MILESTONE_RADIUS * 2.0,
                    MILESTONE_RADIUS * 2.0,
                ),
                item_id: item.id.clone(),
                tooltip: tooltip_text(item),
                url: item.url.clone(),
            });
        }
        ItemShape::Band { .. } => {}
    }
}

fn push_range_label(scene: &mut Scene, item: &TimelineItem, bar: Rect) {
    let (position, align) = match item.style {
        LabelStyle::BarBelow => (
            Point::new(bar.x, bar.y + bar.h + 12.0),
            TextAlign::Left,
        ),
        // Inside the left edge when the bar is wide enough; otherwise the
        // label relocates past the right edge instead of disappearing.
        _ if bar.w > LABEL_VISIBILITY_WIDTH => (
            Point::new(bar.x + LABEL_PAD, bar.y + bar.h / 2.0 + 4.0),
            TextAlign::Left,
        ),
        _ => (
            Point::new(bar.x + bar.w + LABEL_PAD, bar.y + bar.h / 2.0 + 4.0),
            TextAlign::Left,
        ),
    };
    scene.primitives.push(ScenePrimitive::Text {
        position,
        text: item.label.clone(),
        color: TEXT_COLOR,
        font_size: ITEM_FONT_SIZE,
        align,
    });
}

/// Tooltip body for an item: label, year range (open ranges end in
/// "Present"), then the optional description.
pub fn tooltip_text(item: &TimelineItem) -> String {
    let mut text = match item.shape {
        ItemShape::Range { start, end, ongoing } | ItemShape::Band { start, end, ongoing } => {
            if ongoing {
                format!("{}\n{} – Present", item.label, start.year())
            } else {
                format!("{}\n{} – {}", item.label, start.year(), end.year())
            }
        }
        ItemShape::Milestone { date } => format!("{}\n{}", item.label, date.year()),
    };
    if let Some(desc) = &item.desc {
        text.push('\n');
        text.push_str(desc);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PADDING_LEFT, PADDING_RIGHT};
    use crate::model::TimelineModel;

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
              "start": "2014-07-01", "end": "2016-05-01", "track": "career",
              "desc": "First full-time role." },
            { "id": "life-1", "type": "milestone", "label": "Born",
              "date": "1990-05-15", "track": "life" }
        ]
    }"##;

    fn build(doc: &str) -> (TimelineModel, TrackLayout, TimeScale, Viewport) {
        let model =
            TimelineModel::from_json_at(doc.as_bytes(), date(2026, 8, 31)).expect("load");
        let viewport = Viewport::new(960.0, 600.0);
        let layout = TrackLayout::new(&model.settings.tracks, viewport.axis_y());
        let scale = TimeScale::fit(
            &model.domain,
            viewport.width - PADDING_LEFT - PADDING_RIGHT,
        );
        (model, layout, scale, viewport)
    }

    #[test]
    fn two_track_scenario_counts_and_sides() {
        let (model, layout, scale, viewport) = build(DOC);
        let scene = build_scene(&model, &layout, &scale, &viewport);
        let axis_y = layout.axis_y();

        let rects: Vec<_> = scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                ScenePrimitive::Rect { rect, item_id, .. } => {
                    Some((*rect, item_id.clone()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(rects.len(), 1, "exactly one range bar, no bands");
        assert_eq!(rects[0].1.as_deref(), Some("job-1"));
        // Range sits on the top track: strictly above the axis.
        assert!(rects[0].0.y + rects[0].0.h / 2.0 < axis_y);

        let circles: Vec<_> = scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                ScenePrimitive::Circle { center, .. } => Some(*center),
                _ => None,
            })
            .collect();
        assert_eq!(circles.len(), 1, "exactly one milestone");
        assert!(circles[0].y > axis_y, "milestone on the bottom track");

        let track_labels = scene
            .primitives
            .iter()
            .filter(|p| {
                matches!(p, ScenePrimitive::Text { text, .. }
                    if text == "Career" || text == "Life")
            })
            .count();
        assert_eq!(track_labels, 2);

        // Exactly one horizontal line (the axis); all other lines are
        // vertical year ticks.
        let horizontal_lines = scene
            .primitives
            .iter()
            .filter(|p| matches!(p, ScenePrimitive::Line { from, to, .. } if from.y == to.y))
            .count();
        assert_eq!(horizontal_lines, 1);
    }

    #[test]
    fn draw_order_is_bands_axis_labels_items() {
        let doc = DOC.replace(
            r#""items": ["#,
            r##""items": [
            { "id": "era-1", "type": "band", "label": "Era",
              "start": "1990-01-01", "end": "2000-01-01" },"##,
        );
        let (model, layout, scale, viewport) = build(&doc);
        let scene = build_scene(&model, &layout, &scale, &viewport);

        let index_of = |pred: &dyn Fn(&ScenePrimitive) -> bool| {
            scene
                .primitives
                .iter()
                .position(|p| pred(p))
                .expect("primitive present")
        };
        let band = index_of(&|p| {
            matches!(p, ScenePrimitive::Rect { opacity, .. } if *opacity < 1.0)
        });
        let axis = index_of(&|p| matches!(p, ScenePrimitive::Line { .. }));
        let track_label = index_of(&|p| {
            matches!(p, ScenePrimitive::Text { text, .. } if text == "Career")
        });
        let bar = index_of(&|p| {
            matches!(p, ScenePrimitive::Rect { opacity, .. } if *opacity == 1.0)
        });
        assert!(band < axis && axis < track_label && track_label < bar);
    }

    #[test]
    fn year_ticks_cover_domain_inclusive() {
        let (model, layout, scale, viewport) = build(DOC);
        let scene = build_scene(&model, &layout, &scale, &viewport);
        let years: Vec<_> = scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                ScenePrimitive::Text { text, .. } => text.parse::<i32>().ok(),
                _ => None,
            })
            .collect();
        // Domain is derived from items: 1990-05-15 .. 2016-05-01.
        assert_eq!(years.first(), Some(&1990));
        assert_eq!(years.last(), Some(&2016));
        assert_eq!(years.len(), 27);
    }

    #[test]
    fn ongoing_tooltip_ends_in_present() {
        let doc = DOC.replace(r#""end": "2016-05-01","#, r#""end": null,"#);
        let (model, layout, scale, viewport) = build(&doc);
        let scene = build_scene(&model, &layout, &scale, &viewport);
        let hit = scene
            .hits
            .iter()
            .find(|h| h.item_id == "job-1")
            .expect("range hit region");
        assert_eq!(hit.tooltip, "Junior Dev\n2014 – Present\nFirst full-time role.");
        let date_line = hit.tooltip.lines().nth(1).expect("date line");
        assert!(date_line.ends_with("Present"));
    }

    #[test]
    fn milestone_tooltip_has_single_year() {
        let (model, layout, scale, viewport) = build(DOC);
        let scene = build_scene(&model, &layout, &scale, &viewport);
        let hit = scene
            .hits
            .iter()
            .find(|h| h.item_id == "life-1")
            .expect("milestone hit region");
        assert_eq!(hit.tooltip, "Born\n1990");
    }

    #[test]
    fn zero_duration_range_keeps_minimum_width() {
        let doc = DOC.replace(r#""end": "2016-05-01","#, r#""end": "2014-07-01","#);
        let (model, layout, scale, viewport) = build(&doc);
        let scene = build_scene(&model, &layout, &scale, &viewport);
        let bar = scene
            .primitives
            .iter()
            .find_map(|p| match p {
                ScenePrimitive::Rect { rect, opacity, .. } if *opacity == 1.0 => Some(*rect),
                _ => None,
            })
            .expect("range bar");
        assert_eq!(bar.w, MIN_BAR_WIDTH);
    }

    #[test]
    fn narrow_bar_label_relocates_past_right_edge() {
        let doc = DOC.replace(r#""end": "2016-05-01","#, r#""end": "2014-07-08","#);
        let (model, layout, scale, viewport) = build(&doc);
        let scene = build_scene(&model, &layout, &scale, &viewport);
        let bar = scene
            .primitives
            .iter()
            .find_map(|p| match p {
                ScenePrimitive::Rect { rect, opacity, .. } if *opacity == 1.0 => Some(*rect),
                _ => None,
            })
            .expect("range bar");
        let label = scene
            .primitives
            .iter()
            .find_map(|p| match p {
                ScenePrimitive::Text { position, text, .. } if text == "Junior Dev" => {
                    Some(*position)
                }
                _ => None,
            })
            .expect("range label");
        assert!(bar.w <= LABEL_VISIBILITY_WIDTH);
        assert!(label.x >= bar.x + bar.w);
    }

    #[test]
    fn axis_line_reaches_ticks_of_a_mid_year_domain() {
        // A two-month domain: at fit density the Jan 1 tick of the start
        // year sits far left of the domain start.
        let doc = r##"{
            "settings": {
                "start": "2020-01-01", "end": "2021-01-01",
                "defaultColor": "#0de7e7", "backgroundColor": "#2c2d2f",
                "tracks": [ { "id": "a", "label": "A", "position": "top" } ]
            },
            "items": [
                { "id": "r1", "type": "range", "label": "Summer",
                  "start": "2020-06-15", "end": "2020-08-15", "track": "a" }
            ]
        }"##;
        let (model, layout, scale, viewport) = build(doc);
        let scene = build_scene(&model, &layout, &scale, &viewport);

        let axis = scene
            .primitives
            .iter()
            .find_map(|p| match p {
                ScenePrimitive::Line { from, to, .. } if from.y == to.y => Some((*from, *to)),
                _ => None,
            })
            .expect("axis line");
        let tick_xs: Vec<f64> = scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                ScenePrimitive::Line { from, to, .. } if from.x == to.x => Some(from.x),
                _ => None,
            })
            .collect();
        assert!(!tick_xs.is_empty());
        for x in tick_xs {
            assert!(x >= axis.0.x && x <= axis.1.x, "tick at {x} off the axis");
        }
    }

    #[test]
    fn empty_document_builds_axis_only_scene() {
        let doc = r##"{
            "settings": {
                "start": "1990-01-01", "end": "1995-01-01",
                "defaultColor": "#0de7e7", "backgroundColor": "#2c2d2f",
                "tracks": []
            },
            "items": []
        }"##;
        let (model, layout, scale, viewport) = build(doc);
        let scene = build_scene(&model, &layout, &scale, &viewport);
        assert!(scene.hits.is_empty());
        assert!(
            scene
                .primitives
                .iter()
                .any(|p| matches!(p, ScenePrimitive::Line { .. }))
        );
    }
}
