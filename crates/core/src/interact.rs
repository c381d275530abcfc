//! Interaction dispatcher: routes pointer/wheel events into pan/zoom
//! updates and tooltip/navigation effects.
//!
//! One dispatcher per loaded document. It owns the [`ViewTransform`]
//! (single writer) and runs a small pointer state machine:
//! `Idle -> Dragging -> Idle`. Renderers read the transform each frame and
//! apply the returned effects to whatever tooltip/navigation surface the
//! host has.

use yearline_protocol::{Point, Rect};

use crate::layout::ViewTransform;
use crate::scene::{HitRegion, Scene};

/// Fixed per-tick zoom steps. Wheel magnitude is ignored — direction only.
pub const ZOOM_IN_STEP: f64 = 1.1;
pub const ZOOM_OUT_STEP: f64 = 0.9;

/// Maximum pointer travel (device px) for a press to still count as a click.
const CLICK_TOLERANCE: f64 = 3.0;

/// A pointer/wheel event in device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { pos: Point },
    Move { pos: Point },
    Up { pos: Point },
    /// Pointer left the canvas — ends any drag and hides the tooltip.
    Leave,
    Wheel { pos: Point, direction: WheelDirection },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    ZoomIn,
    ZoomOut,
}

/// Side effects for the host surface to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The transform changed — repaint with the new pan/zoom.
    ViewChanged,
    TooltipShow { pos: Point, text: String },
    TooltipMove { pos: Point },
    TooltipHide,
    /// Open the item's navigation target in a new browsing context.
    OpenUrl(String),
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start: Point,
    start_pan: f64,
    /// Greatest distance travelled in either axis, so a press that slides
    /// vertically still disqualifies as a click.
    max_travel: f64,
}

#[derive(Debug)]
pub struct Dispatcher {
    view: ViewTransform,
    drag: Option<Drag>,
    /// Item id the tooltip is currently attached to.
    hover: Option<String>,
}

impl Dispatcher {
    pub fn new(view: ViewTransform) -> Self {
        Self {
            view,
            drag: None,
            hover: None,
        }
    }

    /// The current transform, for rendering.
    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// Replace the transform wholesale. Only on document reload — resize
    /// deliberately leaves pan/zoom alone.
    pub fn reset(&mut self, view: ViewTransform) {
        self.view = view;
        self.drag = None;
        self.hover = None;
    }

    pub fn dispatch(&mut self, event: PointerEvent, scene: &Scene) -> Vec<Effect> {
        match event {
            PointerEvent::Down { pos } => {
                self.drag = Some(Drag {
                    start: pos,
                    start_pan: self.view.pan(),
                    max_travel: 0.0,
                });
                Vec::new()
            }

            PointerEvent::Move { pos } => {
                if let Some(drag) = &mut self.drag {
                    // Pan is re-derived from the drag origin on every move,
                    // not accumulated per event — incremental deltas would
                    // compound rounding error over a long drag.
                    let delta = pos.x - drag.start.x;
                    drag.max_travel = drag
                        .max_travel
                        .max(delta.abs())
                        .max((pos.y - drag.start.y).abs());
                    self.view.set_pan(drag.start_pan + delta);

                    let mut effects = vec![Effect::ViewChanged];
                    if self.hover.take().is_some() {
                        effects.push(Effect::TooltipHide);
                    }
                    effects
                } else {
                    self.hover_effects(pos, scene)
                }
            }

            PointerEvent::Up { pos } => {
                let Some(drag) = self.drag.take() else {
                    return Vec::new();
                };
                if drag.max_travel < CLICK_TOLERANCE
                    && let Some(hit) = self.hit_test(scene, pos)
                    && let Some(url) = &hit.url
                {
                    return vec![Effect::OpenUrl(url.clone())];
                }
                Vec::new()
            }

            PointerEvent::Leave => {
                self.drag = None;
                if self.hover.take().is_some() {
                    vec![Effect::TooltipHide]
                } else {
                    Vec::new()
                }
            }

            PointerEvent::Wheel { pos, direction } => {
                let factor = match direction {
                    WheelDirection::ZoomIn => ZOOM_IN_STEP,
                    WheelDirection::ZoomOut => ZOOM_OUT_STEP,
                };
                self.view.zoom_at(pos.x, factor);
                vec![Effect::ViewChanged]
            }
        }
    }

    fn hover_effects(&mut self, pos: Point, scene: &Scene) -> Vec<Effect> {
        let hit = self.hit_test(scene, pos);
        match (hit, self.hover.as_deref()) {
            (Some(hit), Some(current)) if hit.item_id == current => {
                vec![Effect::TooltipMove { pos }]
            }
            (Some(hit), _) => {
                self.hover = Some(hit.item_id.clone());
                vec![Effect::TooltipShow {
                    pos,
                    text: hit.tooltip.clone(),
                }]
            }
            (None, Some(_)) => {
                self.hover = None;
                vec![Effect::TooltipHide]
            }
            (None, None) => Vec::new(),
        }
    }

    /// Topmost hit region under a device-space point. Hit bounds are world
    /// space, so only X needs the inverse transform — the vertical axis is
    /// not zoomed.
    pub fn hit_test<'a>(&self, scene: &'a Scene, pos: Point) -> Option<&'a HitRegion> {
        let world = Point::new(self.view.world_x(pos.x), pos.y);
        scene
            .hits
            .iter()
            .rev()
            .find(|hit| contains_scaled(hit.bounds, world, self.view.zoom()))
    }
}

/// Containment check that respects the minimum on-screen size: a 2px
/// sliver bar should stay hoverable even when zoomed far out, so the world
/// width is tested against at least `1 / zoom` pixels.
fn contains_scaled(bounds: Rect, world: Point, zoom: f64) -> bool {
    let min_w = 1.0 / zoom;
    let w = bounds.w.max(min_w);
    world.x >= bounds.x
        && world.x <= bounds.x + w
        && world.y >= bounds.y
        && world.y <= bounds.y + bounds.h
}

#[cfg(test)]
mod tests {
    use super::*;
    use yearline_protocol::Color;

    fn scene_with(hits: Vec<HitRegion>) -> Scene {
        Scene {
            primitives: Vec::new(),
            hits,
            background: Color::rgb(0x2c, 0x2d, 0x2f),
        }
    }

    fn hit(id: &str, bounds: Rect, url: Option<&str>) -> HitRegion {
        HitRegion {
            bounds,
            item_id: id.to_string(),
            tooltip: format!("{id}\n2014 – 2016"),
            url: url.map(str::to_string),
        }
    }

    fn at(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn drag_pans_relative_to_drag_start() {
        let scene = scene_with(Vec::new());
        let mut d = Dispatcher::new(ViewTransform::new(100.0));
        d.dispatch(PointerEvent::Down { pos: at(400.0, 300.0) }, &scene);
        d.dispatch(PointerEvent::Move { pos: at(430.0, 300.0) }, &scene);
        assert_eq!(d.view().pan(), 130.0);
        // A later move is still anchored to the drag origin.
        d.dispatch(PointerEvent::Move { pos: at(350.0, 300.0) }, &scene);
        assert_eq!(d.view().pan(), 50.0);
        d.dispatch(PointerEvent::Up { pos: at(350.0, 300.0) }, &scene);
        // Idle moves no longer pan.
        d.dispatch(PointerEvent::Move { pos: at(500.0, 300.0) }, &scene);
        assert_eq!(d.view().pan(), 50.0);
    }

    #[test]
    fn leave_ends_the_drag() {
        let scene = scene_with(Vec::new());
        let mut d = Dispatcher::new(ViewTransform::new(0.0));
        d.dispatch(PointerEvent::Down { pos: at(100.0, 100.0) }, &scene);
        d.dispatch(PointerEvent::Leave, &scene);
        d.dispatch(PointerEvent::Move { pos: at(300.0, 100.0) }, &scene);
        assert_eq!(d.view().pan(), 0.0);
    }

    #[test]
    fn wheel_zoom_uses_fixed_steps_anchored_at_cursor() {
        let scene = scene_with(Vec::new());
        let mut d = Dispatcher::new(ViewTransform::new(0.0));
        let anchor = at(240.0, 0.0);
        let world_before = d.view().world_x(anchor.x);
        let effects = d.dispatch(
            PointerEvent::Wheel { pos: anchor, direction: WheelDirection::ZoomIn },
            &scene,
        );
        assert_eq!(effects, vec![Effect::ViewChanged]);
        assert!((d.view().zoom() - ZOOM_IN_STEP).abs() < 1e-12);
        assert!((d.view().world_x(anchor.x) - world_before).abs() < 1e-9);
    }

    #[test]
    fn tooltip_lifecycle_over_an_item() {
        let scene = scene_with(vec![hit(
            "job-1",
            Rect::new(100.0, 200.0, 120.0, 24.0),
            None,
        )]);
        let mut d = Dispatcher::new(ViewTransform::new(0.0));

        let enter = d.dispatch(PointerEvent::Move { pos: at(110.0, 210.0) }, &scene);
        assert_eq!(
            enter,
            vec![Effect::TooltipShow {
                pos: at(110.0, 210.0),
                text: "job-1\n2014 – 2016".to_string(),
            }]
        );

        let within = d.dispatch(PointerEvent::Move { pos: at(150.0, 215.0) }, &scene);
        assert_eq!(within, vec![Effect::TooltipMove { pos: at(150.0, 215.0) }]);

        let exit = d.dispatch(PointerEvent::Move { pos: at(500.0, 500.0) }, &scene);
        assert_eq!(exit, vec![Effect::TooltipHide]);
        // No further hide once already hidden.
        assert!(
            d.dispatch(PointerEvent::Move { pos: at(510.0, 500.0) }, &scene)
                .is_empty()
        );
    }

    #[test]
    fn hit_testing_accounts_for_pan_and_zoom() {
        let scene = scene_with(vec![hit(
            "job-1",
            Rect::new(100.0, 200.0, 120.0, 24.0),
            None,
        )]);
        let mut view = ViewTransform::new(50.0);
        // Anchor at the pan origin: zoom doubles, pan stays 50.
        view.zoom_at(50.0, 2.0);
        let d = Dispatcher::new(view);
        // World x=150 maps to device 50 + 150*2 = 350.
        assert!(d.hit_test(&scene, at(350.0, 210.0)).is_some());
        assert!(d.hit_test(&scene, at(150.0, 210.0)).is_none());
    }

    #[test]
    fn topmost_region_wins() {
        let scene = scene_with(vec![
            hit("below", Rect::new(0.0, 0.0, 200.0, 200.0), None),
            hit("above", Rect::new(50.0, 50.0, 50.0, 50.0), None),
        ]);
        let d = Dispatcher::new(ViewTransform::new(0.0));
        let top = d.hit_test(&scene, at(60.0, 60.0)).expect("hit");
        assert_eq!(top.item_id, "above");
    }

    #[test]
    fn click_on_linked_item_opens_url() {
        let scene = scene_with(vec![hit(
            "job-2",
            Rect::new(100.0, 200.0, 120.0, 24.0),
            Some("https://example.com/techgiant"),
        )]);
        let mut d = Dispatcher::new(ViewTransform::new(0.0));
        d.dispatch(PointerEvent::Down { pos: at(110.0, 210.0) }, &scene);
        let effects = d.dispatch(PointerEvent::Up { pos: at(111.0, 210.0) }, &scene);
        assert_eq!(
            effects,
            vec![Effect::OpenUrl("https://example.com/techgiant".to_string())]
        );
    }

    #[test]
    fn vertical_slide_is_not_a_click() {
        let scene = scene_with(vec![hit(
            "job-2",
            Rect::new(0.0, 0.0, 1000.0, 1000.0),
            Some("https://example.com"),
        )]);
        let mut d = Dispatcher::new(ViewTransform::new(0.0));
        d.dispatch(PointerEvent::Down { pos: at(100.0, 100.0) }, &scene);
        // No horizontal travel at all, but well past the click tolerance
        // vertically.
        d.dispatch(PointerEvent::Move { pos: at(100.0, 160.0) }, &scene);
        let effects = d.dispatch(PointerEvent::Up { pos: at(100.0, 160.0) }, &scene);
        assert!(effects.is_empty());
        // The pan is untouched by a purely vertical slide.
        assert_eq!(d.view().pan(), 0.0);
    }

    #[test]
    fn a_real_drag_is_not_a_click() {
        let scene = scene_with(vec![hit(
            "job-2",
            Rect::new(0.0, 0.0, 1000.0, 1000.0),
            Some("https://example.com"),
        )]);
        let mut d = Dispatcher::new(ViewTransform::new(0.0));
        d.dispatch(PointerEvent::Down { pos: at(100.0, 100.0) }, &scene);
        d.dispatch(PointerEvent::Move { pos: at(160.0, 100.0) }, &scene);
        let effects = d.dispatch(PointerEvent::Up { pos: at(160.0, 100.0) }, &scene);
        assert!(effects.is_empty());
    }
}
