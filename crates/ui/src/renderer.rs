//! Paints a scene into an egui `Painter`, applying the view transform.
//!
//! The scene is world-space; only X coordinates are transformed (pan/zoom
//! acts along the time axis), Y is offset by the canvas origin.

use egui::{Align2, Color32, CornerRadius, FontId, Pos2, Stroke};
use yearline_core::layout::ViewTransform;
use yearline_core::scene::Scene;
use yearline_protocol::{Color, ScenePrimitive, TextAlign};

fn to_color32(color: Color, opacity: f64) -> Color32 {
    let a = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, a)
}

/// Render the primitive list in order. `origin` is the canvas top-left in
/// screen coordinates.
pub fn paint_scene(
    painter: &egui::Painter,
    scene: &Scene,
    view: &ViewTransform,
    origin: Pos2,
) {
    let zoom = view.zoom();
    let dx = |world_x: f64| (view.device_x(world_x) as f32) + origin.x;
    let dy = |y: f64| (y as f32) + origin.y;

    for prim in &scene.primitives {
        match prim {
            ScenePrimitive::Rect {
                rect,
                fill,
                opacity,
                ..
            } => {
                let w = ((rect.w * zoom) as f32).max(0.5);
                let egui_rect = egui::Rect::from_min_size(
                    Pos2::new(dx(rect.x), dy(rect.y)),
                    egui::vec2(w, rect.h as f32),
                );
                if !painter.clip_rect().intersects(egui_rect) {
                    continue;
                }
                painter.rect_filled(egui_rect, CornerRadius::ZERO, to_color32(*fill, *opacity));
            }

            ScenePrimitive::Circle {
                center,
                radius,
                fill,
                ..
            } => {
                let pos = Pos2::new(dx(center.x), dy(center.y));
                if !painter.clip_rect().expand(*radius as f32).contains(pos) {
                    continue;
                }
                painter.circle_filled(pos, *radius as f32, to_color32(*fill, 1.0));
            }

            ScenePrimitive::Line {
                from,
                to,
                color,
                width,
            } => {
                painter.line_segment(
                    [
                        Pos2::new(dx(from.x), dy(from.y)),
                        Pos2::new(dx(to.x), dy(to.y)),
                    ],
                    Stroke::new(*width as f32, to_color32(*color, 1.0)),
                );
            }

            ScenePrimitive::Text {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                // Scene text positions are baseline-anchored (SVG
                // semantics), so anchor egui text at the bottom.
                let anchor = match align {
                    TextAlign::Left => Align2::LEFT_BOTTOM,
                    TextAlign::Center => Align2::CENTER_BOTTOM,
                    TextAlign::Right => Align2::RIGHT_BOTTOM,
                };
                painter.text(
                    Pos2::new(dx(position.x), dy(position.y)),
                    anchor,
                    text,
                    FontId::proportional(*font_size as f32),
                    to_color32(*color, 1.0),
                );
            }
        }
    }
}
