//! SVG export: serializes a scene to a standalone vector document.
//!
//! The export captures the current view — pan/zoom applied, same pixels the
//! user is looking at — rather than a canonical full-domain rendering.
//! Hovering an item in the exported file shows its tooltip text via
//! `<title>`.

use yearline_protocol::{ScenePrimitive, TextAlign, Viewport};

use crate::layout::ViewTransform;
use crate::scene::Scene;

/// Render the scene as a complete SVG document string: XML declaration,
/// namespace, viewBox. Valid standalone — suitable for a `timeline.svg`
/// download.
pub fn render_svg(scene: &Scene, view: &ViewTransform, viewport: &Viewport) -> String {
    let width = viewport.width;
    let height = viewport.height;
    let zoom = view.zoom();

    let mut svg = String::with_capacity(scene.primitives.len() * 160 + 256);
    svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif">"#,
    ));
    svg.push_str(&format!(
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        scene.background.to_hex(),
    ));

    for prim in &scene.primitives {
        match prim {
            ScenePrimitive::Rect {
                rect,
                fill,
                opacity,
                item_id,
            } => {
                let x = view.device_x(rect.x);
                let w = rect.w * zoom;
                svg.push_str(&format!(
                    r#"<rect x="{x}" y="{}" width="{w}" height="{}" fill="{}""#,
                    rect.y,
                    rect.h,
                    fill.to_hex(),
                ));
                if *opacity < 1.0 {
                    svg.push_str(&format!(r#" fill-opacity="{opacity}""#));
                }
                match item_id.as_deref().and_then(|id| tooltip_for(scene, id)) {
                    Some(tooltip) => {
                        svg.push_str(&format!(
                            "><title>{}</title></rect>",
                            escape_xml(tooltip)
                        ));
                    }
                    None => svg.push_str("/>"),
                }
            }
            ScenePrimitive::Circle {
                center,
                radius,
                fill,
                item_id,
            } => {
                let cx = view.device_x(center.x);
                svg.push_str(&format!(
                    r#"<circle cx="{cx}" cy="{}" r="{radius}" fill="{}""#,
                    center.y,
                    fill.to_hex(),
                ));
                match item_id.as_deref().and_then(|id| tooltip_for(scene, id)) {
                    Some(tooltip) => {
                        svg.push_str(&format!(
                            "><title>{}</title></circle>",
                            escape_xml(tooltip)
                        ));
                    }
                    None => svg.push_str("/>"),
                }
            }
            ScenePrimitive::Line {
                from,
                to,
                color,
                width: line_width,
            } => {
                svg.push_str(&format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}"/>"#,
                    view.device_x(from.x),
                    from.y,
                    view.device_x(to.x),
                    to.y,
                    color.to_hex(),
                ));
            }
            ScenePrimitive::Text {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}">{}</text>"#,
                    view.device_x(position.x),
                    position.y,
                    color.to_hex(),
                    escape_xml(text),
                ));
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

fn tooltip_for<'a>(scene: &'a Scene, item_id: &str) -> Option<&'a str> {
    scene
        .hits
        .iter()
        .find(|h| h.item_id == item_id)
        .map(|h| h.tooltip.as_str())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::HitRegion;
    use yearline_protocol::{Color, Point, Rect};

    fn scene(primitives: Vec<ScenePrimitive>, hits: Vec<HitRegion>) -> Scene {
        Scene {
            primitives,
            hits,
            background: Color::rgb(0x2c, 0x2d, 0x2f),
        }
    }

    #[test]
    fn standalone_document_shape() {
        let s = scene(Vec::new(), Vec::new());
        let svg = render_svg(&s, &ViewTransform::new(0.0), &Viewport::new(960.0, 600.0));
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.contains(r#"viewBox="0 0 960 600""#));
        assert!(svg.contains(r##"fill="#2c2d2f""##));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn applies_current_pan_and_zoom() {
        let s = scene(
            vec![ScenePrimitive::Rect {
                rect: Rect::new(100.0, 50.0, 40.0, 24.0),
                fill: Color::rgb(0xc7, 0x3a, 0x52),
                opacity: 1.0,
                item_id: None,
            }],
            Vec::new(),
        );
        let mut view = ViewTransform::new(10.0);
        // Anchoring at device x=10 (world 0) doubles the zoom and leaves
        // pan at 10.
        view.zoom_at(10.0, 2.0);
        let svg = render_svg(&s, &view, &Viewport::new(960.0, 600.0));
        // x = 10 + 100*2, width = 40*2; y untouched.
        assert!(svg.contains(r#"<rect x="210" y="50" width="80" height="24""#));
    }

    #[test]
    fn tagged_rect_carries_tooltip_title() {
        let s = scene(
            vec![ScenePrimitive::Rect {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                fill: Color::rgb(0, 0, 0),
                opacity: 1.0,
                item_id: Some("job-1".to_string()),
            }],
            vec![HitRegion {
                bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
                item_id: "job-1".to_string(),
                tooltip: "R&D <lead>".to_string(),
                url: None,
            }],
        );
        let svg = render_svg(&s, &ViewTransform::new(0.0), &Viewport::new(100.0, 100.0));
        assert!(svg.contains("<title>R&amp;D &lt;lead&gt;</title>"));
    }

    #[test]
    fn band_opacity_is_written() {
        let s = scene(
            vec![ScenePrimitive::Rect {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                fill: Color::rgb(0xee, 0xee, 0xee),
                opacity: 0.18,
                item_id: None,
            }],
            Vec::new(),
        );
        let svg = render_svg(&s, &ViewTransform::new(0.0), &Viewport::new(100.0, 100.0));
        assert!(svg.contains(r#"fill-opacity="0.18""#));
    }

    #[test]
    fn text_alignment_maps_to_anchor() {
        let s = scene(
            vec![ScenePrimitive::Text {
                position: Point::new(5.0, 7.0),
                text: "1990".to_string(),
                color: Color::rgb(0x94, 0xa3, 0xb8),
                font_size: 10.0,
                align: TextAlign::Center,
            }],
            Vec::new(),
        );
        let svg = render_svg(&s, &ViewTransform::new(0.0), &Viewport::new(100.0, 100.0));
        assert!(svg.contains(r#"text-anchor="middle""#));
    }
}
