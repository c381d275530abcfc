use serde::{Deserialize, Serialize};

use crate::types::{Color, Point, Rect};

/// A single, stateless drawable primitive.
///
/// The scene builder emits a `Vec<ScenePrimitive>` in back-to-front order.
/// Renderers consume the list sequentially — each primitive carries all the
/// data it needs, and later primitives occlude earlier ones on overlap.
///
/// Geometry is in world space (pre pan/zoom); renderers apply the view
/// transform to X coordinates when painting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenePrimitive {
    /// A filled rectangle: range bars, background bands.
    Rect {
        rect: Rect,
        fill: Color,
        /// Fill opacity in `[0, 1]` — bands render translucent.
        opacity: f64,
        /// Source item id for hit-testing / tooltip attachment.
        item_id: Option<String>,
    },

    /// A filled circle: milestone markers.
    Circle {
        center: Point,
        radius: f64,
        fill: Color,
        item_id: Option<String>,
    },

    /// A line segment: the central axis and its year ticks.
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f64,
    },

    /// A text run: axis year labels, track labels, item labels.
    Text {
        position: Point,
        text: String,
        color: Color,
        font_size: f64,
        align: TextAlign,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl ScenePrimitive {
    /// The source item this primitive was built from, if any.
    pub fn item_id(&self) -> Option<&str> {
        match self {
            Self::Rect { item_id, .. } | Self::Circle { item_id, .. } => item_id.as_deref(),
            _ => None,
        }
    }
}
