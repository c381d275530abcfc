pub mod primitives;
pub mod types;

pub use primitives::{ScenePrimitive, TextAlign};
pub use types::{Color, Point, Rect, Viewport};
