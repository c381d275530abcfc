pub mod interact;
pub mod layout;
pub mod model;
pub mod scene;
pub mod svg;
