//! The pan/zoom view transform.
//!
//! Relates world space (unscaled scene coordinates) to device space (screen
//! pixels) along the time axis: `device_x = pan + world_x * zoom`. Vertical
//! layout is unaffected by the transform.

/// Zoom factor bounds. Clamped on every zoom step, so no sequence of steps
/// can escape them.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Mutable pan/zoom state. Single-writer: only the interaction dispatcher
/// mutates it; renderers read it every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pan: f64,
    zoom: f64,
}

impl ViewTransform {
    pub fn new(pan: f64) -> Self {
        Self { pan, zoom: 1.0 }
    }

    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// World → device.
    pub fn device_x(&self, world_x: f64) -> f64 {
        self.pan + world_x * self.zoom
    }

    /// Device → world. Inverse of [`device_x`](Self::device_x).
    pub fn world_x(&self, device_x: f64) -> f64 {
        (device_x - self.pan) / self.zoom
    }

    /// Translate by a device-space delta. Unclamped: content can be panned
    /// arbitrarily far off-screen.
    pub fn pan_by(&mut self, delta_device_x: f64) {
        self.pan += delta_device_x;
    }

    /// Set the pan directly (drag handling anchors to the drag start).
    pub fn set_pan(&mut self, pan: f64) {
        self.pan = pan;
    }

    /// Multiply the zoom factor, keeping the world point under
    /// `device_anchor_x` fixed on screen.
    ///
    /// The anchor invariant: `world_x(anchor)` is identical before and
    /// after the call, which is what makes wheel zoom feel glued to the
    /// cursor.
    pub fn zoom_at(&mut self, device_anchor_x: f64, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let anchor_world = self.world_x(device_anchor_x);
        self.pan = device_anchor_x - anchor_world * new_zoom;
        self.zoom = new_zoom;
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(0.0)
    }
}
