/// Scroll offset of the viewport inside the map surface.
///
/// Offsets are clamped on write so the viewport never leaves the map: a
/// source rect outside the surface makes some backends drop the blit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    sx: f32,
    sy: f32,
}

/// Largest offset keeping a `viewport`-wide window inside `extent`.
#[inline]
fn max_offset(extent: f32, viewport: f32) -> f32 {
    (extent - viewport).max(0.0)
}

impl Camera {
    /// Horizontal offset in pixels.
    pub fn sx(&self) -> f32 {
        self.sx
    }

    /// Vertical offset in pixels.
    pub fn sy(&self) -> f32 {
        self.sy
    }

    /// Set the horizontal offset, clamped to `[0, map_width - viewport_width]`.
    pub fn set_sx(&mut self, value: f32, map_width: f32, viewport_width: f32) {
        self.sx = value.clamp(0.0, max_offset(map_width, viewport_width));
    }

    /// Set the vertical offset, clamped to `[0, map_height - viewport_height]`.
    pub fn set_sy(&mut self, value: f32, map_height: f32, viewport_height: f32) {
        self.sy = value.clamp(0.0, max_offset(map_height, viewport_height));
    }

    /// Whether both offsets are zero.
    pub fn is_origin(&self) -> bool {
        self.sx == 0.0 && self.sy == 0.0
    }
}
