use macroquad::math::{Rect, Vec2};

/// Canvas transform applied around a single tile blit, in order:
/// translate, rotate, scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileTransform {
    /// Origin moved to before drawing.
    pub translate: Vec2,
    /// Radians, clockwise.
    pub rotate: f32,
    /// Per-axis scale, `-1` mirrors.
    pub scale: Vec2,
}

/// One decoded tile, ready to blit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Index into the engine's tileset list.
    pub tileset_index: usize,
    /// Atlas rectangle in the tileset image.
    pub src: Rect,
    /// Destination rectangle, in the transformed frame when `transform` is set.
    pub dest: Rect,
    /// Transform around the blit, `None` for unflipped tiles.
    pub transform: Option<TileTransform>,
}
