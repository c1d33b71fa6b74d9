use macroquad::math::{Rect, Vec2};

/// Row of the tile containing pixel `y`.
#[inline]
pub fn row_from_y(y: f32, tile_h: u32) -> i32 {
    (y / tile_h as f32).floor() as i32
}

/// Column of the tile containing pixel `x`.
#[inline]
pub fn col_from_x(x: f32, tile_w: u32) -> i32 {
    (x / tile_w as f32).floor() as i32
}

/// A grid position, given either in cells or in map pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TilePosition {
    /// Row/column in tiles.
    Cell {
        /// Row, counted from the top.
        row: i32,
        /// Column, counted from the left.
        col: i32,
    },
    /// Pixel coordinates inside the map.
    Point {
        /// Horizontal pixel offset.
        x: f32,
        /// Vertical pixel offset.
        y: f32,
    },
}

impl TilePosition {
    /// Position from a row and a column.
    pub fn cell(row: i32, col: i32) -> Self {
        TilePosition::Cell { row, col }
    }

    /// Position from pixel coordinates.
    pub fn point(x: f32, y: f32) -> Self {
        TilePosition::Point { x, y }
    }

    /// Resolve to `(row, col)` for the given tile size.
    pub fn to_cell(self, tile_w: u32, tile_h: u32) -> (i32, i32) {
        match self {
            TilePosition::Cell { row, col } => (row, col),
            TilePosition::Point { x, y } => (row_from_y(y, tile_h), col_from_x(x, tile_w)),
        }
    }
}

/// Axis-aligned rectangle in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldRect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl WorldRect {
    /// Rect with its top-left corner at `(x, y)`.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        WorldRect {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect of an entity positioned by an anchor point.
    ///
    /// `anchor` is relative to the entity size: `(0, 0)` is the top-left
    /// corner, `(0.5, 0.5)` the center. Negative sizes (mirrored entities)
    /// are normalized so `width` and `height` come out non-negative.
    pub fn from_anchored(x: f32, y: f32, width: f32, height: f32, anchor: Vec2) -> Self {
        let mut r = WorldRect {
            x: x - width * anchor.x,
            y: y - height * anchor.y,
            width,
            height,
        };
        if r.width < 0.0 {
            r.x += r.width;
            r.width = -r.width;
        }
        if r.height < 0.0 {
            r.y += r.height;
            r.height = -r.height;
        }
        r
    }

    /// Same rectangle as a macroquad [`Rect`].
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl From<Rect> for WorldRect {
    fn from(r: Rect) -> Self {
        WorldRect::new(r.x, r.y, r.w, r.h)
    }
}

/// Anything with a position and size in the world.
pub trait Positioned {
    /// Current bounds in map pixels.
    fn world_rect(&self) -> WorldRect;
}

impl Positioned for WorldRect {
    fn world_rect(&self) -> WorldRect {
        *self
    }
}

impl Positioned for Rect {
    fn world_rect(&self) -> WorldRect {
        (*self).into()
    }
}
