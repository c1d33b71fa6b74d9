use std::f32::consts::FRAC_PI_2;

use macroquad::math::{vec2, Rect};
use serde::Deserialize;
use tracing::warn;

use crate::command::{DrawCommand, TileTransform};
use crate::render::AtlasImage;
use crate::tileset::{tileset_for_gid, TilesetRef};

/// Flip horizontally.
pub const FLIP_H: u32 = 0x8000_0000; // bit 31
/// Flip vertically.
pub const FLIP_V: u32 = 0x4000_0000; // bit 30
/// Flip across the top-left to bottom-right diagonal.
pub const FLIP_D: u32 = 0x2000_0000; // bit 29
/// Bits left for the tile index.
pub const GID_MASK: u32 = !(FLIP_H | FLIP_V | FLIP_D);

/// How the high bits of a tile index are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GidFormat {
    /// Top three bits are flip-horizontal, flip-vertical, flip-diagonal.
    #[default]
    Tiled,
    /// No flag bits, the whole value is the index.
    Plain,
}

/// Orientation of a tile after decoding its flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Drawn as stored.
    Identity,
    /// Mirrored left to right.
    MirrorX,
    /// Mirrored top to bottom.
    MirrorY,
    /// Mirrored on both axes.
    MirrorXY,
    /// Quarter turn clockwise.
    RotateCw,
    /// Quarter turn counter-clockwise.
    RotateCcw,
    /// Quarter turn clockwise, then mirrored left to right.
    RotateCwMirrorX,
    /// Quarter turn counter-clockwise, then mirrored left to right.
    RotateCcwMirrorX,
}

impl Orientation {
    /// Orientation encoded by the three flip bits.
    pub fn from_flags(flip_h: bool, flip_v: bool, flip_d: bool) -> Self {
        match (flip_d, flip_h, flip_v) {
            (true, true, true) => Orientation::RotateCwMirrorX,
            (true, true, false) => Orientation::RotateCw,
            (true, false, true) => Orientation::RotateCcw,
            (true, false, false) => Orientation::RotateCcwMirrorX,
            (false, true, true) => Orientation::MirrorXY,
            (false, true, false) => Orientation::MirrorX,
            (false, false, true) => Orientation::MirrorY,
            (false, false, false) => Orientation::Identity,
        }
    }

    fn rotation(self) -> Option<(f32, bool)> {
        match self {
            Orientation::RotateCw => Some((FRAC_PI_2, false)),
            Orientation::RotateCcw => Some((-FRAC_PI_2, false)),
            Orientation::RotateCwMirrorX => Some((FRAC_PI_2, true)),
            Orientation::RotateCcwMirrorX => Some((-FRAC_PI_2, true)),
            _ => None,
        }
    }

    fn mirror(self) -> (bool, bool) {
        match self {
            Orientation::MirrorX => (true, false),
            Orientation::MirrorY => (false, true),
            Orientation::MirrorXY => (true, true),
            _ => (false, false),
        }
    }
}

/// Split a raw tile index into the atlas index and its orientation.
pub fn split_gid(raw: u32, format: GidFormat) -> (u32, Orientation) {
    match format {
        GidFormat::Plain => (raw, Orientation::Identity),
        GidFormat::Tiled => (
            raw & GID_MASK,
            Orientation::from_flags(raw & FLIP_H != 0, raw & FLIP_V != 0, raw & FLIP_D != 0),
        ),
    }
}

/// Map geometry the decoder places tiles with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapGrid {
    /// Map width in tiles.
    pub width: u32,
    /// Cell width in pixels.
    pub tile_w: u32,
    /// Cell height in pixels.
    pub tile_h: u32,
}

/// Decode the tile stored at `cell` into a blit.
///
/// Returns `None` for empty cells and for indices no tileset owns.
pub fn decode_tile<I: AtlasImage>(
    raw: u32,
    cell: usize,
    grid: MapGrid,
    tilesets: &[TilesetRef<I>],
    format: GidFormat,
) -> Option<DrawCommand> {
    if raw == 0 {
        return None;
    }
    let (gid, orientation) = split_gid(raw, format);

    let Some(tileset_index) = tileset_for_gid(tilesets, gid) else {
        warn!(gid, cell, "no tileset owns tile index, skipping");
        return None;
    };
    let ts = &tilesets[tileset_index];

    let offset = u64::from(gid - ts.first_gid);
    let columns = u64::from(ts.columns);
    let stride_x = u64::from(ts.tile_w) + u64::from(ts.spacing);
    let stride_y = u64::from(ts.tile_h) + u64::from(ts.spacing);
    let sx = u64::from(ts.margin) + (offset % columns) * stride_x;
    let sy = u64::from(ts.margin) + (offset / columns) * stride_y;
    let src = Rect::new(sx as f32, sy as f32, ts.tile_w as f32, ts.tile_h as f32);

    let tw = grid.tile_w as f32;
    let th = grid.tile_h as f32;
    let x = (cell % grid.width as usize) as f32 * tw;
    let y = (cell / grid.width as usize) as f32 * th;

    let (dest, transform) = if let Some((angle, mirror)) = orientation.rotation() {
        (
            Rect::new(-tw / 2.0, -th / 2.0, tw, th),
            Some(TileTransform {
                translate: vec2(x + tw / 2.0, y + th / 2.0),
                rotate: angle,
                scale: vec2(if mirror { -1.0 } else { 1.0 }, 1.0),
            }),
        )
    } else {
        match orientation.mirror() {
            (false, false) => (Rect::new(x, y, tw, th), None),
            (mx, my) => (
                Rect::new(0.0, 0.0, tw, th),
                Some(TileTransform {
                    translate: vec2(x + if mx { tw } else { 0.0 }, y + if my { th } else { 0.0 }),
                    rotate: 0.0,
                    scale: vec2(if mx { -1.0 } else { 1.0 }, if my { -1.0 } else { 1.0 }),
                }),
            ),
        }
    };

    Some(DrawCommand {
        tileset_index,
        src,
        dest,
        transform,
    })
}
