use crate::render::AtlasImage;

/// A tileset with its atlas image resolved.
#[derive(Debug, Clone)]
pub struct TilesetRef<I> {
    /// Display name.
    pub name: String,
    /// First tile index owned by this tileset.
    pub first_gid: u32,
    /// Atlas bitmap.
    pub image: I,
    /// Atlas tile width in pixels.
    pub tile_w: u32,
    /// Atlas tile height in pixels.
    pub tile_h: u32,
    /// Pixels between atlas tiles.
    pub spacing: u32,
    /// Pixels around the atlas edge.
    pub margin: u32,
    /// Tiles per atlas row.
    pub columns: u32,
}

impl<I: AtlasImage> TilesetRef<I> {
    /// Column count to use when the tileset does not state one.
    pub fn derive_columns(image: &I, tile_w: u32, spacing: u32) -> u32 {
        (image.width() / (tile_w as f32 + spacing as f32)).floor() as u32
    }
}

/// Index of the tileset owning `gid` (flags already masked off).
///
/// Scans from the highest firstgid down and takes the first tileset with
/// `gid >= first_gid`. There is no upper bound check: an index past the end
/// of the last tileset still resolves to it. `tilesets` must be sorted by
/// firstgid.
pub fn tileset_for_gid<I>(tilesets: &[TilesetRef<I>], gid: u32) -> Option<usize> {
    tilesets.iter().rposition(|ts| gid >= ts.first_gid)
}
