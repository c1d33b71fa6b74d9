//! Typed construction input for [`TileEngine`](crate::TileEngine).
//!
//! The field names follow the Tiled JSON export, so a Tiled map
//! deserializes straight into [`TileEngineConfig`]. Keys not listed here
//! (object layers' objects, custom properties, editor settings, ...) are
//! ignored.

use serde::{Deserialize, Deserializer};

pub use crate::render::decode::GidFormat;

/// Atlas image of a tileset: a path still to resolve, or a ready bitmap.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource<I> {
    /// Path looked up through an [`AssetResolver`](crate::AssetResolver).
    Path(String),
    /// Bitmap handed over directly.
    Resolved(I),
}

impl<'de, I> Deserialize<'de> for ImageSource<I> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ImageSource::Path)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "")]
/// Everything a [`TileEngine`](crate::TileEngine) is built from.
pub struct TileEngineConfig<I> {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Grid cell width in pixels.
    pub tilewidth: u32,
    /// Grid cell height in pixels.
    pub tileheight: u32,
    #[serde(default)]
    /// Tilesets, in any order.
    pub tilesets: Vec<TilesetConfig<I>>,
    #[serde(default)]
    /// Layers in draw order.
    pub layers: Vec<LayerConfig>,
    #[serde(default)]
    /// How flag bits in tile indices are read.
    pub gid_format: GidFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "")]
/// One tileset entry of a map.
pub struct TilesetConfig<I> {
    /// First tile index owned by this tileset.
    pub firstgid: u32,
    #[serde(default)]
    /// Atlas image. May come from `source` instead.
    pub image: Option<ImageSource<I>>,
    /// External tileset definition merged over this entry.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    /// Pixels between atlas tiles.
    pub spacing: u32,
    #[serde(default)]
    /// Pixels around the atlas edge.
    pub margin: u32,
    /// Defaults to the map's tile width.
    #[serde(default)]
    pub tilewidth: Option<u32>,
    /// Defaults to the map's tile height.
    #[serde(default)]
    pub tileheight: Option<u32>,
    /// Derived from the image width when absent.
    #[serde(default)]
    pub columns: Option<u32>,
    /// Display name, only used in logs.
    #[serde(default)]
    pub name: String,
}

impl<I> TilesetConfig<I> {
    /// Tileset cut from an already decoded image.
    pub fn with_image(firstgid: u32, image: I) -> Self {
        TilesetConfig {
            firstgid,
            image: Some(ImageSource::Resolved(image)),
            source: None,
            spacing: 0,
            margin: 0,
            tilewidth: None,
            tileheight: None,
            columns: None,
            name: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// One tile layer of a map.
pub struct LayerConfig {
    /// Key used by the layer operations.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    /// Tile indices in row-major order.
    pub data: Vec<u32>,
    #[serde(default = "default_true")]
    /// Hidden layers are left out of the combined surface.
    pub visible: bool,
    #[serde(default = "one")]
    /// Alpha applied to the whole layer.
    pub opacity: f32,
}

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

impl LayerConfig {
    /// Visible, opaque layer.
    pub fn new(name: impl Into<String>, data: Vec<u32>) -> Self {
        LayerConfig {
            name: name.into(),
            data,
            visible: true,
            opacity: 1.0,
        }
    }
}

impl<I> TileEngineConfig<I> {
    /// Empty map of `width`x`height` tiles.
    pub fn new(width: u32, height: u32, tilewidth: u32, tileheight: u32) -> Self {
        TileEngineConfig {
            width,
            height,
            tilewidth,
            tileheight,
            tilesets: Vec::new(),
            layers: Vec::new(),
            gid_format: GidFormat::default(),
        }
    }

    /// Append a tileset.
    pub fn tileset(mut self, tileset: TilesetConfig<I>) -> Self {
        self.tilesets.push(tileset);
        self
    }

    /// Append a layer on top of the others.
    pub fn layer(mut self, layer: LayerConfig) -> Self {
        self.layers.push(layer);
        self
    }
}
