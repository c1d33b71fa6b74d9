#![warn(missing_docs)]

//! Cached multi-layer tile map renderer for Macroquad.
//!
//! A [`TileEngine`] composites its layers once onto an off-screen surface,
//! then each frame copies the camera's window out of it and draws the
//! attached objects on top. Tile data can be changed at runtime; the next
//! render recomposes only then.

/// Macroquad drawing backend and asset preloading.
pub mod backend;
mod command;
pub mod config;
mod error;
/// Tile layers and their lookup by name.
pub mod layer;
/// Map documents and pre-loaded assets.
pub mod loader;
mod map;
/// Objects drawn on top of the map.
pub mod object;
/// Tile decoding, layer caching and drawing targets.
pub mod render;
/// Pixel and grid coordinates.
pub mod spatial;
/// Resolved tilesets.
pub mod tileset;
mod view;

pub use backend::MacroquadCanvas;
pub use command::{DrawCommand, TileTransform};
pub use config::{GidFormat, ImageSource, LayerConfig, TileEngineConfig, TilesetConfig};
pub use error::MapError;
pub use layer::Layer;
pub use loader::{AssetResolver, MemoryAssets};
pub use map::{TileEngine, NO_LAYER};
pub use object::{EngineId, GameObject, SharedObject};
pub use render::decode::Orientation;
pub use render::record::{DrawOp, RecordedImage, RecordingCanvas};
pub use render::{AtlasImage, Canvas};
pub use spatial::{Positioned, TilePosition, WorldRect};
pub use view::Camera;
