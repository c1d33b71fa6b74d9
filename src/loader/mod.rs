/// JSON parsing, asset lookup and tileset resolution.
pub mod json_loader;

pub use json_loader::{resolve_tilesets, AssetResolver, MemoryAssets};
