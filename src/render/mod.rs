/// Pre-rendered layer surfaces.
pub mod cache;
mod canvas;
/// Tile index decoding.
pub mod decode;
pub mod record;

pub use canvas::{AtlasImage, Canvas};
