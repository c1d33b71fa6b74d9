use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a [`TileEngine`](crate::TileEngine) from its configuration.
#[derive(Debug, Error)]
pub enum MapError {
    /// File I/O error
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// JSON parse error
    #[error("Failed to parse JSON {path}: {source}")]
    Json {
        /// Document that failed to parse
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Unsupported file format (non-JSON)
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Map dimensions are unusable
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    /// A tileset `source` was not loaded before construction
    #[error("You must load the tileset source \"{path}\" before loading the tileset")]
    UnresolvedSource {
        /// Path of the external tileset definition
        path: String,
    },

    /// A tileset image path was not loaded before construction
    #[error("You must load the image \"{path}\" before loading the tileset")]
    UnresolvedImage {
        /// Path of the atlas image
        path: String,
    },

    /// A tileset ended up without any image after merging its source
    #[error("Tileset with firstgid {first_gid} has no image")]
    MissingImage {
        /// firstgid of the offending tileset
        first_gid: u32,
    },

    /// A tileset has values the decoder cannot work with
    #[error("Invalid tileset with firstgid {first_gid}: {reason}")]
    InvalidTileset {
        /// firstgid of the offending tileset
        first_gid: u32,
        /// What is wrong with it
        reason: String,
    },
}
