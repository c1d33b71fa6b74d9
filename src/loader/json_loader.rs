use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::{ImageSource, TileEngineConfig, TilesetConfig};
use crate::error::MapError;
use crate::render::AtlasImage;
use crate::tileset::TilesetRef;

/// Lookup of assets that were loaded before the engine is built.
///
/// Paths are handed over exactly as they appear in the configuration.
pub trait AssetResolver<I> {
    /// Decoded bitmap previously loaded from `path`.
    fn resolve_image(&self, path: &str) -> Option<I>;
    /// Parsed JSON document previously loaded from `path`.
    fn resolve_data(&self, path: &str) -> Option<JsonValue>;
}

/// In-memory [`AssetResolver`] filled by the caller.
#[derive(Debug, Clone)]
pub struct MemoryAssets<I> {
    images: HashMap<String, I>,
    data: HashMap<String, JsonValue>,
}

impl<I> Default for MemoryAssets<I> {
    fn default() -> Self {
        MemoryAssets {
            images: HashMap::new(),
            data: HashMap::new(),
        }
    }
}

impl<I> MemoryAssets<I> {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loaded bitmap under its configured path.
    pub fn insert_image(&mut self, path: impl Into<String>, image: I) {
        self.images.insert(path.into(), image);
    }

    /// Register a parsed tileset document under its configured path.
    pub fn insert_data(&mut self, path: impl Into<String>, data: JsonValue) {
        self.data.insert(path.into(), data);
    }

    /// Whether an image is stored for `path`.
    pub fn has_image(&self, path: &str) -> bool {
        self.images.contains_key(path)
    }

    /// Whether a document is stored for `path`.
    pub fn has_data(&self, path: &str) -> bool {
        self.data.contains_key(path)
    }
}

impl<I: Clone> AssetResolver<I> for MemoryAssets<I> {
    fn resolve_image(&self, path: &str) -> Option<I> {
        self.images.get(path).cloned()
    }

    fn resolve_data(&self, path: &str) -> Option<JsonValue> {
        self.data.get(path).cloned()
    }
}

/// Fields of an external tileset file that override the referencing entry.
#[derive(Deserialize)]
struct ExternalTileset {
    #[serde(default)]
    firstgid: Option<u32>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    tilewidth: Option<u32>,
    #[serde(default)]
    tileheight: Option<u32>,
    #[serde(default)]
    spacing: Option<u32>,
    #[serde(default)]
    margin: Option<u32>,
    #[serde(default)]
    columns: Option<u32>,
    #[serde(default)]
    name: Option<String>,
}

impl<I> TileEngineConfig<I> {
    /// Parse a map document, e.g. a Tiled JSON export.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        serde_json::from_str(json).map_err(|source| MapError::Json {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    /// Read and parse a map document. Only `.json` files are supported.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let p = path.as_ref();
        if p.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(MapError::UnsupportedFormat(p.display().to_string()));
        }

        let txt = std::fs::read_to_string(p).map_err(|source| MapError::Io {
            path: p.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&txt).map_err(|source| MapError::Json {
            path: p.to_path_buf(),
            source,
        })
    }
}

/// Merge an external tileset definition over `ts`.
fn merge_source<I>(
    mut ts: TilesetConfig<I>,
    source: &str,
    assets: &impl AssetResolver<I>,
) -> Result<TilesetConfig<I>, MapError> {
    let value = assets
        .resolve_data(source)
        .ok_or_else(|| MapError::UnresolvedSource {
            path: source.to_owned(),
        })?;
    let ext: ExternalTileset = serde_json::from_value(value).map_err(|err| MapError::Json {
        path: PathBuf::from(source),
        source: err,
    })?;

    if let Some(v) = ext.firstgid {
        ts.firstgid = v;
    }
    if let Some(v) = ext.image {
        ts.image = Some(ImageSource::Path(v));
    }
    if let Some(v) = ext.tilewidth {
        ts.tilewidth = Some(v);
    }
    if let Some(v) = ext.tileheight {
        ts.tileheight = Some(v);
    }
    if let Some(v) = ext.spacing {
        ts.spacing = v;
    }
    if let Some(v) = ext.margin {
        ts.margin = v;
    }
    if let Some(v) = ext.columns {
        ts.columns = Some(v);
    }
    if let Some(v) = ext.name {
        ts.name = v;
    }
    Ok(ts)
}

/// Resolve every tileset's source and image, then sort by firstgid.
pub fn resolve_tilesets<I: AtlasImage>(
    configs: Vec<TilesetConfig<I>>,
    tile_w: u32,
    tile_h: u32,
    assets: &impl AssetResolver<I>,
) -> Result<Vec<TilesetRef<I>>, MapError> {
    let mut tilesets = Vec::with_capacity(configs.len());

    for cfg in configs {
        let cfg = match cfg.source.clone() {
            Some(source) => merge_source(cfg, &source, assets)?,
            None => cfg,
        };
        let first_gid = cfg.firstgid;
        if first_gid == 0 {
            return Err(MapError::InvalidTileset {
                first_gid,
                reason: "firstgid must be at least 1, 0 is the empty tile".into(),
            });
        }

        let image = match cfg.image {
            Some(ImageSource::Resolved(image)) => image,
            Some(ImageSource::Path(path)) => assets
                .resolve_image(&path)
                .ok_or(MapError::UnresolvedImage { path })?,
            None => return Err(MapError::MissingImage { first_gid }),
        };

        let ts_w = cfg.tilewidth.unwrap_or(tile_w);
        let ts_h = cfg.tileheight.unwrap_or(tile_h);
        if ts_w == 0 || ts_h == 0 {
            return Err(MapError::InvalidTileset {
                first_gid,
                reason: "tile size must be positive".into(),
            });
        }

        if ts_w.checked_add(cfg.spacing).is_none() || ts_h.checked_add(cfg.spacing).is_none() {
            return Err(MapError::InvalidTileset {
                first_gid,
                reason: format!("tile size plus spacing {} overflows", cfg.spacing),
            });
        }

        let columns = cfg
            .columns
            .unwrap_or_else(|| TilesetRef::derive_columns(&image, ts_w, cfg.spacing));
        if columns == 0 {
            return Err(MapError::InvalidTileset {
                first_gid,
                reason: "atlas has no tile columns".into(),
            });
        }

        debug!(first_gid, columns, name = %cfg.name, "tileset resolved");
        tilesets.push(TilesetRef {
            name: cfg.name,
            first_gid,
            image,
            tile_w: ts_w,
            tile_h: ts_h,
            spacing: cfg.spacing,
            margin: cfg.margin,
            columns,
        });
    }

    tilesets.sort_by_key(|t| t.first_gid);
    Ok(tilesets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::record::RecordedImage;
    use serde_json::json;

    fn assets() -> MemoryAssets<RecordedImage> {
        let mut a = MemoryAssets::new();
        a.insert_image("tiles.png", RecordedImage::new("tiles.png", 128.0, 64.0));
        a
    }

    #[test]
    fn parses_tiled_style_document() {
        let cfg = TileEngineConfig::<RecordedImage>::from_json_str(
            r#"{
              "width": 2, "height": 1, "tilewidth": 16, "tileheight": 16,
              "orientation": "orthogonal",
              "tilesets": [{"firstgid": 1, "image": "tiles.png", "spacing": 1}],
              "layers": [
                {"name": "ground", "data": [1, 2], "opacity": 0.5},
                {"name": "spawns", "type": "objectgroup", "objects": []}
              ]
            }"#,
        )
        .expect("parse");

        assert_eq!(cfg.width, 2);
        assert_eq!(cfg.tilesets[0].spacing, 1);
        assert_eq!(cfg.tilesets[0].image, Some(ImageSource::Path("tiles.png".into())));
        assert_eq!(cfg.layers[0].opacity, 0.5);
        assert!(cfg.layers[0].visible);
        assert!(cfg.layers[1].data.is_empty());
        assert_eq!(cfg.gid_format, crate::config::GidFormat::Tiled);
    }

    #[test]
    fn columns_derived_from_image_width() {
        let cfg = TilesetConfig::with_image(1, RecordedImage::new("x", 100.0, 32.0));
        let sets = resolve_tilesets(vec![cfg], 16, 16, &assets()).unwrap();
        assert_eq!(sets[0].columns, 6);
        assert_eq!(sets[0].tile_w, 16);
    }

    #[test]
    fn external_source_overrides_entry() {
        let mut a = assets();
        a.insert_data(
            "forest.json",
            json!({"image": "tiles.png", "tilewidth": 32, "tileheight": 32, "columns": 4, "margin": 2}),
        );
        let cfg: TilesetConfig<RecordedImage> =
            serde_json::from_value(json!({"firstgid": 5, "source": "forest.json"})).unwrap();

        let sets = resolve_tilesets(vec![cfg], 16, 16, &a).unwrap();
        assert_eq!(sets[0].first_gid, 5);
        assert_eq!(sets[0].tile_w, 32);
        assert_eq!(sets[0].columns, 4);
        assert_eq!(sets[0].margin, 2);
        assert_eq!(sets[0].image.name, "tiles.png");
    }

    #[test]
    fn sorted_by_first_gid() {
        let a = assets();
        let cfgs = vec![
            TilesetConfig::with_image(20, RecordedImage::new("b", 64.0, 64.0)),
            TilesetConfig::with_image(1, RecordedImage::new("a", 64.0, 64.0)),
        ];
        let sets = resolve_tilesets(cfgs, 16, 16, &a).unwrap();
        assert_eq!(sets[0].first_gid, 1);
        assert_eq!(sets[1].first_gid, 20);
    }

    #[test]
    fn unresolved_source_is_a_configuration_error() {
        let cfg: TilesetConfig<RecordedImage> =
            serde_json::from_value(json!({"firstgid": 1, "source": "missing.json"})).unwrap();
        let err = resolve_tilesets(vec![cfg], 16, 16, &assets()).unwrap_err();
        assert!(matches!(err, MapError::UnresolvedSource { path } if path == "missing.json"));
    }

    #[test]
    fn unresolved_image_is_a_configuration_error() {
        let cfg: TilesetConfig<RecordedImage> =
            serde_json::from_value(json!({"firstgid": 1, "image": "nope.png"})).unwrap();
        let err = resolve_tilesets(vec![cfg], 16, 16, &assets()).unwrap_err();
        assert!(matches!(err, MapError::UnresolvedImage { path } if path == "nope.png"));
    }

    #[test]
    fn tileset_without_image_is_rejected() {
        let cfg: TilesetConfig<RecordedImage> =
            serde_json::from_value(json!({"firstgid": 1})).unwrap();
        let err = resolve_tilesets(vec![cfg], 16, 16, &assets()).unwrap_err();
        assert!(matches!(err, MapError::MissingImage { first_gid: 1 }));
    }

    #[test]
    fn image_narrower_than_a_tile_is_rejected() {
        let cfg = TilesetConfig::with_image(1, RecordedImage::new("tiny", 8.0, 8.0));
        let err = resolve_tilesets(vec![cfg], 16, 16, &assets()).unwrap_err();
        assert!(matches!(err, MapError::InvalidTileset { first_gid: 1, .. }));
    }

    #[test]
    fn zero_first_gid_is_rejected() {
        let cfg = TilesetConfig::with_image(0, RecordedImage::new("a", 64.0, 64.0));
        let err = resolve_tilesets(vec![cfg], 16, 16, &assets()).unwrap_err();
        assert!(matches!(err, MapError::InvalidTileset { first_gid: 0, .. }));
    }

    #[test]
    fn returns_typed_error_for_malformed_json() {
        let err = TileEngineConfig::<RecordedImage>::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, MapError::Json { .. }));
    }

    #[test]
    fn from_file_rejects_non_json() {
        let err = TileEngineConfig::<RecordedImage>::from_file("level.tmx").unwrap_err();
        assert!(matches!(err, MapError::UnsupportedFormat(ext) if ext == "level.tmx"));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = TileEngineConfig::<RecordedImage>::from_file("nonexistent.json").unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
    }
}
