// tests/load_tests.rs

use std::fs;
use std::path::PathBuf;

use macroquad_tile_engine::{
    MapError, MemoryAssets, RecordedImage, RecordingCanvas, TileEngine, TileEngineConfig,
    TilePosition,
};
use serde_json::json;

const MAP: &str = r#"
{
    "width": 2,
    "height": 2,
    "tilewidth": 16,
    "tileheight": 16,
    "tilesets": [
        { "firstgid": 1, "image": "tiles.png" },
        { "firstgid": 9, "source": "props.json" }
    ],
    "layers": [
        { "name": "ground", "data": [1, 2, 3, 4] },
        { "name": "props", "data": [0, 9, 0, 10], "opacity": 0.25 },
        { "name": "markers", "type": "objectgroup", "objects": [{ "id": 1 }] }
    ]
}
"#;

fn assets() -> MemoryAssets<RecordedImage> {
    let mut assets = MemoryAssets::new();
    assets.insert_image("tiles.png", RecordedImage::new("tiles.png", 64.0, 32.0));
    assets.insert_image("props.png", RecordedImage::new("props.png", 32.0, 32.0));
    assets.insert_data(
        "props.json",
        json!({ "image": "props.png", "tilewidth": 16, "tileheight": 16, "name": "props" }),
    );
    assets
}

fn build_err(json: &str, assets: &MemoryAssets<RecordedImage>) -> MapError {
    match TileEngine::<RecordingCanvas>::from_json_str(json, assets) {
        Ok(_) => panic!("expected the map to be rejected"),
        Err(err) => err,
    }
}

#[test]
fn load_from_file_and_str() -> anyhow::Result<()> {
    let from_str = TileEngineConfig::<RecordedImage>::from_json_str(MAP)?;
    assert_eq!(from_str.width, 2);
    assert_eq!(from_str.layers.len(), 3);

    let mut path = PathBuf::from(std::env::temp_dir());
    path.push("tile_engine_load_from_file.json");
    fs::write(&path, MAP)?;
    let from_file = TileEngineConfig::<RecordedImage>::from_file(&path);
    fs::remove_file(&path)?;

    let from_file = from_file?;
    assert_eq!(from_file.tilewidth, 16);
    assert_eq!(from_file.tilesets.len(), 2);
    Ok(())
}

#[test]
fn engine_from_document_resolves_external_tileset() {
    let mut map: TileEngine<RecordingCanvas> =
        TileEngine::from_json_str(MAP, &assets()).expect("engine");

    let tilesets = map.tilesets();
    assert_eq!(tilesets.len(), 2);
    assert_eq!(tilesets[1].name, "props");
    assert_eq!(tilesets[1].image.name, "props.png");
    assert_eq!(tilesets[1].columns, 2);

    assert_eq!(map.tile_at_layer("props", TilePosition::cell(1, 1)), 10);
    assert_eq!(map.layer("props").map(|l| l.opacity), Some(0.25));
    assert_eq!(map.layer("markers").map(|l| l.data.len()), Some(0));

    map.set_context(RecordingCanvas::new(32.0, 32.0));
    let surface = map.map_surface().expect("map surface");
    assert_eq!(surface.image_count(), 4 + 2);
}

#[test]
fn unsupported_format() {
    let err = TileEngineConfig::<RecordedImage>::from_file("foo.tmx").unwrap_err();
    match err {
        MapError::UnsupportedFormat(ext) => assert_eq!(ext, "foo.tmx"),
        other => panic!("expected UnsupportedFormat, got {:?}", other),
    }
}

#[test]
fn missing_source_document() {
    let mut without = MemoryAssets::new();
    without.insert_image("tiles.png", RecordedImage::new("tiles.png", 64.0, 32.0));

    let err = build_err(MAP, &without);
    assert!(matches!(err, MapError::UnresolvedSource { ref path } if path == "props.json"));
    assert!(err.to_string().contains("props.json"));
}

#[test]
fn missing_image() {
    let mut assets = MemoryAssets::new();
    assets.insert_data("props.json", json!({ "image": "props.png" }));

    let err = build_err(MAP, &assets);
    assert!(matches!(err, MapError::UnresolvedImage { ref path } if path == "tiles.png"));
}

#[test]
fn zero_sized_map_is_rejected() {
    let doc = r#"{ "width": 0, "height": 3, "tilewidth": 16, "tileheight": 16 }"#;
    let err = build_err(doc, &assets());
    assert!(matches!(err, MapError::InvalidMap(_)));

    let doc = r#"{ "width": 3, "height": 3, "tilewidth": 16, "tileheight": 0 }"#;
    let err = build_err(doc, &assets());
    assert!(matches!(err, MapError::InvalidMap(_)));
}

#[test]
fn malformed_document() {
    let err = build_err("{ \"width\": 2 ", &assets());
    assert!(matches!(err, MapError::Json { .. }));
}

#[test]
fn pixel_size_overflow_is_rejected() {
    let doc = r#"{ "width": 70000, "height": 1, "tilewidth": 70000, "tileheight": 16 }"#;
    let err = build_err(doc, &assets());
    assert!(matches!(err, MapError::InvalidMap(_)));

    let doc = r#"{ "width": 1, "height": 70000, "tilewidth": 16, "tileheight": 70000 }"#;
    let err = build_err(doc, &assets());
    assert!(matches!(err, MapError::InvalidMap(_)));
}

#[test]
fn tileset_stride_overflow_is_rejected() {
    let doc = r#"{
        "width": 2, "height": 2, "tilewidth": 16, "tileheight": 16,
        "tilesets": [{ "firstgid": 1, "image": "tiles.png", "spacing": 4294967295 }]
    }"#;
    let err = build_err(doc, &assets());
    assert!(matches!(err, MapError::InvalidTileset { first_gid: 1, .. }));
}
