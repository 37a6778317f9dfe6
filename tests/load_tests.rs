// tests/load_tests.rs

use macroquad::math::vec2;
use macroquad_tiled_adventure::{
    decode_map_file_to_ir, AdventureConfig, JsonMapProvider, MapContainer, MapError, MapProvider,
    ObjectId, ObjectKind, TileId,
};
use std::fs;
use std::path::Path;

const MAP: &str = r#"{
  "tilewidth": 16, "tileheight": 16, "width": 3, "height": 2,
  "properties": [{"name":"music","type":"string","value":"cave"}],
  "tilesets": [{"firstgid":1,"source":"tiles/terrain.tsj"}],
  "layers": [
    {"type":"tilelayer","name":"ground","width":3,"height":2,"data":[1,2,3,4,5,6]},
    {"type":"group","name":"logic","offsetx":0,"offsety":0,"layers":[
      {"type":"tilelayer","name":"collisions","width":3,"height":2,"data":[0,0,1,0,0,1]}
    ]},
    {"type":"objectgroup","name":"objects","objects":[
      {"id":1,"name":"player","gid":7,"x":0,"y":16,"width":16,"height":16},
      {"id":2,"name":"door","class":"portal","x":16,"y":16,"width":16,"height":16},
      {"id":3,"name":"orc","type":"enemy","gid":13,"x":16,"y":32,"width":16,"height":16,
       "properties":[{"name":"speed","type":"float","value":12.5}]}
    ]},
    {"type":"objectgroup","name":"notes","objects":[
      {"id":9,"name":"todo","x":0,"y":0}
    ]},
    {"type":"imagelayer","name":"sky"}
  ]
}"#;

const TERRAIN: &str = r#"{"tilewidth":16,"tileheight":16,"tilecount":24,"columns":12,"image":"terrain.png","spacing":1,"margin":2}"#;

fn write_assets(dir: &Path) {
    fs::create_dir_all(dir.join("tiles")).expect("tiles dir");
    fs::write(dir.join("tiles/terrain.tsj"), TERRAIN).expect("write tileset");
    fs::write(dir.join("dungeon.tmj"), MAP).expect("write map");
}

#[test]
fn container_caches_layers_player_and_actors() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_assets(dir.path());

    let map = MapContainer::load(&dir.path().join("dungeon.tmj"), &AdventureConfig::default())
        .expect("map should load");

    assert_eq!(map.name, "dungeon");
    assert_eq!((map.width, map.height), (3, 2));
    assert_eq!(map.pixel_size(), vec2(48.0, 32.0));
    assert_eq!(map.properties.get_string("music"), Some("cave"));

    // the collision layer is still listed, but never drawn
    let names: Vec<(&str, bool)> = map.tile_layers.iter().map(|l| (l.name.as_str(), l.visible)).collect();
    assert_eq!(names, vec![("ground", true), ("collisions", false)]);
    let collisions = map.collisions.as_ref().expect("collision layer");
    assert_eq!(collisions.cell(2, 0), 1);

    // only the configured object layer is kept
    let objects = map.objects.as_ref().expect("objects layer");
    assert_eq!(objects.name, "objects");
    assert_eq!(objects.objects.len(), 3);
    assert_eq!(map.object(ObjectId(2)).map(|o| o.kind.clone()), Some(ObjectKind::Portal));

    // tile objects are moved to a top-left origin
    assert_eq!(map.player_position(), Some(vec2(0.0, 0.0)));
    assert_eq!(map.object(ObjectId(3)).map(|o| o.position), Some(vec2(16.0, 16.0)));

    assert_eq!(map.actors.len(), 1);
    assert_eq!(map.actors[0].object, ObjectId(3));
    assert_eq!(map.actors[0].speed, 12.5);
}

#[test]
fn tileset_lookup_resolves_atlas_rects() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_assets(dir.path());
    let map = MapContainer::load(&dir.path().join("dungeon.tmj"), &AdventureConfig::default())
        .expect("map should load");

    let (ts, local) = map.ts_for_gid(TileId(14 | 0x8000_0000)).expect("gid 14");
    assert_eq!(local, 13);
    assert_eq!(ts.image, "terrain.png");
    // second row, second column: margin 2, spacing 1
    assert_eq!(ts.source_rect(local), (19, 19, 16, 16));
    assert!(map.ts_for_gid(TileId(25)).is_none());
    assert!(map.ts_for_gid(TileId(0)).is_none());
}

#[test]
fn missing_layers_are_not_fatal() {
    let json = r#"{
      "tilewidth": 8, "tileheight": 8, "width": 1, "height": 1,
      "layers": [{"type":"tilelayer","name":"floor","width":1,"height":1,"data":[0]}]
    }"#;
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("bare.json"), json).expect("write map");

    let map = MapContainer::load(&dir.path().join("bare.json"), &AdventureConfig::default())
        .expect("map should load");
    assert!(map.collisions.is_none());
    assert!(map.objects.is_none());
    assert!(map.player.is_none());
    assert_eq!(map.player_position(), None);
}

#[test]
fn custom_layer_names_come_from_config() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_assets(dir.path());
    let config = AdventureConfig::from_json_str(
        r#"{"objects_layer":"notes","collisions_layer":"ground","player_name":"todo"}"#,
    )
    .expect("config");

    let map = MapContainer::load(&dir.path().join("dungeon.tmj"), &config).expect("map should load");
    assert_eq!(map.player_id(), Some(ObjectId(9)));
    assert_eq!(map.collisions.as_ref().map(|c| c.cell(0, 0)), Some(1));
    assert!(!map.tile_layers[0].visible);
}

#[test]
fn load_errors_are_typed() {
    let dir = tempfile::tempdir().expect("temp dir");

    let err = decode_map_file_to_ir(Path::new("level.tmx")).unwrap_err();
    assert!(matches!(err, MapError::InvalidMap(_)));

    let err = decode_map_file_to_ir(&dir.path().join("absent.tmj")).unwrap_err();
    assert!(matches!(err, MapError::Io { .. }));

    // tileset file is missing
    fs::write(dir.path().join("dungeon.tmj"), MAP).expect("write map");
    let err = decode_map_file_to_ir(&dir.path().join("dungeon.tmj")).unwrap_err();
    assert!(matches!(err, MapError::Io { ref path, .. } if path.ends_with("terrain.tsj")));

    fs::write(dir.path().join("broken.tmj"), "{ not json").expect("write map");
    let err = decode_map_file_to_ir(&dir.path().join("broken.tmj")).unwrap_err();
    assert!(matches!(err, MapError::Json { .. }));

    let provider = JsonMapProvider::new(dir.path(), "tmj");
    let err = provider.load("elsewhere", &AdventureConfig::default()).err().expect("missing map");
    assert!(matches!(err, MapError::UnknownMap(ref name) if name == "elsewhere"));
}

#[test]
fn error_messages_name_the_problem() {
    let json = r#"{
      "tilewidth": 8, "tileheight": 8, "width": 2, "height": 2,
      "layers": [{"type":"tilelayer","name":"oops","width":2,"height":2,"data":[0,0,0]}]
    }"#;
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("oops.json"), json).expect("write map");

    let err = decode_map_file_to_ir(&dir.path().join("oops.json")).unwrap_err();
    assert!(matches!(err, MapError::InvalidLayerSize { ref layer, len: 3, .. } if layer == "oops"));
    assert!(err.to_string().contains("oops"));
}
