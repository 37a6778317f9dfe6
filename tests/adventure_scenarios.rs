// tests/adventure_scenarios.rs

use macroquad::math::{vec2, Vec2};
use macroquad_tiled_adventure::{
    AdventureConfig, ClassicRules, CollisionKind, EffectTarget, GameSession, InlineMapProvider,
    MovePolicy, ObjectId, Resolution, TileId,
};

/// 10x10 map of 16px tiles with the given collision cells set and the
/// given objects (raw Tiled JSON) on the `objects` layer.
fn field(blocked: &[(usize, usize)], objects: &str) -> String {
    let mut data = vec!["0"; 100];
    for &(x, y) in blocked {
        data[y * 10 + x] = "1";
    }
    format!(
        r#"{{
          "tilewidth": 16, "tileheight": 16, "width": 10, "height": 10,
          "tilesets": [{{"firstgid":1,"name":"t","image":"t.png","tilewidth":16,"tileheight":16,"tilecount":120,"columns":12}}],
          "layers": [
            {{"type":"tilelayer","name":"collisions","width":10,"height":10,"data":[{}]}},
            {{"type":"objectgroup","name":"objects","objects":[{}]}}
          ]
        }}"#,
        data.join(","),
        objects
    )
}

fn session_with(json: String, config: AdventureConfig) -> GameSession {
    let mut session = GameSession::new(config, InlineMapProvider::new().with_map("main", json));
    session.activate("main").expect("map should load");
    session
}

fn player_position(session: &GameSession) -> Vec2 {
    session
        .active_map()
        .and_then(|m| m.player_position())
        .expect("player")
}

const PLAYER_AT_ORIGIN: &str = r#"{"id":1,"name":"player","x":0,"y":0,"width":16,"height":16}"#;

#[test]
fn open_field_move_applies_in_full() {
    let mut session = session_with(field(&[], PLAYER_AT_ORIGIN), AdventureConfig::default());
    let mut rules = ClassicRules::new();

    let report = session.update(&mut rules, vec2(16.0, 0.0), 0.016);

    assert_eq!(report.outcome.applied, vec2(16.0, 0.0));
    assert_eq!(report.outcome.resolution, Resolution::Full);
    assert!(report.collisions.is_empty());
    assert_eq!(player_position(&session), vec2(16.0, 0.0));
}

#[test]
fn diagonal_into_corner_slides_along_one_axis() {
    let player = r#"{"id":1,"name":"player","x":4,"y":0,"width":16,"height":16}"#;
    let mut session = session_with(field(&[(1, 1)], player), AdventureConfig::default());
    let mut rules = ClassicRules::new();

    // hitbox 8..16 x 8..16; the diagonal lands on cell (1,1) only
    let report = session.update(&mut rules, vec2(8.0, 8.0), 0.016);

    assert_eq!(report.outcome.resolution, Resolution::AxisX);
    assert_eq!(report.outcome.applied, vec2(8.0, 0.0));
    assert_eq!(report.collisions.len(), 1);
    assert_eq!(report.collisions[0].kind, CollisionKind::Tile);
    assert_eq!(report.collisions[0].object, None);
    assert_eq!(player_position(&session), vec2(12.0, 0.0));
}

#[test]
fn strict_policy_rejects_the_whole_move() {
    let player = r#"{"id":1,"name":"player","x":4,"y":0,"width":16,"height":16}"#;
    let config = AdventureConfig {
        move_policy: MovePolicy::Strict,
        ..AdventureConfig::default()
    };
    let mut session = session_with(field(&[(1, 1)], player), config);

    let report = session.update(&mut ClassicRules::new(), vec2(8.0, 8.0), 0.016);

    assert_eq!(report.outcome.resolution, Resolution::Blocked);
    assert_eq!(report.outcome.applied, Vec2::ZERO);
    assert_eq!(player_position(&session), vec2(4.0, 0.0));
}

#[test]
fn loot_is_collected_once() {
    let objects = format!(
        r#"{PLAYER_AT_ORIGIN},
        {{"id":2,"name":"gem","type":"loot","x":16,"y":0,"width":16,"height":16,
          "properties":[{{"name":"value","type":"int","value":3}}]}}"#
    );
    let mut session = session_with(field(&[], &objects), AdventureConfig::default());
    let mut rules = ClassicRules::new();

    let report = session.update(&mut rules, vec2(8.0, 0.0), 0.016);
    assert_eq!(report.outcome.hit_object, Some(ObjectId(2)));
    assert_eq!(rules.gems(), 3);
    let gem = session.active_map().and_then(|m| m.object(ObjectId(2))).expect("gem");
    assert!(!gem.visible);

    // hidden objects no longer block or collide
    let report = session.update(&mut rules, vec2(8.0, 0.0), 0.016);
    assert!(report.collisions.is_empty());
    assert_eq!(report.outcome.resolution, Resolution::Full);
    assert_eq!(rules.gems(), 3);
}

#[test]
fn wall_and_object_hit_together_dispatch_wall_first() {
    let objects = format!(
        r#"{PLAYER_AT_ORIGIN},
        {{"id":2,"name":"coin","type":"loot","x":14,"y":8,"width":4,"height":4}}"#
    );
    let mut session = session_with(field(&[(1, 0)], &objects), AdventureConfig::default());
    let mut rules = ClassicRules::new();

    // hitbox lands on 12..20 x 8..16: cell (1,0) and the coin at once
    let report = session.update(&mut rules, vec2(8.0, 0.0), 0.016);

    let kinds: Vec<CollisionKind> = report.collisions.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![CollisionKind::Tile, CollisionKind::Object]);
    assert_eq!(report.collisions[0].object, None);
    assert_eq!(report.collisions[1].object, Some(ObjectId(2)));
    assert!(report.collisions.iter().all(|c| c.mover == ObjectId(1) && c.map == "main"));
    assert_eq!(rules.gems(), 1);
}

#[test]
fn scheduled_sprite_lands_after_cumulative_delay() {
    let objects = format!(
        r#"{PLAYER_AT_ORIGIN},
        {{"id":5,"name":"spikes","type":"trap","gid":105,"x":64,"y":80,"width":16,"height":16}}"#
    );
    let mut session = session_with(field(&[], &objects), AdventureConfig::default());
    let mut rules = ClassicRules::new();
    let sprite = |s: &GameSession| s.active_map().and_then(|m| m.object(ObjectId(5))).and_then(|o| o.sprite);

    assert!(session.schedule_effect(EffectTarget::new("main", ObjectId(5)), Some(TileId(104)), None, 0.2));

    let report = session.update(&mut rules, Vec2::ZERO, 0.1);
    assert_eq!(report.effects_fired, 0);
    assert_eq!(sprite(&session), Some(TileId(105)));

    let report = session.update(&mut rules, Vec2::ZERO, 0.15);
    assert_eq!(report.effects_fired, 1);
    assert_eq!(sprite(&session), Some(TileId(104)));
    assert!(session.effects().is_empty());
}

#[test]
fn enemies_hurt_and_bump() {
    let objects = format!(
        r#"{{"id":1,"name":"player","gid":1,"x":32,"y":16,"width":16,"height":16}},
        {{"id":2,"name":"slime","type":"enemy","x":48,"y":0,"width":16,"height":16,
          "properties":[{{"name":"awareness","type":"int","value":0}}]}}"#
    );
    let mut session = session_with(field(&[], &objects), AdventureConfig::default());
    let mut rules = ClassicRules::with_gems(5);

    let report = session.update(&mut rules, vec2(8.0, 0.0), 0.016);

    assert_eq!(report.outcome.hit_object, Some(ObjectId(2)));
    assert_eq!(rules.gems(), 4);
    assert_eq!(player_position(&session), vec2(24.0, 0.0));
}

#[test]
fn camera_follows_player_inside_large_maps() {
    let player = r#"{"id":1,"name":"player","x":100,"y":90,"width":16,"height":16}"#;
    let config = AdventureConfig {
        viewport_width: 64.0,
        viewport_height: 48.0,
        ..AdventureConfig::default()
    };
    let mut session = session_with(field(&[], player), config);

    let report = session.update(&mut ClassicRules::new(), Vec2::ZERO, 0.016);
    assert_eq!(report.camera, vec2(68.0, 66.0));

    // near the far corner the camera stops at map size - viewport
    session
        .active_map_mut()
        .and_then(|m| m.object_mut(ObjectId(1)))
        .expect("player")
        .position = vec2(150.0, 150.0);
    let report = session.update(&mut ClassicRules::new(), Vec2::ZERO, 0.016);
    assert_eq!(report.camera, vec2(96.0, 112.0));
}
