use anyhow::Context;
use macroquad::prelude::*;
use macroquad_tiled_adventure::render::cull::{visible_objects, visible_tile_range};
use macroquad_tiled_adventure::{
    AdventureConfig, ClassicRules, GameSession, JsonMapProvider, MapContainer, TileId,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const ASSETS: &str = "assets";

fn window_conf() -> Conf {
    Conf {
        window_title: "Tiled Adventure".into(),
        window_width: 960,
        window_height: 720,
        ..Default::default()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Atlas textures keyed by resolved image path.
#[derive(Default)]
struct Textures {
    loaded: HashMap<PathBuf, Texture2D>,
}

impl Textures {
    async fn load_for(&mut self, root: &Path, map: &MapContainer) {
        for ts in &map.tilesets {
            let path = root.join(&ts.image);
            if self.loaded.contains_key(&path) {
                continue;
            }
            let Some(path_str) = path.to_str() else {
                warn!(image = %path.display(), "non-utf8 image path");
                continue;
            };
            match load_texture(path_str).await {
                Ok(tex) => {
                    tex.set_filter(FilterMode::Nearest);
                    self.loaded.insert(path, tex);
                }
                Err(err) => warn!(image = %path.display(), error = %err, "failed to load tileset image"),
            }
        }
    }

    fn draw_gid(&self, root: &Path, map: &MapContainer, gid: TileId, dest: Vec2) {
        let Some((ts, local)) = map.ts_for_gid(gid) else {
            return;
        };
        let Some(tex) = self.loaded.get(&root.join(&ts.image)) else {
            return;
        };
        let (sx, sy, w, h) = ts.source_rect(local);
        draw_texture_ex(
            tex,
            dest.x,
            dest.y,
            WHITE,
            DrawTextureParams {
                source: Some(Rect::new(sx as f32, sy as f32, w as f32, h as f32)),
                flip_x: gid.flip_h(),
                flip_y: gid.flip_v(),
                ..Default::default()
            },
        );
    }
}

fn read_displacement(speed: f32, dt: f32) -> Vec2 {
    let mut dir = Vec2::ZERO;
    if is_key_down(KeyCode::Left) || is_key_down(KeyCode::A) {
        dir.x -= 1.0;
    }
    if is_key_down(KeyCode::Right) || is_key_down(KeyCode::D) {
        dir.x += 1.0;
    }
    if is_key_down(KeyCode::Up) || is_key_down(KeyCode::W) {
        dir.y -= 1.0;
    }
    if is_key_down(KeyCode::Down) || is_key_down(KeyCode::S) {
        dir.y += 1.0;
    }
    dir.normalize_or_zero() * speed * dt
}

fn draw_map(textures: &Textures, root: &Path, map: &MapContainer, camera: Vec2, viewport: Vec2) {
    for layer in map.tile_layers.iter().filter(|l| l.visible) {
        let Some(range) = visible_tile_range(camera, viewport, map.tile_w, map.tile_h, layer.width, layer.height)
        else {
            continue;
        };
        for (x, y) in range.cells() {
            let gid = TileId(layer.data[y * layer.width + x]);
            if gid.is_empty() {
                continue;
            }
            let dest = vec2((x as u32 * map.tile_w) as f32, (y as u32 * map.tile_h) as f32) + layer.offset - camera;
            textures.draw_gid(root, map, gid, dest);
        }
    }

    let Some(objects) = map.objects.as_ref() else {
        return;
    };
    for obj in visible_objects(objects, camera, viewport) {
        let pos = obj.position - camera;
        match obj.sprite {
            Some(gid) => textures.draw_gid(root, map, gid, pos),
            None => draw_rectangle_lines(pos.x, pos.y, obj.size.x, obj.size.y, 1.0, YELLOW),
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AdventureConfig::from_file(&path)?,
        None => AdventureConfig::default(),
    };
    let root = PathBuf::from(ASSETS);
    let provider = JsonMapProvider::new(&root, config.map_extension.clone());
    let viewport = config.viewport();
    let speed = config.player_speed;
    let start = config.start_map.clone();

    let mut session = GameSession::new(config, provider);
    session
        .activate(&start)
        .with_context(|| format!("Loading start map {start}"))?;
    let mut rules = ClassicRules::new();
    let mut textures = Textures::default();
    let mut textured: Option<String> = None;

    loop {
        let dt = get_frame_time();

        if rules.is_dead() {
            if is_key_pressed(KeyCode::Space) {
                rules.reset();
                session.reset().context("Restarting")?;
            }
        } else if rules.dialog().is_some() {
            if is_key_pressed(KeyCode::Space) {
                rules.close_dialog();
            }
        } else {
            let displacement = read_displacement(speed, dt);
            session.update(&mut rules, displacement, dt);
        }
        if let Some(sound) = rules.take_sound() {
            info!(sound = %sound, "sound requested");
        }

        if textured.as_deref() != session.active_name() {
            if let Some(map) = session.active_map() {
                textures.load_for(&root, map).await;
            }
            textured = session.active_name().map(str::to_owned);
        }

        set_camera(&Camera2D::from_display_rect(Rect::new(0.0, 0.0, viewport.x, viewport.y)));
        clear_background(BLACK);
        if let Some(map) = session.active_map() {
            draw_map(&textures, &root, map, session.camera_offset(), viewport);
        }

        draw_text(&format!("gems: {}", rules.gems()), 4.0, 12.0, 16.0, WHITE);
        if let Some(text) = rules.dialog() {
            draw_rectangle(8.0, viewport.y - 64.0, viewport.x - 16.0, 56.0, Color::new(0.0, 0.0, 0.0, 0.8));
            draw_text(text, 16.0, viewport.y - 40.0, 16.0, WHITE);
        }
        if rules.is_dead() {
            draw_text("You died, penniless. SPACE to restart.", 16.0, viewport.y / 2.0, 16.0, RED);
        }

        set_default_camera();
        next_frame().await;
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        let msg = format!("{err:#}");
        error!(error = %msg, "walk demo failed");
        std::process::exit(1);
    }
}
