#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Snake Quest.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Every sprite is optional. Roles without a texture in the manifest, or all
//! roles when the manifest cannot be loaded, are drawn with primitives.

mod sprites;

use anyhow::{Context, Result};
use glam::Vec2;
use macroquad::input::{self, KeyCode};
use snake_quest_core::Intent;
use snake_quest_rendering::{
    assets::{Asset, AssetCatalog},
    palette, Color, FrameInput, FrameOutcome, MenuView, OverlayView, Presentation, RenderingBackend,
    Scene, SceneSprite, SpriteRole,
};
use std::{
    collections::VecDeque,
    path::PathBuf,
    time::{Duration, Instant},
};

use self::sprites::{DrawParams, SpriteAtlas};

/// Keys bound to logical intents, in polling order.
const KEY_BINDINGS: [(KeyCode, Intent); 15] = [
    (KeyCode::Up, Intent::Up),
    (KeyCode::W, Intent::Up),
    (KeyCode::Down, Intent::Down),
    (KeyCode::S, Intent::Down),
    (KeyCode::Left, Intent::Left),
    (KeyCode::A, Intent::Left),
    (KeyCode::Right, Intent::Right),
    (KeyCode::D, Intent::Right),
    (KeyCode::Enter, Intent::Confirm),
    (KeyCode::Space, Intent::Advance),
    (KeyCode::Escape, Intent::Cancel),
    (KeyCode::F, Intent::Fire),
    (KeyCode::Backspace, Intent::Erase),
    (KeyCode::N, Intent::SkipLevel),
    (KeyCode::B, Intent::JumpToBoss),
];

/// Translates pressed keys and typed characters into logical intents.
///
/// Bound keys come first in binding order, followed by one
/// [`Intent::Text`] per typed alphanumeric character.
#[must_use]
pub fn intents_from_keys(
    pressed: impl IntoIterator<Item = KeyCode>,
    typed: impl IntoIterator<Item = char>,
) -> Vec<Intent> {
    let pressed: Vec<KeyCode> = pressed.into_iter().collect();
    let mut intents: Vec<Intent> = KEY_BINDINGS
        .iter()
        .filter(|(key, _)| pressed.contains(key))
        .map(|(_, intent)| *intent)
        .collect();
    intents.extend(
        typed
            .into_iter()
            .filter(|character| character.is_alphanumeric())
            .map(Intent::Text),
    );
    intents
}

fn poll_frame_input() -> FrameInput {
    let pressed = KEY_BINDINGS
        .iter()
        .map(|(key, _)| *key)
        .filter(|key| input::is_key_pressed(*key));
    let typed = std::iter::from_fn(input::get_char_pressed);
    FrameInput {
        intents: intents_from_keys(pressed, typed),
        close_requested: input::is_quit_requested(),
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    load_sprites: bool,
    manifest_path: Option<PathBuf>,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            load_sprites: true,
            manifest_path: None,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the backend should attempt to load sprite assets.
    #[must_use]
    pub fn with_sprite_loading(mut self, enabled: bool) -> Self {
        self.load_sprites = enabled;
        self
    }

    /// Overrides the sprite manifest location.
    #[must_use]
    pub fn with_sprite_manifest(mut self, path: Option<PathBuf>) -> Self {
        self.manifest_path = path;
        self
    }
}

fn load_atlas(manifest_path: Option<PathBuf>) -> Option<SpriteAtlas> {
    let path = manifest_path.unwrap_or_else(SpriteAtlas::default_manifest_path);
    match SpriteAtlas::from_manifest_path(&path)
        .with_context(|| format!("sprites unavailable from {}", path.display()))
    {
        Ok(atlas) => {
            tracing::info!(
                manifest = %path.display(),
                textures = atlas.texture_count(),
                "sprite atlas loaded"
            );
            Some(atlas)
        }
        Err(error) => {
            tracing::warn!("{error:#}; drawing primitives instead");
            None
        }
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameOutcome + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            load_sprites,
            manifest_path,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.grid.width().round() as i32,
            window_height: scene.total_height().round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let sprite_atlas = if load_sprites {
                load_atlas(manifest_path)
            } else {
                None
            };

            input::prevent_quit();
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let started = Instant::now();

            loop {
                let frame_input = poll_frame_input();
                if update_scene(started.elapsed(), frame_input, &mut scene) == FrameOutcome::Exit {
                    break;
                }

                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::from_scene(
                    &scene,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_scene(&scene, &metrics, sprite_atlas.as_ref());

                let frame_dt =
                    Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
                if let Some(FpsMetrics {
                    per_second,
                    trailing_ten_seconds,
                }) = fps_counter.record_frame(frame_dt)
                {
                    if show_fps {
                        tracing::info!(
                            fps = per_second,
                            trailing_ten_seconds,
                            "frame rate"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Letterboxed mapping from scene pixels to screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    cell_step: f32,
    hud_height: f32,
    width: f32,
    height: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let grid = scene.grid;
        let world_width = grid.width();
        let world_height = grid.total_height();
        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / world_width).min(screen_height / world_height)
        };
        let width = world_width * scale;
        let height = world_height * scale;

        Self {
            scale,
            offset_x: ((screen_width - width) * 0.5).max(0.0),
            offset_y: ((screen_height - height) * 0.5).max(0.0),
            cell_step: grid.tile_size * scale,
            hud_height: grid.hud_height * scale,
            width,
            height,
        }
    }

    fn playfield_origin(&self) -> Vec2 {
        Vec2::new(self.offset_x, self.offset_y + self.hud_height)
    }

    fn cell_to_screen(&self, cell: Vec2) -> Vec2 {
        self.playfield_origin() + cell * self.cell_step
    }

    fn font_size(&self, base: f32) -> f32 {
        (base * self.scale).max(8.0)
    }
}

/// Screen-space rectangle covered by a sprite as `(position, size)`.
fn sprite_rect(sprite: &SceneSprite, metrics: &SceneMetrics) -> Option<(Vec2, Vec2)> {
    if metrics.cell_step <= f32::EPSILON {
        return None;
    }
    let size = sprite.size * metrics.cell_step;
    if size.x <= f32::EPSILON || size.y <= f32::EPSILON {
        return None;
    }
    Some((metrics.cell_to_screen(sprite.position), size))
}

fn draw_scene(scene: &Scene, metrics: &SceneMetrics, atlas: Option<&SpriteAtlas>) {
    if let Some(menu) = &scene.menu {
        draw_menu(menu, metrics);
        return;
    }

    draw_grid(scene, metrics);
    for sprite in &scene.sprites {
        draw_sprite(sprite, metrics, atlas);
    }
    if scene.screen_fade > 0.0 {
        let origin = metrics.playfield_origin();
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            metrics.width,
            metrics.height - metrics.hud_height,
            to_macroquad_color(Color::new(0.0, 0.0, 0.0, scene.screen_fade.clamp(0.0, 1.0))),
        );
    }
    if let Some(hud) = &scene.hud {
        draw_hud(&hud.labels(), metrics);
    }
    if let Some(overlay) = &scene.overlay {
        draw_overlay(overlay, scene.title_fade, metrics);
    }
}

fn draw_grid(scene: &Scene, metrics: &SceneMetrics) {
    let grid = scene.grid;
    let color = to_macroquad_color(grid.line_color);
    let origin = metrics.playfield_origin();
    let bottom = origin.y + grid.rows as f32 * metrics.cell_step;
    let right = origin.x + grid.columns as f32 * metrics.cell_step;

    for column in 0..=grid.columns {
        let x = origin.x + column as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(x, origin.y, x, bottom, 1.0, color);
    }
    for row in 0..=grid.rows {
        let y = origin.y + row as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(origin.x, y, right, y, 1.0, color);
    }
}

fn draw_sprite(sprite: &SceneSprite, metrics: &SceneMetrics, atlas: Option<&SpriteAtlas>) {
    let Some((position, size)) = sprite_rect(sprite, metrics) else {
        return;
    };

    if let Some(atlas) = atlas.filter(|atlas| atlas.contains(Asset::Sprite(sprite.role))) {
        let params = DrawParams::new(position, size)
            .with_rotation(sprite.rotation_degrees.to_radians())
            .with_tint(Color::new(1.0, 1.0, 1.0, sprite.alpha));
        if atlas.draw(sprite.role, params) {
            return;
        }
    }

    draw_primitive(sprite, position, size, metrics);
}

fn draw_primitive(sprite: &SceneSprite, position: Vec2, size: Vec2, metrics: &SceneMetrics) {
    let color = to_macroquad_color(sprite.role.fallback_color().with_alpha(sprite.alpha));
    let centre = metrics.cell_to_screen(sprite.centre());
    let inset = (metrics.cell_step * 0.05).max(1.0);

    match sprite.role {
        SpriteRole::Wall => macroquad::shapes::draw_rectangle_lines(
            position.x,
            position.y,
            size.x,
            size.y,
            2.0,
            color,
        ),
        SpriteRole::BreakerShot | SpriteRole::PlayerShot | SpriteRole::BossBullet => {
            macroquad::shapes::draw_circle(centre.x, centre.y, metrics.cell_step * 0.2, color);
        }
        SpriteRole::Explosion => {
            macroquad::shapes::draw_circle_lines(centre.x, centre.y, size.x * 0.5, 2.0, color);
        }
        SpriteRole::Key { unlocked } => {
            fill_inset(position, size, inset, color);
            if !unlocked {
                let lock = Vec2::splat(size.x.min(size.y) * 0.4);
                let corner = centre - lock * 0.5;
                macroquad::shapes::draw_rectangle(
                    corner.x,
                    corner.y,
                    lock.x,
                    lock.y,
                    to_macroquad_color(palette::BACKGROUND.with_alpha(sprite.alpha)),
                );
            }
        }
        SpriteRole::Button { pressed } => {
            let shade = if pressed { 0.5 } else { 1.0 };
            let base = sprite.role.fallback_color();
            let shaded = Color::new(base.red * shade, base.green * shade, base.blue * shade, 1.0)
                .with_alpha(sprite.alpha);
            fill_inset(position, size, inset, to_macroquad_color(shaded));
        }
        SpriteRole::SnakeHead { .. }
        | SpriteRole::SnakeBody
        | SpriteRole::Food
        | SpriteRole::BreakableWall
        | SpriteRole::Boss => fill_inset(position, size, inset, color),
    }
}

fn fill_inset(position: Vec2, size: Vec2, inset: f32, color: macroquad::color::Color) {
    macroquad::shapes::draw_rectangle(
        position.x + inset,
        position.y + inset,
        (size.x - inset * 2.0).max(1.0),
        (size.y - inset * 2.0).max(1.0),
        color,
    );
}

fn draw_hud(labels: &[String], metrics: &SceneMetrics) {
    let font_size = metrics.font_size(22.0);
    let spacing = metrics.width / labels.len().max(1) as f32;
    let baseline = metrics.offset_y + metrics.hud_height * 0.65;
    let color = to_macroquad_color(palette::HUD);
    for (index, label) in labels.iter().enumerate() {
        let x = metrics.offset_x + spacing * index as f32 + metrics.cell_step * 0.5;
        macroquad::text::draw_text(label, x, baseline, font_size, color);
    }
}

fn draw_centred_text(text: &str, y: f32, font_size: f32, color: Color, metrics: &SceneMetrics) {
    let dimensions = macroquad::text::measure_text(text, None, font_size as u16, 1.0);
    let x = metrics.offset_x + (metrics.width - dimensions.width) * 0.5;
    macroquad::text::draw_text(text, x, y, font_size, to_macroquad_color(color));
}

fn draw_menu(menu: &MenuView, metrics: &SceneMetrics) {
    let title_size = metrics.font_size(40.0);
    let entry_size = metrics.font_size(28.0);
    let top = metrics.offset_y + metrics.height * 0.3;
    draw_centred_text(&menu.title, top, title_size, palette::HUD, metrics);

    for (index, entry) in menu.entries.iter().enumerate() {
        let color = if entry.selected {
            palette::SNAKE
        } else {
            palette::HUD
        };
        let y = top + title_size * 1.5 + entry_size * 1.4 * index as f32;
        draw_centred_text(&entry.label, y, entry_size, color, metrics);
    }

    let prompt_size = metrics.font_size(18.0);
    let bottom = metrics.offset_y + metrics.height - prompt_size * 1.5;
    draw_centred_text(&menu.prompt, bottom, prompt_size, palette::HUD, metrics);
}

fn draw_overlay(overlay: &OverlayView, title_fade: Option<f32>, metrics: &SceneMetrics) {
    let title_size = metrics.font_size(34.0);
    let line_size = metrics.font_size(20.0);
    let rows = overlay.lines.len() as f32;
    let block_height = title_size * 1.6 + line_size * 1.4 * rows;
    let origin = metrics.playfield_origin();
    let playfield_height = metrics.height - metrics.hud_height;
    let top = origin.y + ((playfield_height - block_height) * 0.5).max(0.0);

    if overlay.boxed {
        let margin = metrics.cell_step;
        let (x, y) = (origin.x + margin * 2.0, top - margin);
        let (width, height) = (metrics.width - margin * 4.0, block_height + margin * 2.0);
        macroquad::shapes::draw_rectangle(
            x,
            y,
            width,
            height,
            to_macroquad_color(palette::BACKGROUND.with_alpha(0.9)),
        );
        macroquad::shapes::draw_rectangle_lines(
            x,
            y,
            width,
            height,
            2.0,
            to_macroquad_color(palette::WALL),
        );
    }

    let title_alpha = title_fade.unwrap_or(1.0);
    draw_centred_text(
        &overlay.title,
        top + title_size,
        title_size,
        palette::HUD.with_alpha(title_alpha),
        metrics,
    );
    for (index, line) in overlay.lines.iter().enumerate() {
        let y = top + title_size * 1.6 + line_size * 1.4 * (index as f32 + 1.0);
        draw_centred_text(line, y, line_size, palette::HUD, metrics);
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
