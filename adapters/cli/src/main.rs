#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Snake Quest in a macroquad window.

mod args;
mod config;
mod scene;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use snake_quest_core::{GRID_HEIGHT, GRID_WIDTH, HUD_HEIGHT, TILE_SIZE, WINDOW_TITLE};
use snake_quest_rendering::{palette, GridPresentation, Presentation, RenderingBackend, Scene};
use snake_quest_rendering_macroquad::MacroquadBackend;
use snake_quest_system_clock::Config as ClockConfig;
use snake_quest_system_leaderboard::Leaderboard;
use tracing_subscriber::EnvFilter;

use crate::{
    args::Args,
    config::{fresh_seed, FileConfig, LaunchOptions},
    session::Session,
};

/// Entry point for the Snake Quest command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_filter.as_str())),
        )
        .init();

    let file = match &args.config {
        Some(path) => FileConfig::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => FileConfig::default(),
    };
    let options = LaunchOptions::merge(&args, file, fresh_seed());
    tracing::info!(
        seed = options.seed,
        start_level = options.start_level,
        speed = options.settings.speed.label(),
        self_collision = options.self_collision,
        leaderboard = %options.leaderboard.display(),
        "starting snake quest"
    );

    let leaderboard = Leaderboard::load(options.leaderboard.clone());
    let mut session = Session::new(options.world_config(), ClockConfig::default(), leaderboard);

    let grid = GridPresentation::new(
        GRID_WIDTH as u32,
        GRID_HEIGHT as u32,
        TILE_SIZE as f32,
        HUD_HEIGHT as f32,
        palette::GRID,
    )?;
    let presentation = Presentation::new(WINDOW_TITLE, palette::BACKGROUND, Scene::new(grid));

    let mut backend = MacroquadBackend::new()
        .with_show_fps(options.show_fps)
        .with_sprite_loading(options.sprites)
        .with_sprite_manifest(options.sprite_manifest.clone());
    if let Some(vsync) = options.vsync {
        backend = backend.with_vsync(vsync);
    }

    backend.run(presentation, move |now, input, scene| {
        let outcome = session.frame(now, input);
        session.populate(scene);
        outcome
    })
}
