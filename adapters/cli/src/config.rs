//! Launch configuration assembled from the settings file and the command line.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::Deserialize;
use snake_quest_core::{Settings, SpeedSetting};
use snake_quest_world::Config;
use thiserror::Error;

use crate::args::Args;

const DEFAULT_LEADERBOARD: &str = "leaderboard.json";

/// Errors raised while loading the settings file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings file {}", .path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The settings file is not valid TOML for the expected keys.
    #[error("invalid settings file {}", .path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying TOML failure.
        #[source]
        source: toml::de::Error,
    },
}

/// Values accepted in the TOML settings file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    speed: Option<SpeedSetting>,
    sound: Option<bool>,
    start_level: Option<u32>,
    self_collision: Option<bool>,
    leaderboard: Option<PathBuf>,
    sprite_manifest: Option<PathBuf>,
}

impl FileConfig {
    /// Parses settings from TOML text.
    pub(crate) fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and parses the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }
}

/// Fully resolved launch options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LaunchOptions {
    pub(crate) settings: Settings,
    pub(crate) start_level: u32,
    pub(crate) seed: u64,
    pub(crate) self_collision: bool,
    pub(crate) leaderboard: PathBuf,
    pub(crate) sprites: bool,
    pub(crate) sprite_manifest: Option<PathBuf>,
    pub(crate) vsync: Option<bool>,
    pub(crate) show_fps: bool,
}

impl LaunchOptions {
    /// Merges file values under command-line flags.
    ///
    /// `fresh_seed` is used only when no seed was given.
    pub(crate) fn merge(args: &Args, file: FileConfig, fresh_seed: u64) -> Self {
        let defaults = Settings::default();
        let settings = Settings {
            speed: args
                .speed
                .map(SpeedSetting::from)
                .or(file.speed)
                .unwrap_or(defaults.speed),
            sound_on: file.sound.unwrap_or(defaults.sound_on),
        };

        Self {
            settings,
            start_level: args.start_level.or(file.start_level).unwrap_or(1),
            seed: args.seed.unwrap_or(fresh_seed),
            self_collision: !args.no_self_collision && file.self_collision.unwrap_or(true),
            leaderboard: args
                .leaderboard
                .clone()
                .or(file.leaderboard)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEADERBOARD)),
            sprites: !args.no_sprites,
            sprite_manifest: args.sprite_manifest.clone().or(file.sprite_manifest),
            vsync: args.vsync(),
            show_fps: args.show_fps,
        }
    }

    /// World configuration for a new session.
    #[must_use]
    pub(crate) fn world_config(&self) -> Config {
        Config::new()
            .with_start_level(self.start_level)
            .with_seed(self.seed)
            .with_settings(self.settings)
            .with_self_collision(self.self_collision)
    }
}

/// Seed derived from the wall clock for unseeded runs.
pub(crate) fn fresh_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos() as u64)
}
