use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use snake_quest_core::SpeedSetting;

/// Command-line arguments accepted by the Snake Quest binary.
#[derive(Clone, Debug, Parser, PartialEq, Eq)]
#[command(name = "snake-quest", version, about = "Grid snake with gates, keys and a boss")]
pub(crate) struct Args {
    /// TOML settings file; command-line flags override its values.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Movement speed preset.
    #[arg(long, value_enum)]
    pub(crate) speed: Option<SpeedArg>,
    /// Level a new run starts on.
    #[arg(long, value_name = "LEVEL")]
    pub(crate) start_level: Option<u32>,
    /// Seed for every random decision; a fresh seed is drawn when omitted.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Leaderboard file.
    #[arg(long, value_name = "PATH")]
    pub(crate) leaderboard: Option<PathBuf>,
    /// Let the head pass through the body.
    #[arg(long)]
    pub(crate) no_self_collision: bool,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, conflicts_with = "no_vsync")]
    pub(crate) vsync: bool,
    /// Render as fast as possible.
    #[arg(long)]
    pub(crate) no_vsync: bool,
    /// Log frame rate once per second.
    #[arg(long)]
    pub(crate) show_fps: bool,
    /// Draw every sprite with primitives.
    #[arg(long)]
    pub(crate) no_sprites: bool,
    /// Sprite manifest to load textures from.
    #[arg(long, value_name = "PATH")]
    pub(crate) sprite_manifest: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub(crate) log_filter: String,
}

impl Args {
    /// Requested vsync mode, if either flag was given.
    #[must_use]
    pub(crate) fn vsync(&self) -> Option<bool> {
        if self.vsync {
            Some(true)
        } else if self.no_vsync {
            Some(false)
        } else {
            None
        }
    }
}

/// Speed preset names accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum SpeedArg {
    /// Half the base rate.
    Slow,
    /// The base rate.
    Normal,
    /// One and a half times the base rate.
    Fast,
}

impl From<SpeedArg> for SpeedSetting {
    fn from(speed: SpeedArg) -> Self {
        match speed {
            SpeedArg::Slow => Self::Slow,
            SpeedArg::Normal => Self::Normal,
            SpeedArg::Fast => Self::Fast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_into_overrides() {
        let args = Args::try_parse_from([
            "snake-quest",
            "--speed",
            "fast",
            "--start-level",
            "13",
            "--seed",
            "42",
            "--no-self-collision",
            "--no-vsync",
        ])
        .expect("valid arguments");
        assert_eq!(args.speed, Some(SpeedArg::Fast));
        assert_eq!(args.start_level, Some(13));
        assert_eq!(args.seed, Some(42));
        assert!(args.no_self_collision);
        assert_eq!(args.vsync(), Some(false));
        assert_eq!(args.log_filter, "info");
    }

    #[test]
    fn contradictory_vsync_flags_are_rejected() {
        assert!(Args::try_parse_from(["snake-quest", "--vsync", "--no-vsync"]).is_err());
        assert!(Args::try_parse_from(["snake-quest", "--speed", "turbo"]).is_err());
        let args = Args::try_parse_from(["snake-quest"]).expect("no flags is valid");
        assert_eq!(args.vsync(), None, "platform default when unspecified");
    }
}
