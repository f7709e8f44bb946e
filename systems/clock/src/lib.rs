#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame clock that converts monotonic frame timestamps into simulation commands.
//!
//! Every frame yields one clamped [`Command::Tick`] followed by zero or more
//! [`Command::Step`] commands. The leftover fraction of a step is exposed as
//! the interpolation factor used by the renderer.

use std::time::Duration;

use snake_quest_core::{
    Command, Event, Screen, SpeedSetting, INTRO_STEP_INTERVAL, MAX_FRAME_DELTA,
    STORY_STEP_INTERVAL,
};

/// Limits applied while converting frame time into steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    gameplay_step_cap: u32,
    interstitial_step_cap: u32,
    max_frame_delta: Duration,
}

impl Config {
    /// Creates a configuration with explicit limits.
    #[must_use]
    pub const fn new(
        gameplay_step_cap: u32,
        interstitial_step_cap: u32,
        max_frame_delta: Duration,
    ) -> Self {
        Self {
            gameplay_step_cap,
            interstitial_step_cap,
            max_frame_delta,
        }
    }

    /// Most steps executed in one frame while playing.
    #[must_use]
    pub const fn gameplay_step_cap(&self) -> u32 {
        self.gameplay_step_cap
    }

    /// Most steps executed in one frame during the intro and story screens.
    #[must_use]
    pub const fn interstitial_step_cap(&self) -> u32 {
        self.interstitial_step_cap
    }

    /// Longest frame delta fed into the accumulator.
    #[must_use]
    pub const fn max_frame_delta(&self) -> Duration {
        self.max_frame_delta
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(5, 4, MAX_FRAME_DELTA)
    }
}

/// Fixed-step accumulator driven by frame timestamps.
#[derive(Debug)]
pub struct Clock {
    config: Config,
    screen: Screen,
    speed: SpeedSetting,
    last_frame: Option<Duration>,
    accumulator: Duration,
}

impl Clock {
    /// Creates a clock for the provided starting screen and speed.
    #[must_use]
    pub fn new(config: Config, screen: Screen, speed: SpeedSetting) -> Self {
        Self {
            config,
            screen,
            speed,
            last_frame: None,
            accumulator: Duration::ZERO,
        }
    }

    /// Screen the clock is currently pacing.
    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    /// Time accumulated towards the next step.
    #[must_use]
    pub const fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Consumes world events and emits the commands for a frame observed at `now`.
    ///
    /// `now` is a monotonic timestamp. The first frame after a screen change
    /// only re-anchors the clock and reports a zero delta.
    pub fn handle(&mut self, now: Duration, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::ScreenChanged { screen } => self.change_screen(*screen),
                Event::SettingsChanged { settings } => self.speed = settings.speed,
                _ => {}
            }
        }

        let Some(interval) = self.step_interval() else {
            self.last_frame = None;
            return;
        };

        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_sub(last))
            .min(self.config.max_frame_delta);
        self.last_frame = Some(now);
        out.push(Command::Tick { dt });

        let Some(cap) = self.step_cap() else {
            return;
        };
        self.accumulator = self.accumulator.saturating_add(dt);
        let mut steps = 0;
        while self.accumulator >= interval && steps < cap {
            self.accumulator -= interval;
            steps += 1;
            out.push(Command::Step);
        }
        if steps == cap && self.accumulator >= interval {
            self.accumulator = Duration::ZERO;
        }
    }

    /// Fraction of the next step that has already elapsed, in `[0, 1]`.
    ///
    /// A paused game keeps the fraction it was frozen at. Level-clear and
    /// game-over modals draw the snake at its previous cells.
    #[must_use]
    pub fn interpolation(&self) -> f32 {
        match self.screen {
            Screen::Paused => self.fraction_of(self.speed.step_interval()),
            Screen::LevelClear | Screen::GameOver => 0.0,
            _ => match (self.step_interval(), self.step_cap()) {
                (Some(interval), Some(_)) => self.fraction_of(interval),
                _ => 1.0,
            },
        }
    }

    fn fraction_of(&self, interval: Duration) -> f32 {
        if interval.is_zero() {
            return 1.0;
        }
        (self.accumulator.as_secs_f32() / interval.as_secs_f32()).clamp(0.0, 1.0)
    }

    fn change_screen(&mut self, screen: Screen) {
        let pausing = screen == Screen::Paused || self.screen == Screen::Paused;
        if !pausing && screen != self.screen {
            self.accumulator = Duration::ZERO;
        }
        self.screen = screen;
        self.last_frame = None;
    }

    fn step_interval(&self) -> Option<Duration> {
        match self.screen {
            Screen::Playing | Screen::SideScroller | Screen::Loading => {
                Some(self.speed.step_interval())
            }
            Screen::Story { .. } => Some(STORY_STEP_INTERVAL),
            Screen::Intro => Some(INTRO_STEP_INTERVAL),
            Screen::Menu { .. } | Screen::Paused | Screen::LevelClear | Screen::GameOver => None,
        }
    }

    fn step_cap(&self) -> Option<u32> {
        match self.screen {
            Screen::Playing | Screen::SideScroller => Some(self.config.gameplay_step_cap),
            Screen::Story { .. } | Screen::Intro => Some(self.config.interstitial_step_cap),
            _ => None,
        }
    }
}
