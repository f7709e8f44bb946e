//! Frame orchestration: intents and clock commands flow into the world, world
//! events flow back out to every system exactly once.

use std::time::Duration;

use snake_quest_core::{Command, Event};
use snake_quest_rendering::{visuals::FadeTracker, FrameInput, FrameOutcome, Scene};
use snake_quest_system_clock::{Clock, Config as ClockConfig};
use snake_quest_system_controls::Controls;
use snake_quest_system_leaderboard::Leaderboard;
use snake_quest_world::{self as world, query, Config, GameState};

use crate::scene;

/// Game session driven one frame at a time by the rendering backend.
#[derive(Debug)]
pub(crate) struct Session {
    state: GameState,
    controls: Controls,
    clock: Clock,
    leaderboard: Leaderboard,
    fades: FadeTracker,
    controls_inbox: Vec<Event>,
    clock_inbox: Vec<Event>,
}

impl Session {
    pub(crate) fn new(config: Config, clock: ClockConfig, leaderboard: Leaderboard) -> Self {
        let state = GameState::new(config);
        let screen = query::screen(&state);
        Self {
            controls: Controls::new(screen),
            clock: Clock::new(clock, screen, query::settings(&state).speed),
            state,
            leaderboard,
            fades: FadeTracker::new(),
            controls_inbox: Vec::new(),
            clock_inbox: Vec::new(),
        }
    }

    /// Advances the session by one frame.
    pub(crate) fn frame(&mut self, now: Duration, input: FrameInput) -> FrameOutcome {
        let mut commands = Vec::new();
        let mut events = Vec::new();

        self.controls
            .handle(&self.controls_inbox, &input.intents, &mut commands);
        self.controls_inbox.clear();
        self.apply_all(&mut commands, &mut events);

        self.clock_inbox.extend(events.iter().cloned());
        self.clock.handle(now, &self.clock_inbox, &mut commands);
        self.clock_inbox.clear();
        let after_clock = events.len();
        self.apply_all(&mut commands, &mut events);
        self.clock_inbox.extend_from_slice(&events[after_clock..]);

        self.leaderboard.handle(&events);
        self.fades.observe(&events);
        log_events(&events);
        self.controls_inbox.extend(events);

        if input.close_requested || !query::is_running(&self.state) {
            tracing::info!(
                points = query::points(&self.state),
                level = query::level(&self.state),
                "session ended"
            );
            FrameOutcome::Exit
        } else {
            FrameOutcome::Continue
        }
    }

    fn apply_all(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.state, command, events);
        }
    }

    /// Rebuilds `scene` from the current state.
    pub(crate) fn populate(&self, scene: &mut Scene) {
        scene::populate(
            scene,
            &self.state,
            self.clock.interpolation(),
            &self.fades,
            self.leaderboard.entries(),
        );
    }

    /// World state owned by the session.
    #[cfg(test)]
    pub(crate) fn state(&self) -> &GameState {
        &self.state
    }

    /// High-score table owned by the session.
    #[cfg(test)]
    pub(crate) fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::ScreenChanged { screen } => tracing::debug!(?screen, "screen changed"),
            Event::ShotFired { origin, direction } => {
                tracing::debug!(?origin, ?direction, "shot fired");
            }
            Event::QuitRequested => tracing::info!("quit requested"),
            _ => {}
        }
    }
}
