//! Presentation-only views derived from world events and snapshots.
//!
//! Nothing here feeds back into the simulation. The fade tracker replays the
//! same events the systems receive and keeps its own bookkeeping.

use snake_quest_core::{Direction, Event, GridCoord, Screen};

/// Alpha gained by a fading segment on every step, out of 255.
pub const FADE_STEP: u16 = 40;

const OPAQUE: u16 = 255;

/// Tracks tail cells that fade in while the body grows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FadeTracker {
    fading: Vec<(GridCoord, u16)>,
}

impl FadeTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates fades from the events produced by the world.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SnakeGrew { tail } => self.fading.push((*tail, 0)),
                Event::SnakeAdvanced { .. } => self.advance(),
                Event::LevelStarted { .. } => self.fading.clear(),
                Event::ScreenChanged {
                    screen: Screen::Menu { .. } | Screen::Loading,
                } => self.fading.clear(),
                _ => {}
            }
        }
    }

    fn advance(&mut self) {
        for (_, alpha) in &mut self.fading {
            *alpha = (*alpha + FADE_STEP).min(OPAQUE);
        }
        self.fading.retain(|(_, alpha)| *alpha < OPAQUE);
    }

    /// Opacity for a body segment drawn at `cell`.
    #[must_use]
    pub fn alpha_at(&self, cell: GridCoord) -> f32 {
        self.fading
            .iter()
            .find(|(fading, _)| *fading == cell)
            .map_or(1.0, |(_, alpha)| f32::from(*alpha) / f32::from(OPAQUE))
    }

    /// Number of segments still fading in.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fading.len()
    }

    /// Reports whether no segment is fading.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fading.is_empty()
    }
}

/// Ring drawn for a wall explosion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplosionRing {
    /// Ring radius in cells.
    pub radius: f32,
    /// Ring opacity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl ExplosionRing {
    /// Ring geometry at the provided animation progress.
    #[must_use]
    pub fn at(progress: f32) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        Self {
            radius: 0.2 + 0.9 * progress,
            alpha: (220.0 * (1.0 - progress)) / 255.0,
        }
    }
}

/// Rotation for a sprite whose artwork faces east.
#[must_use]
pub fn rotation_for(direction: Direction) -> f32 {
    f32::from(direction.angle_degrees())
}
