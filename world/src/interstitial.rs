//! Scripted snakes and reveal animations shown between levels.

use std::{f64::consts::TAU, time::Duration};

use snake_quest_core::{Direction, GridCoord, LevelKind};

use crate::{arena::Arena, snake::Snake};

/// Length of the wall-reveal animation that precedes a level.
pub const LOADING_DURATION: Duration = Duration::from_millis(2000);

/// Segments in the story interstitial snake.
pub const STORY_SNAKE_LENGTH: usize = 10;

/// Segments in the intro snake.
pub const INTRO_SNAKE_LENGTH: usize = 12;

const STORY_MARGIN: i32 = 2;

/// Clockwise rectangle outline starting at the top-left corner.
#[must_use]
pub fn perimeter_clockwise(left: i32, top: i32, right: i32, bottom: i32) -> Vec<GridCoord> {
    let mut path = Vec::new();
    for x in left..=right {
        path.push(GridCoord::new(x, top));
    }
    for y in top + 1..=bottom {
        path.push(GridCoord::new(right, y));
    }
    for x in (left..right).rev() {
        path.push(GridCoord::new(x, bottom));
    }
    for y in (top + 1..bottom).rev() {
        path.push(GridCoord::new(left, y));
    }
    path
}

/// Looping path followed by the story snake.
#[must_use]
pub fn story_path(width: i32, height: i32) -> Vec<GridCoord> {
    let (mut left, mut top) = (STORY_MARGIN, STORY_MARGIN);
    let (mut right, mut bottom) = (width - STORY_MARGIN - 1, height - STORY_MARGIN - 1);
    if right <= left || bottom <= top {
        left = 1;
        top = 1;
        right = width - 2;
        bottom = height - 2;
    }
    perimeter_clockwise(left, top, right, bottom)
}

/// Sine-wave path across the grid followed once by the intro snake.
///
/// Vertical gaps between consecutive columns are filled so every step moves
/// exactly one cell.
#[must_use]
pub fn intro_path(width: i32, height: i32) -> Vec<GridCoord> {
    let right = (width - 1).max(0);
    let bottom = (height - 1).max(0);
    let mid_y = bottom / 2;
    let span = right.max(1);
    let amplitude = f64::from((height / 10).clamp(1, 3));
    let waves = f64::from((span / 16).max(2));

    let mut path = Vec::new();
    let mut previous_y: Option<i32> = None;
    for x in 0..=right {
        let t = f64::from(x) / f64::from(span);
        let wave = f64::from(mid_y) + amplitude * (t * TAU * waves).sin();
        let target_y = (wave.round() as i32).clamp(0, bottom);

        let Some(mut y) = previous_y else {
            path.push(GridCoord::new(x, target_y));
            previous_y = Some(target_y);
            continue;
        };

        path.push(GridCoord::new(x, y));
        while y != target_y {
            y += (target_y - y).signum();
            path.push(GridCoord::new(x, y));
        }
        previous_y = Some(y);
    }
    path
}

/// Snake that follows a fixed path one cell per step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSnake {
    path: Vec<GridCoord>,
    index: usize,
    length: usize,
    looping: bool,
    snake: Snake,
}

impl PathSnake {
    /// Story snake looping around the rectangle.
    #[must_use]
    pub fn story(width: i32, height: i32) -> Self {
        let path = story_path(width, height);
        let count = path.len().max(1) as i64;
        let segments: Vec<GridCoord> = (0..STORY_SNAKE_LENGTH as i64)
            .filter_map(|i| path.get((-i).rem_euclid(count) as usize).copied())
            .collect();
        let direction = match (segments.first(), segments.get(1)) {
            (Some(head), Some(next)) => {
                Direction::from_delta(head.x() - next.x(), head.y() - next.y())
            }
            _ => None,
        }
        .unwrap_or(Direction::East);
        let snake = Snake::from_segments(segments, direction)
            .unwrap_or_else(|| Snake::new(GridCoord::new(width / 2, height / 2), direction));

        Self {
            path,
            index: 0,
            length: STORY_SNAKE_LENGTH,
            looping: true,
            snake,
        }
    }

    /// Intro snake coiled on the first path cell.
    #[must_use]
    pub fn intro(width: i32, height: i32) -> Self {
        let path = intro_path(width, height);
        let start = path
            .first()
            .copied()
            .unwrap_or_else(|| GridCoord::new(width / 2, height / 2));
        let snake = Snake::from_segments(vec![start; INTRO_SNAKE_LENGTH], Direction::East)
            .unwrap_or_else(|| Snake::new(start, Direction::East));

        Self {
            path,
            index: 0,
            length: INTRO_SNAKE_LENGTH,
            looping: false,
            snake,
        }
    }

    /// Scripted snake body.
    #[must_use]
    pub const fn snake(&self) -> &Snake {
        &self.snake
    }

    /// Path the snake follows.
    #[must_use]
    pub fn path(&self) -> &[GridCoord] {
        &self.path
    }

    /// Index of the path cell under the head.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Moves one cell along the path.
    ///
    /// Returns `true` once a non-looping path was already exhausted.
    pub fn advance(&mut self) -> bool {
        if self.path.is_empty() {
            return !self.looping;
        }
        if !self.looping && self.index + 1 >= self.path.len() {
            return true;
        }

        self.index = (self.index + 1) % self.path.len();
        self.snake.follow(self.path[self.index], self.length);
        false
    }

    /// Fraction of the path covered by the head.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.index as f32 / self.path.len().saturating_sub(1).max(1) as f32
    }

    /// Opacity of the title drawn over the intro: hidden for the first third,
    /// then fading in linearly.
    #[must_use]
    pub fn title_fade(&self) -> f32 {
        if self.path.is_empty() {
            return 1.0;
        }
        let progress = self.progress();
        if progress <= 1.0 / 3.0 {
            return 0.0;
        }
        ((progress - 1.0 / 3.0) / (2.0 / 3.0)).min(1.0)
    }
}

/// Timed reveal of the next level's walls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadingReveal {
    tiles: Vec<GridCoord>,
    revealed: usize,
    elapsed: Duration,
}

impl LoadingReveal {
    /// Orders the arena walls for reveal.
    ///
    /// Bordered levels trace the border clockwise; every other kind reveals
    /// walls row by row.
    #[must_use]
    pub fn new(kind: LevelKind, arena: &Arena) -> Self {
        let tiles = if arena.walls().is_empty() {
            Vec::new()
        } else if kind == LevelKind::Normal {
            perimeter_clockwise(0, 0, arena.width() - 1, arena.height() - 1)
        } else {
            let mut tiles: Vec<GridCoord> = arena.walls().iter().copied().collect();
            tiles.sort_by_key(|cell| (cell.y(), cell.x()));
            tiles
        };

        Self {
            tiles,
            revealed: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Advances the animation and reports whether it has finished.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt);
        let target = (self.progress() * self.tiles.len() as f32) as usize;
        self.revealed = self.revealed.max(target.min(self.tiles.len()));
        self.elapsed >= LOADING_DURATION
    }

    /// Fraction of the animation that has elapsed.
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f32() / LOADING_DURATION.as_secs_f32()).min(1.0)
    }

    /// Every wall in reveal order.
    #[must_use]
    pub fn tiles(&self) -> &[GridCoord] {
        &self.tiles
    }

    /// Walls revealed so far.
    #[must_use]
    pub fn revealed_tiles(&self) -> &[GridCoord] {
        &self.tiles[..self.revealed]
    }
}
