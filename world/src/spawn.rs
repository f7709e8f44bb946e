//! Spawn-point selection and reachability checks.

use std::collections::{BTreeSet, VecDeque};

use rand::{seq::SliceRandom, Rng};
use snake_quest_core::{CellRect, Direction, GridCoord, LevelKind, FIRST_TETRIS_LEVEL};

use crate::{arena::Arena, snake::Snake};

/// Preferred Manhattan distance between a spawn point and the nearest wall.
pub const MIN_WALL_GAP: i32 = 8;

/// Button and key cells of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    button: GridCoord,
    key: GridCoord,
}

impl Gate {
    /// Creates a gate pair.
    #[must_use]
    pub const fn new(button: GridCoord, key: GridCoord) -> Self {
        Self { button, key }
    }

    /// Cell the body must pass over.
    #[must_use]
    pub const fn button(&self) -> GridCoord {
        self.button
    }

    /// Cell the head must reach.
    #[must_use]
    pub const fn key(&self) -> GridCoord {
        self.key
    }

    fn covers(&self, cell: GridCoord) -> bool {
        self.button == cell || self.key == cell
    }
}

/// Cells food must avoid beyond the arena itself.
#[derive(Clone, Copy, Debug)]
pub struct FoodConstraints<'a> {
    /// Snake whose body blocks placement.
    pub snake: &'a Snake,
    /// Gate pair, if the level has one.
    pub gate: Option<Gate>,
    /// Boss footprint, if visible.
    pub footprint: Option<CellRect>,
    /// Leftmost column food may use.
    pub min_column: i32,
}

/// Manhattan distance to the closest wall, or to the grid edge without walls.
#[must_use]
pub fn distance_to_nearest_wall(
    cell: GridCoord,
    walls: &BTreeSet<GridCoord>,
    width: i32,
    height: i32,
) -> i32 {
    if walls.is_empty() {
        return cell
            .x()
            .min(cell.y())
            .min(width - 1 - cell.x())
            .min(height - 1 - cell.y());
    }

    walls
        .iter()
        .map(|wall| cell.manhattan_distance(*wall))
        .min()
        .unwrap_or(0)
}

/// Picks a spawn cell that keeps at least `min_gap` away from every wall.
///
/// A random cell among those meeting the gap is returned. Without any, the
/// first cell farthest from the walls wins.
pub fn choose_spawn<R: Rng>(
    candidates: &[GridCoord],
    arena: &Arena,
    min_gap: i32,
    rng: &mut R,
) -> Option<GridCoord> {
    let mut safe = Vec::new();
    let mut best: Option<(GridCoord, i32)> = None;
    for &cell in candidates {
        let distance = distance_to_nearest_wall(cell, arena.walls(), arena.width(), arena.height());
        if distance >= min_gap {
            safe.push(cell);
        }
        if best.map_or(true, |(_, best_distance)| distance > best_distance) {
            best = Some((cell, distance));
        }
    }

    safe.choose(rng)
        .copied()
        .or_else(|| best.map(|(cell, _)| cell))
}

/// Breadth-first flood fill from `start` restricted to `allowed` minus walls.
///
/// Returns an empty set when `start` itself is not allowed.
#[must_use]
pub fn reachable_cells(
    start: GridCoord,
    allowed: &BTreeSet<GridCoord>,
    walls: &BTreeSet<GridCoord>,
) -> BTreeSet<GridCoord> {
    let mut visited = BTreeSet::new();
    if !allowed.contains(&start) {
        return visited;
    }

    let mut queue = VecDeque::new();
    let _ = visited.insert(start);
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        for neighbor in neighbors(cell) {
            if visited.contains(&neighbor) || !allowed.contains(&neighbor) {
                continue;
            }
            if walls.contains(&neighbor) {
                continue;
            }
            let _ = visited.insert(neighbor);
            queue.push_back(neighbor);
        }
    }

    visited
}

/// Food candidates in a sacrifice arena as seen from the snake's head.
///
/// Once the separator is open both boxes qualify. Otherwise only the region
/// reachable from the head does, falling back to the starting box.
#[must_use]
pub fn sacrifice_food_candidates(arena: &Arena, head: GridCoord) -> BTreeSet<GridCoord> {
    let (Some(layout), Some(playable)) = (arena.sacrifice(), arena.playable()) else {
        return BTreeSet::new();
    };

    if layout.wall_open() {
        return playable.clone();
    }

    let reachable = reachable_cells(head, playable, arena.walls());
    if !reachable.is_empty() {
        return reachable;
    }

    if layout.left().is_empty() {
        playable.clone()
    } else {
        layout.left().clone()
    }
}

/// Chooses a free food cell, or `None` when the arena is full.
pub fn place_food<R: Rng>(
    arena: &Arena,
    constraints: &FoodConstraints<'_>,
    rng: &mut R,
) -> Option<GridCoord> {
    let mut candidates: Vec<GridCoord> = match arena.sacrifice() {
        Some(_) => sacrifice_food_candidates(arena, constraints.snake.head())
            .into_iter()
            .collect(),
        None => arena.open_cells(),
    };
    candidates.shuffle(rng);

    candidates.into_iter().find(|cell| {
        !constraints.snake.contains(*cell)
            && !constraints.gate.is_some_and(|gate| gate.covers(*cell))
            && !constraints
                .footprint
                .is_some_and(|footprint| footprint.contains(*cell))
            && !arena.is_wall(*cell)
            && cell.x() >= constraints.min_column
    })
}

/// Places the button and key for a level; levels without a gate yield `None`.
pub fn place_gate<R: Rng>(
    kind: LevelKind,
    level: u32,
    arena: &Arena,
    head: GridCoord,
    rng: &mut R,
) -> Option<Gate> {
    match kind {
        LevelKind::Normal => Some(place_linear_gate(level, arena, head, rng)),
        LevelKind::Tetris { .. } => {
            let playable = arena.playable()?;
            let offset = i32::try_from(level.saturating_sub(FIRST_TETRIS_LEVEL) % 3).unwrap_or(0);
            let mut candidates: Vec<GridCoord> = playable.iter().copied().collect();
            candidates.shuffle(rng);
            Some(pick_gate(&candidates, head, 6 + offset * 2, |cell| arena.is_wall(cell)))
        }
        LevelKind::Sacrifice { .. } => {
            let layout = arena.sacrifice()?;
            if layout.right().is_empty() {
                return None;
            }
            let mut candidates: Vec<GridCoord> = layout.right().iter().copied().collect();
            candidates.shuffle(rng);
            Some(pick_gate(&candidates, head, 0, |_| false))
        }
        LevelKind::Escape => None,
    }
}

fn pick_gate<F>(candidates: &[GridCoord], head: GridCoord, min_gap: i32, blocked: F) -> Gate
where
    F: Fn(GridCoord) -> bool,
{
    let button = candidates
        .iter()
        .copied()
        .find(|cell| *cell != head && !blocked(*cell))
        .unwrap_or(head);
    let key = candidates
        .iter()
        .copied()
        .find(|cell| {
            *cell != button && *cell != head && cell.manhattan_distance(button) >= min_gap
        })
        .unwrap_or(button);
    Gate::new(button, key)
}

fn place_linear_gate<R: Rng>(level: u32, arena: &Arena, head: GridCoord, rng: &mut R) -> Gate {
    let width = arena.width();
    let height = arena.height();
    let level = i32::try_from(level).unwrap_or(i32::MAX / 2);
    let min_gap = (width.max(height) - 2).min(4 + level);

    let (mut button, mut key) = if rng.gen_bool(0.5) {
        let y = rng.gen_range(2..=(height - 3).max(2));
        let start_x = rng.gen_range(1..=(width - min_gap - 2).max(1));
        (
            GridCoord::new(start_x, y),
            GridCoord::new((start_x + min_gap).min(width - 2), y),
        )
    } else {
        let x = rng.gen_range(2..=(width - 3).max(2));
        let start_y = rng.gen_range(1..=(height - min_gap - 2).max(1));
        (
            GridCoord::new(x, start_y),
            GridCoord::new(x, (start_y + min_gap).min(height - 2)),
        )
    };

    if button == head || arena.is_wall(button) {
        button = GridCoord::new(button.x(), (button.y() - 1).max(0));
    }
    if key == head || arena.is_wall(key) {
        key = GridCoord::new(key.x(), (key.y() + 1).min(height - 1));
    }
    Gate::new(button, key)
}

fn neighbors(cell: GridCoord) -> impl Iterator<Item = GridCoord> {
    Direction::ALL.into_iter().map(move |direction| cell.offset(direction))
}
