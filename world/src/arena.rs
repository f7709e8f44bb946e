//! Procedural wall layouts for each level kind.

use std::collections::BTreeSet;

use snake_quest_core::{GridCoord, LevelKind};

/// Fixed tetromino table; each shape lists its cells in unscaled units.
pub const TETRIS_SHAPES: [(char, [(i32, i32); 4]); 7] = [
    ('I', [(0, 0), (1, 0), (2, 0), (3, 0)]),
    ('O', [(0, 0), (1, 0), (0, 1), (1, 1)]),
    ('T', [(0, 0), (1, 0), (2, 0), (1, 1)]),
    ('S', [(1, 0), (2, 0), (0, 1), (1, 1)]),
    ('Z', [(0, 0), (1, 0), (1, 1), (2, 1)]),
    ('L', [(0, 0), (0, 1), (0, 2), (1, 2)]),
    ('J', [(1, 0), (1, 1), (1, 2), (0, 2)]),
];

/// Smallest box side allowed in the sacrifice arena.
pub const MIN_SACRIFICE_BOX: i32 = 8;

/// Twin-box partition of a sacrifice arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SacrificeLayout {
    left: BTreeSet<GridCoord>,
    right: BTreeSet<GridCoord>,
    separator_column: i32,
    wall_open: bool,
}

impl SacrificeLayout {
    /// Interior cells of the starting box.
    #[must_use]
    pub fn left(&self) -> &BTreeSet<GridCoord> {
        &self.left
    }

    /// Interior cells of the goal box.
    #[must_use]
    pub fn right(&self) -> &BTreeSet<GridCoord> {
        &self.right
    }

    /// Column of the shared breakable wall.
    #[must_use]
    pub const fn separator_column(&self) -> i32 {
        self.separator_column
    }

    /// Reports whether any separator cell has been destroyed.
    #[must_use]
    pub const fn wall_open(&self) -> bool {
        self.wall_open
    }
}

/// Walls, breakable walls and optional playable region of a level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arena {
    width: i32,
    height: i32,
    walls: BTreeSet<GridCoord>,
    breakable: BTreeSet<GridCoord>,
    playable: Option<BTreeSet<GridCoord>>,
    sacrifice: Option<SacrificeLayout>,
}

impl Arena {
    /// Creates an arena without any walls.
    #[must_use]
    pub fn open(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            walls: BTreeSet::new(),
            breakable: BTreeSet::new(),
            playable: None,
            sacrifice: None,
        }
    }

    /// Derives the layout for the provided level kind from scratch.
    #[must_use]
    pub fn build(kind: LevelKind, width: i32, height: i32) -> Self {
        let mut arena = Self::open(width, height);
        match kind {
            LevelKind::Normal => arena.add_border(),
            LevelKind::Tetris { shape_index } => arena.carve_tetromino(shape_index),
            LevelKind::Sacrifice { index } => arena.add_twin_boxes(index),
            LevelKind::Escape => {
                arena.add_border();
                for y in 0..height {
                    let _ = arena.breakable.insert(GridCoord::new(width - 1, y));
                }
            }
        }
        arena
    }

    /// Number of columns covered by the arena.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows covered by the arena.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Every wall cell that still stands.
    #[must_use]
    pub fn walls(&self) -> &BTreeSet<GridCoord> {
        &self.walls
    }

    /// Wall cells that a breaker shot can destroy.
    #[must_use]
    pub fn breakable(&self) -> &BTreeSet<GridCoord> {
        &self.breakable
    }

    /// Cells the snake may occupy when movement is restricted to a shape.
    #[must_use]
    pub fn playable(&self) -> Option<&BTreeSet<GridCoord>> {
        self.playable.as_ref()
    }

    /// Twin-box partition, present in sacrifice arenas only.
    #[must_use]
    pub fn sacrifice(&self) -> Option<&SacrificeLayout> {
        self.sacrifice.as_ref()
    }

    /// Reports whether the cell holds a standing wall.
    #[must_use]
    pub fn is_wall(&self, cell: GridCoord) -> bool {
        self.walls.contains(&cell)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: GridCoord) -> bool {
        cell.is_within(self.width, self.height)
    }

    /// Destroys a breakable wall, turning it into playable space.
    ///
    /// Returns `false` when the cell is not a standing breakable wall.
    pub fn break_wall(&mut self, cell: GridCoord) -> bool {
        if !self.breakable.remove(&cell) {
            return false;
        }

        let _ = self.walls.remove(&cell);
        if let Some(playable) = self.playable.as_mut() {
            let _ = playable.insert(cell);
        }
        if let Some(layout) = self.sacrifice.as_mut() {
            layout.wall_open = true;
        }
        true
    }

    /// Cells that are inside the playable region and free of walls.
    #[must_use]
    pub fn open_cells(&self) -> Vec<GridCoord> {
        match &self.playable {
            Some(playable) => playable
                .iter()
                .copied()
                .filter(|cell| !self.walls.contains(cell))
                .collect(),
            None => (0..self.height)
                .flat_map(|y| (0..self.width).map(move |x| GridCoord::new(x, y)))
                .filter(|cell| !self.walls.contains(cell))
                .collect(),
        }
    }

    fn add_border(&mut self) {
        for x in 0..self.width {
            let _ = self.walls.insert(GridCoord::new(x, 0));
            let _ = self.walls.insert(GridCoord::new(x, self.height - 1));
        }
        for y in 0..self.height {
            let _ = self.walls.insert(GridCoord::new(0, y));
            let _ = self.walls.insert(GridCoord::new(self.width - 1, y));
        }
    }

    fn add_rect_outline(&mut self, left: i32, top: i32, width: i32, height: i32) {
        for x in left..left + width {
            let _ = self.walls.insert(GridCoord::new(x, top));
            let _ = self.walls.insert(GridCoord::new(x, top + height - 1));
        }
        for y in top..top + height {
            let _ = self.walls.insert(GridCoord::new(left, y));
            let _ = self.walls.insert(GridCoord::new(left + width - 1, y));
        }
    }

    fn carve_tetromino(&mut self, shape_index: usize) {
        let (name, cells) = TETRIS_SHAPES[shape_index % TETRIS_SHAPES.len()];
        let max_x = cells.iter().map(|(x, _)| *x).max().unwrap_or(0);
        let max_y = cells.iter().map(|(_, y)| *y).max().unwrap_or(0);
        let max_scale_x = ((self.width - 4) / (max_x + 1)).max(1);
        let max_scale_y = ((self.height - 4) / (max_y + 1)).max(1);
        let max_scale = max_scale_x.min(max_scale_y);
        let scale = if matches!(name, 'I' | 'O' | 'T') {
            (max_scale - 1).max(3)
        } else {
            (max_scale - 2).max(3)
        };

        let shape_width = (max_x + 1) * scale;
        let shape_height = (max_y + 1) * scale;
        let origin_x = ((self.width - shape_width) / 2).max(1);
        let origin_y = ((self.height - shape_height) / 2).max(1);

        let mut playable = BTreeSet::new();
        for (bx, by) in cells {
            let start_x = origin_x + bx * scale;
            let start_y = origin_y + by * scale;
            for dx in 0..scale {
                for dy in 0..scale {
                    let _ = playable.insert(GridCoord::new(start_x + dx, start_y + dy));
                }
            }
        }

        for y in 0..self.height {
            for x in 0..self.width {
                let cell = GridCoord::new(x, y);
                if !playable.contains(&cell) {
                    let _ = self.walls.insert(cell);
                }
            }
        }
        self.playable = Some(playable);
    }

    fn add_twin_boxes(&mut self, index: u32) {
        let index = i32::try_from(index).unwrap_or(i32::MAX / 4);
        let base_width = ((self.width - 3) / 2).max(12);
        let base_height = (self.height - 4).max(12);
        let mut box_width = (base_width - index).max(MIN_SACRIFICE_BOX);
        let box_height = (base_height - index * 2).max(MIN_SACRIFICE_BOX);

        let mut total_width = box_width * 2 - 1;
        if total_width > self.width - 2 {
            box_width = ((self.width - 1) / 2).max(MIN_SACRIFICE_BOX);
            total_width = box_width * 2 - 1;
        }

        let left_x = ((self.width - total_width) / 2).max(1);
        let top_y = ((self.height - box_height) / 2).max(1);
        let right_x = left_x + box_width - 1;

        let interior = |origin_x: i32| -> BTreeSet<GridCoord> {
            (origin_x + 1..origin_x + box_width - 1)
                .flat_map(|x| (top_y + 1..top_y + box_height - 1).map(move |y| GridCoord::new(x, y)))
                .collect()
        };
        let left = interior(left_x);
        let right = interior(right_x);
        let playable = left.union(&right).copied().collect();

        self.add_rect_outline(left_x, top_y, box_width, box_height);
        self.add_rect_outline(right_x, top_y, box_width, box_height);
        for y in top_y..top_y + box_height {
            let _ = self.breakable.insert(GridCoord::new(right_x, y));
        }

        self.playable = Some(playable);
        self.sacrifice = Some(SacrificeLayout {
            left,
            right,
            separator_column: right_x,
            wall_open: false,
        });
    }
}
