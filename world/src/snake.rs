//! Discrete snake body and its interpolation support.

use glam::Vec2;
use snake_quest_core::{Direction, GridCoord};

/// Number of frames in the head chewing animation.
pub const HEAD_FRAME_COUNT: usize = 3;

/// Ordered snake body with the head stored at index zero.
///
/// The body is mutated once per discrete step. A snapshot of the segments
/// taken before each step is kept so presentation layers can blend between
/// the previous and the current layout without touching gameplay state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    segments: Vec<GridCoord>,
    previous_segments: Vec<GridCoord>,
    direction: Direction,
    pending_direction: Direction,
    grow_pending: u32,
    steps: u64,
}

impl Snake {
    /// Creates a single-segment snake facing the provided direction.
    #[must_use]
    pub fn new(head: GridCoord, direction: Direction) -> Self {
        Self {
            segments: vec![head],
            previous_segments: vec![head],
            direction,
            pending_direction: direction,
            grow_pending: 0,
            steps: 0,
        }
    }

    /// Creates a snake from explicit segments, head first.
    ///
    /// Returns `None` when no segments are provided.
    #[must_use]
    pub fn from_segments(segments: Vec<GridCoord>, direction: Direction) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }

        Some(Self {
            previous_segments: segments.clone(),
            segments,
            direction,
            pending_direction: direction,
            grow_pending: 0,
            steps: 0,
        })
    }

    /// Cell occupied by the head.
    #[must_use]
    pub fn head(&self) -> GridCoord {
        self.segments[0]
    }

    /// Cell occupied by the last segment.
    #[must_use]
    pub fn tail(&self) -> GridCoord {
        self.segments[self.segments.len() - 1]
    }

    /// Current segments, head first.
    #[must_use]
    pub fn segments(&self) -> &[GridCoord] {
        &self.segments
    }

    /// Segments captured before the most recent step.
    #[must_use]
    pub fn previous_segments(&self) -> &[GridCoord] {
        &self.previous_segments
    }

    /// Number of segments in the body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; a snake keeps at least its head.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Direction applied by the most recent step.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Direction that the next step will apply.
    #[must_use]
    pub const fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    /// Steps that will extend the body instead of translating it.
    #[must_use]
    pub const fn grow_pending(&self) -> u32 {
        self.grow_pending
    }

    /// Index of the head animation frame.
    #[must_use]
    pub fn head_frame(&self) -> usize {
        (self.steps % HEAD_FRAME_COUNT as u64) as usize
    }

    /// Requests a new heading for the next step.
    ///
    /// Reversals of the current direction are rejected and reported as `false`.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.direction.is_opposite(direction) {
            return false;
        }

        self.pending_direction = direction;
        true
    }

    /// Moves the head one cell along the pending direction.
    pub fn step(&mut self) {
        let _ = self.step_with(|head, direction| Some(head.offset(direction)));
    }

    /// Moves the head to the cell chosen by `next_head`.
    ///
    /// The closure receives the current head and the newly applied direction.
    /// Returning `None` keeps the body in place for this step. Reports whether
    /// the body moved.
    pub fn step_with<F>(&mut self, next_head: F) -> bool
    where
        F: FnOnce(GridCoord, Direction) -> Option<GridCoord>,
    {
        self.previous_segments.clone_from(&self.segments);
        self.direction = self.pending_direction;
        self.steps = self.steps.wrapping_add(1);

        let Some(head) = next_head(self.head(), self.direction) else {
            return false;
        };

        self.segments.insert(0, head);
        if self.grow_pending > 0 {
            self.grow_pending -= 1;
        } else {
            let _ = self.segments.pop();
        }
        true
    }

    /// Schedules `amount` steps of growth and returns the tail that will extend.
    pub fn grow(&mut self, amount: u32) -> GridCoord {
        self.grow_pending = self.grow_pending.saturating_add(amount);
        self.tail()
    }

    /// Pays for a shot with banked growth or, failing that, the tail segment.
    pub fn shed_for_shot(&mut self) {
        if self.grow_pending > 0 {
            self.grow_pending -= 1;
        } else if self.segments.len() > 1 {
            let _ = self.segments.pop();
        }
    }

    /// Reports whether any segment occupies the cell.
    #[must_use]
    pub fn contains(&self, cell: GridCoord) -> bool {
        self.segments.contains(&cell)
    }

    /// Reports whether any segment behind the head occupies the cell.
    #[must_use]
    pub fn body_contains(&self, cell: GridCoord) -> bool {
        self.segments[1..].contains(&cell)
    }

    /// Reports whether the head shares its cell with the body.
    #[must_use]
    pub fn head_hits_body(&self) -> bool {
        self.body_contains(self.head())
    }

    /// Places the snake on new segments without animating the jump.
    pub fn relocate(&mut self, segments: Vec<GridCoord>, direction: Direction) {
        if segments.is_empty() {
            return;
        }
        self.previous_segments.clone_from(&segments);
        self.segments = segments;
        self.direction = direction;
        self.pending_direction = direction;
    }

    /// Advances a scripted snake onto `head`, keeping at most `length` segments.
    pub fn follow(&mut self, head: GridCoord, length: usize) {
        self.previous_segments.clone_from(&self.segments);
        if let Some(direction) = heading_between(self.head(), head) {
            self.direction = direction;
            self.pending_direction = direction;
        }
        self.segments.insert(0, head);
        self.segments.truncate(length.max(1));
        self.steps = self.steps.wrapping_add(1);
    }

    /// Blends every segment between its previous and current cell.
    ///
    /// `alpha` is clamped to `[0, 1]`. When the snapshots differ in length the
    /// shorter one is padded with its last cell.
    #[must_use]
    pub fn interpolated_positions(&self, alpha: f32) -> Vec<Vec2> {
        let alpha = alpha.clamp(0.0, 1.0);
        let count = self.segments.len().max(self.previous_segments.len());
        (0..count)
            .filter_map(|index| {
                let current = padded(&self.segments, index)?;
                let previous = padded(&self.previous_segments, index).unwrap_or(current);
                Some(cell_vec(previous).lerp(cell_vec(current), alpha))
            })
            .collect()
    }

    /// Heading used to orient the sprite of the segment at `index`.
    ///
    /// The head uses the vector between its previous and current cell; every
    /// other segment faces its neighbour toward the head.
    #[must_use]
    pub fn segment_orientation(&self, index: usize) -> Direction {
        let heading = if index == 0 {
            self.previous_segments
                .first()
                .and_then(|previous| heading_between(*previous, self.head()))
        } else {
            match (self.segments.get(index), self.segments.get(index - 1)) {
                (Some(segment), Some(toward_head)) => heading_between(*segment, *toward_head),
                _ => None,
            }
        };
        heading.unwrap_or(self.direction)
    }
}

/// Resolves the heading from one cell to an adjacent one.
///
/// Jumps larger than one cell along an axis are treated as wrap-arounds.
#[must_use]
pub fn heading_between(from: GridCoord, to: GridCoord) -> Option<Direction> {
    let mut dx = to.x() - from.x();
    let mut dy = to.y() - from.y();
    if dx.abs() > 1 {
        dx = -dx.signum();
    }
    if dy.abs() > 1 {
        dy = -dy.signum();
    }
    Direction::from_delta(dx, dy)
}

fn padded(cells: &[GridCoord], index: usize) -> Option<GridCoord> {
    cells.get(index).or_else(|| cells.last()).copied()
}

fn cell_vec(cell: GridCoord) -> Vec2 {
    Vec2::new(cell.x() as f32, cell.y() as f32)
}
