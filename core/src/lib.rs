#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Snake Quest engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative game state, and pure systems. Adapters translate device
//! input into logical [`Intent`] values, systems turn intents and elapsed
//! time into [`Command`] values, the game state executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values that systems
//! and presentation layers react to deterministically.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Title presented by windowed adapters.
pub const WINDOW_TITLE: &str = "Snake Quest - Gates & Keys";

/// Number of grid columns in the playfield.
pub const GRID_WIDTH: i32 = 30;

/// Number of grid rows in the playfield.
pub const GRID_HEIGHT: i32 = 20;

/// Side length of a single grid cell expressed in pixels.
pub const TILE_SIZE: u32 = 20;

/// Height of the HUD band drawn above the playfield, in pixels.
pub const HUD_HEIGHT: u32 = 40;

/// Number of discrete gameplay steps per second at the normal speed preset.
pub const BASE_STEP_RATE: f64 = 10.0;

/// Largest frame delta accepted by the simulation.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(200);

/// Interval between story interstitial snake steps.
pub const STORY_STEP_INTERVAL: Duration = Duration::from_millis(140);

/// Interval between intro snake steps.
pub const INTRO_STEP_INTERVAL: Duration = Duration::from_millis(90);

/// Final level that uses the plain bordered arena.
pub const LAST_NORMAL_LEVEL: u32 = 5;

/// First level played inside a tetromino-shaped arena.
pub const FIRST_TETRIS_LEVEL: u32 = LAST_NORMAL_LEVEL + 1;

/// Number of tetromino shapes, one per Tetris level.
pub const TETRIS_SHAPE_COUNT: u32 = 7;

/// Final Tetris level.
pub const LAST_TETRIS_LEVEL: u32 = FIRST_TETRIS_LEVEL + TETRIS_SHAPE_COUNT - 1;

/// First level built around the twin-box sacrifice arena.
pub const FIRST_SACRIFICE_LEVEL: u32 = LAST_TETRIS_LEVEL + 1;

/// Number of sacrifice levels.
pub const SACRIFICE_LEVEL_COUNT: u32 = 5;

/// Final sacrifice level.
pub const LAST_SACRIFICE_LEVEL: u32 = FIRST_SACRIFICE_LEVEL + SACRIFICE_LEVEL_COUNT - 1;

/// Level whose breakable right edge leads into the side-scroller.
pub const ESCAPE_LEVEL: u32 = LAST_SACRIFICE_LEVEL + 1;

/// Location of a single grid cell expressed as signed column and row coordinates.
///
/// Coordinates are signed so a head that left the grid can still be
/// represented and rejected by collision checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: i32,
    y: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the neighbouring coordinate one cell away in the provided direction.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub const fn manhattan_distance(self, other: GridCoord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Reports whether the coordinate lies inside a grid of the provided size.
    #[must_use]
    pub const fn is_within(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width && self.y < height
    }
}

/// Axis-aligned rectangle of grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRect {
    origin: GridCoord,
    width: i32,
    height: i32,
}

impl CellRect {
    /// Creates a rectangle anchored at its upper-left cell.
    #[must_use]
    pub const fn new(origin: GridCoord, width: i32, height: i32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Upper-left cell of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> GridCoord {
        self.origin
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub const fn contains(&self, cell: GridCoord) -> bool {
        cell.x >= self.origin.x
            && cell.y >= self.origin.y
            && cell.x < self.origin.x + self.width
            && cell.y < self.origin.y + self.height
    }
}

/// Cardinal movement directions available to the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit grid offset travelled by one step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Reports whether `other` would reverse this direction in place.
    #[must_use]
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Sprite rotation associated with the direction, counter-clockwise from east.
    #[must_use]
    pub const fn angle_degrees(self) -> u16 {
        match self {
            Self::East => 0,
            Self::North => 90,
            Self::West => 180,
            Self::South => 270,
        }
    }

    /// Resolves a unit offset back into a direction.
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::North),
            (1, 0) => Some(Self::East),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }
}

/// Arena and rule set selected by a level number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelKind {
    /// Bordered rectangle with a gate pair.
    Normal,
    /// Tetromino-shaped arena.
    Tetris {
        /// Index into the fixed tetromino table.
        shape_index: usize,
    },
    /// Twin boxes separated by a breakable wall.
    Sacrifice {
        /// Zero-based position within the sacrifice range; boxes shrink as it grows.
        index: u32,
    },
    /// Bordered arena whose right edge can be shot open.
    Escape,
}

impl LevelKind {
    /// Derives the level kind from a level number.
    #[must_use]
    pub const fn for_level(level: u32) -> Self {
        if level <= LAST_NORMAL_LEVEL {
            Self::Normal
        } else if level <= LAST_TETRIS_LEVEL {
            Self::Tetris {
                shape_index: ((level - FIRST_TETRIS_LEVEL) % TETRIS_SHAPE_COUNT) as usize,
            }
        } else if level <= LAST_SACRIFICE_LEVEL {
            Self::Sacrifice {
                index: level - FIRST_SACRIFICE_LEVEL,
            }
        } else {
            Self::Escape
        }
    }

    /// Reports whether the breaker shot can be fired in this kind of level.
    #[must_use]
    pub const fn allows_breaker_shot(self) -> bool {
        matches!(self, Self::Sacrifice { .. } | Self::Escape)
    }
}

/// Number of foods that must be eaten before the key unlocks.
#[must_use]
pub const fn required_food(level: u32) -> u32 {
    match level {
        1 => 2,
        2 => 3,
        _ => 5,
    }
}

/// Narrative interstitials shown between level ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoryBeat {
    /// Shown when a new run starts.
    Opening,
    /// Shown after the last normal level.
    Midpoint,
    /// Shown after the last Tetris level.
    Sacrifice,
    /// Shown after the last sacrifice level.
    Escape,
    /// Shown when the snake slips through the broken right edge.
    Breakout,
    /// Shown once the boss has been defeated.
    Victory,
}

impl StoryBeat {
    /// Headline displayed for the interstitial.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Opening => "Find the button, then claim the key",
            Self::Midpoint => "The walls start to bend",
            Self::Sacrifice => "Every shot costs a piece of you",
            Self::Escape => "The last wall is thin",
            Self::Breakout => "Something waits beyond the edge",
            Self::Victory => "The guardian falls",
        }
    }
}

/// Pages reachable from the title menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MenuPage {
    /// Start, settings and quit.
    Main,
    /// Speed, sound and leaderboard rows.
    Settings,
    /// High score table.
    Leaderboard,
}

/// Named top-level state used by adapters to select what to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Decorative snake animation shown before the menu.
    Intro,
    /// Title menu on the provided page.
    Menu {
        /// Active page of the menu.
        page: MenuPage,
    },
    /// Modal narrative interstitial.
    Story {
        /// Interstitial being shown.
        beat: StoryBeat,
    },
    /// Timed wall-reveal animation preceding a level.
    Loading,
    /// Grid-based gameplay.
    Playing,
    /// Gameplay frozen until the player resumes.
    Paused,
    /// Level goal reached, awaiting acknowledgement.
    LevelClear,
    /// Snake died, optional name entry.
    GameOver,
    /// Scrolling boss encounter entered from the escape level.
    SideScroller,
}

impl Screen {
    /// Reports whether the snake is under player control on this screen.
    #[must_use]
    pub const fn is_gameplay(self) -> bool {
        matches!(self, Self::Playing | Self::SideScroller)
    }
}

/// Movement speed presets selectable from the settings menu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedSetting {
    /// Half the base rate.
    Slow,
    /// The base rate.
    #[default]
    Normal,
    /// One and a half times the base rate.
    Fast,
}

impl SpeedSetting {
    /// Presets in menu order.
    pub const ALL: [SpeedSetting; 3] = [Self::Slow, Self::Normal, Self::Fast];

    /// Multiplier applied to [`BASE_STEP_RATE`].
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Slow => 0.5,
            Self::Normal => 1.0,
            Self::Fast => 1.5,
        }
    }

    /// Label shown in the settings menu.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
        }
    }

    /// Duration of one gameplay step at this speed.
    #[must_use]
    pub fn step_interval(self) -> Duration {
        Duration::from_secs_f64(1.0 / (BASE_STEP_RATE * self.multiplier()))
    }

    /// Next preset, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Slow => Self::Normal,
            Self::Normal => Self::Fast,
            Self::Fast => Self::Slow,
        }
    }

    /// Previous preset, wrapping around.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self {
            Self::Slow => Self::Fast,
            Self::Normal => Self::Slow,
            Self::Fast => Self::Normal,
        }
    }

    /// Preset bound to a digit key on the settings page.
    #[must_use]
    pub const fn from_shortcut(key: char) -> Option<Self> {
        match key {
            '1' => Some(Self::Slow),
            '2' => Some(Self::Normal),
            '3' => Some(Self::Fast),
            _ => None,
        }
    }
}

/// Player-adjustable settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settings {
    /// Movement speed preset.
    pub speed: SpeedSetting,
    /// Whether sound is enabled.
    pub sound_on: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: SpeedSetting::Normal,
            sound_on: true,
        }
    }
}

/// Device-agnostic input reported by adapters, one value per key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Directional intent toward decreasing rows.
    Up,
    /// Directional intent toward increasing rows.
    Down,
    /// Directional intent toward decreasing columns.
    Left,
    /// Directional intent toward increasing columns.
    Right,
    /// Enter: select, pause, resume or save.
    Confirm,
    /// Space: continue past a modal screen.
    Advance,
    /// Escape: back out or quit.
    Cancel,
    /// Fire a shot where shooting is available.
    Fire,
    /// Delete the last typed character.
    Erase,
    /// A printable character typed by the player.
    Text(char),
    /// Debug shortcut that skips the current level.
    ///
    /// Only honoured when the debug-command channel is compiled in.
    SkipLevel,
    /// Debug shortcut that jumps straight to the boss fight.
    ///
    /// Only honoured when the debug-command channel is compiled in.
    JumpToBoss,
}

impl Intent {
    /// Direction carried by a directional intent.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::North),
            Self::Down => Some(Direction::South),
            Self::Left => Some(Direction::West),
            Self::Right => Some(Direction::East),
            _ => None,
        }
    }
}

/// Developer shortcuts kept off the player-facing command surface.
#[cfg(feature = "debug-commands")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugCommand {
    /// Finish whatever the current screen is waiting for.
    SkipLevel,
    /// Enter the side-scroller with the boss already approaching.
    JumpToBoss,
}

/// Reasons a run can end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Head left the grid.
    OutOfBounds,
    /// Head struck a wall cell.
    Wall,
    /// Head left the twin-box interiors of a sacrifice arena.
    LeftArena,
    /// Head ran into the snake's own body.
    SelfCollision,
    /// Head touched the boss.
    BossContact,
    /// A boss bullet reached a body segment.
    BossBullet,
}

/// Movement phase of the side-scroller boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BossPhase {
    /// Off-screen, waiting for the trigger fade to finish.
    Hidden,
    /// Sliding in from the right edge.
    Approach,
    /// Patrolling vertically and firing.
    Active,
    /// Hit points exhausted.
    Defeated,
}

/// Commands that express all permissible game state mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances continuous simulation by the provided frame delta.
    Tick {
        /// Frame delta; clamped to [`MAX_FRAME_DELTA`] by the game state.
        dt: Duration,
    },
    /// Executes one discrete step for the active screen.
    Step,
    /// Ends the intro animation early.
    SkipIntro,
    /// Moves the menu cursor or adjusts the highlighted setting.
    NavigateMenu {
        /// Direction of the navigation key.
        direction: Direction,
    },
    /// Activates the highlighted menu entry.
    SelectMenuEntry,
    /// Picks a speed preset directly from the settings page.
    SelectSpeed {
        /// Preset to apply.
        speed: SpeedSetting,
    },
    /// Returns to the previous menu page.
    MenuBack,
    /// Starts a new run from the configured start level.
    StartGame,
    /// Requests a direction change for the snake.
    QueueDirection {
        /// Requested heading.
        direction: Direction,
    },
    /// Fires a breaker shot or a side-scroller shot.
    Fire,
    /// Freezes gameplay.
    Pause,
    /// Resumes frozen gameplay.
    Resume,
    /// Dismisses the active story interstitial.
    AdvanceStory,
    /// Acknowledges a cleared level.
    AcknowledgeLevelClear,
    /// Abandons the run and returns to the title menu.
    ExitToMenu,
    /// Restarts the current level from its checkpoint.
    ReplayLevel,
    /// Appends a character to the game-over name entry.
    EditName {
        /// Typed character.
        character: char,
    },
    /// Removes the last character of the game-over name entry.
    EraseNameCharacter,
    /// Submits the current score to the leaderboard.
    RecordScore,
    /// Stops the session.
    Quit,
    /// Developer shortcut.
    #[cfg(feature = "debug-commands")]
    Debug {
        /// Shortcut to execute.
        command: DebugCommand,
    },
}

/// Events broadcast by the game state after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Continuous simulation advanced.
    TimeAdvanced {
        /// Clamped frame delta that was applied.
        dt: Duration,
    },
    /// The named top-level state changed.
    ScreenChanged {
        /// Screen that became active.
        screen: Screen,
    },
    /// Player settings changed.
    SettingsChanged {
        /// Settings after the change.
        settings: Settings,
    },
    /// A level finished loading and gameplay began.
    LevelStarted {
        /// Level number.
        level: u32,
        /// Arena and rule set of the level.
        kind: LevelKind,
    },
    /// The snake completed a discrete step.
    SnakeAdvanced {
        /// Head position after the step.
        head: GridCoord,
    },
    /// Growth was scheduled; the current tail fades in as the body extends.
    SnakeGrew {
        /// Tail cell at the time growth was scheduled.
        tail: GridCoord,
    },
    /// Food was consumed.
    FoodEaten {
        /// Cell the food occupied.
        cell: GridCoord,
        /// Score after eating.
        points: u32,
    },
    /// A shot left the snake's head.
    ShotFired {
        /// Head cell at launch.
        origin: GridCoord,
        /// Travel direction.
        direction: Direction,
    },
    /// A breakable wall was destroyed.
    WallBroken {
        /// Cell that stopped being a wall.
        cell: GridCoord,
    },
    /// The snake died.
    SnakeDied {
        /// What killed it.
        cause: DeathCause,
    },
    /// The level goal was reached.
    LevelCleared {
        /// Level number that was cleared.
        level: u32,
    },
    /// The boss entered a new phase.
    BossPhaseChanged {
        /// Phase after the change.
        phase: BossPhase,
    },
    /// A player shot struck the boss.
    BossHit {
        /// Hit points left.
        remaining: u32,
    },
    /// A score should be inserted into the leaderboard.
    ScoreSubmitted {
        /// Raw name typed by the player.
        name: String,
        /// Final score.
        score: u32,
    },
    /// The session should stop.
    QuitRequested,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = GridCoord::new(2, 3);
        let target = GridCoord::new(-1, 7);
        assert_eq!(origin.manhattan_distance(target), 7);
    }

    #[test]
    fn level_ranges_select_expected_kinds() {
        assert_eq!(LevelKind::for_level(1), LevelKind::Normal);
        assert_eq!(LevelKind::for_level(5), LevelKind::Normal);
        assert_eq!(
            LevelKind::for_level(6),
            LevelKind::Tetris { shape_index: 0 }
        );
        assert_eq!(
            LevelKind::for_level(12),
            LevelKind::Tetris { shape_index: 6 }
        );
        assert_eq!(LevelKind::for_level(13), LevelKind::Sacrifice { index: 0 });
        assert_eq!(LevelKind::for_level(17), LevelKind::Sacrifice { index: 4 });
        assert_eq!(LevelKind::for_level(18), LevelKind::Escape);
    }

    #[test]
    fn food_quota_grows_over_first_levels() {
        assert_eq!(required_food(1), 2);
        assert_eq!(required_food(2), 3);
        assert_eq!(required_food(3), 5);
        assert_eq!(required_food(14), 5);
    }

    #[test]
    fn opposite_directions_are_detected_for_every_axis() {
        for direction in Direction::ALL {
            assert!(direction.is_opposite(direction.opposite()));
            assert!(!direction.is_opposite(direction));
            let (dx, dy) = direction.delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(direction));
        }
    }

    #[test]
    fn speed_presets_scale_step_interval() {
        assert_eq!(
            SpeedSetting::Normal.step_interval(),
            Duration::from_millis(100)
        );
        assert_eq!(SpeedSetting::Slow.step_interval(), Duration::from_millis(200));
        assert!(SpeedSetting::Fast.step_interval() < Duration::from_millis(67));
        assert_eq!(SpeedSetting::Fast.next(), SpeedSetting::Slow);
        assert_eq!(SpeedSetting::Slow.previous(), SpeedSetting::Fast);
    }

    #[test]
    fn cell_rect_contains_only_covered_cells() {
        let rect = CellRect::new(GridCoord::new(25, 8), 4, 4);
        assert!(rect.contains(GridCoord::new(25, 8)));
        assert!(rect.contains(GridCoord::new(28, 11)));
        assert!(!rect.contains(GridCoord::new(29, 11)));
        assert!(!rect.contains(GridCoord::new(24, 9)));
    }
}
