#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state management for Snake Quest.
//!
//! Every mutation flows through [`apply`], which executes a single
//! [`Command`] and reports what happened as [`Event`] values. Read-only access
//! lives in [`query`].

pub mod arena;
pub mod combat;
pub mod interstitial;
pub mod snake;
pub mod spawn;

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snake_quest_core::{
    required_food, BossPhase, Command, DeathCause, Direction, Event, GridCoord, LevelKind,
    MenuPage, Screen, Settings, StoryBeat, ESCAPE_LEVEL, FIRST_SACRIFICE_LEVEL, GRID_HEIGHT,
    GRID_WIDTH, LAST_NORMAL_LEVEL, LAST_SACRIFICE_LEVEL, LAST_TETRIS_LEVEL, MAX_FRAME_DELTA,
};
#[cfg(feature = "debug-commands")]
use snake_quest_core::DebugCommand;

use crate::{
    arena::Arena,
    combat::{raycast_wall, BreakerShot, CombatOutcome, Explosion, SideScroller, LEFT_LOCK_COLUMN},
    interstitial::{LoadingReveal, PathSnake},
    snake::Snake,
    spawn::{choose_spawn, place_food, place_gate, FoodConstraints, Gate, MIN_WALL_GAP},
};

const DEFAULT_SEED: u64 = 0x5eed_cafe_f00d_1234;
const DEFAULT_SPAWN: GridCoord = GridCoord::new(5, 5);

/// Longest player name accepted on the game-over screen.
pub const NAME_MAX_LENGTH: usize = 10;

/// Entries on the main menu page.
pub const MAIN_MENU_ENTRIES: [&str; 3] = ["Start Game", "Settings", "Quit"];

/// Rows on the settings page.
pub const SETTINGS_ROWS: [&str; 3] = ["Speed", "Sound", "Leaderboard"];

#[cfg(feature = "debug-commands")]
const DEBUG_BOSS_AMMO: u32 = 20;
#[cfg(feature = "debug-commands")]
const DEBUG_BOSS_LENGTH: usize = 8;
#[cfg(feature = "debug-commands")]
const DEBUG_BOSS_GROWTH: u32 = 12;

/// Session parameters fixed when the game state is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    start_level: u32,
    seed: u64,
    settings: Settings,
    self_collision: bool,
}

impl Config {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Level a new run begins on, clamped to the valid range.
    #[must_use]
    pub fn with_start_level(mut self, level: u32) -> Self {
        self.start_level = level.clamp(1, ESCAPE_LEVEL);
        self
    }

    /// Seed for every random decision.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Initial player settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Enables or disables head-versus-body deaths.
    #[must_use]
    pub const fn with_self_collision(mut self, enabled: bool) -> Self {
        self.self_collision = enabled;
        self
    }

    /// Level a new run begins on.
    #[must_use]
    pub const fn start_level(&self) -> u32 {
        self.start_level
    }

    /// Seed for every random decision.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Initial player settings.
    #[must_use]
    pub const fn settings(&self) -> Settings {
        self.settings
    }

    /// Whether head-versus-body contact kills the snake.
    #[must_use]
    pub const fn self_collision(&self) -> bool {
        self.self_collision
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_level: 1,
            seed: DEFAULT_SEED,
            settings: Settings::default(),
            self_collision: true,
        }
    }
}

/// What dismissing a story interstitial leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StoryExit {
    BeginLoading,
    EnterSideScroller,
    ReturnToMenu,
}

#[derive(Clone, Debug)]
struct Story {
    beat: StoryBeat,
    exit: StoryExit,
    snake: PathSnake,
}

#[derive(Clone, Copy, Debug, Default)]
struct Checkpoint {
    points: u32,
    elapsed: Duration,
}

/// One applied direction per step, plus one queued for the following step.
#[derive(Clone, Copy, Debug, Default)]
struct DirectionInput {
    locked: bool,
    queued: Option<Direction>,
}

/// Represents the authoritative Snake Quest game state.
#[derive(Debug)]
pub struct GameState {
    config: Config,
    rng: ChaCha8Rng,
    screen: Screen,
    paused_from: Screen,
    running: bool,
    settings: Settings,
    menu_index: usize,
    settings_index: usize,
    level: u32,
    kind: LevelKind,
    points: u32,
    elapsed: Duration,
    checkpoint: Checkpoint,
    arena: Arena,
    layout_ready: bool,
    snake: Snake,
    food: Option<GridCoord>,
    gate: Option<Gate>,
    button_triggered: bool,
    level_food_eaten: u32,
    ammo: u32,
    input: DirectionInput,
    breaker: Option<BreakerShot>,
    explosions: Vec<Explosion>,
    loading: Option<LoadingReveal>,
    story: Option<Story>,
    intro: Option<PathSnake>,
    scroller: Option<SideScroller>,
    name_input: String,
    score_recorded: bool,
    death: Option<DeathCause>,
}

impl GameState {
    /// Creates a game state showing the intro animation.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let level = config.start_level().max(1);
        let kind = LevelKind::for_level(level);
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed()),
            screen: Screen::Intro,
            paused_from: Screen::Playing,
            running: true,
            settings: config.settings(),
            menu_index: 0,
            settings_index: 0,
            level,
            kind,
            points: 0,
            elapsed: Duration::ZERO,
            checkpoint: Checkpoint::default(),
            arena: Arena::build(kind, GRID_WIDTH, GRID_HEIGHT),
            layout_ready: false,
            snake: Snake::new(DEFAULT_SPAWN, Direction::East),
            food: None,
            gate: None,
            button_triggered: false,
            level_food_eaten: 0,
            ammo: 0,
            input: DirectionInput::default(),
            breaker: None,
            explosions: Vec::new(),
            loading: None,
            story: None,
            intro: Some(PathSnake::intro(GRID_WIDTH, GRID_HEIGHT)),
            scroller: None,
            name_input: String::new(),
            score_recorded: false,
            death: None,
            config,
        }
    }

    fn set_screen(&mut self, screen: Screen, out_events: &mut Vec<Event>) {
        self.screen = screen;
        out_events.push(Event::ScreenChanged { screen });
    }

    fn reset_transients(&mut self) {
        self.input = DirectionInput::default();
        self.breaker = None;
        self.explosions.clear();
    }

    fn exit_to_menu(&mut self, out_events: &mut Vec<Event>) {
        self.intro = None;
        self.story = None;
        self.loading = None;
        self.scroller = None;
        self.death = None;
        self.reset_transients();
        self.menu_index = 0;
        self.set_screen(
            Screen::Menu {
                page: MenuPage::Main,
            },
            out_events,
        );
    }

    fn quit(&mut self, out_events: &mut Vec<Event>) {
        if !self.running {
            return;
        }
        tracing::info!(level = self.level, points = self.points, "quit requested");
        self.running = false;
        out_events.push(Event::QuitRequested);
    }

    fn start_game(&mut self, out_events: &mut Vec<Event>) {
        self.level = self.config.start_level().max(1);
        self.points = 0;
        self.elapsed = Duration::ZERO;
        self.checkpoint = Checkpoint::default();
        self.name_input.clear();
        self.score_recorded = false;
        self.ammo = 0;
        self.death = None;
        self.scroller = None;
        self.reset_transients();
        tracing::info!(level = self.level, "run started");
        self.start_story(StoryBeat::Opening, StoryExit::BeginLoading, out_events);
    }

    fn start_story(&mut self, beat: StoryBeat, exit: StoryExit, out_events: &mut Vec<Event>) {
        self.story = Some(Story {
            beat,
            exit,
            snake: PathSnake::story(GRID_WIDTH, GRID_HEIGHT),
        });
        self.set_screen(Screen::Story { beat }, out_events);
    }

    fn complete_story(&mut self, out_events: &mut Vec<Event>) {
        let Some(story) = self.story.take() else {
            return;
        };
        match story.exit {
            StoryExit::BeginLoading => self.begin_loading(out_events),
            StoryExit::EnterSideScroller => self.enter_side_scroller(out_events),
            StoryExit::ReturnToMenu => self.exit_to_menu(out_events),
        }
    }

    fn begin_loading(&mut self, out_events: &mut Vec<Event>) {
        self.kind = LevelKind::for_level(self.level);
        self.arena = Arena::build(self.kind, GRID_WIDTH, GRID_HEIGHT);
        self.layout_ready = true;
        self.loading = Some(LoadingReveal::new(self.kind, &self.arena));
        self.scroller = None;
        self.reset_transients();
        tracing::debug!(level = self.level, kind = ?self.kind, "loading level");
        self.set_screen(Screen::Loading, out_events);
    }

    fn start_level(&mut self, out_events: &mut Vec<Event>) {
        self.checkpoint = Checkpoint {
            points: self.points,
            elapsed: self.elapsed,
        };
        self.kind = LevelKind::for_level(self.level);
        if !self.layout_ready {
            self.arena = Arena::build(self.kind, GRID_WIDTH, GRID_HEIGHT);
        }
        self.layout_ready = false;
        self.place_snake();
        self.gate = place_gate(
            self.kind,
            self.level,
            &self.arena,
            self.snake.head(),
            &mut self.rng,
        );
        self.button_triggered = false;
        self.level_food_eaten = 0;
        self.ammo = 0;
        self.loading = None;
        self.story = None;
        self.scroller = None;
        self.death = None;
        self.reset_transients();
        self.respawn_food(0);

        tracing::info!(level = self.level, kind = ?self.kind, "level started");
        out_events.push(Event::LevelStarted {
            level: self.level,
            kind: self.kind,
        });
        self.set_screen(Screen::Playing, out_events);
    }

    fn place_snake(&mut self) {
        let candidates: Vec<GridCoord> = match self.arena.sacrifice() {
            Some(layout) => {
                let open: Vec<GridCoord> = layout
                    .left()
                    .iter()
                    .copied()
                    .filter(|cell| !self.arena.is_wall(*cell))
                    .collect();
                if open.is_empty() {
                    layout.left().iter().copied().collect()
                } else {
                    open
                }
            }
            None => self.arena.open_cells(),
        };
        let spawn = choose_spawn(&candidates, &self.arena, MIN_WALL_GAP, &mut self.rng)
            .unwrap_or(DEFAULT_SPAWN);
        self.snake = Snake::new(spawn, Direction::East);
    }

    fn respawn_food(&mut self, min_column: i32) {
        let footprint = self
            .scroller
            .as_ref()
            .map(SideScroller::boss)
            .filter(|boss| boss.is_visible())
            .map(|boss| boss.footprint());
        let constraints = FoodConstraints {
            snake: &self.snake,
            gate: self.gate,
            footprint,
            min_column,
        };
        self.food = place_food(&self.arena, &constraints, &mut self.rng);
    }

    fn replay_level(&mut self, out_events: &mut Vec<Event>) {
        self.points = self.checkpoint.points;
        self.elapsed = self.checkpoint.elapsed;
        self.name_input.clear();
        self.score_recorded = false;
        self.death = None;
        tracing::info!(level = self.level, "replaying level");
        self.begin_loading(out_events);
    }

    fn queue_direction(&mut self, direction: Direction) {
        if !self.input.locked {
            if self.snake.set_direction(direction) {
                self.input.locked = true;
                self.input.queued = None;
            }
            return;
        }

        if !direction.is_opposite(self.snake.pending_direction()) {
            self.input.queued = Some(direction);
        }
    }

    fn release_input(&mut self) {
        self.input.locked = false;
        if let Some(queued) = self.input.queued.take() {
            if !queued.is_opposite(self.snake.direction()) {
                let _ = self.snake.set_direction(queued);
            }
        }
    }

    fn die(&mut self, cause: DeathCause, out_events: &mut Vec<Event>) {
        tracing::info!(level = self.level, points = self.points, ?cause, "snake died");
        self.death = Some(cause);
        self.reset_transients();
        out_events.push(Event::SnakeDied { cause });
        self.set_screen(Screen::GameOver, out_events);
    }

    fn collision(&self) -> Option<DeathCause> {
        let head = self.snake.head();
        if self.arena.sacrifice().is_some() {
            let inside = self
                .arena
                .playable()
                .is_some_and(|playable| playable.contains(&head));
            if !inside {
                return Some(DeathCause::LeftArena);
            }
        } else if !self.arena.contains(head) {
            return Some(DeathCause::OutOfBounds);
        } else if self.arena.is_wall(head) {
            return Some(DeathCause::Wall);
        }

        if self.config.self_collision() && self.snake.head_hits_body() {
            return Some(DeathCause::SelfCollision);
        }
        None
    }

    fn eat_food(&mut self, min_column: i32, out_events: &mut Vec<Event>) -> bool {
        let head = self.snake.head();
        if self.food != Some(head) {
            return false;
        }

        let tail = self.snake.grow(1);
        self.points = self.points.saturating_add(1);
        self.level_food_eaten = self.level_food_eaten.saturating_add(1);
        self.ammo = self.ammo.saturating_add(1);
        out_events.push(Event::SnakeGrew { tail });
        out_events.push(Event::FoodEaten {
            cell: head,
            points: self.points,
        });
        self.respawn_food(min_column);
        true
    }

    fn gameplay_step(&mut self, out_events: &mut Vec<Event>) {
        self.snake.step();
        self.elapsed = self.elapsed.saturating_add(self.settings.speed.step_interval());
        self.release_input();
        out_events.push(Event::SnakeAdvanced {
            head: self.snake.head(),
        });

        if let Some(cause) = self.collision() {
            self.die(cause, out_events);
            return;
        }

        if self.kind == LevelKind::Escape {
            let head = self.snake.head();
            if head.x() == GRID_WIDTH - 1 && !self.arena.is_wall(head) {
                tracing::info!(?head, "snake slipped through the broken edge");
                self.start_story(StoryBeat::Breakout, StoryExit::EnterSideScroller, out_events);
                return;
            }
        }

        if let Some(gate) = self.gate {
            if self.snake.body_contains(gate.button()) {
                self.button_triggered = true;
            }
        }

        let _ = self.eat_food(0, out_events);
        self.check_key(out_events);
    }

    fn check_key(&mut self, out_events: &mut Vec<Event>) {
        let Some(gate) = self.gate else {
            return;
        };
        if self.level_food_eaten < required_food(self.level) {
            return;
        }
        if self.button_triggered && self.snake.head() == gate.key() {
            self.complete_level(out_events);
        }
    }

    fn complete_level(&mut self, out_events: &mut Vec<Event>) {
        tracing::info!(level = self.level, points = self.points, "level cleared");
        self.reset_transients();
        out_events.push(Event::LevelCleared { level: self.level });
        self.set_screen(Screen::LevelClear, out_events);
    }

    fn acknowledge_level_clear(&mut self, out_events: &mut Vec<Event>) {
        if self.level == LAST_NORMAL_LEVEL {
            self.level += 1;
            self.start_story(StoryBeat::Midpoint, StoryExit::BeginLoading, out_events);
        } else if self.level == LAST_TETRIS_LEVEL {
            self.level = FIRST_SACRIFICE_LEVEL;
            self.start_story(StoryBeat::Sacrifice, StoryExit::BeginLoading, out_events);
        } else if self.level == LAST_SACRIFICE_LEVEL {
            self.level = ESCAPE_LEVEL;
            self.start_story(StoryBeat::Escape, StoryExit::BeginLoading, out_events);
        } else if self.level >= ESCAPE_LEVEL {
            self.start_story(StoryBeat::Breakout, StoryExit::EnterSideScroller, out_events);
        } else {
            self.level += 1;
            self.begin_loading(out_events);
        }
    }

    fn fire_breaker(&mut self, out_events: &mut Vec<Event>) {
        if !self.kind.allows_breaker_shot() || self.breaker.is_some() {
            return;
        }
        if self.ammo == 0 || self.snake.len() <= 1 {
            return;
        }

        let head = self.snake.head();
        let direction = self.snake.pending_direction();
        let Some(target) = raycast_wall(
            head,
            direction,
            self.arena.walls(),
            self.arena.width(),
            self.arena.height(),
        ) else {
            return;
        };

        self.breaker = Some(BreakerShot::launch(head, direction, target));
        self.ammo -= 1;
        self.snake.shed_for_shot();
        tracing::debug!(?head, ?target, ammo = self.ammo, "breaker shot fired");
        out_events.push(Event::ShotFired {
            origin: head,
            direction,
        });
    }

    fn fire_player_shot(&mut self, out_events: &mut Vec<Event>) {
        if self.ammo == 0 || self.snake.len() <= 1 {
            return;
        }
        let Some(scroller) = self.scroller.as_mut() else {
            return;
        };
        if scroller.boss().phase() == BossPhase::Defeated {
            return;
        }

        let head = self.snake.head();
        let direction = self.snake.pending_direction();
        scroller.fire(head, direction);
        self.ammo -= 1;
        self.snake.shed_for_shot();
        out_events.push(Event::ShotFired {
            origin: head,
            direction,
        });
    }

    fn advance_breaker(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if let Some(shot) = self.breaker.as_mut() {
            if shot.advance(dt) {
                let target = shot.target_cell();
                self.breaker = None;
                self.explosions.push(Explosion::new(target));
                if self.arena.break_wall(target) {
                    tracing::info!(cell = ?target, "wall broken");
                    out_events.push(Event::WallBroken { cell: target });
                }
            }
        }
        self.explosions.retain_mut(|explosion| explosion.advance(dt));
    }

    fn enter_side_scroller(&mut self, out_events: &mut Vec<Event>) {
        self.enter_side_scroller_with_length(self.snake.len(), out_events);
    }

    fn enter_side_scroller_with_length(&mut self, length: usize, out_events: &mut Vec<Event>) {
        let row = self.snake.head().y().clamp(0, GRID_HEIGHT - 1);
        let head_x = LEFT_LOCK_COLUMN + 1;
        let segments: Vec<GridCoord> = (0..length.max(1))
            .map(|offset| {
                let offset = i32::try_from(offset).unwrap_or(i32::MAX);
                GridCoord::new(head_x.saturating_sub(offset).max(0), row)
            })
            .collect();
        self.snake.relocate(segments, Direction::East);

        self.arena = Arena::open(GRID_WIDTH, GRID_HEIGHT);
        self.layout_ready = false;
        self.gate = None;
        self.button_triggered = false;
        self.story = None;
        self.loading = None;
        self.reset_transients();
        self.scroller = Some(SideScroller::new(GRID_WIDTH, GRID_HEIGHT));
        self.respawn_food(LEFT_LOCK_COLUMN);

        tracing::info!(ammo = self.ammo, length = self.snake.len(), "entered side-scroller");
        self.set_screen(Screen::SideScroller, out_events);
    }

    fn scroller_step(&mut self, out_events: &mut Vec<Event>) {
        let Some(scroller) = self.scroller.as_ref() else {
            return;
        };
        let moved = self
            .snake
            .step_with(|head, direction| scroller.next_head(head, direction));
        self.elapsed = self.elapsed.saturating_add(self.settings.speed.step_interval());
        self.release_input();
        out_events.push(Event::SnakeAdvanced {
            head: self.snake.head(),
        });

        if moved && self.config.self_collision() && self.snake.head_hits_body() {
            self.die(DeathCause::SelfCollision, out_events);
            return;
        }
        if self
            .scroller
            .as_ref()
            .is_some_and(|scroller| scroller.head_in_contact(self.snake.head()))
        {
            self.die(DeathCause::BossContact, out_events);
            return;
        }

        if self.eat_food(LEFT_LOCK_COLUMN, out_events) {
            if let Some(scroller) = self.scroller.as_mut() {
                scroller.record_food();
            }
        }

        let head = self.snake.head();
        if let Some(scroller) = self.scroller.as_mut() {
            if scroller.observe_head(head) {
                tracing::info!(?head, "boss entrance triggered");
            }
        }
    }

    fn advance_scroller(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(scroller) = self.scroller.as_mut() else {
            return;
        };
        let mut outcomes = Vec::new();
        scroller.advance(dt, self.snake.segments(), &mut outcomes);
        self.resolve_combat(outcomes, out_events);
    }

    fn resolve_combat(&mut self, outcomes: Vec<CombatOutcome>, out_events: &mut Vec<Event>) {
        for outcome in outcomes {
            match outcome {
                CombatOutcome::PhaseChanged(phase) => {
                    tracing::info!(?phase, "boss phase changed");
                    out_events.push(Event::BossPhaseChanged { phase });
                    if phase == BossPhase::Defeated {
                        self.start_story(StoryBeat::Victory, StoryExit::ReturnToMenu, out_events);
                        return;
                    }
                }
                CombatOutcome::BossHit { remaining } => {
                    tracing::debug!(remaining, "boss hit");
                    out_events.push(Event::BossHit { remaining });
                }
                CombatOutcome::SnakeShot => {
                    self.die(DeathCause::BossBullet, out_events);
                    return;
                }
                CombatOutcome::BossContact => {
                    self.die(DeathCause::BossContact, out_events);
                    return;
                }
            }
        }
    }

    fn advance_intro(&mut self, out_events: &mut Vec<Event>) {
        let finished = self.intro.as_mut().map_or(true, PathSnake::advance);
        if finished {
            self.exit_to_menu(out_events);
        }
    }

    fn navigate_menu(&mut self, page: MenuPage, direction: Direction, out_events: &mut Vec<Event>) {
        match page {
            MenuPage::Main => {
                self.menu_index = cycle(self.menu_index, MAIN_MENU_ENTRIES.len(), direction);
            }
            MenuPage::Settings => match direction {
                Direction::North | Direction::South => {
                    self.settings_index = cycle(self.settings_index, SETTINGS_ROWS.len(), direction);
                }
                Direction::East | Direction::West => {
                    match self.settings_index {
                        0 if direction == Direction::East => {
                            self.settings.speed = self.settings.speed.next();
                        }
                        0 => self.settings.speed = self.settings.speed.previous(),
                        1 => self.settings.sound_on = !self.settings.sound_on,
                        _ => return,
                    }
                    out_events.push(Event::SettingsChanged {
                        settings: self.settings,
                    });
                }
            },
            MenuPage::Leaderboard => {}
        }
    }

    fn select_menu_entry(&mut self, page: MenuPage, out_events: &mut Vec<Event>) {
        match (page, self.menu_index, self.settings_index) {
            (MenuPage::Main, 0, _) => self.start_game(out_events),
            (MenuPage::Main, 1, _) => {
                self.settings_index = 0;
                self.set_screen(
                    Screen::Menu {
                        page: MenuPage::Settings,
                    },
                    out_events,
                );
            }
            (MenuPage::Main, _, _) => self.quit(out_events),
            (MenuPage::Settings, _, 1) => {
                self.settings.sound_on = !self.settings.sound_on;
                out_events.push(Event::SettingsChanged {
                    settings: self.settings,
                });
            }
            (MenuPage::Settings, _, 2) => self.set_screen(
                Screen::Menu {
                    page: MenuPage::Leaderboard,
                },
                out_events,
            ),
            (MenuPage::Settings, _, _) | (MenuPage::Leaderboard, _, _) => {}
        }
    }

    fn menu_back(&mut self, page: MenuPage, out_events: &mut Vec<Event>) {
        let target = match page {
            MenuPage::Main => return,
            MenuPage::Settings => MenuPage::Main,
            MenuPage::Leaderboard => MenuPage::Settings,
        };
        self.set_screen(Screen::Menu { page: target }, out_events);
    }

    fn record_score(&mut self, out_events: &mut Vec<Event>) {
        if self.score_recorded {
            return;
        }
        self.score_recorded = true;
        let typed: String = self
            .name_input
            .chars()
            .filter(|character| character.is_alphanumeric())
            .collect();
        let name = if typed.trim().is_empty() {
            format!("Snake{}", self.rng.gen_range(1000..=9999))
        } else {
            typed.trim().to_owned()
        };
        tracing::info!(%name, score = self.points, "score submitted");
        out_events.push(Event::ScoreSubmitted {
            name,
            score: self.points,
        });
    }

    #[cfg(feature = "debug-commands")]
    fn debug(&mut self, command: DebugCommand, out_events: &mut Vec<Event>) {
        tracing::warn!(?command, "debug command");
        match command {
            DebugCommand::SkipLevel => match self.screen {
                Screen::Story { .. } => self.complete_story(out_events),
                Screen::LevelClear => self.acknowledge_level_clear(out_events),
                Screen::Loading => self.start_level(out_events),
                Screen::Playing | Screen::Paused if self.scroller.is_none() => {
                    self.complete_level(out_events);
                }
                Screen::Playing | Screen::SideScroller | Screen::Paused => {
                    if let Some(scroller) = self.scroller.as_mut() {
                        let mut outcomes = Vec::new();
                        scroller.defeat(&mut outcomes);
                        self.resolve_combat(outcomes, out_events);
                    }
                }
                Screen::Intro | Screen::Menu { .. } | Screen::GameOver => {}
            },
            DebugCommand::JumpToBoss => {
                self.level = ESCAPE_LEVEL;
                self.kind = LevelKind::Escape;
                self.ammo = self.ammo.max(DEBUG_BOSS_AMMO);
                self.death = None;
                self.intro = None;
                self.checkpoint = Checkpoint {
                    points: self.points,
                    elapsed: self.elapsed,
                };
                let length = self.snake.len().max(DEBUG_BOSS_LENGTH);
                self.enter_side_scroller_with_length(length, out_events);
                let _ = self.snake.grow(DEBUG_BOSS_GROWTH);
                if let Some(scroller) = self.scroller.as_mut() {
                    scroller.summon_boss();
                }
                out_events.push(Event::BossPhaseChanged {
                    phase: BossPhase::Approach,
                });
            }
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn cycle(index: usize, len: usize, direction: Direction) -> usize {
    match direction {
        Direction::North => (index + len - 1) % len,
        Direction::South => (index + 1) % len,
        Direction::East | Direction::West => index,
    }
}

/// Applies the provided command to the game state, mutating it deterministically.
pub fn apply(state: &mut GameState, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            let dt = dt.min(MAX_FRAME_DELTA);
            out_events.push(Event::TimeAdvanced { dt });
            match state.screen {
                Screen::Loading => {
                    let finished = state.loading.as_mut().map_or(true, |loading| loading.advance(dt));
                    if finished {
                        state.start_level(out_events);
                    }
                }
                Screen::Playing => state.advance_breaker(dt, out_events),
                Screen::SideScroller => state.advance_scroller(dt, out_events),
                _ => {}
            }
        }
        Command::Step => match state.screen {
            Screen::Intro => state.advance_intro(out_events),
            Screen::Story { .. } => {
                if let Some(story) = state.story.as_mut() {
                    let _ = story.snake.advance();
                }
            }
            Screen::Playing => state.gameplay_step(out_events),
            Screen::SideScroller => state.scroller_step(out_events),
            _ => {}
        },
        Command::SkipIntro => {
            if state.screen == Screen::Intro {
                state.exit_to_menu(out_events);
            }
        }
        Command::NavigateMenu { direction } => {
            if let Screen::Menu { page } = state.screen {
                state.navigate_menu(page, direction, out_events);
            }
        }
        Command::SelectMenuEntry => {
            if let Screen::Menu { page } = state.screen {
                state.select_menu_entry(page, out_events);
            }
        }
        Command::SelectSpeed { speed } => {
            if matches!(
                state.screen,
                Screen::Menu {
                    page: MenuPage::Settings
                }
            ) {
                state.settings.speed = speed;
                out_events.push(Event::SettingsChanged {
                    settings: state.settings,
                });
            }
        }
        Command::MenuBack => {
            if let Screen::Menu { page } = state.screen {
                state.menu_back(page, out_events);
            }
        }
        Command::StartGame => {
            if matches!(state.screen, Screen::Menu { .. }) {
                state.start_game(out_events);
            }
        }
        Command::QueueDirection { direction } => {
            if state.screen.is_gameplay() {
                state.queue_direction(direction);
            }
        }
        Command::Fire => match state.screen {
            Screen::Playing => state.fire_breaker(out_events),
            Screen::SideScroller => state.fire_player_shot(out_events),
            _ => {}
        },
        Command::Pause => {
            if state.screen.is_gameplay() {
                state.paused_from = state.screen;
                state.set_screen(Screen::Paused, out_events);
            }
        }
        Command::Resume => {
            if state.screen == Screen::Paused {
                let resumed = state.paused_from;
                state.set_screen(resumed, out_events);
            }
        }
        Command::AdvanceStory => {
            if matches!(state.screen, Screen::Story { .. }) {
                state.complete_story(out_events);
            }
        }
        Command::AcknowledgeLevelClear => {
            if state.screen == Screen::LevelClear {
                state.acknowledge_level_clear(out_events);
            }
        }
        Command::ExitToMenu => {
            if !matches!(state.screen, Screen::Intro | Screen::Menu { .. }) {
                state.exit_to_menu(out_events);
            }
        }
        Command::ReplayLevel => {
            if state.screen == Screen::GameOver {
                state.replay_level(out_events);
            }
        }
        Command::EditName { character } => {
            if state.screen == Screen::GameOver
                && !state.score_recorded
                && character.is_alphanumeric()
                && state.name_input.chars().count() < NAME_MAX_LENGTH
            {
                state.name_input.push(character);
            }
        }
        Command::EraseNameCharacter => {
            if state.screen == Screen::GameOver && !state.score_recorded {
                let _ = state.name_input.pop();
            }
        }
        Command::RecordScore => {
            if state.screen == Screen::GameOver {
                state.record_score(out_events);
            }
        }
        Command::Quit => state.quit(out_events),
        #[cfg(feature = "debug-commands")]
        Command::Debug { command } => state.debug(command, out_events),
    }
}

/// Query functions that provide read-only access to the game state.
pub mod query {
    use std::time::Duration;

    use snake_quest_core::{
        required_food, DeathCause, GridCoord, LevelKind, Screen, Settings, StoryBeat,
    };

    use super::GameState;
    use crate::{
        arena::Arena,
        combat::{BreakerShot, Explosion, SideScroller},
        interstitial::{LoadingReveal, PathSnake},
        snake::Snake,
        spawn::Gate,
    };

    /// Named top-level state.
    #[must_use]
    pub fn screen(state: &GameState) -> Screen {
        state.screen
    }

    /// Whether the session should keep running.
    #[must_use]
    pub fn is_running(state: &GameState) -> bool {
        state.running
    }

    /// Current player settings.
    #[must_use]
    pub fn settings(state: &GameState) -> Settings {
        state.settings
    }

    /// Highlighted entry on the main menu.
    #[must_use]
    pub fn menu_index(state: &GameState) -> usize {
        state.menu_index
    }

    /// Highlighted row on the settings page.
    #[must_use]
    pub fn settings_index(state: &GameState) -> usize {
        state.settings_index
    }

    /// Current level number.
    #[must_use]
    pub fn level(state: &GameState) -> u32 {
        state.level
    }

    /// Arena and rule set of the current level.
    #[must_use]
    pub fn level_kind(state: &GameState) -> LevelKind {
        state.kind
    }

    /// Score of the run.
    #[must_use]
    pub fn points(state: &GameState) -> u32 {
        state.points
    }

    /// Simulated play time of the run.
    #[must_use]
    pub fn elapsed(state: &GameState) -> Duration {
        state.elapsed
    }

    /// Shots available for the breaker and the side-scroller.
    #[must_use]
    pub fn ammo(state: &GameState) -> u32 {
        state.ammo
    }

    /// Foods eaten on the current level.
    #[must_use]
    pub fn level_food_eaten(state: &GameState) -> u32 {
        state.level_food_eaten
    }

    /// Foods needed before the key unlocks on the current level.
    #[must_use]
    pub fn required_food_for_level(state: &GameState) -> u32 {
        required_food(state.level)
    }

    /// Walls of the current level.
    #[must_use]
    pub fn arena(state: &GameState) -> &Arena {
        &state.arena
    }

    /// Player snake.
    #[must_use]
    pub fn snake(state: &GameState) -> &Snake {
        &state.snake
    }

    /// Food cell, if one could be placed.
    #[must_use]
    pub fn food(state: &GameState) -> Option<GridCoord> {
        state.food
    }

    /// Button and key of the current level.
    #[must_use]
    pub fn gate(state: &GameState) -> Option<Gate> {
        state.gate
    }

    /// Whether the body has passed over the button on this level.
    #[must_use]
    pub fn button_triggered(state: &GameState) -> bool {
        state.button_triggered
    }

    /// Breaker shot in flight.
    #[must_use]
    pub fn breaker_shot(state: &GameState) -> Option<&BreakerShot> {
        state.breaker.as_ref()
    }

    /// Explosions still visible.
    #[must_use]
    pub fn explosions(state: &GameState) -> &[Explosion] {
        &state.explosions
    }

    /// Wall reveal shown while loading.
    #[must_use]
    pub fn loading(state: &GameState) -> Option<&LoadingReveal> {
        state.loading.as_ref()
    }

    /// Active story interstitial and its scripted snake.
    #[must_use]
    pub fn story(state: &GameState) -> Option<(StoryBeat, &PathSnake)> {
        state.story.as_ref().map(|story| (story.beat, &story.snake))
    }

    /// Intro snake, while the intro is shown.
    #[must_use]
    pub fn intro(state: &GameState) -> Option<&PathSnake> {
        state.intro.as_ref()
    }

    /// Side-scroller encounter, while it runs.
    #[must_use]
    pub fn side_scroller(state: &GameState) -> Option<&SideScroller> {
        state.scroller.as_ref()
    }

    /// Name typed on the game-over screen.
    #[must_use]
    pub fn name_input(state: &GameState) -> &str {
        &state.name_input
    }

    /// Whether the score of this game over was submitted.
    #[must_use]
    pub fn score_recorded(state: &GameState) -> bool {
        state.score_recorded
    }

    /// What ended the run, while the game-over screen is shown.
    #[must_use]
    pub fn death_cause(state: &GameState) -> Option<DeathCause> {
        state.death
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::BOSS_HIT_POINTS;

    fn playing_state(config: Config) -> (GameState, Vec<Event>) {
        let mut state = GameState::new(config);
        let mut events = Vec::new();
        apply(&mut state, Command::SkipIntro, &mut events);
        apply(&mut state, Command::StartGame, &mut events);
        apply(&mut state, Command::AdvanceStory, &mut events);
        for _ in 0..10 {
            apply(
                &mut state,
                Command::Tick {
                    dt: Duration::from_millis(200),
                },
                &mut events,
            );
        }
        assert_eq!(state.screen, Screen::Playing, "loading should finish after two seconds");
        (state, events)
    }

    #[test]
    fn breaker_shot_opens_sacrifice_separator() {
        let (mut state, _) = playing_state(Config::new().with_start_level(13).with_seed(9));
        let layout = state.arena.sacrifice().expect("sacrifice layout").clone();
        let row = layout.left().iter().next().expect("left box").y();
        let separator = GridCoord::new(layout.separator_column(), row);
        let head = GridCoord::new(layout.separator_column() - 2, row);
        state.snake = Snake::from_segments(
            vec![head, GridCoord::new(head.x() - 1, row)],
            Direction::East,
        )
        .expect("segments");
        state.ammo = 1;

        let mut events = Vec::new();
        apply(&mut state, Command::Fire, &mut events);
        assert_eq!(state.ammo, 0, "firing spends ammo");
        assert_eq!(state.snake.len(), 1, "firing sheds the tail");
        for _ in 0..5 {
            apply(
                &mut state,
                Command::Tick {
                    dt: Duration::from_millis(50),
                },
                &mut events,
            );
        }

        assert!(events.contains(&Event::WallBroken { cell: separator }));
        assert!(state.arena.playable().expect("playable").contains(&separator));
        assert!(!state.arena.walls().contains(&separator));
        assert!(state.arena.sacrifice().expect("layout").wall_open());
    }

    #[test]
    fn ten_boss_hits_end_the_fight_with_victory_story() {
        let (mut state, _) = playing_state(Config::new().with_start_level(18).with_seed(4));
        let mut events = Vec::new();
        state.enter_side_scroller(&mut events);
        let scroller = state.scroller.as_mut().expect("side-scroller");
        scroller.summon_boss();
        scroller.fire(GridCoord::new(3, 3), Direction::East);

        let mut outcomes = Vec::new();
        for _ in 0..BOSS_HIT_POINTS {
            state
                .scroller
                .as_mut()
                .expect("side-scroller")
                .register_hit(&mut outcomes);
        }
        state.resolve_combat(outcomes, &mut events);

        let (beat, _) = query::story(&state).expect("story is shown");
        assert_eq!(beat, StoryBeat::Victory);
        assert_eq!(state.screen, Screen::Story { beat: StoryBeat::Victory });
        let scroller = query::side_scroller(&state).expect("encounter kept until dismissal");
        assert_eq!(scroller.boss().phase(), BossPhase::Defeated);
        assert!(scroller.player_shots().is_empty());
        assert!(scroller.boss_bullets().is_empty());
        assert!(events.contains(&Event::BossHit { remaining: 0 }));

        apply(&mut state, Command::AdvanceStory, &mut events);
        assert_eq!(
            state.screen,
            Screen::Menu {
                page: MenuPage::Main
            }
        );
    }

    #[test]
    fn button_latch_survives_leaving_the_button() {
        let (mut state, _) = playing_state(Config::new().with_seed(21));
        let head = state.snake.head();
        let button = head.offset(Direction::West);
        let key = head.offset(Direction::East).offset(Direction::East);
        state.gate = Some(Gate::new(button, key));
        state.food = None;
        let behind = button.offset(Direction::West);
        state.snake =
            Snake::from_segments(vec![head, button, behind], Direction::East).expect("segments");
        state.level_food_eaten = required_food(state.level);

        let mut events = Vec::new();
        apply(&mut state, Command::Step, &mut events);
        assert!(state.button_triggered, "body over the button latches it");
        assert_eq!(state.screen, Screen::Playing);
        apply(&mut state, Command::Step, &mut events);
        assert_eq!(state.screen, Screen::LevelClear);
    }

    #[test]
    fn key_stays_locked_until_food_quota_is_met() {
        let (mut state, _) = playing_state(Config::new().with_seed(33).with_start_level(2));
        let head = state.snake.head();
        let key = head.offset(Direction::East);
        let button = head.offset(Direction::West).offset(Direction::West);
        state.gate = Some(Gate::new(button, key));
        state.food = None;
        state.button_triggered = true;
        state.level_food_eaten = required_food(state.level) - 1;

        let mut events = Vec::new();
        apply(&mut state, Command::Step, &mut events);
        assert_eq!(state.snake.head(), key);
        assert_eq!(state.screen, Screen::Playing, "quota not met keeps the level running");

        state.level_food_eaten = required_food(state.level);
        let mut events = Vec::new();
        apply(&mut state, Command::QueueDirection { direction: Direction::South }, &mut events);
        apply(&mut state, Command::Step, &mut events);
        apply(&mut state, Command::QueueDirection { direction: Direction::West }, &mut events);
        apply(&mut state, Command::Step, &mut events);
        apply(&mut state, Command::QueueDirection { direction: Direction::North }, &mut events);
        apply(&mut state, Command::Step, &mut events);
        assert_eq!(state.snake.head(), head);
        apply(&mut state, Command::QueueDirection { direction: Direction::East }, &mut events);
        apply(&mut state, Command::Step, &mut events);
        assert_eq!(state.snake.head(), key);
        assert_eq!(state.screen, Screen::LevelClear);
        assert!(events.contains(&Event::LevelCleared { level: 2 }));
    }

    #[test]
    fn replay_restores_level_checkpoint() {
        let (mut state, _) = playing_state(Config::new().with_seed(2));
        state.checkpoint = Checkpoint {
            points: 3,
            elapsed: Duration::from_secs(12),
        };
        state.points = 7;
        let mut events = Vec::new();
        state.die(DeathCause::Wall, &mut events);
        apply(&mut state, Command::ReplayLevel, &mut events);
        assert_eq!(state.points, 3);
        assert_eq!(state.elapsed, Duration::from_secs(12));
        assert_eq!(state.screen, Screen::Loading);
    }

    fn tick_until(state: &mut GameState, millis: u64, ticks: usize, events: &mut Vec<Event>) {
        for _ in 0..ticks {
            apply(
                state,
                Command::Tick {
                    dt: Duration::from_millis(millis),
                },
                events,
            );
            if state.screen != Screen::SideScroller {
                return;
            }
        }
    }

    fn scroller_with_active_boss(seed: u64) -> (GameState, Vec<Event>) {
        let (mut state, _) = playing_state(Config::new().with_start_level(ESCAPE_LEVEL).with_seed(seed));
        let mut events = Vec::new();
        state.enter_side_scroller_with_length(4, &mut events);
        state.food = None;
        state
            .scroller
            .as_mut()
            .expect("side-scroller")
            .summon_boss();
        tick_until(&mut state, 100, 9, &mut events);
        assert!(events.contains(&Event::BossPhaseChanged {
            phase: BossPhase::Active
        }));
        (state, events)
    }

    fn curled_snake() -> Snake {
        Snake::from_segments(
            vec![
                GridCoord::new(10, 10),
                GridCoord::new(10, 11),
                GridCoord::new(11, 11),
                GridCoord::new(11, 10),
                GridCoord::new(11, 9),
            ],
            Direction::North,
        )
        .expect("segments")
    }

    #[test]
    fn turning_into_the_body_ends_the_run() {
        let (mut state, _) = playing_state(Config::new().with_seed(21));
        state.snake = curled_snake();
        state.food = None;
        state.gate = None;

        let mut events = Vec::new();
        apply(&mut state, Command::QueueDirection { direction: Direction::East }, &mut events);
        apply(&mut state, Command::Step, &mut events);
        assert_eq!(state.snake.head(), GridCoord::new(11, 10));
        assert_eq!(state.screen, Screen::GameOver);
        assert_eq!(state.death, Some(DeathCause::SelfCollision));
        assert!(events.contains(&Event::SnakeDied {
            cause: DeathCause::SelfCollision
        }));
    }

    #[test]
    fn body_overlap_is_harmless_without_self_collision() {
        let (mut state, _) = playing_state(Config::new().with_seed(21).with_self_collision(false));
        state.snake = curled_snake();
        state.food = None;
        state.gate = None;

        let mut events = Vec::new();
        apply(&mut state, Command::QueueDirection { direction: Direction::East }, &mut events);
        apply(&mut state, Command::Step, &mut events);
        assert_eq!(state.screen, Screen::Playing);
        assert_eq!(state.death, None);
    }

    #[test]
    fn broken_right_edge_leads_into_the_side_scroller() {
        let (mut state, _) = playing_state(Config::new().with_start_level(ESCAPE_LEVEL).with_seed(8));
        let row = 7;
        state.snake = Snake::from_segments(
            vec![GridCoord::new(27, row), GridCoord::new(26, row)],
            Direction::East,
        )
        .expect("segments");
        state.food = None;
        state.gate = None;
        state.ammo = 3;

        let mut events = Vec::new();
        apply(&mut state, Command::Fire, &mut events);
        assert_eq!(state.ammo, 2);
        for _ in 0..10 {
            apply(
                &mut state,
                Command::Tick {
                    dt: Duration::from_millis(50),
                },
                &mut events,
            );
        }
        let exit = GridCoord::new(GRID_WIDTH - 1, row);
        assert!(events.contains(&Event::WallBroken { cell: exit }));

        apply(&mut state, Command::Step, &mut events);
        assert_eq!(state.screen, Screen::Playing);
        apply(&mut state, Command::Step, &mut events);
        assert_eq!(state.snake.head(), exit);
        assert_eq!(state.screen, Screen::Story { beat: StoryBeat::Breakout });

        apply(&mut state, Command::AdvanceStory, &mut events);
        assert_eq!(state.screen, Screen::SideScroller);
        assert_eq!(state.snake.head(), GridCoord::new(LEFT_LOCK_COLUMN + 1, row));
        assert_eq!(state.snake.direction(), Direction::East);
        assert_eq!(state.ammo, 2, "ammo carries into the side-scroller");
        assert!(state.scroller.is_some());
    }

    #[test]
    fn side_scroller_shot_costs_ammo_and_length_and_wounds_the_boss() {
        let (mut state, mut events) = scroller_with_active_boss(4);
        let row = 10;
        state.snake = Snake::from_segments(
            (0..4).map(|offset| GridCoord::new(21 - offset, row)).collect(),
            Direction::East,
        )
        .expect("segments");
        state.ammo = 1;

        apply(&mut state, Command::Fire, &mut events);
        assert_eq!(state.ammo, 0, "a shot spends ammo");
        assert_eq!(state.snake.len(), 3, "a shot sheds the tail");
        assert!(events.contains(&Event::ShotFired {
            origin: GridCoord::new(21, row),
            direction: Direction::East,
        }));

        apply(&mut state, Command::Fire, &mut events);
        assert_eq!(state.snake.len(), 3, "no ammo means no shot");
        assert_eq!(query::side_scroller(&state).expect("scroller").player_shots().len(), 1);

        tick_until(&mut state, 20, 15, &mut events);
        assert!(events.contains(&Event::BossHit {
            remaining: BOSS_HIT_POINTS - 1
        }));
        let scroller = query::side_scroller(&state).expect("scroller");
        assert_eq!(scroller.boss().hit_points(), BOSS_HIT_POINTS - 1);
        assert!(scroller.player_shots().is_empty());
        assert_eq!(state.screen, Screen::SideScroller);
    }

    #[test]
    fn single_segment_snake_cannot_fire_in_the_side_scroller() {
        let (mut state, mut events) = scroller_with_active_boss(4);
        state.enter_side_scroller_with_length(1, &mut events);
        state.ammo = 5;
        apply(&mut state, Command::Fire, &mut events);
        assert_eq!(state.ammo, 5);
        assert!(query::side_scroller(&state).expect("scroller").player_shots().is_empty());
    }

    #[test]
    fn boss_bullet_ends_the_run() {
        let (mut state, mut events) = scroller_with_active_boss(5);
        state.snake = Snake::from_segments(
            (0..GRID_HEIGHT).map(|y| GridCoord::new(20, y)).collect(),
            Direction::North,
        )
        .expect("segments");

        tick_until(&mut state, 20, 200, &mut events);
        assert_eq!(state.screen, Screen::GameOver);
        assert_eq!(state.death, Some(DeathCause::BossBullet));
    }

    #[test]
    fn stepping_into_the_boss_ends_the_run() {
        let (mut state, mut events) = scroller_with_active_boss(6);
        state.snake = Snake::from_segments(
            vec![GridCoord::new(24, 9), GridCoord::new(23, 9)],
            Direction::East,
        )
        .expect("segments");

        apply(&mut state, Command::Step, &mut events);
        assert_eq!(state.snake.head(), GridCoord::new(25, 9));
        assert_eq!(state.screen, Screen::GameOver);
        assert_eq!(state.death, Some(DeathCause::BossContact));
    }
}
