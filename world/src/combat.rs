//! Continuous-position projectiles and the side-scroller boss encounter.

use std::{collections::BTreeSet, time::Duration};

use glam::Vec2;
use snake_quest_core::{BossPhase, CellRect, Direction, GridCoord};

/// Speed of the wall-breaking shot in cells per second.
pub const BREAKER_SPEED: f32 = 18.0;

/// Distance from the target centre at which a breaker shot detonates.
pub const BREAKER_HIT_RADIUS: f32 = 0.2;

/// Lifetime of the explosion left behind by a breaker shot.
pub const EXPLOSION_DURATION: Duration = Duration::from_millis(260);

/// Column the side-scroller head can never cross to the left.
pub const LEFT_LOCK_COLUMN: i32 = 2;

/// Side-scroller foods required before the boss can be summoned.
pub const BOSS_TRIGGER_FOOD: u32 = 3;

/// Column the head must reach before the boss can be summoned.
pub const BOSS_TRIGGER_COLUMN: i32 = 15;

/// Length of the fade that precedes the boss entrance.
pub const BOSS_FADE_DURATION: Duration = Duration::from_millis(1500);

/// Side length of the square boss footprint in cells.
pub const BOSS_SIZE: f32 = 4.0;

/// Horizontal approach speed of the boss in cells per second.
pub const BOSS_APPROACH_SPEED: f32 = 6.0;

/// Vertical patrol speed of the boss in cells per second.
pub const BOSS_PATROL_SPEED: f32 = 4.0;

/// Interval between boss bullets.
pub const BOSS_FIRE_INTERVAL: Duration = Duration::from_millis(1200);

/// Boss bullet speed in cells per second.
pub const BOSS_BULLET_SPEED: f32 = 10.0;

/// Hits required to defeat the boss.
pub const BOSS_HIT_POINTS: u32 = 10;

/// Inset applied to the boss footprint when testing head contact.
pub const BOSS_CONTACT_INSET: f32 = 0.25;

/// Distance from a segment centre at which a boss bullet kills.
pub const BULLET_HIT_RADIUS: f32 = 0.45;

/// Player shot speed in cells per second.
pub const PLAYER_SHOT_SPEED: f32 = 18.0;

/// Centre of a grid cell in continuous cell units.
#[must_use]
pub fn cell_center(cell: GridCoord) -> Vec2 {
    Vec2::new(cell.x() as f32 + 0.5, cell.y() as f32 + 0.5)
}

/// Unit velocity vector for a direction.
#[must_use]
pub fn direction_vector(direction: Direction) -> Vec2 {
    let (dx, dy) = direction.delta();
    Vec2::new(dx as f32, dy as f32)
}

/// Walks from the cell after `origin` until the first wall inside the grid.
#[must_use]
pub fn raycast_wall(
    origin: GridCoord,
    direction: Direction,
    walls: &BTreeSet<GridCoord>,
    width: i32,
    height: i32,
) -> Option<GridCoord> {
    let mut cell = origin.offset(direction);
    while cell.is_within(width, height) {
        if walls.contains(&cell) {
            return Some(cell);
        }
        cell = cell.offset(direction);
    }
    None
}

/// Wall-breaking shot travelling toward a known wall cell.
#[derive(Clone, Debug, PartialEq)]
pub struct BreakerShot {
    position: Vec2,
    direction: Direction,
    target_cell: GridCoord,
}

impl BreakerShot {
    /// Launches a shot from the centre of `head` toward `target_cell`.
    #[must_use]
    pub fn launch(head: GridCoord, direction: Direction, target_cell: GridCoord) -> Self {
        Self {
            position: cell_center(head),
            direction,
            target_cell,
        }
    }

    /// Continuous position of the shot.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Travel direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Wall cell the shot will strike.
    #[must_use]
    pub const fn target_cell(&self) -> GridCoord {
        self.target_cell
    }

    /// Moves the shot and reports whether it crossed the detonation line.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let previous = self.position;
        let velocity = direction_vector(self.direction);
        self.position += velocity * BREAKER_SPEED * dt.as_secs_f32();

        let target = cell_center(self.target_cell);
        let (prev_along, along, target_along, across, target_across, sign) =
            if velocity.x != 0.0 {
                (previous.x, self.position.x, target.x, self.position.y, target.y, velocity.x)
            } else {
                (previous.y, self.position.y, target.y, self.position.x, target.x, velocity.y)
            };

        let hit_line = target_along - sign * BREAKER_HIT_RADIUS;
        let crossed = if sign > 0.0 {
            prev_along <= hit_line && hit_line <= along
        } else {
            prev_along >= hit_line && hit_line >= along
        };
        if !crossed || (across - target_across).abs() > BREAKER_HIT_RADIUS + 1e-6 {
            return false;
        }

        if velocity.x != 0.0 {
            self.position.x = hit_line;
        } else {
            self.position.y = hit_line;
        }
        true
    }
}

/// Short-lived explosion left where a breaker shot struck.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Explosion {
    cell: GridCoord,
    elapsed: Duration,
}

impl Explosion {
    /// Starts an explosion on the provided cell.
    #[must_use]
    pub const fn new(cell: GridCoord) -> Self {
        Self {
            cell,
            elapsed: Duration::ZERO,
        }
    }

    /// Cell that exploded.
    #[must_use]
    pub const fn cell(&self) -> GridCoord {
        self.cell
    }

    /// Fraction of the explosion lifetime that has elapsed.
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f32() / EXPLOSION_DURATION.as_secs_f32()).min(1.0)
    }

    /// Ages the explosion and reports whether it is still visible.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.elapsed < EXPLOSION_DURATION
    }
}

/// Projectile moving at constant velocity in continuous cell units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    position: Vec2,
    velocity: Vec2,
}

impl Projectile {
    /// Creates a projectile.
    #[must_use]
    pub const fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity in cells per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn advance(&mut self, dt: Duration) {
        self.position += self.velocity * dt.as_secs_f32();
    }

    fn is_off_grid(&self, width: i32, height: i32) -> bool {
        self.position.x < 0.0
            || self.position.y < 0.0
            || self.position.x >= width as f32
            || self.position.y >= height as f32
    }
}

/// Patrolling boss with a square footprint.
#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    position: Vec2,
    phase: BossPhase,
    hit_points: u32,
    patrol_sign: f32,
    fire_timer: Duration,
}

impl Boss {
    fn hidden(width: i32, height: i32) -> Self {
        Self {
            position: Vec2::new(width as f32, ((height as f32 - BOSS_SIZE) / 2.0).max(0.0)),
            phase: BossPhase::Hidden,
            hit_points: BOSS_HIT_POINTS,
            patrol_sign: 1.0,
            fire_timer: Duration::ZERO,
        }
    }

    /// Top-left corner of the footprint.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BossPhase {
        self.phase
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hit_points(&self) -> u32 {
        self.hit_points
    }

    /// Reports whether the boss is on its way in or fighting.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        matches!(self.phase, BossPhase::Approach | BossPhase::Active)
    }

    /// Grid cells touched by the footprint.
    #[must_use]
    pub fn footprint(&self) -> CellRect {
        let left = self.position.x.floor();
        let top = self.position.y.floor();
        let right = (self.position.x + BOSS_SIZE).ceil();
        let bottom = (self.position.y + BOSS_SIZE).ceil();
        CellRect::new(
            GridCoord::new(left as i32, top as i32),
            (right - left) as i32,
            (bottom - top) as i32,
        )
    }

    fn covers(&self, point: Vec2, inset: f32) -> bool {
        point.x >= self.position.x + inset
            && point.x <= self.position.x + BOSS_SIZE - inset
            && point.y >= self.position.y + inset
            && point.y <= self.position.y + BOSS_SIZE - inset
    }
}

/// Outcome of advancing the side-scroller that the game state must act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatOutcome {
    /// The boss moved into a new phase.
    PhaseChanged(BossPhase),
    /// A player shot struck the boss.
    BossHit {
        /// Hit points left after the strike.
        remaining: u32,
    },
    /// A boss bullet reached a body segment.
    SnakeShot,
    /// The head entered the boss contact hitbox.
    BossContact,
}

/// Side-scroller mini-simulation layered over the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct SideScroller {
    width: i32,
    height: i32,
    foods_eaten: u32,
    fade: Option<Duration>,
    boss: Boss,
    player_shots: Vec<Projectile>,
    boss_bullets: Vec<Projectile>,
}

impl SideScroller {
    /// Creates an encounter with the boss waiting off-screen.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            foods_eaten: 0,
            fade: None,
            boss: Boss::hidden(width, height),
            player_shots: Vec::new(),
            boss_bullets: Vec::new(),
        }
    }

    /// Cell the head moves into, or `None` when it would leave the band.
    ///
    /// Rows wrap around; columns are clamped to the left lock and the right edge.
    #[must_use]
    pub fn next_head(&self, head: GridCoord, direction: Direction) -> Option<GridCoord> {
        let (dx, dy) = direction.delta();
        let x = head.x() + dx;
        if x < LEFT_LOCK_COLUMN || x > self.width - 1 {
            return None;
        }
        let y = (head.y() + dy).rem_euclid(self.height.max(1));
        Some(GridCoord::new(x, y))
    }

    /// Boss state.
    #[must_use]
    pub const fn boss(&self) -> &Boss {
        &self.boss
    }

    /// Player shots in flight.
    #[must_use]
    pub fn player_shots(&self) -> &[Projectile] {
        &self.player_shots
    }

    /// Boss bullets in flight.
    #[must_use]
    pub fn boss_bullets(&self) -> &[Projectile] {
        &self.boss_bullets
    }

    /// Foods eaten since entering the side-scroller.
    #[must_use]
    pub const fn foods_eaten(&self) -> u32 {
        self.foods_eaten
    }

    /// Progress of the boss entrance fade, if it is running.
    #[must_use]
    pub fn fade_progress(&self) -> Option<f32> {
        self.fade
            .map(|elapsed| (elapsed.as_secs_f32() / BOSS_FADE_DURATION.as_secs_f32()).min(1.0))
    }

    /// Counts a food eaten in the side-scroller.
    pub fn record_food(&mut self) {
        self.foods_eaten = self.foods_eaten.saturating_add(1);
    }

    /// Starts the entrance fade once the trigger conditions hold.
    ///
    /// Reports whether the fade started on this call.
    pub fn observe_head(&mut self, head: GridCoord) -> bool {
        if self.boss.phase != BossPhase::Hidden || self.fade.is_some() {
            return false;
        }
        if self.foods_eaten < BOSS_TRIGGER_FOOD || head.x() < BOSS_TRIGGER_COLUMN {
            return false;
        }
        self.fade = Some(Duration::ZERO);
        true
    }

    /// Skips the fade and sends the boss in immediately.
    pub fn summon_boss(&mut self) {
        self.fade = None;
        self.boss = Boss::hidden(self.width, self.height);
        self.boss.phase = BossPhase::Approach;
    }

    /// Launches a player shot from the centre of `head`.
    pub fn fire(&mut self, head: GridCoord, direction: Direction) {
        self.player_shots.push(Projectile::new(
            cell_center(head),
            direction_vector(direction) * PLAYER_SHOT_SPEED,
        ));
    }

    /// Reports whether the head centre lies inside the boss contact hitbox.
    #[must_use]
    pub fn head_in_contact(&self, head: GridCoord) -> bool {
        self.boss.is_visible() && self.boss.covers(cell_center(head), BOSS_CONTACT_INSET)
    }

    /// Applies one player hit and returns the resulting outcomes.
    pub fn register_hit(&mut self, out: &mut Vec<CombatOutcome>) {
        if self.boss.phase == BossPhase::Defeated {
            return;
        }
        self.boss.hit_points = self.boss.hit_points.saturating_sub(1);
        out.push(CombatOutcome::BossHit {
            remaining: self.boss.hit_points,
        });
        if self.boss.hit_points == 0 {
            self.defeat(out);
        }
    }

    /// Ends the fight, clearing every projectile.
    pub fn defeat(&mut self, out: &mut Vec<CombatOutcome>) {
        self.player_shots.clear();
        self.boss_bullets.clear();
        self.boss.hit_points = 0;
        self.boss.phase = BossPhase::Defeated;
        out.push(CombatOutcome::PhaseChanged(BossPhase::Defeated));
    }

    /// Advances fade, boss movement and projectiles by `dt`.
    pub fn advance(&mut self, dt: Duration, segments: &[GridCoord], out: &mut Vec<CombatOutcome>) {
        if self.boss.phase == BossPhase::Defeated {
            return;
        }
        let seconds = dt.as_secs_f32();

        if let Some(elapsed) = self.fade.as_mut() {
            *elapsed = elapsed.saturating_add(dt);
            if *elapsed >= BOSS_FADE_DURATION {
                self.fade = None;
                self.boss.phase = BossPhase::Approach;
                out.push(CombatOutcome::PhaseChanged(BossPhase::Approach));
            }
        }

        self.move_boss(dt, seconds, out);

        for shot in &mut self.player_shots {
            shot.advance(dt);
        }
        for bullet in &mut self.boss_bullets {
            bullet.advance(dt);
        }

        let (width, height) = (self.width, self.height);
        let mut hits = 0;
        let boss = &self.boss;
        self.player_shots.retain(|shot| {
            if shot.is_off_grid(width, height) {
                return false;
            }
            if boss.is_visible() && boss.covers(shot.position, 0.0) {
                hits += 1;
                return false;
            }
            true
        });
        for _ in 0..hits {
            self.register_hit(out);
            if self.boss.phase == BossPhase::Defeated {
                return;
            }
        }

        self.boss_bullets
            .retain(|bullet| !bullet.is_off_grid(width, height));
        let struck = self.boss_bullets.iter().position(|bullet| {
            segments
                .iter()
                .any(|segment| bullet.position.distance(cell_center(*segment)) <= BULLET_HIT_RADIUS)
        });
        if let Some(index) = struck {
            let _ = self.boss_bullets.remove(index);
            out.push(CombatOutcome::SnakeShot);
            return;
        }

        if let Some(head) = segments.first() {
            if self.head_in_contact(*head) {
                out.push(CombatOutcome::BossContact);
            }
        }
    }

    fn move_boss(&mut self, dt: Duration, seconds: f32, out: &mut Vec<CombatOutcome>) {
        let target_x = self.width as f32 - BOSS_SIZE - 1.0;
        let bottom = (self.height as f32 - BOSS_SIZE).max(0.0);
        match self.boss.phase {
            BossPhase::Approach => {
                self.boss.position.x -= BOSS_APPROACH_SPEED * seconds;
                if self.boss.position.x <= target_x {
                    self.boss.position.x = target_x;
                    self.boss.phase = BossPhase::Active;
                    self.boss.fire_timer = Duration::ZERO;
                    out.push(CombatOutcome::PhaseChanged(BossPhase::Active));
                }
            }
            BossPhase::Active => {
                self.boss.position.y += self.boss.patrol_sign * BOSS_PATROL_SPEED * seconds;
                if self.boss.position.y <= 0.0 {
                    self.boss.position.y = 0.0;
                    self.boss.patrol_sign = 1.0;
                } else if self.boss.position.y >= bottom {
                    self.boss.position.y = bottom;
                    self.boss.patrol_sign = -1.0;
                }

                self.boss.fire_timer = self.boss.fire_timer.saturating_add(dt);
                while self.boss.fire_timer >= BOSS_FIRE_INTERVAL {
                    self.boss.fire_timer -= BOSS_FIRE_INTERVAL;
                    let muzzle = Vec2::new(
                        self.boss.position.x,
                        self.boss.position.y + BOSS_SIZE / 2.0,
                    );
                    self.boss_bullets
                        .push(Projectile::new(muzzle, Vec2::new(-BOSS_BULLET_SPEED, 0.0)));
                }
            }
            BossPhase::Hidden | BossPhase::Defeated => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_shot_detonates_before_target_centre() {
        let mut shot = BreakerShot::launch(GridCoord::new(4, 5), Direction::East, GridCoord::new(9, 5));
        let mut hit = false;
        for _ in 0..20 {
            if shot.advance(Duration::from_millis(16)) {
                hit = true;
                break;
            }
        }
        assert!(hit, "shot should reach the wall");
        assert!((shot.position().x - (9.5 - BREAKER_HIT_RADIUS)).abs() < 1e-4);
    }

    #[test]
    fn raycast_finds_first_wall() {
        let walls: BTreeSet<GridCoord> = [GridCoord::new(2, 0), GridCoord::new(2, 3)]
            .into_iter()
            .collect();
        let hit = raycast_wall(GridCoord::new(2, 6), Direction::North, &walls, 10, 10);
        assert_eq!(hit, Some(GridCoord::new(2, 3)));
        assert_eq!(
            raycast_wall(GridCoord::new(2, 6), Direction::South, &walls, 10, 10),
            None
        );
    }

    #[test]
    fn next_head_wraps_rows_and_respects_left_lock() {
        let scroller = SideScroller::new(30, 20);
        assert_eq!(
            scroller.next_head(GridCoord::new(5, 0), Direction::North),
            Some(GridCoord::new(5, 19))
        );
        assert_eq!(
            scroller.next_head(GridCoord::new(LEFT_LOCK_COLUMN, 4), Direction::West),
            None
        );
        assert_eq!(
            scroller.next_head(GridCoord::new(29, 4), Direction::East),
            None
        );
    }

    fn tick(scroller: &mut SideScroller, millis: u64, segments: &[GridCoord]) -> Vec<CombatOutcome> {
        let mut out = Vec::new();
        scroller.advance(Duration::from_millis(millis), segments, &mut out);
        out
    }

    fn active_scroller() -> SideScroller {
        let mut scroller = SideScroller::new(30, 20);
        scroller.summon_boss();
        for _ in 0..9 {
            let _ = tick(&mut scroller, 100, &[]);
        }
        assert_eq!(scroller.boss().phase(), BossPhase::Active);
        scroller
    }

    #[test]
    fn boss_fade_needs_three_foods_and_column_fifteen() {
        let mut scroller = SideScroller::new(30, 20);
        for _ in 0..2 {
            scroller.record_food();
        }
        assert!(!scroller.observe_head(GridCoord::new(20, 5)), "two foods are not enough");
        scroller.record_food();
        assert_eq!(scroller.foods_eaten(), BOSS_TRIGGER_FOOD);
        assert!(!scroller.observe_head(GridCoord::new(BOSS_TRIGGER_COLUMN - 1, 5)));
        assert!(scroller.observe_head(GridCoord::new(BOSS_TRIGGER_COLUMN, 5)));
        assert!(!scroller.observe_head(GridCoord::new(20, 5)), "fade starts once");
        assert_eq!(scroller.fade_progress(), Some(0.0));

        for _ in 0..7 {
            assert!(tick(&mut scroller, 200, &[]).is_empty());
        }
        assert_eq!(scroller.boss().phase(), BossPhase::Hidden);
        assert!(scroller.fade_progress().is_some_and(|progress| progress > 0.9));

        let outcomes = tick(&mut scroller, 100, &[]);
        assert_eq!(outcomes, vec![CombatOutcome::PhaseChanged(BossPhase::Approach)]);
        assert_eq!(scroller.fade_progress(), None);
        assert_eq!(scroller.boss().phase(), BossPhase::Approach);
    }

    #[test]
    fn boss_approach_stops_five_columns_from_the_right_edge() {
        let mut scroller = SideScroller::new(30, 20);
        scroller.summon_boss();
        let mut outcomes = Vec::new();
        for _ in 0..8 {
            outcomes.extend(tick(&mut scroller, 100, &[]));
        }
        assert!(outcomes.is_empty(), "boss still approaching");
        assert!(scroller.boss().position().x > 25.0);

        let outcomes = tick(&mut scroller, 100, &[]);
        assert_eq!(outcomes, vec![CombatOutcome::PhaseChanged(BossPhase::Active)]);
        assert_eq!(scroller.boss().position(), Vec2::new(25.0, 8.0));
    }

    #[test]
    fn boss_patrol_reflects_at_top_and_bottom() {
        let mut scroller = active_scroller();
        let mut lowest = f32::MAX;
        let mut highest = f32::MIN;
        for _ in 0..80 {
            let _ = tick(&mut scroller, 100, &[]);
            let y = scroller.boss().position().y;
            assert!((0.0..=16.0).contains(&y), "boss left the band at y = {y}");
            lowest = lowest.min(y);
            highest = highest.max(y);
        }
        assert_eq!(highest, 16.0, "patrol should touch the bottom edge");
        assert_eq!(lowest, 0.0, "patrol should touch the top edge");
        assert_eq!(scroller.boss().position().x, 25.0);
    }

    #[test]
    fn boss_fires_every_twelve_hundred_milliseconds() {
        let mut scroller = active_scroller();
        for _ in 0..11 {
            let _ = tick(&mut scroller, 100, &[]);
        }
        assert!(scroller.boss_bullets().is_empty());

        let _ = tick(&mut scroller, 100, &[]);
        assert_eq!(scroller.boss_bullets().len(), 1);
        let bullet = scroller.boss_bullets()[0];
        assert_eq!(bullet.velocity(), Vec2::new(-BOSS_BULLET_SPEED, 0.0));
        assert!((bullet.position().x - 24.0).abs() < 1e-4);
        assert_eq!(bullet.position().y, scroller.boss().position().y + BOSS_SIZE / 2.0);

        for _ in 0..11 {
            let _ = tick(&mut scroller, 100, &[]);
        }
        assert_eq!(scroller.boss_bullets().len(), 1);
        let _ = tick(&mut scroller, 100, &[]);
        assert_eq!(scroller.boss_bullets().len(), 2);
    }

    #[test]
    fn boss_bullet_strikes_within_hit_radius() {
        let mut scroller = SideScroller::new(30, 20);
        scroller
            .boss_bullets
            .push(Projectile::new(Vec2::new(10.0, 5.5), Vec2::new(-BOSS_BULLET_SPEED, 0.0)));
        let segments = [GridCoord::new(2, 9), GridCoord::new(8, 5)];

        assert!(tick(&mut scroller, 100, &segments).is_empty(), "half a cell away");
        assert_eq!(scroller.boss_bullets().len(), 1);

        assert_eq!(tick(&mut scroller, 10, &segments), vec![CombatOutcome::SnakeShot]);
        assert!(scroller.boss_bullets().is_empty(), "bullet is spent on impact");
    }

    #[test]
    fn boss_contact_uses_inset_hitbox() {
        let mut scroller = SideScroller::new(30, 20);
        scroller.boss.phase = BossPhase::Active;
        scroller.boss.position = Vec2::new(20.0, 4.0);

        assert!(!scroller.head_in_contact(GridCoord::new(19, 5)));
        assert!(scroller.head_in_contact(GridCoord::new(20, 5)));
        assert!(scroller.head_in_contact(GridCoord::new(23, 7)));
        assert!(!scroller.head_in_contact(GridCoord::new(24, 5)));
        assert!(!scroller.head_in_contact(GridCoord::new(21, 8)));

        let outcomes = tick(&mut scroller, 10, &[GridCoord::new(20, 5), GridCoord::new(19, 5)]);
        assert_eq!(outcomes, vec![CombatOutcome::BossContact]);

        scroller.boss.phase = BossPhase::Hidden;
        assert!(!scroller.head_in_contact(GridCoord::new(21, 5)), "hidden boss has no body");
    }

    #[test]
    fn player_shot_inside_footprint_costs_one_hit_point() {
        let mut scroller = active_scroller();
        scroller.fire(GridCoord::new(21, 10), Direction::East);
        let mut outcomes = Vec::new();
        for _ in 0..15 {
            outcomes.extend(tick(&mut scroller, 20, &[]));
        }
        assert_eq!(outcomes, vec![CombatOutcome::BossHit { remaining: BOSS_HIT_POINTS - 1 }]);
        assert_eq!(scroller.boss().hit_points(), BOSS_HIT_POINTS - 1);
        assert!(scroller.player_shots().is_empty());
    }

    #[test]
    fn explosion_expires_after_lifetime() {
        let mut explosion = Explosion::new(GridCoord::new(1, 1));
        assert!(explosion.advance(Duration::from_millis(200)));
        assert!(!explosion.advance(Duration::from_millis(60)));
    }
}
