//! Translation of world state into the backend-neutral scene description.

use glam::Vec2;
use snake_quest_core::{DeathCause, GridCoord, MenuPage, Screen, WINDOW_TITLE};
use snake_quest_rendering::{
    visuals::{rotation_for, ExplosionRing, FadeTracker},
    HudView, MenuEntry, MenuView, OverlayView, Scene, SceneSprite, SpriteRole,
};
use snake_quest_system_leaderboard::Entry;
use snake_quest_world::{
    combat::{cell_center, Projectile},
    query,
    snake::Snake,
    GameState, MAIN_MENU_ENTRIES,
};

const BREAKER_SHOT_SIZE: f32 = 0.4;
const PROJECTILE_SIZE: f32 = 0.3;
const BOSS_SIZE: f32 = 4.0;
const GAME_OVER_FADE: f32 = 170.0 / 255.0;
const BOSS_FADE_DEPTH: f32 = 0.5;

/// Rebuilds `scene` for the current screen of `state`.
///
/// `alpha` blends snake segments between their previous and current cells.
pub(crate) fn populate(
    scene: &mut Scene,
    state: &GameState,
    alpha: f32,
    fades: &FadeTracker,
    entries: &[Entry],
) {
    scene.clear();
    let screen = query::screen(state);
    scene.screen = screen;

    match screen {
        Screen::Intro => {
            if let Some(intro) = query::intro(state) {
                push_snake(&mut scene.sprites, intro.snake(), alpha, None);
                scene.title_fade = Some(intro.title_fade());
            }
            scene.overlay = Some(OverlayView {
                title: WINDOW_TITLE.to_owned(),
                lines: vec!["Press any key to skip".to_owned()],
                boxed: false,
            });
        }
        Screen::Menu { page } => scene.menu = Some(menu_view(state, page, entries)),
        Screen::Story { beat } => {
            if let Some((_, story)) = query::story(state) {
                push_snake(&mut scene.sprites, story.snake(), alpha, None);
                scene.title_fade = Some(story.title_fade());
            }
            scene.overlay = Some(OverlayView {
                title: beat.text().to_owned(),
                lines: vec![
                    "Press ENTER or SPACE to continue".to_owned(),
                    "ESC to go to main menu".to_owned(),
                ],
                boxed: true,
            });
        }
        Screen::Loading => {
            if let Some(loading) = query::loading(state) {
                push_walls(&mut scene.sprites, state, loading.revealed_tiles());
            }
            scene.hud = Some(hud_view(state));
        }
        Screen::Playing
        | Screen::Paused
        | Screen::LevelClear
        | Screen::GameOver
        | Screen::SideScroller => {
            push_playfield(scene, state, alpha, fades);
            scene.hud = Some(hud_view(state));
            scene.overlay = modal_overlay(state, screen);
            if screen == Screen::GameOver {
                scene.screen_fade = GAME_OVER_FADE;
            }
        }
    }
}

fn menu_view(state: &GameState, page: MenuPage, entries: &[Entry]) -> MenuView {
    match page {
        MenuPage::Main => MenuView {
            title: WINDOW_TITLE.to_owned(),
            entries: rows(MAIN_MENU_ENTRIES.map(str::to_owned), query::menu_index(state)),
            prompt: "Press ENTER or SPACE".to_owned(),
        },
        MenuPage::Settings => {
            let settings = query::settings(state);
            let sound = if settings.sound_on { "On" } else { "Off" };
            MenuView {
                title: "Settings".to_owned(),
                entries: rows(
                    [
                        format!("Speed: {}", settings.speed.label()),
                        format!("Sound: {sound}"),
                        "Leaderboard".to_owned(),
                    ],
                    query::settings_index(state),
                ),
                prompt: "1/2/3 set speed, ENTER to open, ESC to return".to_owned(),
            }
        }
        MenuPage::Leaderboard => {
            let labels: Vec<String> = if entries.is_empty() {
                vec!["No scores yet".to_owned()]
            } else {
                entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| {
                        format!("{}. {} - {}", index + 1, entry.name, entry.score)
                    })
                    .collect()
            };
            MenuView {
                title: "Leaderboard".to_owned(),
                entries: rows(labels, usize::MAX),
                prompt: "Press ESC to return".to_owned(),
            }
        }
    }
}

fn rows(labels: impl IntoIterator<Item = String>, selected: usize) -> Vec<MenuEntry> {
    labels
        .into_iter()
        .enumerate()
        .map(|(index, label)| MenuEntry {
            label,
            selected: index == selected,
        })
        .collect()
}

fn hud_view(state: &GameState) -> HudView {
    let shooting = query::level_kind(state).allows_breaker_shot()
        || query::side_scroller(state).is_some();
    HudView {
        points: query::points(state),
        level: query::level(state),
        elapsed: query::elapsed(state),
        ammo: shooting.then(|| query::ammo(state)),
    }
}

fn push_playfield(scene: &mut Scene, state: &GameState, alpha: f32, fades: &FadeTracker) {
    let sprites = &mut scene.sprites;
    let walls: Vec<GridCoord> = query::arena(state).walls().iter().copied().collect();
    push_walls(sprites, state, &walls);

    if let Some(gate) = query::gate(state) {
        let triggered = query::button_triggered(state);
        sprites.push(SceneSprite::cell(
            cell_vec(gate.button()),
            SpriteRole::Button { pressed: triggered },
        ));
        sprites.push(SceneSprite::cell(
            cell_vec(gate.key()),
            SpriteRole::Key {
                unlocked: triggered,
            },
        ));
    }
    if let Some(food) = query::food(state) {
        sprites.push(SceneSprite::cell(cell_vec(food), SpriteRole::Food));
    }

    push_snake(sprites, query::snake(state), alpha, Some(fades));

    if let Some(shot) = query::breaker_shot(state) {
        sprites.push(centred(
            shot.position(),
            BREAKER_SHOT_SIZE,
            SpriteRole::BreakerShot,
        ));
    }
    for explosion in query::explosions(state) {
        let ring = ExplosionRing::at(explosion.progress());
        let centre = cell_center(explosion.cell());
        sprites.push(
            centred(centre, ring.radius * 2.0, SpriteRole::Explosion).with_alpha(ring.alpha),
        );
    }

    if let Some(side) = query::side_scroller(state) {
        let boss = side.boss();
        if boss.is_visible() {
            sprites.push(
                SceneSprite::cell(boss.position(), SpriteRole::Boss)
                    .with_size(Vec2::splat(BOSS_SIZE)),
            );
        }
        push_projectiles(sprites, side.player_shots(), SpriteRole::PlayerShot);
        push_projectiles(sprites, side.boss_bullets(), SpriteRole::BossBullet);
        if let Some(progress) = side.fade_progress() {
            scene.screen_fade = progress * BOSS_FADE_DEPTH;
        }
    }
}

fn push_walls(sprites: &mut Vec<SceneSprite>, state: &GameState, cells: &[GridCoord]) {
    let breakable = query::arena(state).breakable();
    sprites.extend(cells.iter().map(|cell| {
        let role = if breakable.contains(cell) {
            SpriteRole::BreakableWall
        } else {
            SpriteRole::Wall
        };
        SceneSprite::cell(cell_vec(*cell), role)
    }));
}

/// Pushes the snake tail first so the head draws on top.
fn push_snake(
    sprites: &mut Vec<SceneSprite>,
    snake: &Snake,
    alpha: f32,
    fades: Option<&FadeTracker>,
) {
    let segments = snake.segments();
    let previous = snake.previous_segments();
    let blended = snake.interpolated_positions(alpha);

    let mut drawn = Vec::with_capacity(segments.len());
    for (index, (cell, position)) in segments.iter().zip(blended).enumerate() {
        // A segment that wrapped around the grid jumps instead of sliding across it.
        let wrapped = previous
            .get(index)
            .is_some_and(|before| before.manhattan_distance(*cell) > 1);
        let position = if wrapped { cell_vec(*cell) } else { position };

        let sprite = if index == 0 {
            let frame = u8::try_from(snake.head_frame()).unwrap_or(0);
            SceneSprite::cell(position, SpriteRole::SnakeHead { frame })
                .with_rotation(rotation_for(snake.segment_orientation(0)))
        } else {
            let alpha = fades.map_or(1.0, |fades| fades.alpha_at(*cell));
            SceneSprite::cell(position, SpriteRole::SnakeBody)
                .with_rotation(rotation_for(snake.segment_orientation(index)))
                .with_alpha(alpha)
        };
        drawn.push(sprite);
    }
    sprites.extend(drawn.into_iter().rev());
}

fn push_projectiles(sprites: &mut Vec<SceneSprite>, projectiles: &[Projectile], role: SpriteRole) {
    sprites.extend(
        projectiles
            .iter()
            .map(|projectile| centred(projectile.position(), PROJECTILE_SIZE, role)),
    );
}

fn modal_overlay(state: &GameState, screen: Screen) -> Option<OverlayView> {
    match screen {
        Screen::Paused => Some(OverlayView {
            title: "Game Paused".to_owned(),
            lines: vec![
                "Press ENTER to begin".to_owned(),
                "ESC to go to main screen".to_owned(),
            ],
            boxed: true,
        }),
        Screen::LevelClear => Some(OverlayView {
            title: "Level Clear".to_owned(),
            lines: vec![
                format!("Score: {}", query::points(state)),
                "Press SPACE to continue".to_owned(),
            ],
            boxed: true,
        }),
        Screen::GameOver => Some(game_over_overlay(state)),
        _ => None,
    }
}

fn game_over_overlay(state: &GameState) -> OverlayView {
    let mut lines = Vec::new();
    if let Some(cause) = query::death_cause(state) {
        lines.push(death_message(cause).to_owned());
    }
    lines.push(format!("Score: {}", query::points(state)));

    if query::score_recorded(state) {
        lines.push("Replay level? SPACE | ESC for menu".to_owned());
    } else {
        let name = query::name_input(state);
        let name = if name.is_empty() { "_" } else { name };
        lines.push("Replay level? SPACE | ENTER to save | ESC to exit".to_owned());
        lines.push(format!("Name: {name}"));
        lines.push("Type your name, ENTER to save, SPACE to replay level".to_owned());
    }

    OverlayView {
        title: "Game Over".to_owned(),
        lines,
        boxed: false,
    }
}

const fn death_message(cause: DeathCause) -> &'static str {
    match cause {
        DeathCause::OutOfBounds => "You left the grid",
        DeathCause::Wall => "You hit a wall",
        DeathCause::LeftArena => "You left the arena",
        DeathCause::SelfCollision => "You bit your own tail",
        DeathCause::BossContact => "The guardian caught you",
        DeathCause::BossBullet => "A guardian bullet hit you",
    }
}

fn centred(centre: Vec2, size: f32, role: SpriteRole) -> SceneSprite {
    SceneSprite::cell(centre - Vec2::splat(size * 0.5), role).with_size(Vec2::splat(size))
}

fn cell_vec(cell: GridCoord) -> Vec2 {
    Vec2::new(cell.x() as f32, cell.y() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_quest_core::{
        Command, Direction, Event, GRID_HEIGHT, GRID_WIDTH, HUD_HEIGHT, TILE_SIZE,
    };
    use snake_quest_rendering::{palette, GridPresentation};
    use snake_quest_world::{self as world, Config};
    use std::time::Duration;

    fn scene_for(state: &GameState, entries: &[Entry]) -> Scene {
        let grid = GridPresentation::new(
            GRID_WIDTH as u32,
            GRID_HEIGHT as u32,
            TILE_SIZE as f32,
            HUD_HEIGHT as f32,
            palette::GRID,
        )
        .expect("valid grid");
        let mut scene = Scene::new(grid);
        populate(&mut scene, state, 1.0, &FadeTracker::new(), entries);
        scene
    }

    fn run(state: &mut GameState, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(state, command, &mut events);
        }
        events
    }

    fn playing_state() -> GameState {
        let mut state = GameState::new(Config::new().with_seed(11));
        let _ = run(
            &mut state,
            [Command::SkipIntro, Command::StartGame, Command::AdvanceStory],
        );
        let _ = run(
            &mut state,
            (0..10).map(|_| Command::Tick {
                dt: Duration::from_millis(200),
            }),
        );
        assert_eq!(query::screen(&state), Screen::Playing, "loading finished");
        state
    }

    #[test]
    fn main_menu_marks_the_cursor_row() {
        let mut state = GameState::new(Config::new());
        let _ = run(
            &mut state,
            [
                Command::SkipIntro,
                Command::NavigateMenu {
                    direction: Direction::South,
                },
            ],
        );
        let scene = scene_for(&state, &[]);
        let menu = scene.menu.expect("menu is shown");
        assert_eq!(menu.title, WINDOW_TITLE);
        let selected: Vec<&str> = menu
            .entries
            .iter()
            .filter(|entry| entry.selected)
            .map(|entry| entry.label.as_str())
            .collect();
        assert_eq!(selected, vec!["Settings"]);
        assert!(scene.sprites.is_empty(), "menus draw no playfield");
        assert_eq!(scene.hud, None);
    }

    #[test]
    fn leaderboard_page_lists_entries_or_placeholder() {
        let mut state = GameState::new(Config::new());
        let _ = run(
            &mut state,
            [
                Command::SkipIntro,
                Command::NavigateMenu {
                    direction: Direction::South,
                },
                Command::SelectMenuEntry,
                Command::NavigateMenu {
                    direction: Direction::South,
                },
                Command::NavigateMenu {
                    direction: Direction::South,
                },
                Command::SelectMenuEntry,
            ],
        );
        assert_eq!(
            query::screen(&state),
            Screen::Menu {
                page: MenuPage::Leaderboard
            }
        );

        let empty = scene_for(&state, &[]).menu.expect("menu is shown");
        assert_eq!(empty.entries.len(), 1);
        assert_eq!(empty.entries[0].label, "No scores yet");

        let entries = [Entry::new("Ada", 40), Entry::new("Bo", 12)];
        let listed = scene_for(&state, &entries).menu.expect("menu is shown");
        let labels: Vec<&str> = listed
            .entries
            .iter()
            .map(|entry| entry.label.as_str())
            .collect();
        assert_eq!(labels, vec!["1. Ada - 40", "2. Bo - 12"]);
        assert_eq!(listed.prompt, "Press ESC to return");
    }

    #[test]
    fn playing_scene_draws_one_head_and_the_food() {
        let state = playing_state();
        let scene = scene_for(&state, &[]);

        let heads = scene
            .sprites
            .iter()
            .filter(|sprite| matches!(sprite.role, SpriteRole::SnakeHead { .. }))
            .count();
        assert_eq!(heads, 1, "exactly one head sprite");
        let last = scene.sprites.last().expect("sprites are drawn");
        assert!(
            matches!(last.role, SpriteRole::SnakeHead { .. }),
            "the head draws on top of the body"
        );
        assert!(
            scene.sprites.iter().any(|sprite| sprite.role == SpriteRole::Food),
            "food is drawn"
        );
        let hud = scene.hud.expect("hud is shown");
        assert_eq!(hud.level, 1);
        assert_eq!(hud.ammo, None, "no shooting on the first level");
        assert_eq!(scene.overlay, None);
    }

    #[test]
    fn paused_and_game_over_show_overlays() {
        let mut state = playing_state();
        let _ = run(&mut state, [Command::Pause]);
        let paused = scene_for(&state, &[]);
        assert_eq!(paused.overlay.expect("overlay").title, "Game Paused");

        let _ = run(
            &mut state,
            [
                Command::Resume,
                Command::QueueDirection {
                    direction: Direction::North,
                },
            ],
        );
        for _ in 0..GRID_HEIGHT {
            if query::screen(&state) == Screen::GameOver {
                break;
            }
            let _ = run(&mut state, [Command::Step]);
        }
        assert_eq!(query::screen(&state), Screen::GameOver);

        let scene = scene_for(&state, &[]);
        assert!((scene.screen_fade - GAME_OVER_FADE).abs() < f32::EPSILON);
        let overlay = scene.overlay.expect("overlay");
        assert_eq!(overlay.title, "Game Over");
        assert!(overlay.lines.contains(&"Name: _".to_owned()));
    }
}
