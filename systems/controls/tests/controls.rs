use std::time::Duration;

use snake_quest_core::{Command, Direction, Event, Intent, MenuPage, Screen, SpeedSetting};
use snake_quest_system_controls::Controls;
use snake_quest_world::{self as world, query, Config, GameState};

struct Harness {
    state: GameState,
    controls: Controls,
    events: Vec<Event>,
}

impl Harness {
    fn new(config: Config) -> Self {
        let state = GameState::new(config);
        let controls = Controls::new(query::screen(&state));
        Self {
            state,
            controls,
            events: Vec::new(),
        }
    }

    fn press(&mut self, intent: Intent) -> Vec<Command> {
        let mut commands = Vec::new();
        self.controls.handle(&self.events, &[intent], &mut commands);
        self.events.clear();
        for command in &commands {
            world::apply(&mut self.state, command.clone(), &mut self.events);
        }
        commands
    }

    fn tick(&mut self, ms: u64) {
        world::apply(
            &mut self.state,
            Command::Tick {
                dt: Duration::from_millis(ms),
            },
            &mut self.events,
        );
    }

    fn screen(&self) -> Screen {
        query::screen(&self.state)
    }
}

fn into_play(harness: &mut Harness) {
    let _ = harness.press(Intent::Confirm);
    let _ = harness.press(Intent::Confirm);
    let _ = harness.press(Intent::Advance);
    assert_eq!(harness.screen(), Screen::Loading);
    for _ in 0..10 {
        harness.tick(200);
    }
    assert_eq!(harness.screen(), Screen::Playing);
}

#[test]
fn menu_intents_follow_the_active_page() {
    let mut harness = Harness::new(Config::new());
    assert_eq!(harness.press(Intent::Advance), vec![Command::SkipIntro]);
    assert_eq!(
        harness.screen(),
        Screen::Menu {
            page: MenuPage::Main
        }
    );

    let _ = harness.press(Intent::Down);
    let _ = harness.press(Intent::Confirm);
    assert_eq!(
        harness.screen(),
        Screen::Menu {
            page: MenuPage::Settings
        }
    );

    let _ = harness.press(Intent::Left);
    assert_eq!(query::settings(&harness.state).speed, SpeedSetting::Slow);

    let _ = harness.press(Intent::Down);
    let _ = harness.press(Intent::Down);
    let _ = harness.press(Intent::Confirm);
    assert_eq!(
        harness.screen(),
        Screen::Menu {
            page: MenuPage::Leaderboard
        }
    );

    assert_eq!(harness.press(Intent::Advance), vec![Command::MenuBack]);
    let _ = harness.press(Intent::Erase);
    assert_eq!(
        harness.screen(),
        Screen::Menu {
            page: MenuPage::Main
        }
    );

    assert_eq!(harness.press(Intent::Cancel), vec![Command::Quit]);
    assert!(!query::is_running(&harness.state));
}

#[test]
fn gameplay_intents_steer_and_pause() {
    let mut harness = Harness::new(Config::new().with_seed(6));
    let _ = harness.press(Intent::Cancel);
    into_play(&mut harness);

    assert_eq!(
        harness.press(Intent::Down),
        vec![Command::QueueDirection {
            direction: Direction::South
        }]
    );
    assert_eq!(query::snake(&harness.state).pending_direction(), Direction::South);

    let _ = harness.press(Intent::Confirm);
    assert_eq!(harness.screen(), Screen::Paused);
    let _ = harness.press(Intent::Confirm);
    assert_eq!(harness.screen(), Screen::Playing);

    let _ = harness.press(Intent::Confirm);
    let _ = harness.press(Intent::Cancel);
    assert_eq!(
        harness.screen(),
        Screen::Menu {
            page: MenuPage::Main
        },
        "cancel while paused returns to the menu"
    );
}

#[test]
fn story_cancel_returns_to_menu() {
    let mut harness = Harness::new(Config::new());
    let _ = harness.press(Intent::Advance);
    let _ = harness.press(Intent::Confirm);
    assert!(matches!(harness.screen(), Screen::Story { .. }));
    assert_eq!(harness.press(Intent::Cancel), vec![Command::ExitToMenu]);
    assert_eq!(
        harness.screen(),
        Screen::Menu {
            page: MenuPage::Main
        }
    );
}

#[test]
fn game_over_typing_reaches_the_name_field() {
    let mut harness = Harness::new(Config::new().with_seed(6));
    let _ = harness.press(Intent::Cancel);
    into_play(&mut harness);

    let _ = harness.press(Intent::Up);
    for _ in 0..30 {
        world::apply(&mut harness.state, Command::Step, &mut harness.events);
    }
    assert_eq!(harness.screen(), Screen::GameOver);

    for character in "Rex!".chars() {
        let _ = harness.press(Intent::Text(character));
    }
    let _ = harness.press(Intent::Erase);
    assert_eq!(query::name_input(&harness.state), "Re");

    let commands = harness.press(Intent::Advance);
    assert_eq!(commands, vec![Command::RecordScore, Command::ReplayLevel]);
    assert_eq!(harness.screen(), Screen::Loading, "advance replays the level");
}

#[test]
fn debug_intents_are_ignored_without_the_channel() {
    if cfg!(feature = "debug-commands") {
        return;
    }
    let mut controls = Controls::new(Screen::Playing);
    let mut out = Vec::new();
    controls.handle(&[], &[Intent::SkipLevel, Intent::JumpToBoss], &mut out);
    assert!(out.is_empty(), "release bindings never emit debug commands");
}

#[test]
fn game_over_cancel_leaves_for_the_menu_once_the_score_is_saved() {
    let mut harness = Harness::new(Config::new().with_seed(6));
    let _ = harness.press(Intent::Cancel);
    into_play(&mut harness);

    let _ = harness.press(Intent::Up);
    for _ in 0..30 {
        world::apply(&mut harness.state, Command::Step, &mut harness.events);
    }
    assert_eq!(harness.screen(), Screen::GameOver);

    let mut unsaved = Controls::new(Screen::GameOver);
    let mut out = Vec::new();
    unsaved.handle(&[], &[Intent::Cancel], &mut out);
    assert_eq!(out, vec![Command::Quit], "cancel quits before the score is saved");

    assert_eq!(harness.press(Intent::Confirm), vec![Command::RecordScore]);
    assert!(query::score_recorded(&harness.state));
    assert_eq!(harness.press(Intent::Cancel), vec![Command::ExitToMenu]);
    assert_eq!(
        harness.screen(),
        Screen::Menu {
            page: MenuPage::Main
        },
        "a saved game over returns to the title menu"
    );
}
