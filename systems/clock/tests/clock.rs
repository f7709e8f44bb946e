use std::time::Duration;

use snake_quest_core::{Command, Event, MenuPage, Screen, Settings, SpeedSetting, StoryBeat};
use snake_quest_system_clock::{Clock, Config};
use snake_quest_world::{self as world, query, GameState};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn frame(clock: &mut Clock, now: u64, events: &[Event]) -> Vec<Command> {
    let mut commands = Vec::new();
    clock.handle(ms(now), events, &mut commands);
    commands
}

fn steps(commands: &[Command]) -> usize {
    commands
        .iter()
        .filter(|command| matches!(command, Command::Step))
        .count()
}

#[test]
fn first_frame_anchors_without_time_debt() {
    let mut clock = Clock::new(Config::default(), Screen::Playing, SpeedSetting::Normal);
    let commands = frame(&mut clock, 5_000, &[]);
    assert_eq!(commands, vec![Command::Tick { dt: Duration::ZERO }]);

    let commands = frame(&mut clock, 5_100, &[]);
    assert_eq!(commands, vec![Command::Tick { dt: ms(100) }, Command::Step]);
}

#[test]
fn leftover_time_becomes_interpolation_factor() {
    let mut clock = Clock::new(Config::default(), Screen::Playing, SpeedSetting::Normal);
    let _ = frame(&mut clock, 0, &[]);
    let commands = frame(&mut clock, 150, &[]);
    assert_eq!(steps(&commands), 1);
    assert!(
        (clock.interpolation() - 0.5).abs() < 1e-4,
        "half a step remains, got {}",
        clock.interpolation()
    );

    let commands = frame(&mut clock, 200, &[]);
    assert_eq!(steps(&commands), 1, "accumulated halves add up to a step");
    assert!(clock.interpolation().abs() < 1e-4);
}

#[test]
fn frame_delta_is_clamped() {
    let mut clock = Clock::new(Config::default(), Screen::Playing, SpeedSetting::Normal);
    let _ = frame(&mut clock, 0, &[]);
    let commands = frame(&mut clock, 3_000, &[]);
    assert_eq!(commands[0], Command::Tick { dt: ms(200) });
    assert_eq!(steps(&commands), 2, "a stall only yields the clamped delta");
}

#[test]
fn capped_frames_discard_excess_time() {
    let config = Config::new(2, 1, Duration::from_secs(1));
    let mut clock = Clock::new(config, Screen::Playing, SpeedSetting::Normal);
    let _ = frame(&mut clock, 0, &[]);

    let commands = frame(&mut clock, 250, &[]);
    assert_eq!(steps(&commands), 2);
    assert_eq!(clock.accumulator(), ms(50), "remainder below one step is kept");

    let mut clock = Clock::new(config, Screen::Playing, SpeedSetting::Normal);
    let _ = frame(&mut clock, 0, &[]);
    let commands = frame(&mut clock, 450, &[]);
    assert_eq!(steps(&commands), 2, "steps stop at the cap");
    assert_eq!(clock.accumulator(), Duration::ZERO, "time beyond the cap is dropped");
}

#[test]
fn interstitials_use_their_own_pace_and_cap() {
    let config = Config::new(5, 4, Duration::from_secs(1));
    let mut clock = Clock::new(
        config,
        Screen::Story {
            beat: StoryBeat::Opening,
        },
        SpeedSetting::Normal,
    );
    let _ = frame(&mut clock, 0, &[]);
    assert_eq!(steps(&frame(&mut clock, 140, &[])), 1);
    assert_eq!(steps(&frame(&mut clock, 1_000, &[])), 4, "story steps are capped at four");

    let mut clock = Clock::new(config, Screen::Intro, SpeedSetting::Slow);
    let _ = frame(&mut clock, 0, &[]);
    assert_eq!(steps(&frame(&mut clock, 180, &[])), 2, "intro ignores the speed preset");
}

#[test]
fn loading_ticks_without_steps_and_menus_stay_idle() {
    let mut clock = Clock::new(Config::default(), Screen::Loading, SpeedSetting::Normal);
    let _ = frame(&mut clock, 0, &[]);
    assert_eq!(frame(&mut clock, 180, &[]), vec![Command::Tick { dt: ms(180) }]);

    let menu = Event::ScreenChanged {
        screen: Screen::Menu {
            page: MenuPage::Main,
        },
    };
    assert!(frame(&mut clock, 200, &[menu]).is_empty());
    assert!(frame(&mut clock, 400, &[]).is_empty());
}

#[test]
fn pause_freezes_the_accumulator() {
    let mut clock = Clock::new(Config::default(), Screen::Playing, SpeedSetting::Normal);
    let _ = frame(&mut clock, 0, &[]);
    let _ = frame(&mut clock, 160, &[]);
    assert_eq!(clock.accumulator(), ms(60));

    let paused = Event::ScreenChanged {
        screen: Screen::Paused,
    };
    assert!(frame(&mut clock, 170, &[paused]).is_empty());
    assert!(frame(&mut clock, 9_000, &[]).is_empty());

    let resumed = Event::ScreenChanged {
        screen: Screen::Playing,
    };
    let commands = frame(&mut clock, 10_000, &[resumed]);
    assert_eq!(commands, vec![Command::Tick { dt: Duration::ZERO }], "no debt after resume");
    assert_eq!(clock.accumulator(), ms(60), "partial step survives the pause");
    assert_eq!(steps(&frame(&mut clock, 10_040, &[])), 1);
}

#[test]
fn interpolation_holds_through_pause_and_resets_on_modals() {
    let mut clock = Clock::new(Config::default(), Screen::Playing, SpeedSetting::Normal);
    let _ = frame(&mut clock, 0, &[]);
    let _ = frame(&mut clock, 50, &[]);
    let before = clock.interpolation();
    assert!((before - 0.5).abs() < 1e-4, "half a step elapsed, got {before}");

    let paused = Event::ScreenChanged {
        screen: Screen::Paused,
    };
    let _ = frame(&mut clock, 60, &[paused]);
    let _ = frame(&mut clock, 2_000, &[]);
    assert!(
        (clock.interpolation() - before).abs() < 1e-4,
        "paused snake stays where it was drawn, got {}",
        clock.interpolation()
    );

    let resumed = Event::ScreenChanged {
        screen: Screen::Playing,
    };
    let _ = frame(&mut clock, 2_100, &[resumed]);
    assert!((clock.interpolation() - before).abs() < 1e-4, "no jump on resume");

    for screen in [Screen::LevelClear, Screen::GameOver] {
        let mut clock = Clock::new(Config::default(), Screen::Playing, SpeedSetting::Normal);
        let _ = frame(&mut clock, 0, &[]);
        let _ = frame(&mut clock, 50, &[]);
        let _ = frame(&mut clock, 60, &[Event::ScreenChanged { screen }]);
        assert_eq!(clock.interpolation(), 0.0, "{screen:?} draws previous cells");
    }
}

#[test]
fn speed_changes_follow_settings_events() {
    let mut clock = Clock::new(Config::default(), Screen::Playing, SpeedSetting::Normal);
    let slow = Event::SettingsChanged {
        settings: Settings {
            speed: SpeedSetting::Slow,
            sound_on: true,
        },
    };
    let _ = frame(&mut clock, 0, &[slow]);
    assert_eq!(steps(&frame(&mut clock, 150, &[])), 0, "slow preset steps every 200 ms");
    assert_eq!(steps(&frame(&mut clock, 200, &[])), 1);
}

fn pump(state: &mut GameState, clock: &mut Clock, events: &mut Vec<Event>, now: u64) {
    let mut commands = Vec::new();
    clock.handle(ms(now), events, &mut commands);
    events.clear();
    for command in commands {
        world::apply(state, command, events);
    }
}

#[test]
fn drives_the_world_from_intro_to_playing() {
    let mut state = GameState::new(world::Config::new().with_seed(3));
    let mut clock = Clock::new(Config::default(), query::screen(&state), SpeedSetting::Normal);
    let mut events = Vec::new();
    let mut now = 0;

    while query::screen(&state) == Screen::Intro && now < 60_000 {
        pump(&mut state, &mut clock, &mut events, now);
        now += 16;
    }
    assert_eq!(
        query::screen(&state),
        Screen::Menu {
            page: MenuPage::Main
        },
        "intro finishes on its own"
    );

    world::apply(&mut state, Command::StartGame, &mut events);
    world::apply(&mut state, Command::AdvanceStory, &mut events);
    assert_eq!(query::screen(&state), Screen::Loading);

    let loading_started = now;
    while query::screen(&state) == Screen::Loading && now < loading_started + 10_000 {
        pump(&mut state, &mut clock, &mut events, now);
        now += 16;
    }
    assert_eq!(query::screen(&state), Screen::Playing);
    assert!(now - loading_started >= 2_000, "loading lasts two seconds of frame time");
}
