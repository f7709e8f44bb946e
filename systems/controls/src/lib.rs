#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Translates logical player intents into the commands valid on each screen.
//!
//! The system tracks the active [`Screen`] from world events so that the same
//! key can pause gameplay, select a menu entry or record a score depending on
//! context. Debug shortcuts are compiled in only with the `debug-commands`
//! feature.

use snake_quest_core::{Command, Direction, Event, Intent, MenuPage, Screen, SpeedSetting};

/// Pure system mapping intents to world commands.
#[derive(Debug)]
pub struct Controls {
    screen: Screen,
    score_recorded: bool,
}

impl Controls {
    /// Creates a controls system for the provided starting screen.
    #[must_use]
    pub const fn new(screen: Screen) -> Self {
        Self {
            screen,
            score_recorded: false,
        }
    }

    /// Screen whose bindings are currently active.
    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    /// Consumes world events and emits the commands requested by `intents`.
    pub fn handle(&mut self, events: &[Event], intents: &[Intent], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::ScreenChanged { screen } => {
                    self.screen = *screen;
                    self.score_recorded = false;
                }
                Event::ScoreSubmitted { .. } => self.score_recorded = true,
                _ => {}
            }
        }

        for intent in intents {
            if debug_command(*intent, out) {
                continue;
            }
            translate(self.screen, self.score_recorded, *intent, out);
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(Screen::Intro)
    }
}

fn translate(screen: Screen, score_recorded: bool, intent: Intent, out: &mut Vec<Command>) {
    if matches!(intent, Intent::SkipLevel | Intent::JumpToBoss) {
        return;
    }

    match screen {
        Screen::Intro => out.push(Command::SkipIntro),
        Screen::Menu { page } => menu(page, intent, out),
        Screen::Story { .. } => match intent {
            Intent::Confirm | Intent::Advance => out.push(Command::AdvanceStory),
            Intent::Cancel => out.push(Command::ExitToMenu),
            _ => {}
        },
        Screen::Loading => {
            if intent == Intent::Cancel {
                out.push(Command::Quit);
            }
        }
        Screen::Playing | Screen::SideScroller => {
            if let Some(direction) = intent.direction() {
                out.push(Command::QueueDirection { direction });
                return;
            }
            match intent {
                Intent::Fire => out.push(Command::Fire),
                Intent::Confirm => out.push(Command::Pause),
                Intent::Cancel => out.push(Command::Quit),
                _ => {}
            }
        }
        Screen::Paused => match intent {
            Intent::Confirm => out.push(Command::Resume),
            Intent::Cancel => out.push(Command::ExitToMenu),
            _ => {}
        },
        Screen::LevelClear => match intent {
            Intent::Confirm | Intent::Advance => out.push(Command::AcknowledgeLevelClear),
            Intent::Cancel => out.push(Command::Quit),
            _ => {}
        },
        Screen::GameOver => match intent {
            Intent::Text(character) => out.push(Command::EditName { character }),
            Intent::Erase => out.push(Command::EraseNameCharacter),
            Intent::Confirm => out.push(Command::RecordScore),
            Intent::Advance => {
                out.push(Command::RecordScore);
                out.push(Command::ReplayLevel);
            }
            Intent::Cancel if score_recorded => out.push(Command::ExitToMenu),
            Intent::Cancel => out.push(Command::Quit),
            _ => {}
        },
    }
}

fn menu(page: MenuPage, intent: Intent, out: &mut Vec<Command>) {
    match page {
        MenuPage::Main => match intent {
            Intent::Up | Intent::Down => out.push(Command::NavigateMenu {
                direction: vertical(intent),
            }),
            Intent::Confirm | Intent::Advance => out.push(Command::SelectMenuEntry),
            Intent::Cancel => out.push(Command::Quit),
            _ => {}
        },
        MenuPage::Settings => {
            if let Some(direction) = intent.direction() {
                out.push(Command::NavigateMenu { direction });
                return;
            }
            match intent {
                Intent::Confirm => out.push(Command::SelectMenuEntry),
                Intent::Cancel | Intent::Erase => out.push(Command::MenuBack),
                Intent::Text(key) => {
                    if let Some(speed) = SpeedSetting::from_shortcut(key) {
                        out.push(Command::SelectSpeed { speed });
                    }
                }
                _ => {}
            }
        }
        MenuPage::Leaderboard => {
            if matches!(
                intent,
                Intent::Confirm | Intent::Advance | Intent::Cancel | Intent::Erase
            ) {
                out.push(Command::MenuBack);
            }
        }
    }
}

fn vertical(intent: Intent) -> Direction {
    if intent == Intent::Up {
        Direction::North
    } else {
        Direction::South
    }
}

#[cfg(feature = "debug-commands")]
fn debug_command(intent: Intent, out: &mut Vec<Command>) -> bool {
    use snake_quest_core::DebugCommand;

    let command = match intent {
        Intent::SkipLevel => DebugCommand::SkipLevel,
        Intent::JumpToBoss => DebugCommand::JumpToBoss,
        _ => return false,
    };
    out.push(Command::Debug { command });
    true
}

#[cfg(not(feature = "debug-commands"))]
fn debug_command(_intent: Intent, _out: &mut Vec<Command>) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(screen: Screen, intent: Intent) -> Vec<Command> {
        let mut controls = Controls::new(screen);
        let mut out = Vec::new();
        controls.handle(&[], &[intent], &mut out);
        out
    }

    #[test]
    fn any_key_skips_the_intro() {
        for intent in [Intent::Confirm, Intent::Left, Intent::Text('q'), Intent::Fire] {
            assert_eq!(commands(Screen::Intro, intent), vec![Command::SkipIntro]);
        }
    }

    #[test]
    fn advance_on_game_over_records_then_replays() {
        assert_eq!(
            commands(Screen::GameOver, Intent::Advance),
            vec![Command::RecordScore, Command::ReplayLevel]
        );
        assert_eq!(
            commands(Screen::GameOver, Intent::Text('Z')),
            vec![Command::EditName { character: 'Z' }]
        );
    }

    #[test]
    fn digit_keys_pick_a_speed_on_the_settings_page() {
        let settings = Screen::Menu {
            page: MenuPage::Settings,
        };
        assert_eq!(
            commands(settings, Intent::Text('3')),
            vec![Command::SelectSpeed {
                speed: SpeedSetting::Fast
            }]
        );
        assert_eq!(
            commands(settings, Intent::Text('1')),
            vec![Command::SelectSpeed {
                speed: SpeedSetting::Slow
            }]
        );
        assert!(commands(settings, Intent::Text('4')).is_empty());
        assert!(commands(Screen::Menu { page: MenuPage::Main }, Intent::Text('2')).is_empty());
    }

    #[test]
    fn confirm_toggles_between_pause_and_resume() {
        assert_eq!(commands(Screen::Playing, Intent::Confirm), vec![Command::Pause]);
        assert_eq!(commands(Screen::Paused, Intent::Confirm), vec![Command::Resume]);
        assert!(commands(Screen::Paused, Intent::Up).is_empty(), "paused ignores steering");
    }
}
