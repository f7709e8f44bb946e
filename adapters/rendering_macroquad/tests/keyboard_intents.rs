use macroquad::input::KeyCode;
use snake_quest_core::Intent;
use snake_quest_rendering_macroquad::intents_from_keys;

fn keys(pressed: &[KeyCode]) -> Vec<Intent> {
    intents_from_keys(pressed.iter().copied(), std::iter::empty::<char>())
}

#[test]
fn arrows_and_wasd_share_directional_intents() {
    assert_eq!(
        keys(&[KeyCode::W, KeyCode::Left]),
        vec![Intent::Up, Intent::Left]
    );
    assert_eq!(
        keys(&[KeyCode::Down]),
        keys(&[KeyCode::S])
    );
}

#[test]
fn modal_keys_map_to_confirm_advance_and_cancel() {
    assert_eq!(
        keys(&[KeyCode::Escape, KeyCode::Space, KeyCode::Enter]),
        vec![Intent::Confirm, Intent::Advance, Intent::Cancel],
        "intents follow binding order"
    );
    assert_eq!(keys(&[KeyCode::Backspace]), vec![Intent::Erase]);
    assert_eq!(keys(&[KeyCode::F]), vec![Intent::Fire]);
}

#[test]
fn typed_characters_follow_key_intents_and_skip_punctuation() {
    let intents = intents_from_keys([KeyCode::A], ['a', ' ', '!', '7']);
    assert_eq!(
        intents,
        vec![Intent::Left, Intent::Text('a'), Intent::Text('7')]
    );
}

#[test]
fn unbound_keys_produce_nothing() {
    assert!(keys(&[KeyCode::Q, KeyCode::Tab]).is_empty());
}

#[test]
fn debug_shortcuts_are_reported_as_intents() {
    assert_eq!(
        keys(&[KeyCode::B, KeyCode::N]),
        vec![Intent::SkipLevel, Intent::JumpToBoss]
    );
}
