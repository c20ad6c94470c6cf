//! Key bindings: arrows plus vim-style letters.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use blockfall::game::Input;

/// What a key press asks the front end to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Play(Input),
    Restart,
    None,
}

pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Play(Input::Quit);
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Play(Input::Quit),
        KeyCode::Left | KeyCode::Char('h') => Action::Play(Input::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') => Action::Play(Input::MoveRight),
        KeyCode::Down | KeyCode::Char('j') => Action::Play(Input::SoftDrop),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('x') => Action::Play(Input::Rotate),
        KeyCode::Char(' ') | KeyCode::Enter => Action::Play(Input::HardDrop),
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Action {
        key_to_action(KeyEvent::new(code, modifiers))
    }

    fn key(code: KeyCode) -> Action {
        press(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_vim_letters_move() {
        assert_eq!(key(KeyCode::Left), Action::Play(Input::MoveLeft));
        assert_eq!(key(KeyCode::Char('h')), Action::Play(Input::MoveLeft));
        assert_eq!(key(KeyCode::Right), Action::Play(Input::MoveRight));
        assert_eq!(key(KeyCode::Char('l')), Action::Play(Input::MoveRight));
        assert_eq!(key(KeyCode::Down), Action::Play(Input::SoftDrop));
        assert_eq!(key(KeyCode::Char('j')), Action::Play(Input::SoftDrop));
    }

    #[test]
    fn rotate_keys() {
        for code in [KeyCode::Up, KeyCode::Char('k'), KeyCode::Char('x')] {
            assert_eq!(key(code), Action::Play(Input::Rotate), "{code:?}");
        }
    }

    #[test]
    fn space_and_enter_hard_drop() {
        assert_eq!(key(KeyCode::Char(' ')), Action::Play(Input::HardDrop));
        assert_eq!(key(KeyCode::Enter), Action::Play(Input::HardDrop));
    }

    #[test]
    fn quit_keys() {
        assert_eq!(key(KeyCode::Char('q')), Action::Play(Input::Quit));
        assert_eq!(key(KeyCode::Esc), Action::Play(Input::Quit));
        assert_eq!(
            press(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Action::Play(Input::Quit)
        );
    }

    #[test]
    fn shifted_letters_still_map() {
        assert_eq!(press(KeyCode::Char('Q'), KeyModifiers::SHIFT), Action::Play(Input::Quit));
        assert_eq!(press(KeyCode::Char('R'), KeyModifiers::SHIFT), Action::Restart);
    }

    #[test]
    fn r_restarts() {
        assert_eq!(key(KeyCode::Char('r')), Action::Restart);
    }

    #[test]
    fn other_modifiers_are_ignored() {
        assert_eq!(press(KeyCode::Char('h'), KeyModifiers::ALT), Action::None);
        assert_eq!(press(KeyCode::Char('q'), KeyModifiers::CONTROL), Action::None);
        assert_eq!(press(KeyCode::Left, KeyModifiers::ALT), Action::None);
    }

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(key(KeyCode::Char('z')), Action::None);
        assert_eq!(key(KeyCode::Tab), Action::None);
    }
}
