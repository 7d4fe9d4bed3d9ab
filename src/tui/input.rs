//! Key binding dispatch for the TUI.
//!
//! Ctrl+C quits from anywhere. On the writing screen every printable key goes into the text,
//! Tab opens the writings list and Esc quits. The list and the read-only view have their own
//! small set of keys, listed in each screen's hint line.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::buffer::Edit;

use super::app::{Command, Screen};

const PAGE: u16 = 10;

/// Translate a key press into a command for the current screen.
pub fn handle_key(screen: &Screen, key: KeyEvent) -> Command {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Command::Quit;
    }

    match screen {
        Screen::Writing => writing_key(key),
        Screen::List { .. } => list_key(key),
        Screen::Detail { .. } => detail_key(key),
    }
}

/// Pasted text only lands on the writing screen.
pub fn handle_paste(screen: &Screen, text: String) -> Command {
    match screen {
        Screen::Writing => Command::Edit(Edit::Paste(text)),
        _ => Command::None,
    }
}

fn writing_key(key: KeyEvent) -> Command {
    match key.code {
        KeyCode::Esc => Command::Quit,
        KeyCode::Tab => Command::OpenList,
        KeyCode::Enter => Command::Edit(Edit::Insert('\n')),
        KeyCode::Backspace => Command::Edit(Edit::Backspace),
        KeyCode::Delete => Command::Edit(Edit::Delete),
        KeyCode::Left => Command::Edit(Edit::Left),
        KeyCode::Right => Command::Edit(Edit::Right),
        KeyCode::Home => Command::Edit(Edit::Home),
        KeyCode::End => Command::Edit(Edit::End),
        KeyCode::Char(_) if is_chord(key.modifiers) => Command::None,
        KeyCode::Char(c) => Command::Edit(Edit::Insert(c)),
        _ => Command::None,
    }
}

/// Ctrl or Alt chords are not text. AltGr arrives as Ctrl+Alt and is.
fn is_chord(modifiers: KeyModifiers) -> bool {
    modifiers.contains(KeyModifiers::CONTROL) != modifiers.contains(KeyModifiers::ALT)
}

fn list_key(key: KeyEvent) -> Command {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Command::SelectPrevious,
        KeyCode::Down | KeyCode::Char('j') => Command::SelectNext,
        KeyCode::Enter => Command::OpenSelected,
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => Command::BackToWriting,
        _ => Command::None,
    }
}

fn detail_key(key: KeyEvent) -> Command {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Command::ScrollUp(1),
        KeyCode::Down | KeyCode::Char('j') => Command::ScrollDown(1),
        KeyCode::PageUp => Command::ScrollUp(PAGE),
        KeyCode::PageDown => Command::ScrollDown(PAGE),
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('w') => Command::BackToWriting,
        _ => Command::None,
    }
}
