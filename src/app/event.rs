// src/app/event.rs
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::InputKind;

/// What a key press asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    StartInput(InputKind),
    InputChar(char),
    InputBackspace,
    InputSubmit,
    InputCancel,
    MoveUp,
    MoveDown,
    Open,
    Up,
    Breadcrumb(usize),
    CycleSort,
    ToggleOrder,
    ToggleHidden,
    ToggleBookmark,
    Retry,
    CyclePanel,
    Delete,
    Save,
    CyclePeriod,
    Export,
    CidStats,
    NewGroup,
    RenameGroup,
    AddToGroup,
}

/// Map a key press to a command. While a prompt is open every printable key is text.
pub fn map_key(key: KeyEvent, typing: bool) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    if typing {
        return match key.code {
            KeyCode::Enter => Some(Command::InputSubmit),
            KeyCode::Esc => Some(Command::InputCancel),
            KeyCode::Backspace => Some(Command::InputBackspace),
            KeyCode::Char(c) => Some(Command::InputChar(c)),
            _ => None,
        };
    }
    let command = match key.code {
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Char('/') => Command::StartInput(InputKind::Filter),
        KeyCode::Char(':') | KeyCode::Char('g') => Command::StartInput(InputKind::OpenCid),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Command::Open,
        KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => Command::Up,
        KeyCode::Up | KeyCode::Char('k') => Command::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Command::MoveDown,
        KeyCode::Char(c @ '0'..='9') => Command::Breadcrumb(c as usize - '0' as usize),
        KeyCode::Char('#') => Command::StartInput(InputKind::GoToCrumb),
        KeyCode::Char('s') => Command::CycleSort,
        KeyCode::Char('o') => Command::ToggleOrder,
        KeyCode::Char('.') => Command::ToggleHidden,
        KeyCode::Char('b') => Command::ToggleBookmark,
        KeyCode::Char('r') => Command::Retry,
        KeyCode::Tab => Command::CyclePanel,
        KeyCode::Char('d') | KeyCode::Delete => Command::Delete,
        KeyCode::Char('w') => Command::Save,
        KeyCode::Char('p') => Command::CyclePeriod,
        KeyCode::Char('e') => Command::Export,
        KeyCode::Char('i') => Command::CidStats,
        KeyCode::Char('n') => Command::NewGroup,
        KeyCode::Char('R') => Command::RenameGroup,
        KeyCode::Char('a') => Command::AddToGroup,
        _ => return None,
    };
    Some(command)
}
