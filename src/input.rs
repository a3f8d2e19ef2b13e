use crate::app::InputMode;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    DismissError,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ToggleCollapsed,
    ToggleCommitMessage,
    EditVariantFilter,
    EditTaskFilter,
    FilterInput(char),
    FilterBackspace,
    FinishFilter,
    NextPage,
    PrevPage,
    Reload,
    ShowDetails,
    ShowCellDetails,
    CloseOverlay,
    None,
}

/// Captures the UI state needed to interpret a key press.
#[derive(Debug, Clone, Default)]
pub struct InputContext {
    pub has_error: bool,
    pub is_loading: bool,
    pub has_overlay: bool,
    pub input_mode: InputMode,
}

pub fn map_key(key: KeyEvent, ctx: &InputContext) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if ctx.has_overlay {
        return match key.code {
            KeyCode::Char('q' | 'd') | KeyCode::Esc | KeyCode::Enter => Action::CloseOverlay,
            _ => Action::None,
        };
    }

    // Filter boxes swallow plain characters
    if ctx.input_mode != InputMode::Normal {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc => Action::FinishFilter,
            KeyCode::Backspace => Action::FilterBackspace,
            KeyCode::Char(c) => Action::FilterInput(c),
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc => {
            if ctx.has_error {
                Action::DismissError
            } else {
                Action::Quit
            }
        }
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Char('c') => Action::ToggleCollapsed,
        KeyCode::Char('m') => Action::ToggleCommitMessage,
        KeyCode::Char('/') => Action::EditVariantFilter,
        KeyCode::Char('t') => Action::EditTaskFilter,
        KeyCode::Char('n' | ']') if !ctx.is_loading => Action::NextPage,
        KeyCode::Char('p' | '[') if !ctx.is_loading => Action::PrevPage,
        KeyCode::Char('r') if !ctx.is_loading => Action::Reload,
        KeyCode::Char('d') => Action::ShowDetails,
        KeyCode::Enter => Action::ShowCellDetails,
        _ => Action::None,
    }
}
