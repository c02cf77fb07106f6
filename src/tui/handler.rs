use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    Quit,
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    // List editing
    NewUpdate,
    EditUpdate,
    RemoveUpdate,
    ShiftUpdateUp,
    ShiftUpdateDown,
    ToggleKey,
    Submit,
    ShowHelp,
    HideHelp,
    // Draft input
    DraftChar(char),
    DraftNewline,
    DraftBackspace,
    DraftNextField,
    DraftConfirm,
    DraftCancel,
}

pub fn handle_key_event(
    key: KeyEvent,
    draft_active: bool,
    show_help: bool,
) -> Option<EditorAction> {
    // If help is showing, any key closes it
    if show_help {
        return Some(EditorAction::HideHelp);
    }

    if draft_active {
        return match (key.code, key.modifiers) {
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => Some(EditorAction::DraftConfirm),
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(EditorAction::DraftCancel),
            (KeyCode::Enter, KeyModifiers::ALT) => Some(EditorAction::DraftNewline),
            (KeyCode::Enter, _) => Some(EditorAction::DraftConfirm),
            (KeyCode::Esc, _) => Some(EditorAction::DraftCancel),
            (KeyCode::Tab, _) => Some(EditorAction::DraftNextField),
            (KeyCode::Backspace, _) => Some(EditorAction::DraftBackspace),
            (KeyCode::Char(c), _) => Some(EditorAction::DraftChar(c)),
            _ => None,
        };
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => Some(EditorAction::Quit),
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(EditorAction::Quit),

        (KeyCode::Char('J'), _) => Some(EditorAction::ShiftUpdateDown),
        (KeyCode::Char('K'), _) => Some(EditorAction::ShiftUpdateUp),
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(EditorAction::MoveDown),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(EditorAction::MoveUp),
        (KeyCode::Char('<'), _) => Some(EditorAction::MoveToTop),
        (KeyCode::Char('>'), _) => Some(EditorAction::MoveToBottom),

        (KeyCode::Char('a'), _) => Some(EditorAction::NewUpdate),
        (KeyCode::Char('e'), _) | (KeyCode::Enter, _) => Some(EditorAction::EditUpdate),
        (KeyCode::Char('d'), _) => Some(EditorAction::RemoveUpdate),
        (KeyCode::Char('x'), _) => Some(EditorAction::ToggleKey),
        (KeyCode::Char('s'), _) => Some(EditorAction::Submit),

        (KeyCode::Char('?'), _) => Some(EditorAction::ShowHelp),

        _ => None,
    }
}
