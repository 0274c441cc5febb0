//! Keyboard handling
//!
//! Key events are first mapped to a [`WizardAction`] for the current page,
//! then applied to the [`Wizard`]. Both steps are pure so the key table can
//! be tested without a terminal.

use crate::wizard::{FieldEdit, QuitOutcome, Transition, Wizard, WizardPage};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

/// Everything a key can ask the wizard to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    /// Ctrl+C: leave immediately, even mid-install
    Exit,
    Quit,
    Forward,
    Back,
    CursorUp,
    CursorDown,
    Toggle,
    SelectAll,
    SelectNone,
    FocusNext,
    FocusPrev,
    /// Enter inside a form: next field, or the next page from the last one
    Submit,
    Edit(FieldEdit),
}

/// What the event loop should do after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
    StartInstall,
}

/// Map a key press to an action on `page`
pub fn map_key(page: WizardPage, key: KeyEvent) -> Option<WizardAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(WizardAction::Exit);
    }

    match page {
        WizardPage::Language => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(WizardAction::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => Some(WizardAction::CursorDown),
            KeyCode::Enter | KeyCode::Char(' ') => Some(WizardAction::Forward),
            KeyCode::Char('q') | KeyCode::Esc => Some(WizardAction::Quit),
            _ => None,
        },
        WizardPage::Welcome => match key.code {
            KeyCode::Enter | KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                Some(WizardAction::Forward)
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => Some(WizardAction::Back),
            KeyCode::Char('q') | KeyCode::Esc => Some(WizardAction::Quit),
            _ => None,
        },
        WizardPage::CodexConfig | WizardPage::ClaudeConfig => map_form_key(key),
        WizardPage::Installing => None,
        WizardPage::Done => match key.code {
            KeyCode::Enter | KeyCode::Char('q') | KeyCode::Esc => Some(WizardAction::Quit),
            _ => None,
        },
        _ => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(WizardAction::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => Some(WizardAction::CursorDown),
            KeyCode::Char(' ') => Some(WizardAction::Toggle),
            KeyCode::Char('a') => Some(WizardAction::SelectAll),
            KeyCode::Char('n') => Some(WizardAction::SelectNone),
            KeyCode::Enter | KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                Some(WizardAction::Forward)
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') | KeyCode::Esc => {
                Some(WizardAction::Back)
            }
            KeyCode::Char('q') => Some(WizardAction::Quit),
            _ => None,
        },
    }
}

/// Forms take every printable key as text
fn map_form_key(key: KeyEvent) -> Option<WizardAction> {
    let action = match key.code {
        KeyCode::Tab | KeyCode::Down => WizardAction::FocusNext,
        KeyCode::BackTab | KeyCode::Up => WizardAction::FocusPrev,
        KeyCode::Enter => WizardAction::Submit,
        KeyCode::Esc => WizardAction::Back,
        KeyCode::Backspace => WizardAction::Edit(FieldEdit::Backspace),
        KeyCode::Delete => WizardAction::Edit(FieldEdit::Delete),
        KeyCode::Left => WizardAction::Edit(FieldEdit::Left),
        KeyCode::Right => WizardAction::Edit(FieldEdit::Right),
        KeyCode::Home => WizardAction::Edit(FieldEdit::Home),
        KeyCode::End => WizardAction::Edit(FieldEdit::End),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            WizardAction::Edit(FieldEdit::Clear)
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            WizardAction::Edit(FieldEdit::Insert(c))
        }
        _ => return None,
    };
    Some(action)
}

/// Leaving the welcome page waits for the capability probe, so installed
/// items are known before anything can be selected or queued
pub fn blocked_while_probing(page: WizardPage, action: WizardAction) -> bool {
    page == WizardPage::Welcome && action == WizardAction::Forward
}

fn follow(transition: Option<Transition>) -> Flow {
    match transition {
        Some(Transition::EnterInstall) => Flow::StartInstall,
        _ => Flow::Continue,
    }
}

/// Apply an action to the wizard
pub fn apply(wizard: &mut Wizard, action: WizardAction) -> Flow {
    debug!(?action, page = ?wizard.page(), "wizard action");
    match action {
        WizardAction::Exit => return Flow::Exit,
        WizardAction::Quit => match wizard.quit() {
            QuitOutcome::Exit => return Flow::Exit,
            QuitOutcome::WentBack | QuitOutcome::Ignored => {}
        },
        WizardAction::Forward => return follow(wizard.forward()),
        WizardAction::Back => {
            wizard.back();
        }
        WizardAction::CursorUp => wizard.cursor_up(),
        WizardAction::CursorDown => wizard.cursor_down(),
        WizardAction::Toggle => wizard.toggle_current(),
        WizardAction::SelectAll => wizard.select_all(),
        WizardAction::SelectNone => wizard.select_none(),
        WizardAction::FocusNext => {
            if let Some(form) = wizard.form_mut() {
                form.focus_next();
            }
        }
        WizardAction::FocusPrev => {
            if let Some(form) = wizard.form_mut() {
                form.focus_prev();
            }
        }
        WizardAction::Submit => {
            let last = wizard.form().is_none_or(|f| f.is_last_focused());
            if last {
                return follow(wizard.forward());
            }
            if let Some(form) = wizard.form_mut() {
                form.focus_next();
            }
        }
        WizardAction::Edit(edit) => {
            if let Some(form) = wizard.form_mut() {
                form.edit(edit);
            }
        }
    }
    Flow::Continue
}
