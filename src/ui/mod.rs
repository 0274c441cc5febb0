//! UI rendering module
//!
//! Rendering is a pure function of [`AppState`]:
//! - `header` - title bar, step bar and the key-hint footer
//! - `screens` - language, welcome, selection lists and config forms
//! - `installer` - install progress and the final summary

mod header;
mod installer;
mod screens;

use crate::app::AppState;
use crate::wizard::WizardPage;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

/// Render the complete UI
pub fn render(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Length(1), // Step bar
            Constraint::Min(3),    // Page content
            Constraint::Length(1), // Key hints
        ])
        .split(f.area());

    let wizard = &state.wizard;
    header::render_title_bar(f, chunks[0], wizard);
    header::render_step_bar(f, chunks[1], wizard);

    match wizard.page() {
        WizardPage::Language => screens::render_language(f, chunks[2], wizard),
        WizardPage::Welcome => screens::render_welcome(f, chunks[2], state),
        WizardPage::CodexConfig | WizardPage::ClaudeConfig => {
            screens::render_form(f, chunks[2], wizard)
        }
        WizardPage::Installing => installer::render_progress(f, chunks[2], state),
        WizardPage::Done => installer::render_done(f, chunks[2], state),
        _ => screens::render_selection(f, chunks[2], state),
    }

    header::render_nav_bar(f, chunks[3], wizard);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{self, WizardAction};
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::PathBuf;

    fn screen_text(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn state() -> AppState {
        AppState::new(10, PathBuf::from("/tmp/.freshbox/install.log"))
    }

    #[test]
    fn test_language_page_lists_languages() {
        let text = screen_text(&state());
        assert!(text.contains("Select your language"));
        assert!(text.contains("English"));
    }

    #[test]
    fn test_dev_tools_page_lists_catalog() {
        let mut state = state();
        input::apply(&mut state.wizard, WizardAction::Forward);
        input::apply(&mut state.wizard, WizardAction::Forward);
        let text = screen_text(&state);
        assert!(text.contains("Homebrew"));
        assert!(text.contains("[ ]"));
    }
}
