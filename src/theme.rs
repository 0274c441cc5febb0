//! Centralized theme and styling for the TUI
//!
//! Every color the wizard draws with lives here, so the render code never
//! hardcodes one.
//!
//! # Usage
//! ```rust
//! use freshbox::theme::{Colors, Styles, Theme};
//! use ratatui::style::Style;
//!
//! let style = Style::default().fg(Colors::PRIMARY);
//! let title_style = Styles::title();
//! let row_style = Theme::row_style(true, false, false);
//! ```

use ratatui::style::{Color, Modifier, Style};
use std::time::Duration;

/// Braille spinner shown next to the running task
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette for the application
pub struct Colors;

impl Colors {
    // -------------------------------------------------------------------------
    // Base Colors
    // -------------------------------------------------------------------------

    /// Title bar background
    pub const BG_TITLE: Color = Color::Rgb(30, 27, 75);

    /// Inactive step background
    pub const BG_TAB: Color = Color::Rgb(31, 41, 55);

    /// Gauge background
    pub const BG_GAUGE: Color = Color::Rgb(55, 65, 81);

    pub const FG_PRIMARY: Color = Color::Rgb(249, 250, 251);

    /// Hints, versions, placeholders
    pub const FG_MUTED: Color = Color::Rgb(107, 114, 128);

    /// Unchecked boxes
    pub const FG_FAINT: Color = Color::Rgb(55, 65, 81);

    // -------------------------------------------------------------------------
    // Accent Colors
    // -------------------------------------------------------------------------

    /// Titles, focused fields, progress
    pub const PRIMARY: Color = Color::Rgb(6, 182, 212);

    /// Subtitles, borders, active step
    pub const SECONDARY: Color = Color::Rgb(124, 58, 237);

    /// Cursor marker
    pub const CURSOR: Color = Color::Rgb(236, 72, 153);

    // -------------------------------------------------------------------------
    // Semantic Colors
    // -------------------------------------------------------------------------

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129);

    pub const WARNING: Color = Color::Rgb(245, 158, 11);

    pub const ERROR: Color = Color::Rgb(239, 68, 68);
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

pub struct Styles;

impl Styles {
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .bg(Colors::BG_TITLE)
            .add_modifier(Modifier::BOLD)
    }

    pub fn subtitle() -> Style {
        Style::default()
            .fg(Colors::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Colors::SECONDARY)
    }

    pub fn cursor() -> Style {
        Style::default()
            .fg(Colors::CURSOR)
            .add_modifier(Modifier::BOLD)
    }

    pub fn checked() -> Style {
        Style::default()
            .fg(Colors::SUCCESS)
            .add_modifier(Modifier::BOLD)
    }

    pub fn unchecked() -> Style {
        Style::default().fg(Colors::FG_FAINT)
    }

    /// Already on the machine
    pub fn installed() -> Style {
        Style::default()
            .fg(Colors::SUCCESS)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn version() -> Style {
        Style::default()
            .fg(Colors::FG_MUTED)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn step_active() -> Style {
        Style::default()
            .fg(Colors::FG_PRIMARY)
            .bg(Colors::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn step_inactive() -> Style {
        Style::default().fg(Colors::FG_MUTED).bg(Colors::BG_TAB)
    }

    pub fn success() -> Style {
        Style::default().fg(Colors::SUCCESS)
    }

    pub fn warning() -> Style {
        Style::default().fg(Colors::WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(Colors::ERROR)
    }

    pub fn progress() -> Style {
        Style::default().fg(Colors::PRIMARY).bg(Colors::BG_GAUGE)
    }

    pub fn focused_field() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }
}

// =============================================================================
// THEME CONTEXT
// =============================================================================

/// Semantic style lookups
pub struct Theme;

impl Theme {
    /// Label style of a selection row
    pub fn row_style(under_cursor: bool, selected: bool, installed: bool) -> Style {
        if installed {
            Styles::installed()
        } else if under_cursor {
            Styles::cursor()
        } else if selected {
            Styles::text()
        } else {
            Styles::text_muted()
        }
    }

    /// `[✓]` / `[ ]` marker and its style
    pub fn checkbox(selected: bool, installed: bool) -> (&'static str, Style) {
        if installed {
            ("[✓]", Styles::installed())
        } else if selected {
            ("[✓]", Styles::checked())
        } else {
            ("[ ]", Styles::unchecked())
        }
    }

    pub fn outcome_marker(success: bool) -> (&'static str, Style) {
        if success {
            ("✓", Styles::success())
        } else {
            ("✗", Styles::error())
        }
    }
}
