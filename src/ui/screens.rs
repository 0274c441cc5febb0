//! Wizard pages before the install starts

use crate::app::AppState;
use crate::config::Language;
use crate::i18n::{self, page_title};
use crate::theme::{Styles, Theme};
use crate::wizard::{Wizard, WizardPage};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use strum::IntoEnumIterator;

fn page_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Styles::border())
        .title(Span::styled(format!(" {} ", title), Styles::subtitle()))
}

fn cursor_marker(under_cursor: bool) -> Span<'static> {
    if under_cursor {
        Span::styled("▸ ", Styles::cursor())
    } else {
        Span::raw("  ")
    }
}

pub fn render_language(f: &mut Frame, area: Rect, wizard: &Wizard) {
    let texts = i18n::texts(wizard.language());
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(texts.language_prompt, Styles::text())),
        Line::from(""),
    ];
    for (i, language) in Language::iter().enumerate() {
        let under_cursor = i == wizard.cursor();
        let style = if under_cursor { Styles::cursor() } else { Styles::text_muted() };
        lines.push(Line::from(vec![
            cursor_marker(under_cursor),
            Span::styled(language.native_name(), style),
        ]));
    }

    let block = page_block(page_title(wizard.language(), WizardPage::Language));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_welcome(f: &mut Frame, area: Rect, state: &AppState) {
    let texts = i18n::texts(state.wizard.language());
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(texts.welcome_title, Styles::subtitle())),
        Line::from(""),
        Line::from(Span::styled(texts.welcome_intro, Styles::text())),
        Line::from(""),
    ];
    lines.extend(texts.welcome_points.iter().map(|point| {
        Line::from(vec![
            Span::styled("  ✓ ", Styles::success()),
            Span::styled(*point, Styles::text()),
        ])
    }));
    lines.push(Line::from(""));
    if state.probing {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", state.spinner()), Styles::progress()),
            Span::styled(texts.probing, Styles::text_muted()),
        ]));
    } else {
        lines.push(Line::from(Span::styled(texts.welcome_start, Styles::focused_field())));
    }

    let block = page_block(page_title(state.wizard.language(), WizardPage::Welcome));
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

/// Hint line above a selection list
fn selection_hint(state: &AppState) -> Option<String> {
    let texts = i18n::texts(state.wizard.language());
    match state.wizard.page() {
        WizardPage::NodeVersions if state.node_versions_loading => {
            Some(format!("{} {}", state.spinner(), texts.node_loading))
        }
        WizardPage::NodeVersions => Some(texts.node_hint.to_string()),
        WizardPage::McpServers => Some(texts.mcp_hint.to_string()),
        WizardPage::Extras => Some(texts.extras_hint.to_string()),
        _ if state.probing => Some(format!("{} {}", state.spinner(), texts.probing)),
        _ => None,
    }
}

pub fn render_selection(f: &mut Frame, area: Rect, state: &AppState) {
    let wizard = &state.wizard;
    let block = page_block(page_title(wizard.language(), wizard.page()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    if let Some(hint) = selection_hint(state) {
        f.render_widget(Paragraph::new(Span::styled(hint, Styles::text_muted())), chunks[0]);
    }

    let items: Vec<ListItem> = wizard
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let under_cursor = i == wizard.cursor();
            let (checkbox, checkbox_style) = Theme::checkbox(row.selected, row.installed);
            let mut spans = vec![
                cursor_marker(under_cursor),
                Span::styled(checkbox, checkbox_style),
                Span::raw(" "),
                Span::styled(row.label, Theme::row_style(under_cursor, row.selected, row.installed)),
            ];
            if let Some(version) = row.version {
                spans.push(Span::styled(format!("  {}", version), Styles::version()));
            }
            if !row.description.is_empty() {
                spans.push(Span::styled(format!("  {}", row.description), Styles::text_muted()));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(wizard.cursor()));
    }
    f.render_stateful_widget(List::new(items), chunks[1], &mut list_state);
}

pub fn render_form(f: &mut Frame, area: Rect, wizard: &Wizard) {
    let block = page_block(page_title(wizard.language(), wizard.page()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(form) = wizard.form() else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            form.fields()
                .iter()
                .map(|_| Constraint::Length(4))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(inner);

    for (i, field) in form.fields().iter().enumerate() {
        let focused = i == form.focus();
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(3)])
            .split(rows[i]);

        let label_style = if focused { Styles::focused_field() } else { Styles::text() };
        f.render_widget(Paragraph::new(Span::styled(field.label, label_style)), parts[0]);

        let border_style = if focused { Styles::focused_field() } else { Styles::border() };
        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);
        let value = if field.value().is_empty() {
            Span::styled(field.placeholder, Styles::text_muted())
        } else {
            Span::styled(field.display_value(), Styles::text())
        };
        let input_area = parts[1];
        f.render_widget(Paragraph::new(value).block(input_block), input_area);

        if focused {
            let x = input_area.x + 1 + field.cursor() as u16;
            let max_x = input_area.right().saturating_sub(2);
            f.set_cursor_position(Position::new(x.min(max_x), input_area.y + 1));
        }
    }
}
