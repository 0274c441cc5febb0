//! Install progress and the final summary

use crate::app::AppState;
use crate::i18n::{self, page_title};
use crate::theme::{Styles, Theme};
use crate::wizard::WizardPage;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Wrap},
};

/// Upcoming tasks listed under the running one
const UPCOMING_SHOWN: usize = 3;

fn page_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Styles::border())
        .title(Span::styled(format!(" {} ", title), Styles::subtitle()))
}

/// Outcome lines, the running task and the next few in the queue
fn progress_lines(state: &AppState) -> Vec<Line<'static>> {
    let texts = i18n::texts(state.wizard.language());
    let Some(orchestrator) = state.orchestrator.as_ref() else {
        return vec![Line::from(Span::styled(texts.install_preparing, Styles::text_muted()))];
    };

    let mut lines = Vec::new();
    let (recent, hidden) = orchestrator.recent_outcomes(state.outcome_window);
    if hidden > 0 {
        lines.push(Line::from(Span::styled(
            format!("  … {} {}", hidden, texts.install_more_above),
            Styles::text_muted(),
        )));
    }
    for outcome in recent {
        let (marker, style) = Theme::outcome_marker(outcome.success);
        let mut spans = vec![
            Span::styled(format!("  {} ", marker), style),
            Span::styled(outcome.name.clone(), Styles::text()),
        ];
        if let Some(summary) = &outcome.error_summary {
            spans.push(Span::styled(format!("  {}", summary), Styles::error()));
        }
        lines.push(Line::from(spans));
    }

    if let Some(current) = orchestrator.current() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", state.spinner()), Styles::progress()),
            Span::styled(current.to_string(), Styles::focused_field()),
        ]));
    }

    let upcoming = orchestrator.upcoming(UPCOMING_SHOWN);
    if !upcoming.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}:", texts.install_up_next),
            Styles::text_muted(),
        )));
        lines.extend(upcoming.into_iter().map(|name| {
            Line::from(Span::styled(format!("    · {}", name), Styles::text_muted()))
        }));
    }
    lines
}

pub fn render_progress(f: &mut Frame, area: Rect, state: &AppState) {
    let block = page_block(page_title(state.wizard.language(), WizardPage::Installing));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    if let Some(orchestrator) = state.orchestrator.as_ref() {
        let gauge = Gauge::default()
            .gauge_style(Styles::progress())
            .ratio(orchestrator.progress().clamp(0.0, 1.0))
            .label(format!("{}/{}", orchestrator.completed(), orchestrator.total()));
        f.render_widget(gauge, chunks[0]);
    }

    f.render_widget(Paragraph::new(progress_lines(state)), chunks[2]);
}

pub fn render_done(f: &mut Frame, area: Rect, state: &AppState) {
    let texts = i18n::texts(state.wizard.language());
    let failed = state.wizard.failed_tasks().unwrap_or(0);

    let summary = if failed == 0 {
        Line::from(Span::styled(texts.done_ok, Styles::success()))
    } else {
        Line::from(Span::styled(format!("{} {}", failed, texts.done_failed), Styles::warning()))
    };
    let lines = vec![
        Line::from(""),
        summary,
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{} ", texts.done_log), Styles::text_muted()),
            Span::styled(state.install_log.display().to_string(), Styles::text()),
        ]),
        Line::from(""),
        Line::from(Span::styled(texts.done_exit, Styles::text_muted())),
    ];

    let block = page_block(page_title(state.wizard.language(), WizardPage::Done));
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}
