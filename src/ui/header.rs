//! Title bar, step bar and key hints

use crate::i18n::{self, page_title};
use crate::theme::Styles;
use crate::wizard::{Wizard, WizardPage};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};
use strum::IntoEnumIterator;

pub fn render_title_bar(f: &mut Frame, area: Rect, wizard: &Wizard) {
    let title = format!(
        " freshbox  ·  {} ",
        page_title(wizard.language(), wizard.page())
    );
    let bar = Paragraph::new(Line::from(Span::styled(title, Styles::title()))).style(Styles::title());
    f.render_widget(bar, area);
}

/// One tab per page; only the current one is highlighted
pub fn render_step_bar(f: &mut Frame, area: Rect, wizard: &Wizard) {
    let language = wizard.language();
    let spans: Vec<Span> = WizardPage::iter()
        .filter(|p| *p != WizardPage::Language)
        .flat_map(|page| {
            let style = if page == wizard.page() {
                Styles::step_active()
            } else {
                Styles::step_inactive()
            };
            [
                Span::styled(format!(" {} ", page_title(language, page)), style),
                Span::raw(" "),
            ]
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_nav_bar(f: &mut Frame, area: Rect, wizard: &Wizard) {
    let texts = i18n::texts(wizard.language());
    let page = wizard.page();
    let hint = if page.is_config_page() {
        texts.footer_form
    } else if page == WizardPage::Installing {
        texts.footer_install
    } else if page == WizardPage::Done {
        texts.done_exit
    } else if page.is_selection_page() {
        texts.footer_list
    } else {
        texts.welcome_quit
    };
    f.render_widget(Paragraph::new(Span::styled(format!(" {}", hint), Styles::nav_hint())), area);
}
