//! Text forms for the Codex and Claude Code pages

use crate::agent_config::{ClaudeSettings, CodexSettings};
use tui_input::{Input, InputRequest};

/// Character shown in place of each secret character
pub const MASK_CHAR: char = '•';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Codex,
    Claude,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub placeholder: &'static str,
    pub secret: bool,
    input: Input,
}

impl FormField {
    fn new(label: &'static str, placeholder: &'static str, value: &str) -> Self {
        Self {
            label,
            placeholder,
            secret: false,
            input: Input::new(value.to_string()),
        }
    }

    fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// What the form shows: secrets never in plaintext
    pub fn display_value(&self) -> String {
        if self.secret {
            std::iter::repeat_n(MASK_CHAR, self.value().chars().count()).collect()
        } else {
            self.value().to_string()
        }
    }

    /// Cursor column within the displayed value
    pub fn cursor(&self) -> usize {
        self.input.visual_cursor()
    }
}

/// Editing operations a key press can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEdit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Clear,
}

impl From<FieldEdit> for InputRequest {
    fn from(edit: FieldEdit) -> Self {
        match edit {
            FieldEdit::Insert(c) => InputRequest::InsertChar(c),
            FieldEdit::Backspace => InputRequest::DeletePrevChar,
            FieldEdit::Delete => InputRequest::DeleteNextChar,
            FieldEdit::Left => InputRequest::GoToPrevChar,
            FieldEdit::Right => InputRequest::GoToNextChar,
            FieldEdit::Home => InputRequest::GoToStart,
            FieldEdit::End => InputRequest::GoToEnd,
            FieldEdit::Clear => InputRequest::DeleteLine,
        }
    }
}

/// Ordered fields bound to one config page
#[derive(Debug, Clone)]
pub struct ConfigForm {
    kind: FormKind,
    fields: Vec<FormField>,
    focus: usize,
}

impl ConfigForm {
    pub fn codex(settings: &CodexSettings) -> Self {
        Self {
            kind: FormKind::Codex,
            fields: vec![
                FormField::new("Model", "Model (e.g. o4-mini)", &settings.model),
                FormField::new(
                    "Reasoning effort",
                    "minimal / low / medium / high",
                    &settings.reasoning_effort,
                ),
                FormField::new("Base URL", "Base URL", &settings.base_url),
                FormField::new("API key", "API Key", &settings.api_key).secret(),
            ],
            focus: 0,
        }
    }

    pub fn claude(settings: &ClaudeSettings) -> Self {
        Self {
            kind: FormKind::Claude,
            fields: vec![
                FormField::new("Model", "Model (e.g. claude-sonnet-4-6)", &settings.model),
                FormField::new("Base URL", "Base URL", &settings.base_url),
                FormField::new("API key", "API Key", &settings.api_key).secret(),
            ],
            focus: 0,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn is_last_focused(&self) -> bool {
        self.focus + 1 == self.fields.len()
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    /// Apply an edit to the focused field
    pub fn edit(&mut self, edit: FieldEdit) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.input.handle(edit.into());
        }
    }

    fn value(&self, index: usize) -> String {
        self.fields
            .get(index)
            .map(|f| f.value().trim().to_string())
            .unwrap_or_default()
    }

    pub fn to_codex(&self) -> CodexSettings {
        CodexSettings {
            model: self.value(0),
            reasoning_effort: self.value(1),
            base_url: self.value(2),
            api_key: self.value(3),
        }
    }

    pub fn to_claude(&self) -> ClaudeSettings {
        ClaudeSettings {
            model: self.value(0),
            base_url: self.value(1),
            api_key: self.value(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codex_form_round_trip() {
        let mut form = ConfigForm::codex(&CodexSettings::suggested());
        assert_eq!(form.fields().len(), 4);
        assert!(form.fields()[3].secret);

        form.focus_prev();
        assert!(form.is_last_focused());
        for c in "sk-abc".chars() {
            form.edit(FieldEdit::Insert(c));
        }

        let settings = form.to_codex();
        assert_eq!(settings.api_key, "sk-abc");
        assert_eq!(settings.model, "o4-mini");
        assert_eq!(form.fields()[3].display_value(), "••••••");
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = ConfigForm::claude(&ClaudeSettings::suggested());
        form.focus_next();
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focus(), 0);
    }

    #[test]
    fn test_editing_and_clearing() {
        let mut form = ConfigForm::claude(&ClaudeSettings::suggested());
        form.edit(FieldEdit::Clear);
        for c in "opus".chars() {
            form.edit(FieldEdit::Insert(c));
        }
        form.edit(FieldEdit::Backspace);
        form.edit(FieldEdit::Home);
        form.edit(FieldEdit::Delete);

        assert_eq!(form.to_claude().model, "pu");
        assert_eq!(form.fields()[0].display_value(), "pu");
    }

    #[test]
    fn test_values_are_trimmed() {
        let form = ConfigForm::claude(&ClaudeSettings {
            base_url: "  https://proxy.example  ".into(),
            ..Default::default()
        });
        assert_eq!(form.to_claude().base_url, "https://proxy.example");
    }
}
