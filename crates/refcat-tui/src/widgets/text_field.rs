//! Single-line labelled text field backed by `tui-input`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_input::{Input, InputRequest};

use crate::theme;

const LABEL_WIDTH: u16 = 14;

#[derive(Debug, Clone, Default)]
pub struct TextField {
    label: &'static str,
    input: Input,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            input: Input::default(),
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.input = Input::new(value.into());
    }

    pub fn reset(&mut self) {
        self.input.reset();
    }

    /// Apply an editing key. Returns `false` for keys that are not
    /// text editing, so the caller can treat them as commands.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let request = match key.code {
            KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
            KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
            KeyCode::Char('a') if ctrl => InputRequest::GoToStart,
            KeyCode::Char('e') if ctrl => InputRequest::GoToEnd,
            KeyCode::Char(c) if !ctrl => InputRequest::InsertChar(c),
            KeyCode::Backspace => InputRequest::DeletePrevChar,
            KeyCode::Delete => InputRequest::DeleteNextChar,
            KeyCode::Left => InputRequest::GoToPrevChar,
            KeyCode::Right => InputRequest::GoToNextChar,
            KeyCode::Home => InputRequest::GoToStart,
            KeyCode::End => InputRequest::GoToEnd,
            _ => return false,
        };
        self.input.handle(request);
        true
    }

    /// Draw `label  value` on one row; places the terminal cursor when
    /// focused.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let value_width = area.width.saturating_sub(LABEL_WIDTH + 1);
        let scroll = self.input.visual_scroll(usize::from(value_width));
        let visible: String = self.input.value().chars().skip(scroll).collect();

        let marker = if focused { "›" } else { " " };
        let line = Line::from(vec![
            Span::styled(
                format!("{marker} {:<width$}", self.label, width = usize::from(LABEL_WIDTH - 2)),
                theme::field_label(focused),
            ),
            Span::styled(visible, theme::table_row()),
        ]);
        frame.render_widget(Paragraph::new(line), area);

        if focused {
            let offset = self.input.visual_cursor().saturating_sub(scroll);
            let offset = u16::try_from(offset).unwrap_or(value_width);
            frame.set_cursor_position((area.x + LABEL_WIDTH + offset.min(value_width), area.y));
        }
    }
}
