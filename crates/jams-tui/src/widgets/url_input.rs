//! UrlInput — wraps tui-input for the playlist link field.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{style_input, C_INPUT_BG, C_MUTED};

pub enum InputAction {
    Changed(String),
    Confirmed,
    /// Esc on an already-empty field.
    Cancelled,
    None,
}

pub struct UrlInput {
    input: Input,
    placeholder: String,
}

impl UrlInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            placeholder: placeholder.into(),
        }
    }

    pub fn set_value(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    /// Handle a key event. Returns what happened.
    ///
    /// Esc behaviour:
    ///   - If the input has text: clear it, emit `Changed("")`
    ///   - If the input is already empty: emit `Cancelled`
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Esc => {
                if self.input.value().is_empty() {
                    InputAction::Cancelled
                } else {
                    self.input = Input::default();
                    InputAction::Changed(String::new())
                }
            }
            KeyCode::Enter => InputAction::Confirmed,
            _ => {
                let before = self.input.value().to_string();
                self.input
                    .handle_event(&ratatui::crossterm::event::Event::Key(key));
                if before != self.input.value() {
                    InputAction::Changed(self.input.value().to_string())
                } else {
                    InputAction::None
                }
            }
        }
    }

    /// Render the one-line field into `area`, with the cursor.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if area.width < 3 || area.height == 0 {
            return;
        }
        let inner_width = area.width.saturating_sub(2) as usize;
        let scroll = self.input.visual_scroll(inner_width);
        let value = self.input.value();
        let display = if value.is_empty() {
            Span::styled(format!(" {}", self.placeholder), Style::default().fg(C_MUTED))
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!(" {}", visible), style_input())
        };

        let paragraph =
            Paragraph::new(Line::from(vec![display])).style(Style::default().bg(C_INPUT_BG));
        frame.render_widget(paragraph, area);

        let cursor_x = area.x + 1 + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
        frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
    }
}
