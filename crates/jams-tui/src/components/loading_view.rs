//! LoadingView — spinner shown while a request is in flight.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::Action,
    component::{Component, ViewModel},
    theme::{style_secondary, C_LOADING, C_PRIMARY},
};

use super::centered;

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

#[derive(Default)]
pub struct LoadingView {
    frame: usize,
}

impl LoadingView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for LoadingView {
    fn handle_key(&mut self, key: KeyEvent, _view: &ViewModel<'_>) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Esc => vec![Action::Reset],
            _ => vec![],
        }
    }

    fn tick(&mut self) {
        self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _view: &ViewModel<'_>) {
        let region = centered(area, area.width.saturating_sub(4).min(80), 5);
        let lines = vec![
            Line::from(Span::styled(
                SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()],
                Style::default().fg(C_LOADING).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(
                "Analyzing Your Playlist...",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "This may take a moment while we search Reddit and generate recommendations",
                style_secondary(),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), region);
    }
}
