//! ErrorView — the failure message with a way back to the input.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::{
    action::Action,
    component::{Component, ViewModel},
    theme::{style_default, style_secondary, C_ERROR},
    view_state::{RequestState, GENERIC_FAILURE_MESSAGE},
};

use super::centered;

#[derive(Default)]
pub struct ErrorView;

impl ErrorView {
    pub fn new() -> Self {
        Self
    }
}

impl Component for ErrorView {
    fn handle_key(&mut self, key: KeyEvent, _view: &ViewModel<'_>) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Enter | KeyCode::Esc => vec![Action::Reset],
            KeyCode::Char('q') => vec![Action::Quit],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, view: &ViewModel<'_>) {
        let message = match view.state {
            RequestState::Error(message) => message.as_str(),
            _ => GENERIC_FAILURE_MESSAGE,
        };

        let region = centered(area, area.width.saturating_sub(4).min(72), 9);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(region);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Oops! Something Went Wrong",
                Style::default().fg(C_ERROR).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center),
            rows[0],
        );

        let boxed = Paragraph::new(Span::styled(message, style_default()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(C_ERROR)),
            );
        frame.render_widget(boxed, rows[2]);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Press Enter to try again",
                style_secondary(),
            )))
            .alignment(Alignment::Center),
            rows[3],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    #[test]
    fn test_enter_and_escape_reset() {
        let mut view = ErrorView::new();
        let state = RequestState::Error("nope".into());
        let model = ViewModel {
            state: &state,
            playlist_url: "",
        };
        for code in [KeyCode::Enter, KeyCode::Esc] {
            let actions = view.handle_key(KeyEvent::new(code, KeyModifiers::NONE), &model);
            assert_eq!(actions, vec![Action::Reset]);
        }
    }
}
