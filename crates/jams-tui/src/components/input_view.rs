//! InputView — the landing screen: title, playlist link field, hint.

use ratatui::crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use jams_proto::api::{is_blank, looks_like_playlist_url, PLAYLIST_URL_PREFIX};

use crate::{
    action::Action,
    component::{Component, ViewModel},
    theme::{style_secondary, style_title, C_LOADING},
    widgets::{
        pane_chrome::pane_chrome,
        url_input::{InputAction, UrlInput},
    },
};

use super::centered;

pub struct InputView {
    input: UrlInput,
}

impl InputView {
    pub fn new() -> Self {
        Self {
            input: UrlInput::new("https://open.spotify.com/playlist/..."),
        }
    }

    /// Mirror the controller's URL into the field (after a reset or prefill).
    pub fn set_value(&mut self, value: &str) {
        if self.input.text() != value {
            self.input.set_value(value);
        }
    }

    /// Advisory line under the field; never blocks submission.
    fn hint(url: &str) -> Option<String> {
        if is_blank(url) || looks_like_playlist_url(url) {
            None
        } else {
            Some(format!("Playlist links usually start with {}", PLAYLIST_URL_PREFIX))
        }
    }
}

impl Default for InputView {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for InputView {
    fn handle_key(&mut self, key: KeyEvent, _view: &ViewModel<'_>) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match self.input.handle_key(key) {
            InputAction::Changed(value) => vec![Action::UrlChanged(value)],
            InputAction::Confirmed => vec![Action::Submit],
            InputAction::Cancelled => vec![Action::Quit],
            InputAction::None => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, view: &ViewModel<'_>) {
        let width = area.width.saturating_sub(4).min(90);
        let column = centered(area, width, 10);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1), // tagline
                Constraint::Length(1),
                Constraint::Length(3), // input
                Constraint::Length(1), // hint
                Constraint::Length(1),
                Constraint::Length(1), // call to action
            ])
            .split(column);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled("RedditJams", style_title())))
                .alignment(Alignment::Center),
            rows[0],
        );
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Discover new music from your playlist and Reddit's recommendations",
                style_secondary(),
            )))
            .alignment(Alignment::Center),
            rows[1],
        );

        let block = pane_chrome("Spotify playlist URL", true, None);
        let inner = block.inner(rows[3]);
        frame.render_widget(block, rows[3]);
        self.input.draw(frame, inner);

        if let Some(hint) = Self::hint(view.playlist_url) {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(hint, Style::default().fg(C_LOADING))))
                    .alignment(Alignment::Center),
                rows[4],
            );
        }

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Press Enter to get recommendations",
                style_secondary(),
            )))
            .alignment(Alignment::Center),
            rows[6],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_state::RequestState;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_keys_map_to_actions() {
        let mut view = InputView::new();
        let state = RequestState::Idle;
        let model = ViewModel {
            state: &state,
            playlist_url: "",
        };
        let typed = view.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE), &model);
        assert_eq!(typed, vec![Action::UrlChanged("x".into())]);
        let enter = view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &model);
        assert_eq!(enter, vec![Action::Submit]);
        let esc = view.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &model);
        assert_eq!(esc, vec![Action::UrlChanged(String::new())]);
        let esc = view.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &model);
        assert_eq!(esc, vec![Action::Quit]);
    }

    #[test]
    fn test_hint_only_for_unusual_links() {
        assert!(InputView::hint("").is_none());
        assert!(InputView::hint("https://open.spotify.com/playlist/abc").is_none());
        assert!(InputView::hint("spotify:playlist:abc").is_some());
    }
}
