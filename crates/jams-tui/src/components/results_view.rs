//! ResultsView — playlist summary card plus the recommendation list.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use jams_proto::api::{ApiResponse, Recommendation};

use crate::{
    action::Action,
    component::{Component, ViewModel},
    theme::{
        style_default, style_muted, style_secondary, style_selected, style_title, C_ACCENT,
        C_POPULARITY, C_PRIMARY,
    },
    view_state::RequestState,
    widgets::pane_chrome::{pane_chrome, Badge},
};

const PAGE: usize = 10;
const POPULARITY_CELLS: usize = 10;

pub struct ResultsView {
    list_state: ListState,
}

impl ResultsView {
    pub fn new() -> Self {
        Self {
            list_state: ListState::default(),
        }
    }

    /// Move the selection back to the first row.  Called whenever a new
    /// request starts so fresh results open at the top.
    pub fn scroll_to_top(&mut self) {
        self.list_state = ListState::default();
    }

    pub fn selected(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let current = self.selected() as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.list_state.select(Some(next as usize));
    }
}

impl Default for ResultsView {
    fn default() -> Self {
        Self::new()
    }
}

fn recommendations<'a>(view: &ViewModel<'a>) -> &'a [Recommendation] {
    match view.state {
        RequestState::Success(ApiResponse {
            recommendations: Some(list),
            ..
        }) => list,
        _ => &[],
    }
}

/// Cut `text` to at most `max` terminal columns, marking the cut with `…`.
fn fit(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn popularity_bar(popularity: u8) -> String {
    let filled = (popularity as usize * POPULARITY_CELLS + 50) / 100;
    let filled = filled.min(POPULARITY_CELLS);
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(POPULARITY_CELLS - filled)
    )
}

fn track_item(index: usize, track: &Recommendation, width: usize) -> ListItem<'static> {
    let number = format!("{:>3}. ", index + 1);
    let body = width.saturating_sub(number.width());
    let title = fit(&format!("{} · {}", track.name, track.artist), body);

    let details = format!(
        "{} · {} · {}",
        track.album,
        track.release_label(),
        track.duration_readable
    );
    let bar = popularity_bar(track.popularity);
    let details_room = body.saturating_sub(bar.width() + 6);

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(number.clone(), style_muted()),
            Span::styled(title, style_default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::raw(" ".repeat(number.width())),
            Span::styled(fit(&details, details_room), style_secondary()),
            Span::raw("  "),
            Span::styled(bar, Style::default().fg(C_POPULARITY)),
            Span::styled(format!(" {:>3}", track.popularity), style_muted()),
        ]),
    ])
}

impl Component for ResultsView {
    fn handle_key(&mut self, key: KeyEvent, view: &ViewModel<'_>) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let tracks = recommendations(view);
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1, tracks.len()),
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1, tracks.len()),
            KeyCode::PageDown => self.move_by(PAGE as isize, tracks.len()),
            KeyCode::PageUp => self.move_by(-(PAGE as isize), tracks.len()),
            KeyCode::Home | KeyCode::Char('g') => self.scroll_to_top(),
            KeyCode::End | KeyCode::Char('G') => {
                if !tracks.is_empty() {
                    self.list_state.select(Some(tracks.len() - 1));
                }
            }
            KeyCode::Char('r') => return vec![Action::Regenerate],
            KeyCode::Char('n') | KeyCode::Esc => return vec![Action::Reset],
            KeyCode::Char('y') => {
                if let Some(track) = tracks.get(self.selected()) {
                    return vec![Action::CopyToClipboard(track.external_url.clone())];
                }
            }
            KeyCode::Char('q') => return vec![Action::Quit],
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, view: &ViewModel<'_>) {
        let RequestState::Success(response) = view.state else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(3)])
            .split(area);

        // Playlist card
        let card = pane_chrome("Your Playlist", false, None);
        let card_inner = card.inner(chunks[0]);
        frame.render_widget(card, chunks[0]);

        let mut lines = Vec::new();
        if let Some(details) = &response.playlist_details {
            let width = card_inner.width as usize;
            lines.push(Line::from(Span::styled(fit(&details.name, width), style_title())));
            lines.push(Line::from(vec![
                Span::styled("by ", style_muted()),
                Span::styled(fit(&details.owner, width.saturating_sub(3)), style_default()),
            ]));
            let mut stats = vec![Span::styled(details.tracks_label(), style_secondary())];
            if let Some(meta) = &response.metadata {
                stats.push(Span::styled("  ·  ", style_muted()));
                stats.push(Span::styled(meta.reddit_label(), style_secondary()));
            }
            lines.push(Line::from(stats));
        }
        frame.render_widget(Paragraph::new(lines), card_inner);

        // Recommendation list
        let tracks = response.recommendations.as_deref().unwrap_or(&[]);
        let count = format!("{}", tracks.len());
        let block = pane_chrome(
            "Recommended For You",
            true,
            Some(Badge {
                text: &count,
                color: C_ACCENT,
            }),
        );
        let inner = block.inner(chunks[1]);
        frame.render_widget(block, chunks[1]);

        if tracks.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  no recommendations this time, press r to try again",
                    style_muted(),
                )),
                inner,
            );
            return;
        }

        if self.list_state.selected().is_none() {
            self.list_state.select(Some(0));
        }

        let width = inner.width as usize;
        let items: Vec<ListItem> = tracks
            .iter()
            .enumerate()
            .map(|(i, track)| track_item(i, track, width))
            .collect();

        let list = List::new(items)
            .highlight_style(style_selected().fg(C_PRIMARY))
            .highlight_symbol("");
        frame.render_stateful_widget(list, inner, &mut self.list_state);
    }
}
