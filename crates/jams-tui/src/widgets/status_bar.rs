//! Status bar — bottom line with the request state badge, key hints and a
//! one-line notice.
//!
//! A [`Notice`] replaces the key hints while it is live.  It lapses after its
//! duration or as soon as the request state moves on from the one it was
//! raised in, so "already fetching" never outlives the fetch.

use std::time::{Duration, Instant};

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::controller::SubmitOutcome;
use crate::theme::{
    C_ACCENT, C_ERROR, C_LOADING, C_MUTED, C_NOTICE_ERROR, C_NOTICE_INFO, C_NOTICE_SUCCESS,
    C_SECONDARY, C_SUCCESS,
};
use crate::view_state::RequestState;

const INFO_FOR: Duration = Duration::from_secs(3);
const ERROR_FOR: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub tone: Tone,
    raised_in: &'static str,
    expires: Instant,
}

impl Notice {
    fn new(message: impl Into<String>, tone: Tone, state: &RequestState, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            tone,
            raised_in: state.label(),
            expires: Instant::now() + ttl,
        }
    }

    /// What to tell the user about a submit/regenerate that did not start
    /// a request.  `Started` and `Rejected` speak through the views.
    pub fn for_outcome(outcome: SubmitOutcome, state: &RequestState) -> Option<Self> {
        match outcome {
            SubmitOutcome::Ignored => Some(Self::new(
                "already fetching recommendations",
                Tone::Info,
                state,
                INFO_FOR,
            )),
            SubmitOutcome::Skipped => Some(Self::new(
                "no playlist to regenerate",
                Tone::Info,
                state,
                INFO_FOR,
            )),
            SubmitOutcome::Started { .. } | SubmitOutcome::Rejected => None,
        }
    }

    /// Raised when a request lands in `Success`.
    pub fn for_results(state: &RequestState) -> Option<Self> {
        match state {
            RequestState::Success(response) => {
                let count = response.recommendations.as_ref().map_or(0, Vec::len);
                Some(Self::new(
                    format!("{} recommendations", count),
                    Tone::Success,
                    state,
                    INFO_FOR,
                ))
            }
            _ => None,
        }
    }

    pub fn copied(link: &str, state: &RequestState) -> Self {
        let shown = if link.chars().count() > 40 {
            format!("{}…", link.chars().take(40).collect::<String>())
        } else {
            link.to_string()
        };
        Self::new(format!("copied: {}", shown), Tone::Success, state, INFO_FOR)
    }

    pub fn clipboard_failed(reason: impl std::fmt::Display, state: &RequestState) -> Self {
        Self::new(
            format!("clipboard error: {}", reason),
            Tone::Error,
            state,
            ERROR_FOR,
        )
    }

    /// Still worth showing at `now` while the screen is in `state`.
    pub fn is_live(&self, state: &RequestState, now: Instant) -> bool {
        now < self.expires && self.raised_in == state.label()
    }

    fn styled(&self) -> Span<'_> {
        let (color, icon) = match self.tone {
            Tone::Info => (C_NOTICE_INFO, "·"),
            Tone::Success => (C_NOTICE_SUCCESS, "✓"),
            Tone::Error => (C_NOTICE_ERROR, "✗"),
        };
        Span::styled(
            format!("{} {}", icon, self.message),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )
    }
}

fn state_color(state: &RequestState) -> Color {
    match state {
        RequestState::Idle => C_ACCENT,
        RequestState::Loading => C_LOADING,
        RequestState::Success(_) => C_SUCCESS,
        RequestState::Error(_) => C_ERROR,
    }
}

/// Key hints for the view currently on screen.
pub fn key_hints(state: &RequestState) -> &'static str {
    match state {
        RequestState::Idle => "type/paste a playlist link  Enter get recommendations  Esc clear (again to quit)  Ctrl-C quit",
        RequestState::Loading => "Esc cancel  Ctrl-C quit",
        RequestState::Success(_) => {
            "↑↓/jk select  PgUp/PgDn page  y copy link  r regenerate  n/Esc new playlist  q quit"
        }
        RequestState::Error(_) => "Enter/Esc try again  q quit",
    }
}

/// Draw the bar: state badge, then the notice (or key hints), and the proxy
/// endpoint on the right.
pub fn draw_status_bar(
    frame: &mut Frame,
    area: Rect,
    state: &RequestState,
    notice: Option<&Notice>,
    endpoint: &str,
) {
    let right_width = (endpoint.chars().count() as u16 + 2).min(area.width / 3);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(right_width)])
        .split(area);

    let middle = match notice {
        Some(n) if n.is_live(state, Instant::now()) => n.styled(),
        _ => Span::styled(key_hints(state), Style::default().fg(C_MUTED)),
    };
    let left = Line::from(vec![
        Span::styled(
            format!(" {} ", state.label()),
            Style::default()
                .fg(state_color(state))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        middle,
    ]);
    frame.render_widget(Paragraph::new(left), chunks[0]);

    let right = Line::from(Span::styled(endpoint, Style::default().fg(C_SECONDARY)))
        .right_aligned();
    frame.render_widget(Paragraph::new(right), chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use jams_proto::api::ApiResponse;

    #[test]
    fn test_outcomes_that_start_or_reject_raise_nothing() {
        let state = RequestState::Loading;
        assert!(Notice::for_outcome(SubmitOutcome::Started { generation: 1 }, &state).is_none());
        assert!(Notice::for_outcome(SubmitOutcome::Rejected, &state).is_none());

        let ignored = Notice::for_outcome(SubmitOutcome::Ignored, &state).unwrap();
        assert_eq!(ignored.message, "already fetching recommendations");
        assert_eq!(ignored.tone, Tone::Info);
    }

    #[test]
    fn test_notice_lapses_when_state_moves_on() {
        let loading = RequestState::Loading;
        let notice = Notice::for_outcome(SubmitOutcome::Ignored, &loading).unwrap();
        let now = Instant::now();
        assert!(notice.is_live(&loading, now));
        assert!(!notice.is_live(&RequestState::Error("x".into()), now));
        assert!(!notice.is_live(&loading, now + INFO_FOR));
    }

    #[test]
    fn test_results_notice_counts_tracks() {
        let state = RequestState::Success(ApiResponse {
            success: true,
            playlist_details: None,
            recommendations: Some(Vec::new()),
            metadata: None,
            error: None,
        });
        assert_eq!(
            Notice::for_results(&state).unwrap().message,
            "0 recommendations"
        );
        assert!(Notice::for_results(&RequestState::Idle).is_none());
    }

    #[test]
    fn test_copied_link_is_shortened() {
        let link = format!("https://open.spotify.com/track/{}", "x".repeat(40));
        let notice = Notice::copied(&link, &RequestState::Idle);
        assert!(notice.message.ends_with('…'));
        assert_eq!(notice.message.chars().count(), "copied: ".len() + 41);
    }
}
