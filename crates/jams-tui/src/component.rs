//! Component trait — the interface every view implements.
//!
//! Design principles:
//! - Views own their presentation state (cursor, selection, spinner frame).
//! - Views receive a read-only [`ViewModel`] for data the controller owns.
//! - Views produce `Vec<Action>` and never touch the controller directly.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::Action;
use crate::view_state::RequestState;

/// Read-only projection of the controller handed to views.
#[derive(Debug, Clone, Copy)]
pub struct ViewModel<'a> {
    pub state: &'a RequestState,
    pub playlist_url: &'a str,
}

pub trait Component {
    /// Handle a key event while this view is on screen.
    fn handle_key(&mut self, key: KeyEvent, view: &ViewModel<'_>) -> Vec<Action>;

    /// Called each tick (~100ms) for animation.
    fn tick(&mut self) {}

    /// Render the view into `area`.
    fn draw(&mut self, frame: &mut Frame, area: Rect, view: &ViewModel<'_>);
}
