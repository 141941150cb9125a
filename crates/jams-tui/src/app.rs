//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns the four views, the status notice and the `ViewStateController`.
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background
//!   tasks: the blocking terminal reader and the request settlements.
//! - The event loop draws each frame, then awaits the next message or tick.
//! - Views return `Vec<Action>`; App dispatches each Action.

use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    action::Action,
    client::ProxyClient,
    component::{Component, ViewModel},
    components::{
        error_view::ErrorView, input_view::InputView, loading_view::LoadingView,
        results_view::ResultsView,
    },
    controller::{Settled, SubmitOutcome, ViewStateController},
    theme::C_BG,
    view_state::RequestState,
    widgets::status_bar::{self, Notice},
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    Settled(Settled),
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    controller: ViewStateController,
    settled_rx: Option<mpsc::Receiver<Settled>>,
    endpoint: String,

    // ── Views ─────────────────────────────────────────────────────────────────
    input_view: InputView,
    loading_view: LoadingView,
    results_view: ResultsView,
    error_view: ErrorView,

    notice: Option<Notice>,
    should_quit: bool,
}

impl App {
    pub fn new(client: ProxyClient, playlist_url: Option<String>) -> Self {
        let endpoint = client.endpoint().to_string();
        let (settled_tx, settled_rx) = mpsc::channel::<Settled>(16);
        let mut controller = ViewStateController::new(client, settled_tx);
        let mut input_view = InputView::new();

        if let Some(url) = playlist_url {
            controller.set_playlist_url(url.trim());
            input_view.set_value(controller.playlist_url());
        }

        Self {
            controller,
            settled_rx: Some(settled_rx),
            endpoint,
            input_view,
            loading_view: LoadingView::new(),
            results_view: ResultsView::new(),
            error_view: ErrorView::new(),
            notice: None,
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    /// Take over the terminal until the user quits.
    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);

        // ── Background task: keyboard events ──────────────────────────────────
        // Poll so the reader exits once the loop is gone.
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            if event_tx.is_closed() {
                break;
            }
            match event::poll(Duration::from_millis(200)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                },
                Ok(false) => {}
                Err(_) => break,
            }
        });

        // ── Background task: request settlements ──────────────────────────────
        if let Some(mut settled_rx) = self.settled_rx.take() {
            let settled_tx = tx.clone();
            tokio::spawn(async move {
                while let Some(settled) = settled_rx.recv().await {
                    if settled_tx.send(AppMessage::Settled(settled)).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        // Spinner animation + notice expiry
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        loop {
            terminal.draw(|f| self.draw(f))?;

            if self.should_quit {
                break;
            }

            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(AppMessage::Event(ev)) => self.handle_event(ev),
                    Some(AppMessage::Settled(settled)) => self.handle_settled(settled),
                    None => break,
                },
                _ = ui_tick.tick() => {
                    self.active_view().tick();
                    let now = std::time::Instant::now();
                    let state = self.controller.state();
                    if self.notice.as_ref().is_some_and(|n| !n.is_live(state, now)) {
                        self.notice = None;
                    }
                }
            }
        }

        info!("jams exiting");
        Ok(())
    }

    // ── Event handling ────────────────────────────────────────────────────────

    fn handle_event(&mut self, ev: Event) {
        if let Event::Key(key) = ev {
            self.handle_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.dispatch(Action::Quit);
            return;
        }

        let view = ViewModel {
            state: self.controller.state(),
            playlist_url: self.controller.playlist_url(),
        };
        let actions = match view.state {
            RequestState::Idle => self.input_view.handle_key(key, &view),
            RequestState::Loading => self.loading_view.handle_key(key, &view),
            RequestState::Success(_) => self.results_view.handle_key(key, &view),
            RequestState::Error(_) => self.error_view.handle_key(key, &view),
        };
        for action in actions {
            self.dispatch(action);
        }
    }

    fn handle_settled(&mut self, settled: Settled) {
        if !self.controller.on_settled(settled) {
            return;
        }
        if let Some(notice) = Notice::for_results(self.controller.state()) {
            self.notice = Some(notice);
        }
    }

    fn active_view(&mut self) -> &mut dyn Component {
        match self.controller.state() {
            RequestState::Idle => &mut self.input_view,
            RequestState::Loading => &mut self.loading_view,
            RequestState::Success(_) => &mut self.results_view,
            RequestState::Error(_) => &mut self.error_view,
        }
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::UrlChanged(value) => self.controller.set_playlist_url(value),

            Action::Submit => {
                let outcome = self.controller.submit();
                self.on_submit(outcome);
            }

            Action::Regenerate => {
                let outcome = self.controller.regenerate();
                self.on_submit(outcome);
            }

            Action::Reset => {
                self.controller.reset();
                self.input_view.set_value(self.controller.playlist_url());
            }

            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        self.notice = Some(Notice::copied(&text, self.controller.state()));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.notice = Some(Notice::clipboard_failed(e, self.controller.state()));
                    }
                }
            }

            Action::Quit => self.should_quit = true,
        }
    }

    fn on_submit(&mut self, outcome: SubmitOutcome) {
        if let SubmitOutcome::Started { .. } = outcome {
            self.results_view.scroll_to_top();
        }
        if let Some(notice) = Notice::for_outcome(outcome, self.controller.state()) {
            self.notice = Some(notice);
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let view = ViewModel {
            state: self.controller.state(),
            playlist_url: self.controller.playlist_url(),
        };
        let main = chunks[0].inner(ratatui::layout::Margin::new(1, 1));
        match view.state {
            RequestState::Idle => self.input_view.draw(frame, main, &view),
            RequestState::Loading => self.loading_view.draw(frame, main, &view),
            RequestState::Success(_) => self.results_view.draw(frame, main, &view),
            RequestState::Error(_) => self.error_view.draw(frame, main, &view),
        }

        status_bar::draw_status_bar(
            frame,
            chunks[1],
            view.state,
            self.notice.as_ref(),
            &self.endpoint,
        );
    }
}
