use std::sync::Arc;

use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::Backend;
use crate::briefing;
use crate::session::Session;
use crate::tui::AppEvent;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub session: Session,

    // Chat pane scrolling
    pub chat_scroll: u16,
    pub follow_tail: bool,
    pub chat_height: u16, // inner height of the chat pane
    pub chat_rows: u16,   // wrapped rows of the last render

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    backend: Arc<dyn Backend>,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            session: Session::new(),

            chat_scroll: 0,
            follow_tail: true,
            chat_height: 0,
            chat_rows: 0,

            chat_area: None,

            backend,
            events,
        }
    }

    /// Kick off the one-time briefing fetch in the background.
    pub fn start_briefing(&mut self) {
        let ticket = briefing::start(&mut self.session);
        let backend = Arc::clone(&self.backend);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = backend.briefing().await;
            let _ = tx.send(AppEvent::BriefingLoaded(ticket, result));
        });
    }

    /// Send the input box contents unless empty or a reply is pending.
    pub fn submit_message(&mut self) {
        let Some(pending) = self.session.begin_send() else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = backend.chat(&pending.message).await;
            let _ = tx.send(AppEvent::ChatReplied(pending, result));
        });
    }

    pub fn tick_animation(&mut self) {
        self.session.tick();
    }

    fn max_scroll(&self) -> u16 {
        self.chat_rows.saturating_sub(self.chat_height)
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.chat_scroll = self.chat_scroll.min(self.max_scroll()).saturating_sub(rows);
        self.follow_tail = false;
    }

    pub fn scroll_down(&mut self, rows: u16) {
        let max = self.max_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(rows).min(max);
        self.follow_tail = self.chat_scroll >= max;
    }

    pub fn scroll_page_up(&mut self) {
        self.scroll_up(self.chat_height.max(2) / 2);
    }

    pub fn scroll_page_down(&mut self) {
        self.scroll_down(self.chat_height.max(2) / 2);
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
        self.follow_tail = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
    }

    /// Recompute the scroll offset after a render measured `rows` lines.
    pub fn update_chat_rows(&mut self, rows: u16, height: u16) {
        self.chat_rows = rows;
        self.chat_height = height;
        if self.session.transcript_mut().take_scroll_request() {
            self.follow_tail = true;
        }
        if self.follow_tail {
            self.chat_scroll = self.max_scroll();
        } else {
            self.chat_scroll = self.chat_scroll.min(self.max_scroll());
        }
    }
}
