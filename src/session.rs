//! Chat session controller.
//!
//! A send is split in two around the network call so the TUI can keep its
//! event loop running: [`Session::begin_send`] does the synchronous half
//! and [`Session::finish_send`] is the one finalizer for both outcomes.
//! [`Session::send_message`] chains them around a single await for callers
//! that can block, and [`ask`] wraps a whole one-shot exchange.

use anyhow::{bail, Result};

use crate::api::Backend;
use crate::input::InputField;
use crate::state::{ChatMessage, ChatRole, SessionState};
use crate::transcript::{LoadingIndicator, LoadingTicket, Transcript};

pub const CHAT_ERROR_MESSAGE: &str = "抱歉，發生錯誤，請稍後再試。";

/// An accepted send waiting for its reply.
#[derive(Debug)]
#[must_use = "a pending chat must be passed to finish_send"]
pub struct PendingChat {
    pub message: String,
    ticket: LoadingTicket,
}

#[derive(Debug)]
pub struct Session {
    transcript: Transcript,
    loading: LoadingIndicator,
    state: SessionState,
    pub input: InputField,
    send_enabled: bool,
    input_focused: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            transcript: Transcript::new(),
            loading: LoadingIndicator::new(),
            state: SessionState::Idle,
            input: InputField::new(),
            send_enabled: true,
            input_focused: true,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn loading(&self) -> &LoadingIndicator {
        &self.loading
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == SessionState::Pending
    }

    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn focus_input(&mut self) {
        self.input_focused = true;
    }

    pub fn blur_input(&mut self) {
        self.input_focused = false;
    }

    /// Append a message bubble and scroll to it.
    pub fn render(&mut self, role: ChatRole, text: impl Into<String>) {
        self.transcript.push(ChatMessage {
            role,
            content: text.into(),
        });
    }

    pub fn show_loading(&mut self) -> LoadingTicket {
        let ticket = self.loading.show();
        self.transcript.request_scroll();
        ticket
    }

    pub fn hide_loading(&mut self, ticket: LoadingTicket) {
        self.loading.hide(ticket);
    }

    pub fn tick(&mut self) {
        self.loading.tick();
    }

    /// Accept the current input for sending.
    ///
    /// Returns `None` without touching anything when the trimmed input is
    /// empty or a request is already in flight.
    pub fn begin_send(&mut self) -> Option<PendingChat> {
        let text = self.input.text().trim().to_string();
        if text.is_empty() || self.is_busy() {
            return None;
        }

        self.state = SessionState::Pending;
        self.input.clear();
        self.send_enabled = false;

        self.render(ChatRole::User, text.clone());
        let ticket = self.show_loading();

        tracing::debug!(chars = text.chars().count(), "chat message accepted");
        Some(PendingChat {
            message: text,
            ticket,
        })
    }

    /// Render the outcome of `pending` and return to Idle.
    pub fn finish_send(&mut self, pending: PendingChat, result: Result<String>) {
        self.hide_loading(pending.ticket);
        match result {
            Ok(response) => {
                self.render(ChatRole::Assistant, response);
            }
            Err(e) => {
                let detail = format!("{e:#}");
                tracing::error!(error = %detail, "chat request failed");
                self.render(ChatRole::Assistant, CHAT_ERROR_MESSAGE);
            }
        }

        self.state = SessionState::Idle;
        self.send_enabled = true;
        self.input_focused = true;
    }

    pub async fn send_message<B: Backend + ?Sized>(&mut self, backend: &B) {
        let Some(pending) = self.begin_send() else {
            return;
        };
        let result = backend.chat(&pending.message).await;
        self.finish_send(pending, result);
    }
}

/// Ask a single question in a fresh session and return the reply text.
///
/// A failed request still yields the apology message; only a blank
/// question is an error.
pub async fn ask<B: Backend + ?Sized>(backend: &B, question: &str) -> Result<String> {
    let mut session = Session::new();
    session.input.set_text(question);
    let Some(pending) = session.begin_send() else {
        bail!("question is empty");
    };
    let result = backend.chat(&pending.message).await;
    session.finish_send(pending, result);

    let reply = session
        .transcript()
        .messages()
        .iter()
        .rev()
        .find(|m| m.role == ChatRole::Assistant)
        .map(|m| m.content.clone())
        .unwrap_or_default();
    Ok(reply)
}
