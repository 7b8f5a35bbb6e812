//! Message bubbles as plain data.
//!
//! Everything here is a pure function from messages to styled lines; the
//! terminal adapter in `ui.rs` only lays them out.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::markdown;
use crate::session::Session;
use crate::state::{ChatMessage, ChatRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleKind {
    User,
    Assistant,
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub kind: BubbleKind,
    pub header: Line<'static>,
    pub body: Vec<Line<'static>>,
}

impl Bubble {
    /// Header, body, then a blank separator line.
    pub fn into_lines(self) -> Vec<Line<'static>> {
        let mut lines = Vec::with_capacity(self.body.len() + 2);
        lines.push(self.header);
        lines.extend(self.body);
        lines.push(Line::default());
        lines
    }
}

fn user_header() -> Line<'static> {
    Line::from(Span::styled(
        "You:",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn assistant_header() -> Line<'static> {
    Line::from(Span::styled(
        "AI:",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

pub fn message_bubble(message: &ChatMessage) -> Bubble {
    match message.role {
        // Shown exactly as typed, Markdown syntax included
        ChatRole::User => Bubble {
            kind: BubbleKind::User,
            header: user_header(),
            body: message
                .content
                .split('\n')
                .map(|line| Line::raw(line.to_string()))
                .collect(),
        },
        ChatRole::Assistant => Bubble {
            kind: BubbleKind::Assistant,
            header: assistant_header(),
            body: markdown::to_lines(&message.content),
        },
    }
}

/// Three dots with the `frame`-th one lit.
pub fn pending_bubble(frame: u8) -> Bubble {
    let lit = usize::from(frame % 3);
    let dots: Vec<Span<'static>> = (0..3)
        .map(|i| {
            let style = if i == lit {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(if i < 2 { "● " } else { "●" }, style)
        })
        .collect();

    Bubble {
        kind: BubbleKind::Pending,
        header: assistant_header(),
        body: vec![Line::from(dots)],
    }
}

/// Every bubble in display order, the pending bubble (if any) last.
pub fn bubbles(session: &Session) -> Vec<Bubble> {
    let mut bubbles: Vec<Bubble> = session
        .transcript()
        .messages()
        .iter()
        .map(message_bubble)
        .collect();
    if session.loading().is_visible() {
        bubbles.push(pending_bubble(session.loading().frame()));
    }
    bubbles
}

pub fn transcript_lines(session: &Session) -> Vec<Line<'static>> {
    bubbles(session)
        .into_iter()
        .flat_map(Bubble::into_lines)
        .collect()
}
