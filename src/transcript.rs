use crate::state::{ChatMessage, ChatRole};

/// Append-only list of messages, in arrival order.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    scroll_requested: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.scroll_requested = true;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn count_role(&self, role: ChatRole) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }

    /// Returns true once after every append (or indicator change) so the
    /// view can jump to the tail.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    pub(crate) fn request_scroll(&mut self) {
        self.scroll_requested = true;
    }
}

/// Handle for one `show()`; pass it back to `hide()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadingTicket(u64);

impl LoadingTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The single "pending" bubble drawn after the last message.
///
/// Overlapping requests (the startup briefing and a chat send) share the
/// one bubble: it stays up while any ticket is outstanding.
#[derive(Debug, Default)]
pub struct LoadingIndicator {
    next_id: u64,
    holders: Vec<LoadingTicket>,
    frame: u8,
}

impl LoadingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self) -> LoadingTicket {
        self.next_id += 1;
        let ticket = LoadingTicket(self.next_id);
        if self.holders.is_empty() {
            self.frame = 0;
        }
        self.holders.push(ticket);
        ticket
    }

    /// Release `ticket`. Unknown or already released tickets are ignored.
    pub fn hide(&mut self, ticket: LoadingTicket) -> bool {
        let before = self.holders.len();
        self.holders.retain(|held| *held != ticket);
        self.holders.len() != before
    }

    pub fn is_visible(&self) -> bool {
        !self.holders.is_empty()
    }

    /// Number of pending bubbles on screen: always 0 or 1.
    pub fn bubble_count(&self) -> usize {
        usize::from(self.is_visible())
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    /// Advance the dot animation (called by the Tick event)
    pub fn tick(&mut self) {
        if self.is_visible() {
            self.frame = (self.frame + 1) % 3;
        }
    }
}
