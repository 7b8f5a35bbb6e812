//! Terminal client for a daily news briefing backend.
//!
//! On startup the client fetches a categorized briefing and shows it as
//! the first assistant message; afterwards the user chats with the backend
//! one request at a time.

pub mod api;
pub mod app;
pub mod briefing;
pub mod config;
pub mod handler;
pub mod input;
pub mod logging;
pub mod markdown;
pub mod render;
pub mod session;
pub mod state;
pub mod transcript;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use api::{Article, Backend, Briefing, Category, NewsClient};
pub use config::Config;
pub use session::{PendingChat, Session};
pub use state::{ChatMessage, ChatRole, SessionState};
pub use transcript::{LoadingIndicator, LoadingTicket, Transcript};
