//! Startup briefing: fetch once, turn it into one assistant message.

use anyhow::Result;

use crate::api::{Backend, Briefing};
use crate::session::Session;
use crate::state::ChatRole;
use crate::transcript::LoadingTicket;

const BRIEFING_HEADER: &str = "## 📰 每日新聞快訊\n\n";
const NO_DATA_NOTICE: &str = "目前沒有新聞摘要，請確認後端是否已執行資料匯入。\n";
const FOLLOW_UP_PROMPT: &str =
    "---\n\n**想了解更多細節嗎？** 請直接輸入問題，我會根據新聞內文回答您。";

pub const BRIEFING_ERROR_MESSAGE: &str = "抱歉，無法取得新聞快訊。請確認後端伺服器已啟動。";

/// Build the Markdown welcome message for `briefing`.
pub fn compose(briefing: &Briefing) -> String {
    let mut text = String::from(BRIEFING_HEADER);

    if briefing.categories().is_empty() {
        text.push_str(NO_DATA_NOTICE);
    } else {
        for category in briefing.categories() {
            text.push_str(&format!("### 📂 {}\n", category.name));
            for article in &category.articles {
                text.push_str(&format!(
                    "*   **{}**\n    {}\n",
                    article.zh_title, article.takeaway
                ));
            }
            text.push('\n');
        }
    }

    text.push_str(FOLLOW_UP_PROMPT);
    text
}

/// Text shown for a briefing fetch outcome.
pub fn message_for(result: &Result<Briefing>) -> String {
    match result {
        Ok(briefing) => compose(briefing),
        Err(_) => BRIEFING_ERROR_MESSAGE.to_string(),
    }
}

/// Show the loading bubble; the caller issues the request.
pub fn start(session: &mut Session) -> LoadingTicket {
    tracing::info!("loading briefing");
    session.show_loading()
}

pub fn finish(session: &mut Session, ticket: LoadingTicket, result: Result<Briefing>) {
    match &result {
        Ok(briefing) => {
            tracing::info!(categories = briefing.categories().len(), "briefing loaded");
        }
        Err(e) => {
            let detail = format!("{e:#}");
            tracing::error!(error = %detail, "briefing request failed");
        }
    }
    session.hide_loading(ticket);
    session.render(ChatRole::Assistant, message_for(&result));
}

pub async fn load_briefing<B: Backend + ?Sized>(session: &mut Session, backend: &B) {
    let ticket = start(session);
    let result = backend.briefing().await;
    finish(session, ticket, result);
}
