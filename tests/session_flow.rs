//! Session controller and briefing loader against a scripted in-memory backend.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use briefing_chat::briefing::{self, BRIEFING_ERROR_MESSAGE};
use briefing_chat::session::{self, CHAT_ERROR_MESSAGE};
use briefing_chat::{Article, Backend, Briefing, Category, ChatRole, Session, SessionState};

/// Replies are popped in order; every call is recorded.
#[derive(Default)]
struct ScriptedBackend {
    briefing: Mutex<Option<Result<Briefing>>>,
    replies: Mutex<VecDeque<Result<String>>>,
    chat_calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn with_replies(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    fn with_briefing(briefing: Result<Briefing>) -> Self {
        Self {
            briefing: Mutex::new(Some(briefing)),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.chat_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn briefing(&self) -> Result<Briefing> {
        self.briefing
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(anyhow!("no briefing scripted")))
    }

    async fn chat(&self, message: &str) -> Result<String> {
        self.chat_calls.lock().unwrap().push(message.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no reply scripted")))
    }
}

fn tech_and_world() -> Briefing {
    Briefing::new(vec![
        Category {
            name: "Tech".into(),
            articles: vec![Article {
                zh_title: "A".into(),
                takeaway: "b".into(),
            }],
        },
        Category {
            name: "World".into(),
            articles: vec![Article {
                zh_title: "C".into(),
                takeaway: "d".into(),
            }],
        },
    ])
}

#[tokio::test]
async fn idle_send_yields_user_then_assistant() {
    let backend = ScriptedBackend::with_replies(vec![Ok("**Answer**".into())]);
    let mut session = Session::new();
    session.input.set_text("  what happened today?  ");

    session.send_message(&backend).await;

    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::User);
    assert_eq!(messages[0].content, "what happened today?");
    assert_eq!(messages[1].role, ChatRole::Assistant);
    assert_eq!(messages[1].content, "**Answer**");
    assert_eq!(backend.calls(), ["what happened today?"]);
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.send_enabled());
    assert_eq!(session.loading().bubble_count(), 0);
}

#[tokio::test]
async fn blank_input_makes_no_request() {
    let backend = ScriptedBackend::with_replies(vec![Ok("unused".into())]);
    let mut session = Session::new();
    session.input.set_text(" \n\t ");

    session.send_message(&backend).await;

    assert!(session.transcript().is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn send_while_pending_is_a_noop() {
    let backend = ScriptedBackend::with_replies(vec![Ok("first".into()), Ok("second".into())]);
    let mut session = Session::new();
    session.input.set_text("first question");
    let pending = session.begin_send().expect("accepted");

    session.input.set_text("second question");
    session.send_message(&backend).await;
    assert_eq!(session.transcript().len(), 1);
    assert!(backend.calls().is_empty());
    assert_eq!(session.loading().bubble_count(), 1);

    let reply = backend.chat(&pending.message).await;
    session.finish_send(pending, reply);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.input.text(), "second question");
}

#[tokio::test]
async fn failed_chat_leaves_one_error_message() {
    let backend = ScriptedBackend::with_replies(vec![Err(anyhow!("connection refused"))]);
    let mut session = Session::new();
    session.input.set_text("hello");

    session.send_message(&backend).await;

    let transcript = session.transcript();
    assert_eq!(transcript.count_role(ChatRole::Assistant), 1);
    assert_eq!(
        transcript.last().map(|m| m.content.as_str()),
        Some(CHAT_ERROR_MESSAGE)
    );
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.send_enabled());
    assert!(session.input_focused());
}

#[tokio::test]
async fn conversation_keeps_arrival_order() {
    let backend = ScriptedBackend::with_replies(vec![
        Ok("one".into()),
        Err(anyhow!("boom")),
        Ok("three".into()),
    ]);
    let mut session = Session::new();
    for question in ["q1", "q2", "q3"] {
        session.input.set_text(question);
        session.send_message(&backend).await;
    }

    let contents: Vec<&str> = session
        .transcript()
        .messages()
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(
        contents,
        ["q1", "one", "q2", CHAT_ERROR_MESSAGE, "q3", "three"]
    );
}

#[tokio::test]
async fn briefing_renders_as_first_message() {
    let backend = ScriptedBackend::with_briefing(Ok(tech_and_world()));
    let mut session = Session::new();

    briefing::load_briefing(&mut session, &backend).await;

    assert_eq!(session.transcript().len(), 1);
    let message = session.transcript().last().unwrap();
    assert_eq!(message.role, ChatRole::Assistant);
    let tech = message.content.find("### 📂 Tech").unwrap();
    let world = message.content.find("### 📂 World").unwrap();
    assert!(tech < world);
    assert_eq!(session.loading().bubble_count(), 0);
}

#[tokio::test]
async fn briefing_failure_is_terminal() {
    let backend = ScriptedBackend::with_briefing(Err(anyhow!("malformed")));
    let mut session = Session::new();

    briefing::load_briefing(&mut session, &backend).await;

    assert_eq!(session.transcript().len(), 1);
    assert_eq!(
        session.transcript().last().map(|m| m.content.as_str()),
        Some(BRIEFING_ERROR_MESSAGE)
    );
}

#[tokio::test]
async fn briefing_and_chat_overlap_with_one_pending_bubble() {
    let backend = ScriptedBackend::with_replies(vec![Ok("reply".into())]);
    let mut session = Session::new();

    let ticket = briefing::start(&mut session);
    session.input.set_text("early question");
    let pending = session.begin_send().expect("accepted");
    assert_eq!(session.loading().bubble_count(), 1);

    briefing::finish(&mut session, ticket, Ok(Briefing::default()));
    assert_eq!(session.loading().bubble_count(), 1);

    let reply = backend.chat(&pending.message).await;
    session.finish_send(pending, reply);
    assert_eq!(session.loading().bubble_count(), 0);
    assert_eq!(session.transcript().len(), 3);
}

#[tokio::test]
async fn ask_returns_the_reply() {
    let backend = ScriptedBackend::with_replies(vec![Ok("**Answer**".into())]);

    let reply = session::ask(&backend, " what happened? ").await.unwrap();

    assert_eq!(reply, "**Answer**");
    assert_eq!(backend.calls(), ["what happened?"]);
}

#[tokio::test]
async fn ask_with_blank_question_is_an_error() {
    let backend = ScriptedBackend::with_replies(vec![Ok("unused".into())]);

    let err = session::ask(&backend, "  \t ").await.unwrap_err();

    assert!(err.to_string().contains("empty"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn ask_failure_yields_the_apology() {
    let backend = ScriptedBackend::with_replies(vec![Err(anyhow!("timed out"))]);

    let reply = session::ask(&backend, "hello").await.unwrap();

    assert_eq!(reply, CHAT_ERROR_MESSAGE);
}
