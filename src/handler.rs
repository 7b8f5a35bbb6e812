use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::App;
use crate::briefing;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::BriefingLoaded(ticket, result) => {
            briefing::finish(&mut app.session, ticket, result);
        }
        AppEvent::ChatReplied(pending, result) => {
            app.session.finish_send(pending, result);
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.session.input_focused() {
        handle_editing_mode(app, key);
    } else {
        handle_normal_mode(app, key);
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Enter | KeyCode::Tab => app.session.focus_input(),

        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_page_up();
        }
        KeyCode::PageDown => app.scroll_page_down(),
        KeyCode::PageUp => app.scroll_page_up(),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.session.blur_input(),
        KeyCode::Enter => app.submit_message(),
        KeyCode::Backspace => app.session.input.backspace(),
        KeyCode::Delete => app.session.input.delete(),
        KeyCode::Left => app.session.input.move_left(),
        KeyCode::Right => app.session.input.move_right(),
        KeyCode::Home => app.session.input.move_home(),
        KeyCode::End => app.session.input.move_end(),
        KeyCode::PageUp => app.scroll_page_up(),
        KeyCode::PageDown => app.scroll_page_down(),
        KeyCode::Char(c) => app.session.input.insert(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Backend, Briefing};
    use crate::state::{ChatRole, SessionState};
    use async_trait::async_trait;
    use crossterm::event::KeyEventKind;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl Backend for Echo {
        async fn briefing(&self) -> anyhow::Result<Briefing> {
            Ok(Briefing::default())
        }

        async fn chat(&self, message: &str) -> anyhow::Result<String> {
            Ok(format!("echo: {message}"))
        }
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn typing_and_enter_round_trips_through_the_event_loop() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut app = App::new(Arc::new(Echo), tx);

        for c in "hi".chars() {
            handle_event(&mut app, press(KeyCode::Char(c))).unwrap();
        }
        handle_event(&mut app, press(KeyCode::Enter)).unwrap();
        assert_eq!(app.session.state(), SessionState::Pending);
        assert!(!app.session.send_enabled());

        // Enter again while pending does nothing
        handle_event(&mut app, press(KeyCode::Char('x'))).unwrap();
        handle_event(&mut app, press(KeyCode::Enter)).unwrap();
        assert_eq!(app.session.transcript().len(), 1);

        let reply = rx.recv().await.expect("chat reply event");
        handle_event(&mut app, reply).unwrap();

        assert_eq!(app.session.state(), SessionState::Idle);
        assert_eq!(app.session.transcript().count_role(ChatRole::User), 1);
        assert_eq!(
            app.session.transcript().last().map(|m| m.content.as_str()),
            Some("echo: hi")
        );
        assert_eq!(app.session.input.text(), "x");
    }

    #[tokio::test]
    async fn briefing_event_renders_first_message() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut app = App::new(Arc::new(Echo), tx);
        app.start_briefing();
        assert!(app.session.loading().is_visible());

        let loaded = rx.recv().await.expect("briefing event");
        assert!(matches!(loaded, AppEvent::BriefingLoaded(..)));
        handle_event(&mut app, loaded).unwrap();

        assert!(!app.session.loading().is_visible());
        assert_eq!(app.session.transcript().len(), 1);
    }

    #[test]
    fn ctrl_c_quits_while_editing() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut app = App::new(Arc::new(Echo), tx);
        let mut key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        key.kind = KeyEventKind::Press;
        handle_event(&mut app, AppEvent::Key(key)).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn esc_then_q_quits() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut app = App::new(Arc::new(Echo), tx);
        handle_event(&mut app, press(KeyCode::Char('q'))).unwrap();
        assert!(!app.should_quit);
        assert_eq!(app.session.input.text(), "q");

        handle_event(&mut app, press(KeyCode::Esc)).unwrap();
        handle_event(&mut app, press(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit);
    }
}
