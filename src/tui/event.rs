//! Keyboard and input event handling.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{App, Field};
use crate::composer::AuthState;

/// Process a key event and update the application state.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> anyhow::Result<()> {
    if key.kind == KeyEventKind::Release {
        return Ok(());
    }

    // ── Always-available shortcuts ────────────────────────
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('q')) => {
            app.should_quit = true;
            return Ok(());
        }
        (_, KeyCode::F(1)) => {
            app.show_help = !app.show_help;
            return Ok(());
        }
        _ => {}
    }

    // ── Help popup (captures all keys) ────────────────────
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.show_help = false;
        }
        return Ok(());
    }

    // The compose view is gated on the token alone.
    if app.composer.auth_state() == AuthState::SignedIn {
        handle_compose_keys(app, key)
    } else {
        handle_login_keys(app, key)
    }
}

/// Keys on the sign-in screen.
fn handle_login_keys(app: &mut App, key: KeyEvent) -> anyhow::Result<()> {
    match key.code {
        KeyCode::Enter | KeyCode::Char('l') => app.start_login(),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
    Ok(())
}

/// Keys in the compose form.
fn handle_compose_keys(app: &mut App, key: KeyEvent) -> anyhow::Result<()> {
    // Exact Ctrl chords only: AltGr arrives as Ctrl+Alt on Windows and
    // must still type its character.
    if key.modifiers == KeyModifiers::CONTROL {
        match key.code {
            KeyCode::Char('s') => app.start_send(),
            KeyCode::Char('d') if app.focus == Field::Attachment => app.detach(),
            _ => {}
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => app.cycle_focus(true),
        KeyCode::BackTab | KeyCode::Up => app.cycle_focus(false),
        KeyCode::Enter => match app.focus {
            Field::Message => push_char(app, '\n'),
            Field::Attachment => app.attach_from_input(),
            Field::Send => app.start_send(),
            Field::To | Field::Subject => app.cycle_focus(true),
        },
        KeyCode::Delete if app.focus == Field::Attachment => app.detach(),
        KeyCode::Backspace => {
            if let Some(text) = app.focused_text_mut() {
                text.pop();
            }
        }
        KeyCode::Char(c) => push_char(app, c),
        _ => {}
    }
    Ok(())
}

fn push_char(app: &mut App, c: char) {
    if let Some(text) = app.focused_text_mut() {
        text.push(c);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use crossterm::event::KeyEvent;

    use super::*;
    use crate::auth::{TokenProvider, UserInfoSource};
    use crate::composer::{Composer, Services};
    use crate::config::ComposeConfig;
    use crate::error::{ComposerError, Result};
    use crate::gateway::{MailGateway, SendRequest};
    use crate::model::session::AccessToken;
    use crate::tui::app::AppEvent;

    struct Offline;

    #[async_trait]
    impl TokenProvider for Offline {
        async fn obtain_token(&self) -> Result<AccessToken> {
            Err(ComposerError::LoginFailed("offline".to_string()))
        }
    }

    #[async_trait]
    impl UserInfoSource for Offline {
        async fn fetch_email(&self, _token: &AccessToken) -> Result<String> {
            Err(ComposerError::UserInfo("offline".to_string()))
        }
    }

    #[async_trait]
    impl MailGateway for Offline {
        async fn submit(&self, _request: &SendRequest) -> Result<String> {
            Err(ComposerError::SendTransport("offline".to_string()))
        }
    }

    fn signed_in_app(rt: &tokio::runtime::Runtime) -> App {
        let services = Services {
            tokens: Arc::new(Offline),
            user_info: Arc::new(Offline),
            gateway: Arc::new(Offline),
        };
        let mut app = App::new(
            Composer::new(services, ComposeConfig::default()),
            rt.handle().clone(),
            App::channel(),
        );
        app.apply_event(AppEvent::TokenGranted(AccessToken::new("T")));
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    #[test]
    fn test_typing_q_in_a_field_does_not_quit() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = signed_in_app(&rt);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.composer.draft().recipient, "q");
    }

    #[test]
    fn test_enter_in_message_adds_newline() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = signed_in_app(&rt);
        app.focus = Field::Message;
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.composer.draft().body, "a\nb");
    }

    #[test]
    fn test_backspace_edits_focused_field() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = signed_in_app(&rt);
        app.focus = Field::Subject;
        press(&mut app, KeyCode::Char('H'));
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.composer.draft().subject, "H");
    }

    #[test]
    fn test_altgr_characters_are_typed() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = signed_in_app(&rt);
        press(&mut app, KeyCode::Char('a'));
        handle_key_event(
            &mut app,
            KeyEvent::new(
                KeyCode::Char('@'),
                KeyModifiers::CONTROL | KeyModifiers::ALT,
            ),
        )
        .unwrap();
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.composer.draft().recipient, "a@b");
    }

    #[test]
    fn test_plain_ctrl_chord_is_not_typed() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = signed_in_app(&rt);
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL),
        )
        .unwrap();
        assert_eq!(app.composer.draft().recipient, "");
    }

    #[test]
    fn test_ctrl_c_quits() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = signed_in_app(&rt);
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        )
        .unwrap();
        assert!(app.should_quit);
    }
}
