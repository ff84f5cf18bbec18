//! Global application state for the TUI (the "Model" in Elm architecture).
//!
//! Network work runs on the tokio runtime; results come back as
//! [`AppEvent`]s through an unbounded channel that [`App::tick`] drains, so
//! the composer is only ever touched from the UI thread.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::composer::{AuthState, Composer};
use crate::error::{ComposerError, Result};
use crate::i18n;
use crate::model::notice::Notice;
use crate::model::session::AccessToken;

/// How long a toast stays in the status bar.
const TOAST_SECS: u64 = 5;

/// Which compose field currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    To,
    Subject,
    Message,
    Attachment,
    Send,
}

/// Completions delivered from background tasks.
#[derive(Debug)]
pub enum AppEvent {
    /// The authorization URL, for users whose browser did not open.
    LoginUrl(String),
    TokenGranted(AccessToken),
    LoginFailed(ComposerError),
    UserInfo(Result<String>),
    SendFinished { attempt: u64, outcome: Result<String> },
}

/// Complete TUI state.
pub struct App {
    pub composer: Composer,

    // ── UI state ──────────────────────────────
    /// Focused field in the compose view.
    pub focus: Field,
    /// Path being typed into the attachment field.
    pub attachment_input: String,
    /// Help popup visible?
    pub show_help: bool,
    /// Toast currently shown and when it appeared.
    pub toast: Option<(Notice, Instant)>,
    /// Notices waiting for the toast slot.
    pending_toasts: VecDeque<Notice>,

    // ── Lifecycle ─────────────────────────────
    pub should_quit: bool,
    runtime: Handle,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    /// Create the app around a composer. `events` must be the channel whose
    /// sender the login announcer (if any) was built with.
    pub fn new(
        composer: Composer,
        runtime: Handle,
        events: (UnboundedSender<AppEvent>, UnboundedReceiver<AppEvent>),
    ) -> Self {
        let (events_tx, events_rx) = events;
        let focus = if composer.requires_recipient() {
            Field::To
        } else {
            Field::Subject
        };
        Self {
            composer,
            focus,
            attachment_input: String::new(),
            show_help: false,
            toast: None,
            pending_toasts: VecDeque::new(),
            should_quit: false,
            runtime,
            events_tx,
            events_rx,
        }
    }

    /// A fresh event channel.
    pub fn channel() -> (UnboundedSender<AppEvent>, UnboundedReceiver<AppEvent>) {
        unbounded_channel()
    }

    /// Fields in tab order for the current configuration.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::with_capacity(5);
        if self.composer.requires_recipient() {
            fields.push(Field::To);
        }
        fields.extend([Field::Subject, Field::Message, Field::Attachment, Field::Send]);
        fields
    }

    /// Move focus forward (or backward), wrapping around.
    pub fn cycle_focus(&mut self, forward: bool) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % fields.len()
        } else {
            (pos + fields.len() - 1) % fields.len()
        };
        self.focus = fields[next];
    }

    /// The editable text behind the focused field, if it has one.
    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::To => Some(&mut self.composer.draft_mut().recipient),
            Field::Subject => Some(&mut self.composer.draft_mut().subject),
            Field::Message => Some(&mut self.composer.draft_mut().body),
            Field::Attachment => Some(&mut self.attachment_input),
            Field::Send => None,
        }
    }

    // ── Actions ───────────────────────────────────────────────

    /// Start the implicit grant on a background task.
    pub fn start_login(&mut self) {
        if self.composer.auth_state() == AuthState::SignedIn || !self.composer.begin_login() {
            return;
        }
        self.push_toast(Notice::info(i18n::msg_waiting_for_browser()));

        let services = self.composer.services().clone();
        let tx = self.events_tx.clone();
        // Each stage runs in its own task so a panic still reports back and
        // the pending sign-in is released.
        self.runtime.spawn(async move {
            let tokens = Arc::clone(&services.tokens);
            let granted = tokio::spawn(async move { tokens.obtain_token().await }).await;
            let token = match granted {
                Ok(Ok(token)) => token,
                Ok(Err(e)) => {
                    let _ = tx.send(AppEvent::LoginFailed(e));
                    return;
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::LoginFailed(ComposerError::LoginFailed(format!(
                        "sign-in task failed: {e}"
                    ))));
                    return;
                }
            };
            let _ = tx.send(AppEvent::TokenGranted(token.clone()));

            let user_info = Arc::clone(&services.user_info);
            let email = match tokio::spawn(async move { user_info.fetch_email(&token).await }).await
            {
                Ok(email) => email,
                Err(e) => Err(ComposerError::UserInfo(format!("userinfo task failed: {e}"))),
            };
            let _ = tx.send(AppEvent::UserInfo(email));
        });
    }

    /// Dispatch the draft. Validation failures only queue a warning.
    pub fn start_send(&mut self) {
        let ticket = match self.composer.begin_send() {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::debug!(error = %e, "Send not dispatched");
                return;
            }
        };

        let gateway = Arc::clone(&self.composer.services().gateway);
        let tx = self.events_tx.clone();
        let attempt = ticket.attempt;
        let request = ticket.request;
        let submit = self
            .runtime
            .spawn(async move { gateway.submit(&request).await });
        // A panicking submit still reports back, so the busy state never sticks.
        self.runtime.spawn(async move {
            let outcome = match submit.await {
                Ok(outcome) => outcome,
                Err(e) => Err(ComposerError::SendTransport(format!("send task failed: {e}"))),
            };
            let _ = tx.send(AppEvent::SendFinished { attempt, outcome });
        });
    }

    /// Load the path typed in the attachment field.
    pub fn attach_from_input(&mut self) {
        let raw = self.attachment_input.trim();
        if raw.is_empty() {
            return;
        }
        let path = expand_home(raw);
        if self.composer.attach_file(&path).is_ok() {
            self.attachment_input.clear();
        }
    }

    pub fn detach(&mut self) {
        self.composer.detach();
        self.attachment_input.clear();
    }

    // ── Event plumbing ────────────────────────────────────────

    /// Apply one background completion to the composer.
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LoginUrl(url) => {
                tracing::info!(url = %url, "Authorization URL");
                self.push_toast(Notice::info(format!("{}: {url}", i18n::msg_open_url())));
            }
            AppEvent::TokenGranted(token) => self.composer.on_token_granted(token),
            AppEvent::LoginFailed(err) => self.composer.on_login_failed(&err),
            AppEvent::UserInfo(Ok(email)) => self.composer.on_user_info(email),
            AppEvent::UserInfo(Err(err)) => self.composer.on_user_info_failed(&err),
            AppEvent::SendFinished { attempt, outcome } => {
                self.composer.finish_send(attempt, &outcome);
            }
        }
    }

    /// Called every tick: applies completions and rotates toasts.
    pub fn tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
        for notice in self.composer.take_notices() {
            self.pending_toasts.push_back(notice);
        }

        let expired = self
            .toast
            .as_ref()
            .is_some_and(|(_, when)| when.elapsed().as_secs() >= TOAST_SECS);
        if expired || (self.toast.is_none() && !self.pending_toasts.is_empty()) {
            self.toast = self
                .pending_toasts
                .pop_front()
                .map(|notice| (notice, Instant::now()));
        }
    }

    fn push_toast(&mut self, notice: Notice) {
        self.pending_toasts.push_back(notice);
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}
