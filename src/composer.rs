//! The composer: session, draft and submission state, plus the two
//! asynchronous workflows that drive them (sign-in and send).
//!
//! Each workflow is available as one `async fn` (`login`, `send`) and as
//! separate begin/complete steps for event-driven surfaces that run the
//! network call on a background task and deliver the result later.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use crate::auth::implicit::UrlAnnouncer;
use crate::auth::{GoogleUserInfo, ImplicitGrantFlow, TokenProvider, UserInfoSource};
use crate::config::{ComposeConfig, Config};
use crate::error::{ComposerError, MissingField, Result};
use crate::gateway::{HttpMailGateway, MailGateway, SendRequest};
use crate::i18n;
use crate::model::attachment::Attachment;
use crate::model::draft::DraftMessage;
use crate::model::notice::Notice;
use crate::model::session::{AccessToken, Session};
use crate::model::submission::SubmissionState;

/// External collaborators. Cheap to clone so tasks can carry them.
#[derive(Clone)]
pub struct Services {
    pub tokens: Arc<dyn TokenProvider>,
    pub user_info: Arc<dyn UserInfoSource>,
    pub gateway: Arc<dyn MailGateway>,
}

impl Services {
    /// Production collaborators: browser implicit grant, Google userinfo and
    /// the HTTP gateway from `config`.
    pub fn from_config(config: &Config, announcer: Option<UrlAnnouncer>) -> Result<Self> {
        let mut flow = ImplicitGrantFlow::from_config(&config.oauth)?;
        if let Some(announce) = announcer {
            flow = flow.with_announcer(announce);
        }
        Self::with_tokens(config, Arc::new(flow))
    }

    /// Like [`Services::from_config`] but with a caller-supplied token source.
    pub fn with_tokens(config: &Config, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let gateway = HttpMailGateway::from_config(&config.gateway)?;
        let user_info = GoogleUserInfo::from_config(reqwest::Client::new(), &config.oauth)?;
        Ok(Self {
            tokens,
            user_info: Arc::new(user_info),
            gateway: Arc::new(gateway),
        })
    }
}

/// Coarse sign-in status derived from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    SignedOut,
    Pending,
    SignedIn,
}

/// A dispatched send: the attempt number to report back and the frozen
/// request to hand to the gateway.
#[derive(Debug)]
pub struct SendTicket {
    pub attempt: u64,
    pub request: SendRequest,
}

pub struct Composer {
    services: Services,
    rules: ComposeConfig,
    session: Session,
    login_pending: bool,
    draft: DraftMessage,
    state: SubmissionState,
    /// Number of the most recently dispatched attempt.
    attempt: u64,
    notices: VecDeque<Notice>,
    last_error: Option<String>,
}

impl Composer {
    pub fn new(services: Services, rules: ComposeConfig) -> Self {
        Self {
            services,
            rules,
            session: Session::default(),
            login_pending: false,
            draft: DraftMessage::default(),
            state: SubmissionState::Idle,
            attempt: 0,
            notices: VecDeque::new(),
            last_error: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn draft(&self) -> &DraftMessage {
        &self.draft
    }

    /// Direct access for input handlers. Edits are allowed in every state;
    /// an in-flight request already holds its own copy.
    pub fn draft_mut(&mut self) -> &mut DraftMessage {
        &mut self.draft
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn requires_recipient(&self) -> bool {
        self.rules.require_recipient
    }

    pub fn auth_state(&self) -> AuthState {
        if self.session.is_authenticated() {
            AuthState::SignedIn
        } else if self.login_pending {
            AuthState::Pending
        } else {
            AuthState::SignedOut
        }
    }

    /// Text of the most recent error notice.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn notify(&mut self, notice: Notice) {
        if notice.is_error() {
            self.last_error = Some(notice.text.clone());
        }
        self.notices.push_back(notice);
    }

    // ── Draft editing ─────────────────────────────────────────

    /// Load `path` as the draft's attachment, replacing any previous one.
    /// Failures are reported as a notice and leave the draft unchanged.
    pub fn attach_file(&mut self, path: &Path) -> Result<()> {
        match Attachment::from_path(path, self.rules.max_attachment_size) {
            Ok(attachment) => {
                let size = humansize::format_size(attachment.size(), humansize::BINARY);
                self.notify(Notice::info(format!(
                    "{}: {} ({size})",
                    i18n::msg_attached(),
                    attachment.filename
                )));
                self.draft.attachment = Some(attachment);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Attachment rejected");
                self.notify(Notice::error(format!("{}: {e}", i18n::err_attachment())));
                Err(e)
            }
        }
    }

    pub fn detach(&mut self) {
        self.draft.attachment = None;
    }

    // ── Sign-in ───────────────────────────────────────────────

    /// Run the whole sign-in: obtain a token, then look up the email.
    ///
    /// When the userinfo lookup fails the token is kept and the error is
    /// returned; the session is usable for sending either way.
    pub async fn login(&mut self) -> Result<()> {
        if !self.begin_login() {
            return Err(ComposerError::LoginFailed(
                i18n::err_login_in_progress().to_string(),
            ));
        }

        let tokens = Arc::clone(&self.services.tokens);
        let token = match tokens.obtain_token().await {
            Ok(token) => token,
            Err(e) => {
                self.on_login_failed(&e);
                return Err(e);
            }
        };
        self.on_token_granted(token.clone());

        let user_info = Arc::clone(&self.services.user_info);
        match user_info.fetch_email(&token).await {
            Ok(email) => {
                self.on_user_info(email);
                Ok(())
            }
            Err(e) => {
                self.on_user_info_failed(&e);
                Err(e)
            }
        }
    }

    /// Mark a sign-in as started. Returns `false` (and queues a warning) if
    /// one is already running, in which case the caller must not start
    /// another flow.
    pub fn begin_login(&mut self) -> bool {
        if self.login_pending {
            tracing::debug!("Sign-in already pending");
            self.notify(Notice::warning(i18n::err_login_in_progress()));
            return false;
        }
        self.login_pending = true;
        true
    }

    /// The provider granted a token. Stored before the email is known.
    pub fn on_token_granted(&mut self, token: AccessToken) {
        self.login_pending = false;
        self.session.access_token = Some(token);
        tracing::info!("Access token stored");
    }

    /// The provider flow failed. The session is not touched.
    pub fn on_login_failed(&mut self, err: &ComposerError) {
        self.login_pending = false;
        tracing::warn!(error = %err, "Sign-in failed");
        let text = match err {
            ComposerError::LoginDenied => i18n::err_login_denied().to_string(),
            other => format!("{} ({})", i18n::err_login_failed(), other.reason()),
        };
        self.notify(Notice::error(text));
    }

    pub fn on_user_info(&mut self, email: String) {
        tracing::info!(email = %email, "Signed in");
        self.notify(Notice::info(format!("{} {email}", i18n::msg_signed_in_as())));
        self.session.user_email = Some(email);
    }

    /// The userinfo lookup failed. The token stays; only the email is unknown.
    pub fn on_user_info_failed(&mut self, err: &ComposerError) {
        tracing::error!(error = %err, "Failed to fetch user info");
        self.notify(Notice::error(format!(
            "{}: {}",
            i18n::err_user_info(),
            err.reason()
        )));
    }

    // ── Send ──────────────────────────────────────────────────

    /// Validate, dispatch and settle one send attempt.
    ///
    /// Validation failures and a send already in flight return early without
    /// touching the network or the submission state.
    pub async fn send(&mut self) -> Result<String> {
        let ticket = self.begin_send()?;
        let gateway = Arc::clone(&self.services.gateway);
        let outcome = gateway.submit(&ticket.request).await;
        self.finish_send(ticket.attempt, &outcome);
        outcome
    }

    /// Check preconditions and move to `Sending`.
    pub fn begin_send(&mut self) -> Result<SendTicket> {
        if self.state.is_sending() {
            tracing::warn!(attempt = self.attempt, "Send rejected: already sending");
            self.notify(Notice::warning(i18n::err_send_in_progress()));
            return Err(ComposerError::SendInProgress);
        }

        let missing = self
            .draft
            .missing_fields(&self.session, self.rules.require_recipient);
        let token = self.session.access_token.clone();
        let attachment = self.draft.attachment.clone();
        let (Some(access_token), Some(attachment), true) = (token, attachment, missing.is_empty())
        else {
            return Err(self.reject_invalid(missing));
        };

        self.attempt += 1;
        self.state = SubmissionState::Sending;

        let request = SendRequest {
            access_token,
            recipient: self
                .rules
                .require_recipient
                .then(|| self.draft.recipient.clone()),
            subject: self.draft.subject.clone(),
            message: self.draft.body.clone(),
            attachment,
        };
        tracing::info!(
            attempt = self.attempt,
            to = request.recipient.as_deref().unwrap_or("-"),
            file = %request.attachment.filename,
            size = request.attachment.size(),
            "Dispatching message"
        );

        Ok(SendTicket {
            attempt: self.attempt,
            request,
        })
    }

    /// Settle attempt `attempt` with the gateway's outcome.
    ///
    /// Returns `false` (and changes nothing) when that attempt is not the one
    /// in flight, so each attempt reaches its resting state exactly once.
    pub fn finish_send(&mut self, attempt: u64, outcome: &Result<String>) -> bool {
        if !self.state.is_sending() || attempt != self.attempt {
            tracing::warn!(
                attempt,
                current = self.attempt,
                "Ignoring completion for an attempt that is not in flight"
            );
            return false;
        }

        match outcome {
            Ok(payload) => {
                tracing::info!(attempt, "Message sent");
                self.state = SubmissionState::Succeeded;
                let text = if payload.is_empty() {
                    i18n::msg_email_sent().to_string()
                } else {
                    payload.clone()
                };
                self.notify(Notice::success(text));
                self.draft.clear();
            }
            Err(e) => {
                let reason = e.reason();
                tracing::error!(attempt, error = %e, "Send failed");
                self.notify(Notice::error(format!("{}: {reason}", i18n::err_send_failed())));
                self.state = SubmissionState::Failed(reason);
            }
        }
        true
    }

    fn reject_invalid(&mut self, missing: Vec<MissingField>) -> ComposerError {
        tracing::warn!(?missing, "Send rejected: required fields missing");
        self.notify(Notice::warning(i18n::err_all_fields_required()));
        ComposerError::Validation { missing }
    }
}
