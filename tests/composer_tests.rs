//! Integration tests for the composer's sign-in and send workflows, driven
//! through in-memory collaborators that count their calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use sendshell::auth::{TokenProvider, UserInfoSource};
use sendshell::composer::{AuthState, Composer, Services};
use sendshell::config::ComposeConfig;
use sendshell::error::{ComposerError, MissingField, Result};
use sendshell::gateway::{MailGateway, SendRequest};
use sendshell::model::attachment::Attachment;
use sendshell::model::notice::NoticeLevel;
use sendshell::model::session::AccessToken;
use sendshell::model::submission::SubmissionState;

// ─── Fakes ──────────────────────────────────────────────────────────

struct FakeTokens {
    grant: Option<&'static str>,
    calls: AtomicUsize,
}

#[async_trait]
impl TokenProvider for FakeTokens {
    async fn obtain_token(&self) -> Result<AccessToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.grant {
            Some(token) => Ok(AccessToken::new(token)),
            None => Err(ComposerError::LoginDenied),
        }
    }
}

struct FakeUserInfo {
    email: Option<&'static str>,
    calls: AtomicUsize,
}

#[async_trait]
impl UserInfoSource for FakeUserInfo {
    async fn fetch_email(&self, _token: &AccessToken) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.email
            .map(str::to_string)
            .ok_or_else(|| ComposerError::UserInfo("HTTP 500: backend error".to_string()))
    }
}

/// Replies with a fixed success payload, or a 500 carrying `error` if set.
struct FakeGateway {
    error: Option<&'static str>,
    calls: AtomicUsize,
    last: Mutex<Option<SendRequest>>,
}

#[async_trait]
impl MailGateway for FakeGateway {
    async fn submit(&self, request: &SendRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());
        match self.error {
            None => Ok("Email sent".to_string()),
            Some(reason) => Err(ComposerError::SendServer {
                status: 500,
                reason: reason.to_string(),
            }),
        }
    }
}

struct Harness {
    tokens: Arc<FakeTokens>,
    user_info: Arc<FakeUserInfo>,
    gateway: Arc<FakeGateway>,
    composer: Composer,
}

fn harness_with(
    grant: Option<&'static str>,
    email: Option<&'static str>,
    gateway_error: Option<&'static str>,
    require_recipient: bool,
) -> Harness {
    let tokens = Arc::new(FakeTokens {
        grant,
        calls: AtomicUsize::new(0),
    });
    let user_info = Arc::new(FakeUserInfo {
        email,
        calls: AtomicUsize::new(0),
    });
    let gateway = Arc::new(FakeGateway {
        error: gateway_error,
        calls: AtomicUsize::new(0),
        last: Mutex::new(None),
    });
    let services = Services {
        tokens: tokens.clone(),
        user_info: user_info.clone(),
        gateway: gateway.clone(),
    };
    let rules = ComposeConfig {
        require_recipient,
        ..ComposeConfig::default()
    };
    Harness {
        tokens,
        user_info,
        gateway,
        composer: Composer::new(services, rules),
    }
}

fn harness() -> Harness {
    harness_with(Some("T"), Some("me@example.com"), None, true)
}

fn fill_draft(composer: &mut Composer) {
    let draft = composer.draft_mut();
    draft.recipient = "you@example.com".to_string();
    draft.subject = "Quarterly report".to_string();
    draft.body = "See attached.".to_string();
    draft.attachment = Some(Attachment::new(
        "report.pdf",
        "application/pdf",
        b"%PDF-1.4".to_vec(),
    ));
}

// ─── Validation ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_without_session_makes_no_call() {
    let mut h = harness();
    fill_draft(&mut h.composer);

    let err = h.composer.send().await.unwrap_err();

    match err {
        ComposerError::Validation { missing } => {
            assert_eq!(missing, vec![MissingField::AccessToken]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.gateway.calls.load(Ordering::SeqCst), 0);
    assert_eq!(*h.composer.state(), SubmissionState::Idle);
    let notices = h.composer.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(notices[0].text, "All fields are required!");
}

#[tokio::test]
async fn test_send_missing_body_makes_no_call() {
    let mut h = harness();
    h.composer.login().await.unwrap();
    fill_draft(&mut h.composer);
    h.composer.draft_mut().body.clear();
    h.composer.take_notices();

    let err = h.composer.send().await.unwrap_err();

    assert!(matches!(
        err,
        ComposerError::Validation { ref missing } if missing == &vec![MissingField::Body]
    ));
    assert_eq!(h.gateway.calls.load(Ordering::SeqCst), 0);
    assert_eq!(*h.composer.state(), SubmissionState::Idle);
    assert_eq!(h.composer.take_notices()[0].level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_invalid_send_after_failure_keeps_failed_state() {
    let mut h = harness_with(Some("T"), Some("me@example.com"), Some("SMTP error"), true);
    h.composer.login().await.unwrap();
    fill_draft(&mut h.composer);
    h.composer.send().await.unwrap_err();

    h.composer.draft_mut().subject.clear();
    h.composer.send().await.unwrap_err();

    assert_eq!(h.gateway.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *h.composer.state(),
        SubmissionState::Failed("SMTP error".to_string())
    );
}

#[tokio::test]
async fn test_recipient_not_required_when_disabled() {
    let mut h = harness_with(Some("T"), Some("me@example.com"), None, false);
    h.composer.login().await.unwrap();
    fill_draft(&mut h.composer);
    h.composer.draft_mut().recipient.clear();

    h.composer.send().await.unwrap();

    let request = h.gateway.last.lock().unwrap().clone().unwrap();
    assert!(request.recipient.is_none());
    assert_eq!(*h.composer.state(), SubmissionState::Succeeded);
}

// ─── Send outcomes ──────────────────────────────────────────────────

#[tokio::test]
async fn test_successful_send_resets_draft_and_keeps_session() {
    let mut h = harness();
    h.composer.login().await.unwrap();
    fill_draft(&mut h.composer);
    h.composer.take_notices();

    let payload = h.composer.send().await.unwrap();

    assert_eq!(payload, "Email sent");
    assert_eq!(*h.composer.state(), SubmissionState::Succeeded);
    assert!(h.composer.draft().is_blank());
    assert_eq!(h.composer.session().access_token, Some(AccessToken::new("T")));
    assert_eq!(
        h.composer.session().user_email.as_deref(),
        Some("me@example.com")
    );

    let notices = h.composer.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].text, "Email sent");

    let request = h.gateway.last.lock().unwrap().clone().unwrap();
    assert_eq!(request.access_token.secret(), "T");
    assert_eq!(request.recipient.as_deref(), Some("you@example.com"));
    assert_eq!(request.subject, "Quarterly report");
    assert_eq!(request.message, "See attached.");
    assert_eq!(request.attachment.filename, "report.pdf");
}

#[tokio::test]
async fn test_failed_send_retains_draft() {
    let mut h = harness_with(Some("T"), Some("me@example.com"), Some("SMTP error"), true);
    h.composer.login().await.unwrap();
    fill_draft(&mut h.composer);
    let before = h.composer.draft().clone();
    h.composer.take_notices();

    let err = h.composer.send().await.unwrap_err();

    assert_eq!(err.reason(), "SMTP error");
    assert_eq!(
        *h.composer.state(),
        SubmissionState::Failed("SMTP error".to_string())
    );
    assert_eq!(*h.composer.draft(), before);

    let notices = h.composer.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].text.contains("SMTP error"));
    assert_eq!(h.composer.last_error(), Some(notices[0].text.as_str()));
}

#[tokio::test]
async fn test_retry_after_failure_dispatches_again() {
    let mut h = harness_with(Some("T"), Some("me@example.com"), Some("SMTP error"), true);
    h.composer.login().await.unwrap();
    fill_draft(&mut h.composer);

    h.composer.send().await.unwrap_err();
    h.composer.send().await.unwrap_err();

    assert_eq!(h.gateway.calls.load(Ordering::SeqCst), 2);
}

// ─── Single flight ──────────────────────────────────────────────────

#[tokio::test]
async fn test_second_send_while_sending_is_rejected() {
    let mut h = harness();
    h.composer.login().await.unwrap();
    fill_draft(&mut h.composer);

    let first = h.composer.begin_send().unwrap();
    assert!(h.composer.state().is_sending());

    let err = h.composer.begin_send().unwrap_err();
    assert!(matches!(err, ComposerError::SendInProgress));
    assert!(h.composer.state().is_sending());

    assert!(h.composer.finish_send(first.attempt, &Ok("Email sent".to_string())));
    assert_eq!(*h.composer.state(), SubmissionState::Succeeded);
}

#[tokio::test]
async fn test_each_attempt_settles_exactly_once() {
    let mut h = harness();
    h.composer.login().await.unwrap();
    fill_draft(&mut h.composer);

    let ticket = h.composer.begin_send().unwrap();
    let failure: Result<String> = Err(ComposerError::SendTransport("reset".to_string()));

    assert!(h.composer.finish_send(ticket.attempt, &failure));
    assert!(h.composer.state().is_resting());
    // A duplicate completion for the same attempt is ignored.
    assert!(!h.composer.finish_send(ticket.attempt, &Ok("late".to_string())));
    assert_eq!(
        *h.composer.state(),
        SubmissionState::Failed("reset".to_string())
    );
}

#[tokio::test]
async fn test_stale_completion_does_not_settle_new_attempt() {
    let mut h = harness();
    h.composer.login().await.unwrap();
    fill_draft(&mut h.composer);

    let first = h.composer.begin_send().unwrap();
    h.composer.finish_send(first.attempt, &Err(ComposerError::SendTransport("x".to_string())));
    let second = h.composer.begin_send().unwrap();
    assert_ne!(first.attempt, second.attempt);

    assert!(!h.composer.finish_send(first.attempt, &Ok("old".to_string())));
    assert!(h.composer.state().is_sending());
}

#[tokio::test]
async fn test_edits_during_send_do_not_change_request() {
    let mut h = harness();
    h.composer.login().await.unwrap();
    fill_draft(&mut h.composer);

    let ticket = h.composer.begin_send().unwrap();
    h.composer.draft_mut().subject = "changed".to_string();

    assert_eq!(ticket.request.subject, "Quarterly report");
}

// ─── Sign-in ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_sets_token_and_email() {
    let mut h = harness();
    assert_eq!(h.composer.auth_state(), AuthState::SignedOut);

    h.composer.login().await.unwrap();

    assert_eq!(h.composer.auth_state(), AuthState::SignedIn);
    assert_eq!(h.composer.session().display_email(), "me@example.com");
    assert_eq!(h.tokens.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.user_info.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_userinfo_failure_keeps_token() {
    let mut h = harness_with(Some("T"), None, None, true);

    let err = h.composer.login().await.unwrap_err();

    assert!(matches!(err, ComposerError::UserInfo(_)));
    assert_eq!(h.composer.session().access_token, Some(AccessToken::new("T")));
    assert!(h.composer.session().user_email.is_none());
    // Compose view is gated on the token alone
    assert_eq!(h.composer.auth_state(), AuthState::SignedIn);
    let notices = h.composer.take_notices();
    assert!(notices
        .iter()
        .any(|n| n.level == NoticeLevel::Error && n.text.contains("Failed to fetch user info")));
}

#[tokio::test]
async fn test_send_works_after_userinfo_failure() {
    let mut h = harness_with(Some("T"), None, None, true);
    let _ = h.composer.login().await;
    fill_draft(&mut h.composer);

    h.composer.send().await.unwrap();

    assert_eq!(h.gateway.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_denied_login_leaves_session_untouched() {
    let mut h = harness_with(None, Some("me@example.com"), None, true);

    let err = h.composer.login().await.unwrap_err();

    assert!(matches!(err, ComposerError::LoginDenied));
    assert!(!h.composer.session().is_authenticated());
    assert_eq!(h.composer.auth_state(), AuthState::SignedOut);
    assert_eq!(h.user_info.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.composer.take_notices()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_login_while_pending_is_refused() {
    let mut h = harness();
    assert!(h.composer.begin_login());
    assert_eq!(h.composer.auth_state(), AuthState::Pending);

    assert!(h.composer.login().await.is_err());
    assert_eq!(h.tokens.calls.load(Ordering::SeqCst), 0);
    let notices = h.composer.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(notices[0].text, "Sign-in is already in progress");
}

// ─── Attachments ────────────────────────────────────────────────────

#[test]
fn test_attach_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();
    let mut h = harness();

    h.composer.attach_file(&path).unwrap();

    let attachment = h.composer.draft().attachment.as_ref().unwrap();
    assert_eq!(attachment.filename, "notes.txt");
    assert_eq!(attachment.content_type, "text/plain");
    assert_eq!(attachment.bytes, b"hello");
    assert_eq!(h.composer.take_notices()[0].level, NoticeLevel::Info);
}

#[test]
fn test_attach_missing_file_keeps_previous() {
    let mut h = harness();
    fill_draft(&mut h.composer);

    let result = h.composer.attach_file(std::path::Path::new("/nonexistent/file.bin"));

    assert!(result.is_err());
    assert_eq!(
        h.composer.draft().attachment.as_ref().unwrap().filename,
        "report.pdf"
    );
    assert_eq!(h.composer.take_notices()[0].level, NoticeLevel::Error);
}
