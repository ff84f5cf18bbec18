//! OAuth 2.0 implicit grant driven from the terminal.
//!
//! The provider returns the token in the URL fragment, which browsers never
//! send to a server. A loopback listener therefore serves a tiny page that
//! forwards `location.hash` to `/callback` as a query string, where it is
//! parsed and handed back to the waiting flow.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

use super::TokenProvider;
use crate::config::{parse_url, OAuthConfig};
use crate::error::{ComposerError, Result};
use crate::model::session::AccessToken;

/// Served at `/`: moves the fragment into a query string the server can see.
const LANDING_PAGE: &str = r#"<!doctype html>
<html><head><meta charset="utf-8"><title>sendShell</title></head>
<body>
<p>Completing sign-in&hellip;</p>
<script>
  var params = window.location.hash.substring(1) || window.location.search.substring(1);
  window.location.replace('/callback?' + (params || 'error=missing_token'));
</script>
</body></html>
"#;

/// Served at `/callback` once the parameters are captured.
const DONE_PAGE: &str = r#"<!doctype html>
<html><head><meta charset="utf-8"><title>sendShell</title></head>
<body><p>You can close this window and return to the terminal.</p></body></html>
"#;

/// Callback used to show the authorization URL to the user.
pub type UrlAnnouncer = Arc<dyn Fn(&Url) + Send + Sync>;

/// Parameters the provider appends to the redirect URI.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CallbackParams {
    pub access_token: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub expires_in: Option<u64>,
}

/// Browser-based implicit grant with a loopback redirect.
pub struct ImplicitGrantFlow {
    client_id: String,
    auth_endpoint: Url,
    scopes: Vec<String>,
    redirect_port: u16,
    timeout: Duration,
    open_browser: bool,
    announcer: Option<UrlAnnouncer>,
}

impl ImplicitGrantFlow {
    pub fn from_config(config: &OAuthConfig) -> Result<Self> {
        if config.client_id.trim().is_empty() {
            return Err(ComposerError::Config("oauth.client_id is empty".to_string()));
        }
        if config.scopes.is_empty() {
            return Err(ComposerError::Config("oauth.scopes is empty".to_string()));
        }
        Ok(Self {
            client_id: config.client_id.trim().to_string(),
            auth_endpoint: parse_url(&config.auth_endpoint)?,
            scopes: config.scopes.clone(),
            redirect_port: config.redirect_port,
            timeout: config.login_timeout(),
            open_browser: config.open_browser,
            announcer: None,
        })
    }

    /// Show the authorization URL through `announcer` before waiting.
    pub fn with_announcer(mut self, announcer: UrlAnnouncer) -> Self {
        self.announcer = Some(announcer);
        self
    }

    /// Build the provider URL the user has to visit.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> Url {
        let mut url = self.auth_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "token")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state)
            .append_pair("include_granted_scopes", "true")
            .append_pair("prompt", "consent");
        url
    }

    async fn wait_for_callback(&self) -> Result<AccessToken> {
        let listener = TcpListener::bind(("127.0.0.1", self.redirect_port))
            .await
            .map_err(|e| {
                ComposerError::LoginFailed(format!(
                    "cannot listen on 127.0.0.1:{}: {e}",
                    self.redirect_port
                ))
            })?;
        let port = listener
            .local_addr()
            .map_err(|e| ComposerError::LoginFailed(e.to_string()))?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{port}/");
        let state = uuid::Uuid::new_v4().simple().to_string();
        let url = self.authorize_url(&redirect_uri, &state);

        let (params_tx, params_rx) = oneshot::channel::<CallbackParams>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let router = callback_router(CallbackSlot::new(params_tx));
        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });
        tracing::info!(port, "OAuth callback listener started");

        if let Some(announce) = &self.announcer {
            announce(&url);
        }
        if self.open_browser {
            if let Err(e) = webbrowser::open(url.as_str()) {
                tracing::warn!(error = %e, "Could not open a browser");
            }
        }

        let received = tokio::time::timeout(self.timeout, params_rx).await;

        let _ = shutdown_tx.send(());
        if tokio::time::timeout(Duration::from_secs(2), server)
            .await
            .is_err()
        {
            tracing::debug!("Callback listener did not stop in time");
        }

        match received {
            Err(_) => Err(ComposerError::LoginFailed(format!(
                "no response from the browser after {}s",
                self.timeout.as_secs()
            ))),
            Ok(Err(_)) => Err(ComposerError::LoginFailed(
                "callback listener closed".to_string(),
            )),
            Ok(Ok(params)) => interpret_callback(params, &state),
        }
    }
}

#[async_trait]
impl TokenProvider for ImplicitGrantFlow {
    async fn obtain_token(&self) -> Result<AccessToken> {
        let token = self.wait_for_callback().await;
        match &token {
            Ok(_) => tracing::info!("Implicit grant completed"),
            Err(e) => tracing::warn!(error = %e, "Implicit grant failed"),
        }
        token
    }
}

/// Turn the redirect parameters into a token or a login error.
///
/// The `state` must match before anything else in the callback is trusted,
/// including a provider `error`.
pub fn interpret_callback(params: CallbackParams, expected_state: &str) -> Result<AccessToken> {
    if params.state.as_deref() != Some(expected_state) {
        return Err(ComposerError::LoginFailed(
            "state mismatch in OAuth callback".to_string(),
        ));
    }
    if let Some(error) = params.error {
        if error == "access_denied" {
            return Err(ComposerError::LoginDenied);
        }
        let detail = params.error_description.unwrap_or(error);
        return Err(ComposerError::LoginFailed(detail));
    }
    match params.access_token {
        Some(token) if !token.is_empty() => {
            tracing::debug!(expires_in = ?params.expires_in, "Access token received");
            Ok(AccessToken::new(token))
        }
        _ => Err(ComposerError::LoginFailed(
            "no access token in OAuth callback".to_string(),
        )),
    }
}

// ── Loopback server ─────────────────────────────────────────────

/// Single-use hand-off from the HTTP handler to the waiting flow.
#[derive(Clone)]
struct CallbackSlot(Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>);

impl CallbackSlot {
    fn new(sender: oneshot::Sender<CallbackParams>) -> Self {
        Self(Arc::new(Mutex::new(Some(sender))))
    }

    fn deliver(&self, params: CallbackParams) {
        let sender = self.0.lock().ok().and_then(|mut slot| slot.take());
        match sender {
            Some(tx) => {
                let _ = tx.send(params);
            }
            None => tracing::debug!("Duplicate OAuth callback ignored"),
        }
    }
}

fn callback_router(slot: CallbackSlot) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/callback", get(receive_callback))
        .with_state(slot)
}

async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

async fn receive_callback(
    State(slot): State<CallbackSlot>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    slot.deliver(params);
    Html(DONE_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow() -> ImplicitGrantFlow {
        ImplicitGrantFlow::from_config(&OAuthConfig::default()).unwrap()
    }

    #[test]
    fn test_authorize_url_carries_implicit_grant_params() {
        let url = flow().authorize_url("http://127.0.0.1:8765/", "abc123");
        let pairs: std::collections::HashMap<String, String> =
            url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(pairs["response_type"], "token");
        assert_eq!(pairs["redirect_uri"], "http://127.0.0.1:8765/");
        assert_eq!(pairs["state"], "abc123");
        assert!(pairs["scope"].contains("gmail.send"));
        assert!(pairs["scope"].contains("userinfo.email"));
    }

    #[test]
    fn test_empty_client_id_rejected() {
        let cfg = OAuthConfig {
            client_id: "  ".to_string(),
            ..OAuthConfig::default()
        };
        assert!(matches!(
            ImplicitGrantFlow::from_config(&cfg),
            Err(ComposerError::Config(_))
        ));
    }

    #[test]
    fn test_callback_with_token() {
        let params = CallbackParams {
            access_token: Some("ya29.token".to_string()),
            state: Some("s1".to_string()),
            expires_in: Some(3599),
            ..CallbackParams::default()
        };
        let token = interpret_callback(params, "s1").unwrap();
        assert_eq!(token.secret(), "ya29.token");
    }

    #[test]
    fn test_callback_access_denied() {
        let params = CallbackParams {
            error: Some("access_denied".to_string()),
            state: Some("s1".to_string()),
            ..CallbackParams::default()
        };
        assert!(matches!(
            interpret_callback(params, "s1"),
            Err(ComposerError::LoginDenied)
        ));
    }

    #[test]
    fn test_callback_error_without_state_is_not_a_denial() {
        let params = CallbackParams {
            error: Some("access_denied".to_string()),
            ..CallbackParams::default()
        };
        match interpret_callback(params, "s1") {
            Err(ComposerError::LoginFailed(msg)) => assert!(msg.contains("state mismatch")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_callback_state_mismatch() {
        let params = CallbackParams {
            access_token: Some("ya29.token".to_string()),
            state: Some("other".to_string()),
            ..CallbackParams::default()
        };
        assert!(matches!(
            interpret_callback(params, "s1"),
            Err(ComposerError::LoginFailed(_))
        ));
    }

    #[test]
    fn test_callback_without_token() {
        let params = CallbackParams {
            state: Some("s1".to_string()),
            ..CallbackParams::default()
        };
        assert!(interpret_callback(params, "s1").is_err());
    }

    #[tokio::test]
    async fn test_loopback_round_trip() {
        let cfg = OAuthConfig {
            redirect_port: 0,
            open_browser: false,
            login_timeout_secs: 10,
            ..OAuthConfig::default()
        };
        let (url_tx, url_rx) = std::sync::mpsc::channel::<Url>();
        let flow = ImplicitGrantFlow::from_config(&cfg)
            .unwrap()
            .with_announcer(Arc::new(move |url: &Url| {
                let _ = url_tx.send(url.clone());
            }));

        let browser = tokio::spawn(async move {
            let auth_url = tokio::task::spawn_blocking(move || url_rx.recv().unwrap())
                .await
                .unwrap();
            let pairs: std::collections::HashMap<String, String> =
                auth_url.query_pairs().into_owned().collect();
            let callback = format!(
                "{}callback?access_token=ya29.loop&token_type=Bearer&state={}",
                pairs["redirect_uri"], pairs["state"]
            );
            reqwest::get(callback).await.unwrap().text().await.unwrap()
        });

        let token = flow.obtain_token().await.unwrap();
        assert_eq!(token.secret(), "ya29.loop");
        assert!(browser.await.unwrap().contains("close this window"));
    }
}
