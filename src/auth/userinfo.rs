//! Userinfo lookup for the signed-in Google account.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::UserInfoSource;
use crate::config::{parse_url, OAuthConfig};
use crate::error::{ComposerError, Result};
use crate::model::session::AccessToken;

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    email: Option<String>,
}

/// `GET <userinfo_endpoint>` with the bearer token.
pub struct GoogleUserInfo {
    client: reqwest::Client,
    endpoint: Url,
}

impl GoogleUserInfo {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn from_config(client: reqwest::Client, config: &OAuthConfig) -> Result<Self> {
        Ok(Self::new(client, parse_url(&config.userinfo_endpoint)?))
    }
}

#[async_trait]
impl UserInfoSource for GoogleUserInfo {
    async fn fetch_email(&self, token: &AccessToken) -> Result<String> {
        tracing::debug!(endpoint = %self.endpoint, "Fetching user info");

        let response = self
            .client
            .get(self.endpoint.clone())
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| ComposerError::UserInfo(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(error = %e, "Could not read userinfo error body");
                    String::new()
                }
            };
            tracing::warn!(status = status.as_u16(), "Userinfo request rejected");
            return Err(ComposerError::UserInfo(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let info: UserInfoResponse = response
            .json()
            .await
            .map_err(|e| ComposerError::UserInfo(format!("invalid response: {e}")))?;

        info.email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ComposerError::UserInfo("response has no email field".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn source_for(server: &MockServer) -> GoogleUserInfo {
        let endpoint = Url::parse(&format!("{}/oauth2/v3/userinfo", server.uri())).unwrap();
        GoogleUserInfo::new(reqwest::Client::new(), endpoint)
    }

    #[tokio::test]
    async fn test_fetch_email_uses_get_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/userinfo"))
            .and(header("authorization", "Bearer T"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "1234",
                "email": "me@example.com",
                "email_verified": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let email = source_for(&server)
            .fetch_email(&AccessToken::new("T"))
            .await
            .unwrap();
        assert_eq!(email, "me@example.com");
    }

    #[tokio::test]
    async fn test_unauthorized_is_user_info_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_token"))
            .mount(&server)
            .await;

        let err = source_for(&server)
            .fetch_email(&AccessToken::new("bad"))
            .await
            .unwrap_err();
        match err {
            ComposerError::UserInfo(msg) => assert!(msg.contains("401")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejection_with_empty_body_still_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = source_for(&server)
            .fetch_email(&AccessToken::new("T"))
            .await
            .unwrap_err();
        match err {
            ComposerError::UserInfo(msg) => assert!(msg.starts_with("HTTP 403")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_email_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"sub": "1"})))
            .mount(&server)
            .await;

        let err = source_for(&server)
            .fetch_email(&AccessToken::new("T"))
            .await
            .unwrap_err();
        assert!(matches!(err, ComposerError::UserInfo(_)));
    }
}
