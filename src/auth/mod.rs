//! OAuth sign-in: token providers and the userinfo lookup.

pub mod implicit;
pub mod userinfo;

use async_trait::async_trait;

use crate::error::{ComposerError, Result};
use crate::model::session::AccessToken;

pub use implicit::ImplicitGrantFlow;
pub use userinfo::GoogleUserInfo;

/// Something that can hand out a bearer token for the configured scopes.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn obtain_token(&self) -> Result<AccessToken>;
}

/// Resolves the signed-in account's address from a token.
#[async_trait]
pub trait UserInfoSource: Send + Sync {
    async fn fetch_email(&self, token: &AccessToken) -> Result<String>;
}

/// Returns a token obtained elsewhere (e.g. `--token` or a previous `login`).
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn obtain_token(&self) -> Result<AccessToken> {
        if self.token.is_empty() {
            return Err(ComposerError::LoginFailed("empty access token".to_string()));
        }
        Ok(self.token.clone())
    }
}
