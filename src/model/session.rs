//! Signed-in session held for the lifetime of the process.

use std::fmt;

/// An opaque OAuth bearer token.
///
/// `Debug` is redacted so the token never reaches logs through `{:?}`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Authentication state. There is no logout, so once set the token stays.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Bearer token from the implicit grant.
    pub access_token: Option<AccessToken>,
    /// Address reported by the userinfo endpoint. May lag behind the token.
    pub user_email: Option<String>,
}

impl Session {
    /// `true` once a usable token is present. The compose view is gated on
    /// this alone, not on the email being known.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Display name for the welcome line (empty while userinfo is pending).
    pub fn display_email(&self) -> &str {
        self.user_email.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::new("ya29.secret");
        assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
        assert_eq!(token.secret(), "ya29.secret");
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let session = Session {
            access_token: Some(AccessToken::new("")),
            user_email: None,
        };
        assert!(!session.is_authenticated());
        assert!(!Session::default().is_authenticated());
    }

    #[test]
    fn test_authenticated_without_email() {
        let session = Session {
            access_token: Some(AccessToken::new("T")),
            user_email: None,
        };
        assert!(session.is_authenticated());
        assert_eq!(session.display_email(), "");
    }
}
