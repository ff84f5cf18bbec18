//! Centralized error types for sendShell.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A required draft field (or the session token) that was empty at send time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    AccessToken,
    Recipient,
    Subject,
    Body,
    Attachment,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AccessToken => "sign-in",
            Self::Recipient => "to",
            Self::Subject => "subject",
            Self::Body => "message",
            Self::Attachment => "file",
        };
        f.write_str(name)
    }
}

/// All errors produced by the sendShell library.
#[derive(Error, Debug)]
pub enum ComposerError {
    /// The user refused consent at the OAuth provider.
    #[error("Login denied by the provider")]
    LoginDenied,

    /// The implicit-grant flow did not produce a token.
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// The token was granted but the userinfo lookup failed.
    #[error("Failed to fetch user info: {0}")]
    UserInfo(String),

    /// One or more required fields are empty. No request was made.
    #[error("All fields are required (missing: {})", join_fields(missing))]
    Validation { missing: Vec<MissingField> },

    /// A send is already in flight for this composer.
    #[error("A message is already being sent")]
    SendInProgress,

    /// The gateway could not be reached or the connection broke.
    #[error("Failed to send email: {0}")]
    SendTransport(String),

    /// The gateway answered with a non-2xx status.
    #[error("Failed to send email: {reason}")]
    SendServer { status: u16, reason: String },

    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The attachment exceeds the configured size limit.
    #[error("Attachment '{path}' is {size} bytes, limit is {limit}")]
    AttachmentTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// The attachment file has no content.
    #[error("Attachment '{0}' is empty")]
    EmptyAttachment(PathBuf),

    /// A configured endpoint is not a valid URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Configuration could not be used as given.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias for `Result<T, ComposerError>`.
pub type Result<T> = std::result::Result<T, ComposerError>;

impl ComposerError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The text recorded in a failed submission: the server payload when the
    /// gateway supplied one, otherwise the error message itself.
    pub fn reason(&self) -> String {
        match self {
            Self::SendServer { reason, .. } => reason.clone(),
            Self::SendTransport(msg) | Self::LoginFailed(msg) | Self::UserInfo(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

fn join_fields(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = ComposerError::Validation {
            missing: vec![MissingField::Subject, MissingField::Attachment],
        };
        assert_eq!(
            err.to_string(),
            "All fields are required (missing: subject, file)"
        );
    }

    #[test]
    fn test_reason_prefers_server_payload() {
        let err = ComposerError::SendServer {
            status: 500,
            reason: "SMTP error".to_string(),
        };
        assert_eq!(err.reason(), "SMTP error");
        assert_eq!(err.to_string(), "Failed to send email: SMTP error");
    }

    #[test]
    fn test_reason_for_transport_error_is_bare_message() {
        let err = ComposerError::SendTransport("connection refused".to_string());
        assert_eq!(err.reason(), "connection refused");
    }
}
