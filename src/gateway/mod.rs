//! Mail gateway: the remote endpoint that actually sends the message.

pub mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::attachment::Attachment;
use crate::model::session::AccessToken;

pub use http::HttpMailGateway;

/// Everything one submission needs, captured when the send is dispatched so
/// later edits to the draft cannot leak into an in-flight request.
#[derive(Debug, Clone)]
pub struct SendRequest {
    pub access_token: AccessToken,
    /// `None` when recipient support is disabled; the `to` part is omitted.
    pub recipient: Option<String>,
    pub subject: String,
    pub message: String,
    pub attachment: Attachment,
}

/// Accepts a composed message on behalf of the signed-in user.
///
/// `Ok` carries the gateway's success payload; errors are
/// [`SendTransport`](crate::error::ComposerError::SendTransport) or
/// [`SendServer`](crate::error::ComposerError::SendServer).
#[async_trait]
pub trait MailGateway: Send + Sync {
    async fn submit(&self, request: &SendRequest) -> Result<String>;
}
