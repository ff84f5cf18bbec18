//! HTTP implementation of the mail gateway: a bearer-authorized multipart POST.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use url::Url;

use super::{MailGateway, SendRequest};
use crate::config::GatewayConfig;
use crate::error::{ComposerError, Result};
use crate::model::attachment::DEFAULT_CONTENT_TYPE;

/// Posts to `<base>/api/mail/send` with parts `file`, `subject`, `message`
/// and, when present, `to`.
pub struct HttpMailGateway {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpMailGateway {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Build a gateway from configuration, applying the optional timeout.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let endpoint = config.send_url()?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ComposerError::Config(format!("HTTP client: {e}")))?;
        Ok(Self::new(client, endpoint))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MailGateway for HttpMailGateway {
    async fn submit(&self, request: &SendRequest) -> Result<String> {
        tracing::info!(endpoint = %self.endpoint, "Sending message to gateway");

        let form = build_form(request)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(request.access_token.secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ComposerError::SendTransport(transport_message(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ComposerError::SendTransport(transport_message(&e)))?;

        if status.is_success() {
            tracing::info!(status = status.as_u16(), "Gateway accepted message");
            Ok(success_message(&body))
        } else {
            tracing::error!(status = status.as_u16(), body = %body, "Gateway rejected message");
            Err(ComposerError::SendServer {
                status: status.as_u16(),
                reason: error_reason(status, &body),
            })
        }
    }
}

/// Assemble the multipart body. The attachment keeps its filename and type;
/// an unparseable type is replaced with `application/octet-stream`.
pub fn build_form(request: &SendRequest) -> Result<Form> {
    let attachment = &request.attachment;
    let content_type = match attachment.content_type.parse::<mime_guess::Mime>() {
        Ok(_) => attachment.content_type.as_str(),
        Err(_) => {
            tracing::debug!(
                content_type = %attachment.content_type,
                "Unusable content type, sending as octet-stream"
            );
            DEFAULT_CONTENT_TYPE
        }
    };
    let file = Part::bytes(attachment.bytes.clone())
        .file_name(attachment.filename.clone())
        .mime_str(content_type)
        .map_err(|e| ComposerError::SendTransport(e.to_string()))?;

    let mut form = Form::new()
        .part("file", file)
        .text("subject", request.subject.clone())
        .text("message", request.message.clone());
    if let Some(to) = &request.recipient {
        form = form.text("to", to.clone());
    }
    Ok(form)
}

/// The success payload shown to the user. A JSON string literal such as
/// `"Email sent"` is unwrapped; anything else is returned as sent.
pub fn success_message(body: &str) -> String {
    let trimmed = body.trim();
    match serde_json::from_str::<String>(trimmed) {
        Ok(text) => text,
        Err(_) => trimmed.to_string(),
    }
}

/// The failure reason for a non-2xx response: the payload verbatim, or the
/// status line when the gateway sent nothing.
pub fn error_reason(status: reqwest::StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        match status.canonical_reason() {
            Some(text) => format!("HTTP {} {text}", status.as_u16()),
            None => format!("HTTP {}", status.as_u16()),
        }
    } else {
        success_message(trimmed)
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("could not connect to the mail gateway: {err}")
    } else {
        err.to_string()
    }
}
