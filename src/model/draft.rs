//! The message being composed.

use super::attachment::Attachment;
use super::session::Session;
use crate::error::MissingField;

/// Form fields edited by the user. Survives failed sends; cleared on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftMessage {
    /// Destination address (`to` part). Ignored when recipients are disabled.
    pub recipient: String,
    pub subject: String,
    /// Message text (`message` part).
    pub body: String,
    pub attachment: Option<Attachment>,
}

impl DraftMessage {
    /// List every required field that is empty, checking the session token
    /// first. An empty result means the draft may be dispatched.
    ///
    /// Emptiness is literal: a subject of `" "` counts as filled in.
    pub fn missing_fields(&self, session: &Session, require_recipient: bool) -> Vec<MissingField> {
        let mut missing = Vec::new();
        if !session.is_authenticated() {
            missing.push(MissingField::AccessToken);
        }
        if require_recipient && self.recipient.is_empty() {
            missing.push(MissingField::Recipient);
        }
        if self.subject.is_empty() {
            missing.push(MissingField::Subject);
        }
        if self.body.is_empty() {
            missing.push(MissingField::Body);
        }
        if self.attachment.as_ref().is_none_or(Attachment::is_empty) {
            missing.push(MissingField::Attachment);
        }
        missing
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}
