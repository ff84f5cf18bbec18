//! Core data model types: session, draft, attachment, submission state and notices.

pub mod attachment;
pub mod draft;
pub mod notice;
pub mod session;
pub mod submission;
