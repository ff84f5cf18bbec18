//! `sendShell`: compose one email with one attachment in the terminal and
//! hand it to a mail gateway, signed in with a Google access token.
//!
//! The library holds the composer state machine, the OAuth and gateway
//! clients, configuration and the TUI; `main.rs` is a thin CLI on top.

pub mod auth;
pub mod composer;
pub mod config;
pub mod error;
pub mod gateway;
pub mod i18n;
pub mod model;
pub mod tui;
