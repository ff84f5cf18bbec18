//! Color theme definitions for the TUI.

use ratatui::style::{Color, Modifier, Style};

use crate::model::notice::NoticeLevel;

/// A complete color theme for the TUI.
pub struct Theme {
    pub header_bar: Style,
    pub status_bar: Style,
    pub field_border: Style,
    pub field_focused: Style,
    pub field_text: Style,
    pub placeholder: Style,
    pub attachment: Style,
    pub button: Style,
    pub button_focused: Style,
    pub button_busy: Style,
    pub notice_info: Style,
    pub notice_success: Style,
    pub notice_warning: Style,
    pub notice_error: Style,
    pub popup: Style,
    pub popup_title: Style,
    pub help_dim: Style,
    pub help_section: Style,
    pub key_hint: Style,
}

impl Theme {
    /// Dark theme (default).
    pub fn dark() -> Self {
        Self {
            header_bar: Style::default()
                .fg(Color::Rgb(200, 200, 220))
                .bg(Color::Rgb(30, 30, 46)),
            status_bar: Style::default()
                .fg(Color::Rgb(150, 150, 170))
                .bg(Color::Rgb(30, 30, 46)),
            field_border: Style::default().fg(Color::Rgb(80, 80, 100)),
            field_focused: Style::default()
                .fg(Color::Rgb(130, 170, 255))
                .add_modifier(Modifier::BOLD),
            field_text: Style::default().fg(Color::Rgb(220, 220, 230)),
            placeholder: Style::default()
                .fg(Color::Rgb(110, 110, 130))
                .add_modifier(Modifier::ITALIC),
            attachment: Style::default().fg(Color::Green),
            button: Style::default()
                .fg(Color::Rgb(200, 200, 220))
                .bg(Color::Rgb(40, 40, 60)),
            button_focused: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(60, 60, 100))
                .add_modifier(Modifier::BOLD),
            button_busy: Style::default()
                .fg(Color::Rgb(150, 150, 170))
                .bg(Color::Rgb(40, 40, 60))
                .add_modifier(Modifier::DIM),
            notice_info: Style::default()
                .fg(Color::Cyan)
                .bg(Color::Rgb(30, 30, 46)),
            notice_success: Style::default()
                .fg(Color::Green)
                .bg(Color::Rgb(30, 30, 46))
                .add_modifier(Modifier::BOLD),
            notice_warning: Style::default()
                .fg(Color::Yellow)
                .bg(Color::Rgb(30, 30, 46))
                .add_modifier(Modifier::BOLD),
            notice_error: Style::default()
                .fg(Color::Rgb(255, 110, 110))
                .bg(Color::Rgb(30, 30, 46))
                .add_modifier(Modifier::BOLD),
            popup: Style::default()
                .fg(Color::Rgb(220, 220, 230))
                .bg(Color::Rgb(20, 20, 35)),
            popup_title: Style::default()
                .fg(Color::Rgb(130, 170, 255))
                .add_modifier(Modifier::BOLD),
            help_dim: Style::default().fg(Color::Rgb(110, 110, 130)),
            help_section: Style::default()
                .fg(Color::Rgb(180, 180, 200))
                .add_modifier(Modifier::BOLD),
            key_hint: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Style for a toast of the given severity.
    pub fn notice(&self, level: NoticeLevel) -> Style {
        match level {
            NoticeLevel::Info => self.notice_info,
            NoticeLevel::Success => self.notice_success,
            NoticeLevel::Warning => self.notice_warning,
            NoticeLevel::Error => self.notice_error,
        }
    }
}

/// Return the active theme.
pub fn current_theme() -> Theme {
    Theme::dark()
}
