//! Top header bar showing the signed-in account and submission state.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::composer::AuthState;
use crate::i18n;
use crate::model::submission::SubmissionState;
use crate::tui::app::App;
use crate::tui::theme::current_theme;

/// Render the top header bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();
    let composer = &app.composer;

    let mut spans = vec![Span::styled(
        format!(" {}", i18n::app_name()),
        theme.header_bar,
    )];

    if composer.auth_state() == AuthState::SignedIn {
        // Welcome line may be blank while the userinfo lookup is pending
        spans.push(Span::styled(
            format!(
                " | {} {}",
                i18n::tui_welcome(),
                composer.session().display_email()
            ),
            theme.header_bar,
        ));
        let state = match composer.state() {
            SubmissionState::Idle => i18n::tui_state_idle().to_string(),
            SubmissionState::Sending => i18n::tui_state_sending().to_string(),
            SubmissionState::Succeeded => i18n::tui_state_sent().to_string(),
            failed => format!(
                "{} ({})",
                i18n::tui_state_failed(),
                failed.failure().unwrap_or_default()
            ),
        };
        spans.push(Span::styled(format!(" | {state}"), theme.header_bar));
    }

    // Right-aligned help hint
    let left_len: usize = spans.iter().map(|s| s.width()).sum();
    let right_text = i18n::tui_help_hint();
    let total = area.width as usize;
    if total > left_len + right_text.len() {
        let padding = total - left_len - right_text.len();
        spans.push(Span::styled(" ".repeat(padding), theme.header_bar));
        spans.push(Span::styled(right_text, theme.header_bar));
    }

    let line = Line::from(spans);
    let bar = Paragraph::new(line).style(theme.header_bar);
    frame.render_widget(bar, area);
}
