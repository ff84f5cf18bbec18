//! Bottom status bar showing the current notice or keyboard hints.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::composer::AuthState;
use crate::i18n;
use crate::tui::app::{App, Field};
use crate::tui::theme::current_theme;

/// Version string shown at the right edge of the status bar.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render the status bar: toast if one is showing, hints otherwise.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();

    let version_text = format!("v{VERSION} ");
    let version_width = version_text.len() as u16;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(version_width)])
        .split(area);

    let content = if let Some((notice, _)) = &app.toast {
        Line::from(Span::styled(
            format!(" {}", notice.text),
            theme.notice(notice.level),
        ))
    } else {
        let mut spans = Vec::new();
        for (i, (key, desc)) in build_hints(app).iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", theme.status_bar));
            }
            spans.push(Span::styled(format!(" {key}"), theme.key_hint));
            spans.push(Span::styled(format!(":{desc}"), theme.status_bar));
        }
        Line::from(spans)
    };

    let bar = Paragraph::new(content).style(theme.status_bar);
    frame.render_widget(bar, chunks[0]);

    let version = Paragraph::new(Line::from(Span::styled(version_text, theme.help_dim)))
        .alignment(Alignment::Right)
        .style(theme.status_bar);
    frame.render_widget(version, chunks[1]);
}

/// Hint pairs (key, description) for the current screen and focus.
fn build_hints(app: &App) -> Vec<(&'static str, &'static str)> {
    let mut hints = Vec::new();

    if app.show_help {
        hints.push(("Esc", i18n::tui_hint_close()));
        return hints;
    }

    if app.composer.auth_state() != AuthState::SignedIn {
        hints.push(("Enter", i18n::tui_hint_sign_in()));
        hints.push(("?", i18n::tui_hint_help()));
        hints.push(("q", i18n::tui_hint_quit()));
        return hints;
    }

    hints.push(("Tab", i18n::tui_hint_field()));
    if app.focus == Field::Attachment {
        hints.push(("Enter", i18n::tui_hint_attach()));
    }
    hints.push(("Ctrl-S", i18n::tui_hint_send()));
    hints.push(("F1", i18n::tui_hint_help()));
    hints.push(("Ctrl-Q", i18n::tui_hint_quit()));
    hints
}
