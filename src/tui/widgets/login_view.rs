//! Sign-in screen shown until a token is available.

use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::centered_rect_exact;
use crate::composer::AuthState;
use crate::i18n;
use crate::tui::app::App;
use crate::tui::theme::current_theme;

/// Render the centered sign-in box.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();
    let pending = app.composer.auth_state() == AuthState::Pending;

    let box_area = centered_rect_exact(48, 7, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.popup_title)
        .title(i18n::tui_login_title())
        .style(theme.popup);

    let button_style = if pending {
        theme.button_busy
    } else {
        theme.button_focused
    };
    let hint = if pending {
        i18n::tui_login_pending()
    } else {
        i18n::tui_login_hint()
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(i18n::tui_login_button(), button_style)),
        Line::from(""),
        Line::from(Span::styled(hint, theme.help_dim)),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, box_area);
}
