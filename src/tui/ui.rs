//! Main render function that dispatches to widgets.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use super::app::App;
use super::widgets;
use crate::composer::AuthState;

/// Render the entire TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.area();

    // Vertical layout: header (1) + content (flex) + status (1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header bar
            Constraint::Min(5),    // content
            Constraint::Length(1), // status bar
        ])
        .split(size);

    widgets::header_bar::render(frame, app, vertical[0]);

    // Compose view once a token exists, even if the email is still unknown
    if app.composer.auth_state() == AuthState::SignedIn {
        widgets::compose_form::render(frame, app, vertical[1]);
    } else {
        widgets::login_view::render(frame, app, vertical[1]);
    }

    widgets::status_bar::render(frame, app, vertical[2]);

    // Popups (rendered on top of everything)
    if app.show_help {
        widgets::help_popup::render(frame, app);
    }
}
