//! TUI widgets for rendering different UI panels.

pub mod compose_form;
pub mod header_bar;
pub mod help_popup;
pub mod login_view;
pub mod status_bar;

use ratatui::layout::Rect;

/// Calculate a centered rectangle with exact dimensions, clamped to `area`.
pub(crate) fn centered_rect_exact(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
