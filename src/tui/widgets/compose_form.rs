//! Compose form: recipient, subject, message, attachment and send button.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::i18n;
use crate::model::submission::SubmissionState;
use crate::tui::app::{App, Field};
use crate::tui::theme::{current_theme, Theme};

/// Render the form into the content area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();
    let fields = app.fields();

    let frame_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.field_border)
        .title(i18n::tui_compose_title());
    let area = {
        let inner = frame_block.inner(area);
        frame.render_widget(frame_block, area);
        inner
    };

    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|field| match field {
            Field::Message => Constraint::Min(4),
            Field::Send => Constraint::Length(1),
            _ => Constraint::Length(3),
        })
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (field, row) in fields.iter().zip(rows.iter()) {
        let focused = app.focus == *field;
        match field {
            Field::To => {
                let text = &app.composer.draft().recipient;
                render_line_field(frame, &theme, *row, i18n::tui_field_to(), text, focused);
            }
            Field::Subject => {
                let text = &app.composer.draft().subject;
                render_line_field(frame, &theme, *row, i18n::tui_field_subject(), text, focused);
            }
            Field::Message => render_message(frame, app, &theme, *row, focused),
            Field::Attachment => render_attachment(frame, app, &theme, *row, focused),
            Field::Send => render_send_button(frame, app, &theme, *row, focused),
        }
    }
}

fn field_block<'a>(theme: &Theme, title: &'a str, focused: bool) -> Block<'a> {
    let border = if focused {
        theme.field_focused
    } else {
        theme.field_border
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {title} "))
}

/// Single-line input. Long values scroll so the end stays visible.
fn render_line_field(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    title: &str,
    text: &str,
    focused: bool,
) {
    let block = field_block(theme, title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (visible, width) = tail_fitting(text, inner.width.saturating_sub(1) as usize);
    frame.render_widget(
        Paragraph::new(Span::styled(visible, theme.field_text)),
        inner,
    );
    if focused {
        place_cursor(frame, inner, width, 0);
    }
}

/// Multi-line message body, scrolled to keep the last line in view.
fn render_message(frame: &mut Frame, app: &App, theme: &Theme, area: Rect, focused: bool) {
    let block = field_block(theme, i18n::tui_field_message(), focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let body = &app.composer.draft().body;
    let lines: Vec<&str> = body.split('\n').collect();
    let height = inner.height as usize;
    let skip = lines.len().saturating_sub(height);

    let rendered: Vec<Line> = lines[skip..]
        .iter()
        .map(|l| Line::from(Span::styled(l.to_string(), theme.field_text)))
        .collect();
    frame.render_widget(Paragraph::new(rendered), inner);

    if focused {
        let last = lines.last().copied().unwrap_or("");
        let row = (lines.len() - skip).saturating_sub(1) as u16;
        place_cursor(frame, inner, last.width(), row);
    }
}

/// The loaded file, or the path being typed, or a placeholder.
fn render_attachment(frame: &mut Frame, app: &App, theme: &Theme, area: Rect, focused: bool) {
    let block = field_block(theme, i18n::tui_field_attachment(), focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let input = app.attachment_input.as_str();
    let line = if !input.is_empty() {
        let (visible, width) = tail_fitting(input, inner.width.saturating_sub(1) as usize);
        if focused {
            place_cursor(frame, inner, width, 0);
        }
        Line::from(Span::styled(visible, theme.field_text))
    } else if let Some(attachment) = &app.composer.draft().attachment {
        let size = humansize::format_size(attachment.size(), humansize::BINARY);
        Line::from(vec![
            Span::styled(attachment.filename.clone(), theme.attachment),
            Span::styled(
                format!("  ({size}, {})", attachment.content_type),
                theme.placeholder,
            ),
        ])
    } else {
        if focused {
            place_cursor(frame, inner, 0, 0);
        }
        Line::from(Span::styled(
            i18n::tui_attachment_placeholder(),
            theme.placeholder,
        ))
    };
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_send_button(frame: &mut Frame, app: &App, theme: &Theme, area: Rect, focused: bool) {
    let sending = matches!(app.composer.state(), SubmissionState::Sending);
    let (label, style): (&str, Style) = if sending {
        (i18n::tui_sending_button(), theme.button_busy)
    } else if focused {
        (i18n::tui_send_button(), theme.button_focused)
    } else {
        (i18n::tui_send_button(), theme.button)
    };
    let button = Paragraph::new(Line::from(Span::styled(label, style))).alignment(Alignment::Center);
    frame.render_widget(button, area);
}

/// Longest suffix of `text` that fits in `max_width` columns, with its width.
fn tail_fitting(text: &str, max_width: usize) -> (String, usize) {
    let total = text.width();
    if total <= max_width {
        return (text.to_string(), total);
    }
    let mut width = 0;
    let mut start = text.len();
    for (idx, ch) in text.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        start = idx;
    }
    (text[start..].to_string(), width)
}

fn place_cursor(frame: &mut Frame, inner: Rect, col: usize, row: u16) {
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let x = inner.x + (col as u16).min(inner.width - 1);
    let y = inner.y + row.min(inner.height - 1);
    frame.set_cursor_position(Position::new(x, y));
}
