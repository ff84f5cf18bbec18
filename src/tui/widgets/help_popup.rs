//! Help popup listing keyboard shortcuts in columns.

use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect_exact;
use crate::i18n;
use crate::tui::app::App;
use crate::tui::theme::{current_theme, Theme};

const VERSION: &str = env!("CARGO_PKG_VERSION");

struct Shortcut {
    key: &'static str,
    desc: &'static str,
}

/// Render the help popup centered on screen.
pub fn render(frame: &mut Frame, _app: &App) {
    let theme = current_theme();
    let screen = frame.area();

    let popup_width = (screen.width * 70 / 100).min(screen.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(2) as usize;

    let cols = if inner_width >= 60 { 2 } else { 1 };
    let col_width = inner_width / cols;
    let sep_width = inner_width.saturating_sub(2);

    let lines = build_lines(cols, col_width, sep_width, &theme);

    let content_height = lines.len() as u16 + 1;
    let popup_height = (content_height + 2).min(screen.height.saturating_sub(2));
    let area = centered_rect_exact(popup_width, popup_height, screen);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.popup_title)
        .title(i18n::tui_help_title())
        .style(theme.popup);

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn build_lines(cols: usize, col_width: usize, sep_width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(format!("  {}", i18n::app_name()), theme.popup_title),
        Span::styled(format!("  v{VERSION}"), theme.help_dim),
    ]));
    lines.push(Line::from(Span::styled(
        format!("  {}", i18n::tui_help_description()),
        theme.help_dim,
    )));
    lines.push(Line::from(""));

    add_section_header(&mut lines, i18n::tui_help_editing(), theme, sep_width);
    add_shortcuts_columns(
        &mut lines,
        &[
            Shortcut {
                key: "Tab",
                desc: i18n::tui_help_next_field(),
            },
            Shortcut {
                key: "S-Tab",
                desc: i18n::tui_help_prev_field(),
            },
            Shortcut {
                key: "Enter",
                desc: i18n::tui_help_newline(),
            },
            Shortcut {
                key: "Enter",
                desc: i18n::tui_help_load_file(),
            },
            Shortcut {
                key: "Del",
                desc: i18n::tui_help_detach(),
            },
            Shortcut {
                key: "Ctrl-S",
                desc: i18n::tui_help_send(),
            },
        ],
        cols,
        col_width,
        theme,
    );
    lines.push(Line::from(""));

    add_section_header(&mut lines, i18n::tui_help_general(), theme, sep_width);
    add_shortcuts_columns(
        &mut lines,
        &[
            Shortcut {
                key: "Enter",
                desc: i18n::tui_help_sign_in(),
            },
            Shortcut {
                key: "F1",
                desc: i18n::tui_help_this_help(),
            },
            Shortcut {
                key: "Ctrl-Q",
                desc: i18n::tui_help_quit(),
            },
        ],
        cols,
        col_width,
        theme,
    );

    lines
}

fn add_section_header(lines: &mut Vec<Line<'static>>, title: &str, theme: &Theme, width: usize) {
    let remaining = width.saturating_sub(title.chars().count() + 4);
    lines.push(Line::from(vec![
        Span::styled(format!("  {title} "), theme.help_section),
        Span::styled("\u{2500}".repeat(remaining), theme.help_dim),
    ]));
}

/// Lay out shortcuts in `cols` columns per row.
fn add_shortcuts_columns(
    lines: &mut Vec<Line<'static>>,
    shortcuts: &[Shortcut],
    cols: usize,
    col_width: usize,
    theme: &Theme,
) {
    let key_w: usize = 8;

    for row in shortcuts.chunks(cols) {
        let mut spans: Vec<Span<'static>> = vec![Span::raw("  ")];
        for s in row {
            let desc_avail = col_width.saturating_sub(key_w + 3);
            let desc: String = s.desc.chars().take(desc_avail).collect();
            let padding = col_width
                .saturating_sub(key_w + 1 + desc.chars().count())
                .max(1);

            spans.push(Span::styled(format!("{:>key_w$}", s.key), theme.key_hint));
            spans.push(Span::styled(format!(" {desc}"), theme.popup));
            spans.push(Span::raw(" ".repeat(padding)));
        }
        lines.push(Line::from(spans));
    }
}
