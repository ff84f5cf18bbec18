//! Terminal UI: entry point and event loop.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{poll as ct_poll, read as ct_read, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Handle;
use url::Url;

use self::app::{App, AppEvent};
use crate::auth::implicit::UrlAnnouncer;
use crate::composer::{Composer, Services};
use crate::config::Config;

/// Run the TUI application. Blocks until the user quits.
///
/// `runtime` executes the sign-in and send tasks; the event loop itself
/// stays on the calling thread.
pub fn run_tui(config: &Config, runtime: Handle) -> anyhow::Result<()> {
    let (events_tx, events_rx) = App::channel();

    let url_tx = events_tx.clone();
    let announcer: UrlAnnouncer = Arc::new(move |url: &Url| {
        let _ = url_tx.send(AppEvent::LoginUrl(url.to_string()));
    });
    let services = Services::from_config(config, Some(announcer))?;
    let composer = Composer::new(services, config.compose.clone());
    let app = App::new(composer, runtime, (events_tx, events_rx));

    // Setup terminal (alternate screen)
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the event loop
    let result = run_event_loop(&mut terminal, app);

    // Restore terminal (always, even on error)
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main event loop: render → poll → handle → repeat.
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> anyhow::Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        // Render
        terminal.draw(|frame| {
            ui::render(frame, &app);
        })?;

        // Poll for events
        if ct_poll(tick_rate)? {
            if let Event::Key(key) = ct_read()? {
                event::handle_key_event(&mut app, key)?;
            }
        }

        // Background completions and toast rotation
        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
