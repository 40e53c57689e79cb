use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use nn_dashboard::{prefs::JsonFileStore, DashboardConfig, IntervalScheduler};

use crate::{
    state::dashboard::{Action, Dashboard},
    ui::{draw, layout},
};

/// File the preferences are kept in, relative to the working directory.
const PREFS_FILE: &str = "nn-dashboard-prefs.json";
const FRAME_PERIOD: Duration = Duration::from_millis(120);

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Runs the TUI application.
///
/// # Errors
/// Returns an error if the configuration is invalid or terminal setup or rendering fails.
pub fn run(config: DashboardConfig) -> Result<()> {
    let store = JsonFileStore::open(PREFS_FILE);
    let mut dash = Dashboard::new(&config, IntervalScheduler::new(), Box::new(store))?;

    let _guard = TerminalGuard::enter()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    dash.resize(layout::chart_width(terminal.size()?));

    loop {
        let now = Instant::now();
        dash.update(now);
        terminal.draw(|f| draw::draw(f, &dash, now))?;

        if event::poll(FRAME_PERIOD)? {
            match event::read()? {
                Event::Key(k) if k.kind == KeyEventKind::Press => {
                    match dash.handle_key(k.code, Instant::now()) {
                        Action::Quit => break,
                        Action::None => {}
                    }
                }
                Event::Resize(cols, rows) => {
                    dash.resize(layout::chart_width(Rect::new(0, 0, cols, rows)));
                }
                _ => {}
            }
        }
    }

    info!("leaving dashboard");
    terminal.show_cursor()?;
    Ok(())
}
