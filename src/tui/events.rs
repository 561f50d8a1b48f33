use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;

use crate::tui::app::{Action, Mode};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::App;

/// Restores the terminal when dropped, including on panic
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut guard = Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: false,
        };
        execute!(io::stdout(), EnterAlternateScreen)?;
        guard.alternate_screen_enabled = true;
        Ok(guard)
    }

    /// Restore explicitly on normal exit; dropping afterwards is a no-op
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check the size before entering the alternate screen so the error is readable
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::TerminalTooSmall {
            width,
            height,
            min_width,
            min_height,
        });
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    tracing::info!(week = %app.week.key(), "tui started");

    loop {
        app.check_status_message_timeout();

        let size = terminal.size()?;
        let rect = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key_event) = event::read()? {
                // Only Press events, so Windows does not see every key twice
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event) {
                    break;
                }
            }
        }
    }

    guard.restore()?;
    tracing::info!("tui stopped");
    Ok(())
}

/// Route a key to the active mode; returns true when the app should quit
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> bool {
    match app.ui.mode {
        Mode::ConfirmReset { reset_selected } => {
            handle_confirm_reset(app, key_event, reset_selected);
            false
        }
        Mode::Help => {
            if key_event.code == KeyCode::Esc || app.action_for(&key_event) == Some(Action::Help) {
                app.ui.mode = Mode::View;
            }
            false
        }
        Mode::View => {
            let action = app.action_for(&key_event).or(match key_event.code {
                KeyCode::Up => Some(Action::ListUp),
                KeyCode::Down => Some(Action::ListDown),
                _ => None,
            });
            match action {
                Some(action) => app.apply(action),
                None => false,
            }
        }
    }
}

fn handle_confirm_reset(app: &mut App, key_event: KeyEvent, reset_selected: bool) {
    match key_event.code {
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
            app.ui.mode = Mode::ConfirmReset { reset_selected: !reset_selected };
        }
        KeyCode::Enter if reset_selected => app.confirm_reset(),
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_reset(),
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => app.cancel_modal(),
        _ => {}
    }
}
