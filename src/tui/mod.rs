pub mod app;
pub mod ui;

use std::{error::Error, io, time::{Duration, Instant}};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use crate::repository::TaskRepository;
use app::{App, InputMode, InputField, ViewMode};
use ui::ui;

/// Longest wait for input while the pomodoro timer is idle.
const IDLE_POLL: Duration = Duration::from_millis(250);

pub fn run_tui(repo: TaskRepository) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(repo);
    tracing::info!("tui started");

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    tracing::info!("tui stopped");

    res.map_err(Into::into)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = app
            .ticks
            .until_next(Instant::now())
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key.code) {
                    return Ok(());
                }
            }
        }

        app.on_tick(Instant::now());
    }
}

/// Returns true when the user asked to quit.
fn handle_key(app: &mut App, code: KeyCode) -> bool {
    match app.input_mode {
        InputMode::Normal => {
            match code {
                KeyCode::Char('q') => return true,
                KeyCode::Tab => app.next_view(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                _ => match app.view_mode {
                    ViewMode::Tasks => handle_tasks_key(app, code),
                    ViewMode::Pomodoro => match code {
                        KeyCode::Char(' ') => app.toggle_timer(Instant::now()),
                        KeyCode::Char('r') => app.reset_timer(),
                        KeyCode::Char('n') => app.skip_timer(),
                        _ => {}
                    },
                    ViewMode::Settings => {
                        if matches!(code, KeyCode::Char(' ') | KeyCode::Enter) {
                            app.toggle_setting();
                        }
                    }
                    ViewMode::Stats => {}
                },
            }
            false
        }
        InputMode::Editing | InputMode::Adding => {
            match code {
                KeyCode::Enter => app.handle_input(),
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Char(c) => app.input_buffer.push(c),
                KeyCode::Backspace => {
                    app.input_buffer.pop();
                }
                _ => {}
            }
            false
        }
    }
}

fn handle_tasks_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Char('a') => app.start_add(),
        KeyCode::Char('e') => app.start_edit(InputField::Title),
        KeyCode::Char('D') => app.start_edit(InputField::Description),
        KeyCode::Char('p') => app.cycle_priority(),
        KeyCode::Char('s') => app.cycle_time_slot(),
        KeyCode::Char('g') => app.cycle_category(),
        KeyCode::Char('f') => app.cycle_filter(),
        KeyCode::Char('T') => app.complete_today(),
        KeyCode::Char('C') => app.clear_completed(),
        _ => {}
    }
}
