use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tasks_tracker_app::{AsyncTaskService, Route, SessionGateway, TaskStore, default_session};
use tokio::runtime::Runtime;
use tracing::subscriber::NoSubscriber;

use crate::commands::CommandContext;

mod app;
pub mod constants;
mod handlers;
mod task_visibility;
mod view;
mod widgets;
mod worker;

use self::app::App;
use self::constants::TUI_TICK_RATE_MS;
use self::view::Ui;
use self::worker::MutationWorker;

/// Launch the interactive task page, starting at `start`.
pub fn run(ctx: &CommandContext, start: &str) -> Result<()> {
    let route: Route = start.parse()?;
    let runtime = Runtime::new().context("failed to start async runtime")?;
    let service = AsyncTaskService::new(ctx.open_service()?, ctx.config().submit_timeout());
    let session = default_session(ctx.session_file().clone());
    let identity = session.current()?;
    let app = App::new(service.clone(), identity, ctx.config().debounce())
        .with_context(|| format!("failed to load tasks from {}", ctx.db_path().display()))?;
    let worker = MutationWorker::new(service, runtime.handle().clone());
    let mut ui = Ui::new(app, worker, session, route);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = tracing::subscriber::with_default(NoSubscriber::default(), || {
        run_event_loop(&mut terminal, &mut ui)
    });

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn run_event_loop<S>(terminal: &mut Terminal<CrosstermBackend<Stdout>>, ui: &mut Ui<S>) -> Result<()>
where
    S: TaskStore + Send + Sync + 'static,
{
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(TUI_TICK_RATE_MS);

    loop {
        terminal.draw(|f| ui.draw(f))?;
        if ui.should_quit {
            break;
        }

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or_default();

        if event::poll(timeout)?
            && let CrosstermEvent::Key(key) = event::read()?
            && let Err(err) = ui.handle_key(key)
        {
            ui.error(format!("{err:#}"));
        }

        if last_tick.elapsed() >= tick_rate {
            ui.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
