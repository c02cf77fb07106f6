use std::io;
use std::time::Duration;

use clap::Parser;
use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod api;
mod app;
mod cli;
mod commands;
mod config;
mod editor;
mod error;
mod forms;
mod models;
mod store;
mod tui;

use api::{ContentApi, HttpApi};
use app::LiveEditorApp;
use cli::{Cli, Command};
use config::Config;
use error::Result;
use store::{Action, AppState};
use tui::{draw, handle_key_event};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let mut state = AppState::initialize(&config);
    if let Some(brand) = cli.brand {
        state.dispatch(Action::BrandSwitched(brand));
    }
    let api = HttpApi::new(&config, state.access_token().map(str::to_string))?;

    let result = match cli.command {
        Command::Live { target } => live(&target, &config, &mut state, &api).await,
        command => commands::run(command, &mut state, &api).await,
    };

    // the session is written back even when the command failed
    state.teardown()?;
    result
}

async fn live<A>(target: &str, config: &Config, state: &mut AppState, api: &A) -> Result<()>
where
    A: ContentApi + ?Sized,
{
    let form = commands::live_form(target, state, api).await?;
    let (editor, editor_init) = editor::editor_channel();
    let mut app = LiveEditorApp::new(form, editor, config.editor_ready_timeout());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    editor_init.mark_ready();

    // Run the app
    let result = run_app(&mut terminal, &mut app, state, api).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        eprintln!("Error: {}", e);
    }
    println!("{}", app.status);

    result
}

async fn run_app<B, A>(
    terminal: &mut Terminal<B>,
    app: &mut LiveEditorApp,
    state: &mut AppState,
    api: &A,
) -> Result<()>
where
    B: Backend,
    A: ContentApi + ?Sized,
{
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Poll for events with timeout so the screen keeps redrawing
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(key, app.draft_active(), app.show_help)
                    {
                        let should_quit = app.handle_action(action, state, api).await?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
