use waterfall::app::{AppState, InputMode};
use waterfall::cli::{self, Cli};
use waterfall::events::{AppEvent, EventHandler};
use waterfall::input::{self, Action, InputContext};
use waterfall::parser;
use waterfall::source::{FilePageSource, PageSource};
use waterfall::store::FileStore;
use waterfall::tui;
use waterfall::view_state::ViewState;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;

fn setup_verbose_logging() -> Result<()> {
    let state_dir = dirs_next_or_fallback();
    std::fs::create_dir_all(&state_dir)
        .map_err(|e| eyre!("Failed to create log directory {state_dir:?}: {e}"))?;
    let log_path = state_dir.join("debug.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| eyre!("Failed to open log file {log_path:?}: {e}"))?;
    tracing_subscriber::fmt()
        .with_writer(file)
        .with_ansi(false)
        .init();
    tracing::info!("wfw v{} starting with verbose logging", cli::VERSION);
    Ok(())
}

fn dirs_next_or_fallback() -> std::path::PathBuf {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME") {
        std::path::PathBuf::from(state).join("wfw")
    } else if let Some(home) = std::env::var_os("HOME") {
        std::path::PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("wfw")
    } else {
        std::path::PathBuf::from("/tmp/wfw")
    }
}

fn spawn_monitored(
    tx: UnboundedSender<AppEvent>,
    label: &'static str,
    fut: impl Future<Output = ()> + Send + 'static,
) {
    tokio::spawn(async move {
        let handle = tokio::spawn(fut);
        if let Err(join_err) = handle.await {
            let msg = if join_err.is_panic() {
                match join_err.into_panic().downcast::<String>() {
                    Ok(s) => *s,
                    Err(payload) => match payload.downcast::<&str>() {
                        Ok(s) => s.to_string(),
                        Err(_) => "unknown panic".to_string(),
                    },
                }
            } else {
                "task cancelled".to_string()
            };
            tracing::error!("{label} panicked: {msg}");
            if tx
                .send(AppEvent::Error(format!("{label} crashed: {msg}")))
                .is_err()
            {
                tracing::warn!("{label}: channel closed while reporting panic");
            }
        }
    });
}

/// Fetches and parses the page at `skip` off the UI task.
fn spawn_load(source: &Arc<dyn PageSource>, skip: u64, tx: &UnboundedSender<AppEvent>) {
    let source = Arc::clone(source);
    let result_tx = tx.clone();
    spawn_monitored(tx.clone(), "page loader", async move {
        let event = match source.fetch_page(skip).await {
            Ok(json) => match parser::parse_page(&json) {
                Ok(page) => AppEvent::PageLoaded {
                    skip,
                    page: Box::new(page),
                },
                Err(e) => AppEvent::Error(format!("{e:#}")),
            },
            Err(e) => AppEvent::Error(format!("{e}")),
        };
        if result_tx.send(event).is_err() {
            tracing::warn!("page loader: channel closed before page skip={skip} arrived");
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    if args.verbose {
        setup_verbose_logging()?;
    }

    let state_path = args
        .state_file
        .clone()
        .unwrap_or_else(|| dirs_next_or_fallback().join("state.json"));
    let store = FileStore::open(state_path)?;
    tracing::debug!("view state stored in {}", store.path().display());
    let view = ViewState::new(Box::new(store));

    let mut state = AppState::new(args.project.clone(), args.tz.clone(), view);
    let source: Arc<dyn PageSource> = Arc::new(FilePageSource::new(args.data.clone()));

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Failed to disable raw mode during panic: {e}");
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, SetTitle("")) {
            eprintln!("Failed to leave alternate screen during panic: {e}");
        }
        original_hook(panic_info);
    }));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        SetTitle(format!("waterfall {}", args.project))
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let events = EventHandler::new(Duration::from_millis(100));
    let tx = events.sender();

    state.begin_load(args.skip);
    spawn_load(&source, args.skip, &tx);

    let result = run_app(&mut terminal, &mut state, events, &tx, &source).await;

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, SetTitle(""))?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    mut events: EventHandler,
    tx: &UnboundedSender<AppEvent>,
    source: &Arc<dyn PageSource>,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| tui::render::render(f, state))?;
        state.prune_error();

        let Some(event) = events.next().await else {
            return Ok(());
        };

        match event {
            AppEvent::Key(key) => {
                let ctx = InputContext {
                    has_error: state.error.is_some(),
                    is_loading: state.is_loading,
                    has_overlay: state.has_overlay(),
                    input_mode: state.input_mode,
                };
                match input::map_key(key, &ctx) {
                    Action::Quit => state.should_quit = true,
                    Action::DismissError => state.clear_error(),
                    Action::MoveUp => state.move_cursor_up(),
                    Action::MoveDown => state.move_cursor_down(),
                    Action::MoveLeft => state.move_column_left(),
                    Action::MoveRight => state.move_column_right(),
                    Action::ToggleCollapsed => state.toggle_collapsed(),
                    Action::ToggleCommitMessage => state.toggle_commit_message(),
                    Action::EditVariantFilter => state.begin_filter_edit(InputMode::VariantFilter),
                    Action::EditTaskFilter => state.begin_filter_edit(InputMode::TaskFilter),
                    Action::FilterInput(c) => state.push_filter_char(c),
                    Action::FilterBackspace => state.pop_filter_char(),
                    Action::FinishFilter => state.finish_filter_edit(),
                    Action::NextPage => {
                        if let Some(skip) = state.next_page_skip() {
                            state.begin_load(skip);
                            spawn_load(source, skip, tx);
                        }
                    }
                    Action::PrevPage => {
                        if let Some(skip) = state.prev_page_skip() {
                            state.begin_load(skip);
                            spawn_load(source, skip, tx);
                        }
                    }
                    Action::Reload => {
                        let skip = state
                            .page
                            .as_ref()
                            .map_or(state.requested_skip, |p| p.current_skip);
                        state.begin_load(skip);
                        spawn_load(source, skip, tx);
                    }
                    Action::ShowDetails => state.open_column_details(),
                    Action::ShowCellDetails => state.open_cell_details(),
                    Action::CloseOverlay => state.close_overlay(),
                    Action::None => {}
                }
            }
            AppEvent::Tick => {
                if last_tick.elapsed() >= Duration::from_millis(100) {
                    state.advance_spinner();
                    last_tick = Instant::now();
                }
            }
            AppEvent::PageLoaded { skip, page } => {
                if skip == state.requested_skip {
                    state.clear_error();
                    state.set_page(*page);
                } else {
                    tracing::debug!(
                        "dropping stale page skip={skip}, waiting for {}",
                        state.requested_skip
                    );
                }
            }
            AppEvent::Error(e) => {
                tracing::warn!("page load failed: {e}");
                state.is_loading = false;
                state.set_error(e);
            }
        }

        if state.should_quit {
            return Ok(());
        }
    }
}
