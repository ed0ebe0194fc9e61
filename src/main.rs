use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use cubit::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    export::export_csv_file,
    logging,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    scramble::{RandomMoveScrambler, ScrambleWorker},
    solve::PuzzleType,
    store::{SolveStore, SqliteStore},
    timer::{Clock, FinishPolicy, Phase, SystemClock},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{info, warn};

/// speedcubing timer with scrambles, sessions and rolling averages
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal speedcubing timer: hold space to ready, release to start, press to stop. Solves are kept in named sessions with best, mean and trimmed averages of 5, 12 and 100."
)]
pub struct Cli {
    /// puzzle to scramble for (defaults to the configured puzzle)
    #[clap(short, long, value_enum)]
    puzzle: Option<PuzzleType>,

    /// path to the solve database
    #[clap(long)]
    db: Option<PathBuf>,

    /// a press on a finished time arms the next attempt instead of clearing it
    #[clap(long)]
    rearm: bool,

    /// ignore presses arriving sooner than this many milliseconds after the last one
    #[clap(long)]
    debounce_ms: Option<u64>,

    /// write the first session's solves as CSV to this path and exit
    #[clap(long)]
    export: Option<PathBuf>,

    /// delete every session and solve, recreate the default sessions and exit
    #[clap(long)]
    reset_sessions: bool,
}

impl Cli {
    /// Command line flags win over the config file
    fn apply(&self, config: &mut Config) {
        if let Some(puzzle) = self.puzzle {
            config.puzzle_type = puzzle;
        }
        if self.rearm {
            config.finish_policy = FinishPolicy::Rearm;
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce_ms = ms;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = logging::init(&path) {
            eprintln!("cubit: logging disabled: {e}");
        }
    }

    let mut config = FileConfigStore::new().load();
    cli.apply(&mut config);

    let db_path = cli
        .db
        .clone()
        .or_else(AppDirs::db_path)
        .ok_or("cannot resolve a database path, pass --db")?;
    let mut store = SqliteStore::open(&db_path)?;
    info!(db = %db_path.display(), "starting");

    if cli.reset_sessions {
        let sessions = store.reset_sessions()?;
        println!("Reset done, {} sessions recreated", sessions.len());
        return Ok(());
    }

    if let Some(path) = &cli.export {
        let count = export_first_session(&mut store, path)?;
        println!("Exported {count} solves to {}", path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    } else {
        warn!("terminal does not report key releases, space taps start the timer");
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &config, Box::new(store), !enhanced);

    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Exports the solves of the session the timer would start on.
fn export_first_session(store: &mut dyn SolveStore, path: &Path) -> Result<usize, Box<dyn Error>> {
    let sessions = store.ensure_default_sessions()?;
    let solves = sessions
        .first()
        .map(|s| s.solves.as_slice())
        .unwrap_or(&[]);
    Ok(export_csv_file(path, solves)?)
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    config: &Config,
    store: Box<dyn SolveStore>,
    synthesize_release: bool,
) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new(synthesize_release);
    let scrambler = ScrambleWorker::spawn(RandomMoveScrambler::new(), events.sender());
    let mut app = App::new(SystemClock, config, store, scrambler)?;

    let ticker = FixedTicker::new(Duration::from_millis(config.sample_interval_ms.max(1)));
    let runner = Runner::new(events, ticker);

    terminal.draw(|f| ui(&app, f))?;

    while !app.should_quit() {
        let event = runner.step();
        let redraw = needs_redraw(&app, &event);
        app.on_event(event);
        if redraw {
            terminal.draw(|f| ui(&app, f))?;
        }
    }

    info!("quitting");
    Ok(())
}

/// Ticks only repaint while the clock is moving or a notice may expire.
fn needs_redraw<C: Clock + Clone>(app: &App<C>, event: &AppEvent) -> bool {
    match event {
        AppEvent::Tick => app.timer().phase() == Phase::Running || app.current_notice().is_some(),
        _ => true,
    }
}

fn ui<C: Clock + Clone>(app: &App<C>, f: &mut Frame) {
    f.render_widget(app, f.area());
}
