mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use focuslog::{
    Alerts, DesktopAlerts, FileStore, LoopScheduler, Scheduler, SystemClock,
    TaskHandle, TimerMode,
    app::{App, View},
};
use log::{info, warn};
use ratatui::prelude::*;
use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

// ============================================================================
// Constants
// ============================================================================

const TICK_RATE: Duration = Duration::from_millis(500);
const FRAME_RATE: Duration = Duration::from_millis(50);

type DashApp = App<SystemClock>;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Clone)]
#[command(author, version, about = "🍅 focuslog - a focus timer that logs every minute you work")]
struct Args {
    /// Focus length, e.g. 25m or 1h
    #[arg(short, long, value_parser = parse_duration)]
    focus: Option<u32>,
    /// Short break length
    #[arg(short, long, value_parser = parse_duration)]
    short_break: Option<u32>,
    /// Long break length
    #[arg(short, long, value_parser = parse_duration)]
    long_break: Option<u32>,
    /// Focus sessions before a long break
    #[arg(short = 'n', long)]
    long_break_every: Option<u32>,
    #[arg(long)]
    auto_breaks: Option<bool>,
    #[arg(long)]
    auto_focus: Option<bool>,
    /// Sound volume between 0 and 1
    #[arg(long)]
    volume: Option<f32>,
    #[arg(long)]
    no_sound: bool,
    #[arg(long, default_value = "focuslog")]
    data_dir: PathBuf,
    /// Write the focus log as CSV and exit
    #[arg(long)]
    export: Option<PathBuf>,
}

/// Parses `25m`, `1h30m`, `90s` or a bare number of minutes into whole minutes.
fn parse_duration(s: &str) -> std::result::Result<u32, String> {
    let s = s.trim().to_lowercase();
    if let Ok(minutes) = s.parse::<f64>() {
        return to_minutes(minutes);
    }

    let mut total = 0.0;
    let mut num = String::new();

    for c in s.chars() {
        match c {
            '0'..='9' | '.' => num.push(c),
            'h' => { total += num.parse::<f64>().map_err(|_| "Invalid hours")? * 60.0; num.clear(); }
            'm' => { total += num.parse::<f64>().map_err(|_| "Invalid minutes")?; num.clear(); }
            's' => { total += num.parse::<f64>().map_err(|_| "Invalid seconds")? / 60.0; num.clear(); }
            _ => return Err("Invalid format".into()),
        }
    }
    if !num.is_empty() {
        return Err("Missing unit after number".into());
    }

    to_minutes(total)
}

fn to_minutes(total: f64) -> std::result::Result<u32, String> {
    let minutes = total.round();
    if minutes >= 1.0 && minutes <= f64::from(u32::MAX) {
        Ok(minutes as u32)
    } else {
        Err("Duration must be at least one minute".into())
    }
}

// ============================================================================
// Setup
// ============================================================================

fn init_logging(data_dir: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("focuslog.log"))
        .context("Failed to open log file")?;

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_app(args: &Args) -> Result<DashApp> {
    let store = FileStore::open(&args.data_dir)
        .with_context(|| format!("Failed to open data directory {}", args.data_dir.display()))?;
    init_logging(store.dir())?;
    info!("focuslog starting with data in {}", store.dir().display());

    let alerts: Box<dyn Alerts> = Box::new(DesktopAlerts::new(!args.no_sound));

    // CLI overrides
    let args = args.clone();
    Ok(App::load(SystemClock, Box::new(store), alerts, move |settings| {
        if let Some(m) = args.focus { settings.focus_minutes = m; }
        if let Some(m) = args.short_break { settings.short_break_minutes = m; }
        if let Some(m) = args.long_break { settings.long_break_minutes = m; }
        if let Some(n) = args.long_break_every { settings.long_break_every_n_sessions = n; }
        if let Some(b) = args.auto_breaks { settings.auto_start_breaks = b; }
        if let Some(b) = args.auto_focus { settings.auto_start_focus = b; }
        if let Some(v) = args.volume { settings.volume = v; }
    }))
}

// ============================================================================
// Event Handlers
// ============================================================================

/// Returns `true` when the user asked to quit.
fn handle_input(key: event::KeyEvent, app: &mut DashApp, export_path: &Path) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            if app.view == View::Timer {
                return true;
            }
            app.view = View::Timer;
        }
        KeyCode::Char(' ') => app.toggle(),
        KeyCode::Char('r') => app.reset(),
        KeyCode::Char('1') => app.switch_mode(TimerMode::Focus),
        KeyCode::Char('2') => app.switch_mode(TimerMode::ShortBreak),
        KeyCode::Char('3') => app.switch_mode(TimerMode::LongBreak),
        KeyCode::Char('s') => {
            app.view = if app.view == View::Stats { View::Timer } else { View::Stats };
        }
        KeyCode::Char('h') | KeyCode::Char('?') => {
            app.view = if app.view == View::Help { View::Timer } else { View::Help };
        }
        KeyCode::Char('e') => match app.export_csv(export_path) {
            Ok(()) => info!("Exported focus log to {}", export_path.display()),
            Err(err) => warn!("{err:#}"),
        },
        _ => {}
    }

    false
}

/// Keeps exactly one tick task scheduled while the countdown runs.
fn sync_ticker(
    scheduler: &mut LoopScheduler<DashApp>,
    ticker: &mut Option<TaskHandle>,
    app: &DashApp,
) {
    match (app.timer().is_running(), *ticker) {
        (true, None) => {
            *ticker = Some(scheduler.schedule_repeating(TICK_RATE, Box::new(|app: &mut DashApp| app.tick())));
        }
        (false, Some(handle)) => {
            scheduler.cancel(handle);
            *ticker = None;
        }
        _ => {}
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    let mut app = load_app(&args)?;

    if let Some(path) = &args.export {
        app.export_csv(path)?;
        println!("Exported focus log to {}", path.display());
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let export_path = args.data_dir.join("focus_export.csv");
    let res = run(&mut terminal, &mut app, &export_path);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    app.persist();
    info!("focuslog exiting");
    res
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut DashApp,
    export_path: &Path,
) -> Result<()> {
    let mut scheduler: LoopScheduler<DashApp> = LoopScheduler::new();
    let mut ticker = None;
    let mut animation_frame: u8 = 0;

    loop {
        sync_ticker(&mut scheduler, &mut ticker, app);
        app.refresh_summary();
        terminal.draw(|f| ui::render_ui(f, app, animation_frame))?;

        let now = Instant::now();
        let timeout = scheduler
            .next_deadline()
            .map_or(FRAME_RATE, |deadline| deadline.saturating_duration_since(now))
            .min(FRAME_RATE);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_input(key, app, export_path) {
                    if let Some(handle) = ticker.take() {
                        scheduler.cancel(handle);
                    }
                    return Ok(());
                }
            }
        }

        scheduler.run_due(Instant::now(), app);
        animation_frame = animation_frame.wrapping_add(1) % 20;
    }
}
