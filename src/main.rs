use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use minicade::app::App;
use minicade::config::Cli;
use minicade::event::{Event, EventHandler};
use minicade::scores::{FileStore, MemoryStore, ScoreStore};
use minicade::ui;

/// Log to a file: stdout and stderr belong to the TUI.
fn init_logging(cli: &Cli) {
    let path = cli.log_path();
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let writer: Box<dyn io::Write + Send> = match File::create(&path) {
        Ok(file) => Box::new(file),
        Err(_) => Box::new(io::sink()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(writer))
        .with_ansi(false)
        .init();
}

fn restore_terminal(enhanced_keys: bool) {
    let _ = disable_raw_mode();
    if enhanced_keys {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let scores = if cli.no_persist {
        ScoreStore::open(Box::new(MemoryStore::new()))
    } else {
        ScoreStore::open(Box::new(FileStore::new(cli.scores_path())))
    };
    tracing::info!(
        "starting: fps={} scores={} persist={} seed={:?}",
        cli.fps(),
        cli.scores_path().display(),
        !cli.no_persist,
        cli.seed
    );

    enable_raw_mode().context("enabling raw mode")?;
    // Without event types, terminal auto-repeat arrives as fresh presses.
    let enhanced_keys = matches!(supports_keyboard_enhancement(), Ok(true));
    tracing::debug!("keyboard enhancement: {}", enhanced_keys);

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal(enhanced_keys);
        default_hook(info);
    }));

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).context("entering alternate screen")?;
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )
        .context("enabling key event types")?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal")?;

    let mut app = App::new(scores, cli.seed);
    if let Some(id) = cli.game {
        app.launch(id);
    }

    let result = run(&mut terminal, &mut app, cli.fps());

    restore_terminal(enhanced_keys);
    terminal.show_cursor().ok();
    tracing::info!("bye");
    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App, fps: u32) -> Result<()> {
    terminal.clear()?;
    let events = EventHandler::new(fps);
    let mut last = Instant::now();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;

        match events.next()? {
            Event::Key(key) => app.on_key(key),
            Event::Mouse(mouse) => app.on_mouse(mouse),
            Event::Resize | Event::Tick => {}
        }

        let now = Instant::now();
        app.on_tick(now - last);
        last = now;
    }
    Ok(())
}
