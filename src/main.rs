use catswp::cli::{AppConfig, Args};
use catswp::config::UserConfig;
use catswp::provider::{fetch_images, FetchedImage, HttpImageProvider, PlaceholderProvider};
use catswp::session::SwipeSession;
use catswp::tui::{
    handle_key_event, handle_summary_input, render, KeyAction, PointerTracker, TerminalDisplay,
    ViewState,
};
use catswp::Summary;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::sync::Mutex;
use std::time::Instant;
use std::{io, time::Duration};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Upper bound on how long the loop waits for input between frames
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Load user configuration
    let user_config = UserConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load user config: {}", e);
        UserConfig::default()
    });

    let config = AppConfig::merge(args, user_config);
    init_tracing(&config)?;

    if config.save_config {
        match UserConfig::from(&config).save() {
            Ok(()) => tracing::info!("settings saved"),
            Err(e) => eprintln!("Warning: Failed to save user config: {}", e),
        }
    }

    let runtime = tokio::runtime::Runtime::new()?;
    if !config.offline {
        println!("Fetching {} cats...", config.deck_size);
    }
    let images = fetch_deck(&runtime, &config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let display = TerminalDisplay::new(terminal.size()?.width);
    let mut session = SwipeSession::new(display, images);

    // Main loop
    let result = run_loop(&mut terminal, &mut session, &runtime, &config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Print summary after exit
    if let Some(summary) = session.summary() {
        print_summary(summary, config.json)?;
    } else {
        let progress = session.progress();
        println!(
            "Stopped after {} of {} cards ({} liked)",
            progress.swiped,
            progress.total,
            session.accepted().len()
        );
    }

    result
}

fn init_tracing(config: &AppConfig) -> io::Result<()> {
    let filter = match config.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // The terminal UI owns stdout and stderr, so logs only go to a file.
    if let Some(path) = &config.log_file {
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(filter)
            .init();
    }

    Ok(())
}

/// Fetches a full deck from the configured provider
fn fetch_deck(runtime: &tokio::runtime::Runtime, config: &AppConfig) -> Vec<FetchedImage> {
    if config.offline {
        return runtime.block_on(fetch_images(&PlaceholderProvider, config.deck_size));
    }

    let provider = HttpImageProvider::new(&config.source_url, &config.fallback_url);
    runtime.block_on(fetch_images(&provider, config.deck_size))
}

fn print_summary(summary: &Summary, json: bool) -> io::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
        println!("{}", out);
        return Ok(());
    }

    println!(
        "You liked {} of {} cats",
        summary.accepted_count, summary.total
    );
    for image_ref in &summary.accepted_refs {
        println!("   {}", image_ref);
    }
    Ok(())
}

/// Main application loop
fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    session: &mut SwipeSession<TerminalDisplay>,
    runtime: &tokio::runtime::Runtime,
    config: &AppConfig,
) -> io::Result<()> {
    let mut started = Instant::now();
    let mut pointer = PointerTracker::new();

    loop {
        session.tick(started.elapsed());

        terminal.draw(|frame| render(frame, session.display()))?;

        if !event::poll(FRAME_INTERVAL)? {
            continue;
        }

        let now = started.elapsed();
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if session.display().view_state() == ViewState::Summary {
                    match handle_summary_input(key) {
                        KeyAction::Restart => {
                            let images = fetch_deck(runtime, config);
                            session.display_mut().clear();
                            session.reset(images);
                            started = Instant::now();
                            continue;
                        }
                        _ => break,
                    }
                }

                let action = handle_key_event(key);
                if action == KeyAction::Quit {
                    break;
                }
                if let Some(input) = action.as_input() {
                    // Invalid-state errors are already logged by the session.
                    let _ = session.handle(input, now);
                }
            }
            Event::Mouse(mouse) => {
                if let Some(input) = pointer.handle_mouse(mouse, Instant::now()) {
                    let _ = session.handle(input, now);
                }
            }
            Event::Resize(cols, _) => session.display_mut().set_viewport_cols(cols),
            _ => {}
        }
    }

    Ok(())
}
