use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use checkers::config::AppConfig;
use checkers::game::{GameSession, Variant};
use checkers::ui::App;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

/// Play checkers in the terminal.
#[derive(Parser)]
#[command(name = "checkers", about = "Play checkers in the terminal")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "checkers.toml")]
    config: PathBuf,

    /// Game variant: regular, reverse or capture
    #[arg(long)]
    variant: Option<Variant>,

    /// Require a capture whenever one is available
    #[arg(long)]
    force_capture: bool,

    /// Highlight movable pieces and their destinations
    #[arg(long)]
    guides: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(variant) = cli.variant {
        config.game.variant = variant;
    }
    if cli.force_capture || config.game.variant == Variant::ForcedCapture {
        config.game.force_capture = true;
    }
    if cli.guides {
        config.game.display_guide = true;
    }
    config.validate().context("invalid configuration")?;

    init_logging(&config)?;
    tracing::info!(settings = ?config.game, "starting checkers");

    let session = GameSession::new(config.game).context("creating game session")?;
    play(App::new(session)).context("running terminal UI")?;

    tracing::info!("exiting");
    Ok(())
}

/// Send traces to the configured log file. `RUST_LOG` takes precedence over
/// the configured filter.
fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log.filter)
            .with_context(|| format!("parsing log filter '{}'", config.log.filter))?,
    };
    let file = std::fs::File::create(&config.log.file)
        .with_context(|| format!("creating log file {}", config.log.file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn play(mut app: App) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res
}
