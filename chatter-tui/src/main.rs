use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chatter_core::{BackendKind, ChatterConfig, RealtimeBackend};
use chatter_tui::app::App;
use chatter_tui::logging;
use chatter_tui::theme::ThemeLoader;
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "chatter")]
#[command(version = VERSION)]
#[command(about = "Chatter - a minimal real-time chat in your terminal")]
#[command(long_about = r#"
Chatter is a small shared chat room. Pick a nickname, read the live message
list and post to it. Messages are stored in a Firebase Realtime Database,
or in process memory with --backend memory.

Configuration is read from ./chatter.toml, the user config directory and
CHATTER__SECTION__KEY environment variables.
"#)]
struct Cli {
    #[arg(short, long, value_name = "PATH", env = "CHATTER_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, value_name = "firebase|memory")]
    backend: Option<BackendKind>,

    /// Join straight away under this nickname
    #[arg(short, long)]
    nickname: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ChatterConfig::load_for_backend(cli.config.as_deref(), cli.backend) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(suggestion) = e.user_suggestion() {
                eprintln!("  {suggestion}");
            }
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config) {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    match run(&config, cli.nickname) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Application error: {:#}", e);
            eprintln!("Application error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &ChatterConfig, nickname: Option<String>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    rt.block_on(async {
        let backend: Arc<dyn RealtimeBackend> =
            chatter_core::create_backend(config).context("Failed to create backend")?;
        info!(
            version = VERSION,
            backend = backend.name(),
            collection = config.collection_path(),
            "Starting chatter"
        );

        let mut app = App::new(config, backend, ThemeLoader::new());
        if let Some(nickname) = nickname {
            app.join_with(&nickname);
        }

        let mut terminal = setup_terminal()?;
        let result = app.run(&mut terminal).await;
        restore_terminal(&mut terminal)?;
        result
    })
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}
