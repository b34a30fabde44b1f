//! Report page - tui-relay demo
//!
//! Shows the dispatch pattern end to end:
//! 1. A page description (JSON) names action keys for each control
//! 2. Controls bind handles to those keys and dispatch on activation
//! 3. A simulated engine answers after a delay, sometimes rejecting
//! 4. Settlements flip controls back to idle; rejected actions can be retried
//!
//! "Approve" and "Approve (again)" share one key: activating either shows
//! both as loading, and neither can submit twice. Clicks ripple across the
//! body container.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p relay-demo -- --latency-ms 1500 --failure-rate 0.3 --log-file relay.log
//! ```

mod app;
mod engine;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;
use tui_relay::{ChannelEngine, Dispatcher, RelayConfig, RelayRuntime};
use tui_relay_components::PageDescription;

use crate::app::DemoApp;
use crate::engine::{AcceptedPayloads, Simulation};

const PAGE: &str = r#"{
  "header": {
    "title": "Q3 report",
    "color": "indigo",
    "crumbs": [
      { "label": "Home", "action": { "id": "nav/home", "debugSymbol": "Nav::home" } },
      { "label": "Reports", "action": { "id": "nav/reports", "debugSymbol": "Nav::reports" } },
      { "label": "Q3" }
    ],
    "items": [
      { "label": "Refresh", "icon": "refresh", "color": "teal", "action": { "id": "report/refresh" } },
      { "label": "Save", "icon": "save", "color": "blue", "action": { "id": "report/save" } }
    ]
  },
  "labels": [
    { "text": "Quarterly revenue review", "placeholder": "Untitled report", "color": "indigo",
      "action": { "id": "report/rename", "debugSymbol": "Report::rename" } }
  ],
  "buttons": [
    { "label": "Approve", "color": "green", "icon": "check", "action": { "id": "report/approve" } },
    { "label": "Approve (again)", "color": "green", "action": { "id": "report/approve" } },
    { "label": "Archive", "color": "red", "icon": "trash", "action": { "id": "report/archive" } },
    { "label": "Unbound" }
  ]
}"#;

/// tui-relay demo: action dispatch with loading guards
#[derive(Parser, Debug)]
#[command(name = "relay-demo")]
#[command(about = "A report page demonstrating tui-relay dispatch")]
struct Args {
    /// JSON config file (poller timings, activation keys, ripple, deadline)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Simulated engine latency in milliseconds
    #[arg(long, default_value = "800")]
    latency_ms: u64,

    /// Share of submissions the simulated engine rejects (0.0 - 1.0)
    #[arg(long, default_value = "0.25")]
    failure_rate: f64,

    /// Write tracing output here (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = match &args.config {
        Some(path) => RelayConfig::load(path),
        None => Ok(RelayConfig::default()),
    };
    let (config, activation) = match config.and_then(|c| c.activation_keys().map(|keys| (c, keys))) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let page: PageDescription = match serde_json::from_str(PAGE) {
        Ok(page) => page,
        Err(e) => {
            eprintln!("Error: bad page description: {e}");
            std::process::exit(1);
        }
    };

    let (mut engine, inbox) = ChannelEngine::new();
    if let Some(deadline) = config.engine_deadline() {
        engine = engine.with_deadline(deadline);
    }
    let accepted = AcceptedPayloads::default();
    let _engine_task = engine::spawn(
        inbox,
        Simulation {
            latency: Duration::from_millis(args.latency_ms),
            failure_rate: args.failure_rate,
        },
        accepted.clone(),
    );

    let (dispatcher, settlements) = Dispatcher::new(engine);
    let mut app = DemoApp::new(&dispatcher, page, activation, config.ripple, accepted);
    let mut runtime = RelayRuntime::new(dispatcher, settlements).with_config(&config);
    tracing::info!(?config, "Starting relay demo");

    // ===== Terminal setup =====
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = runtime.run(&mut terminal, &mut app).await;

    // ===== Cleanup =====
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
