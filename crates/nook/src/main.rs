//! nook — context-aware window placement daemon.
//!
//! Listens to the compositor's window events and, when a freshly created
//! window correlates with a recently focused parent matching a configured
//! rule, places and sizes it per the rule instead of the default
//! geometry-based split.

mod app;

use std::path::PathBuf;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "nook",
    version,
    about = "Context-aware window placement for sway-compatible compositors"
)]
struct Cli {
    /// Path to the rules file (default: ~/.config/nook/rules.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Compositor socket path (default: $SWAYSOCK or $I3SOCK)
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Print debug messages
    #[arg(short, long)]
    debug: bool,

    /// Restrict autotiling to these outputs
    #[arg(short, long, num_args = 0..)]
    outputs: Vec<String>,

    /// Restrict autotiling to these workspaces
    #[arg(short, long, num_args = 0..)]
    workspaces: Vec<String>,

    /// Width factor for horizontal splits (as a fraction of the default)
    #[arg(long, default_value_t = 1.0)]
    splitwidth: f64,

    /// Height factor for vertical splits (as a fraction of the default)
    #[arg(long, default_value_t = 1.0)]
    splitheight: f64,

    /// Aspect bias: how much wider than tall a window must be before a
    /// horizontal split is chosen (try 1.61 for golden-ratio splits)
    #[arg(long, default_value_t = 1.0)]
    splitratio: f64,

    /// Seconds between sweeps of expired correlations
    #[arg(long, default_value_t = 30)]
    sweep_interval: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match nook_config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            // A broken rules file must not take the daemon down: windows
            // still get default tiling while the user fixes it.
            eprintln!("nook: {err}");
            eprintln!("nook: continuing with an empty rule set");
            nook_config::Config::default()
        }
    };

    init_tracing(cli.debug || config.settings.debug);
    if config.rules.is_empty() {
        warn!("no placement rules loaded, running in pure autotiling mode");
    }

    app::run(&cli, config).await
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
