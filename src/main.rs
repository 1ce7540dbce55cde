//! Glidewheel daemon: arm the interceptor and run until interrupted.

use anyhow::Context;
use clap::Parser;
use glidewheel::{Controller, GlideError, SettingsStore};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "glidewheel", version, about = "Smooth scrolling for stepped mouse wheels")]
struct Args {
    /// Settings file path (defaults to the per-user config directory).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG still takes precedence).
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "glidewheel=debug" } else { "glidewheel=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting glidewheel v{}", env!("CARGO_PKG_VERSION"));

    let store = match args.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::new(
            SettingsStore::default_location()
                .context("could not determine the user config directory")?,
        ),
    };
    tracing::info!("settings file: {}", store.path().display());

    let controller = Controller::new(store);

    if let Err(e) = controller.start() {
        if matches!(e, GlideError::PermissionDenied) {
            eprintln!("glidewheel needs Accessibility access to smooth scroll events.");
            eprintln!();
            eprintln!("  1. Open System Settings > Privacy & Security > Accessibility");
            eprintln!("  2. Unlock the panel and enable glidewheel (or the terminal it runs from)");
            eprintln!("  3. Run glidewheel again");
            std::process::exit(1);
        }
        return Err(e).context("failed to arm the scroll interceptor");
    }

    tracing::info!("smoothing active, press Ctrl-C to quit");
    tokio::signal::ctrl_c().await.context("failed to wait for Ctrl-C")?;

    controller.stop();
    Ok(())
}
