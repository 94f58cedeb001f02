//! Hotel registry console.
//!
//! ```sh
//! # Use ./hotels.json
//! hotel-registry
//!
//! # Another store, compact output
//! hotel-registry --store /var/lib/hotels.json --indent 0
//!
//! # Validate a store without opening the menu
//! hotel-registry --check
//! ```

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use hotel_registry::{AppConfig, Console, HotelManager};

#[derive(Parser, Debug)]
#[command(
    name = "hotel-registry",
    version,
    about = "Track hotels, rooms and reservations in a JSON file"
)]
struct Cli {
    /// Path to the JSON store.
    #[arg(short, long, env = "HOTEL_STORE")]
    store: Option<PathBuf>,

    /// Spaces of indentation when writing the store (0 for compact).
    #[arg(long)]
    indent: Option<usize>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(short, long, env = "HOTEL_LOG")]
    log_level: Option<String>,

    /// Load the store, print a summary and exit.
    #[arg(long)]
    check: bool,
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::default();
    if let Some(path) = cli.store {
        config.store.path = path;
    }
    if let Some(indent) = cli.indent {
        config.store.indent = indent;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    init_tracing(&config.log_level);
    info!("Using store {}", config.store.path.display());

    let path = config.store.path.clone();
    let mut manager = HotelManager::open(config.store)
        .with_context(|| format!("Failed to load hotel store {}", path.display()))?;

    if cli.check {
        let rooms: usize = manager.list_hotels().map(|(_, h)| h.rooms.len()).sum();
        let reservations: usize = manager
            .list_hotels()
            .map(|(_, h)| h.reservations.len())
            .sum();
        println!("Store is valid");
        println!("   Path         : {}", path.display());
        println!("   Hotels       : {}", manager.len());
        println!("   Rooms        : {}", rooms);
        println!("   Reservations : {}", reservations);
        return Ok(());
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    Console::new(&mut manager, stdin.lock(), stdout.lock())
        .run()
        .context("Console I/O failed")?;

    Ok(())
}
