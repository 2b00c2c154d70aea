//! Swing CLI
//!
//! Query gauges for a player/count, suggest player names, and build
//! MessagePack+LZ4 snapshots of the pitch dataset.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing::info;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "swing")]
#[command(about = "Swing metrics by player and count", long_about = None)]
struct Cli {
    /// JSON config file (defaults to $SWING_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Show gauge readings for a player at a count
    Gauges {
        /// Dataset file (.csv, .json or .lz4)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Batter name (empty shows the league)
        #[arg(long, default_value = "")]
        player: String,

        /// Count: 0-0 or 0-2
        #[arg(long, default_value = "0-0")]
        count: swing_core::CountChoice,

        /// Directory with the per-count rate JSON files
        #[arg(long)]
        rates: Option<PathBuf>,

        /// Print the frame as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Suggest batter names matching a query
    Players {
        /// Dataset file (.csv, .json or .lz4)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Case-insensitive substring
        #[arg(long)]
        query: String,

        /// Max suggestions (defaults to the config's suggestion_limit)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Build a MessagePack+LZ4 snapshot of the dataset
    Snapshot {
        /// Dataset file (.csv or .json)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output snapshot path
        #[arg(long)]
        out: PathBuf,

        /// Schema version (e.g., "v1")
        #[arg(long, default_value = "v1")]
        schema_version: String,

        /// Verify snapshot after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = swing_cli::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Gauges {
            data,
            player,
            count,
            rates,
            json,
        } => {
            let config = swing_cli::with_overrides(config, data, rates);
            let mut dashboard = swing_cli::open_dashboard(config)?;
            dashboard.on_count_change(count);
            dashboard.on_player_commit(&player);

            let frame = dashboard
                .last_frame()
                .context("Dashboard produced no frame")?;
            if json {
                println!("{}", serde_json::to_string_pretty(frame)?);
            } else {
                print!("{}", swing_cli::format_frame(frame));
            }
        }

        Commands::Players { data, query, limit } => {
            let config = swing_cli::with_overrides(config, data, None);
            let limit = limit.unwrap_or(config.suggestion_limit);
            let dashboard = swing_cli::open_dashboard(config)?;
            for name in dashboard.suggest_players(&query, limit) {
                println!("{name}");
            }
        }

        Commands::Snapshot {
            data,
            out,
            schema_version,
            verify,
            metadata,
        } => {
            let config = swing_cli::with_overrides(config, data, None);
            let store = swing_cli::load_store(&config)?;
            let meta = swing_core::data::build_snapshot(&store, &out, &schema_version)
                .with_context(|| format!("Failed to write snapshot {}", out.display()))?;

            print!("{}", swing_cli::format_snapshot_summary(&store, &out, &meta));

            if verify {
                let intact = swing_core::data::verify_snapshot(&out, &meta.checksum)
                    .with_context(|| format!("Failed to re-read snapshot {}", out.display()))?;
                if !intact {
                    anyhow::bail!(
                        "Snapshot {} does not match checksum {}",
                        out.display(),
                        meta.checksum
                    );
                }
                info!(path = %out.display(), "Snapshot checksum verified");
            }

            if let Some(metadata_path) = metadata {
                let metadata_json = serde_json::to_string_pretty(&meta)?;
                std::fs::write(&metadata_path, metadata_json).with_context(|| {
                    format!("Failed to write metadata {}", metadata_path.display())
                })?;
                info!(path = %metadata_path.display(), "Snapshot metadata written");
            }
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("swing CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
