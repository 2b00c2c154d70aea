//! Swing CLI support
//!
//! Loading and formatting helpers shared by the `swing` binary.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

use swing_core::data::{RateStat, SnapshotMetadata};
use swing_core::{Dashboard, DashboardConfig, PlayerIndex, RateTable, RecordStore, RenderFrame};

/// Config from `--config` when given, else `SWING_CONFIG_PATH`, else
/// defaults. `SWING_DATA_PATH` applies on top of either.
pub fn resolve_config(config_path: Option<&Path>) -> Result<DashboardConfig> {
    match config_path {
        Some(path) => {
            let mut config = DashboardConfig::from_path(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => DashboardConfig::from_env().context("Failed to read config from environment"),
    }
}

/// Apply `--data` / `--rates` overrides on top of the config.
pub fn with_overrides(
    mut config: DashboardConfig,
    data: Option<PathBuf>,
    rates: Option<PathBuf>,
) -> DashboardConfig {
    if let Some(data) = data {
        config.data_path = data;
    }
    if rates.is_some() {
        config.rates_dir = rates;
    }
    config
}

pub fn load_store(config: &DashboardConfig) -> Result<RecordStore> {
    RecordStore::load(&config.data_path, &config.load_options())
        .with_context(|| format!("Failed to load dataset {}", config.data_path.display()))
}

/// Build a ready dashboard: load the dataset, then the rate tables if a
/// directory is configured.
pub fn open_dashboard(config: DashboardConfig) -> Result<Dashboard> {
    let data_path = config.data_path.clone();
    let rates_dir = config.rates_dir.clone();
    let load_options = config.load_options();

    let mut dashboard = Dashboard::new(config);
    dashboard
        .complete_load(RecordStore::load(&data_path, &load_options))
        .with_context(|| format!("Failed to load dataset {}", data_path.display()))?;

    if let Some(dir) = rates_dir {
        let rates = RateTable::load_dir(&dir, &load_options)
            .with_context(|| format!("Failed to load rate tables from {}", dir.display()))?;
        info!(dir = %dir.display(), "Rate tables attached");
        dashboard.set_rates(rates);
    }
    Ok(dashboard)
}

/// Plain-text rendering of one frame.
pub fn format_frame(frame: &RenderFrame) -> String {
    let mut out = String::new();
    let player = frame.selection.trimmed_query();
    let _ = writeln!(
        out,
        "Player: {}  Count: {}",
        if player.is_empty() { "-" } else { player },
        frame.selection.count
    );
    let _ = writeln!(out, "Rows:   {} ({})", frame.row_count, frame.tier);

    for gauge in &frame.gauges {
        let rank = gauge
            .percentile
            .map(|p| format!("   P{p:.0}"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:<22} {:>10}   [{}, {}]   {}{}",
            gauge.title,
            gauge.display_value(),
            gauge.min,
            gauge.max,
            gauge.league_label(),
            rank
        );
    }

    if let Some(rates) = &frame.rates {
        let _ = writeln!(out, "Rates:  {}", rates.label);
        let cells: Vec<String> = RateStat::ALL
            .into_iter()
            .map(|stat| format!("{} {}", stat.key(), rates.formatted(stat)))
            .collect();
        let _ = writeln!(out, "  {}", cells.join("  "));
    }
    out
}

/// What went into a snapshot and how it was stored.
pub fn format_snapshot_summary(store: &RecordStore, out: &Path, meta: &SnapshotMetadata) -> String {
    let stats = store.stats();
    let mut text = String::new();
    let _ = writeln!(text, "{} -> {}", store.source(), out.display());
    let _ = writeln!(
        text,
        "  rows      {} kept, {} skipped, {} batters",
        stats.parsed,
        stats.failed,
        PlayerIndex::build(store).len()
    );
    let _ = writeln!(
        text,
        "  size      {} -> {} bytes ({:.1}% of msgpack)",
        meta.original_size,
        meta.compressed_size,
        meta.compression_ratio * 100.0
    );
    let _ = writeln!(text, "  schema    {} @ {}", meta.schema_version, meta.created_at);
    let _ = writeln!(text, "  sha256    {}", meta.checksum);
    text
}
