//! # swing_core - Swing Metrics Filtering & Aggregation Pipeline
//!
//! Loads pitch-level swing biomechanics data (bat speed, attack angle, swing
//! path tilt, attack direction), resolves the rows for a player/count
//! selection with a three-tier fallback, and aggregates them into gauge
//! readings for the dashboard renderers.
//!
//! ## Features
//! - CSV / JSON / MessagePack+LZ4 snapshot loading with auto-typed columns
//! - Player index with case-insensitive auto-complete
//! - Exact player → league average → all data resolution
//! - Zero-default aggregation (mean, extent, rounded scale bounds)
//! - Per-count rate tables (chase%, whiff%, ...) with league fallback
//! - Synchronous dashboard state machine with render listeners

pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod filter;
pub mod index;
pub mod models;
pub mod stats;

pub use config::DashboardConfig;
pub use dashboard::{
    Dashboard, GaugeReading, GaugeScales, LoadState, PipelinePhase, RenderFrame, RenderListener,
};
pub use data::{LoadOptions, ParseStats, RateLine, RateStat, RateTable, RecordStore};
pub use error::{ConfigError, LoadError};
pub use filter::{FilterResolver, Resolution, ResolutionTier};
pub use index::PlayerIndex;
pub use models::{CountChoice, FieldValue, MetricField, PitchRecord, SelectionState};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
