//! # Data Loading
//!
//! Everything that touches files: the pitch Record Store, the per-count rate
//! tables and the binary dataset snapshot.
//!
//! - `record_store` - CSV / JSON → `RecordStore`
//! - `names` - batter name canonicalisation (handedness markers)
//! - `rates` - auxiliary per-count rate-stat lookups
//! - `snapshot` - `RecordStore` → MessagePack → LZ4 cache file

pub mod names;
pub mod rates;
pub mod record_store;
pub mod snapshot;

pub use names::canonical_batter_name;
pub use rates::{RateLine, RateStat, RateTable};
pub use record_store::{LoadOptions, ParseStats, RecordStore};
pub use snapshot::{build_snapshot, load_snapshot, verify_snapshot, SnapshotMetadata};
