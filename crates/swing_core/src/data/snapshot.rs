//! Dataset snapshot: `RecordStore` → MessagePack → LZ4 → file
//!
//! Parsing the full season CSV is the slowest part of startup. A snapshot
//! stores the already-typed rows so later sessions skip the CSV parse.
//! A SHA256 checksum of the compressed bytes is reported for verification.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::info;

use super::record_store::RecordStore;
use crate::error::{LoadError, Result};

/// Snapshot metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Schema version (e.g. "v1")
    pub schema_version: String,
    /// SHA256 of the compressed file (hex)
    pub checksum: String,
    /// RFC3339
    pub created_at: String,
    pub record_count: usize,
    /// MessagePack size (bytes)
    pub original_size: u64,
    /// File size after LZ4 (bytes)
    pub compressed_size: u64,
    pub compression_ratio: f64,
}

/// Write `store` to `output` and return the snapshot metadata.
pub fn build_snapshot(
    store: &RecordStore,
    output: &Path,
    schema_version: &str,
) -> Result<SnapshotMetadata> {
    // 1. MessagePack
    let msgpack_bytes = rmp_serde::to_vec(store)?;
    let original_size = msgpack_bytes.len() as u64;

    // 2. LZ4 (size-prepended)
    let compressed = lz4_flex::compress_prepend_size(&msgpack_bytes);
    let compressed_size = compressed.len() as u64;

    // 3. Checksum
    let checksum = sha256_hex(&compressed);

    // 4. Write
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, &compressed)?;

    let compression_ratio = if original_size == 0 {
        0.0
    } else {
        compressed_size as f64 / original_size as f64
    };

    info!(
        path = %output.display(),
        records = store.len(),
        original_size,
        compressed_size,
        "Snapshot written"
    );

    Ok(SnapshotMetadata {
        schema_version: schema_version.to_string(),
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        record_count: store.len(),
        original_size,
        compressed_size,
        compression_ratio,
    })
}

/// Compare the file's SHA256 with `expected_checksum`.
pub fn verify_snapshot(path: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(path)?;
    Ok(sha256_hex(&bytes).eq_ignore_ascii_case(expected_checksum.trim()))
}

/// Read a snapshot back into a `RecordStore`.
pub fn load_snapshot(path: &Path) -> Result<RecordStore> {
    let compressed = fs::read(path)?;
    let msgpack_bytes = lz4_flex::decompress_size_prepended(&compressed)?;
    let store: RecordStore = rmp_serde::from_slice(&msgpack_bytes)?;

    if store.is_empty() {
        return Err(LoadError::Empty {
            source_name: path.display().to_string(),
        });
    }

    info!(path = %path.display(), records = store.len(), "Snapshot loaded");
    Ok(store)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
