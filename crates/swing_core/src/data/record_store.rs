//! Record Store - pitch dataset (CSV / JSON) → in-memory rows
//!
//! The store is built once per session and never mutated afterwards.
//! Columns are looked up by header name, so extra Statcast columns and any
//! column order are accepted. Numeric-looking cells become numbers, blanks
//! become absent values; nothing is ever coerced to zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use super::names::canonical_batter_name;
use crate::error::{LoadError, Result};
use crate::models::pitch::{count_from_f64, parse_count, parse_metric, FieldValue};
use crate::models::{MetricField, PitchRecord};

pub const BATTER_NAME_COLUMN: &str = "batter_name";
pub const BALLS_COLUMN: &str = "balls";
pub const STRIKES_COLUMN: &str = "strikes";

/// Options applied while turning source rows into `PitchRecord`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Drop trailing stance markers ("AlvarezL" → "Alvarez")
    pub strip_hand_marker: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            strip_hand_marker: true,
        }
    }
}

/// Row parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub total_rows: u32,
    pub parsed: u32,
    pub failed: u32,
}

/// Immutable, insertion-ordered pitch rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordStore {
    records: Vec<PitchRecord>,
    stats: ParseStats,
    source: String,
    /// Options the names were canonicalised with
    #[serde(default)]
    options: LoadOptions,
}

impl RecordStore {
    /// Wrap already-built rows (adapters, tests).
    pub fn from_records(records: Vec<PitchRecord>) -> Self {
        let n = records.len() as u32;
        Self {
            records,
            stats: ParseStats {
                total_rows: n,
                parsed: n,
                failed: 0,
            },
            source: "memory".to_string(),
            options: LoadOptions::default(),
        }
    }

    /// Load a dataset, picking the parser from the file extension.
    ///
    /// `.csv` and `.json` are parsed; `.lz4` is read as a prebuilt snapshot
    /// and its names brought in line with `options`.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Self::from_csv_path(path, options),
            Some("json") => Self::from_json_path(path, options),
            Some("lz4") => Ok(super::snapshot::load_snapshot(path)?.with_options(options)),
            _ => Err(LoadError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    pub fn from_csv_path(path: &Path, options: &LoadOptions) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(file, options, &path.display().to_string())
    }

    /// Parse CSV with a header row.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        options: &LoadOptions,
        source_name: &str,
    ) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let name_idx = headers
            .iter()
            .position(|h| h == BATTER_NAME_COLUMN)
            .ok_or_else(|| LoadError::MissingColumn {
                column: BATTER_NAME_COLUMN.to_string(),
            })?;
        let column = |name: &str| headers.iter().position(|h| h == name);
        let balls_idx = column(BALLS_COLUMN);
        let strikes_idx = column(STRIKES_COLUMN);
        let metric_idx: Vec<(MetricField, usize)> = MetricField::ALL
            .into_iter()
            .filter_map(|f| column(f.column()).map(|i| (f, i)))
            .collect();

        let mut records = Vec::new();
        let mut stats = ParseStats::default();

        for result in reader.records() {
            stats.total_rows += 1;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    stats.failed += 1;
                    warn!(row = stats.total_rows, error = %e, "CSV parse error, skipping row");
                    continue;
                }
            };
            let cell = |idx: usize| row.get(idx).unwrap_or("");

            let mut record = PitchRecord {
                batter_name: canonical_batter_name(cell(name_idx), options.strip_hand_marker),
                balls: balls_idx.and_then(|i| parse_count(cell(i))),
                strikes: strikes_idx.and_then(|i| parse_count(cell(i))),
                attack_angle: None,
                bat_speed: None,
                swing_path_tilt: None,
                attack_direction: None,
                extras: BTreeMap::new(),
            };
            for &(field, idx) in &metric_idx {
                *record.metric_slot(field) = parse_metric(cell(idx));
            }

            for (idx, header) in headers.iter().enumerate() {
                if is_typed_column(header) || header.is_empty() {
                    continue;
                }
                record
                    .extras
                    .insert(header.clone(), FieldValue::from_cell(cell(idx)));
            }

            records.push(record);
            stats.parsed += 1;
        }

        Self::finish(records, stats, source_name, options)
    }

    pub fn from_json_path(path: &Path, options: &LoadOptions) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content, options, &path.display().to_string())
    }

    /// Parse a JSON array of row objects.
    pub fn from_json_str(content: &str, options: &LoadOptions, source_name: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let rows = value.as_array().ok_or_else(|| {
            LoadError::Malformed(format!("{source_name}: expected a JSON array of rows"))
        })?;

        let mut records = Vec::with_capacity(rows.len());
        let mut stats = ParseStats::default();

        for row in rows {
            stats.total_rows += 1;
            let Some(obj) = row.as_object() else {
                stats.failed += 1;
                warn!(row = stats.total_rows, "JSON row is not an object, skipping");
                continue;
            };

            let name = obj
                .get(BATTER_NAME_COLUMN)
                .and_then(|v| v.as_str())
                .unwrap_or("");
            let mut record = PitchRecord {
                batter_name: canonical_batter_name(name, options.strip_hand_marker),
                balls: obj.get(BALLS_COLUMN).and_then(json_count),
                strikes: obj.get(STRIKES_COLUMN).and_then(json_count),
                attack_angle: None,
                bat_speed: None,
                swing_path_tilt: None,
                attack_direction: None,
                extras: BTreeMap::new(),
            };

            for (key, value) in obj {
                if let Some(field) = MetricField::from_column(key) {
                    *record.metric_slot(field) = json_field_value(value).as_f64();
                } else if !is_typed_column(key) {
                    record.extras.insert(key.clone(), json_field_value(value));
                }
            }

            records.push(record);
            stats.parsed += 1;
        }

        Self::finish(records, stats, source_name, options)
    }

    fn finish(
        records: Vec<PitchRecord>,
        stats: ParseStats,
        source_name: &str,
        options: &LoadOptions,
    ) -> Result<Self> {
        if stats.parsed == 0 {
            return Err(LoadError::Empty {
                source_name: source_name.to_string(),
            });
        }

        info!(
            source = source_name,
            parsed = stats.parsed,
            failed = stats.failed,
            total = stats.total_rows,
            "Dataset loaded"
        );

        Ok(Self {
            records,
            stats,
            source: source_name.to_string(),
            options: *options,
        })
    }

    /// Re-apply name canonicalisation for `options`.
    ///
    /// Markers can be stripped after the fact but not restored: a store
    /// whose names were already stripped keeps them bare and logs a warning.
    pub fn with_options(mut self, options: &LoadOptions) -> Self {
        if options.strip_hand_marker {
            if !self.options.strip_hand_marker {
                for record in &mut self.records {
                    record.batter_name = canonical_batter_name(&record.batter_name, true);
                }
                debug!(source = %self.source, "Stance markers stripped from stored names");
            }
            self.options = *options;
        } else if self.options.strip_hand_marker {
            warn!(
                source = %self.source,
                "Names were stored without stance markers, they cannot be restored"
            );
        }
        self
    }

    /// All rows, in source order.
    pub fn all(&self) -> &[PitchRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&PitchRecord> {
        self.records.get(idx)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Options the stored names currently reflect.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// File (or "memory") the rows came from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

fn is_typed_column(name: &str) -> bool {
    name == BATTER_NAME_COLUMN
        || name == BALLS_COLUMN
        || name == STRIKES_COLUMN
        || MetricField::from_column(name).is_some()
}

fn json_field_value(value: &serde_json::Value) -> FieldValue {
    use serde_json::Value;
    match value {
        Value::Null => FieldValue::Missing,
        Value::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() => FieldValue::Number(v),
            _ => FieldValue::Missing,
        },
        Value::String(s) => FieldValue::from_cell(s),
        Value::Bool(b) => FieldValue::Text(b.to_string()),
        other => FieldValue::Text(other.to_string()),
    }
}

fn json_count(value: &serde_json::Value) -> Option<u32> {
    json_field_value(value).as_f64().and_then(count_from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_CSV: &str = "\
pitch_type,batter_name,balls,strikes,bat_speed,attack_angle,swing_path_tilt,attack_direction,launch_speed
FF,Yordan AlvarezL,0,0,77.3,12.5,31.0,-4.2,101.1
SL, Yordan AlvarezL ,0,2,,9.0,28.5,2.0,
CH,Aaron JudgeR,1,2,80.1,NA,33.0,1.5,95.0
";

    #[test]
    fn test_parse_csv_rows() {
        let store =
            RecordStore::from_csv_reader(SAMPLE_CSV.as_bytes(), &LoadOptions::default(), "sample")
                .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().parsed, 3);
        assert_eq!(store.source(), "sample");

        let first = &store.all()[0];
        assert_eq!(first.batter_name, "Yordan Alvarez");
        assert_eq!(first.balls, Some(0));
        assert_eq!(first.strikes, Some(0));
        assert_eq!(first.bat_speed, Some(77.3));
        assert_eq!(first.swing_path_tilt, Some(31.0));
        assert_eq!(first.numeric("launch_speed"), Some(101.1));
        assert_eq!(
            first.extras.get("pitch_type"),
            Some(&FieldValue::Text("FF".to_string()))
        );

        // Blank and NA cells are absent, not zero
        let second = &store.all()[1];
        assert_eq!(second.batter_name, "Yordan Alvarez");
        assert_eq!(second.bat_speed, None);
        assert_eq!(second.extras.get("launch_speed"), Some(&FieldValue::Missing));
        assert_eq!(store.all()[2].attack_angle, None);
    }

    #[test]
    fn test_csv_keeps_marker_when_disabled() {
        let options = LoadOptions {
            strip_hand_marker: false,
        };
        let store = RecordStore::from_csv_reader(SAMPLE_CSV.as_bytes(), &options, "sample").unwrap();
        assert_eq!(store.all()[0].batter_name, "Yordan AlvarezL");
    }

    #[test]
    fn test_csv_suffixed_names_lose_marker() {
        let csv = "batter_name,balls,strikes\nBobby Witt Jr.R,0,0\nMichael Harris IIL,0,2\n";
        let store =
            RecordStore::from_csv_reader(csv.as_bytes(), &LoadOptions::default(), "suffix")
                .unwrap();
        let idx = crate::index::PlayerIndex::build(&store);
        assert_eq!(idx.sorted_names(), &["Bobby Witt Jr.", "Michael Harris II"]);
    }

    #[test]
    fn test_snapshot_names_follow_load_options() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("raw.lz4");
        let raw = LoadOptions {
            strip_hand_marker: false,
        };
        let store = RecordStore::from_csv_reader(SAMPLE_CSV.as_bytes(), &raw, "sample")?;
        crate::data::build_snapshot(&store, &path, "v1")?;

        let loaded = RecordStore::load(&path, &LoadOptions::default())?;
        assert_eq!(loaded.all()[0].batter_name, "Yordan Alvarez");
        assert_eq!(loaded.all()[2].batter_name, "Aaron Judge");
        assert!(loaded.options().strip_hand_marker);

        let kept = RecordStore::load(&path, &raw)?;
        assert_eq!(kept.all()[0].batter_name, "Yordan AlvarezL");
        Ok(())
    }

    #[test]
    fn test_stripped_store_stays_bare() {
        let store =
            RecordStore::from_csv_reader(SAMPLE_CSV.as_bytes(), &LoadOptions::default(), "sample")
                .unwrap()
                .with_options(&LoadOptions {
                    strip_hand_marker: false,
                });
        assert_eq!(store.all()[0].batter_name, "Yordan Alvarez");
        assert!(store.options().strip_hand_marker);
    }

    #[test]
    fn test_csv_missing_name_column() {
        let csv = "balls,strikes,bat_speed\n0,0,70\n";
        let err = RecordStore::from_csv_reader(csv.as_bytes(), &LoadOptions::default(), "bad")
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { .. }));
    }

    #[test]
    fn test_csv_header_only_is_empty() {
        let csv = "batter_name,balls,strikes\n";
        let err = RecordStore::from_csv_reader(csv.as_bytes(), &LoadOptions::default(), "empty")
            .unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
    }

    #[test]
    fn test_short_rows_are_padded_with_missing() {
        let csv = "batter_name,balls,strikes,bat_speed\nA,0,0\n";
        let store =
            RecordStore::from_csv_reader(csv.as_bytes(), &LoadOptions::default(), "short").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].bat_speed, None);
        assert_eq!(store.all()[0].strikes, Some(0));
    }

    #[test]
    fn test_parse_json_rows() {
        let json = r#"[
            {"batter_name": "Juan SotoL", "balls": 0, "strikes": 2, "bat_speed": 75.5, "attack_angle": "10.5", "swing_path_tilt": null, "bb_type": "line_drive"},
            {"batter_name": "Juan SotoL", "balls": "0", "strikes": 0.0, "bat_speed": "n/a"},
            42
        ]"#;
        let store = RecordStore::from_json_str(json, &LoadOptions::default(), "rows.json").unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().failed, 1);

        let first = &store.all()[0];
        assert_eq!(first.batter_name, "Juan Soto");
        assert_eq!(first.strikes, Some(2));
        assert_eq!(first.attack_angle, Some(10.5));
        assert_eq!(first.swing_path_tilt, None);
        assert_eq!(
            first.extras.get("bb_type"),
            Some(&FieldValue::Text("line_drive".to_string()))
        );

        let second = &store.all()[1];
        assert_eq!(second.balls, Some(0));
        assert_eq!(second.strikes, Some(0));
        assert_eq!(second.bat_speed, None);
    }

    #[test]
    fn test_json_root_must_be_array() {
        let err = RecordStore::from_json_str("{\"a\": 1}", &LoadOptions::default(), "obj.json")
            .unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn test_load_dispatches_on_extension() -> Result<()> {
        let mut csv_file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        csv_file.write_all(SAMPLE_CSV.as_bytes())?;
        let store = RecordStore::load(csv_file.path(), &LoadOptions::default())?;
        assert_eq!(store.len(), 3);

        let txt_file = NamedTempFile::new()?;
        let err = RecordStore::load(txt_file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RecordStore::load(
            Path::new("/nonexistent/combined_data.csv"),
            &LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
        assert!(err.is_recoverable());
    }
}
