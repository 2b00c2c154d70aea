//! Gauge readings
//!
//! A gauge needs a value (mean over the active subset), a range and the
//! league average. Ranges and league averages come from the full dataset and
//! are computed once after load; only the value changes per selection.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::data::RecordStore;
use crate::models::{MetricField, PitchRecord};
use crate::stats::{mean, scale_max_with_floor, symmetric_scale_max};

/// Range and league average of one gauge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeScale {
    pub field: MetricField,
    pub min: f64,
    pub max: f64,
    pub league_average: f64,
}

/// Per-field scales for the whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaugeScales {
    scales: Vec<GaugeScale>,
}

impl GaugeScales {
    /// Attack angle is fixed to `[0, 25]`, swing path tilt is symmetric
    /// around zero, the rest run from zero to the rounded-up max.
    pub fn compute(store: &RecordStore, config: &DashboardConfig) -> Self {
        let rows = store.all();
        let scales = MetricField::ALL
            .into_iter()
            .map(|field| {
                let (min, max) = if field.is_signed() {
                    let bound = symmetric_scale_max(
                        rows,
                        field,
                        config.scale_round_to,
                        config.tilt_fallback_max,
                    );
                    (-bound, bound)
                } else {
                    let max = scale_max_with_floor(
                        rows,
                        field,
                        config.scale_round_to,
                        config.scale_max_floor,
                    );
                    (0.0, max)
                };
                GaugeScale {
                    field,
                    min,
                    max,
                    league_average: mean(rows, field),
                }
            })
            .collect();
        Self { scales }
    }

    pub fn get(&self, field: MetricField) -> Option<&GaugeScale> {
        self.scales.iter().find(|s| s.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GaugeScale> {
        self.scales.iter()
    }
}

/// What a gauge renderer needs to draw one dial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeReading {
    pub field: MetricField,
    pub title: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    /// Mean over the active subset (0 when it has no values)
    pub value: f64,
    /// Mean over the full dataset
    pub league_average: f64,
    /// Rank of `value` among per-player means at the same count, `[0, 100]`.
    /// Only set when the subset is a single player's rows.
    #[serde(default)]
    pub percentile: Option<f64>,
}

impl GaugeReading {
    pub fn display_value(&self) -> String {
        format!("{:.1}{}", self.value, self.unit)
    }

    pub fn league_label(&self) -> String {
        format!("MLB Average: {:.1}{}", self.league_average, self.unit)
    }

    /// Position of `value` within `[min, max]`, clamped to `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Read one gauge for the given subset.
pub fn read_gauge<'a, I>(rows: I, scale: &GaugeScale) -> GaugeReading
where
    I: IntoIterator<Item = &'a PitchRecord>,
    I::IntoIter: 'a,
{
    GaugeReading {
        field: scale.field,
        title: scale.field.title().to_string(),
        unit: scale.field.unit().to_string(),
        min: scale.min,
        max: scale.max,
        value: mean(rows, scale.field),
        league_average: scale.league_average,
        percentile: None,
    }
}

/// Per-batter means of `field`, ascending. Batters without a value are left out.
pub fn player_means<'a, I>(rows: I, field: MetricField) -> Vec<f64>
where
    I: IntoIterator<Item = &'a PitchRecord>,
{
    let mut sums: FxHashMap<&str, (f64, usize)> = FxHashMap::default();
    for record in rows {
        if let Some(v) = record.metric(field) {
            let entry = sums.entry(record.batter_name.as_str()).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    let mut means: Vec<f64> = sums.into_values().map(|(sum, n)| sum / n as f64).collect();
    means.sort_unstable_by(f64::total_cmp);
    means
}
