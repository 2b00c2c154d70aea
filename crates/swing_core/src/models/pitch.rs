//! # Pitch Record
//!
//! One row of the swing dataset. The four swing metrics and the count are
//! typed fields; every other source column is kept in `extras`, auto-typed the
//! way the loader found it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Auto-typed cell value for columns without a dedicated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Missing,
}

impl FieldValue {
    /// Coerce a raw text cell.
    ///
    /// Blank, `NA`, `NaN` and `null` become `Missing`; anything that parses as
    /// a finite number becomes `Number`; the rest is kept as trimmed text.
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_missing_token(trimmed) {
            return FieldValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => FieldValue::Number(v),
            Ok(_) => FieldValue::Missing,
            Err(_) => FieldValue::Text(trimmed.to_string()),
        }
    }

    /// Numeric view of the value. Text and missing cells are absent.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

fn is_missing_token(s: &str) -> bool {
    s.is_empty()
        || s.eq_ignore_ascii_case("na")
        || s.eq_ignore_ascii_case("nan")
        || s.eq_ignore_ascii_case("null")
}

/// Parse an optional numeric cell. Blank or non-numeric text is absent, never zero.
pub fn parse_metric(raw: &str) -> Option<f64> {
    FieldValue::from_cell(raw).as_f64()
}

/// Parse a ball/strike cell. Accepts `2` and `2.0`; rejects fractions and negatives.
pub fn parse_count(raw: &str) -> Option<u32> {
    let v = parse_metric(raw)?;
    count_from_f64(v)
}

pub(crate) fn count_from_f64(v: f64) -> Option<u32> {
    if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
        Some(v as u32)
    } else {
        None
    }
}

/// Swing metrics displayed by the dashboard gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    AttackAngle,
    BatSpeed,
    SwingPathTilt,
    AttackDirection,
}

impl MetricField {
    pub const ALL: [MetricField; 4] = [
        MetricField::AttackAngle,
        MetricField::BatSpeed,
        MetricField::SwingPathTilt,
        MetricField::AttackDirection,
    ];

    /// Source column name.
    pub fn column(&self) -> &'static str {
        match self {
            MetricField::AttackAngle => "attack_angle",
            MetricField::BatSpeed => "bat_speed",
            MetricField::SwingPathTilt => "swing_path_tilt",
            MetricField::AttackDirection => "attack_direction",
        }
    }

    /// Gauge title.
    pub fn title(&self) -> &'static str {
        match self {
            MetricField::AttackAngle => "Attack Angle (°)",
            MetricField::BatSpeed => "Bat Speed (mph)",
            MetricField::SwingPathTilt => "Swing Path Tilt (°)",
            MetricField::AttackDirection => "Direction Angle (°)",
        }
    }

    /// Unit suffix appended to formatted values.
    pub fn unit(&self) -> &'static str {
        match self {
            MetricField::BatSpeed => " mph",
            _ => "°",
        }
    }

    /// Signed fields are displayed on a `[-bound, +bound]` range.
    pub fn is_signed(&self) -> bool {
        matches!(self, MetricField::SwingPathTilt)
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == column)
    }
}

impl AsRef<str> for MetricField {
    fn as_ref(&self) -> &str {
        self.column()
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One pitch with the batter's swing measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchRecord {
    /// Trimmed canonical batter name
    pub batter_name: String,
    pub balls: Option<u32>,
    pub strikes: Option<u32>,
    /// Degrees
    pub attack_angle: Option<f64>,
    /// mph
    pub bat_speed: Option<f64>,
    /// Degrees, signed
    pub swing_path_tilt: Option<f64>,
    /// Degrees
    pub attack_direction: Option<f64>,
    /// Remaining source columns
    #[serde(default)]
    pub extras: BTreeMap<String, FieldValue>,
}

impl PitchRecord {
    /// Row with a name and count only; metrics start absent.
    pub fn new(batter_name: impl Into<String>, balls: u32, strikes: u32) -> Self {
        Self {
            batter_name: batter_name.into().trim().to_string(),
            balls: Some(balls),
            strikes: Some(strikes),
            attack_angle: None,
            bat_speed: None,
            swing_path_tilt: None,
            attack_direction: None,
            extras: BTreeMap::new(),
        }
    }

    /// Builder-style metric setter, mostly for tests and adapters.
    pub fn with_metric(mut self, field: MetricField, value: f64) -> Self {
        *self.metric_slot(field) = Some(value);
        self
    }

    pub fn metric(&self, field: MetricField) -> Option<f64> {
        let v = match field {
            MetricField::AttackAngle => self.attack_angle,
            MetricField::BatSpeed => self.bat_speed,
            MetricField::SwingPathTilt => self.swing_path_tilt,
            MetricField::AttackDirection => self.attack_direction,
        };
        v.filter(|x| x.is_finite())
    }

    pub(crate) fn metric_slot(&mut self, field: MetricField) -> &mut Option<f64> {
        match field {
            MetricField::AttackAngle => &mut self.attack_angle,
            MetricField::BatSpeed => &mut self.bat_speed,
            MetricField::SwingPathTilt => &mut self.swing_path_tilt,
            MetricField::AttackDirection => &mut self.attack_direction,
        }
    }

    /// Look up any numeric field by column name.
    ///
    /// Typed metrics and the count columns win over extras. Non-finite,
    /// text and missing values are all `None`.
    pub fn numeric(&self, field: &str) -> Option<f64> {
        if let Some(metric) = MetricField::from_column(field) {
            return self.metric(metric);
        }
        match field {
            "balls" => self.balls.map(f64::from),
            "strikes" => self.strikes.map(f64::from),
            _ => self.extras.get(field).and_then(FieldValue::as_f64),
        }
    }

    /// Whether this row was thrown at the given ball/strike count.
    pub fn is_count(&self, balls: u32, strikes: u32) -> bool {
        self.balls == Some(balls) && self.strikes == Some(strikes)
    }
}
