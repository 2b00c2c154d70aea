//! Core data types: pitch rows, metric fields, counts and selection state.

pub mod pitch;
pub mod selection;

pub use pitch::{FieldValue, MetricField, PitchRecord};
pub use selection::{CountChoice, SelectionState};
