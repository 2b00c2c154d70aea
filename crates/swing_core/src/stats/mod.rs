//! # Statistics
//!
//! - `aggregate` - mean / extent / rounded scale bounds over row subsets
//! - `distribution` - percentile rank, histogram bins, Pearson correlation
//!
//! Nothing in here returns an error: empty or malformed input degrades to
//! documented neutral values so a gauge can always be drawn.

pub mod aggregate;
pub mod distribution;

pub use aggregate::{
    count_present, extent, mean, scale_max, scale_max_with_floor, symmetric_scale_max, Extent,
    ATTACK_ANGLE_SCALE_MAX,
};
pub use distribution::{histogram, pearson, percentile_rank, Bin};
