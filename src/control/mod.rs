//! Control parameters for the fan loop.

pub mod thresholds;
