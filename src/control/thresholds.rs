//! Hysteresis threshold store.
//!
//! Holds the activate / deactivate pair and keeps
//! `activate - deactivate >= min_gap` after every mutation.  A proposal that
//! would break the ordering is not rejected: it is pulled to the nearest
//! value that keeps the gap, and the effective value is returned so the
//! caller can publish what actually took effect.
//!
//! Both thresholds live inside the probe envelope
//! `[sensor_min_c, sensor_max_c]`; a threshold the probe can never report
//! is pulled back to the envelope edge before the gap is applied.

use log::info;

use crate::config::SystemConfig;

/// The two hysteresis thresholds (°C).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub activate_c: f32,
    pub deactivate_c: f32,
}

pub struct ThresholdStore {
    current: Thresholds,
    min_gap_c: f32,
    min_c: f32,
    max_c: f32,
}

impl ThresholdStore {
    /// Cold-start store seeded from the compiled-in defaults.
    ///
    /// Defaults that violate the gap are repaired by lowering deactivate.
    pub fn new(config: &SystemConfig) -> Self {
        let mut store = Self {
            current: Thresholds {
                activate_c: config.sensor_max_c,
                deactivate_c: config.sensor_min_c,
            },
            min_gap_c: config.min_gap_c.max(0.0),
            min_c: config.sensor_min_c,
            max_c: config.sensor_max_c,
        };
        store.current.activate_c = store.bounded(config.default_activate_c, store.min_gap_c, 0.0);
        store.current.deactivate_c = store
            .bounded(config.default_deactivate_c, 0.0, store.min_gap_c)
            .min(store.current.activate_c - store.min_gap_c);
        store
    }

    pub fn get(&self) -> Thresholds {
        self.current
    }

    /// Set the activation threshold; returns the value that took effect.
    pub fn set_activate(&mut self, proposed_c: f32) -> f32 {
        let floor = self.current.deactivate_c + self.min_gap_c;
        let bounded = self.bounded(proposed_c, self.min_gap_c, 0.0);
        let effective = if bounded >= floor { bounded } else { floor };
        if effective != proposed_c {
            info!(
                "Thresholds: activate {:.2} clamped to {:.2} (deactivate {:.2})",
                proposed_c, effective, self.current.deactivate_c
            );
        }
        self.current.activate_c = effective;
        effective
    }

    /// Set the deactivation threshold; returns the value that took effect.
    pub fn set_deactivate(&mut self, proposed_c: f32) -> f32 {
        let ceiling = self.current.activate_c - self.min_gap_c;
        let bounded = self.bounded(proposed_c, 0.0, self.min_gap_c);
        let effective = if bounded <= ceiling { bounded } else { ceiling };
        if effective != proposed_c {
            info!(
                "Thresholds: deactivate {:.2} clamped to {:.2} (activate {:.2})",
                proposed_c, effective, self.current.activate_c
            );
        }
        self.current.deactivate_c = effective;
        effective
    }

    /// Pull `c` into `[min_c + low_margin, max_c - high_margin]`.
    fn bounded(&self, c: f32, low_margin: f32, high_margin: f32) -> f32 {
        c.max(self.min_c + low_margin).min(self.max_c - high_margin)
    }
}
