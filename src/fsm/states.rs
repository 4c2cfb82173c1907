//! Per-mode decision functions and the mode table.
//!
//! Each mode is one plain `fn` pointer — no closures, no dynamic dispatch,
//! no heap.
//!
//! ```text
//!  AUTO ──[t >= activate]──▶ ON ──[t <= deactivate]──▶ OFF
//!  ON   ──────────────────▶ ON   (always)
//!  OFF  ──────────────────▶ OFF  (always)
//! ```

use super::{FanMode, FanState, ModeDescriptor};
use crate::control::thresholds::Thresholds;

/// Static mode table, indexed by `FanMode as usize`.
pub const MODE_TABLE: [ModeDescriptor; FanMode::COUNT] = [
    // Index 0 — Auto
    ModeDescriptor {
        id: FanMode::Auto,
        name: "Auto",
        payload: "AUTO",
        decide: auto_decide,
    },
    // Index 1 — ForcedOn
    ModeDescriptor {
        id: FanMode::ForcedOn,
        name: "ForcedOn",
        payload: "ON",
        decide: forced_on_decide,
    },
    // Index 2 — ForcedOff
    ModeDescriptor {
        id: FanMode::ForcedOff,
        name: "ForcedOff",
        payload: "OFF",
        decide: forced_off_decide,
    },
];

// ═══════════════════════════════════════════════════════════════════════════
//  AUTO — hysteresis over the last valid local reading
// ═══════════════════════════════════════════════════════════════════════════

fn auto_decide(current: FanState, last_valid_c: Option<f32>, t: Thresholds) -> FanState {
    // Never switch from an unknown temperature.
    let Some(celsius) = last_valid_c else {
        return current;
    };

    match current {
        FanState::Off if celsius >= t.activate_c => FanState::On,
        FanState::On if celsius <= t.deactivate_c => FanState::Off,
        _ => current,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  FORCED — operator override, reading is irrelevant
// ═══════════════════════════════════════════════════════════════════════════

fn forced_on_decide(_current: FanState, _last_valid_c: Option<f32>, _t: Thresholds) -> FanState {
    FanState::On
}

fn forced_off_decide(_current: FanState, _last_valid_c: Option<f32>, _t: Thresholds) -> FanState {
    FanState::Off
}
