//! Fan control state machine.
//!
//! Mode and actuator state are orthogonal:
//!
//! ```text
//! ┌───────────┬──────────────────────┬──────────────────────┐
//! │ FanMode   │ from Off             │ from On              │
//! ├───────────┼──────────────────────┼──────────────────────┤
//! │ Auto      │ On if t >= activate  │ Off if t <= deactiv. │
//! │ ForcedOn  │ On                   │ On                   │
//! │ ForcedOff │ Off                  │ Off                  │
//! └───────────┴──────────────────────┴──────────────────────┘
//! ```
//!
//! Each mode is one row in a fixed table of plain `fn` pointers (see
//! [`states`]).  [`evaluate`] is a pure function of its inputs; the
//! [`FanController`] wraps it so that a transition is reported exactly
//! once, which is what makes repeated evaluation side-effect free.

pub mod context;
pub mod states;

use log::info;

use crate::control::thresholds::Thresholds;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Control strategy selected over MQTT.
/// Must stay in sync with the table built in [`states::MODE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FanMode {
    Auto = 0,
    ForcedOn = 1,
    ForcedOff = 2,
}

impl FanMode {
    /// Total number of modes — used to size the table array.
    pub const COUNT: usize = 3;

    /// Parse a `fan/cmd` payload.  Case-insensitive; surrounding
    /// whitespace is ignored.  Anything else is `None`.
    pub fn parse(payload: &str) -> Option<Self> {
        let word = payload.trim();
        states::MODE_TABLE
            .iter()
            .find(|row| row.payload.eq_ignore_ascii_case(word))
            .map(|row| row.id)
    }

    /// Wire representation (`AUTO` / `ON` / `OFF`).
    pub fn as_payload(self) -> &'static str {
        states::MODE_TABLE[self as usize].payload
    }

    pub fn name(self) -> &'static str {
        states::MODE_TABLE[self as usize].name
    }
}

// ---------------------------------------------------------------------------
// Actuator state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanState {
    #[default]
    Off,
    On,
}

impl FanState {
    pub fn is_on(self) -> bool {
        self == Self::On
    }

    /// Wire representation (`ON` / `OFF`).
    pub fn as_payload(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl From<bool> for FanState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

// ---------------------------------------------------------------------------
// Table row
// ---------------------------------------------------------------------------

/// Decision function for one mode.
/// Receives the current actuator state, the last valid local reading (if
/// any was ever observed) and the thresholds; returns the target state.
pub type DecideFn = fn(FanState, Option<f32>, Thresholds) -> FanState;

/// Static descriptor for a single mode.
pub struct ModeDescriptor {
    pub id: FanMode,
    pub name: &'static str,
    pub payload: &'static str,
    pub decide: DecideFn,
}

/// Pure transition function.
pub fn evaluate(
    current: FanState,
    mode: FanMode,
    last_valid_c: Option<f32>,
    thresholds: Thresholds,
) -> FanState {
    (states::MODE_TABLE[mode as usize].decide)(current, last_valid_c, thresholds)
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// A state change produced by an evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: FanState,
    pub to: FanState,
}

/// Owns the current mode and actuator state.
#[derive(Debug)]
pub struct FanController {
    mode: FanMode,
    state: FanState,
}

impl Default for FanController {
    fn default() -> Self {
        Self::new()
    }
}

impl FanController {
    /// Cold start: automatic mode, fan off.
    pub fn new() -> Self {
        Self {
            mode: FanMode::Auto,
            state: FanState::Off,
        }
    }

    pub fn mode(&self) -> FanMode {
        self.mode
    }

    pub fn state(&self) -> FanState {
        self.state
    }

    pub fn set_mode(&mut self, mode: FanMode) {
        if mode != self.mode {
            info!("Fan mode: {} -> {}", self.mode.name(), mode.name());
        }
        self.mode = mode;
    }

    /// Run one evaluation pass.  Returns `Some` only when the actuator
    /// state actually changed.
    pub fn evaluate(&mut self, last_valid_c: Option<f32>, thresholds: Thresholds) -> Option<Transition> {
        let next = evaluate(self.state, self.mode, last_valid_c, thresholds);
        if next == self.state {
            return None;
        }
        let transition = Transition {
            from: self.state,
            to: next,
        };
        info!(
            "Fan transition: {:?} -> {:?} (mode={}, t={:?})",
            transition.from,
            transition.to,
            self.mode.name(),
            last_valid_c
        );
        self.state = next;
        Some(transition)
    }
}
