//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (probe, relay, broker, display, clock, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use heapless::String;

use crate::display::DisplayLines;
use crate::error::{ActuatorError, SensorError};
use crate::fsm::context::STAMP_CAP;

use super::events::{AppEvent, Publication};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain a raw probe reading.
pub trait SensorPort {
    /// Run one blocking bus transaction and return the raw value in °C.
    /// Validation is the caller's job.
    fn read_probe(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Fan port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain drives the fan relay through this.
pub trait FanPort {
    /// Energise (`true`) or release (`false`) the fan relay.
    fn set_fan(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Last level written to the relay.
    fn is_fan_on(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// State publisher port (driven adapter: domain → broker)
// ───────────────────────────────────────────────────────────────

/// Outbound retained state.  Implemented by the messaging gateway.
///
/// Publishing is fire-and-forget from the domain's point of view: a
/// publication that cannot be delivered right now is restored by the
/// reconnect snapshot.
pub trait StatePublisher {
    fn publish(&mut self, publication: &Publication);
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Panel rendering.  Receives fully laid-out lines; drawing primitives
/// (fonts, positions, partial refresh) are the adapter's business.
pub trait DisplayPort {
    fn render(&mut self, lines: &DisplayLines);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock time for display stamps.
pub trait ClockPort {
    /// Local time as `HH:MM`, or `None` while the clock is unsynchronised.
    fn now_label(&self) -> Option<String<STAMP_CAP>>;

    /// Kick or re-check the time synchronisation.
    fn resync(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the control loop)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a job is due.
///
/// The [`Scheduler`](crate::scheduler::Scheduler) only keeps time; the
/// main loop implements this to run the actual work.
pub trait SchedulerDelegate {
    fn on_job_due(&mut self, job: Job);
}

/// Periodic jobs driven by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Sample the local probe and re-evaluate the fan.
    Sample,
    /// Re-check wall-clock synchronisation.
    ClockResync,
}

impl Job {
    pub const ALL: [Job; 2] = [Job::Sample, Job::ClockResync];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sample => "sample",
            Self::ClockResync => "clock-resync",
        }
    }
}
