//! Cooperative interval scheduler.
//!
//! Keeps time for the periodic jobs of the control loop.  The scheduler
//! notifies a [`SchedulerDelegate`] when a job is due; the main loop
//! implements the delegate to do the actual work.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Control loop iteration                   │
//! │                                                              │
//! │  ┌───────────┐   ┌────────────────────┐   ┌───────────────┐  │
//! │  │ MQTT poll │──▶│ Scheduler.tick(now)│──▶│ Redraw policy │  │
//! │  └───────────┘   └─────────┬──────────┘   └───────────────┘  │
//! │                            │                                 │
//! │                            ▼                                 │
//! │              SchedulerDelegate.on_job_due(job)               │
//! │                 Sample ─▶ AppService.on_sample()             │
//! │            ClockResync ─▶ ClockPort.resync()                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Time is a free-running millisecond counter; all elapsed-time math uses
//! wrapping subtraction, so a counter rollover is harmless.

use crate::app::ports::{Job, SchedulerDelegate};
use crate::config::SystemConfig;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// A single schedule entry.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub job: Job,
    /// Period between fires (milliseconds).
    pub interval_ms: u32,
    /// Whether this schedule is currently enabled.
    pub enabled: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent schedules (stack-allocated).
const MAX_SCHEDULES: usize = 4;

/// The scheduler engine.
///
/// Decoupled from the work itself: when a schedule fires it invokes the
/// [`SchedulerDelegate`] callback.  This makes the scheduler independently
/// testable.
pub struct Scheduler {
    schedules: [Option<ScheduleEntry>; MAX_SCHEDULES],
}

/// Internal bookkeeping for a live schedule.
#[derive(Debug, Clone, Copy)]
struct ScheduleEntry {
    schedule: Schedule,
    /// Timestamp of the last fire; `None` means due on the next tick.
    last_fire_ms: Option<u32>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            schedules: [None; MAX_SCHEDULES],
        }
    }

    /// Sample and clock-resync jobs at the configured intervals.
    pub fn from_config(config: &SystemConfig) -> Self {
        let mut sched = Self::new();
        for (job, interval_ms) in [
            (Job::Sample, config.sample_interval_ms),
            (Job::ClockResync, config.clock_resync_interval_ms),
        ] {
            sched.add(Schedule {
                job,
                interval_ms,
                enabled: true,
            });
        }
        sched
    }

    /// Add a schedule.  Returns the slot index, or `None` if full.
    /// A new schedule is due on the next tick.
    pub fn add(&mut self, schedule: Schedule) -> Option<usize> {
        let (i, slot) = self
            .schedules
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())?;
        info!(
            "Scheduler: added '{}' every {} ms at slot {}",
            schedule.job.label(),
            schedule.interval_ms,
            i
        );
        *slot = Some(ScheduleEntry {
            schedule,
            last_fire_ms: None,
        });
        Some(i)
    }

    /// Tick the scheduler.  Call once per control-loop iteration.
    ///
    /// Each due job is reported to `delegate` once, even if several of its
    /// intervals have elapsed since the last tick.
    pub fn tick(&mut self, now_ms: u32, delegate: &mut dyn SchedulerDelegate) {
        for entry in self.schedules.iter_mut().flatten() {
            if !entry.schedule.enabled {
                continue;
            }
            let due = match entry.last_fire_ms {
                None => true,
                Some(last) => now_ms.wrapping_sub(last) >= entry.schedule.interval_ms,
            };
            if due {
                debug!("Scheduler: '{}' due at {} ms", entry.schedule.job.label(), now_ms);
                entry.last_fire_ms = Some(now_ms);
                delegate.on_job_due(entry.schedule.job);
            }
        }
    }

    /// Number of active (enabled) schedules.
    pub fn active_count(&self) -> usize {
        self.schedules
            .iter()
            .flatten()
            .filter(|e| e.schedule.enabled)
            .count()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
