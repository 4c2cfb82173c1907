//! Cooperative control loop.
//!
//! One [`ControlLoop::iterate`] call is one pass of the firmware's main
//! loop:
//!
//! ```text
//!  1. broker session   ensure_connected (blocks while the broker is down)
//!  2. inbound          drain decoded commands into AppService
//!  3. scheduler        Sample ─▶ on_sample · ClockResync ─▶ clock.resync
//!  4. display          redraw if dirty or the safety interval elapsed
//! ```
//!
//! State changes are published inside steps 2 and 3, so they always reach
//! the broker before the redraw of the same iteration.

use embedded_hal::delay::DelayNs;
use log::info;

use crate::app::ports::{
    ClockPort, DisplayPort, EventSink, FanPort, Job, SchedulerDelegate, SensorPort, StatePublisher,
};
use crate::app::service::AppService;
use crate::config::SystemConfig;
use crate::display::RedrawPolicy;
use crate::mqtt::{MessagingGateway, MqttTransport};
use crate::scheduler::Scheduler;

// ── Scheduler delegate ────────────────────────────────────────
//
// Bridges the scheduler (which only keeps time) to the application
// service and the clock.

struct JobRunner<'a, H, P, C, S> {
    app: &'a mut AppService,
    hw: &'a mut H,
    publisher: &'a mut P,
    clock: &'a mut C,
    sink: &'a mut S,
    samples: u32,
}

impl<H, P, C, S> SchedulerDelegate for JobRunner<'_, H, P, C, S>
where
    H: SensorPort + FanPort,
    P: StatePublisher,
    C: ClockPort,
    S: EventSink,
{
    fn on_job_due(&mut self, job: Job) {
        match job {
            Job::Sample => {
                self.samples += 1;
                self.app.on_sample(&mut *self.hw, &mut *self.publisher, &mut *self.sink);
            }
            Job::ClockResync => self.clock.resync(),
        }
    }
}

/// What one iteration did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationReport {
    pub reconnected: bool,
    pub commands: u32,
    pub samples: u32,
    pub redrawn: bool,
}

pub struct ControlLoop {
    app: AppService,
    scheduler: Scheduler,
    redraw: RedrawPolicy,
}

impl ControlLoop {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            scheduler: Scheduler::from_config(&config),
            redraw: RedrawPolicy::new(config.redraw_interval_ms),
            app: AppService::new(config),
        }
    }

    pub fn start(&mut self, hw: &mut impl FanPort, sink: &mut impl EventSink) {
        self.app.start(hw, sink);
        info!("Control loop ready ({} jobs)", self.scheduler.active_count());
    }

    pub fn app(&self) -> &AppService {
        &self.app
    }

    /// Run one loop iteration at monotonic time `now_ms`.
    #[allow(clippy::too_many_arguments)]
    pub fn iterate<T: MqttTransport>(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + FanPort),
        gateway: &mut MessagingGateway<T>,
        clock: &mut impl ClockPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
        delay: &mut impl DelayNs,
    ) -> IterationReport {
        let mut report = IterationReport {
            reconnected: gateway.ensure_connected(&self.app.snapshot(), delay),
            ..Default::default()
        };

        while let Some(cmd) = gateway.poll() {
            report.commands += 1;
            self.app.handle_command(cmd, hw, gateway, &*clock, sink);
        }

        let mut runner = JobRunner {
            app: &mut self.app,
            hw,
            publisher: gateway,
            clock,
            sink,
            samples: 0,
        };
        self.scheduler.tick(now_ms, &mut runner);
        report.samples = runner.samples;

        if self.redraw.should_redraw(now_ms, self.app.is_dirty()) {
            self.app.take_dirty();
            display.render(&self.app.display_model().layout());
            self.redraw.mark_drawn(now_ms);
            report.redrawn = true;
        }
        report
    }
}
