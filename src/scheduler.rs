//! Cooperative main-loop scheduler.
//!
//! One thread, no preemption.  Every iteration runs the same duties in the
//! same order and then sleeps:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  1. UpdatePort::service    (bounded, events → log inline)    │
//! │  2. RequestPort::service_one (≤ 1 request, read-only log)    │
//! │  3. MonitorService::sense  (exactly 1 sample)                │
//! │  4. Heartbeat::beat        (watchdog)                        │
//! │  5. DelayNs::delay_ms      (fixed interval)                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop only ends through [`LoopExit`], which the caller turns into a
//! device restart.

use core::fmt;
use core::ops::ControlFlow;

use log::{info, warn};

use crate::app::ports::{DelayNs, Heartbeat, RequestPort, SamplerPort, Served, UpdateOutcome, UpdatePort};
use crate::app::service::MonitorService;
use crate::fsm::Transition;

// ═══════════════════════════════════════════════════════════════
//  Exit and report types
// ═══════════════════════════════════════════════════════════════

/// Why the device is about to reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// Station association failed during bring-up.
    ConnectivityFailed,
    /// A new firmware image was installed.
    UpdateInstalled,
}

impl fmt::Display for RestartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectivityFailed => write!(f, "WiFi connection failed"),
            Self::UpdateInstalled => write!(f, "firmware update installed"),
        }
    }
}

/// Terminal result of [`Scheduler::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Restart(RestartReason),
}

/// What one iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationReport {
    pub update: UpdateOutcome,
    pub served: Option<Served>,
    pub transition: Option<Transition>,
}

/// Everything the loop drives besides the device context.
pub struct LoopPorts<U, R, S, D, H> {
    pub update: U,
    pub requests: R,
    pub sampler: S,
    pub delay: D,
    pub heartbeat: H,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

pub struct Scheduler {
    interval_ms: u32,
    iterations: u64,
}

impl Scheduler {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            iterations: 0,
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Completed iterations.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Run one iteration.
    ///
    /// A finished firmware update breaks out right after the update duty;
    /// the remaining duties are skipped because the device is about to
    /// reset.
    pub fn step<U, R, S, D, H>(
        &mut self,
        service: &mut MonitorService,
        ports: &mut LoopPorts<U, R, S, D, H>,
    ) -> ControlFlow<LoopExit, IterationReport>
    where
        U: UpdatePort,
        R: RequestPort,
        S: SamplerPort,
        D: DelayNs,
        H: Heartbeat,
    {
        let update = ports.update.service(service);
        if update == UpdateOutcome::RestartRequired {
            warn!("Scheduler: update installed after {} iterations", self.iterations);
            return ControlFlow::Break(LoopExit::Restart(RestartReason::UpdateInstalled));
        }

        let served = ports.requests.service_one(service.log());
        let transition = service.sense(&mut ports.sampler);
        ports.heartbeat.beat();
        ports.delay.delay_ms(self.interval_ms);

        self.iterations = self.iterations.wrapping_add(1);
        ControlFlow::Continue(IterationReport {
            update,
            served,
            transition,
        })
    }

    /// Loop until a terminal exit.
    pub fn run<U, R, S, D, H>(
        &mut self,
        service: &mut MonitorService,
        ports: &mut LoopPorts<U, R, S, D, H>,
    ) -> LoopExit
    where
        U: UpdatePort,
        R: RequestPort,
        S: SamplerPort,
        D: DelayNs,
        H: Heartbeat,
    {
        info!("Scheduler: running every {} ms", self.interval_ms);
        loop {
            if let ControlFlow::Break(exit) = self.step(service, ports) {
                return exit;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::EventSink;
    use crate::config::DeviceConfig;
    use crate::eventlog::EventLog;
    use crate::fsm::{LockState, RawSample};
    use crate::http::routes::Route;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Trace = Rc<RefCell<Vec<&'static str>>>;

    struct Update(Trace, Vec<UpdateOutcome>);
    impl UpdatePort for Update {
        fn service(&mut self, _sink: &mut dyn EventSink) -> UpdateOutcome {
            self.0.borrow_mut().push("update");
            if self.1.is_empty() {
                UpdateOutcome::Idle
            } else {
                self.1.remove(0)
            }
        }
    }

    struct Requests(Trace);
    impl RequestPort for Requests {
        fn service_one(&mut self, _log: &EventLog) -> Option<Served> {
            self.0.borrow_mut().push("http");
            Some(Served {
                route: Route::Logs,
                status: 200,
            })
        }
    }

    struct Sampler(Trace, u16);
    impl SamplerPort for Sampler {
        fn sample(&mut self) -> RawSample {
            self.0.borrow_mut().push("sample");
            RawSample(self.1)
        }
    }

    struct Delay(Trace, u32);
    impl DelayNs for Delay {
        fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().push("sleep");
            self.1 = ns / 1_000_000;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.0.borrow_mut().push("sleep");
            self.1 = ms;
        }
    }

    struct Beat(Trace);
    impl Heartbeat for Beat {
        fn beat(&mut self) {
            self.0.borrow_mut().push("beat");
        }
    }

    fn service() -> MonitorService {
        let mut cfg = DeviceConfig::default();
        cfg.wifi_ssid.push_str("Net").unwrap();
        MonitorService::new(&cfg).unwrap()
    }

    fn ports(
        trace: &Trace,
        outcomes: Vec<UpdateOutcome>,
        sample: u16,
    ) -> LoopPorts<Update, Requests, Sampler, Delay, Beat> {
        LoopPorts {
            update: Update(trace.clone(), outcomes),
            requests: Requests(trace.clone()),
            sampler: Sampler(trace.clone(), sample),
            delay: Delay(trace.clone(), 0),
            heartbeat: Beat(trace.clone()),
        }
    }

    #[test]
    fn duties_run_in_fixed_order() {
        let trace = Trace::default();
        let mut p = ports(&trace, vec![], 1000);
        let mut svc = service();
        let mut sched = Scheduler::new(100);

        let report = sched.step(&mut svc, &mut p);
        assert!(matches!(report, ControlFlow::Continue(_)));
        assert_eq!(*trace.borrow(), ["update", "http", "sample", "beat", "sleep"]);
        assert_eq!(p.delay.1, 100);
        assert_eq!(sched.iterations(), 1);
    }

    #[test]
    fn one_sample_per_iteration_while_update_busy() {
        let trace = Trace::default();
        let mut p = ports(&trace, vec![UpdateOutcome::InProgress; 5], 2050);
        let mut svc = service();
        let mut sched = Scheduler::new(1);

        for _ in 0..5 {
            let _ = sched.step(&mut svc, &mut p);
        }
        assert_eq!(svc.sample_count(), 5);
        assert_eq!(trace.borrow().iter().filter(|d| **d == "sample").count(), 5);
        assert_eq!(svc.state(), LockState::Locked);
        assert_eq!(svc.transition_count(), 1);
    }

    #[test]
    fn report_carries_transition_and_request() {
        let trace = Trace::default();
        let mut p = ports(&trace, vec![], 2050);
        let mut svc = service();
        let mut sched = Scheduler::new(1);

        let ControlFlow::Continue(report) = sched.step(&mut svc, &mut p) else {
            panic!("unexpected exit");
        };
        assert_eq!(report.update, UpdateOutcome::Idle);
        assert_eq!(report.served.map(|s| s.status), Some(200));
        assert_eq!(report.transition.map(|t| t.to), Some(LockState::Locked));
    }

    #[test]
    fn installed_update_ends_the_loop() {
        let trace = Trace::default();
        let outcomes = vec![
            UpdateOutcome::InProgress,
            UpdateOutcome::InProgress,
            UpdateOutcome::RestartRequired,
        ];
        let mut p = ports(&trace, outcomes, 1000);
        let mut svc = service();
        let mut sched = Scheduler::new(1);

        let exit = sched.run(&mut svc, &mut p);
        assert_eq!(exit, LoopExit::Restart(RestartReason::UpdateInstalled));
        assert_eq!(sched.iterations(), 2);
        assert_eq!(trace.borrow().last(), Some(&"update"));
    }
}
