//! Scheduler loop against mock and loopback ports.

use core::ops::ControlFlow;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use doorlock::app::ports::UpdateOutcome;
use doorlock::app::service::MonitorService;
use doorlock::drivers::delay::StdDelay;
use doorlock::drivers::watchdog::Watchdog;
use doorlock::fsm::LockState;
use doorlock::http::server::HttpServer;
use doorlock::ota::receiver::OtaReceiver;
use doorlock::ota::UpdateEvent;
use doorlock::scheduler::{LoopExit, LoopPorts, RestartReason, Scheduler};

use crate::mock_hw::{
    test_config, CountingBeat, RecordingDelay, ScriptedSampler, ScriptedUpdate, SnapshotRequests,
};

#[test]
fn every_iteration_samples_beats_and_sleeps_once() {
    let mut svc = MonitorService::new(&test_config()).unwrap();
    let update = ScriptedUpdate::idle()
        .then(&[UpdateEvent::Started], UpdateOutcome::InProgress)
        .then(&[UpdateEvent::Progress { percent: 40 }], UpdateOutcome::InProgress)
        .then(&[UpdateEvent::Progress { percent: 80 }], UpdateOutcome::InProgress);
    let mut ports = LoopPorts {
        update,
        requests: SnapshotRequests::default(),
        sampler: ScriptedSampler::new(&[1950]),
        delay: RecordingDelay::default(),
        heartbeat: CountingBeat::default(),
    };
    let mut sched = Scheduler::new(100);

    for _ in 0..10 {
        assert!(matches!(sched.step(&mut svc, &mut ports), ControlFlow::Continue(_)));
    }

    assert_eq!(ports.sampler.reads, 10);
    assert_eq!(ports.heartbeat.beats, 10);
    assert_eq!(ports.delay.calls, 10);
    assert_eq!(ports.delay.total_ms, 1000);
    assert_eq!(ports.update.calls, 10);
    assert_eq!(svc.sample_count(), 10);
}

#[test]
fn update_events_are_visible_to_same_iteration_request() {
    let mut svc = MonitorService::new(&test_config()).unwrap();
    let update = ScriptedUpdate::idle().then(&[UpdateEvent::Started], UpdateOutcome::InProgress);
    let mut ports = LoopPorts {
        update,
        requests: SnapshotRequests::default(),
        sampler: ScriptedSampler::new(&[2050]),
        delay: RecordingDelay::default(),
        heartbeat: CountingBeat::default(),
    };
    let mut sched = Scheduler::new(1);

    let _ = sched.step(&mut svc, &mut ports);

    // The request duty runs before sampling: it sees the update line but
    // not the lock transition of the same iteration.
    assert_eq!(ports.requests.bodies[0], "\u{1f504} OTA update start...\n");
    assert_eq!(
        svc.log().snapshot(),
        "\u{1f504} OTA update start...\n\u{1f512} LOCKED (2050)\n"
    );
}

#[test]
fn finished_update_exits_for_restart() {
    let mut svc = MonitorService::new(&test_config()).unwrap();
    let update = ScriptedUpdate::idle()
        .then(&[UpdateEvent::Started], UpdateOutcome::InProgress)
        .then(
            &[UpdateEvent::Progress { percent: 100 }, UpdateEvent::Finished],
            UpdateOutcome::RestartRequired,
        );
    let mut ports = LoopPorts {
        update,
        requests: SnapshotRequests::default(),
        sampler: ScriptedSampler::new(&[1000]),
        delay: RecordingDelay::default(),
        heartbeat: CountingBeat::default(),
    };
    let mut sched = Scheduler::new(1);

    let exit = sched.run(&mut svc, &mut ports);
    assert_eq!(exit, LoopExit::Restart(RestartReason::UpdateInstalled));
    assert!(svc.log().snapshot().ends_with("\u{2705} OTA update complete!\n"));
    assert_eq!(ports.sampler.reads, 1);
}

#[test]
fn live_loop_serves_logs_while_sampling() {
    let mut svc = MonitorService::new(&test_config()).unwrap();
    let http = HttpServer::bind(0, Duration::from_millis(250)).unwrap();
    let http_port = http.port().unwrap();
    let ota = OtaReceiver::bind(0, Duration::from_millis(50)).unwrap();

    let mut ports = LoopPorts {
        update: ota,
        requests: http,
        sampler: ScriptedSampler::new(&[1950, 2050]),
        delay: StdDelay,
        heartbeat: Watchdog::new(10_000),
    };
    let mut sched = Scheduler::new(1);

    // Two iterations so the LOCKED line is in the log before any client.
    for _ in 0..2 {
        let _ = sched.step(&mut svc, &mut ports);
    }
    assert_eq!(svc.state(), LockState::Locked);

    let client = thread::spawn(move || {
        let mut s = TcpStream::connect(("127.0.0.1", http_port)).unwrap();
        s.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        s.write_all(b"GET /logs HTTP/1.1\r\n\r\n").unwrap();
        let mut out = String::new();
        s.read_to_string(&mut out).unwrap();
        out
    });

    let mut served = false;
    for _ in 0..1000 {
        if let ControlFlow::Continue(r) = sched.step(&mut svc, &mut ports) {
            if r.served.is_some() {
                served = true;
                break;
            }
        }
    }
    assert!(served);
    let response = client.join().unwrap();
    assert!(response.ends_with("\r\n\r\n\u{1f512} LOCKED (2050)\n"));
    assert_eq!(ports.heartbeat.feeds() as u64, sched.iterations());
}
