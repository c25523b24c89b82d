//! MonitorService → LockFsm → EventLog pipeline.

use doorlock::app::events::AppEvent;
use doorlock::app::ports::EventSink;
use doorlock::app::service::MonitorService;
use doorlock::fsm::{LockState, RawSample};

use crate::mock_hw::{test_config, ScriptedSampler};

fn run(svc: &mut MonitorService, sampler: &mut ScriptedSampler, n: usize) {
    for _ in 0..n {
        svc.sense(sampler);
    }
}

#[test]
fn documented_sequence_logs_two_transitions() {
    let mut svc = MonitorService::new(&test_config()).unwrap();
    let mut sampler = ScriptedSampler::new(&[1950, 2050, 1950, 1850]);
    run(&mut svc, &mut sampler, 4);

    assert_eq!(
        svc.log().snapshot(),
        "\u{1f512} LOCKED (2050)\n\u{1f513} UNLOCKED (1850)\n"
    );
    assert_eq!(svc.state(), LockState::Unlocked);
    assert_eq!(svc.transition_count(), 2);
}

#[test]
fn boundary_values_do_not_transition() {
    let mut svc = MonitorService::new(&test_config()).unwrap();
    let mut sampler = ScriptedSampler::new(&[2000, 2001, 1900, 1899]);

    svc.sense(&mut sampler);
    assert_eq!(svc.state(), LockState::Unlocked, "2000 is not above 2000");
    svc.sense(&mut sampler);
    assert_eq!(svc.state(), LockState::Locked);
    svc.sense(&mut sampler);
    assert_eq!(svc.state(), LockState::Locked, "1900 is not below 1900");
    svc.sense(&mut sampler);
    assert_eq!(svc.state(), LockState::Unlocked);
}

#[test]
fn custom_thresholds_apply() {
    let mut cfg = test_config();
    cfg.locked_at = 3000;
    cfg.unlocked_at = 1000;
    let mut svc = MonitorService::new(&cfg).unwrap();
    let mut sampler = ScriptedSampler::new(&[2500, 3001, 1500, 999]);

    svc.sense(&mut sampler);
    assert_eq!(svc.state(), LockState::Unlocked);
    svc.sense(&mut sampler);
    assert_eq!(svc.state(), LockState::Locked);
    svc.sense(&mut sampler);
    assert_eq!(svc.state(), LockState::Locked);
    svc.sense(&mut sampler);
    assert_eq!(svc.state(), LockState::Unlocked);
}

#[test]
fn log_stays_bounded_under_chatter() {
    let mut cfg = test_config();
    cfg.log_capacity = 200;
    cfg.log_trim_target = 80;
    let mut svc = MonitorService::new(&cfg).unwrap();

    let pattern: Vec<u16> = (0..200).map(|i| if i % 2 == 0 { 4000 } else { 100 }).collect();
    let mut sampler = ScriptedSampler::new(&pattern);
    run(&mut svc, &mut sampler, pattern.len());

    let snap = svc.log().snapshot();
    assert!(svc.log().len() <= 200 + 32);
    assert!(snap.ends_with("\u{1f513} UNLOCKED (100)\n"));
    assert!(
        snap.starts_with("\u{1f512}") || snap.starts_with("\u{1f513}"),
        "snapshot must start on a line boundary: {snap:?}"
    );
    assert!(svc.log().evictions() > 0);
    assert_eq!(svc.transition_count(), 200);
}

#[test]
fn boot_milestones_precede_transitions() {
    let mut svc = MonitorService::new(&test_config()).unwrap();
    svc.emit(&AppEvent::WifiConnected("10.0.0.7".parse().unwrap()));
    svc.emit(&AppEvent::UpdateReady);
    svc.emit(&AppEvent::WebReady);
    svc.emit(&AppEvent::SetupComplete);
    let mut hostname = heapless::String::new();
    hostname.push_str("frontdoor").unwrap();
    svc.emit(&AppEvent::Running { hostname });

    let mut sampler = ScriptedSampler::new(&[2100]);
    svc.sense(&mut sampler);

    let lines: Vec<&str> = svc.log().snapshot().lines().collect();
    assert_eq!(
        lines,
        [
            "\u{2705} Wi-Fi connected! IP: 10.0.0.7",
            "\u{1f680} OTA Ready",
            "\u{1f310} Web log UI at /  (live logs at /logs)",
            "Setup complete.",
            "Front door lock monitor is running as: frontdoor",
            "\u{1f512} LOCKED (2100)",
        ]
    );
    assert_eq!(svc.last_sample(), Some(RawSample(2100)));
}
