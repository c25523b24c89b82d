//! OtaReceiver over loopback sockets.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use doorlock::app::ports::{UpdateOutcome, UpdatePort};
use doorlock::eventlog::EventLog;
use doorlock::ota::receiver::OtaReceiver;

fn push_image(port: u16, declared: u32, image: Vec<u8>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut s = TcpStream::connect(("127.0.0.1", port)).unwrap();
        s.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        s.write_all(&declared.to_le_bytes()).unwrap();
        s.write_all(&image).unwrap();
        s.shutdown(std::net::Shutdown::Write).unwrap();
        let mut reply = String::new();
        let _ = s.read_to_string(&mut reply);
        reply
    })
}

fn drive(rx: &mut OtaReceiver, log: &mut EventLog, max_calls: usize) -> UpdateOutcome {
    let mut outcome = UpdateOutcome::Idle;
    let mut busy = false;
    for _ in 0..max_calls {
        outcome = rx.service(log);
        match outcome {
            UpdateOutcome::RestartRequired => break,
            UpdateOutcome::InProgress => busy = true,
            UpdateOutcome::Idle if busy => break,
            UpdateOutcome::Idle => thread::sleep(Duration::from_millis(2)),
        }
    }
    outcome
}

#[test]
fn complete_image_is_acknowledged() {
    let mut rx = OtaReceiver::bind(0, Duration::from_millis(250)).unwrap();
    let port = rx.port().unwrap();
    let mut log = EventLog::new(4000, 1500);

    let image = vec![0xA5u8; 10_000];
    let client = push_image(port, image.len() as u32, image);

    assert_eq!(drive(&mut rx, &mut log, 2000), UpdateOutcome::RestartRequired);
    assert_eq!(client.join().unwrap(), "OK\n");

    let snap = log.snapshot();
    assert!(snap.starts_with("\u{1f504} OTA update start...\n"));
    assert!(snap.contains("Progress: 100%\n"));
    assert!(snap.ends_with("\u{2705} OTA update complete!\n"));
}

#[test]
fn truncated_image_reports_receive_error() {
    let mut rx = OtaReceiver::bind(0, Duration::from_millis(100)).unwrap();
    let port = rx.port().unwrap();
    let mut log = EventLog::new(4000, 1500);

    let client = push_image(port, 8192, vec![1u8; 1000]);

    assert_eq!(drive(&mut rx, &mut log, 2000), UpdateOutcome::Idle);
    assert_eq!(client.join().unwrap(), "ERR 3\n");
    assert!(log.snapshot().ends_with("\u{274c} OTA Error: 3\n"));
}

#[test]
fn oversized_declaration_is_begin_error() {
    let mut rx = OtaReceiver::bind(0, Duration::from_millis(100)).unwrap();
    let port = rx.port().unwrap();
    let mut log = EventLog::new(4000, 1500);

    let client = push_image(port, 64 * 1024 * 1024, Vec::new());

    let mut outcome = UpdateOutcome::Idle;
    for _ in 0..2000 {
        outcome = rx.service(&mut log);
        if !log.is_empty() {
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(outcome, UpdateOutcome::Idle);
    assert_eq!(client.join().unwrap(), "ERR 1\n");
    assert_eq!(log.snapshot(), "\u{274c} OTA Error: 1\n");
}
