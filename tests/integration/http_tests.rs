//! HttpServer over loopback sockets.
//!
//! A client thread sends one raw request; the test thread plays the
//! scheduler and polls `service_one` until it reports a served request.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use doorlock::app::ports::RequestPort;
use doorlock::eventlog::EventLog;
use doorlock::http::routes::Route;
use doorlock::http::server::HttpServer;

fn exchange(log: &EventLog, raw: &'static [u8]) -> (doorlock::app::ports::Served, String) {
    let mut server = HttpServer::bind(0, Duration::from_millis(250)).unwrap();
    let port = server.port().unwrap();

    let client = thread::spawn(move || {
        let mut s = TcpStream::connect(("127.0.0.1", port)).unwrap();
        s.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        s.write_all(raw).unwrap();
        let mut out = String::new();
        s.read_to_string(&mut out).unwrap();
        out
    });

    let mut served = None;
    for _ in 0..500 {
        served = server.service_one(log);
        if served.is_some() {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    let response = client.join().unwrap();
    (served.expect("request served"), response)
}

fn log_abc() -> EventLog {
    let mut log = EventLog::new(4000, 1500);
    for line in ["a", "b", "c"] {
        log.append(line);
    }
    log
}

fn body(response: &str) -> &str {
    response.split_once("\r\n\r\n").map_or("", |(_, b)| b)
}

#[test]
fn logs_returns_exact_snapshot_uncached() {
    let (served, resp) = exchange(&log_abc(), b"GET /logs HTTP/1.1\r\nHost: door\r\n\r\n");
    assert_eq!(served.route, Route::Logs);
    assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(resp.contains("Content-Type: text/plain; charset=utf-8\r\n"));
    assert!(resp.contains("Cache-Control: no-store\r\n"));
    assert!(resp.contains("Connection: close\r\n"));
    assert_eq!(body(&resp), "a\nb\nc\n");
}

#[test]
fn query_string_is_ignored() {
    let (served, resp) = exchange(&log_abc(), b"GET /logs?since=5 HTTP/1.1\r\n\r\n");
    assert_eq!(served.route, Route::Logs);
    assert_eq!(body(&resp), "a\nb\nc\n");
}

#[test]
fn root_serves_viewer_page() {
    let (served, resp) = exchange(&log_abc(), b"GET / HTTP/1.1\r\n\r\n");
    assert_eq!(served.status, 200);
    assert!(resp.contains("Content-Type: text/html; charset=utf-8\r\n"));
    assert!(body(&resp).contains("Front Door Monitor"));
}

#[test]
fn favicon_is_no_content() {
    let (served, resp) = exchange(&log_abc(), b"GET /favicon.ico HTTP/1.1\r\n\r\n");
    assert_eq!(served.status, 204);
    assert_eq!(body(&resp), "");
}

#[test]
fn unknown_path_is_not_found() {
    let (served, resp) = exchange(&log_abc(), b"GET /secret HTTP/1.1\r\n\r\n");
    assert_eq!(served.status, 404);
    assert!(resp.contains("Content-Type: text/plain\r\n"));
    assert_eq!(body(&resp), "Not found. Try /\n");
}

#[test]
fn head_gets_headers_only() {
    let (served, resp) = exchange(&log_abc(), b"HEAD /logs HTTP/1.1\r\n\r\n");
    assert_eq!(served.status, 200);
    assert!(resp.contains("Content-Length: 6\r\n"));
    assert_eq!(body(&resp), "");
}

#[test]
fn malformed_request_is_400() {
    let (served, resp) = exchange(&log_abc(), b"BANANA\r\n\r\n");
    assert_eq!(served.route, Route::BadRequest);
    assert!(resp.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}

#[test]
fn no_pending_client_returns_none() {
    let mut server = HttpServer::bind(0, Duration::from_millis(50)).unwrap();
    assert_eq!(server.service_one(&log_abc()), None);
    assert_eq!(server.served(), 0);
}

#[test]
fn slow_client_cannot_hold_the_loop() {
    let budget = Duration::from_millis(250);
    let mut server = HttpServer::bind(0, budget).unwrap();
    let port = server.port().unwrap();

    // One byte every 50 ms: no read ever times out.
    let client = thread::spawn(move || {
        let mut s = TcpStream::connect(("127.0.0.1", port)).unwrap();
        for _ in 0..40 {
            if s.write_all(b"G").is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(50));
        }
    });

    let mut served = None;
    let mut slowest = Duration::ZERO;
    for _ in 0..500 {
        let started = Instant::now();
        served = server.service_one(&log_abc());
        slowest = slowest.max(started.elapsed());
        if served.is_some() {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    client.join().unwrap();

    assert!(slowest < budget * 2, "service_one blocked for {slowest:?}");
    assert_eq!(served.map(|s| s.status), Some(400));
}
