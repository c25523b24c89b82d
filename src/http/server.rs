//! Single-connection HTTP/1.1 responder.
//!
//! Each [`service_one`](RequestPort::service_one) call accepts at most one
//! connection, answers it and closes it.  Reading the head stops once the
//! budget has elapsed since accept, whether or not bytes are still
//! arriving, so a slow client costs the loop at most one budget plus one
//! read timeout.

use std::time::{Duration, Instant};

use log::{debug, warn};

use super::request::{self, Method};
use super::routes::{respond, Route};
use crate::app::ports::{RequestPort, Served};
use crate::eventlog::EventLog;
use crate::net::tcp::{TcpTransport, TransportError};
use crate::net::transport::{AcceptPeer, Transport};

/// Largest request head read before giving up on a terminator.
pub const MAX_HEAD: usize = 1024;

pub struct HttpServer<T: Transport = TcpTransport> {
    transport: T,
    budget: Duration,
    head: Vec<u8>,
    served: u32,
}

impl HttpServer<TcpTransport> {
    pub fn bind(port: u16, io_timeout: Duration) -> Result<Self, TransportError> {
        let transport = TcpTransport::bind("HTTP", port, io_timeout)?;
        Ok(Self::new(transport, io_timeout))
    }

    pub fn port(&self) -> Option<u16> {
        self.transport.local_addr().ok().map(|a| a.port())
    }
}

impl<T: Transport + AcceptPeer> HttpServer<T> {
    pub fn new(transport: T, budget: Duration) -> Self {
        Self {
            transport,
            budget,
            head: Vec::with_capacity(MAX_HEAD),
            served: 0,
        }
    }

    /// Requests answered since boot.
    pub fn served(&self) -> u32 {
        self.served
    }
}

impl<T: Transport + AcceptPeer> RequestPort for HttpServer<T> {
    fn service_one(&mut self, log: &EventLog) -> Option<Served> {
        if !self.transport.poll_accept() {
            return None;
        }
        let served = handle_connection(&mut self.transport, log, self.budget, &mut self.head);
        self.transport.hang_up();
        if served.is_some() {
            self.served = self.served.wrapping_add(1);
        }
        served
    }
}

/// Read one request head from `transport`, route it and write the
/// response.  Returns `None` when the peer sent nothing at all.
pub fn handle_connection<T: Transport>(
    transport: &mut T,
    log: &EventLog,
    budget: Duration,
    scratch: &mut Vec<u8>,
) -> Option<Served> {
    scratch.clear();
    scratch.resize(MAX_HEAD, 0);
    let mut filled = 0;
    let started = Instant::now();

    while filled < MAX_HEAD && !request::head_complete(&scratch[..filled]) {
        if started.elapsed() >= budget {
            debug!("HTTP: head read budget spent after {} bytes", filled);
            break;
        }
        match transport.read(&mut scratch[filled..]) {
            Ok(0) => {}
            Ok(n) => filled += n,
            Err(e) => {
                debug!("HTTP: read ended: {:?}", e);
                break;
            }
        }
    }

    if filled == 0 {
        return None;
    }

    let (route, head_only) = match request::parse(&scratch[..filled]) {
        Ok(req) => (Route::resolve(req.path), req.method == Method::Head),
        Err(e) => {
            warn!("HTTP: {}", e);
            (Route::BadRequest, false)
        }
    };

    let response = respond(route, log);
    if let Err(e) = response.write_to(transport, head_only) {
        warn!("HTTP: response write failed: {:?}", e);
    }
    debug!("HTTP: {:?} -> {}", route, response.status);

    Some(Served {
        route,
        status: response.status,
    })
}
