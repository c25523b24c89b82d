//! TCP front end for [`UpdateSession`].
//!
//! One client at a time.  Each [`service`](UpdatePort::service) call does at
//! most one accept, one header read and one chunk read, so a busy update
//! never starves the sampler.

use core::fmt::Write as _;
use std::time::Duration;

use log::{info, warn};

use super::session::UpdateSession;
use super::{UpdateError, UpdateEvent};
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, UpdateOutcome, UpdatePort};
use crate::net::tcp::{TcpTransport, TransportError};
use crate::net::transport::{AcceptPeer, Transport};

/// Largest slice read and flashed per service call.
pub const CHUNK_SIZE: usize = 4096;

/// Consecutive empty reads tolerated before the client is dropped.
pub const DEFAULT_STALL_READS: u32 = 40;

const HEADER_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Listening,
    Header,
    Streaming,
    Done,
}

pub struct OtaReceiver<T: Transport = TcpTransport> {
    transport: T,
    session: UpdateSession,
    phase: Phase,
    header: [u8; HEADER_LEN],
    header_len: usize,
    idle_reads: u32,
    stall_limit: u32,
    chunk: Vec<u8>,
}

impl OtaReceiver<TcpTransport> {
    /// Bind the update listener on `port`.
    pub fn bind(port: u16, io_timeout: Duration) -> Result<Self, TransportError> {
        let transport = TcpTransport::bind("OTA", port, io_timeout)?;
        Ok(Self::new(transport))
    }

    pub fn port(&self) -> Option<u16> {
        self.transport.local_addr().ok().map(|a| a.port())
    }
}

impl<T: Transport + AcceptPeer> OtaReceiver<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            session: UpdateSession::new(),
            phase: Phase::Listening,
            header: [0; HEADER_LEN],
            header_len: 0,
            idle_reads: 0,
            stall_limit: DEFAULT_STALL_READS,
            chunk: vec![0; CHUNK_SIZE],
        }
    }

    pub fn with_stall_limit(mut self, reads: u32) -> Self {
        self.stall_limit = reads.max(1);
        self
    }

    pub fn session(&self) -> &UpdateSession {
        &self.session
    }

    fn fail(&mut self, error: UpdateError, sink: &mut dyn EventSink) -> UpdateOutcome {
        warn!("OTA: {} (code {})", error, error.code());
        self.session.abort();
        let mut reply: heapless::String<16> = heapless::String::new();
        let _ = writeln!(reply, "ERR {}", error.code());
        let _ = self.transport.write_all(reply.as_bytes());
        let _ = self.transport.flush();
        self.transport.hang_up();
        self.reset();
        sink.emit(&AppEvent::Update(UpdateEvent::Failed(error)));
        UpdateOutcome::Idle
    }

    fn reset(&mut self) {
        self.phase = Phase::Listening;
        self.header_len = 0;
        self.idle_reads = 0;
    }

    /// Count an empty read; `true` once the stall limit is reached.
    fn stalled(&mut self) -> bool {
        self.idle_reads += 1;
        self.idle_reads >= self.stall_limit
    }

    fn read_header(&mut self, sink: &mut dyn EventSink) -> Option<UpdateOutcome> {
        match self.transport.read(&mut self.header[self.header_len..]) {
            Ok(0) => {
                if self.stalled() {
                    return Some(self.fail(UpdateError::Connect, sink));
                }
                return Some(UpdateOutcome::InProgress);
            }
            Ok(n) => {
                self.idle_reads = 0;
                self.header_len += n;
            }
            Err(_) => return Some(self.fail(UpdateError::Connect, sink)),
        }
        if self.header_len < HEADER_LEN {
            return Some(UpdateOutcome::InProgress);
        }

        let size = u32::from_le_bytes(self.header);
        if let Err(e) = self.session.begin(size) {
            return Some(self.fail(e, sink));
        }
        self.phase = Phase::Streaming;
        sink.emit(&AppEvent::Update(UpdateEvent::Started));
        None
    }

    fn read_chunk(&mut self, sink: &mut dyn EventSink) -> UpdateOutcome {
        let want = match self.session.state() {
            super::session::SessionState::Receiving {
                expected_size,
                bytes_written,
            } => ((expected_size - bytes_written) as usize).min(CHUNK_SIZE),
            _ => return self.fail(UpdateError::NotReceiving, sink),
        };

        let n = match self.transport.read(&mut self.chunk[..want]) {
            Ok(0) => {
                if self.stalled() {
                    return self.fail(UpdateError::Receive, sink);
                }
                return UpdateOutcome::InProgress;
            }
            Ok(n) => n,
            Err(_) => return self.fail(UpdateError::Receive, sink),
        };
        self.idle_reads = 0;

        match self.session.write(&self.chunk[..n]) {
            Ok(Some(percent)) => sink.emit(&AppEvent::Update(UpdateEvent::Progress { percent })),
            Ok(None) => {}
            Err(e) => return self.fail(e, sink),
        }

        if !self.session.is_complete() {
            return UpdateOutcome::InProgress;
        }
        if let Err(e) = self.session.finalize() {
            return self.fail(e, sink);
        }

        let _ = self.transport.write_all(b"OK\n");
        let _ = self.transport.flush();
        self.transport.hang_up();
        self.phase = Phase::Done;
        info!("OTA: image accepted, restart pending");
        sink.emit(&AppEvent::Update(UpdateEvent::Finished));
        UpdateOutcome::RestartRequired
    }
}

impl<T: Transport + AcceptPeer> UpdatePort for OtaReceiver<T> {
    fn service(&mut self, sink: &mut dyn EventSink) -> UpdateOutcome {
        if self.phase == Phase::Done {
            return UpdateOutcome::RestartRequired;
        }

        if self.phase == Phase::Listening {
            if !self.transport.poll_accept() {
                return UpdateOutcome::Idle;
            }
            self.phase = Phase::Header;
            self.header_len = 0;
            self.idle_reads = 0;
        }

        if self.phase == Phase::Header {
            if let Some(outcome) = self.read_header(sink) {
                return outcome;
            }
        }

        self.read_chunk(sink)
    }
}
