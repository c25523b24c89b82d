//! Single-client TCP transport.
//!
//! Implements [`Transport`] over `std::net`, which ESP-IDF backs with lwIP,
//! so the same code runs on the device and on the host.
//!
//! ## Connection model
//!
//! 1. `bind()` opens a listener on `0.0.0.0:<port>` in non-blocking mode.
//! 2. `accept()` polls for one incoming connection and returns
//!    immediately when none is waiting.
//! 3. An accepted socket is blocking but carries read and write timeouts,
//!    so the worst case for any single call is one `io_timeout`.  A timed
//!    out `read()` returns `Ok(0)`; end of stream returns
//!    [`TransportError::PeerClosed`] and keeps the socket for a reply.
//! 4. `disconnect()` drops the client and returns to `Listening`.

use core::fmt;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use log::{info, warn};

use super::transport::{AcceptPeer, Transport};

// ───────────────────────────────────────────────────────────────
// Error type
// ───────────────────────────────────────────────────────────────

/// Errors originating from the TCP transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Binding the listening socket failed.
    Bind(u16),
    /// Socket I/O failure on an established connection.
    Io,
    /// Operation requires a connected client but none is present.
    NotConnected,
    /// The peer finished sending.  Writing may still succeed until
    /// `disconnect()`.
    PeerClosed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind(port) => write!(f, "could not bind TCP port {}", port),
            Self::Io => write!(f, "TCP/socket I/O error"),
            Self::NotConnected => write!(f, "no client connected"),
            Self::PeerClosed => write!(f, "peer closed its end"),
        }
    }
}

impl std::error::Error for TransportError {}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Bound and listening for incoming connections.
    Listening,
    /// A client is attached.
    Connected,
}

// ───────────────────────────────────────────────────────────────
// TcpTransport
// ───────────────────────────────────────────────────────────────

pub struct TcpTransport {
    state: ConnectionState,
    listener: TcpListener,
    stream: Option<TcpStream>,
    io_timeout: Duration,
    label: &'static str,
}

impl TcpTransport {
    /// Bind to `0.0.0.0:<port>`.  Port `0` lets the OS pick (see
    /// [`local_addr()`](Self::local_addr)).  `label` prefixes log lines.
    pub fn bind(label: &'static str, port: u16, io_timeout: Duration) -> Result<Self, TransportError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).map_err(|_| TransportError::Bind(port))?;
        listener
            .set_nonblocking(true)
            .map_err(|_| TransportError::Bind(port))?;

        info!("{}: listening on port {}", label, port);

        Ok(Self {
            state: ConnectionState::Listening,
            listener,
            stream: None,
            io_timeout,
            label,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// The bound address.  Useful when port `0` was passed to `bind()`.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(|_| TransportError::Io)
    }

    /// Poll for an incoming client (non-blocking).
    ///
    /// Returns `true` if a client was accepted.  Returns `false` if none is
    /// waiting or one is already attached.
    pub fn accept(&mut self) -> bool {
        if self.state == ConnectionState::Connected {
            return false;
        }
        match self.listener.accept() {
            Ok((stream, addr)) => {
                if let Err(e) = self.configure(&stream) {
                    warn!("{}: failed to configure client socket: {}", self.label, e);
                    return false;
                }
                info!("{}: client connected from {}", self.label, addr);
                self.stream = Some(stream);
                self.state = ConnectionState::Connected;
                true
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => false,
            Err(e) => {
                warn!("{}: accept error: {}", self.label, e);
                false
            }
        }
    }

    /// Drop the current client and return to `Listening`.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
        self.state = ConnectionState::Listening;
    }

    fn configure(&self, stream: &TcpStream) -> std::io::Result<()> {
        // Accepted sockets can inherit O_NONBLOCK from the listener.
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(self.io_timeout))?;
        stream.set_write_timeout(Some(self.io_timeout))?;
        stream.set_nodelay(true)
    }

    fn drop_client(&mut self) {
        self.stream.take();
        self.state = ConnectionState::Listening;
    }
}

fn is_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

// ───────────────────────────────────────────────────────────────
// Transport implementation
// ───────────────────────────────────────────────────────────────

impl Transport for TcpTransport {
    type Error = TransportError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        match stream.read(buf) {
            Ok(0) => {
                info!("{}: client finished sending (EOF)", self.label);
                Err(TransportError::PeerClosed)
            }
            Ok(n) => Ok(n),
            Err(ref e) if is_timeout(e.kind()) => Ok(0),
            Err(_) => {
                self.drop_client();
                Err(TransportError::Io)
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        match stream.write(data) {
            Ok(n) => Ok(n),
            Err(ref e) if is_timeout(e.kind()) => Ok(0),
            Err(_) => {
                self.drop_client();
                Err(TransportError::Io)
            }
        }
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        stream.flush().map_err(|_| TransportError::Io)
    }

    fn available(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

impl AcceptPeer for TcpTransport {
    fn poll_accept(&mut self) -> bool {
        self.accept()
    }

    fn hang_up(&mut self) {
        self.disconnect();
    }
}

// ───────────────────────────────────────────────────────────────
// Tests (host only)
// ───────────────────────────────────────────────────────────────
