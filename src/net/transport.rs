//! Transport abstraction over any byte-oriented channel.
//!
//! The HTTP and OTA handlers are generic over `Transport`, so request
//! handling can be exercised against an in-memory buffer as well as a
//! real socket.

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data arrived within the I/O timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if a peer is attached.
    fn available(&self) -> bool;

    /// Write all of `data`, treating a zero-length write as a stall.
    fn write_all(&mut self, mut data: &[u8]) -> Result<(), WriteStalled<Self::Error>> {
        while !data.is_empty() {
            match self.write(data) {
                Ok(0) => return Err(WriteStalled::Stalled),
                Ok(n) => data = &data[n..],
                Err(e) => return Err(WriteStalled::Io(e)),
            }
        }
        Ok(())
    }
}

/// Failure of [`Transport::write_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStalled<E> {
    /// The peer stopped accepting bytes before the timeout.
    Stalled,
    Io(E),
}

/// Connection management for listeners that take one peer at a time.
pub trait AcceptPeer {
    /// Non-blocking check for a new peer.
    fn poll_accept(&mut self) -> bool;
    /// Close the current peer.
    fn hang_up(&mut self);
}
