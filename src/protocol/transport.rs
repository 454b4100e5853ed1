//! Transport abstraction — a blocking, fixed-size-frame bulk send.
//!
//! Concrete implementations:
//! - USB bulk OUT endpoint via `nusb` ([`crate::adapters::usb`])
//! - Recording mocks in the integration tests
//!
//! The relay protocol is generic over `BulkTransport`, so the core never
//! touches a real bus.

use core::time::Duration;

use crate::error::TransportError;

use super::frame::CommandFrame;

/// Unidirectional frame sink with a per-call timeout.
pub trait BulkTransport: Send {
    /// Send one frame, blocking for at most `timeout`.
    /// Returns the number of bytes the device acknowledged.
    fn send(&mut self, frame: &CommandFrame, timeout: Duration) -> Result<usize, TransportError>;
}

impl<T: BulkTransport + ?Sized> BulkTransport for Box<T> {
    fn send(&mut self, frame: &CommandFrame, timeout: Duration) -> Result<usize, TransportError> {
        (**self).send(frame, timeout)
    }
}

/// A transport that acknowledges every frame without sending it anywhere.
/// Useful for dry runs when no board is connected.
pub struct NullTransport;

impl BulkTransport for NullTransport {
    fn send(&mut self, frame: &CommandFrame, _timeout: Duration) -> Result<usize, TransportError> {
        Ok(frame.as_bytes().len())
    }
}
