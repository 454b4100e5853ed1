//! Per-open access handle.
//!
//! Each open call gets its own [`AccessHandle`] holding a strong reference
//! to the board's [`DeviceSession`] and a private read timestamp.  Closing
//! the handle (dropping it) releases the reference.
//!
//! ## Read throttling
//!
//! Relay state changes at mechanical speed.  A handle returns a fresh value
//! at most once per `min_read_interval`; a read inside the window yields no
//! data, which poll-style readers (`cat`) treat as end of stream.

use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use log::trace;

use super::session::DeviceSession;
use super::text::{MAX_TEXT_LEN, format_mask, parse_mask};
use crate::error::Result;
use crate::protocol::BulkTransport;

pub struct AccessHandle<T: BulkTransport> {
    device: Arc<DeviceSession<T>>,
    min_read_interval: Duration,
    last_read_at: Option<Instant>,
}

impl<T: BulkTransport> AccessHandle<T> {
    pub fn new(device: Arc<DeviceSession<T>>, min_read_interval: Duration) -> Self {
        Self {
            device,
            min_read_interval,
            last_read_at: None,
        }
    }

    pub fn device(&self) -> &Arc<DeviceSession<T>> {
        &self.device
    }

    pub fn set_mask(&self, mask: u8) -> Result<()> {
        self.device.set_mask(mask)
    }

    /// Throttled status read.
    ///
    /// `Ok(None)` means "no new data": the previous successful read on this
    /// handle was less than `min_read_interval` before `now`.
    pub fn read_mask(&mut self, now: Instant) -> Result<Option<u8>> {
        if let Some(last) = self.last_read_at {
            if now.saturating_duration_since(last) < self.min_read_interval {
                trace!("{}: read throttled", self.device.key());
                return Ok(None);
            }
        }

        let mask = self.device.get_mask()?;
        self.last_read_at = Some(now);
        Ok(Some(mask))
    }

    /// File-like write: parse an ASCII decimal mask and commit it.
    /// Reports the whole payload as consumed.
    pub fn write(&self, payload: &[u8]) -> Result<usize> {
        self.set_mask(parse_mask(payload))?;
        Ok(payload.len())
    }

    /// File-like read: `"<mask>\n"` into `buf`.
    ///
    /// Returns 0 when `buf` cannot hold the longest rendering or when the
    /// read is throttled.
    pub fn read(&mut self, buf: &mut [u8], now: Instant) -> Result<usize> {
        if buf.len() < MAX_TEXT_LEN {
            return Ok(0);
        }
        let Some(mask) = self.read_mask(now)? else {
            return Ok(0);
        };

        let text = format_mask(mask);
        let bytes = text.as_bytes();
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }

    /// Release this handle's reference to the session.
    pub fn close(self) {}
}
