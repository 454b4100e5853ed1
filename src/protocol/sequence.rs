//! Shift-register handshake that commits an 8-bit relay mask.
//!
//! Every commit is exactly [`COMMIT_FRAMES`] frames regardless of how many
//! relays change.  The first failed or short send aborts the commit; frames
//! already sent stay sent, so the board's shift register may hold a partial
//! pattern.  No reset is attempted.

use core::time::Duration;

use log::trace;

use crate::error::TransportError;

use super::frame::{FRAME_LEN, encode};
use super::transport::BulkTransport;

/// A6275 serial data input.
pub const LINE_DATA: u8 = 0x20;
/// A6275 clock input (rising edge shifts).
pub const LINE_CLOCK: u8 = 0x08;
/// A6275 latch input (copies the shift register to the outputs).
pub const LINE_LATCH: u8 = 0x01;

/// Frames in one full commit: header, 3 per bit, idle + latch.
pub const COMMIT_FRAMES: usize = 1 + 3 * 8 + 2;

/// Ordered payload bytes for committing `mask`.
///
/// Pure function of `mask`; the encoder turns each into one frame.
pub fn payloads(mask: u8) -> [u8; COMMIT_FRAMES] {
    let mut out = [0u8; COMMIT_FRAMES];
    let mut i = 1; // out[0] is the all-lines-low header

    for bit in (0..8).rev() {
        let data = if mask & (1 << bit) != 0 { LINE_DATA } else { 0 };
        out[i] = data;
        out[i + 1] = data | LINE_CLOCK;
        out[i + 2] = data;
        i += 3;
    }

    out[i] = 0;
    out[i + 1] = LINE_LATCH;
    out
}

/// Drive the board to `mask`.
///
/// Must be called with the owning session's lock held.  Returns on the
/// first frame that fails or is acknowledged short.
pub fn commit<T: BulkTransport + ?Sized>(
    transport: &mut T,
    mask: u8,
    timeout: Duration,
) -> Result<(), TransportError> {
    for (index, payload) in payloads(mask).into_iter().enumerate() {
        let frame = encode(payload);
        let sent = transport.send(&frame, timeout)?;
        if sent != FRAME_LEN {
            return Err(TransportError::ShortWrite {
                sent,
                expected: FRAME_LEN,
            });
        }
        trace!("frame {}/{} payload=0x{:02x}", index + 1, COMMIT_FRAMES, payload);
    }
    Ok(())
}
