//! Fixed-size command frame encoder.
//!
//! Wire format (captured from the vendor's Windows driver):
//! ```text
//! ┌──────┬──────┬──────┬──────┬──────┬─────────┬──────┬──────────┐
//! │ 0xa1 │ 0x6a │ 0x1f │ 0x00 │ 0x10 │ payload │ 0x3f │ 0x00 × 4 │
//! └──────┴──────┴──────┴──────┴──────┴─────────┴──────┴──────────┘
//! ```
//!
//! `0xa1` is the CH341A "set output" request; the payload byte is copied
//! onto data lines D0..D7.

/// Frame length in bytes.
pub const FRAME_LEN: usize = 11;

/// Offset of the payload byte inside a frame.
pub const PAYLOAD_OFFSET: usize = 5;

const TEMPLATE: [u8; FRAME_LEN] = [
    0xa1, 0x6a, 0x1f, 0x00, 0x10, 0x00, 0x3f, 0x00, 0x00, 0x00, 0x00,
];

/// One immutable 11-byte command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandFrame([u8; FRAME_LEN]);

impl CommandFrame {
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// The data-line byte this frame drives.
    pub fn payload(&self) -> u8 {
        self.0[PAYLOAD_OFFSET]
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Build the frame that drives `payload` onto the data lines.
pub const fn encode(payload: u8) -> CommandFrame {
    let mut bytes = TEMPLATE;
    bytes[PAYLOAD_OFFSET] = payload;
    CommandFrame(bytes)
}
