//! Relay board wire protocol.
//!
//! The board is a CH341A USB bridge whose parallel data lines drive an
//! Allegro A6275 serial-in latched driver.  Relay state is shifted in
//! bit by bit, so every state change is a fixed burst of frames:
//!
//! ```text
//! ┌────────┬──────────────────────────────┬──────────────┐
//! │ header │ 8 × (data, clock↑, clock↓)   │ idle, latch  │
//! │ 1 frame│ 24 frames, MSB first         │ 2 frames     │
//! └────────┴──────────────────────────────┴──────────────┘
//! ```

pub mod frame;
pub mod sequence;
pub mod transport;

pub use frame::{CommandFrame, FRAME_LEN, encode};
pub use sequence::{COMMIT_FRAMES, commit, payloads};
pub use transport::{BulkTransport, NullTransport};
