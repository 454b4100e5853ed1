//! Unified error types for the relay board driver.
//!
//! A single [`Error`] enum covers every failure a caller of the core can
//! observe.  All variants are `Copy` so they can be returned from inside a
//! held session lock and passed across threads without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// errno values used at the file-like boundary
// ---------------------------------------------------------------------------

/// No such device.
pub const ENODEV: i32 = 19;
/// Out of memory.
pub const ENOMEM: i32 = 12;
/// Bad address; reported for failed hardware commands.
pub const EFAULT: i32 = 14;

// ---------------------------------------------------------------------------
// Top-level driver error
// ---------------------------------------------------------------------------

/// Every fallible core operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A session or handle could not be allocated or registered.
    ResourceExhausted,
    /// No attached board is registered under the requested minor.
    NotFound,
    /// The board was detached; the session can no longer be used.
    DeviceGone,
    /// A frame send failed or was short during a commit.
    CommandFailed(TransportError),
}

impl Error {
    /// Positive errno for this error kind.
    pub const fn errno(self) -> i32 {
        match self {
            Self::ResourceExhausted => ENOMEM,
            Self::NotFound | Self::DeviceGone => ENODEV,
            Self::CommandFailed(_) => EFAULT,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceExhausted => write!(f, "out of resources"),
            Self::NotFound => write!(f, "device not found"),
            Self::DeviceGone => write!(f, "device gone"),
            Self::CommandFailed(e) => write!(f, "command failed: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::CommandFailed(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The per-frame timeout elapsed before the transfer completed.
    Timeout,
    /// The board acknowledged fewer bytes than the frame holds.
    ShortWrite { sent: usize, expected: usize },
    /// The device disappeared from the bus mid-transfer.
    Disconnected,
    /// The endpoint reported a stall.
    Stall,
    /// Any other host-controller or OS error.
    Io,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "transfer timed out"),
            Self::ShortWrite { sent, expected } => {
                write!(f, "short write ({sent} of {expected} bytes)")
            }
            Self::Disconnected => write!(f, "device disconnected"),
            Self::Stall => write!(f, "endpoint stalled"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for TransportError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Driver-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
