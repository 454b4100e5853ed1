//! Outbound lifecycle events.
//!
//! The [`LifecycleManager`](crate::lifecycle::LifecycleManager) emits these
//! through the [`EventSink`](super::ports::EventSink) port.

use super::commands::BusKey;
use crate::device::DeviceFingerprint;

/// Structured events emitted by the lifecycle core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// A board matched, got a session and was registered.
    Attached { key: BusKey, minor: u8, node: String },

    /// A device passed the bus-level table but failed the fingerprint check.
    Rejected {
        key: BusKey,
        fingerprint: DeviceFingerprint,
    },

    /// A matching board could not be registered; its session was dropped.
    RegistrationFailed { key: BusKey },

    /// A registered board was removed.  Open handles now see `DeviceGone`.
    Detached { key: BusKey, minor: u8 },
}
