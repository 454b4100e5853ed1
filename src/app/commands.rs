//! Inbound hotplug notifications.
//!
//! These are produced by the bus watcher (see [`crate::adapters::usb`]) and
//! consumed by the [`LifecycleManager`](crate::lifecycle::LifecycleManager).

use core::fmt;

use crate::device::DeviceFingerprint;

/// Stable identity of a device while it sits on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BusKey(String);

impl BusKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// `lsusb`-style `BBB:DDD` key.
    pub fn from_bus_address(bus: u8, address: u8) -> Self {
        Self(format!("{bus:03}:{address:03}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Messages delivered to the lifecycle loop.
pub enum HotplugEvent<T> {
    /// A device passed the vendor/product table and was opened.
    /// The transport is dropped again if the fingerprint does not match.
    Attached {
        key: BusKey,
        fingerprint: DeviceFingerprint,
        transport: T,
    },
    /// The device identified by `key` left the bus.
    Detached { key: BusKey },
    /// Stop the lifecycle loop.
    Shutdown,
}

impl<T> fmt::Debug for HotplugEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attached {
                key, fingerprint, ..
            } => f
                .debug_struct("Attached")
                .field("key", key)
                .field("fingerprint", fingerprint)
                .finish_non_exhaustive(),
            Self::Detached { key } => f.debug_struct("Detached").field("key", key).finish(),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}
