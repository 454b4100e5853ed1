//! Hotplug channel between the bus watcher and the lifecycle loop.
//!
//! Uses an `embassy-sync` bounded channel so the watcher thread can block
//! on `send` while the lifecycle thread blocks on `receive`.
//!
//! ```text
//! ┌──────────────┐ HotplugEvent ┌──────────────────┐
//! │ Bus watcher  │─────────────▶│ LifecycleManager │
//! │ (thread)     │              │ ::run (thread)   │
//! └──────────────┘              └──────────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future::block_on;

use super::commands::HotplugEvent;

/// Channel depth for hotplug messages.
pub const HOTPLUG_DEPTH: usize = 8;

/// Inbound hotplug channel: watcher → lifecycle loop.
pub type HotplugChannel<T> = Channel<CriticalSectionRawMutex, HotplugEvent<T>, HOTPLUG_DEPTH>;

/// Blocking send for callers outside an async context.
pub fn send_blocking<T>(channel: &HotplugChannel<T>, event: HotplugEvent<T>) {
    block_on(channel.send(event));
}

/// Blocking receive for callers outside an async context.
pub fn receive_blocking<T>(channel: &HotplugChannel<T>) -> HotplugEvent<T> {
    block_on(channel.receive())
}
