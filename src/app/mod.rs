//! Application boundary — the messages and ports that connect the core to
//! the outside world.
//!
//! Inbound hotplug notifications arrive as [`commands::HotplugEvent`]s on a
//! [`channels::HotplugChannel`]; outbound lifecycle notifications leave as
//! [`events::BoardEvent`]s through the [`ports::EventSink`] port.

pub mod channels;
pub mod commands;
pub mod events;
pub mod ports;
