//! Adapters — concrete implementations of the core's ports.
//!
//! - [`log_sink`] renders lifecycle events through the `log` facade.
//! - [`usb`] talks to real boards through `nusb` (feature `usb`).

pub mod log_sink;

#[cfg(feature = "usb")]
pub mod usb;
