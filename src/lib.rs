//! Host driver for the ABACOM 8-channel USB relay board.
//!
//! ```text
//!  HotplugEvent ──▶ LifecycleManager ──▶ DeviceSession (Arc, shared)
//!                          │                  ▲     │
//!                  open(minor)                │     ▼
//!                          └──▶ AccessHandle ─┘  protocol::commit ──▶ BulkTransport
//! ```
//!
//! The board cannot report its relay state, so the driver keeps the last
//! committed mask as authoritative shadow state.  Everything below
//! [`adapters`] is transport-agnostic and runs against mock transports in
//! the tests.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod console;
pub mod device;
pub mod error;
pub mod lifecycle;
pub mod protocol;

pub use error::{Error, Result, TransportError};
