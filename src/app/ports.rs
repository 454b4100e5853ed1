//! Port traits — the boundary between the lifecycle core and its observers.
//!
//! ```text
//!   LifecycleManager ──▶ EventSink ──▶ Adapter (log, UI, test recorder)
//! ```
//!
//! The transport port lives with the protocol it serves, see
//! [`BulkTransport`](crate::protocol::BulkTransport).

use super::events::BoardEvent;

/// The core emits structured [`BoardEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink: Send {
    fn emit(&mut self, event: &BoardEvent);
}

/// Discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &BoardEvent) {}
}
