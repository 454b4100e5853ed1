//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing lifecycle events to the `log`
//! facade, one line per event.

use log::{info, warn};

use crate::app::events::BoardEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BoardEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BoardEvent) {
        match event {
            BoardEvent::Attached { key, minor, node } => {
                info!("ATTACH | bus={} | minor={} | node={}", key, minor, node);
            }
            BoardEvent::Rejected { key, fingerprint } => {
                info!(
                    "REJECT | bus={} | configs={} power={}mA ifaces={} eps={}",
                    key,
                    fingerprint.num_configurations,
                    fingerprint.max_power_ma(),
                    fingerprint.num_interfaces,
                    fingerprint.num_endpoints,
                );
            }
            BoardEvent::RegistrationFailed { key } => {
                warn!("REGFAIL | bus={} | no free minor", key);
            }
            BoardEvent::Detached { key, minor } => {
                info!("DETACH | bus={} | minor={}", key, minor);
            }
        }
    }
}
