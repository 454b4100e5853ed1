//! Board lifecycle: attach, register, open, detach.
//!
//! ```text
//!   Unmatched ──attach + fingerprint ok + registered──▶ Attached
//!   Attached  ──detach──────────────────────────────────▶ Detached (terminal)
//! ```
//!
//! The manager holds one `Arc` to each registered [`DeviceSession`]; every
//! open [`AccessHandle`] holds another.  Detach invalidates the session and
//! drops the manager's reference; the session itself is freed when the last
//! handle closes.  Reinserting a board always creates a new session.

mod registry;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use crate::app::channels::{HotplugChannel, receive_blocking};
use crate::app::commands::{BusKey, HotplugEvent};
use crate::app::events::BoardEvent;
use crate::app::ports::EventSink;
use crate::config::DriverConfig;
use crate::device::{AccessHandle, DeviceFingerprint, DeviceSession};
use crate::error::{Error, Result};
use crate::protocol::BulkTransport;

use registry::Registry;

/// Snapshot of one registered board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardInfo {
    pub minor: u8,
    pub node: String,
    pub key: BusKey,
    /// Shadow mask, `None` if the board was detached while listing.
    pub mask: Option<u8>,
}

pub struct LifecycleManager<T: BulkTransport, S: EventSink> {
    config: DriverConfig,
    registry: Mutex<Registry<T>>,
    sink: Mutex<S>,
}

impl<T: BulkTransport, S: EventSink> LifecycleManager<T, S> {
    pub fn new(config: DriverConfig, sink: S) -> Self {
        let registry = Registry::new(config.minor_base, config.max_boards);
        Self {
            config,
            registry: Mutex::new(registry),
            sink: Mutex::new(sink),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    fn registry(&self) -> MutexGuard<'_, Registry<T>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: &BoardEvent) {
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(event);
    }

    /// Device node name for `minor`, e.g. `usb/relayboard0`.
    pub fn node_name(&self, minor: u8) -> String {
        format!("usb/{}{}", self.config.node_name, minor)
    }

    // ── Hotplug entry points ─────────────────────────────────

    /// Handle an attach notification.
    ///
    /// Returns the assigned minor, or `None` if the device is not a relay
    /// board (or its key is already bound).  Fails with
    /// [`Error::ResourceExhausted`] when no minor is free; the new session
    /// is dropped and the board is treated as never attached.
    pub fn on_attach(
        &self,
        key: BusKey,
        fingerprint: DeviceFingerprint,
        transport: T,
    ) -> Result<Option<u8>> {
        if !fingerprint.matches_relay_board() {
            info!("{}: not a relay board ({:?})", key, fingerprint);
            self.emit(&BoardEvent::Rejected { key, fingerprint });
            return Ok(None);
        }

        let session = Arc::new(DeviceSession::new(
            key.clone(),
            transport,
            self.config.frame_timeout(),
        ));

        let registered = {
            let mut registry = self.registry();
            if registry.contains_key(&key) {
                warn!("{}: attach for a key that is already registered", key);
                return Ok(None);
            }
            registry.register(key.clone(), session)
        };

        match registered {
            Ok(minor) => {
                let node = self.node_name(minor);
                info!("{}: relay board registered as {}", key, node);
                self.emit(&BoardEvent::Attached { key, minor, node });
                Ok(Some(minor))
            }
            Err(e) => {
                warn!("{}: registration failed: {}", key, e);
                self.emit(&BoardEvent::RegistrationFailed { key });
                Err(e)
            }
        }
    }

    /// Handle a detach notification.  Returns `false` for unknown keys.
    ///
    /// Blocks until any commit in progress on the board has finished.
    pub fn on_detach(&self, key: &BusKey) -> bool {
        // Unregister first so new opens see NotFound, then invalidate
        // without holding the registry lock.
        let Some((minor, session)) = self.registry().remove(key) else {
            return false;
        };
        session.mark_detached();
        drop(session);

        self.emit(&BoardEvent::Detached {
            key: key.clone(),
            minor,
        });
        true
    }

    /// Route one hotplug message.  Returns `false` on `Shutdown`.
    pub fn dispatch(&self, event: HotplugEvent<T>) -> bool {
        match event {
            HotplugEvent::Attached {
                key,
                fingerprint,
                transport,
            } => {
                // Failures are already logged and emitted.
                let _ = self.on_attach(key, fingerprint, transport);
            }
            HotplugEvent::Detached { key } => {
                self.on_detach(&key);
            }
            HotplugEvent::Shutdown => return false,
        }
        true
    }

    /// Drain `channel` until a `Shutdown` message arrives.
    pub fn run(&self, channel: &HotplugChannel<T>) {
        info!("lifecycle loop started");
        while self.dispatch(receive_blocking(channel)) {}
        info!("lifecycle loop stopped");
    }

    /// Detach every registered board, e.g. on driver unload.
    pub fn detach_all(&self) {
        let drained = self.registry().drain();
        for (minor, session) in drained {
            session.mark_detached();
            self.emit(&BoardEvent::Detached {
                key: session.key().clone(),
                minor,
            });
        }
    }

    // ── Session plumbing ─────────────────────────────────────

    /// Open a new handle on the board registered under `minor`.
    pub fn open(&self, minor: u8) -> Result<AccessHandle<T>> {
        let session = self
            .registry()
            .lookup(minor)
            .cloned()
            .ok_or(Error::NotFound)?;
        Ok(AccessHandle::new(session, self.config.min_read_interval()))
    }

    /// All registered boards, lowest minor first.
    pub fn boards(&self) -> Vec<BoardInfo> {
        let sessions: Vec<(u8, Arc<DeviceSession<T>>)> = self
            .registry()
            .entries()
            .map(|(minor, e)| (minor, Arc::clone(&e.session)))
            .collect();

        // Reading the shadow waits on each session lock; do it outside the
        // registry lock.
        sessions
            .into_iter()
            .map(|(minor, session)| BoardInfo {
                minor,
                node: self.node_name(minor),
                key: session.key().clone(),
                mask: session.get_mask().ok(),
            })
            .collect()
    }
}
