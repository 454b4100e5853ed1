//! Shared per-board session.
//!
//! One [`DeviceSession`] exists per attached board and is shared through an
//! `Arc` by the lifecycle registry and every open [`AccessHandle`].  Its
//! single lock guards the shadow mask, the liveness flag and the transport
//! together, and is held for a whole 27-frame commit so that
//!
//! - two commits never interleave frames,
//! - a reader never sees a mask from the middle of a commit,
//! - detach waits for an in-flight commit before invalidating the session.
//!
//! [`AccessHandle`]: super::AccessHandle

use core::time::Duration;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::app::commands::BusKey;
use crate::error::{Error, Result};
use crate::protocol::{self, BulkTransport};

struct SessionState<T> {
    /// Last successfully committed mask.  The board cannot be queried.
    shadow: u8,
    alive: bool,
    transport: T,
}

pub struct DeviceSession<T: BulkTransport> {
    key: BusKey,
    frame_timeout: Duration,
    state: Mutex<SessionState<T>>,
}

impl<T: BulkTransport> DeviceSession<T> {
    /// New session with all relays off, the board's power-on state.
    pub fn new(key: BusKey, transport: T, frame_timeout: Duration) -> Self {
        Self {
            key,
            frame_timeout,
            state: Mutex::new(SessionState {
                shadow: 0,
                alive: true,
                transport,
            }),
        }
    }

    pub fn key(&self) -> &BusKey {
        &self.key
    }

    // A panic inside a commit leaves the shadow untouched, so the state
    // behind a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, SessionState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drive the board to `mask` and record it as the shadow state.
    ///
    /// Blocks for the full commit.  On failure the shadow keeps its previous
    /// value even though the board may hold a partial pattern.
    pub fn set_mask(&self, mask: u8) -> Result<()> {
        let mut state = self.lock();
        if !state.alive {
            return Err(Error::DeviceGone);
        }

        match protocol::commit(&mut state.transport, mask, self.frame_timeout) {
            Ok(()) => {
                debug!("{}: committed mask 0b{:08b}", self.key, mask);
                state.shadow = mask;
                Ok(())
            }
            Err(e) => {
                warn!(
                    "{}: commit of 0b{:08b} failed: {} (shadow stays 0b{:08b})",
                    self.key, mask, e, state.shadow
                );
                Err(Error::CommandFailed(e))
            }
        }
    }

    /// Last committed mask.  Never touches the hardware.
    pub fn get_mask(&self) -> Result<u8> {
        let state = self.lock();
        if !state.alive {
            return Err(Error::DeviceGone);
        }
        Ok(state.shadow)
    }

    pub fn is_alive(&self) -> bool {
        self.lock().alive
    }

    /// Invalidate the session.  Waits for any commit in progress.
    pub fn mark_detached(&self) {
        let mut state = self.lock();
        state.alive = false;
        info!("{}: detached", self.key);
    }
}

impl<T: BulkTransport> Drop for DeviceSession<T> {
    fn drop(&mut self) {
        info!("{}: session released", self.key);
    }
}
