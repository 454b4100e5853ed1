//! Mock hardware for integration tests.
//!
//! [`MockTransport`] records every frame it is asked to send and can be
//! told to fail or short-write a given send attempt.  A [`MockProbe`]
//! shares the same state so tests can inspect and steer the transport
//! after it has been moved into a session.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use relayboard::app::events::BoardEvent;
use relayboard::app::ports::EventSink;
use relayboard::protocol::{BulkTransport, CommandFrame, FRAME_LEN};
use relayboard::TransportError;

#[derive(Default)]
struct Shared {
    payloads: Mutex<Vec<u8>>,
    attempts: AtomicUsize,
    fail_at: AtomicUsize,
    short_at: AtomicUsize,
    dropped: AtomicBool,
}

// ── MockTransport ─────────────────────────────────────────────

pub struct MockTransport {
    shared: Arc<Shared>,
    delay: Duration,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> (Self, MockProbe) {
        Self::with_delay(Duration::ZERO)
    }

    /// Every send sleeps for `delay` before completing.
    pub fn with_delay(delay: Duration) -> (Self, MockProbe) {
        let shared = Arc::new(Shared::default());
        let probe = MockProbe {
            shared: Arc::clone(&shared),
        };
        (Self { shared, delay }, probe)
    }
}

impl BulkTransport for MockTransport {
    fn send(&mut self, frame: &CommandFrame, _timeout: Duration) -> Result<usize, TransportError> {
        let attempt = self.shared.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.shared.fail_at.load(Ordering::SeqCst) == attempt {
            return Err(TransportError::Timeout);
        }
        self.shared.payloads.lock().unwrap().push(frame.payload());
        if self.shared.short_at.load(Ordering::SeqCst) == attempt {
            return Ok(FRAME_LEN - 4);
        }
        Ok(FRAME_LEN)
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.shared.dropped.store(true, Ordering::SeqCst);
    }
}

// ── MockProbe ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockProbe {
    shared: Arc<Shared>,
}

#[allow(dead_code)]
impl MockProbe {
    /// Payload bytes of every frame that reached the "wire".
    pub fn payloads(&self) -> Vec<u8> {
        self.shared.payloads.lock().unwrap().clone()
    }

    /// Number of send calls so far, failed ones included.
    pub fn attempts(&self) -> usize {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    /// Fail the `n`-th send attempt (1-based, counted over the transport's life).
    pub fn fail_at(&self, n: usize) {
        self.shared.fail_at.store(n, Ordering::SeqCst);
    }

    /// Acknowledge the `n`-th send attempt short.
    pub fn short_at(&self, n: usize) {
        self.shared.short_at.store(n, Ordering::SeqCst);
    }

    /// Whether the transport (and so its session) has been freed.
    pub fn dropped(&self) -> bool {
        self.shared.dropped.load(Ordering::SeqCst)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<BoardEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BoardEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &BoardEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
