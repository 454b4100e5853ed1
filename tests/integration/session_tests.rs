//! Commit semantics: frame sequence, shadow state, failures, concurrency.

use std::thread;
use std::time::Duration;

use relayboard::app::commands::BusKey;
use relayboard::config::DriverConfig;
use relayboard::device::DeviceFingerprint;
use relayboard::lifecycle::LifecycleManager;
use relayboard::protocol::{COMMIT_FRAMES, payloads};
use relayboard::{Error, TransportError};

use super::mock_hw::{MockProbe, MockTransport, RecordingSink};

type Manager = LifecycleManager<MockTransport, RecordingSink>;

fn board(transport: MockTransport) -> Manager {
    let m = LifecycleManager::new(DriverConfig::default(), RecordingSink::new());
    m.on_attach(BusKey::new("s"), DeviceFingerprint::RELAY_BOARD, transport)
        .unwrap();
    m
}

fn fresh() -> (Manager, MockProbe) {
    let (transport, probe) = MockTransport::new();
    (board(transport), probe)
}

#[test]
fn write_five_emits_expected_frames() {
    let (m, probe) = fresh();
    let h = m.open(0).unwrap();
    h.write(b"5").unwrap();

    let sent = probe.payloads();
    assert_eq!(sent.len(), COMMIT_FRAMES);
    assert_eq!(sent[0], 0x00);
    let off = [0x00, 0x08, 0x00];
    let on = [0x20, 0x28, 0x20];
    // 128 64 32 16 8 off, 4 on, 2 off, 1 on
    let expected = [off, off, off, off, off, on, off, on];
    for (slot, triple) in expected.iter().enumerate() {
        assert_eq!(&sent[1 + slot * 3..4 + slot * 3], triple, "bit slot {slot}");
    }
    assert_eq!(&sent[25..], &[0x00, 0x01]);
}

#[test]
fn every_commit_is_27_frames_even_without_change() {
    let (m, probe) = fresh();
    let h = m.open(0).unwrap();
    h.set_mask(0).unwrap();
    h.set_mask(0).unwrap();
    assert_eq!(probe.payloads().len(), 2 * COMMIT_FRAMES);
}

#[test]
fn shadow_is_visible_from_every_handle() {
    let (m, _probe) = fresh();
    let a = m.open(0).unwrap();
    let b = m.open(0).unwrap();

    a.set_mask(0x42).unwrap();
    assert_eq!(b.device().get_mask(), Ok(0x42));
    assert_eq!(m.boards()[0].mask, Some(0x42));
}

#[test]
fn failure_at_any_frame_keeps_previous_shadow() {
    for k in 1..=COMMIT_FRAMES {
        let (m, probe) = fresh();
        let h = m.open(0).unwrap();
        h.set_mask(0x0f).unwrap();

        probe.fail_at(COMMIT_FRAMES + k);
        assert_eq!(
            h.set_mask(0xf0),
            Err(Error::CommandFailed(TransportError::Timeout)),
            "frame {k}"
        );
        assert_eq!(h.device().get_mask(), Ok(0x0f), "frame {k}");
        // Nothing was sent after the failing frame.
        assert_eq!(probe.attempts(), COMMIT_FRAMES + k, "frame {k}");
    }
}

#[test]
fn short_write_counts_as_failure() {
    let (m, probe) = fresh();
    let h = m.open(0).unwrap();
    probe.short_at(3);
    assert_eq!(
        h.set_mask(9),
        Err(Error::CommandFailed(TransportError::ShortWrite {
            sent: 7,
            expected: 11
        }))
    );
    assert_eq!(h.device().get_mask(), Ok(0));
    assert_eq!(probe.attempts(), 3);
}

#[test]
fn failed_commit_does_not_poison_later_writes() {
    let (m, probe) = fresh();
    let h = m.open(0).unwrap();
    probe.fail_at(1);
    assert!(h.set_mask(1).is_err());
    h.set_mask(2).unwrap();
    assert_eq!(h.device().get_mask(), Ok(2));
}

#[test]
fn concurrent_commits_never_interleave() {
    let (transport, probe) = MockTransport::with_delay(Duration::from_micros(200));
    let m = board(transport);
    let a = m.open(0).unwrap();
    let b = m.open(0).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..3 {
                a.set_mask(0x55).unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..3 {
                b.set_mask(0xaa).unwrap();
            }
        });
    });

    let sent = probe.payloads();
    assert_eq!(sent.len(), 6 * COMMIT_FRAMES);
    let mut last: Option<u8> = None;
    for chunk in sent.chunks(COMMIT_FRAMES) {
        let mask = if chunk == payloads(0x55) {
            0x55
        } else if chunk == payloads(0xaa) {
            0xaa
        } else {
            panic!("interleaved commit: {chunk:02x?}");
        };
        last = Some(mask);
    }
    // The shadow belongs to whichever commit finished last.
    assert_eq!(a.device().get_mask().ok(), last);
}
