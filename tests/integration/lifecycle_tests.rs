//! Attach / open / detach / release across the lifecycle manager.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use relayboard::app::channels::{HotplugChannel, send_blocking};
use relayboard::app::commands::{BusKey, HotplugEvent};
use relayboard::app::events::BoardEvent;
use relayboard::config::DriverConfig;
use relayboard::device::DeviceFingerprint;
use relayboard::lifecycle::LifecycleManager;
use relayboard::Error;

use super::mock_hw::{MockProbe, MockTransport, RecordingSink};

type Manager = LifecycleManager<MockTransport, RecordingSink>;

fn manager(max_boards: u8) -> (Manager, RecordingSink) {
    let sink = RecordingSink::new();
    let config = DriverConfig {
        max_boards,
        ..DriverConfig::default()
    };
    (LifecycleManager::new(config, sink.clone()), sink)
}

fn attach(m: &Manager, key: &str) -> (u8, MockProbe) {
    let (transport, probe) = MockTransport::new();
    let minor = m
        .on_attach(BusKey::new(key), DeviceFingerprint::RELAY_BOARD, transport)
        .unwrap()
        .expect("relay board should register");
    (minor, probe)
}

#[test]
fn attach_emits_event_and_allows_open() {
    let (m, sink) = manager(4);
    let (minor, _probe) = attach(&m, "001:004");

    assert_eq!(
        sink.events(),
        vec![BoardEvent::Attached {
            key: BusKey::new("001:004"),
            minor: 0,
            node: "usb/relayboard0".into(),
        }]
    );
    let handle = m.open(minor).unwrap();
    assert_eq!(handle.device().get_mask(), Ok(0));
}

#[test]
fn rejected_fingerprint_drops_transport() {
    let (m, sink) = manager(4);
    let (transport, probe) = MockTransport::new();
    let fp = DeviceFingerprint {
        num_endpoints: 2,
        ..DeviceFingerprint::RELAY_BOARD
    };

    assert_eq!(m.on_attach(BusKey::new("1"), fp, transport), Ok(None));
    assert!(probe.dropped());
    assert!(matches!(sink.events()[0], BoardEvent::Rejected { .. }));
}

#[test]
fn registration_failure_destroys_session() {
    let (m, sink) = manager(1);
    let (_first, _p) = attach(&m, "a");

    let (transport, probe) = MockTransport::new();
    assert_eq!(
        m.on_attach(BusKey::new("b"), DeviceFingerprint::RELAY_BOARD, transport),
        Err(Error::ResourceExhausted)
    );
    assert!(probe.dropped(), "unregistered session must be freed at once");
    assert_eq!(
        sink.events().last(),
        Some(&BoardEvent::RegistrationFailed {
            key: BusKey::new("b")
        })
    );
    assert_eq!(m.boards().len(), 1);
}

#[test]
fn detach_invalidates_open_handles_and_blocks_new_opens() {
    let (m, _sink) = manager(4);
    let (minor, _probe) = attach(&m, "k");
    let mut handle = m.open(minor).unwrap();
    handle.set_mask(3).unwrap();

    assert!(m.on_detach(&BusKey::new("k")));

    assert_eq!(handle.set_mask(1), Err(Error::DeviceGone));
    assert_eq!(handle.read_mask(Instant::now()), Err(Error::DeviceGone));
    assert_eq!(m.open(minor).err(), Some(Error::NotFound));
}

#[test]
fn session_outlives_detach_until_last_handle_closes() {
    let (m, _sink) = manager(4);
    let (minor, probe) = attach(&m, "k");
    let h1 = m.open(minor).unwrap();
    let h2 = m.open(minor).unwrap();
    let weak = Arc::downgrade(h1.device());

    m.on_detach(&BusKey::new("k"));
    assert!(!probe.dropped());

    h1.close();
    assert!(!probe.dropped());
    assert!(weak.upgrade().is_some());

    drop(h2);
    assert!(probe.dropped());
    assert!(weak.upgrade().is_none());
}

#[test]
fn detach_without_handles_frees_immediately() {
    let (m, _sink) = manager(4);
    let (_minor, probe) = attach(&m, "k");
    m.on_detach(&BusKey::new("k"));
    assert!(probe.dropped());
}

#[test]
fn reinsertion_is_a_fresh_session() {
    let (m, _sink) = manager(4);
    let (minor, _p) = attach(&m, "k");
    m.open(minor).unwrap().set_mask(0xaa).unwrap();
    m.on_detach(&BusKey::new("k"));

    let (minor, _p) = attach(&m, "k");
    assert_eq!(m.open(minor).unwrap().device().get_mask(), Ok(0));
}

#[test]
fn freed_minor_is_reused() {
    let (m, _sink) = manager(4);
    let (a, _pa) = attach(&m, "a");
    let (b, _pb) = attach(&m, "b");
    assert_eq!((a, b), (0, 1));

    m.on_detach(&BusKey::new("a"));
    let (c, _pc) = attach(&m, "c");
    assert_eq!(c, 0);
}

#[test]
fn detach_waits_for_commit_in_progress() {
    let (m, _sink) = manager(4);
    let (transport, probe) = MockTransport::with_delay(Duration::from_millis(2));
    let minor = m
        .on_attach(BusKey::new("k"), DeviceFingerprint::RELAY_BOARD, transport)
        .unwrap()
        .unwrap();
    let handle = m.open(minor).unwrap();

    thread::scope(|s| {
        let writer = s.spawn(|| handle.set_mask(0xff));

        while probe.attempts() == 0 {
            thread::yield_now();
        }
        m.on_detach(&BusKey::new("k"));

        // The commit was already running when detach started, so it ran to
        // completion before the session was invalidated.
        assert_eq!(probe.payloads().len(), 27);
        assert_eq!(writer.join().unwrap(), Ok(()));
    });

    assert_eq!(handle.device().get_mask(), Err(Error::DeviceGone));
}

#[test]
fn run_loop_consumes_channel_until_shutdown() {
    let (m, sink) = manager(4);
    let channel: HotplugChannel<MockTransport> = HotplugChannel::new();
    let (transport, probe) = MockTransport::new();

    thread::scope(|s| {
        s.spawn(|| m.run(&channel));

        send_blocking(
            &channel,
            HotplugEvent::Attached {
                key: BusKey::new("hp"),
                fingerprint: DeviceFingerprint::RELAY_BOARD,
                transport,
            },
        );
        send_blocking(
            &channel,
            HotplugEvent::Detached {
                key: BusKey::new("hp"),
            },
        );
        send_blocking(&channel, HotplugEvent::Shutdown);
    });

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], BoardEvent::Attached { minor: 0, .. }));
    assert!(matches!(events[1], BoardEvent::Detached { minor: 0, .. }));
    assert!(probe.dropped());
}

#[test]
fn detach_all_invalidates_everything() {
    let (m, _sink) = manager(4);
    let (a, _pa) = attach(&m, "a");
    let (_b, pb) = attach(&m, "b");
    let handle = m.open(a).unwrap();

    m.detach_all();

    assert!(m.boards().is_empty());
    assert_eq!(handle.set_mask(1), Err(Error::DeviceGone));
    assert!(pb.dropped());
}
