//! USB adapter — `nusb` implementation of the transport and the bus watcher.
//!
//! Mirrors the split a kernel driver gets for free: the vendor/product
//! table decides which devices are probed, the lifecycle core decides from
//! the descriptor fingerprint whether a probed device is really a relay
//! board.
//!
//! The watcher runs on a dedicated thread and forwards
//! [`HotplugEvent`]s over the [`HotplugChannel`]; it never touches session
//! state itself.

use core::time::Duration;
use std::collections::HashMap;

use anyhow::{Context, Result};
use embassy_time::with_timeout;
use futures_lite::StreamExt;
use futures_lite::future::block_on;
use log::{debug, info, trace, warn};
use nusb::hotplug::HotplugEvent as UsbHotplugEvent;
use nusb::transfer::TransferError;
use nusb::{DeviceId, DeviceInfo, Interface};

use crate::app::channels::{HotplugChannel, send_blocking};
use crate::app::commands::{BusKey, HotplugEvent};
use crate::config::DriverConfig;
use crate::device::DeviceFingerprint;
use crate::error::TransportError;
use crate::protocol::{BulkTransport, CommandFrame};

// ── Transport ────────────────────────────────────────────────

/// Bulk OUT endpoint on a claimed interface.
pub struct UsbBulkTransport {
    interface: Interface,
    endpoint: u8,
}

impl UsbBulkTransport {
    pub fn new(interface: Interface, endpoint: u8) -> Self {
        Self {
            interface,
            endpoint,
        }
    }
}

fn map_transfer_error(e: TransferError) -> TransportError {
    match e {
        TransferError::Stall => TransportError::Stall,
        TransferError::Disconnected => TransportError::Disconnected,
        _ => TransportError::Io,
    }
}

impl BulkTransport for UsbBulkTransport {
    fn send(&mut self, frame: &CommandFrame, timeout: Duration) -> Result<usize, TransportError> {
        let transfer = self
            .interface
            .bulk_out(self.endpoint, frame.as_bytes().to_vec());
        let timeout = embassy_time::Duration::from_micros(timeout.as_micros() as u64);

        // Dropping the transfer future on timeout cancels the URB.
        let completion =
            block_on(with_timeout(timeout, transfer)).map_err(|_| TransportError::Timeout)?;
        let sent = completion.data.actual_length();
        completion.status.map_err(map_transfer_error)?;
        trace!("bulk out ep=0x{:02x} {} bytes", self.endpoint, sent);
        Ok(sent)
    }
}

// ── Probing ──────────────────────────────────────────────────

/// A device that passed the vendor/product table.
pub struct ProbedDevice {
    pub key: BusKey,
    pub fingerprint: DeviceFingerprint,
    pub transport: UsbBulkTransport,
}

pub fn matches_table(info: &DeviceInfo, config: &DriverConfig) -> bool {
    info.vendor_id() == config.vendor_id && info.product_id() == config.product_id
}

pub fn bus_key(info: &DeviceInfo) -> BusKey {
    BusKey::from_bus_address(info.bus_number(), info.device_address())
}

/// Sample the descriptor fields the relay board heuristic looks at.
pub fn fingerprint(device: &nusb::Device, interface: u8) -> Result<DeviceFingerprint> {
    let num_configurations = device.configurations().count() as u8;
    let config = device
        .active_configuration()
        .context("reading active configuration")?;
    let num_endpoints = config
        .interface_alt_settings()
        .find(|alt| alt.interface_number() == interface)
        .map_or(0, |alt| alt.num_endpoints());

    Ok(DeviceFingerprint {
        num_configurations,
        max_power: config.max_power(),
        num_interfaces: config.interfaces().count() as u8,
        num_endpoints,
    })
}

/// Open `info`, fingerprint it and claim the command interface.
pub fn probe(info: &DeviceInfo, config: &DriverConfig) -> Result<ProbedDevice> {
    let key = bus_key(info);
    let device = info.open().with_context(|| format!("opening {key}"))?;
    let fingerprint = fingerprint(&device, config.interface)?;
    let interface = device
        .claim_interface(config.interface)
        .with_context(|| format!("claiming interface {} on {key}", config.interface))?;

    debug!("{}: probed {:?}", key, fingerprint);
    Ok(ProbedDevice {
        key,
        fingerprint,
        transport: UsbBulkTransport::new(interface, config.bulk_out_endpoint),
    })
}

/// Every device on the bus that passes the vendor/product table.
pub fn list(config: &DriverConfig) -> Result<Vec<DeviceInfo>> {
    let devices = nusb::list_devices().context("enumerating USB devices")?;
    Ok(devices.filter(|d| matches_table(d, config)).collect())
}

// ── Hotplug watcher ──────────────────────────────────────────

fn announce(
    info: &DeviceInfo,
    config: &DriverConfig,
    known: &mut HashMap<DeviceId, BusKey>,
    channel: &HotplugChannel<UsbBulkTransport>,
) {
    match probe(info, config) {
        Ok(dev) => {
            known.insert(info.id(), dev.key.clone());
            send_blocking(
                channel,
                HotplugEvent::Attached {
                    key: dev.key,
                    fingerprint: dev.fingerprint,
                    transport: dev.transport,
                },
            );
        }
        Err(e) => warn!("probe failed: {:#}", e),
    }
}

/// Announce boards already present, then forward hotplug events until the
/// bus watch ends.  Blocks the calling thread.
pub fn watch(config: &DriverConfig, channel: &HotplugChannel<UsbBulkTransport>) -> Result<()> {
    // Subscribe before enumerating so a board plugged in between the two
    // is not missed.
    let mut events = nusb::watch_devices().context("starting USB hotplug watch")?;
    let mut known: HashMap<DeviceId, BusKey> = HashMap::new();

    for info in list(config)? {
        announce(&info, config, &mut known, channel);
    }
    info!("watching for relay boards ({} present)", known.len());

    while let Some(event) = block_on(events.next()) {
        match event {
            UsbHotplugEvent::Connected(info) if matches_table(&info, config) => {
                announce(&info, config, &mut known, channel);
            }
            UsbHotplugEvent::Connected(_) => {}
            UsbHotplugEvent::Disconnected(id) => {
                if let Some(key) = known.remove(&id) {
                    send_blocking(channel, HotplugEvent::Detached { key });
                }
            }
        }
    }
    Ok(())
}
