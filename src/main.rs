//! `relayboard` — command-line front end.
//!
//! ```text
//! ┌───────────────┐ HotplugEvent ┌──────────────────┐       ┌──────────────┐
//! │ usb::watch    │─────────────▶│ LifecycleManager │◀──────│ Console      │
//! │ (thread)      │   channel    │ ::run (thread)   │ open  │ (main, stdin)│
//! └───────────────┘              └──────────────────┘       └──────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use relayboard::adapters::log_sink::LogEventSink;
use relayboard::adapters::usb::{self, UsbBulkTransport};
use relayboard::app::channels::{HotplugChannel, send_blocking};
use relayboard::app::commands::HotplugEvent;
use relayboard::config::DriverConfig;
use relayboard::console::Console;
use relayboard::lifecycle::LifecycleManager;

#[derive(Parser)]
#[command(name = "relayboard", version, about = "ABACOM USB relay board driver")]
struct Cli {
    /// JSON file overriding driver defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List CH341A devices and whether they look like relay boards
    List,
    /// Commit a relay mask to one board and exit
    Set {
        /// Zero-based index into the list of matching boards
        #[arg(short, long, default_value_t = 0)]
        device: usize,
        /// Decimal mask; bit 0..7 = relay 1..8
        status: String,
    },
    /// Watch for boards and accept open/read/write/close commands on stdin
    Console,
}

type Manager = LifecycleManager<UsbBulkTransport, LogEventSink>;

fn load_config(path: Option<&PathBuf>) -> Result<DriverConfig> {
    let Some(path) = path else {
        return Ok(DriverConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    DriverConfig::from_json(&text).with_context(|| format!("loading {}", path.display()))
}

fn list(config: &DriverConfig) -> Result<()> {
    let devices = usb::list(config)?;
    if devices.is_empty() {
        println!("no device found");
    }
    for (index, info) in devices.iter().enumerate() {
        match usb::probe(info, config) {
            Ok(dev) => println!(
                "DEVICE {} bus {} {}",
                index,
                dev.key,
                if dev.fingerprint.matches_relay_board() {
                    "relay board"
                } else {
                    "not a relay board"
                }
            ),
            Err(e) => println!("DEVICE {} bus {} unavailable: {:#}", index, usb::bus_key(info), e),
        }
    }
    Ok(())
}

fn set(config: DriverConfig, device: usize, status: &str) -> Result<()> {
    let info = usb::list(&config)?
        .into_iter()
        .nth(device)
        .ok_or_else(|| anyhow!("device {} not found", device))?;
    let probed = usb::probe(&info, &config)?;

    let manager = Manager::new(config, LogEventSink::new());
    let minor = manager
        .on_attach(probed.key, probed.fingerprint, probed.transport)?
        .ok_or_else(|| anyhow!("device {} is not a relay board", device))?;

    let handle = manager.open(minor)?;
    handle.write(status.as_bytes())?;
    println!("status set to {}", handle.device().get_mask()?);
    Ok(())
}

fn console(config: DriverConfig) -> Result<()> {
    let channel: Arc<HotplugChannel<UsbBulkTransport>> = Arc::new(HotplugChannel::new());
    let manager = Arc::new(Manager::new(config.clone(), LogEventSink::new()));

    // The watcher has no stop signal; it ends with the process.
    {
        let channel = Arc::clone(&channel);
        thread::Builder::new()
            .name("usb-watch".into())
            .spawn(move || {
                if let Err(e) = usb::watch(&config, &channel) {
                    warn!("USB watch failed: {:#}", e);
                }
            })
            .context("spawning USB watch thread")?;
    }

    let lifecycle = {
        let channel = Arc::clone(&channel);
        let manager = Arc::clone(&manager);
        thread::Builder::new()
            .name("lifecycle".into())
            .spawn(move || manager.run(&channel))
            .context("spawning lifecycle thread")?
    };

    let mut console = Console::new(&manager);
    let mut stdout = io::stdout().lock();
    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        if !console.execute_line(&line, &mut stdout)? {
            break;
        }
        stdout.flush()?;
    }
    drop(console);

    send_blocking(&channel, HotplugEvent::Shutdown);
    if lifecycle.join().is_err() {
        bail!("lifecycle thread panicked");
    }
    manager.detach_all();
    info!("console closed");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::List => list(&config),
        Command::Set { device, status } => set(config, device, &status),
        Command::Console => console(config),
    }
}
