//! Command handlers for the CLI application.
//!
//! - `query`: commands that never open the device (info, keys, dump) plus list
//! - `stream`: commands that run a lighting session (solid, key, blank)

pub mod query;
pub mod stream;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use g67_driver::{DeviceProfile, DriverConfig, LightingSession, UpdatePolicy};
use g67_transport::{
    HidDiscovery, LoopbackTransport, PrinterConfig, PrinterTransport, Transport,
    TransportDeviceInfo,
};
use tracing::info;

use crate::cli::{Cli, PolicyArg};

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Config file merged with command-line overrides
pub struct Settings {
    pub config: DriverConfig,
    pub profile: DeviceProfile,
}

impl Settings {
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = DriverConfig::load(cli.config.as_deref())?;

        if let Some(path) = &cli.profile {
            config.profile = Some(path.clone());
        }
        if let Some(fps) = cli.fps {
            config.fps = fps;
        }
        match (cli.policy, cli.per_tick) {
            (Some(PolicyArg::Full), _) => config.policy = UpdatePolicy::Full,
            (Some(PolicyArg::Dirty), _) => config.policy = UpdatePolicy::Dirty,
            (Some(PolicyArg::RoundRobin), n) => {
                config.policy = UpdatePolicy::RoundRobin {
                    chunks_per_tick: n.unwrap_or(1),
                }
            }
            (None, Some(n)) => {
                config.policy = UpdatePolicy::RoundRobin { chunks_per_tick: n };
            }
            (None, None) => {}
        }
        config.validate()?;

        let profile = config
            .device_profile()
            .context("Failed to load device profile")?;
        Ok(Self { config, profile })
    }
}

fn printer_config(cli: &Cli) -> Option<PrinterConfig> {
    cli.monitor
        .then(|| PrinterConfig::default().with_hex(cli.hex).with_pauses(true))
}

/// Open the keyboard (or a loopback in dry-run mode)
pub fn open_transport(cli: &Cli, profile: &DeviceProfile) -> anyhow::Result<Arc<dyn Transport>> {
    if cli.dry_run {
        info!("Dry run: reports are recorded, not sent");
        let info = TransportDeviceInfo::loopback(profile.vid, profile.pid, profile.interface_number);
        let loopback: Arc<dyn Transport> = Arc::new(LoopbackTransport::new(info).with_real_pauses());
        return Ok(match printer_config(cli) {
            Some(config) => PrinterTransport::wrap(loopback, config),
            None => loopback,
        });
    }

    let transport =
        HidDiscovery::for_identity(profile.vid, profile.pid, profile.interface_number)
            .printer_config(printer_config(cli))
            .open_first()
            .with_context(|| format!("Failed to open {}", profile.name))?;
    let info = transport.device_info();
    info!(
        "Opened {:04X}:{:04X} interface {} at {}",
        info.vid, info.pid, info.interface_number, info.device_path
    );
    Ok(transport)
}

/// Build a session from resolved settings
pub fn open_session(cli: &Cli, settings: &Settings) -> anyhow::Result<LightingSession> {
    let transport = open_transport(cli, &settings.profile)?;
    let session =
        LightingSession::new(settings.profile.clone(), settings.config.policy, transport)?;
    Ok(session)
}

/// Setup Ctrl+C handler, returns running flag
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    running
}
