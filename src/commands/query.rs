//! Commands that only inspect configuration, plus device listing.

use g67_driver::{ColorStore, PacketEncoder, Rgb};
use g67_transport::HidDiscovery;
use hidapi::HidApi;

use super::{CommandResult, Settings};

/// List connected keyboards
pub fn list(settings: &Settings, all: bool) -> CommandResult {
    let profile = &settings.profile;

    if all {
        let api = HidApi::new()?;
        let mut found = 0;
        for dev in api.device_list() {
            if dev.vendor_id() != profile.vid || dev.product_id() != profile.pid {
                continue;
            }
            found += 1;
            let marker = if dev.interface_number() == profile.interface_number {
                "*"
            } else {
                " "
            };
            println!(
                "{} if={} usage_page=0x{:04X} usage=0x{:04X} path={}",
                marker,
                dev.interface_number(),
                dev.usage_page(),
                dev.usage(),
                dev.path().to_string_lossy()
            );
        }
        if found == 0 {
            println!("No {} connected", profile.name);
        }
        return Ok(());
    }

    let devices =
        HidDiscovery::for_identity(profile.vid, profile.pid, profile.interface_number)
            .list_devices()?;
    if devices.is_empty() {
        println!("No {} connected", profile.name);
    }
    for dev in devices {
        println!(
            "{:04X}:{:04X} {} ({})",
            dev.info.vid,
            dev.info.pid,
            dev.info.product_name.as_deref().unwrap_or(&profile.name),
            dev.info.device_path
        );
    }
    Ok(())
}

/// Show profile, memory partition and active chunks
pub fn info(settings: &Settings) -> CommandResult {
    let profile = &settings.profile;
    let layout = profile.layout()?;
    let topology = profile.topology()?;
    let active = layout.active_chunks(&topology)?;

    println!("Device:      {}", profile.name);
    println!(
        "Identity:    {:04X}:{:04X} interface {}",
        profile.vid, profile.pid, profile.interface_number
    );
    println!(
        "Memory:      {} slots x {} bytes, {} chunks of {}",
        layout.slot_count(),
        layout.bytes_per_slot(),
        layout.chunk_count(),
        layout.chunk_size()
    );
    println!("Report:      {} bytes", profile.report_len);
    let (columns, rows) = topology.grid_size();
    match topology.max_slot() {
        Some(max) => println!(
            "Keys:        {} (grid {}x{}, highest slot {})",
            topology.len(),
            columns,
            rows,
            max
        ),
        None => println!("Keys:        none"),
    }
    println!("Policy:      {}", settings.config.policy);
    println!("FPS:         {}", settings.config.fps);
    println!();
    println!("Chunks:");
    for base in layout.chunk_bases() {
        let keys: Vec<&str> = topology
            .keys()
            .iter()
            .filter(|k| layout.chunk_slots(base).contains(&k.slot))
            .map(|k| k.name.as_str())
            .collect();
        let status = if active.contains(&base) { "active" } else { "idle" };
        println!(
            "  {:3} @0x{:04X} {:6} {}",
            base,
            layout.byte_address(base),
            status,
            keys.join(" ")
        );
    }
    Ok(())
}

/// Print the key table
pub fn keys(settings: &Settings) -> CommandResult {
    let topology = settings.profile.topology()?;
    println!("{:<12} {:>4} {:>4} {:>4}", "KEY", "SLOT", "COL", "ROW");
    for key in topology.keys() {
        println!(
            "{:<12} {:>4} {:>4} {:>4}",
            key.name, key.slot, key.column, key.row
        );
    }
    Ok(())
}

/// Print encoded reports
pub fn dump(settings: &Settings, chunk: Option<usize>, color: Option<Vec<u8>>) -> CommandResult {
    let profile = &settings.profile;
    let layout = profile.layout()?;
    let topology = profile.topology()?;
    let active = layout.active_chunks(&topology)?;
    let encoder = PacketEncoder::new(profile, layout);

    let color = match color.as_deref() {
        Some([r, g, b]) => Rgb::new(*r, *g, *b),
        Some(_) => anyhow::bail!("--color takes exactly three values"),
        None => Rgb::BLACK,
    };
    let mut store = ColorStore::new(layout.slot_count());
    store.update(&topology, &mut |_: u16, _: u16| Some(color))?;

    if let Some(base) = chunk {
        if !active.contains(&base) {
            anyhow::bail!("{base} is not an active chunk base (active: {active:?})");
        }
    }

    println!("mode switch: {}", hex(&encoder.mode_switch()));
    for base in active.iter().copied().filter(|b| chunk.map_or(true, |c| c == *b)) {
        println!(
            "chunk {:3}:  {}",
            base,
            hex(&encoder.encode_chunk(base, store.snapshot()))
        );
    }
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
