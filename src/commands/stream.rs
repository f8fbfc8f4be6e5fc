//! Commands that drive a lighting session.
//!
//! The loop here plays the host: it owns the tick cadence and supplies a
//! color for every grid position.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use g67_driver::{ColorProvider, DriverError, LightingSession, Rgb};
use tracing::{debug, warn};

use super::{setup_interrupt_handler, CommandResult};

/// Stream one color to every key until Ctrl+C
pub fn solid(session: &mut LightingSession, fps: f32, color: Rgb) -> CommandResult {
    println!(
        "Streaming ({},{},{}) to {} keys, {} (Ctrl+C to stop)",
        color.r,
        color.g,
        color.b,
        session.topology().len(),
        session.policy()
    );
    run(session, fps, &mut move |_: u16, _: u16| Some(color))
}

/// Light one key until Ctrl+C
pub fn key(session: &mut LightingSession, fps: f32, name: &str, color: Rgb) -> CommandResult {
    let target = session
        .topology()
        .by_name(name)
        .map(|k| (k.column, k.row))
        .ok_or_else(|| anyhow::anyhow!("Unknown key '{name}' (see `keys`)"))?;

    println!("Lighting {name} (Ctrl+C to stop)");
    run(session, fps, &mut move |col: u16, row: u16| {
        Some(if (col, row) == target { color } else { Rgb::BLACK })
    })
}

/// Handshake, then blank everything
pub fn blank(session: &mut LightingSession) -> CommandResult {
    session.initialize()?;
    session.shutdown()?;
    println!("All keys blanked.");
    Ok(())
}

/// Render loop: one tick per frame until interrupted, then shut down.
///
/// Transport failures cost one tick and are retried by the next one;
/// anything else ends the session.
fn run<P>(session: &mut LightingSession, fps: f32, provider: &mut P) -> CommandResult
where
    P: ColorProvider + ?Sized,
{
    let running = setup_interrupt_handler();
    let frame = Duration::from_secs_f32(1.0 / fps);

    session.initialize()?;

    let mut failed_ticks = 0u64;
    let outcome = loop {
        if !running.load(Ordering::SeqCst) {
            break Ok(());
        }
        let started = Instant::now();

        match session.render_tick(provider) {
            Ok(report) => {
                debug!("Tick {}: sent {:?}", session.ticks(), report.sent);
            }
            Err(DriverError::Transport(e)) => {
                failed_ticks += 1;
                warn!("Tick {} dropped: {}", session.ticks(), e);
            }
            Err(e) => break Err(e),
        }

        std::thread::sleep(frame.saturating_sub(started.elapsed()));
    };

    println!("\nBlanking keyboard...");
    let shutdown = session.shutdown();
    if failed_ticks > 0 {
        println!("{failed_ticks} of {} ticks dropped", session.ticks());
    }
    outcome?;
    shutdown?;
    println!("Done.");
    Ok(())
}
