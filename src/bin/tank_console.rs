//! Desktop console for the serial command source.
//!
//! Reads one command per line from stdin, drives a [`SerialSource`]
//! through a [`TankController`] and prints the tank state as a JSON line
//! every time it changes. Closing stdin (Ctrl-D, or the end of a piped
//! file) disconnects the source, which drops the outputs to neutral, and
//! the console exits.
//!
//! # Usage
//!
//! ```bash
//! cargo run --features console --bin tank_console
//! printf 'gear_up\nforward_press\nfire_press\n' | cargo run --features console --bin tank_console
//!
//! # With a JSON config file (see `tank_control::Config`)
//! cargo run --features console --bin tank_console -- tank.json
//! ```

use std::convert::Infallible;
use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tank_control::hal::{ChannelLines, SystemClock};
use tank_control::traits::{Actuators, Clock};
use tank_control::{Config, ControlSource, SerialSource, TankController, TankState};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Poll loop interval in milliseconds
const LOOP_INTERVAL_MS: u64 = 10;

/// Stand-in for the motor and servo drivers: logs every command.
struct ConsoleActuators;

impl Actuators for ConsoleActuators {
    type Error = Infallible;

    fn set_tracks(&mut self, left: i8, right: i8) -> Result<(), Infallible> {
        info!(left, right, "tracks");
        Ok(())
    }

    fn set_turret(&mut self, rotation: i8, elevation: i8) -> Result<(), Infallible> {
        info!(rotation, elevation, "turret");
        Ok(())
    }

    fn set_flamethrower(&mut self, active: bool) -> Result<(), Infallible> {
        info!(active, "flamethrower");
        Ok(())
    }
}

fn load_config() -> anyhow::Result<Config> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(Config::default());
    };
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
    let config =
        serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))?;
    info!(%path, "loaded config");
    Ok(config)
}

fn spawn_stdin_reader(tx: mpsc::Sender<String>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    })
}

fn print_state(out: &mut impl Write, state: &TankState) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, state)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default tracing subscriber")?;

    let config = load_config()?;

    let (tx, rx) = mpsc::channel();
    let reader = spawn_stdin_reader(tx);

    let source = SerialSource::new(ChannelLines::new(rx), &config);
    let mut tank = TankController::new(source, ConsoleActuators);
    let clock = SystemClock::new();
    let mut stdout = io::stdout().lock();
    let mut last: Option<TankState> = None;

    info!(
        interval_ms = config.control.update_interval_ms,
        "tank console ready, one command per line"
    );

    loop {
        tank.tick(clock.now_ms())?;

        let state = tank.state();
        if last != Some(state) {
            print_state(&mut stdout, &state)?;
            last = Some(state);
        }

        if !tank.source().is_connected() {
            break;
        }
        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }

    tank.shutdown()?;
    if reader.join().is_err() {
        anyhow::bail!("stdin reader thread panicked");
    }
    info!("input closed, exiting");
    Ok(())
}
