//! Desktop simulator for the SoilGuard node.
//!
//! Runs the real node loop against simulated probes and writes the byte
//! stream a collector would see to stdout. Library logging goes to stderr
//! through `env_logger` (`RUST_LOG=debug` for per-cycle detail).
//!
//! ```text
//! soilguard-sim --fast --cycles 20              two default probes, no sleeping
//! soilguard-sim --config bench.json             custom setup, wall-clock timing
//! soilguard-sim --dump-config > bench.json      starting point for a custom setup
//! ```

mod config;
mod hal;
mod probe;

use std::{io, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use log::{debug, info, warn};

use soilguard_core::{traits::WriteSink, Channel, Node, PowerController};

use crate::{
    config::SimConfig,
    hal::{SimClock, SimDelay},
    probe::SimProbe,
};

#[derive(Parser, Debug)]
#[command(name = "soilguard-sim")]
#[command(about = "Run the soil moisture node against simulated probes", long_about = None)]
struct Args {
    /// Stop after this many cycles (runs forever when omitted)
    #[arg(short, long)]
    cycles: Option<u32>,

    /// JSON description of the node and its probes
    #[arg(long)]
    config: Option<PathBuf>,

    /// Advance a simulated clock instead of sleeping
    #[arg(long)]
    fast: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

type SimNode = Node<SimProbe, probe::SimPin, SimDelay, SimClock, WriteSink<io::Stdout>>;

fn build_node(config: &SimConfig, clock: &SimClock) -> anyhow::Result<SimNode> {
    let mut node = Node::new(
        config.node,
        SimDelay::new(clock.clone()),
        clock.clone(),
        WriteSink::new(io::stdout()),
    )
    .context("node configuration")?;

    for setup in &config.probes {
        let channel_config = setup.channel;
        let (probe, pin) = SimProbe::new(
            setup.model.clone(),
            clock.clone(),
            channel_config.resolution.max_code(),
        );

        let power = match channel_config.power_pin {
            Some(_) => PowerController::switched(pin, channel_config.settle_ms)?,
            None => {
                probe.power_on();
                PowerController::always_on()
            }
        };

        let channel = Channel::new(channel_config, probe, power)
            .with_context(|| format!("probe A{}", channel_config.pin))?;
        node.add_channel(channel)
            .with_context(|| format!("adding probe A{}", channel_config.pin))?;
    }

    Ok(node)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let clock = if args.fast {
        SimClock::stepped()
    } else {
        SimClock::wall()
    };

    info!(
        "Starting soilguard simulator: {} probe(s), {} ms interval, {} clock",
        config.probes.len(),
        config.node.report_interval_ms,
        if args.fast { "stepped" } else { "wall" }
    );

    let mut node = build_node(&config, &clock)?;

    if let Err(e) = node.start() {
        warn!("{}", e);
    }

    let Some(cycles) = args.cycles else {
        node.run();
    };

    let mut faulted = 0;
    for _ in 0..cycles {
        let report = node.wait_cycle();
        debug!(
            "cycle at {} ms: {:?}",
            report.timestamp,
            report.line.as_ref().map(|l| l.as_str())
        );
        if !report.all_valid() {
            faulted += 1;
        }
    }

    info!("Finished {} cycles, {} with a faulted probe", cycles, faulted);
    Ok(())
}
