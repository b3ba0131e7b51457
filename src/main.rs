use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rlc_filter::circuits::analysis::write_frequency_response_csv;
use rlc_filter::circuits::diagram::to_dot;
use rlc_filter::circuits::netlist::write_netlist;
use rlc_filter::config::{AnalysisConfig, TopologyConfig};
use rlc_filter::errors::Result;
use rlc_filter::simulation::{Oscilloscope, ScopeConfig, StopReason, SystemClock};

/// RLC filter topology editor and two-port analyzer
#[derive(Parser)]
#[command(name = "rlc-filter", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a topology file into a SPICE-like netlist
    Netlist {
        /// Topology TOML file
        topology: PathBuf,
        /// Write the netlist here instead of stdout (e.g. circuit.sp)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a Graphviz diagram of a topology file
    Diagram {
        /// Topology TOML file
        topology: PathBuf,
    },
    /// Print the Bode frequency response of a two-port as CSV
    Sweep {
        /// Analysis TOML file
        config: PathBuf,
        /// Override the lower sweep bound (Hz)
        #[arg(long)]
        min_hz: Option<f64>,
        /// Override the upper sweep bound (Hz)
        #[arg(long)]
        max_hz: Option<f64>,
    },
    /// Run the oscilloscope and print one line per frame
    Scope {
        /// Analysis TOML file
        config: PathBuf,
        /// Override the frame bound
        #[arg(long)]
        frames: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match command {
        Command::Netlist { topology, output } => {
            let netlist = TopologyConfig::load(topology)?.build()?.generate_netlist();
            match output {
                Some(path) => write_netlist(BufWriter::new(File::create(path)?), &netlist)?,
                None => write_netlist(&mut stdout, &netlist)?,
            }
        }
        Command::Diagram { topology } => {
            let topology = TopologyConfig::load(topology)?.build()?;
            writeln!(stdout, "{}", to_dot(&topology))?;
        }
        Command::Sweep { config, min_hz, max_hz } => {
            let cfg = AnalysisConfig::load(config)?;
            let response = cfg.model().frequency_response(
                min_hz.unwrap_or(cfg.sweep.min_hz),
                max_hz.unwrap_or(cfg.sweep.max_hz),
            )?;
            write_frequency_response_csv(&mut stdout, &response)?;
        }
        Command::Scope { config, frames } => {
            let cfg = AnalysisConfig::load(config)?;
            let mut scope_cfg: ScopeConfig = cfg.scope.into();
            if frames.is_some() {
                scope_cfg.max_frames = frames;
            }
            let mut scope = Oscilloscope::new(&cfg.model(), scope_cfg, SystemClock::new())?;
            writeln!(stdout, "frame,elapsed_ms,vin_0,vout_0,vout_peak")?;
            let report = scope.run(|frame| {
                let peak = frame.output.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
                writeln!(
                    stdout,
                    "{},{},{:.6},{:.6},{:.6}",
                    frame.index,
                    frame.elapsed.as_millis(),
                    frame.input.first().copied().unwrap_or(0.0),
                    frame.output.first().copied().unwrap_or(0.0),
                    peak
                )
            });
            if let StopReason::FrameError(msg) = &report.stop {
                eprintln!("Simulation error after {} frames: {msg}", report.frames);
            }
        }
    }
    Ok(())
}
