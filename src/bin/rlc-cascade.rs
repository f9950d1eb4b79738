//! Command-line front end: reads a `.net` file, sweeps it and writes CSV.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rlc_cascade::format::write_response_csv;
use rlc_cascade::netlist::Netlist;
use rlc_cascade::simulation::{ErrorPolicy, Execution};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Stop at the first undefined frequency.
    Abort,
    /// Write `undefined` cells and keep going.
    Undefined,
}

impl From<Policy> for ErrorPolicy {
    fn from(p: Policy) -> Self {
        match p {
            Policy::Abort => Self::Abort,
            Policy::Undefined => Self::MarkUndefined,
        }
    }
}

#[derive(Parser)]
#[command(name = "rlc-cascade")]
#[command(about = "Frequency response of cascaded RLC ladder networks", long_about = None)]
#[command(version)]
struct Cli {
    /// Input netlist file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output CSV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Handling of physically undefined frequency points
    #[arg(long, value_enum, default_value_t = Policy::Abort)]
    policy: Policy,

    /// Evaluate frequencies on a worker pool
    #[arg(long)]
    parallel: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let netlist = Netlist::read(&cli.input)
        .with_context(|| format!("failed to read netlist {}", cli.input.display()))?;

    let execution = if cli.parallel {
        Execution::Parallel
    } else {
        Execution::Sequential
    };
    let result = netlist
        .analyse(cli.policy.into(), execution)
        .with_context(|| format!("analysis of {} failed", cli.input.display()))?;

    let file = File::create(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    write_response_csv(
        BufWriter::new(file),
        &result,
        &netlist.outputs,
        netlist.excitation,
        netlist.cascade.source_impedance(),
    )
    .with_context(|| format!("failed to write {}", cli.output.display()))?;

    info!(
        points = result.len(),
        undefined = result.failures().count(),
        output = %cli.output.display(),
        "wrote frequency response"
    );
    Ok(())
}
