//! Command line interface for running power sweeps on a Keysight PNA.

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;

use gpibrs::VisaInterface;
use keysight_pna::{AveragingWait, Pna, SParameter, SweepConfig};
use measurements::Frequency;
use powersweep::{PowerSweep, acquire_and_save, address_candidates, connect, run_power_sweep};

#[derive(Parser)]
#[command(
    name = "powersweep",
    version,
    about = "Automated S-parameter power sweeps on a Keysight PNA"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a power sweep: one acquisition per linearly spaced power level, collected in a
    /// per-temperature run directory with a conditions manifest.
    Sweep(SweepArgs),
    /// Run a single acquisition at a fixed power and write one data file.
    Single(SingleArgs),
}

#[derive(Args)]
struct SweepArgs {
    /// Source power of the first sweep in dB.
    #[arg(long, allow_hyphen_values = true)]
    start_power: f64,
    /// Source power of the last sweep in dB.
    #[arg(long, allow_hyphen_values = true)]
    end_power: f64,
    /// Number of sweeps, at least 2.
    #[arg(long)]
    sweeps: usize,
    /// Average count of the first sweep.
    #[arg(long, default_value_t = 100.0)]
    averages: f64,
    #[command(flatten)]
    acquisition: AcquisitionArgs,
    #[command(flatten)]
    connection: ConnectionArgs,
}

#[derive(Args)]
struct SingleArgs {
    /// Source power in dB.
    #[arg(long, default_value_t = -30.0, allow_hyphen_values = true)]
    power: f64,
    /// Average count.
    #[arg(long, default_value_t = 100.0)]
    averages: f64,
    #[command(flatten)]
    acquisition: AcquisitionArgs,
    #[command(flatten)]
    connection: ConnectionArgs,
}

#[derive(Args)]
struct AcquisitionArgs {
    /// Center frequency in GHz.
    #[arg(long)]
    center: f64,
    /// Frequency span in MHz.
    #[arg(long)]
    span: f64,
    /// Sample stage temperature in mK, labels the output files.
    #[arg(long)]
    temperature: f64,
    /// Electrical delay in ns.
    #[arg(long, default_value_t = 40.0)]
    edelay: f64,
    /// IF bandwidth in kHz.
    #[arg(long, default_value_t = 5.0)]
    if_bandwidth: f64,
    /// Number of sweep points.
    #[arg(long, default_value_t = 201)]
    points: u32,
    /// Output file path template.
    #[arg(long, default_value = "results.csv")]
    output: PathBuf,
    /// S-parameter to measure.
    #[arg(long, default_value = "S21")]
    s_parameter: SParameter,
}

#[derive(Args)]
struct ConnectionArgs {
    /// VISA resource string to try before the default GPIB address.
    #[arg(long)]
    address: Option<String>,
    /// Timeout in seconds for opening the connection and reading responses.
    #[arg(long, default_value_t = 3)]
    open_timeout_s: u64,
    /// Pause in milliseconds between two averaging status polls.
    #[arg(long, default_value_t = 200)]
    poll_interval_ms: u64,
    /// Abort the averaging wait after this many seconds instead of waiting forever.
    #[arg(long)]
    timeout_s: Option<u64>,
}

impl ConnectionArgs {
    fn averaging_wait(&self) -> AveragingWait {
        AveragingWait {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            timeout: self.timeout_s.map(Duration::from_secs),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Sweep(args) => sweep(args),
        Command::Single(args) => single(args),
    }
}

/// Open the analyzer, trying the caller-supplied address before the default one.
fn open_pna(
    visa: &VisaInterface,
    connection: &ConnectionArgs,
) -> anyhow::Result<Pna<gpibrs::Instrument<visa_rs::Instrument>>> {
    let candidates = address_candidates(connection.address.as_deref());
    let interface = connect(
        visa,
        &candidates,
        Duration::from_secs(connection.open_timeout_s),
    )
    .context("Could not connect to the analyzer")?;
    let mut pna = Pna::try_new(interface)?;
    info!("Instrument: {}", pna.identity()?);
    Ok(pna)
}

fn sweep(args: SweepArgs) -> anyhow::Result<()> {
    let mut plan = PowerSweep::try_new(
        args.start_power,
        args.end_power,
        args.sweeps,
        Frequency::from_gigahertz(args.acquisition.center),
        Frequency::from_megahertz(args.acquisition.span),
        args.acquisition.temperature,
    )?;
    plan.base_averages = args.averages;
    plan.electrical_delay_ns = args.acquisition.edelay;
    plan.if_bandwidth = Frequency::from_kilohertz(args.acquisition.if_bandwidth);
    plan.point_count = args.acquisition.points;
    plan.s_parameter = args.acquisition.s_parameter;

    let visa = VisaInterface::try_new()?;
    let mut pna = open_pna(&visa, &args.connection)?;

    let run_dir = run_power_sweep(
        &mut pna,
        &plan,
        &args.acquisition.output,
        &args.connection.averaging_wait(),
    )
    .context("Power sweep failed")?;
    info!("Power sweep finished, results in {}", run_dir.display());

    Ok(())
}

fn single(args: SingleArgs) -> anyhow::Result<()> {
    let mut config = SweepConfig::new(
        Frequency::from_gigahertz(args.acquisition.center),
        Frequency::from_megahertz(args.acquisition.span),
    );
    config.point_count = args.acquisition.points;
    config.if_bandwidth = Frequency::from_kilohertz(args.acquisition.if_bandwidth);
    config.power_db = args.power;
    config.electrical_delay_ns = args.acquisition.edelay;
    config.average_count = args.averages;
    config.s_parameter = args.acquisition.s_parameter;

    let visa = VisaInterface::try_new()?;
    let mut pna = open_pna(&visa, &args.connection)?;

    pna.configure(&config)?;
    let path = acquire_and_save(
        &mut pna,
        config.point_count,
        &args.acquisition.output,
        config.power_db,
        args.acquisition.temperature,
        &args.connection.averaging_wait(),
    )
    .context("Acquisition failed")?;
    info!("Acquisition finished, results in {}", path.display());

    Ok(())
}
