//! Acquisition and the sequential power-sweep driver.

use std::path::{Path, PathBuf};

use gpibrs::InstrumentInterface;
use keysight_pna::{AveragingWait, Pna};
use log::info;

use crate::{PowerSweep, SweepError, output};

/// Acquire one averaged measurement from a configured analyzer and write it to disk.
///
/// Selects the measurement trace, sets ASCII transfers, enables the source output, blocks
/// until the analyzer reports that averaging has completed, reads the measurement, and writes
/// it to the data file derived from `base` and the power/temperature labels. The analyzer
/// must have been configured with [`Pna::configure`] before this call.
///
/// Returns the path of the written data file. Any transport or filesystem failure propagates
/// and aborts the acquisition; files from previously completed acquisitions stay on disk.
///
/// # Arguments
/// * `pna` - The configured analyzer.
/// * `point_count` - The number of sweep points the analyzer was configured with.
/// * `base` - Output file path template, e.g., `results.csv`.
/// * `power_db` - Source power label for the data file name.
/// * `temperature_mk` - Temperature label for the data file name.
/// * `wait` - Poll interval and optional deadline for the averaging wait.
pub fn acquire_and_save<T: InstrumentInterface>(
    pna: &mut Pna<T>,
    point_count: u32,
    base: &Path,
    power_db: f64,
    temperature_mk: f64,
    wait: &AveragingWait,
) -> Result<PathBuf, SweepError> {
    pna.select_measurement()?;
    pna.set_ascii_format()?;
    pna.enable_output()?;

    info!("Waiting for averaging to complete at {power_db} dB");
    pna.wait_for_averaging(wait)?;

    let trace = pna.read_measurement(point_count)?;
    let path = output::data_file_path(base, power_db, temperature_mk);
    output::write_trace(&path, &trace)?;
    info!("Wrote {} sweep points to {}", trace.len(), path.display());

    Ok(path)
}

/// Run a full power sweep, one acquisition per power level.
///
/// Creates the run directory next to `base`, writes the conditions manifest into it, and then
/// works through the power levels of the plan strictly one after another, since they share
/// the single instrument connection. Each level programs a fresh sweep configuration with its
/// escalated average count before acquiring.
///
/// Returns the run directory. A failed level aborts the run and leaves the files of prior
/// completed levels intact.
///
/// # Arguments
/// * `pna` - The analyzer to sweep.
/// * `plan` - The power sweep plan.
/// * `base` - Output file path template, e.g., `results.csv`.
/// * `wait` - Poll interval and optional deadline for the averaging waits.
pub fn run_power_sweep<T: InstrumentInterface>(
    pna: &mut Pna<T>,
    plan: &PowerSweep,
    base: &Path,
    wait: &AveragingWait,
) -> Result<PathBuf, SweepError> {
    plan.validate()?;

    let file_name = base
        .file_name()
        .ok_or_else(|| SweepError::InvalidOutputPath(base.to_path_buf()))?;
    let run_dir = output::create_run_directory(base, plan.temperature_mk)?;
    let run_base = run_dir.join(file_name);

    output::write_conditions(
        &output::conditions_file_path(&run_base, plan.temperature_mk),
        plan,
    )?;

    let levels = plan.levels();
    info!(
        "Power sweep: {} levels from {} dB to {} dB into {}",
        levels.len(),
        plan.start_power,
        plan.end_power,
        run_dir.display()
    );

    for level in &levels {
        info!(
            "Sweep at {} dB with {} averages",
            level.power_db,
            level.averages.max(1.0).floor()
        );
        pna.configure(&plan.config_for(level))?;
        acquire_and_save(
            pna,
            plan.point_count,
            &run_base,
            level.power_db,
            plan.temperature_mk,
            wait,
        )?;
    }

    Ok(run_dir)
}
