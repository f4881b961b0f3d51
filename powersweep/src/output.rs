//! Output artifacts of a sweep: data files, the conditions manifest, and the run directory.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use keysight_pna::MeasurementTrace;

use crate::PowerSweep;

/// The base file name with any `.csv` suffix stripped.
fn base_stem(base: &Path) -> String {
    let name = match base.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => String::new(),
    };
    name.strip_suffix(".csv").unwrap_or(&name).to_string()
}

/// The data file path for one acquisition at the given power and temperature.
///
/// The base file name is stripped of any `.csv` suffix and labeled with the power and
/// temperature, e.g., base `results.csv` at -30 dB and 20 mK becomes
/// `results_-30dB_20mK.csv`.
pub fn data_file_path(base: &Path, power_db: f64, temperature_mk: f64) -> PathBuf {
    base.with_file_name(format!(
        "{}_{power_db}dB_{temperature_mk}mK.csv",
        base_stem(base)
    ))
}

/// The conditions manifest path for a sweep at the given temperature.
pub fn conditions_file_path(base: &Path, temperature_mk: f64) -> PathBuf {
    base.with_file_name(format!(
        "{}_{temperature_mk}mK_conditions.csv",
        base_stem(base)
    ))
}

/// Create the directory that collects all artifacts of one sweep run.
///
/// The directory is named `{base stem}__{temperature}mK` next to the base path. If that name
/// is already taken, an increasing integer suffix is appended until a free name is found.
pub fn create_run_directory(base: &Path, temperature_mk: f64) -> io::Result<PathBuf> {
    let stem = base_stem(base);
    let mut dir = base.with_file_name(format!("{stem}__{temperature_mk}mK"));
    let mut suffix = 1u32;
    while dir.exists() {
        dir = base.with_file_name(format!("{stem}__{temperature_mk}mK{suffix}"));
        suffix += 1;
    }
    fs::create_dir(&dir)?;
    Ok(dir)
}

/// Write a measurement trace as delimited text, one `frequency,magnitude,phase` line per
/// sweep point. No header row, no quoting.
pub fn write_trace(path: &Path, trace: &MeasurementTrace) -> io::Result<()> {
    let mut file = File::create(path)?;
    for (frequency, magnitude, phase) in trace.rows() {
        writeln!(file, "{frequency},{magnitude},{phase}")?;
    }
    Ok(())
}

/// Write the conditions manifest recording all input parameters of a sweep run.
pub fn write_conditions(path: &Path, plan: &PowerSweep) -> io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "STARTPOWER: {} dB", plan.start_power)?;
    writeln!(file, "ENDPOWER: {} dB", plan.end_power)?;
    writeln!(file, "NUMSWEEPS: {}", plan.sweep_count)?;
    writeln!(file, "CENTERF: {} GHz", plan.center_frequency.as_gigahertz())?;
    writeln!(file, "SPAN: {} MHz", plan.span.as_megahertz())?;
    writeln!(file, "TEMP: {} mK", plan.temperature_mk)?;
    writeln!(file, "STARTING AVERAGES: {}", plan.base_averages)?;
    writeln!(file, "EDELAY: {} ns", plan.electrical_delay_ns)?;
    writeln!(file, "IFBAND: {} kHz", plan.if_bandwidth.as_kilohertz())?;
    writeln!(file, "POINTS: {}", plan.point_count)?;
    Ok(())
}
