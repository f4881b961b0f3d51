//! Tests for the output artifacts: file naming, run directories, and file contents.

use std::{fs, path::Path};

use keysight_pna::MeasurementTrace;
use measurements::Frequency;
use rstest::*;

use powersweep::{PowerSweep, output};

/// Data file naming strips the `.csv` suffix and labels power and temperature.
#[rstest]
fn test_data_file_path() {
    let path = output::data_file_path(Path::new("results.csv"), -30.0, 20.0);
    assert_eq!(path, Path::new("results_-30dB_20mK.csv"));
}

/// A base name without a `.csv` suffix is kept as is.
#[rstest]
fn test_data_file_path_other_suffix() {
    let path = output::data_file_path(Path::new("results.dat"), -30.0, 20.0);
    assert_eq!(path, Path::new("results.dat_-30dB_20mK.csv"));
}

/// The directory part of the base path is preserved.
#[rstest]
fn test_data_file_path_with_directory() {
    let path = output::data_file_path(Path::new("out/results.csv"), -12.5, 20.0);
    assert_eq!(path, Path::new("out/results_-12.5dB_20mK.csv"));
}

#[rstest]
fn test_conditions_file_path() {
    let path = output::conditions_file_path(Path::new("results.csv"), 20.0);
    assert_eq!(path, Path::new("results_20mK_conditions.csv"));
}

/// Colliding run directories are probed with an increasing integer suffix.
#[rstest]
fn test_create_run_directory_collision() {
    let tmp = tempfile::tempdir().unwrap();
    let base = tmp.path().join("results.csv");

    let first = output::create_run_directory(&base, 20.0).unwrap();
    assert_eq!(first, tmp.path().join("results__20mK"));
    assert!(first.is_dir());

    let second = output::create_run_directory(&base, 20.0).unwrap();
    assert_eq!(second, tmp.path().join("results__20mK1"));
    assert!(second.is_dir());

    let third = output::create_run_directory(&base, 20.0).unwrap();
    assert_eq!(third, tmp.path().join("results__20mK2"));
}

/// Different temperatures get separate run directories without probing.
#[rstest]
fn test_create_run_directory_per_temperature() {
    let tmp = tempfile::tempdir().unwrap();
    let base = tmp.path().join("results.csv");

    output::create_run_directory(&base, 20.0).unwrap();
    let other = output::create_run_directory(&base, 35.0).unwrap();
    assert_eq!(other, tmp.path().join("results__35mK"));
}

/// A trace is written as one `frequency,magnitude,phase` line per sweep point, no header.
#[rstest]
fn test_write_trace() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("results_-30dB_20mK.csv");

    let trace = MeasurementTrace {
        frequencies: vec![4.495e9, 4.5e9, 4.505e9],
        magnitude: vec![-10.5, -11.5, -12.5],
        phase: vec![1.5, 2.5, 3.5],
    };
    output::write_trace(&path, &trace).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "4495000000,-10.5,1.5\n4500000000,-11.5,2.5\n4505000000,-12.5,3.5\n"
    );
}

/// The conditions manifest records one labeled line per parameter, with units.
#[rstest]
fn test_write_conditions() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("results_20mK_conditions.csv");

    let plan = PowerSweep::try_new(
        -10.0,
        -30.0,
        3,
        Frequency::from_gigahertz(4.5),
        Frequency::from_megahertz(10.0),
        20.0,
    )
    .unwrap();
    output::write_conditions(&path, &plan).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "STARTPOWER: -10 dB\n\
         ENDPOWER: -30 dB\n\
         NUMSWEEPS: 3\n\
         CENTERF: 4.5 GHz\n\
         SPAN: 10 MHz\n\
         TEMP: 20 mK\n\
         STARTING AVERAGES: 100\n\
         EDELAY: 40 ns\n\
         IFBAND: 5 kHz\n\
         POINTS: 201\n"
    );
}
