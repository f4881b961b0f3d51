//! Automated S-parameter power sweeps on a Keysight PNA.
//!
//! This crate drives frequency-sweep measurements across a descending (or ascending) list of
//! source power levels for cryogenic device characterization. Each power level is acquired
//! with a geometrically escalating average count to compensate the loss of signal-to-noise as
//! the power drops, and written to a per-level delimited text file. All artifacts of one run,
//! including a conditions manifest recording the input parameters, are collected in a
//! per-temperature run directory.
//!
//! The analyzer is driven through the [`keysight_pna`] driver over any
//! [`gpibrs::InstrumentInterface`], so the whole sweep logic can be exercised against the
//! [`gpibrs::LoopbackInterface`] without hardware.
//!
//! # Example
//!
//! This example drives the sweep over a SCPI-over-LAN connection. For a GPIB-attached
//! analyzer, enable the `visa` feature and open the connection with `connect`, which tries
//! an ordered list of VISA addresses.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use gpibrs::TcpIpInterface;
//! use keysight_pna::{AveragingWait, Pna};
//! use measurements::Frequency;
//! use powersweep::{PowerSweep, run_power_sweep};
//!
//! // Sweep from -10 dB down to -30 dB in 5 steps around 4.5 GHz at 20 mK.
//! let plan = PowerSweep::try_new(
//!     -10.0,
//!     -30.0,
//!     5,
//!     Frequency::from_gigahertz(4.5),
//!     Frequency::from_megahertz(10.0),
//!     20.0,
//! )
//! .unwrap();
//!
//! let interface = TcpIpInterface::try_new("192.168.10.1:5025").unwrap();
//! let mut pna = Pna::try_new(interface).unwrap();
//!
//! let run_dir = run_power_sweep(
//!     &mut pna,
//!     &plan,
//!     Path::new("results.csv"),
//!     &AveragingWait::default(),
//! )
//! .unwrap();
//! println!("results in {}", run_dir.display());
//! ```

#![warn(missing_docs)]

#[cfg(feature = "visa")]
mod connect;
pub mod output;
mod plan;
mod run;

#[cfg(feature = "visa")]
pub use connect::{DEFAULT_ADDRESS, address_candidates, connect};
pub use plan::{PowerLevel, PowerSweep};
pub use run::{acquire_and_save, run_power_sweep};

use std::path::PathBuf;

use thiserror::Error;

/// The error enum for power sweeps.
///
/// Wraps the instrument and filesystem errors a sweep can run into, next to the plan
/// validation failures of this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SweepError {
    /// The instrument could not be reached or misbehaved. See
    /// [`gpibrs::InstrumentError`] for details.
    #[error(transparent)]
    Instrument(#[from] gpibrs::InstrumentError),
    /// A data file, manifest, or run directory could not be created or written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The output path has no file name to derive artifact names from.
    #[error("Output path has no file name: {0}")]
    InvalidOutputPath(PathBuf),
    /// No addresses were given to try connecting to.
    #[error("No instrument addresses to try")]
    NoAddressCandidates,
    /// A power sweep needs at least two sweeps to derive a power step.
    #[error("A power sweep needs at least 2 sweeps, got {0}")]
    SweepCountTooSmall(usize),
}
