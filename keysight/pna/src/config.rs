//! Sweep configuration for a single acquisition.

use std::{fmt::Display, str::FromStr};

use gpibrs::InstrumentError;
use measurements::Frequency;

/// Scattering parameter measured by a two-port analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SParameter {
    /// Port 1 reflection.
    S11,
    /// Port 2 to port 1 transmission.
    S12,
    /// Port 1 to port 2 transmission.
    S21,
    /// Port 2 reflection.
    S22,
}

impl SParameter {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            SParameter::S11 => "S11",
            SParameter::S12 => "S12",
            SParameter::S21 => "S21",
            SParameter::S22 => "S22",
        }
    }
}

impl Display for SParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SParameter {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S11" => Ok(SParameter::S11),
            "S12" => Ok(SParameter::S12),
            "S21" => Ok(SParameter::S21),
            "S22" => Ok(SParameter::S22),
            _ => Err(InstrumentError::InvalidArgument(format!(
                "Unknown S-parameter: {s}. Expected one of S11, S12, S21, S22."
            ))),
        }
    }
}

/// Parameters for a single frequency sweep.
///
/// A `SweepConfig` is constructed fresh for every acquisition and written to the instrument
/// with [`crate::Pna::configure`]. The analyzer itself holds the configuration between
/// acquisitions; this bundle is never mutated after it is handed to the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    /// Number of sweep points.
    pub point_count: u32,
    /// Center frequency of the sweep.
    pub center_frequency: Frequency,
    /// Frequency span of the sweep.
    pub span: Frequency,
    /// IF bandwidth, controls the noise floor and sweep speed.
    pub if_bandwidth: Frequency,
    /// Source power in dB.
    pub power_db: f64,
    /// Electrical delay in ns, compensates the phase slope of the cable path.
    pub electrical_delay_ns: f64,
    /// Number of sweeps to average. Floored to an integer and clamped to a minimum of 1 when
    /// written to the instrument. Kept as a float because power-sweep average escalation
    /// produces fractional counts.
    pub average_count: f64,
    /// The S-parameter bound to the measurement trace.
    pub s_parameter: SParameter,
}

impl SweepConfig {
    /// Create a sweep configuration for the given sweep geometry.
    ///
    /// All remaining parameters start at their customary defaults (-30 dB source power, 100
    /// averages, 40 ns electrical delay, 5 kHz IF bandwidth, 201 points, S21) and can be
    /// adjusted through the public fields.
    ///
    /// # Arguments
    /// * `center_frequency` - Center frequency of the sweep.
    /// * `span` - Frequency span of the sweep.
    pub fn new(center_frequency: Frequency, span: Frequency) -> Self {
        SweepConfig {
            point_count: 201,
            center_frequency,
            span,
            if_bandwidth: Frequency::from_kilohertz(5.0),
            power_db: -30.0,
            electrical_delay_ns: 40.0,
            average_count: 100.0,
            s_parameter: SParameter::S21,
        }
    }
}
