//! Trace formats and measurement data read back from the analyzer.

use std::fmt::Display;

use gpibrs::InstrumentError;

/// Display format of the measurement trace, selects what `CALCulate1:DATA? FDATA` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    /// Phase in degrees.
    Phase,
    /// Logarithmic magnitude in dB.
    LogMagnitude,
}

impl TraceFormat {
    pub(crate) fn as_scpi(&self) -> &'static str {
        match self {
            TraceFormat::Phase => "PHASe",
            TraceFormat::LogMagnitude => "MLOG",
        }
    }
}

impl Display for TraceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description = match self {
            TraceFormat::Phase => "Phase",
            TraceFormat::LogMagnitude => "Log Magnitude",
        };
        write!(f, "{description}")
    }
}

/// One completed frequency sweep.
///
/// The three sequences are index-aligned: entry *i* of each describes the same sweep point.
/// Frequencies are linearly spaced between the start and stop frequency the analyzer reported
/// for the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementTrace {
    /// Sweep point frequencies in Hz.
    pub frequencies: Vec<f64>,
    /// Logarithmic magnitude in dB per sweep point.
    pub magnitude: Vec<f64>,
    /// Phase in degrees per sweep point.
    pub phase: Vec<f64>,
}

impl MeasurementTrace {
    /// Assemble a trace from its three sequences, ensuring they are index-aligned.
    pub(crate) fn try_new(
        frequencies: Vec<f64>,
        magnitude: Vec<f64>,
        phase: Vec<f64>,
    ) -> Result<Self, InstrumentError> {
        if magnitude.len() != frequencies.len() || phase.len() != frequencies.len() {
            return Err(InstrumentError::InstrumentStatus(format!(
                "Trace length mismatch: expected {} points, instrument returned {} magnitude and {} phase values",
                frequencies.len(),
                magnitude.len(),
                phase.len()
            )));
        }
        Ok(MeasurementTrace {
            frequencies,
            magnitude,
            phase,
        })
    }

    /// Number of sweep points in the trace.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether the trace contains no sweep points.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Iterate over the sweep points as `(frequency, magnitude, phase)` triples.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.frequencies
            .iter()
            .zip(self.magnitude.iter())
            .zip(self.phase.iter())
            .map(|((&freq, &mag), &phase)| (freq, mag, phase))
    }
}

/// Generate `points` linearly spaced values from `start` to `stop`, both inclusive.
pub(crate) fn linspace(start: f64, stop: f64, points: u32) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / f64::from(points - 1);
            (0..points).map(|i| start + step * f64::from(i)).collect()
        }
    }
}

/// Parse an ASCII trace response into its numeric values.
///
/// The analyzer returns trace data as comma-separated decimals, e.g.
/// `"-1.234E1,-1.250E1,..."`.
pub(crate) fn parse_ascii_values(response: &str) -> Result<Vec<f64>, InstrumentError> {
    response
        .trim()
        .split(',')
        .map(|value| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| InstrumentError::ResponseParseError(response.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 0), Vec::<f64>::new());
        assert_eq!(linspace(4.0, 5.0, 1), vec![4.0]);
        assert_eq!(linspace(4.0, 5.0, 2), vec![4.0, 5.0]);
        assert_eq!(linspace(4.0, 5.0, 3), vec![4.0, 4.5, 5.0]);
    }

    #[test]
    fn test_linspace_descending() {
        assert_eq!(linspace(5.0, 4.0, 3), vec![5.0, 4.5, 4.0]);
    }

    #[test]
    fn test_parse_ascii_values() {
        assert_eq!(
            parse_ascii_values("-1.5E1, 2.25,3\n").unwrap(),
            vec![-15.0, 2.25, 3.0]
        );
    }

    #[test]
    fn test_parse_ascii_values_malformed() {
        assert!(parse_ascii_values("1.0,oops").is_err());
    }

    #[test]
    fn test_trace_length_mismatch() {
        let trace = MeasurementTrace::try_new(vec![1.0, 2.0], vec![0.5], vec![10.0, 20.0]);
        assert!(trace.is_err());
    }
}
