//! The power sweep plan and its derived power levels and average counts.

use keysight_pna::{SParameter, SweepConfig};
use measurements::Frequency;

use crate::SweepError;

/// A plan for a sequence of frequency sweeps at stepped source power.
///
/// The plan derives `sweep_count` linearly spaced power levels between `start_power` and
/// `end_power` and an escalating average count per level: after every level the count is
/// multiplied by [`PowerSweep::escalation_factor`], so the integration time grows
/// geometrically as the power steps down and the signal-to-noise ratio drops.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSweep {
    /// Source power of the first sweep in dB.
    pub start_power: f64,
    /// Source power of the last sweep in dB.
    pub end_power: f64,
    /// Number of sweeps, at least 2.
    pub sweep_count: usize,
    /// Center frequency of every sweep.
    pub center_frequency: Frequency,
    /// Frequency span of every sweep.
    pub span: Frequency,
    /// IF bandwidth of every sweep.
    pub if_bandwidth: Frequency,
    /// Sample stage temperature in mK, used to label the output artifacts.
    pub temperature_mk: f64,
    /// Average count of the first sweep.
    pub base_averages: f64,
    /// Electrical delay in ns.
    pub electrical_delay_ns: f64,
    /// Number of sweep points.
    pub point_count: u32,
    /// The S-parameter to measure.
    pub s_parameter: SParameter,
}

/// One step of a power sweep: the source power and the average count to acquire it with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLevel {
    /// Source power in dB.
    pub power_db: f64,
    /// Average count for this level, fractional until it is clamped at configure time.
    pub averages: f64,
}

impl PowerSweep {
    /// Try to create a power sweep plan.
    ///
    /// All remaining parameters start at their customary defaults (100 averages, 40 ns
    /// electrical delay, 5 kHz IF bandwidth, 201 points, S21) and can be adjusted through the
    /// public fields.
    ///
    /// # Arguments
    /// * `start_power` - Source power of the first sweep in dB.
    /// * `end_power` - Source power of the last sweep in dB.
    /// * `sweep_count` - Number of sweeps, at least 2.
    /// * `center_frequency` - Center frequency of every sweep.
    /// * `span` - Frequency span of every sweep.
    /// * `temperature_mk` - Sample stage temperature in mK.
    pub fn try_new(
        start_power: f64,
        end_power: f64,
        sweep_count: usize,
        center_frequency: Frequency,
        span: Frequency,
        temperature_mk: f64,
    ) -> Result<Self, SweepError> {
        let plan = PowerSweep {
            start_power,
            end_power,
            sweep_count,
            center_frequency,
            span,
            if_bandwidth: Frequency::from_kilohertz(5.0),
            temperature_mk,
            base_averages: 100.0,
            electrical_delay_ns: 40.0,
            point_count: 201,
            s_parameter: SParameter::S21,
        };
        plan.validate()?;
        Ok(plan)
    }

    /// Ensure the plan can derive its power levels.
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.sweep_count < 2 {
            return Err(SweepError::SweepCountTooSmall(self.sweep_count));
        }
        Ok(())
    }

    /// The linearly spaced power levels from start to end, both inclusive.
    ///
    /// The levels descend or ascend according to the order of start and end power.
    pub fn power_levels(&self) -> Vec<f64> {
        linspace(self.start_power, self.end_power, self.sweep_count)
    }

    /// The power difference between two consecutive sweeps in dB.
    ///
    /// Positive when the sweep steps down in power, negative when it steps up. Only defined
    /// for plans that pass [`PowerSweep::validate`].
    pub fn step_size(&self) -> f64 {
        (self.start_power - self.end_power) / (self.sweep_count - 1) as f64
    }

    /// The factor the average count grows by from one level to the next.
    ///
    /// A power step of `s` dB reduces the signal amplitude by `sqrt(10^(s/10))`, so the
    /// average count is scaled by the same factor to hold the signal-to-noise ratio.
    pub fn escalation_factor(&self) -> f64 {
        10f64.powf(self.step_size() / 10.0).sqrt()
    }

    /// The power levels of the sweep paired with their escalated average counts.
    pub fn levels(&self) -> Vec<PowerLevel> {
        let factor = self.escalation_factor();
        let mut averages = self.base_averages;
        self.power_levels()
            .into_iter()
            .map(|power_db| {
                let level = PowerLevel { power_db, averages };
                averages *= factor;
                level
            })
            .collect()
    }

    /// The sweep configuration to program for one level of the plan.
    pub fn config_for(&self, level: &PowerLevel) -> SweepConfig {
        let mut config = SweepConfig::new(self.center_frequency, self.span);
        config.point_count = self.point_count;
        config.if_bandwidth = self.if_bandwidth;
        config.power_db = level.power_db;
        config.electrical_delay_ns = self.electrical_delay_ns;
        config.average_count = level.averages;
        config.s_parameter = self.s_parameter;
        config
    }
}

/// Generate `points` linearly spaced values from `start` to `stop`, both inclusive.
fn linspace(start: f64, stop: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (points - 1) as f64;
            (0..points).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(-10.0, -30.0, 3), vec![-10.0, -20.0, -30.0]);
        assert_eq!(linspace(-30.0, -10.0, 2), vec![-30.0, -10.0]);
    }
}
