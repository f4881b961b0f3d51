//! Module for the averaging status of the analyzer.

use std::time::Duration;

use gpibrs::InstrumentError;

/// Condition register of the averaging operation status (`STAT:OPER:AVER1:COND?`).
///
/// The analyzer reports averaging progress as a bitmask with one bit per channel. The response
/// is a short signed decimal such as `"+0"` or `"+2"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AveragingStatus(u16);

impl AveragingStatus {
    /// Bit 1 of the condition register: the requested number of averages has completed on
    /// channel 1.
    pub const CHANNEL_1_COMPLETE: u16 = 1 << 1;

    /// Parse the response string of a condition register query.
    pub fn from_cmd_str(value: &str) -> Result<Self, InstrumentError> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let bits = digits
            .parse::<u16>()
            .map_err(|_| InstrumentError::ResponseParseError(value.to_string()))?;
        Ok(AveragingStatus(bits))
    }

    /// Whether channel 1 has completed its requested number of averages.
    pub fn is_complete(&self) -> bool {
        self.0 & Self::CHANNEL_1_COMPLETE != 0
    }
}

/// Polling behavior for waiting on averaging completion.
///
/// The analyzer bounds the sweep itself by stopping at the configured average count, so an
/// unbounded wait terminates in practice as long as the instrument stays reachable. Set
/// `timeout` to guard against transport loss; the wait then returns
/// [`InstrumentError::Timeout`] instead of blocking forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AveragingWait {
    /// Pause between two condition register queries, keeps the command rate reasonable.
    pub poll_interval: Duration,
    /// Overall deadline for the wait. `None` waits until the instrument reports completion.
    pub timeout: Option<Duration>,
}

impl Default for AveragingWait {
    fn default() -> Self {
        AveragingWait {
            poll_interval: Duration::from_millis(200),
            timeout: None,
        }
    }
}
