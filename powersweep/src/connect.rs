//! Best-effort connection to the analyzer over an ordered list of VISA addresses.

use std::time::Duration;

use gpibrs::{Instrument, InstrumentError, VisaInterface};
use log::{info, warn};

use crate::SweepError;

/// The GPIB address the analyzer customarily sits at.
pub const DEFAULT_ADDRESS: &str = "GPIB0::16::INSTR";

/// The ordered list of VISA addresses to try when connecting.
///
/// The caller-supplied address comes first, followed by [`DEFAULT_ADDRESS`] as the fallback,
/// deduplicated.
pub fn address_candidates(primary: Option<&str>) -> Vec<String> {
    let mut candidates = Vec::new();
    if let Some(primary) = primary {
        candidates.push(primary.to_string());
    }
    if candidates.iter().all(|c| c != DEFAULT_ADDRESS) {
        candidates.push(DEFAULT_ADDRESS.to_string());
    }
    candidates
}

/// Open the first reachable instrument from the candidate list.
///
/// Candidates are tried in order; every failed attempt is logged as a warning. If no
/// candidate can be opened, the error of the last attempt propagates.
///
/// # Arguments
/// * `visa` - The VISA session factory, which must outlive the returned instrument.
/// * `candidates` - The ordered addresses to try, e.g., from [`address_candidates`].
/// * `timeout` - Timeout for opening a session and for reading responses.
pub fn connect(
    visa: &VisaInterface,
    candidates: &[String],
    timeout: Duration,
) -> Result<Instrument<visa_rs::Instrument>, SweepError> {
    let mut last_err: Option<InstrumentError> = None;
    for address in candidates {
        match visa.open(address, timeout) {
            Ok(instrument) => {
                info!("Connected to {address}");
                return Ok(instrument);
            }
            Err(e) => {
                warn!("Could not open {address}: {e}");
                last_err = Some(e);
            }
        }
    }
    match last_err {
        Some(e) => Err(SweepError::Instrument(e)),
        None => Err(SweepError::NoAddressCandidates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_candidates_default_only() {
        assert_eq!(address_candidates(None), vec![DEFAULT_ADDRESS.to_string()]);
    }

    #[test]
    fn test_address_candidates_primary_first() {
        assert_eq!(
            address_candidates(Some("GPIB0::20::INSTR")),
            vec![
                "GPIB0::20::INSTR".to_string(),
                DEFAULT_ADDRESS.to_string()
            ]
        );
    }

    #[test]
    fn test_address_candidates_deduplicated() {
        assert_eq!(
            address_candidates(Some(DEFAULT_ADDRESS)),
            vec![DEFAULT_ADDRESS.to_string()]
        );
    }
}
