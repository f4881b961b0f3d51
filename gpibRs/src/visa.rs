//! This module provides the implementation for an instrument controlled via VISA.
//!
//! VISA resource strings address instruments independently of the physical bus, e.g.,
//! `GPIB0::16::INSTR` for a GPIB device at primary address 16, or
//! `TCPIP0::192.168.10.1::INSTR` for a LAN device. The heavy lifting is done by the
//! [`visa-rs`](https://docs.rs/visa-rs) crate, which requires a VISA implementation (NI-VISA,
//! Keysight IO Libraries, ...) to be installed on the host.

use std::{ffi::CString, time::Duration};

use visa_rs::prelude::*;

use crate::InstrumentError;

/// A VISA session factory for opening instruments by resource string.
///
/// The [`VisaInterface`] owns the VISA resource manager. Sessions opened through it are closed
/// when the resource manager is dropped, so keep the [`VisaInterface`] alive for as long as
/// any instrument opened from it is in use.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use gpibrs::{InstrumentInterface, VisaInterface};
///
/// let visa = VisaInterface::try_new().unwrap();
/// let mut vna = visa
///     .open("GPIB0::16::INSTR", Duration::from_secs(3))
///     .unwrap();
/// println!("{}", vna.query("*IDN?").unwrap());
/// ```
pub struct VisaInterface {
    rm: DefaultRM,
}

impl VisaInterface {
    /// Try to create a new VISA session factory with the default resource manager.
    pub fn try_new() -> Result<Self, InstrumentError> {
        let rm = DefaultRM::new()?;
        Ok(VisaInterface { rm })
    }

    /// Try to open the instrument at the given VISA resource string.
    ///
    /// The session is opened without locking and wrapped in a [`crate::Instrument`] with the
    /// given timeout and the default `"\n"` terminator.
    ///
    /// # Arguments
    /// * `address` - The VISA resource string, e.g., `"GPIB0::16::INSTR"`.
    /// * `timeout` - Timeout for opening the session and for reading responses.
    pub fn open(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<crate::Instrument<visa_rs::Instrument>, InstrumentError> {
        let resource = CString::new(address).map_err(|_| {
            InstrumentError::InvalidArgument(format!(
                "VISA resource string contains a NUL byte: {address:?}"
            ))
        })?;
        let session = self.rm.open(&resource.into(), AccessMode::NO_LOCK, timeout)?;
        Ok(crate::Instrument::new(session, timeout))
    }
}
