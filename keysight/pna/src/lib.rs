//! A rust driver for Keysight PNA/PNA-X vector network analyzers.
//!
//! This driver covers the S-parameter sweep workflow used for cryogenic device
//! characterization: it programs the sweep geometry onto the analyzer, waits for the
//! configured number of averages to complete, and reads the phase and magnitude traces back.
//!
//! # Example
//!
//! This example shows the usage via a SCPI-over-LAN connection. For a GPIB-attached analyzer,
//! open the interface through [`gpibrs::VisaInterface`] instead (feature `visa` of `gpibrs`).
//! ```no_run
//! use gpibrs::TcpIpInterface;
//! use keysight_pna::{AveragingWait, Pna, SweepConfig};
//! use measurements::Frequency;
//!
//! // Open the analyzer on its raw socket port.
//! let interface = TcpIpInterface::try_new("192.168.10.1:5025").unwrap();
//! let mut pna = Pna::try_new(interface).unwrap();
//!
//! // Program a 10 MHz wide sweep around 4.5 GHz and acquire one averaged measurement.
//! let config = SweepConfig::new(
//!     Frequency::from_gigahertz(4.5),
//!     Frequency::from_megahertz(10.0),
//! );
//! pna.configure(&config).unwrap();
//! pna.select_measurement().unwrap();
//! pna.set_ascii_format().unwrap();
//! pna.enable_output().unwrap();
//! pna.wait_for_averaging(&AveragingWait::default()).unwrap();
//! let trace = pna.read_measurement(config.point_count).unwrap();
//! println!("{} sweep points", trace.len());
//! ```

#![warn(missing_docs)]

mod config;
mod status;
mod trace;

pub use config::{SParameter, SweepConfig};
pub use status::{AveragingStatus, AveragingWait};
pub use trace::{MeasurementTrace, TraceFormat};

use std::{
    sync::{Arc, Mutex},
    thread,
    time::Instant,
};

use gpibrs::{InstrumentError, InstrumentInterface};

/// Name of the measurement trace this driver creates and selects on the analyzer.
const MEASUREMENT_NAME: &str = "Meas";

/// The largest sweep point count the PNA family accepts.
const MAX_POINT_COUNT: u32 = 100_001;

/// A rust driver for the Keysight PNA.
///
/// This driver provides the sweep configuration and trace read-back functionality of the
/// analyzer. See the top-level documentation for an example on how to use this driver.
pub struct Pna<T: InstrumentInterface> {
    interface: Arc<Mutex<T>>,
}

impl<T: InstrumentInterface> Pna<T> {
    /// Create a new Pna instance with the given instrument interface.
    ///
    /// # Arguments
    /// * `interface` - An instrument interface that implements the [`InstrumentInterface`]
    ///   trait.
    pub fn try_new(interface: T) -> Result<Self, InstrumentError> {
        let mut intf = interface;
        intf.set_terminator("\n");
        let interface = Arc::new(Mutex::new(intf));
        Ok(Pna { interface })
    }

    /// Query the identification of the instrument.
    ///
    /// Returns a comma-separated string of manufacturer, model number, serial number, and
    /// firmware version.
    pub fn identity(&mut self) -> Result<String, InstrumentError> {
        self.query("*IDN?")
    }

    /// Program a sweep configuration onto the analyzer.
    ///
    /// Ensures a measurement trace named `Meas` bound to the requested S-parameter exists
    /// (creating and displaying it only if the parameter catalog does not already list it),
    /// then writes point count, center frequency, span, IF bandwidth, automatic sweep timing,
    /// source power, electrical delay, and enables averaging. The average count is floored to
    /// an integer and clamped to a minimum of 1.
    ///
    /// # Arguments
    /// * `config` - The sweep parameters to program.
    pub fn configure(&mut self, config: &SweepConfig) -> Result<(), InstrumentError> {
        if config.point_count == 0 || config.point_count > MAX_POINT_COUNT {
            return Err(InstrumentError::IntValueOutOfRange {
                value: i64::from(config.point_count),
                min: 1,
                max: i64::from(MAX_POINT_COUNT),
            });
        }

        self.ensure_measurement(config.s_parameter)?;

        self.sendcmd(&format!("SENSe1:SWEep:POINts {}", config.point_count))?;
        self.sendcmd(&format!(
            "SENSe1:FREQuency:CENTer {}GHZ",
            config.center_frequency.as_gigahertz()
        ))?;
        self.sendcmd(&format!(
            "SENSe1:FREQuency:SPAN {}MHZ",
            config.span.as_megahertz()
        ))?;
        self.sendcmd(&format!(
            "SENSe1:BANDwidth {}KHZ",
            config.if_bandwidth.as_kilohertz()
        ))?;
        self.sendcmd("SENSe1:SWEep:TIME:AUTO ON")?;
        self.sendcmd(&format!("SOUR:POW1 {}", config.power_db))?;
        self.sendcmd(&format!(
            "CALCulate1:CORRection:EDELay:TIME {}NS",
            config.electrical_delay_ns
        ))?;
        self.sendcmd("SENSe1:AVERage:STATe ON")?;

        let averages = config.average_count.max(1.0).floor() as u64;
        self.sendcmd(&format!("SENSe1:AVERage:Count {averages}"))?;

        Ok(())
    }

    /// Create and display the measurement trace if the analyzer does not already carry it.
    ///
    /// The parameter catalog response for a single existing trace is `"Meas,{sparam}"`
    /// including the quotes; anything else triggers a fresh trace definition.
    fn ensure_measurement(&mut self, s_parameter: SParameter) -> Result<(), InstrumentError> {
        let catalog = self.query("CALC:PAR:CAT:EXT?")?;
        if catalog != format!("\"{MEASUREMENT_NAME},{s_parameter}\"") {
            self.sendcmd(&format!(
                "CALCulate1:PARameter:DEFine:EXT '{MEASUREMENT_NAME}',{s_parameter}"
            ))?;
            self.sendcmd("DISPlay:WINDow1:STATE ON")?;
            self.sendcmd(&format!("DISPlay:WINDow1:TRACe1:FEED '{MEASUREMENT_NAME}'"))?;
            self.sendcmd(&format!("DISPlay:WINDow1:TRACe2:FEED '{MEASUREMENT_NAME}'"))?;
        }
        Ok(())
    }

    /// Select the measurement trace for subsequent data transfers.
    pub fn select_measurement(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("CALCulate1:PARameter:SELect '{MEASUREMENT_NAME}'"))
    }

    /// Set ASCII transfer format for trace data.
    pub fn set_ascii_format(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd("FORMat ASCII")
    }

    /// Enable the source output.
    pub fn enable_output(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd("OUTPut:STATe ON")
    }

    /// Query whether channel 1 has completed its configured number of averages.
    pub fn averaging_complete(&mut self) -> Result<bool, InstrumentError> {
        let response = self.query("STAT:OPER:AVER1:COND?")?;
        Ok(AveragingStatus::from_cmd_str(&response)?.is_complete())
    }

    /// Block until the analyzer reports that averaging has completed.
    ///
    /// Polls the averaging condition register at the configured interval. With
    /// `wait.timeout` set, the wait gives up with [`InstrumentError::Timeout`] once the
    /// deadline passes; without it, the wait is bounded only by the analyzer finishing its
    /// configured average count.
    ///
    /// # Arguments
    /// * `wait` - Poll interval and optional deadline.
    pub fn wait_for_averaging(&mut self, wait: &AveragingWait) -> Result<(), InstrumentError> {
        let tic = Instant::now();
        loop {
            if self.averaging_complete()? {
                return Ok(());
            }
            if let Some(timeout) = wait.timeout {
                if tic.elapsed() >= timeout {
                    return Err(InstrumentError::Timeout(timeout));
                }
            }
            thread::sleep(wait.poll_interval);
        }
    }

    /// Query the start frequency of the sweep in Hz.
    pub fn frequency_start(&mut self) -> Result<f64, InstrumentError> {
        self.query_frequency("SENSe1:FREQuency:START?")
    }

    /// Query the stop frequency of the sweep in Hz.
    pub fn frequency_stop(&mut self) -> Result<f64, InstrumentError> {
        self.query_frequency("SENSe1:FREQuency:STOP?")
    }

    /// Read the formatted data trace in the given format.
    ///
    /// # Arguments
    /// * `format` - The trace format to read, e.g., [`TraceFormat::Phase`].
    pub fn read_trace(&mut self, format: TraceFormat) -> Result<Vec<f64>, InstrumentError> {
        self.sendcmd(&format!("CALCulate1:FORMat {}", format.as_scpi()))?;
        let response = self.query("CALCulate1:DATA? FDATA")?;
        trace::parse_ascii_values(&response)
    }

    /// Read one complete measurement from the analyzer.
    ///
    /// Queries the start and stop frequency, interpolates `point_count` linearly spaced
    /// frequency values between them, and reads the phase and magnitude traces. Fails if the
    /// instrument returns traces of a different length than `point_count`.
    ///
    /// # Arguments
    /// * `point_count` - The number of sweep points the analyzer was configured with.
    pub fn read_measurement(
        &mut self,
        point_count: u32,
    ) -> Result<MeasurementTrace, InstrumentError> {
        let start = self.frequency_start()?;
        let stop = self.frequency_stop()?;
        let frequencies = trace::linspace(start, stop, point_count);

        let phase = self.read_trace(TraceFormat::Phase)?;
        let magnitude = self.read_trace(TraceFormat::LogMagnitude)?;

        MeasurementTrace::try_new(frequencies, magnitude, phase)
    }

    /// Query a frequency value and parse it as Hz.
    fn query_frequency(&mut self, cmd: &str) -> Result<f64, InstrumentError> {
        let response = self.query(cmd)?;
        response.trim().parse::<f64>().map_err(|e| {
            InstrumentError::ResponseParseError(format!(
                "Failed to parse frequency from response '{}': {}",
                response, e
            ))
        })
    }

    /// Send a command to the instrument.
    fn sendcmd(&mut self, cmd: &str) -> Result<(), InstrumentError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.sendcmd(cmd)
    }

    /// Query the instrument with a command and return the response as a String.
    fn query(&mut self, cmd: &str) -> Result<String, InstrumentError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.query(cmd)
    }
}

impl<T: InstrumentInterface> Clone for Pna<T> {
    fn clone(&self) -> Self {
        Self {
            interface: self.interface.clone(),
        }
    }
}
