//! This module provides the implementation for an instrument controlled via a serial port.
//!
//! It includes a blocking implementation using the [`serialport`] crate. For GPIB instruments,
//! this is the interface to use with serial-attached GPIB controllers such as the Prologix
//! GPIB-USB adapter, which presents the bus as a plain serial port.

use std::time::Duration;

use serialport::{SerialPort, SerialPortBuilder};

use crate::{Instrument, InstrumentError};

/// A blocking serial port interface using the [`serialport`] crate.
#[derive(Debug)]
pub struct SerialInterface {}

impl SerialInterface {
    /// Try to create an Instrument interface with a simple serial port configuration.
    ///
    /// This uses the [`serialport`] defaults for parity, stop bits, and data bits and sets a
    /// timeout of 3 seconds. If your device requires a different configuration, use the
    /// [`SerialInterface::full`] method with your own [`serialport::SerialPortBuilder`].
    ///
    /// # Arguments
    /// * `port` - The name of the serial port, e.g., `"/dev/ttyUSB0"` or `"COM3"`.
    /// * `baud_rate` - The baud rate to use for the serial communication.
    pub fn simple(
        port: &str,
        baud_rate: u32,
    ) -> Result<Instrument<Box<dyn SerialPort>>, InstrumentError> {
        let spb = serialport::new(port, baud_rate).timeout(Duration::from_secs(3));
        Self::full(spb)
    }

    /// Try to create an Instrument interface from a full serial port configuration.
    ///
    /// The timeout of the returned interface is taken from the builder.
    ///
    /// # Arguments
    /// * `spb` - A `SerialPortBuilder` to configure the serial port. See
    ///   [`serialport::SerialPortBuilder`] and the [`serialport::new`] function for details.
    pub fn full(spb: SerialPortBuilder) -> Result<Instrument<Box<dyn SerialPort>>, InstrumentError> {
        let port = spb.open()?;
        let timeout = port.timeout();
        Ok(Instrument::new(port, timeout))
    }
}
