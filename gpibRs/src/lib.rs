//! GpibRs: Talk to SCPI test instruments from Rust
//!
//! The GpibRs library provides standardized transport interfaces for request/response
//! communication with test instruments that speak SCPI or similar line-terminated text
//! protocols. To do so, it provides an [`InstrumentInterface`] trait and implementations of it
//! for the ports that such instruments typically hang off:
//!
//! - GPIB via a VISA resource string, e.g., `GPIB0::16::INSTR` (feature `visa`, using the
//!   [`visa-rs`](https://docs.rs/visa-rs) crate).
//! - TCP/IP (blocking), for instruments with a SCPI-over-LAN socket.
//! - Serial (blocking) using the [`serialport`] crate (feature `serial`), for serial-attached
//!   GPIB controllers such as the Prologix GPIB-USB adapter.
//!
//! Drivers built on top of this crate are generic over the interface and should be tested
//! against the provided [`LoopbackInterface`], which replays an expected command/response
//! exchange and panics on any deviation from it.
//!
//! # Example
//!
//! ```no_run
//! use std::{net::TcpStream, time::Duration};
//!
//! use gpibrs::{Instrument, InstrumentInterface};
//!
//! // A VNA listening on the standard SCPI-over-LAN port.
//! let port = TcpStream::connect("192.168.10.1:5025").unwrap();
//! let mut vna = Instrument::new(port, Duration::from_secs(3));
//! println!("{}", vna.query("*IDN?").unwrap());
//! ```

#![warn(missing_docs)]

mod instrument;
mod loopback;
#[cfg(feature = "serial")]
mod serial;
mod tcp_ip;
#[cfg(feature = "visa")]
mod visa;

pub use instrument::{Instrument, InstrumentError};
pub use loopback::LoopbackInterface;
#[cfg(feature = "serial")]
pub use serial::SerialInterface;
pub use tcp_ip::TcpIpInterface;
#[cfg(feature = "visa")]
pub use visa::VisaInterface;

use std::time::{Duration, Instant};

/// The `InstrumentInterface` trait defines the interface for controlling instruments.
///
/// Implementors only need to provide the raw byte-level primitives [`read_exact`] and
/// [`write_raw`], plus terminator and timeout bookkeeping. The line-oriented command and query
/// methods that drivers actually use are provided on top of these.
///
/// [`read_exact`]: InstrumentInterface::read_exact
/// [`write_raw`]: InstrumentInterface::write_raw
pub trait InstrumentInterface {
    /// Read exactly `buf.len()` bytes from the instrument into `buf`.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), InstrumentError>;

    /// Write raw bytes to the instrument and flush the port.
    fn write_raw(&mut self, data: &[u8]) -> Result<(), InstrumentError>;

    /// Get the terminator that is appended to commands and ends responses.
    fn get_terminator(&self) -> &str {
        "\n"
    }

    /// Set the terminator of the interface from a `&str`.
    ///
    /// # Arguments:
    /// - `_terminator` - A string slice that will be used as the terminator for commands.
    fn set_terminator(&mut self, _terminator: &str) {}

    /// Get the timeout for reading responses from the instrument.
    fn get_timeout(&self) -> Duration {
        Duration::from_secs(3)
    }

    /// Send a command to the instrument.
    ///
    /// This function takes the command, appends the terminator, and writes it to the
    /// instrument. The interface is flushed to ensure that the command is sent immediately.
    ///
    /// # Arguments:
    /// - `cmd` - A string slice that will be sent to the instrument.
    fn sendcmd(&mut self, cmd: &str) -> Result<(), InstrumentError> {
        let cmd = format!("{cmd}{}", self.get_terminator());
        self.write_raw(cmd.as_bytes())
    }

    /// Read from the instrument until the terminator is encountered.
    ///
    /// The response is read character by character until it ends with the terminator. If no
    /// terminator is encountered within the timeout, an [`InstrumentError::Timeout`] is
    /// returned. If a non-UTF-8 byte is received, an error is printed to stderr and the byte
    /// is skipped. The returned response is trimmed of the terminator and surrounding
    /// whitespace.
    fn read_until_terminator(&mut self) -> Result<String, InstrumentError> {
        let timeout = self.get_timeout();
        let mut response = String::new();
        let mut single_buf = [0u8];

        let tic = Instant::now();
        let mut timeout_occured = true;

        while tic.elapsed() < timeout {
            self.read_exact(&mut single_buf)?;
            if let Ok(val) = str::from_utf8(&single_buf) {
                response.push_str(val);
            } else {
                eprintln!("Received invalid UTF-8 data: {single_buf:?}");
            }
            if response.ends_with(self.get_terminator()) {
                timeout_occured = false;
                break;
            }
        }

        if timeout_occured {
            Err(InstrumentError::Timeout(timeout))
        } else {
            Ok(response.trim().to_string())
        }
    }

    /// Query the instrument with a command and return the response as a String.
    ///
    /// This function uses [`sendcmd`] to send the command and then reads the response with
    /// [`read_until_terminator`]. A read timeout is reported as
    /// [`InstrumentError::TimeoutQuery`] so that the offending query shows up in the error.
    ///
    /// # Arguments
    /// - `cmd` - The command to send to the instrument for which we expect a response.
    ///
    /// [`sendcmd`]: InstrumentInterface::sendcmd
    /// [`read_until_terminator`]: InstrumentInterface::read_until_terminator
    fn query(&mut self, cmd: &str) -> Result<String, InstrumentError> {
        self.sendcmd(cmd)?;
        match self.read_until_terminator() {
            Err(InstrumentError::Timeout(timeout)) => Err(InstrumentError::TimeoutQuery {
                query: cmd.to_string(),
                timeout,
            }),
            other => other,
        }
    }
}
