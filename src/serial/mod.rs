//! # Serial Hand-off Module
//!
//! Hands finished UART frames to the PXX module's serial port.
//!
//! This module handles:
//! - Opening the module UART (8N1, no flow control)
//! - Writing and flushing one complete frame at a time

pub mod port_trait;

use std::time::Duration;

use crate::error::{PxxError, Result};
use port_trait::{SerialPortIO, TokioSerialPort};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

/// Serial connection to a PXX module
pub struct ModuleSerial<P = TokioSerialPort> {
    /// Serial port handle
    port: P,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
    /// Frames written since the port was opened
    frames_sent: u64,
}

impl<P> std::fmt::Debug for ModuleSerial<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleSerial")
            .field("device_path", &self.device_path)
            .field("frames_sent", &self.frames_sent)
            .finish_non_exhaustive()
    }
}

impl ModuleSerial<TokioSerialPort> {
    /// Open the module UART, trying each path in turn
    ///
    /// # Errors
    ///
    /// Returns `SerialPortNotFound` if none of the paths can be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pxx_encoder::serial::ModuleSerial;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let serial = ModuleSerial::open_with_paths(&["/dev/ttyUSB0"], 115_200, 100)?;
    ///     println!("Connected to: {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open_with_paths(paths: &[&str], baud_rate: u32, timeout_ms: u64) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate, timeout_ms) {
                Ok(port) => {
                    info!("Opened PXX module UART at {} ({} baud)", path, baud_rate);
                    return Ok(Self::from_port(TokioSerialPort::new(port), path));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(PxxError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with PXX UART settings
    fn open_port(path: &str, baud_rate: u32, timeout_ms: u64) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(Duration::from_millis(timeout_ms))
            .open_native_async()
            .map_err(|e| PxxError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }
}

impl<P: SerialPortIO> ModuleSerial<P> {
    /// Wrap an already opened port
    pub fn from_port(port: P, device_path: &str) -> Self {
        Self {
            port,
            device_path: device_path.to_string(),
            frames_sent: 0,
        }
    }

    /// Write one finished frame and flush it to the module
    ///
    /// The frame must be complete; partial frames are never written.
    pub async fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.port.write_all(frame).await
            .map_err(|e| PxxError::Serial(format!("Failed to write frame: {}", e)))?;

        self.port.flush().await
            .map_err(|e| PxxError::Serial(format!("Failed to flush serial port: {}", e)))?;

        self.frames_sent += 1;
        debug!("Sent PXX frame ({} bytes)", frame.len());
        Ok(())
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }
}
