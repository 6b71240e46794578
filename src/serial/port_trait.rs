//! Byte sink for finished PXX frames
//!
//! [`ModuleSerial`](super::ModuleSerial) writes each UART frame through this
//! trait, so tests can check the exact bytes handed to the module.

use async_trait::async_trait;
use std::io;

/// Write side of the module UART
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SerialPortIO: Send {
    /// Write one whole frame
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Wait until the frame has left the driver's buffer
    async fn flush(&mut self) -> io::Result<()>;
}

/// Module UART opened through tokio-serial
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
}

impl TokioSerialPort {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }
}

#[async_trait]
impl SerialPortIO for TokioSerialPort {
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.flush().await
    }
}
