//! # PXX Encoder Library
//!
//! Builds FrSky PXX frames for a transmitter module.
//!
//! A logical frame (flags, channels, extra flags, CRC) is encoded into one of
//! three physical forms: a pulse-width train for a timer output, a
//! software-timed bit pattern, or an escaped byte stream for a hardware UART.

pub mod config;
pub mod error;
pub mod pxx;
pub mod serial;
