//! # PXX Protocol Module
//!
//! Turns a logical PXX frame into one of its physical representations.
//!
//! This module handles:
//! - CRC16 over the logical frame bytes
//! - Bit stuffing (a 0 after five consecutive 1s)
//! - Pulse-width encoding with a fixed total period
//! - Software-timed 8 µs/bit encoding packed into bytes
//! - Byte escaping for hardware UART links
//! - PXX1 field layout (flags, 8 channels, extra flags)
//!
//! Every transport writes into a fixed-capacity buffer; nothing allocates
//! while a frame is built.

pub mod protocol;
pub mod buffer;
pub mod crc;
pub mod bit_transport;
pub mod transport;
pub mod frame;
pub mod encoder;
