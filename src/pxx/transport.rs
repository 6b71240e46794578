//! # PXX Transports
//!
//! The capability set a frame is built with, and its three implementations:
//! - [`PwmPxxTransport`]: bit-stuffed pulse train for a timer output
//! - [`SerialPxxTransport`]: bit-stuffed 8 µs pattern for a serial peripheral
//! - [`UartPxxTransport`]: byte stream with 0x7E/0x7D escaping for a UART
//!
//! All of them fold each logical byte into the CRC before any stuffing or
//! escaping is applied.

use super::bit_transport::{PhysicalBitEncoder, PulseTrainEncoder, SerialBitEncoder};
use super::buffer::OutputBuffer;
use super::crc::Crc16;
use super::protocol::*;

/// Operations available to a frame layout, common to every transport
pub trait PxxTransport {
    /// Element type of the physical buffer handed to the driver
    type Element: Copy;

    /// Clear buffer, checksum and encoder state for a new frame
    fn reset_frame(&mut self);

    /// Add a logical byte to the checksum, then emit it
    fn emit_byte_with_checksum(&mut self, byte: u8);

    /// Emit a byte that is not part of the checksum
    fn emit_byte_without_checksum(&mut self, byte: u8);

    /// Emit a byte bypassing checksum, bit stuffing and escaping
    fn emit_raw_byte_without_checksum_or_stuffing(&mut self, byte: u8);

    /// Current checksum over the logical bytes emitted so far
    fn checksum(&self) -> u16;

    /// Complete the physical frame
    fn finish(&mut self);

    /// Physical output of the frame
    fn contents(&self) -> &[Self::Element];
}

/// Bit-level transport applying the 5-ones stuffing rule over a bit encoder
#[derive(Debug, Clone, Default)]
pub struct BitStuffedTransport<E> {
    encoder: E,
    crc: Crc16,
    ones_count: u8,
}

/// Pulse-width PXX output
pub type PwmPxxTransport = BitStuffedTransport<PulseTrainEncoder>;

/// Software-timed serial PXX output
pub type SerialPxxTransport = BitStuffedTransport<SerialBitEncoder>;

impl<E: PhysicalBitEncoder> BitStuffedTransport<E> {
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            crc: Crc16::new(),
            ones_count: 0,
        }
    }

    /// Use a different checksum table
    pub fn with_crc(mut self, crc: Crc16) -> Self {
        self.crc = crc;
        self
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Emit one logical bit, inserting a 0 after five consecutive 1s
    pub fn emit_bit_stuffed(&mut self, bit: bool) {
        self.encoder.emit_bit(bit);

        if bit {
            self.ones_count += 1;
            if self.ones_count == PXX_STUFF_AFTER_ONES {
                self.ones_count = 0;
                self.encoder.emit_bit(false);
            }
        } else {
            self.ones_count = 0;
        }
    }
}

impl PwmPxxTransport {
    /// Pulse transport for a custom half-period (µs)
    pub fn pwm(half_period: u16) -> Self {
        Self::new(PulseTrainEncoder::with_half_period(half_period))
    }
}

impl SerialPxxTransport {
    pub fn serial() -> Self {
        Self::new(SerialBitEncoder::new())
    }
}

impl<E: PhysicalBitEncoder> PxxTransport for BitStuffedTransport<E> {
    type Element = E::Element;

    fn reset_frame(&mut self) {
        self.encoder.reset();
        self.crc.reset();
        self.ones_count = 0;
    }

    fn emit_byte_with_checksum(&mut self, byte: u8) {
        self.crc.update(byte);
        self.emit_byte_without_checksum(byte);
    }

    fn emit_byte_without_checksum(&mut self, byte: u8) {
        for i in (0..8).rev() {
            self.emit_bit_stuffed(byte & (1 << i) != 0);
        }
    }

    fn emit_raw_byte_without_checksum_or_stuffing(&mut self, byte: u8) {
        for i in (0..8).rev() {
            self.encoder.emit_bit(byte & (1 << i) != 0);
        }
    }

    fn checksum(&self) -> u16 {
        self.crc.value()
    }

    fn finish(&mut self) {
        self.encoder.finish();
    }

    fn contents(&self) -> &[E::Element] {
        self.encoder.contents()
    }
}

/// Byte transport for a hardware UART, escaping 0x7E and 0x7D
#[derive(Debug, Clone, Default)]
pub struct UartPxxTransport {
    buffer: OutputBuffer<u8, UART_BUFFER_CAPACITY>,
    crc: Crc16,
}

impl UartPxxTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different checksum table
    pub fn with_crc(mut self, crc: Crc16) -> Self {
        self.crc = crc;
        self
    }

    /// Append a byte, replacing the reserved values with their escapes
    pub fn emit_with_escaping(&mut self, byte: u8) {
        match byte {
            PXX_HEAD_BYTE => {
                self.buffer.append(PXX_ESCAPE_BYTE);
                self.buffer.append(PXX_ESCAPED_HEAD);
            }
            PXX_ESCAPE_BYTE => {
                self.buffer.append(PXX_ESCAPE_BYTE);
                self.buffer.append(PXX_ESCAPED_ESCAPE);
            }
            _ => self.buffer.append(byte),
        }
    }
}

impl PxxTransport for UartPxxTransport {
    type Element = u8;

    fn reset_frame(&mut self) {
        self.buffer.reset();
        self.crc.reset();
    }

    fn emit_byte_with_checksum(&mut self, byte: u8) {
        self.crc.update(byte);
        self.emit_with_escaping(byte);
    }

    fn emit_byte_without_checksum(&mut self, byte: u8) {
        self.buffer.append(byte);
    }

    fn emit_raw_byte_without_checksum_or_stuffing(&mut self, byte: u8) {
        self.emit_byte_without_checksum(byte);
    }

    fn checksum(&self) -> u16 {
        self.crc.value()
    }

    fn finish(&mut self) {
        // Start/stop bits are added by the UART
    }

    fn contents(&self) -> &[u8] {
        self.buffer.contents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pxx::crc::crc16;

    /// Records logical bits instead of encoding them
    #[derive(Debug, Default)]
    struct BitRecorder {
        bits: Vec<bool>,
        finished: bool,
    }

    impl PhysicalBitEncoder for BitRecorder {
        type Element = bool;

        fn reset(&mut self) {
            self.bits.clear();
            self.finished = false;
        }

        fn emit_bit(&mut self, value: bool) {
            self.bits.push(value);
        }

        fn finish(&mut self) {
            self.finished = true;
        }

        fn contents(&self) -> &[bool] {
            &self.bits
        }
    }

    fn bits_of(byte: u8) -> Vec<bool> {
        (0..8).rev().map(|i| byte & (1 << i) != 0).collect()
    }

    #[test]
    fn test_no_stuffing_below_five_ones() {
        let mut transport = BitStuffedTransport::new(BitRecorder::default());
        transport.emit_byte_without_checksum(0b1111_0111);
        assert_eq!(transport.contents(), bits_of(0b1111_0111).as_slice());
    }

    #[test]
    fn test_stuffing_after_five_ones() {
        let mut transport = BitStuffedTransport::new(BitRecorder::default());
        transport.emit_byte_without_checksum(0xFF);

        let expected = [true, true, true, true, true, false, true, true, true];
        assert_eq!(transport.contents(), &expected);
    }

    #[test]
    fn test_stuffing_carries_across_bytes() {
        let mut transport = BitStuffedTransport::new(BitRecorder::default());
        transport.emit_byte_without_checksum(0b0000_0111);
        transport.emit_byte_without_checksum(0b1100_0000);

        let mut expected = bits_of(0b0000_0111);
        expected.extend_from_slice(&[true, true, false, false]);
        expected.extend_from_slice(&[false; 5]);
        assert_eq!(transport.contents(), expected.as_slice());
    }

    #[test]
    fn test_raw_byte_is_not_stuffed() {
        let mut transport = BitStuffedTransport::new(BitRecorder::default());
        transport.emit_raw_byte_without_checksum_or_stuffing(0xFF);
        assert_eq!(transport.contents(), &[true; 8]);
        assert_eq!(transport.checksum(), 0);
    }

    #[test]
    fn test_raw_byte_does_not_touch_ones_count() {
        let mut transport = BitStuffedTransport::new(BitRecorder::default());
        transport.emit_bit_stuffed(true);
        transport.emit_bit_stuffed(true);
        transport.emit_raw_byte_without_checksum_or_stuffing(0x00);
        transport.emit_bit_stuffed(true);
        transport.emit_bit_stuffed(true);
        transport.emit_bit_stuffed(true);

        // Two ones before the raw byte plus three after reach the limit
        let bits = transport.contents();
        assert_eq!(bits.len(), 2 + 8 + 3 + 1);
        assert_eq!(bits.last(), Some(&false));
    }

    #[test]
    fn test_checksum_over_logical_bytes() {
        let mut transport = BitStuffedTransport::new(BitRecorder::default());
        for byte in [0xFF, 0x7E, 0x00] {
            transport.emit_byte_with_checksum(byte);
        }
        transport.emit_byte_without_checksum(0x55);
        assert_eq!(transport.checksum(), crc16(&[0xFF, 0x7E, 0x00]));
    }

    #[test]
    fn test_reset_frame_clears_state() {
        let mut transport = BitStuffedTransport::new(BitRecorder::default());
        transport.emit_byte_with_checksum(0x0F);
        transport.reset_frame();

        assert!(transport.contents().is_empty());
        assert_eq!(transport.checksum(), 0);

        // A stale ones count would stuff after the first bit here
        transport.emit_byte_without_checksum(0xF0);
        assert_eq!(transport.contents(), bits_of(0xF0).as_slice());
    }

    #[test]
    fn test_finish_reaches_encoder() {
        let mut transport = BitStuffedTransport::new(BitRecorder::default());
        transport.finish();
        assert!(transport.encoder().finished);
    }

    #[test]
    fn test_pwm_transport_pulses() {
        let mut transport = PwmPxxTransport::new(PulseTrainEncoder::new());
        transport.reset_frame();
        transport.emit_byte_with_checksum(0x00);
        transport.finish();

        let pulses = transport.contents();
        assert_eq!(pulses.len(), 8);
        assert_eq!(pulses[7], 31 + 18000 - 8 * 32);
    }

    #[test]
    fn test_serial_transport_stuffed_byte() {
        // 0xFF -> 1,1,1,1,1,(0),1,1,1
        let mut transport = SerialPxxTransport::serial();
        transport.emit_byte_without_checksum(0xFF);
        transport.finish();

        // 8 ones * 3 + stuffed zero * 2 = 26 physical bits -> 4 bytes
        assert_eq!(transport.contents().len(), 4);
    }

    #[test]
    fn test_uart_escaping() {
        let mut transport = UartPxxTransport::new();
        for byte in [0x7E, 0x01, 0x7D] {
            transport.emit_byte_with_checksum(byte);
        }
        assert_eq!(transport.contents(), &[0x7D, 0x5E, 0x01, 0x7D, 0x5D]);
        assert_eq!(transport.checksum(), crc16(&[0x7E, 0x01, 0x7D]));
    }

    #[test]
    fn test_uart_unescaped_paths() {
        let mut transport = UartPxxTransport::new();
        transport.emit_raw_byte_without_checksum_or_stuffing(0x7E);
        transport.emit_byte_without_checksum(0x7D);
        transport.finish();

        assert_eq!(transport.contents(), &[0x7E, 0x7D]);
        assert_eq!(transport.checksum(), 0);
    }

    #[test]
    fn test_uart_reset_frame() {
        let mut transport = UartPxxTransport::new();
        transport.emit_byte_with_checksum(0x42);
        transport.reset_frame();
        assert!(transport.contents().is_empty());
        assert_eq!(transport.checksum(), 0);
    }
}
