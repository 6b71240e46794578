//! # Physical Bit Encoders
//!
//! Turn one logical PXX bit into a physical event:
//! - [`PulseTrainEncoder`]: a timer-driven pulse whose width encodes the bit,
//!   with the frame padded to a fixed half-period
//! - [`SerialBitEncoder`]: an 8 µs/bit pattern packed into bytes for a
//!   synchronous serial peripheral

use super::buffer::OutputBuffer;
use super::protocol::*;

/// Strategy turning logical bits into physical output
pub trait PhysicalBitEncoder {
    /// Element type of the physical buffer (pulse duration or byte)
    type Element: Copy;

    /// Clear the buffer and per-frame timing state
    fn reset(&mut self);

    /// Emit one logical bit
    fn emit_bit(&mut self, value: bool);

    /// Complete the frame (pad timing or flush a partial byte)
    fn finish(&mut self);

    /// Physical output written so far
    fn contents(&self) -> &[Self::Element];
}

/// Pulse-width encoder: 31 µs for a 0, 47 µs for a 1, 1 µs gap after each
///
/// The last pulse absorbs whatever is left of the half-period so that the
/// whole train always spans exactly the same time.
#[derive(Debug, Clone)]
pub struct PulseTrainEncoder {
    buffer: OutputBuffer<u16, PWM_BUFFER_CAPACITY>,
    half_period: u16,
    remaining: u16,
}

impl PulseTrainEncoder {
    /// Encoder for the standard 9 ms period
    pub fn new() -> Self {
        Self::with_half_period(PXX_PERIOD_HALF_US)
    }

    /// Encoder for a custom half-period (µs)
    pub fn with_half_period(half_period: u16) -> Self {
        Self {
            buffer: OutputBuffer::new(),
            half_period,
            remaining: half_period,
        }
    }

    pub fn half_period(&self) -> u16 {
        self.half_period
    }

    /// Microseconds of the half-period not yet consumed by pulses
    pub fn remaining(&self) -> u16 {
        self.remaining
    }
}

impl Default for PulseTrainEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicalBitEncoder for PulseTrainEncoder {
    type Element = u16;

    fn reset(&mut self) {
        self.buffer.reset();
        self.remaining = self.half_period;
    }

    fn emit_bit(&mut self, value: bool) {
        let duration = if value { PXX_PULSE_LONG_US } else { PXX_PULSE_SHORT_US };
        self.buffer.append(duration);

        // Overrunning the period is a sizing error, not something to wrap
        self.remaining = match self.remaining.checked_sub(duration + PXX_PULSE_GAP_US) {
            Some(rest) => rest,
            None => panic!("pulse train exceeds the {} µs half-period", self.half_period),
        };
    }

    fn finish(&mut self) {
        let rest = self.remaining;
        if let Some(last) = self.buffer.last_mut() {
            *last += rest;
            self.remaining = 0;
        }
    }

    fn contents(&self) -> &[u16] {
        self.buffer.contents()
    }
}

/// Software-timed encoder: `01` for a 0, `001` for a 1, one bit per 8 µs
///
/// Physical bits are packed LSB first; a byte is stored once 8 bits have
/// accumulated.
#[derive(Debug, Clone, Default)]
pub struct SerialBitEncoder {
    buffer: OutputBuffer<u8, SERIAL_BIT_BUFFER_CAPACITY>,
    byte: u8,
    bits_count: u8,
}

impl SerialBitEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_physical_bit(&mut self, high: bool) {
        self.byte >>= 1;
        if high {
            self.byte |= 0x80;
        }

        self.bits_count += 1;
        if self.bits_count >= 8 {
            self.buffer.append(self.byte);
            self.bits_count = 0;
        }
    }
}

impl PhysicalBitEncoder for SerialBitEncoder {
    type Element = u8;

    fn reset(&mut self) {
        self.buffer.reset();
        self.byte = 0;
        self.bits_count = 0;
    }

    fn emit_bit(&mut self, value: bool) {
        self.push_physical_bit(false);
        if value {
            self.push_physical_bit(false);
        }
        self.push_physical_bit(true);
    }

    fn finish(&mut self) {
        while self.bits_count != 0 {
            self.push_physical_bit(true);
        }
    }

    fn contents(&self) -> &[u8] {
        self.buffer.contents()
    }
}
