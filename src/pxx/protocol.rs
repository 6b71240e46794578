//! # PXX Protocol Constants
//!
//! Timing, sizing and framing constants shared by the PXX transports.

/// Standard PXX frame period in milliseconds
pub const PXX_PERIOD_MS: u16 = 9;

/// High-frequency PXX frame period in milliseconds
pub const PXX_PERIOD_HIGH_FREQUENCY_MS: u16 = 4;

/// Half of the standard period in microseconds (time budget of one pulse train)
pub const PXX_PERIOD_HALF_US: u16 = PXX_PERIOD_MS * 2000;

/// Pulse duration for a logical 0 (µs)
pub const PXX_PULSE_SHORT_US: u16 = 31;

/// Pulse duration for a logical 1 (µs)
pub const PXX_PULSE_LONG_US: u16 = 47;

/// Gap following every pulse (µs)
pub const PXX_PULSE_GAP_US: u16 = 1;

/// Software-timed bit time (µs)
pub const PXX_SERIAL_BIT_US: u16 = 8;

/// Head/sync byte, sent raw at both ends of a frame
pub const PXX_HEAD_BYTE: u8 = 0x7E;

/// UART escape byte
pub const PXX_ESCAPE_BYTE: u8 = 0x7D;

/// Escaped form of 0x7E is `0x7D 0x5E`
pub const PXX_ESCAPED_HEAD: u8 = 0x5E;

/// Escaped form of 0x7D is `0x7D 0x5D`
pub const PXX_ESCAPED_ESCAPE: u8 = 0x5D;

/// Number of consecutive ones after which a zero is stuffed
pub const PXX_STUFF_AFTER_ONES: u8 = 5;

/// Pulse buffer capacity of the PWM transport
pub const PWM_BUFFER_CAPACITY: usize = 200;

/// Byte buffer capacity of the software-timed serial transport
pub const SERIAL_BIT_BUFFER_CAPACITY: usize = 64;

/// Byte buffer capacity of the UART transport
pub const UART_BUFFER_CAPACITY: usize = 64;

/// UART baud rate for the standard period
pub const PXX_UART_BAUD_RATE: u32 = 115_200;

/// UART baud rate for an external module at high frequency
pub const PXX_UART_BAUD_RATE_EXTERNAL_HIGH: u32 = 420_000;

/// UART baud rate for an internal module at high frequency
pub const PXX_UART_BAUD_RATE_INTERNAL_HIGH: u32 = 450_000;

/// Flag 1: bind request
pub const PXX_SEND_BIND: u8 = 0x01;

/// Flag 1: frame carries failsafe values
pub const PXX_SEND_FAILSAFE: u8 = 1 << 4;

/// Flag 1: range check request
pub const PXX_SEND_RANGECHECK: u8 = 1 << 5;

/// Flag 2 byte, reserved and always zero
pub const PXX_FLAG2: u8 = 0x00;

/// Checksummed bytes in a PXX1 frame: rx number, two flag bytes, 12 channel
/// bytes and the extra flags
pub const PXX1_CHECKSUMMED_BYTES: usize = 16;

/// Channels carried by one frame
pub const PXX_CHANNELS_PER_FRAME: usize = 8;

/// Highest receiver number
pub const PXX_MAX_RX_NUMBER: u8 = 63;

/// Highest RF protocol index (X16, D8, LR12)
pub const PXX_MAX_RF_PROTOCOL: u8 = 2;

/// Highest power level encodable in the extra flags
pub const PXX_MAX_POWER: u8 = 3;

/// Highest country code (US, JP, EU)
pub const PXX_MAX_COUNTRY_CODE: u8 = 2;

/// Offset added to channel values of the upper bank (channels 9..16)
pub const PXX_UPPER_BANK_OFFSET: u16 = 2048;

/// Channel value used for a "hold" failsafe
pub const PXX_FAILSAFE_HOLD: u16 = 2047;

/// Channel value used for a "no pulses" failsafe
pub const PXX_FAILSAFE_NO_PULSES: u16 = 0;

/// Half-period in microseconds for a frame period in milliseconds
pub const fn half_period_us(period_ms: u16) -> u16 {
    period_ms * 2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_period() {
        assert_eq!(PXX_PERIOD_HALF_US, 18000);
        assert_eq!(half_period_us(PXX_PERIOD_HIGH_FREQUENCY_MS), 8000);
    }

    #[test]
    fn test_pwm_budget_stays_positive_at_standard_period() {
        // Every pulse costs at most long + gap
        let worst = PWM_BUFFER_CAPACITY as u32 * (PXX_PULSE_LONG_US + PXX_PULSE_GAP_US) as u32;
        assert!(worst < PXX_PERIOD_HALF_US as u32);
        assert_eq!(PXX_PERIOD_HALF_US as u32 - worst, 8400);
    }

    #[test]
    fn test_pwm_budget_exceeded_at_high_frequency() {
        let worst = PWM_BUFFER_CAPACITY as u32 * (PXX_PULSE_LONG_US + PXX_PULSE_GAP_US) as u32;
        assert!(worst > half_period_us(PXX_PERIOD_HIGH_FREQUENCY_MS) as u32);
    }

    #[test]
    fn test_flag_bits_are_distinct() {
        assert_eq!(PXX_SEND_BIND & PXX_SEND_FAILSAFE, 0);
        assert_eq!(PXX_SEND_FAILSAFE & PXX_SEND_RANGECHECK, 0);
        assert_eq!(PXX_SEND_BIND & PXX_SEND_RANGECHECK, 0);
    }
}
