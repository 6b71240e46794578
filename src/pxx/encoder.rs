//! # PXX1 Frame Layout
//!
//! Field layout of a PXX1 frame, written through any [`PxxTransport`]:
//!
//! ```text
//! 0x7E | rx number | flag 1 | flag 2 | 8 channels (12 bytes) | extra flags | CRC hi | CRC lo | 0x7E
//! ```
//!
//! Channels are 12-bit values, two per three bytes. Frames carrying channels
//! 9..16 add 2048 so the receiver can tell the banks apart.
//!
//! The caller decides when to bind, range check or send failsafe values;
//! this module only encodes what it is given.

use super::frame::FrameLayout;
use super::protocol::*;
use super::transport::PxxTransport;

/// RF protocol selected in flag 1 (bits 6-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RfProtocol {
    #[default]
    X16 = 0,
    D8 = 1,
    Lr12 = 2,
}

impl RfProtocol {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::X16),
            1 => Some(Self::D8),
            2 => Some(Self::Lr12),
            _ => None,
        }
    }
}

/// Module operating mode for this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleMode {
    /// Regular channel frame, optionally carrying failsafe values
    Normal { send_failsafe: bool },
    /// Bind request for the given country code
    Bind { country_code: u8 },
    RangeCheck,
}

impl Default for ModuleMode {
    fn default() -> Self {
        Self::Normal { send_failsafe: false }
    }
}

/// Which half of the 16 channels a frame carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelBank {
    #[default]
    Lower,
    Upper,
}

impl ChannelBank {
    fn offset(self) -> u16 {
        match self {
            Self::Lower => 0,
            Self::Upper => PXX_UPPER_BANK_OFFSET,
        }
    }
}

/// Failsafe behaviour of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailsafeValue {
    /// Receiver keeps the last received value
    #[default]
    Hold,
    /// Receiver stops the pulses on this channel
    NoPulses,
    /// Receiver moves to this channel output
    Custom(i16),
}

/// Extra flags byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtraFlags {
    pub external_antenna: bool,
    pub telemetry_off: bool,
    pub channels_9_16: bool,
    /// Power level, 0..=3
    pub power: u8,
    pub disable_sport: bool,
    pub eu_plus: bool,
}

impl ExtraFlags {
    pub fn to_byte(self) -> u8 {
        let mut flags = 0u8;
        flags |= self.external_antenna as u8;
        flags |= (self.telemetry_off as u8) << 1;
        flags |= (self.channels_9_16 as u8) << 2;
        flags |= self.power.min(PXX_MAX_POWER) << 3;
        flags |= (self.disable_sport as u8) << 5;
        flags |= (self.eu_plus as u8) << 6;
        flags
    }
}

/// Convert a channel output (±1024 = ±100 %) to a 12-bit PXX value
///
/// # Examples
///
/// ```
/// use pxx_encoder::pxx::encoder::{channel_pulse_value, ChannelBank};
///
/// assert_eq!(channel_pulse_value(0, ChannelBank::Lower), 1024);
/// assert_eq!(channel_pulse_value(0, ChannelBank::Upper), 3072);
/// assert_eq!(channel_pulse_value(1024, ChannelBank::Lower), 1792);
/// ```
pub fn channel_pulse_value(output: i16, bank: ChannelBank) -> u16 {
    let scaled = output as i32 * 512 / 682 + 1024;
    let limited = scaled.clamp(1, 2046) as u16;
    limited + bank.offset()
}

/// 12-bit PXX value for a channel's failsafe setting
pub fn failsafe_pulse_value(value: FailsafeValue, bank: ChannelBank) -> u16 {
    match value {
        FailsafeValue::Hold => PXX_FAILSAFE_HOLD + bank.offset(),
        FailsafeValue::NoPulses => PXX_FAILSAFE_NO_PULSES + bank.offset(),
        FailsafeValue::Custom(output) => channel_pulse_value(output, bank),
    }
}

/// Contents of one PXX1 frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pxx1Frame {
    pub rx_number: u8,
    pub rf_protocol: RfProtocol,
    pub mode: ModuleMode,
    pub bank: ChannelBank,
    /// Channel outputs of the selected bank
    pub channels: [i16; PXX_CHANNELS_PER_FRAME],
    /// Failsafe settings of the selected bank
    pub failsafe: [FailsafeValue; PXX_CHANNELS_PER_FRAME],
    pub extra: ExtraFlags,
}

impl Pxx1Frame {
    /// Normal frame with all channels centered
    pub fn new(rx_number: u8) -> Self {
        Self {
            rx_number,
            ..Self::default()
        }
    }

    pub fn with_rf_protocol(mut self, rf_protocol: RfProtocol) -> Self {
        self.rf_protocol = rf_protocol;
        self
    }

    pub fn with_mode(mut self, mode: ModuleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_channels(mut self, bank: ChannelBank, channels: [i16; PXX_CHANNELS_PER_FRAME]) -> Self {
        self.bank = bank;
        self.channels = channels;
        self
    }

    pub fn with_failsafe(mut self, failsafe: [FailsafeValue; PXX_CHANNELS_PER_FRAME]) -> Self {
        self.failsafe = failsafe;
        self
    }

    pub fn with_extra_flags(mut self, extra: ExtraFlags) -> Self {
        self.extra = extra;
        self
    }

    /// Flag 1 byte for this frame
    pub fn flag1(&self) -> u8 {
        let mut flag1 = (self.rf_protocol as u8) << 6;

        match self.mode {
            ModuleMode::Bind { country_code } => {
                flag1 |= (country_code.min(PXX_MAX_COUNTRY_CODE) << 1) | PXX_SEND_BIND;
            }
            ModuleMode::RangeCheck => flag1 |= PXX_SEND_RANGECHECK,
            ModuleMode::Normal { send_failsafe: true } => flag1 |= PXX_SEND_FAILSAFE,
            ModuleMode::Normal { send_failsafe: false } => {}
        }

        flag1
    }

    /// 12-bit values sent for each channel slot
    pub fn pulse_values(&self) -> [u16; PXX_CHANNELS_PER_FRAME] {
        let send_failsafe = self.flag1() & PXX_SEND_FAILSAFE != 0;
        let mut values = [0u16; PXX_CHANNELS_PER_FRAME];

        for (i, value) in values.iter_mut().enumerate() {
            *value = if send_failsafe {
                failsafe_pulse_value(self.failsafe[i], self.bank)
            } else {
                channel_pulse_value(self.channels[i], self.bank)
            };
        }

        values
    }
}

impl FrameLayout for Pxx1Frame {
    fn emit_header<T: PxxTransport>(&self, transport: &mut T) {
        transport.emit_raw_byte_without_checksum_or_stuffing(PXX_HEAD_BYTE);
        transport.emit_byte_with_checksum(self.rx_number);
    }

    fn emit_flags<T: PxxTransport>(&self, transport: &mut T) {
        transport.emit_byte_with_checksum(self.flag1());
        transport.emit_byte_with_checksum(PXX_FLAG2);
    }

    fn emit_channels<T: PxxTransport>(&self, transport: &mut T) {
        for pair in self.pulse_values().chunks_exact(2) {
            let (low, high) = (pair[0], pair[1]);
            transport.emit_byte_with_checksum(low as u8);
            transport.emit_byte_with_checksum(((low >> 8) & 0x0F) as u8 | (high << 4) as u8);
            transport.emit_byte_with_checksum((high >> 4) as u8);
        }
    }

    fn emit_extra_flags<T: PxxTransport>(&self, transport: &mut T) {
        transport.emit_byte_with_checksum(self.extra.to_byte());
    }

    fn emit_trailer<T: PxxTransport>(&self, transport: &mut T) {
        transport.emit_raw_byte_without_checksum_or_stuffing(PXX_HEAD_BYTE);
    }
}
