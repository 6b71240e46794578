//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{PxxError, Result};
use crate::pxx::encoder::{ChannelBank, ExtraFlags, Pxx1Frame, RfProtocol};
use crate::pxx::protocol::*;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    pub pxx: PxxConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    /// Derived from the PXX frequency when not set
    #[serde(default)]
    pub baud_rate: Option<u32>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Physical output used for PXX frames
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Escaped byte stream on a hardware UART
    Uart,
    /// Software-timed 8 µs/bit pattern
    SerialBits,
    /// Timer-driven pulse train
    Pwm,
}

/// PXX module configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PxxConfig {
    #[serde(default = "default_transport")]
    pub transport: TransportKind,

    #[serde(default)]
    pub high_frequency: bool,

    #[serde(default)]
    pub internal_module: bool,

    #[serde(default)]
    pub rx_number: u8,

    /// 8, or 16 to alternate between the lower and upper channel banks
    #[serde(default = "default_channel_count")]
    pub channel_count: u8,

    #[serde(default)]
    pub rf_protocol: u8,

    #[serde(default)]
    pub power: u8,

    #[serde(default)]
    pub external_antenna: bool,

    #[serde(default)]
    pub telemetry_off: bool,

    #[serde(default)]
    pub channels_9_16: bool,

    #[serde(default)]
    pub disable_sport: bool,

    #[serde(default)]
    pub eu_plus: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write logs to daily files in this directory
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_timeout_ms() -> u64 { 100 }
fn default_transport() -> TransportKind { TransportKind::Uart }
fn default_channel_count() -> u8 { 8 }
fn default_log_level() -> String { "info".to_string() }

const VALID_BAUD_RATES: [u32; 3] = [
    PXX_UART_BAUD_RATE,
    PXX_UART_BAUD_RATE_EXTERNAL_HIGH,
    PXX_UART_BAUD_RATE_INTERNAL_HIGH,
];

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pxx_encoder::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Frame period in milliseconds
    pub fn period_ms(&self) -> u16 {
        if self.pxx.high_frequency {
            PXX_PERIOD_HIGH_FREQUENCY_MS
        } else {
            PXX_PERIOD_MS
        }
    }

    /// Pulse train budget in microseconds
    pub fn half_period_us(&self) -> u16 {
        half_period_us(self.period_ms())
    }

    /// Configured baud rate, or the one matching the module and frequency
    pub fn baud_rate(&self) -> u32 {
        match (self.serial.baud_rate, self.pxx.high_frequency, self.pxx.internal_module) {
            (Some(baud), _, _) => baud,
            (None, false, _) => PXX_UART_BAUD_RATE,
            (None, true, false) => PXX_UART_BAUD_RATE_EXTERNAL_HIGH,
            (None, true, true) => PXX_UART_BAUD_RATE_INTERNAL_HIGH,
        }
    }

    /// Frame contents for the configured module, channels centered
    pub fn frame_template(&self) -> Pxx1Frame {
        let rf_protocol = RfProtocol::from_index(self.pxx.rf_protocol).unwrap_or_default();

        Pxx1Frame::new(self.pxx.rx_number)
            .with_rf_protocol(rf_protocol)
            .with_extra_flags(ExtraFlags {
                external_antenna: self.pxx.external_antenna,
                telemetry_off: self.pxx.telemetry_off,
                channels_9_16: self.pxx.channels_9_16,
                power: self.pxx.power,
                disable_sport: self.pxx.disable_sport,
                eu_plus: self.pxx.eu_plus,
            })
    }

    /// Channel bank carried by the frame with the given sequence number
    pub fn bank_for_frame(&self, frame_index: u64) -> ChannelBank {
        if self.pxx.channel_count > PXX_CHANNELS_PER_FRAME as u8 && frame_index % 2 == 1 {
            ChannelBank::Upper
        } else {
            ChannelBank::Lower
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(PxxError::Config(
                toml::de::Error::custom("serial port cannot be empty")
            ));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(PxxError::Config(
                toml::de::Error::custom("timeout_ms must be between 1 and 10000")
            ));
        }

        if let Some(baud) = self.serial.baud_rate {
            if !VALID_BAUD_RATES.contains(&baud) {
                return Err(PxxError::Config(
                    toml::de::Error::custom("baud_rate must be one of: 115200, 420000, 450000")
                ));
            }
        }

        // 200 pulses of 48 µs do not fit in a 4 ms half-period
        if self.pxx.transport == TransportKind::Pwm && self.pxx.high_frequency {
            return Err(PxxError::Config(
                toml::de::Error::custom("pwm transport requires high_frequency = false")
            ));
        }

        if self.pxx.rx_number > PXX_MAX_RX_NUMBER {
            return Err(PxxError::Config(
                toml::de::Error::custom(format!("rx_number must be between 0 and {}", PXX_MAX_RX_NUMBER))
            ));
        }

        if ![8, 16].contains(&self.pxx.channel_count) {
            return Err(PxxError::Config(
                toml::de::Error::custom("channel_count must be 8 or 16")
            ));
        }

        if self.pxx.rf_protocol > PXX_MAX_RF_PROTOCOL {
            return Err(PxxError::Config(
                toml::de::Error::custom("rf_protocol must be 0 (X16), 1 (D8) or 2 (LR12)")
            ));
        }

        if self.pxx.power > PXX_MAX_POWER {
            return Err(PxxError::Config(
                toml::de::Error::custom(format!("power must be between 0 and {}", PXX_MAX_POWER))
            ));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(PxxError::Config(
                toml::de::Error::custom(format!("invalid log level '{}'", self.logging.level))
            ));
        }

        if matches!(&self.logging.log_dir, Some(dir) if dir.is_empty()) {
            return Err(PxxError::Config(
                toml::de::Error::custom("log_dir cannot be empty when set")
            ));
        }

        Ok(())
    }
}
