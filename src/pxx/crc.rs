//! # PXX CRC-16
//!
//! Running CRC-16 over the logical bytes of a PXX frame.
//!
//! **Table**: reflected CCITT polynomial 0x8408 (`table[1] == 0x1189`)
//! **Update**: `crc = (crc << 8) ^ table[((crc >> 8) ^ byte) & 0xFF]`
//! **Initial Value**: 0x0000

/// Reflected CCITT polynomial used to build the lookup table
const CRC16_POLY: u16 = 0x8408;

/// Precomputed CRC16 lookup table
pub const PXX_CRC16_TABLE: [u16; 256] = generate_crc16_table();

/// Generate the CRC16 lookup table at compile time
const fn generate_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        table[i] = table_entry(i as u8);
        i += 1;
    }

    table
}

const fn table_entry(index: u8) -> u16 {
    let mut crc = index as u16;
    let mut j = 0;

    while j < 8 {
        if (crc & 1) != 0 {
            crc = (crc >> 1) ^ CRC16_POLY;
        } else {
            crc >>= 1;
        }
        j += 1;
    }

    crc
}

/// Checksum accumulator fed one logical byte at a time
#[derive(Debug, Clone, Copy)]
pub struct Crc16 {
    crc: u16,
    table: &'static [u16; 256],
}

impl Crc16 {
    /// Accumulator using the PXX table
    pub const fn new() -> Self {
        Self::with_table(&PXX_CRC16_TABLE)
    }

    /// Accumulator using an externally supplied table
    pub const fn with_table(table: &'static [u16; 256]) -> Self {
        Self { crc: 0, table }
    }

    pub fn reset(&mut self) {
        self.crc = 0;
    }

    /// Fold one logical byte into the checksum
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.crc = (self.crc << 8) ^ self.table[(((self.crc >> 8) ^ byte as u16) & 0xFF) as usize];
    }

    /// Current checksum value
    pub fn value(&self) -> u16 {
        self.crc
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculate the PXX CRC16 of a byte slice
///
/// # Examples
///
/// ```
/// use pxx_encoder::pxx::crc::crc16;
///
/// assert_eq!(crc16(&[]), 0x0000);
/// assert_eq!(crc16(&[0x01]), 0x1189);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = Crc16::new();

    for &byte in data {
        crc.update(byte);
    }

    crc.value()
}

/// Same checksum without the lookup table (slow, for verification)
#[allow(dead_code)]
fn crc16_slow(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;

    for &byte in data {
        let index = ((crc >> 8) ^ byte as u16) as u8;
        let mut entry = index as u16;

        for _ in 0..8 {
            if (entry & 1) != 0 {
                entry = (entry >> 1) ^ CRC16_POLY;
            } else {
                entry >>= 1;
            }
        }

        crc = (crc << 8) ^ entry;
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_empty() {
        assert_eq!(crc16(&[]), 0x0000);
    }

    #[test]
    fn test_table_known_entries() {
        assert_eq!(PXX_CRC16_TABLE[0], 0x0000);
        assert_eq!(PXX_CRC16_TABLE[1], 0x1189);
        assert_eq!(PXX_CRC16_TABLE[2], 0x2312);
        assert_eq!(PXX_CRC16_TABLE[3], 0x329B);
        assert_eq!(PXX_CRC16_TABLE[255], 0x0F78);
    }

    #[test]
    fn test_crc16_single_byte() {
        assert_eq!(crc16(&[0x00]), 0x0000);
        assert_eq!(crc16(&[0x01]), 0x1189);
        assert_eq!(crc16(&[0xFF]), crc16_slow(&[0xFF]));
    }

    #[test]
    fn test_crc16_two_bytes_by_hand() {
        // After 0x01: crc = 0x1189, then index = 0x11 ^ 0x00
        let expected = (0x1189u16 << 8) ^ PXX_CRC16_TABLE[0x11];
        assert_eq!(crc16(&[0x01, 0x00]), expected);
    }

    #[test]
    fn test_lookup_table_matches_slow() {
        let test_data = [
            vec![0x01, 0x02, 0x03],
            vec![0xFF, 0xFE, 0xFD],
            vec![0x00, 0x10, 0x7E, 0x7D, 0x40],
            vec![0x00; 16],
            vec![0xFF; 10],
        ];

        for data in test_data.iter() {
            assert_eq!(crc16(data), crc16_slow(data), "CRC mismatch for data: {:?}", data);
        }
    }

    #[test]
    fn test_accumulator_reset() {
        let mut crc = Crc16::new();
        crc.update(0x42);
        assert_ne!(crc.value(), 0);

        crc.reset();
        assert_eq!(crc.value(), 0);
    }

    #[test]
    fn test_custom_table() {
        static ZERO_TABLE: [u16; 256] = [0; 256];
        let mut crc = Crc16::with_table(&ZERO_TABLE);
        crc.update(0x01);
        crc.update(0x02);
        assert_eq!(crc.value(), 0);
    }

    #[test]
    fn test_crc16_changes_with_data() {
        assert_ne!(crc16(&[0x00, 0x10, 0x00]), crc16(&[0x00, 0x10, 0x01]));
    }
}
