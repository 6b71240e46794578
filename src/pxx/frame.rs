//! # Frame Builder
//!
//! Sequences one PXX frame over any [`PxxTransport`]:
//!
//! ```text
//! reset -> header -> flags -> channels -> extra flags -> CRC (hi, lo) -> trailer -> finish
//! ```
//!
//! Field contents come from a [`FrameLayout`]; the builder only knows the order.

use tracing::trace;

use super::transport::PxxTransport;

/// Protocol-variant field layout, written through the transport primitives
pub trait FrameLayout {
    /// Fields before the flags (sync byte, receiver number, ...)
    fn emit_header<T: PxxTransport>(&self, _transport: &mut T) {}

    fn emit_flags<T: PxxTransport>(&self, transport: &mut T);

    fn emit_channels<T: PxxTransport>(&self, transport: &mut T);

    fn emit_extra_flags<T: PxxTransport>(&self, transport: &mut T);

    /// Fields after the checksum
    fn emit_trailer<T: PxxTransport>(&self, _transport: &mut T) {}
}

/// Builds frames into a transport owned for the lifetime of the builder
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder<T> {
    transport: T,
    frames_built: u64,
}

impl<T: PxxTransport> FrameBuilder<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            frames_built: 0,
        }
    }

    /// Build one complete frame and return its physical representation
    ///
    /// The returned slice is valid until the next call.
    pub fn build<L: FrameLayout>(&mut self, layout: &L) -> &[T::Element] {
        let transport = &mut self.transport;

        transport.reset_frame();
        layout.emit_header(transport);
        layout.emit_flags(transport);
        layout.emit_channels(transport);
        layout.emit_extra_flags(transport);

        let crc = transport.checksum();
        transport.emit_byte_without_checksum((crc >> 8) as u8);
        transport.emit_byte_without_checksum(crc as u8);

        layout.emit_trailer(transport);
        transport.finish();

        self.frames_built += 1;
        trace!(
            "Built PXX frame #{} ({} elements, crc 0x{:04X})",
            self.frames_built,
            self.transport.contents().len(),
            crc
        );

        self.transport.contents()
    }

    /// Physical output of the last built frame
    pub fn contents(&self) -> &[T::Element] {
        self.transport.contents()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn frames_built(&self) -> u64 {
        self.frames_built
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pxx::crc::crc16;
    use crate::pxx::transport::UartPxxTransport;

    struct FixedLayout {
        flags: u8,
        channels: [u8; 3],
        extra: u8,
    }

    impl FrameLayout for FixedLayout {
        fn emit_flags<T: PxxTransport>(&self, transport: &mut T) {
            transport.emit_byte_with_checksum(self.flags);
        }

        fn emit_channels<T: PxxTransport>(&self, transport: &mut T) {
            for &byte in &self.channels {
                transport.emit_byte_with_checksum(byte);
            }
        }

        fn emit_extra_flags<T: PxxTransport>(&self, transport: &mut T) {
            transport.emit_byte_with_checksum(self.extra);
        }
    }

    fn layout() -> FixedLayout {
        FixedLayout {
            flags: 0x10,
            channels: [0x01, 0x02, 0x03],
            extra: 0x00,
        }
    }

    #[test]
    fn test_field_order_and_crc() {
        let mut builder = FrameBuilder::new(UartPxxTransport::new());
        let frame = builder.build(&layout()).to_vec();

        let crc = crc16(&[0x10, 0x01, 0x02, 0x03, 0x00]);
        assert_eq!(
            frame,
            vec![0x10, 0x01, 0x02, 0x03, 0x00, (crc >> 8) as u8, crc as u8]
        );
    }

    #[test]
    fn test_frames_are_independent() {
        let mut builder = FrameBuilder::new(UartPxxTransport::new());
        let first = builder.build(&layout()).to_vec();
        let second = builder.build(&layout()).to_vec();

        assert_eq!(first, second);
        assert_eq!(builder.frames_built(), 2);
    }

    #[test]
    fn test_contents_after_build() {
        let mut builder = FrameBuilder::new(UartPxxTransport::new());
        assert!(builder.contents().is_empty());

        let len = builder.build(&layout()).len();
        assert_eq!(builder.contents().len(), len);
        assert_eq!(builder.transport().contents().len(), len);
    }
}
