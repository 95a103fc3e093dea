//! Hardware Abstraction Layer for the keypad panel

use embedded_hal::digital::{OutputPin, PinState, StatefulOutputPin};

use crate::segment::SegmentPattern;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Serial transmit failed
    SerialError,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::SerialError => write!(f, "Serial transmit failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Multiplexed two-digit seven-segment output
pub trait SegmentDisplay {
    type Error: From<HalError>;

    /// Flip the digit-select line to the other digit
    fn toggle_select(&mut self) -> Result<(), Self::Error>;

    /// Drive the segment lines with an active-low pattern
    fn write_segments(&mut self, pattern: SegmentPattern) -> Result<(), Self::Error>;
}

/// Blocking byte-at-a-time serial transmitter
pub trait SerialTx {
    type Error: From<HalError>;

    /// Send one byte, returning once the transmitter has accepted it
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Send every byte of `bytes`
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

/// Display built from embedded-hal pins: one select line, eight segment lines
///
/// `segments[0]` carries bit 0 of the pattern (segment g), `segments[7]`
/// carries bit 7 (unused by digit glyphs, held high).
pub struct PinDisplay<S, P> {
    select: S,
    segments: [P; 8],
}

impl<S, P> PinDisplay<S, P>
where
    S: StatefulOutputPin,
    P: OutputPin,
{
    pub fn new(select: S, segments: [P; 8]) -> Self {
        Self { select, segments }
    }

    /// Blank all segments
    pub fn blank(&mut self) -> Result<(), HalError> {
        self.write_segments(SegmentPattern::BLANK)
    }

    /// Give the pins back
    pub fn release(self) -> (S, [P; 8]) {
        (self.select, self.segments)
    }
}

impl<S, P> SegmentDisplay for PinDisplay<S, P>
where
    S: StatefulOutputPin,
    P: OutputPin,
{
    type Error = HalError;

    fn toggle_select(&mut self) -> Result<(), Self::Error> {
        self.select.toggle().map_err(|_| HalError::GpioError)
    }

    fn write_segments(&mut self, pattern: SegmentPattern) -> Result<(), Self::Error> {
        for (bit, pin) in self.segments.iter_mut().enumerate() {
            let level = PinState::from(pattern.bits() & (1 << bit) != 0);
            pin.set_state(level).map_err(|_| HalError::GpioError)?;
        }
        Ok(())
    }
}

/// Serial transmitter over any `embedded_io::Write`
pub struct IoSerial<W> {
    writer: W,
}

impl<W: embedded_io::Write> IoSerial<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: embedded_io::Write> SerialTx for IoSerial<W> {
    type Error = HalError;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.writer
            .write_all(&[byte])
            .map_err(|_| HalError::SerialError)?;
        self.writer.flush().map_err(|_| HalError::SerialError)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use heapless::Vec;

    /// Records what was driven onto the display
    #[derive(Debug, Default)]
    pub struct MockDisplay {
        select_high: bool,
        toggles: u32,
        frames: Vec<(bool, SegmentPattern), 64>,
        fail: bool,
    }

    impl MockDisplay {
        pub fn new() -> Self {
            Self::default()
        }

        /// Current level of the digit-select line
        pub fn select_high(&self) -> bool {
            self.select_high
        }

        pub fn toggles(&self) -> u32 {
            self.toggles
        }

        /// Patterns written so far, each with the select level it was shown on
        pub fn frames(&self) -> &[(bool, SegmentPattern)] {
            &self.frames
        }

        pub fn last_pattern(&self) -> Option<SegmentPattern> {
            self.frames.last().map(|(_, pattern)| *pattern)
        }

        /// Make every following operation fail
        pub fn set_failing(&mut self, fail: bool) {
            self.fail = fail;
        }
    }

    impl SegmentDisplay for MockDisplay {
        type Error = HalError;

        fn toggle_select(&mut self) -> Result<(), Self::Error> {
            if self.fail {
                return Err(HalError::GpioError);
            }
            self.select_high = !self.select_high;
            self.toggles += 1;
            Ok(())
        }

        fn write_segments(&mut self, pattern: SegmentPattern) -> Result<(), Self::Error> {
            if self.fail {
                return Err(HalError::GpioError);
            }
            // Oldest frames fall off once the buffer is full
            if self.frames.is_full() {
                self.frames.remove(0);
            }
            self.frames.push((self.select_high, pattern)).ok();
            Ok(())
        }
    }

    /// Captures transmitted bytes
    #[derive(Debug, Default)]
    pub struct MockSerial {
        sent: Vec<u8, 256>,
        fail: bool,
    }

    impl MockSerial {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent(&self) -> &[u8] {
            &self.sent
        }

        pub fn set_failing(&mut self, fail: bool) {
            self.fail = fail;
        }
    }

    impl SerialTx for MockSerial {
        type Error = HalError;

        fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
            if self.fail {
                return Err(HalError::SerialError);
            }
            self.sent.push(byte).map_err(|_| HalError::SerialError)
        }
    }

    /// Delay that only accumulates the requested time
    #[derive(Debug, Default)]
    pub struct MockDelay {
        total_ns: u64,
    }

    impl MockDelay {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn total_us(&self) -> u64 {
            self.total_ns / 1_000
        }
    }

    impl embedded_hal::delay::DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }
}
