//! Seven-segment encoding
//!
//! Bit layout of a pattern, most significant first: `- a b c d e f g`.
//! The display is common-anode, so a segment is lit when its bit is 0.

use crate::types::Digit;

/// Lit-segment map for digits 0-9 (1 = lit)
const SEGMENT_MAP: [u8; 10] = [126, 48, 109, 121, 51, 91, 95, 112, 127, 123];

/// Active-low segment pattern, ready to be driven onto the segment lines
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentPattern(pub u8);

impl SegmentPattern {
    /// Every segment off; also returned for characters with no glyph
    pub const BLANK: SegmentPattern = SegmentPattern(0xFF);

    /// Raw byte as written to the port
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Segments that are lit, in positive logic
    pub const fn lit(&self) -> u8 {
        !self.0
    }

    pub const fn is_blank(&self) -> bool {
        self.0 == Self::BLANK.0
    }
}

/// Pattern for a digit
pub const fn digit_pattern(digit: Digit) -> SegmentPattern {
    SegmentPattern(!SEGMENT_MAP[digit.value() as usize])
}

/// Encode an ASCII character
///
/// Anything other than `'0'..='9'` yields [`SegmentPattern::BLANK`].
pub const fn encode(ch: u8) -> SegmentPattern {
    match Digit::from_ascii(ch) {
        Some(digit) => digit_pattern(digit),
        None => SegmentPattern::BLANK,
    }
}
