//! Two-digit display value and the cell it is shared through
//!
//! The foreground writes the value, the refresh interrupt reads it. Both
//! sides go through a critical section, so the refresher always sees a pair
//! that was written together.

use core::cell::Cell;

use critical_section::Mutex;

use crate::types::{Digit, DigitIndex};

/// Displayed value, units and tens
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Digits {
    pub units: Digit,
    pub tens: Digit,
}

impl Digits {
    pub const ZERO: Digits = Digits {
        units: Digit::ZERO,
        tens: Digit::ZERO,
    };

    pub const fn new(tens: Digit, units: Digit) -> Self {
        Self { units, tens }
    }

    /// Shift a newly typed digit in from the right
    ///
    /// The old units digit becomes the tens digit, the old tens digit is
    /// dropped.
    pub const fn rotate_in(self, digit: Digit) -> Self {
        Self {
            units: digit,
            tens: self.units,
        }
    }

    /// Value as a number, 0-99
    pub const fn to_int(self) -> u8 {
        self.tens.value() * 10 + self.units.value()
    }

    /// Split a number in 0-99 into digits
    pub fn from_int(n: u8) -> Self {
        debug_assert!(n < 100, "display value out of range: {}", n);
        let n = n % 100;
        Self {
            units: digit_of(n % 10),
            tens: digit_of(n / 10),
        }
    }

    /// Next value, 99 wraps to 0
    pub fn increment(self) -> Self {
        Self::from_int((self.to_int() + 1) % 100)
    }

    /// Previous value, 0 wraps to 99
    pub fn decrement(self) -> Self {
        match self.to_int() {
            0 => Self::from_int(99),
            n => Self::from_int(n - 1),
        }
    }

    pub const fn get(&self, index: DigitIndex) -> Digit {
        match index {
            DigitIndex::Units => self.units,
            DigitIndex::Tens => self.tens,
        }
    }

    /// Characters in reading order, tens first
    pub const fn to_ascii(&self) -> [u8; 2] {
        [self.tens.to_ascii(), self.units.to_ascii()]
    }
}

impl Default for Digits {
    fn default() -> Self {
        Self::ZERO
    }
}

fn digit_of(value: u8) -> Digit {
    Digit::new(value).unwrap_or(Digit::ZERO)
}

/// Display value shared between the foreground and the refresh interrupt
pub struct DisplayState {
    digits: Mutex<Cell<Digits>>,
}

impl DisplayState {
    /// Create a display showing `00`
    pub const fn new() -> Self {
        Self {
            digits: Mutex::new(Cell::new(Digits::ZERO)),
        }
    }

    /// Consistent copy of both digits
    pub fn snapshot(&self) -> Digits {
        critical_section::with(|cs| self.digits.borrow(cs).get())
    }

    /// Single digit, for the refresher
    pub fn digit(&self, index: DigitIndex) -> Digit {
        critical_section::with(|cs| self.digits.borrow(cs).get().get(index))
    }

    /// Replace both digits at once
    pub fn store(&self, digits: Digits) {
        critical_section::with(|cs| self.digits.borrow(cs).set(digits));
    }

    /// Read-modify-write under a single critical section; returns the new value
    pub fn update<F>(&self, f: F) -> Digits
    where
        F: FnOnce(Digits) -> Digits,
    {
        critical_section::with(|cs| {
            let cell = self.digits.borrow(cs);
            let next = f(cell.get());
            cell.set(next);
            next
        })
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}
