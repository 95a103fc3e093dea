//! Test utilities for panel core functionality

use core::cell::Cell;

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};

use crate::scanner::KeypadScanner;
use crate::types::Key;

const ROWS: usize = Key::ROWS;
const COLS: usize = Key::COLS;

/// Pin failure injected by [`MockMatrix`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MockPinError;

impl digital::Error for MockPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Electrical model of a 4x4 keypad without diodes
///
/// A column reads low while any row that has a closed key on that column is
/// driven low. Row levels are recorded so tests can check the scanner leaves
/// them idle.
pub struct MockMatrix {
    closed: [[Cell<bool>; COLS]; ROWS],
    row_high: [Cell<bool>; ROWS],
    column_failing: Cell<bool>,
}

impl MockMatrix {
    pub fn new() -> Self {
        Self {
            closed: Default::default(),
            row_high: [Cell::new(true), Cell::new(true), Cell::new(true), Cell::new(true)],
            column_failing: Cell::new(false),
        }
    }

    /// Close the contact under `key`
    pub fn press(&self, key: Key) {
        let (row, col) = key.position();
        self.closed[row][col].set(true);
    }

    /// Open the contact under `key`
    pub fn release(&self, key: Key) {
        let (row, col) = key.position();
        self.closed[row][col].set(false);
    }

    pub fn release_all(&self) {
        for row in self.closed.iter() {
            for contact in row.iter() {
                contact.set(false);
            }
        }
    }

    /// True when every row line is high
    pub fn rows_idle(&self) -> bool {
        self.row_high.iter().all(|level| level.get())
    }

    /// Make column reads fail
    pub fn set_column_failing(&self, failing: bool) {
        self.column_failing.set(failing);
    }

    pub fn row_pin(&self, row: usize) -> MatrixRow<'_> {
        MatrixRow { matrix: self, row }
    }

    pub fn column_pin(&self, col: usize) -> MatrixColumn<'_> {
        MatrixColumn { matrix: self, col }
    }

    /// Scanner wired to this matrix
    pub fn scanner(&self) -> KeypadScanner<MatrixRow<'_>, MatrixColumn<'_>> {
        KeypadScanner::new(
            [self.row_pin(0), self.row_pin(1), self.row_pin(2), self.row_pin(3)],
            [
                self.column_pin(0),
                self.column_pin(1),
                self.column_pin(2),
                self.column_pin(3),
            ],
        )
    }

    fn column_low(&self, col: usize) -> bool {
        (0..ROWS).any(|row| !self.row_high[row].get() && self.closed[row][col].get())
    }
}

impl Default for MockMatrix {
    fn default() -> Self {
        Self::new()
    }
}

/// Row drive line of a [`MockMatrix`]
pub struct MatrixRow<'a> {
    matrix: &'a MockMatrix,
    row: usize,
}

impl ErrorType for MatrixRow<'_> {
    type Error = MockPinError;
}

impl OutputPin for MatrixRow<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.matrix.row_high[self.row].set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.matrix.row_high[self.row].set(true);
        Ok(())
    }
}

/// Column sense line of a [`MockMatrix`]
pub struct MatrixColumn<'a> {
    matrix: &'a MockMatrix,
    col: usize,
}

impl ErrorType for MatrixColumn<'_> {
    type Error = MockPinError;
}

impl InputPin for MatrixColumn<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        if self.matrix.column_failing.get() {
            return Err(MockPinError);
        }
        Ok(self.matrix.column_low(self.col))
    }
}
