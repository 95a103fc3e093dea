//! 4x4 keypad matrix scanner
//!
//! Rows are outputs, idle high. Columns are inputs with pull-ups. To scan,
//! each row is pulled low in turn and the columns are sampled; a column that
//! reads low has a closed key at that row.
//!
//! When several keys are down at once a single key is reported: within a row
//! the highest-numbered column wins, and a hit in a later row replaces a hit
//! in an earlier one.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::hal::HalError;
use crate::types::{Key, RawKey};

const ROWS: usize = Key::ROWS;
const COLS: usize = Key::COLS;

/// Keypad scanner owning the four row lines and four column lines
pub struct KeypadScanner<R, C> {
    rows: [R; ROWS],
    cols: [C; COLS],
}

impl<R, C> KeypadScanner<R, C>
where
    R: OutputPin,
    C: InputPin,
{
    pub fn new(rows: [R; ROWS], cols: [C; COLS]) -> Self {
        Self { rows, cols }
    }

    /// Drive every row line to its idle (high) level
    pub fn init(&mut self) -> Result<(), HalError> {
        for row in self.rows.iter_mut() {
            row.set_high().map_err(|_| HalError::GpioError)?;
        }
        Ok(())
    }

    /// Scan the whole matrix once
    ///
    /// Every row is back high when this returns, whether or not a key was
    /// found or a pin failed.
    pub fn scan(&mut self) -> Result<RawKey, HalError> {
        let mut key = None;

        for row in 0..ROWS {
            let pressed = self.sample_row(row)?;
            if let Some(col) = resolve_row(&pressed) {
                key = Some(Key::at(row, col));
            }
        }

        Ok(key)
    }

    /// Give the pins back
    pub fn release(self) -> ([R; ROWS], [C; COLS]) {
        (self.rows, self.cols)
    }

    fn sample_row(&mut self, row: usize) -> Result<[bool; COLS], HalError> {
        if self.rows[row].set_low().is_err() {
            let _ = self.rows[row].set_high();
            return Err(HalError::GpioError);
        }

        let sensed = self.read_columns();
        let released = self.rows[row].set_high().map_err(|_| HalError::GpioError);

        let pressed = sensed?;
        released?;
        Ok(pressed)
    }

    fn read_columns(&mut self) -> Result<[bool; COLS], HalError> {
        let mut pressed = [false; COLS];
        for (col, pin) in self.cols.iter_mut().enumerate() {
            pressed[col] = pin.is_low().map_err(|_| HalError::GpioError)?;
        }
        Ok(pressed)
    }
}

/// Column that wins within one row
fn resolve_row(pressed: &[bool; COLS]) -> Option<usize> {
    pressed.iter().rposition(|&down| down)
}
