//! Pin-level transaction tests against embedded-hal-mock

use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};
use embedded_hal_mock::eh1::MockError;
use panel_core::{encode, HalError, Key, KeypadScanner, PinDisplay, SegmentDisplay};
use std::io::ErrorKind;

/// Rows are pulsed low one at a time and always released
fn row_pins() -> [PinMock; 4] {
    core::array::from_fn(|_| {
        PinMock::new(&[
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ])
    })
}

/// Column pins for one full scan with `pressed` closed
fn column_pins(pressed: &[(usize, usize)]) -> [PinMock; 4] {
    core::array::from_fn(|col| {
        let reads: Vec<Transaction> = (0..4)
            .map(|row| {
                if pressed.contains(&(row, col)) {
                    Transaction::get(State::Low)
                } else {
                    Transaction::get(State::High)
                }
            })
            .collect();
        PinMock::new(&reads)
    })
}

fn finish(rows: [PinMock; 4], cols: [PinMock; 4]) {
    for mut pin in rows.into_iter().chain(cols) {
        pin.done();
    }
}

#[test]
fn test_scan_sequence_idle() {
    let rows = row_pins();
    let cols = column_pins(&[]);
    let mut scanner = KeypadScanner::new(rows.clone(), cols.clone());

    assert_eq!(scanner.scan(), Ok(None));
    finish(rows, cols);
}

#[test]
fn test_scan_sequence_single_key() {
    let rows = row_pins();
    let cols = column_pins(&[(1, 1)]);
    let mut scanner = KeypadScanner::new(rows.clone(), cols.clone());

    assert_eq!(scanner.scan(), Ok(Key::from_ascii(b'5')));
    finish(rows, cols);
}

#[test]
fn test_scan_sequence_priority() {
    // 4 and 6 share row 1; 0 sits on a later row
    let rows = row_pins();
    let cols = column_pins(&[(1, 0), (1, 2)]);
    let mut scanner = KeypadScanner::new(rows.clone(), cols.clone());
    assert_eq!(scanner.scan(), Ok(Key::from_ascii(b'6')));
    finish(rows, cols);

    let rows = row_pins();
    let cols = column_pins(&[(1, 2), (3, 1)]);
    let mut scanner = KeypadScanner::new(rows.clone(), cols.clone());
    assert_eq!(scanner.scan(), Ok(Key::from_ascii(b'0')));
    finish(rows, cols);
}

#[test]
fn test_column_error_releases_row() {
    // Only row 0 and column 0 are touched before the read fails
    let rows: [PinMock; 4] = core::array::from_fn(|row| match row {
        0 => PinMock::new(&[
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ]),
        _ => PinMock::new(&[]),
    });
    let cols: [PinMock; 4] = core::array::from_fn(|col| match col {
        0 => PinMock::new(&[Transaction::get(State::High)
            .with_error(MockError::Io(ErrorKind::NotConnected))]),
        _ => PinMock::new(&[]),
    });

    let mut scanner = KeypadScanner::new(rows.clone(), cols.clone());
    assert_eq!(scanner.scan(), Err(HalError::GpioError));
    finish(rows, cols);
}

#[test]
fn test_segment_lines_follow_pattern() {
    let pattern = encode(b'7');
    let segments: [PinMock; 8] = core::array::from_fn(|bit| {
        let level = if pattern.bits() & (1 << bit) != 0 {
            State::High
        } else {
            State::Low
        };
        PinMock::new(&[Transaction::set(level)])
    });
    let select = PinMock::new(&[]);

    let mut display = PinDisplay::new(select.clone(), segments.clone());
    display.write_segments(pattern).unwrap();

    let mut select = select;
    select.done();
    for mut pin in segments {
        pin.done();
    }
}
