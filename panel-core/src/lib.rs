#![cfg_attr(not(feature = "std"), no_std)]

//! # Panel Core
//!
//! Core logic for a two-digit seven-segment counter driven by a 4x4 keypad.
//! The display refresher runs from a periodic timer; the keypad scanner,
//! debouncer and dispatcher run in the foreground. The two sides share only
//! the [`DisplayState`] cell.

pub mod types;
pub mod segment;
pub mod display;
pub mod mux;
pub mod scanner;
pub mod debounce;
pub mod dispatch;
pub mod panel;
pub mod hal;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use types::*;
pub use segment::{encode, SegmentPattern};
pub use display::{Digits, DisplayState};
pub use mux::{MuxCursor, MuxRefresher};
pub use scanner::KeypadScanner;
pub use debounce::DebounceFilter;
pub use dispatch::{Action, InputDispatcher};
pub use panel::KeypadPanel;
pub use hal::{HalError, IoSerial, PinDisplay, SegmentDisplay, SerialTx};

#[cfg(feature = "embassy-time")]
pub use mux::refresh_task;
#[cfg(feature = "embassy-time")]
pub use panel::keypad_task;

/// Panel library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Banner the firmware prints on the serial port at start-up
pub const BANNER: &[u8] = b"Testing Keypad program\r\n";

/// Default configuration: 500 us timer, 250 ms per digit, `#` up, `*` down
pub fn default_config() -> PanelConfig {
    PanelConfig {
        tick_period_us: 500,
        refresh_threshold: 500,
        settle_us: 1_000,
        bindings: KeyBindings::default(),
    }
}
