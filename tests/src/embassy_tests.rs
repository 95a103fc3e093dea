//! The async keypad and refresh tasks under the embassy-time mock driver
//!
//! Time only moves when a test advances the mock clock, so each step below
//! is one settle delay (or one refresh tick) followed by a yield that lets
//! the task run.

use std::sync::Mutex;

use embassy_time::{Duration, MockDriver};
use panel_core::hal::mock::{MockDisplay, MockSerial};
use panel_core::test_utils::MockMatrix;
use panel_core::*;

/// The mock clock is process-wide; tests that advance it take turns
static CLOCK: Mutex<()> = Mutex::new(());

async fn advance(step: Duration, times: usize) {
    for _ in 0..times {
        MockDriver::get().advance(step);
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_keypad_task_echoes_typed_digits() {
    let _clock = CLOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    println!("⌨️ Testing keypad task...");

    let config = default_config();
    let settle = Duration::from_micros(config.settle_us as u64);
    let matrix = MockMatrix::new();
    let display = DisplayState::new();
    let mut serial = MockSerial::new();
    let panel = KeypadPanel::new(matrix.scanner(), &config);

    tokio::select! {
        biased;
        _ = keypad_task(panel, &display, &mut serial) => unreachable!(),
        _ = async {
            for label in *b"42#" {
                let key = Key::from_ascii(label).unwrap();
                matrix.press(key);
                advance(settle, 4).await;
                matrix.release(key);
                advance(settle, 2).await;
            }
        } => {}
    }

    assert_eq!(serial.sent(), b"42");
    assert_eq!(display.snapshot().to_int(), 43);
    assert!(matrix.rows_idle());
    println!("  ✅ Keypad task echoed {:?}", serial.sent());
}

#[tokio::test]
async fn test_keypad_task_scan_error_while_held() {
    let _clock = CLOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    println!("⌨️ Testing keypad task across a scan error...");

    let config = default_config();
    let settle = Duration::from_micros(config.settle_us as u64);
    let matrix = MockMatrix::new();
    let display = DisplayState::new();
    let mut serial = MockSerial::new();
    let panel = KeypadPanel::new(matrix.scanner(), &config);

    tokio::select! {
        biased;
        _ = keypad_task(panel, &display, &mut serial) => unreachable!(),
        _ = async {
            matrix.press(Key::from_ascii(b'5').unwrap());
            advance(settle, 3).await;
            matrix.set_column_failing(true);
            advance(settle, 2).await;
            matrix.set_column_failing(false);
            advance(settle, 4).await;
        } => {}
    }

    assert_eq!(serial.sent(), b"5");
    assert_eq!(display.snapshot().to_int(), 5);
    assert!(matrix.rows_idle());
    println!("  ✅ Held key echoed once");
}

#[tokio::test]
async fn test_refresh_task_alternates_digits() {
    let _clock = CLOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    println!("🔆 Testing refresh task...");

    // 500 us tick, 1 ms per digit: a switch every second tick
    let config = PanelConfig::new(500, 1, 1_000, KeyBindings::default()).unwrap();
    let tick = Duration::from_micros(config.tick_period_us as u64);
    let state = DisplayState::new();
    state.store(Digits::from_int(52));
    let mut screen = MockDisplay::new();

    tokio::select! {
        biased;
        _ = refresh_task(&state, &mut screen, config) => unreachable!(),
        _ = advance(tick, 20) => {}
    }

    // The first tick runs before any time passes, so 21 ticks in all
    assert_eq!(screen.toggles(), 10);
    for (index, (select_high, pattern)) in screen.frames().iter().enumerate() {
        let expected = if index % 2 == 0 { b'2' } else { b'5' };
        assert_eq!(*pattern, encode(expected));
        assert_eq!(*select_high, index % 2 == 0);
    }
    println!("  ✅ {} digit switches", screen.toggles());
}
