// Scripted keypad session against the mock matrix, display and serial port

use heapless::Vec;
use panel_core::hal::mock::{MockDelay, MockDisplay, MockSerial};
use panel_core::test_utils::MockMatrix;
use panel_core::*;

fn main() {
    println!("🧪 Keypad Panel Integration Run");

    // Test 1: Reference session
    run_reference_session();

    // Test 2: Display refresh
    run_refresh_cycle();

    // Test 3: Configuration validation
    check_configuration();

    println!("✅ All panel integration checks passed!");
    println!();
    println!("📝 Run the unit tests with: cargo test");
}

/// Type 3, 7, then # and * twice, as an operator would
fn run_reference_session() {
    println!("⌨️ Running reference session...");

    let matrix = MockMatrix::new();
    let config = default_config();
    let mut panel = KeypadPanel::new(matrix.scanner(), &config);
    let display = DisplayState::new();
    let mut serial = MockSerial::new();
    let mut delay = MockDelay::new();

    serial.write_bytes(BANNER).unwrap();

    let script: Vec<u8, 8> = Vec::from_slice(b"37#**").unwrap();
    for &label in script.iter() {
        let Some(key) = Key::from_ascii(label) else {
            panic!("no key for {}", label as char);
        };

        matrix.press(key);
        let mut fired = None;
        for _ in 0..4 {
            if let Some(action) = panel.poll(&mut delay, &display, &mut serial).unwrap() {
                fired = Some(action);
            }
        }
        matrix.release(key);
        panel.poll(&mut delay, &display, &mut serial).unwrap();

        let shown = display.snapshot().to_ascii();
        println!(
            "  {} -> {:?}, display {}{}",
            label as char, fired, shown[0] as char, shown[1] as char
        );
    }

    assert_eq!(display.snapshot().to_int(), 36);
    assert_eq!(&serial.sent()[BANNER.len()..], b"37");
    assert!(matrix.rows_idle());

    println!(
        "  ✅ Session ended at 36, settle time spent {} us",
        delay.total_us()
    );
}

/// Run the refresher for one full cycle of both digits
fn run_refresh_cycle() {
    println!("🔆 Running display refresh...");

    let display = DisplayState::new();
    display.store(Digits::from_int(52));
    let config = default_config();
    let mut refresher = MuxRefresher::from_config(&config);
    let mut screen = MockDisplay::new();

    for _ in 0..config.refresh_threshold * 2 {
        refresher.tick(&display, &mut screen).unwrap();
    }

    assert_eq!(screen.toggles(), 2);
    assert_eq!(screen.frames()[0].1, encode(b'2'));
    assert_eq!(screen.frames()[1].1, encode(b'5'));

    println!(
        "  ✅ Each digit held {} ms, patterns {:#04x} {:#04x}",
        config.refresh_interval_ms(),
        screen.frames()[0].1.bits(),
        screen.frames()[1].1.bits()
    );
}

fn check_configuration() {
    println!("⚙️ Checking configuration validation...");

    assert!(PanelConfig::new(500, 250, 1_000, KeyBindings::default()).is_ok());
    assert!(PanelConfig::new(0, 250, 1_000, KeyBindings::default()).is_err());
    assert!(KeyBindings::new(Key::Hash, Key::Hash, None).is_err());
    assert!(KeyBindings::new(Key::A, Key::B, Some(Key::C)).is_ok());

    println!("  ✅ Configuration validation working");
}
