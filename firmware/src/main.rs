#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;

// RISC-V runtime
use riscv_rt as _;

// Panic handler
use panic_halt as _;

use embassy_executor::Spawner;
use embassy_time::Duration;

use duodigit_firmware::*;

/// Main firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    #[cfg(feature = "defmt")]
    defmt::info!("Duodigit firmware starting...");

    time_driver::init();

    let board = match Ch32v203Board::init() {
        Ok(board) => board,
        Err(_err) => {
            #[cfg(feature = "defmt")]
            defmt::error!("Hardware init failed: {}", _err);
            halt().await
        }
    };
    let Ch32v203Board {
        scanner,
        display,
        mut serial,
    } = board;

    let config = default_config();
    #[cfg(feature = "defmt")]
    defmt::info!(
        "Panel config: tick {} us, refresh {} ms, settle {} us",
        config.tick_period_us,
        config.refresh_interval_ms(),
        config.settle_us
    );

    if serial.write_bytes(BANNER).is_err() {
        #[cfg(feature = "defmt")]
        defmt::warn!("Banner not sent");
    }

    let panel = KeypadPanel::new(scanner, &config);

    spawner.must_spawn(refresh_task_wrapper(&DISPLAY, display, config));
    spawner.must_spawn(keypad_task_wrapper(panel, &DISPLAY, serial));

    #[cfg(feature = "defmt")]
    defmt::info!("Panel ready");

    loop {
        embassy_time::Timer::after(Duration::from_secs(1)).await;
        #[cfg(feature = "defmt")]
        defmt::trace!("Heartbeat: {}", DISPLAY.snapshot().to_int());
    }
}

/// Park the core after a fatal start-up error
async fn halt() -> ! {
    loop {
        embassy_time::Timer::after(Duration::from_secs(1)).await;
    }
}
