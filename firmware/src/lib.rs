#![no_std]

//! Firmware library: board bindings and the embassy tasks that drive the panel

pub use embassy_executor::Spawner;
pub use embassy_time::Duration;

pub use panel_core::*;

pub use crate::ch32v203_hardware::*;
pub use crate::tasks::*;

/// Digit pair shared by the refresher and the keypad task
pub static DISPLAY: DisplayState = DisplayState::new();

// Embassy tasks module
pub mod tasks {
    use super::*;

    /// Refresher task wrapper
    #[embassy_executor::task]
    pub async fn refresh_task_wrapper(
        state: &'static DisplayState,
        mut display: BoardDisplay,
        config: PanelConfig,
    ) {
        #[cfg(feature = "defmt")]
        defmt::info!("Refresh task started");
        panel_core::refresh_task(state, &mut display, config).await;
    }

    /// Keypad task wrapper
    #[embassy_executor::task]
    pub async fn keypad_task_wrapper(
        panel: KeypadPanel<Ch32v203Output, Ch32v203Input>,
        state: &'static DisplayState,
        mut serial: BoardSerial,
    ) {
        #[cfg(feature = "defmt")]
        defmt::info!("Keypad task started");
        panel_core::keypad_task(panel, state, &mut serial).await;
    }
}

// CH32V203 hardware module
pub mod ch32v203_hardware;

// Time driver for embassy
pub mod time_driver;
