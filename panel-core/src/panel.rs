//! Foreground keypad loop: scan, settle, debounce, dispatch

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::debounce::DebounceFilter;
use crate::dispatch::{Action, InputDispatcher};
use crate::display::DisplayState;
use crate::hal::SerialTx;
use crate::scanner::KeypadScanner;
use crate::types::{PanelConfig, RawKey};

/// Everything the foreground owns
pub struct KeypadPanel<R, C> {
    scanner: KeypadScanner<R, C>,
    filter: DebounceFilter,
    dispatcher: InputDispatcher,
    settle_us: u32,
}

impl<R, C> KeypadPanel<R, C>
where
    R: OutputPin,
    C: InputPin,
{
    pub fn new(scanner: KeypadScanner<R, C>, config: &PanelConfig) -> Self {
        Self {
            scanner,
            filter: DebounceFilter::new(),
            dispatcher: InputDispatcher::new(config.bindings),
            settle_us: config.settle_us,
        }
    }

    /// One pass of the foreground loop, settling with a blocking delay
    ///
    /// Returns the action taken when a press was accepted.
    pub fn poll<D, S>(
        &mut self,
        delay: &mut D,
        display: &DisplayState,
        serial: &mut S,
    ) -> Result<Option<Action>, S::Error>
    where
        D: DelayNs,
        S: SerialTx,
    {
        let raw = self.scanner.scan()?;
        delay.delay_us(self.settle_us);
        self.commit(raw, display, serial)
    }

    /// Debounce a scan result taken earlier and dispatch it if accepted
    pub fn commit<S: SerialTx>(
        &mut self,
        raw: RawKey,
        display: &DisplayState,
        serial: &mut S,
    ) -> Result<Option<Action>, S::Error> {
        match self.filter.filter(raw) {
            Some(event) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Key accepted: {:?}", event.key());
                self.dispatcher.dispatch(event, display, serial).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn scanner_mut(&mut self) -> &mut KeypadScanner<R, C> {
        &mut self.scanner
    }

    pub const fn filter(&self) -> &DebounceFilter {
        &self.filter
    }

    pub const fn settle_us(&self) -> u32 {
        self.settle_us
    }
}

/// Async task running the foreground loop under embassy
///
/// The settle delay is an executor timer, so other tasks run meanwhile.
#[cfg(feature = "embassy-time")]
pub async fn keypad_task<R, C, S>(
    mut panel: KeypadPanel<R, C>,
    display: &DisplayState,
    serial: &mut S,
) -> !
where
    R: OutputPin,
    C: InputPin,
    S: SerialTx,
{
    use embassy_time::Timer;

    #[cfg(feature = "defmt")]
    defmt::info!("Keypad loop started");

    loop {
        let raw = match panel.scanner.scan() {
            Ok(raw) => raw,
            Err(_) => {
                // Not a no-key scan; the debouncer keeps its state
                #[cfg(feature = "defmt")]
                defmt::warn!("Keypad scan failed");
                Timer::after_micros(panel.settle_us as u64).await;
                continue;
            }
        };

        Timer::after_micros(panel.settle_us as u64).await;

        if panel.commit(raw, display, serial).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Serial echo failed");
        }
    }
}
