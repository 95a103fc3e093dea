//! Display multiplexing driven by the periodic timer

use crate::display::DisplayState;
use crate::hal::SegmentDisplay;
use crate::segment::{digit_pattern, SegmentPattern};
use crate::types::{DigitIndex, PanelConfig};

/// Which digit is next and how long the current one has been up
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MuxCursor {
    active: DigitIndex,
    elapsed: u32,
}

impl MuxCursor {
    pub const fn new() -> Self {
        Self {
            active: DigitIndex::Units,
            elapsed: 0,
        }
    }

    /// Digit that will be drawn at the next threshold crossing
    pub const fn active(&self) -> DigitIndex {
        self.active
    }

    /// Ticks counted since the last switch
    pub const fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Count one tick; returns the digit to draw when the threshold is reached
    ///
    /// The counter never exceeds `threshold` and is back at zero whenever a
    /// digit is returned. The active digit only moves on [`MuxCursor::flip`].
    pub fn advance(&mut self, threshold: u32) -> Option<DigitIndex> {
        self.elapsed += 1;
        if self.elapsed < threshold {
            return None;
        }

        self.elapsed = 0;
        Some(self.active)
    }

    /// Move to the other digit, in step with the select line
    pub fn flip(&mut self) {
        self.active = self.active.other();
    }
}

impl Default for MuxCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic display refresher
///
/// `tick` is meant to be called from the timer interrupt (or a ticker task)
/// once per period. It never blocks and touches the shared value only for
/// the single digit it is about to draw.
pub struct MuxRefresher {
    cursor: MuxCursor,
    threshold: u32,
}

impl MuxRefresher {
    /// Create a refresher switching digits every `threshold` ticks
    pub const fn new(threshold: u32) -> Self {
        Self {
            cursor: MuxCursor::new(),
            // A zero threshold would switch on every tick anyway
            threshold: if threshold == 0 { 1 } else { threshold },
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(config.refresh_threshold)
    }

    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    pub const fn cursor(&self) -> &MuxCursor {
        &self.cursor
    }

    /// Handle one timer tick
    ///
    /// On a threshold crossing the select line is toggled and the active
    /// digit's pattern is driven; the digit drawn is returned. If the toggle
    /// fails the cursor stays put, so units and tens keep their select level.
    pub fn tick<D: SegmentDisplay>(
        &mut self,
        state: &DisplayState,
        display: &mut D,
    ) -> Result<Option<DigitIndex>, D::Error> {
        let Some(index) = self.cursor.advance(self.threshold) else {
            return Ok(None);
        };

        let pattern: SegmentPattern = digit_pattern(state.digit(index));
        display.toggle_select()?;
        self.cursor.flip();
        display.write_segments(pattern)?;

        Ok(Some(index))
    }
}

/// Async task driving the refresher from an embassy ticker
#[cfg(feature = "embassy-time")]
pub async fn refresh_task<D: SegmentDisplay>(
    state: &DisplayState,
    display: &mut D,
    config: PanelConfig,
) -> ! {
    use embassy_time::{Duration, Ticker};

    let mut refresher = MuxRefresher::from_config(&config);
    let mut ticker = Ticker::every(Duration::from_micros(config.tick_period_us as u64));

    loop {
        match refresher.tick(state, display) {
            Ok(Some(_index)) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("Refreshed {:?}", _index);
            }
            Ok(None) => {}
            Err(_) => {
                // Frame dropped; the next crossing redraws
                #[cfg(feature = "defmt")]
                defmt::warn!("Display refresh failed");
            }
        }

        ticker.next().await;
    }
}
