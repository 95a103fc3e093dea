//! Two-scan agreement debouncing
//!
//! A key is accepted once it reads the same on two consecutive scans, and is
//! not accepted again until a scan sees no key at all. There is no timeout:
//! a key held down forever produces exactly one event.

use crate::types::{LogicalKeyEvent, RawKey};

/// Debounce state carried from one scan to the next
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceFilter {
    previous: RawKey,
    accepted: RawKey,
}

impl DebounceFilter {
    pub const fn new() -> Self {
        Self {
            previous: None,
            accepted: None,
        }
    }

    /// Feed one scan result; returns an event when a press is accepted
    pub fn filter(&mut self, raw: RawKey) -> Option<LogicalKeyEvent> {
        let Some(key) = raw else {
            self.reset();
            return None;
        };

        let event = if self.previous == raw && self.accepted != raw {
            self.accepted = raw;
            Some(LogicalKeyEvent(key))
        } else {
            None
        };

        self.previous = raw;
        event
    }

    /// Forget any key in progress
    pub fn reset(&mut self) {
        self.previous = None;
        self.accepted = None;
    }

    /// Scan result seen last time
    pub const fn previous(&self) -> RawKey {
        self.previous
    }

    /// Key most recently turned into an event, while it is still held
    pub const fn accepted(&self) -> RawKey {
        self.accepted
    }
}
