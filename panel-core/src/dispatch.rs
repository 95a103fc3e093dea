//! Key event interpretation

use crate::display::{Digits, DisplayState};
use crate::hal::SerialTx;
use crate::types::{Digit, Key, KeyBindings, LogicalKeyEvent};

/// What a key event did to the display
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Digit shifted in and echoed
    Entered(Digit),
    /// Value after incrementing
    Incremented(u8),
    /// Value after decrementing
    Decremented(u8),
    /// Value reset to 00
    Cleared,
    /// Key has no function
    Ignored(Key),
}

/// Applies accepted key presses to the display value
pub struct InputDispatcher {
    bindings: KeyBindings,
}

impl InputDispatcher {
    pub const fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub const fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Decide what a key does, without touching anything
    pub fn action_for(&self, key: Key, current: Digits) -> (Digits, Action) {
        if let Some(digit) = key.as_digit() {
            return (current.rotate_in(digit), Action::Entered(digit));
        }

        if key == self.bindings.increment {
            let next = current.increment();
            (next, Action::Incremented(next.to_int()))
        } else if key == self.bindings.decrement {
            let next = current.decrement();
            (next, Action::Decremented(next.to_int()))
        } else if Some(key) == self.bindings.clear {
            (Digits::ZERO, Action::Cleared)
        } else {
            (current, Action::Ignored(key))
        }
    }

    /// Apply one event to the display and echo digits over serial
    ///
    /// The display is updated in a single critical section before the echo,
    /// so a serial failure never leaves a half-written value.
    pub fn dispatch<S: SerialTx>(
        &self,
        event: LogicalKeyEvent,
        display: &DisplayState,
        serial: &mut S,
    ) -> Result<Action, S::Error> {
        let mut action = Action::Ignored(event.key());
        display.update(|current| {
            let (next, taken) = self.action_for(event.key(), current);
            action = taken;
            next
        });

        if let Action::Entered(digit) = action {
            serial.write_byte(digit.to_ascii())?;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Key {:?} -> {:?}", event.key(), action);

        Ok(action)
    }
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}
