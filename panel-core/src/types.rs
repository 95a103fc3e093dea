//! Core data types for the keypad panel

/// A single decimal digit, 0 through 9
///
/// The constructor rejects anything else, so a `Digit` is always printable
/// and always has a segment pattern.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Digit(u8);

impl Digit {
    pub const ZERO: Digit = Digit(0);
    pub const NINE: Digit = Digit(9);

    /// Create a digit from its numeric value
    pub const fn new(value: u8) -> Option<Self> {
        if value <= 9 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create a digit from an ASCII character `'0'..='9'`
    pub const fn from_ascii(ch: u8) -> Option<Self> {
        if ch.is_ascii_digit() {
            Some(Self(ch - b'0'))
        } else {
            None
        }
    }

    /// Numeric value, 0-9
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// ASCII character for this digit
    pub const fn to_ascii(&self) -> u8 {
        b'0' + self.0
    }
}

/// Keys of the 4x4 matrix keypad
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// Numeric key 0-9
    Digit(Digit),
    A,
    B,
    C,
    D,
    /// `*` key
    Star,
    /// `#` key
    Hash,
}

impl Key {
    /// Number of rows in the keypad matrix
    pub const ROWS: usize = 4;
    /// Number of columns in the keypad matrix
    pub const COLS: usize = 4;

    /// Row-major key layout, indexed as `LAYOUT[row][column]`
    pub const LAYOUT: [[Key; Key::COLS]; Key::ROWS] = [
        [Key::digit(1), Key::digit(2), Key::digit(3), Key::A],
        [Key::digit(4), Key::digit(5), Key::digit(6), Key::B],
        [Key::digit(7), Key::digit(8), Key::digit(9), Key::C],
        [Key::Star, Key::digit(0), Key::Hash, Key::D],
    ];

    const fn digit(value: u8) -> Key {
        Key::Digit(Digit(value))
    }

    /// Key at the given matrix position
    pub const fn at(row: usize, col: usize) -> Key {
        Self::LAYOUT[row][col]
    }

    /// Matrix position `(row, column)` of this key
    pub fn position(&self) -> (usize, usize) {
        match self {
            Key::Digit(d) => match d.value() {
                0 => (3, 1),
                v => (((v - 1) / 3) as usize, ((v - 1) % 3) as usize),
            },
            Key::A => (0, 3),
            Key::B => (1, 3),
            Key::C => (2, 3),
            Key::D => (3, 3),
            Key::Star => (3, 0),
            Key::Hash => (3, 2),
        }
    }

    /// Label printed on the keycap
    pub const fn to_ascii(&self) -> u8 {
        match self {
            Key::Digit(d) => d.to_ascii(),
            Key::A => b'A',
            Key::B => b'B',
            Key::C => b'C',
            Key::D => b'D',
            Key::Star => b'*',
            Key::Hash => b'#',
        }
    }

    /// Parse a keycap label
    pub const fn from_ascii(ch: u8) -> Option<Key> {
        match ch {
            b'0'..=b'9' => Some(Key::Digit(Digit(ch - b'0'))),
            b'A' => Some(Key::A),
            b'B' => Some(Key::B),
            b'C' => Some(Key::C),
            b'D' => Some(Key::D),
            b'*' => Some(Key::Star),
            b'#' => Some(Key::Hash),
            _ => None,
        }
    }

    /// Returns the digit if this is a numeric key
    pub const fn as_digit(&self) -> Option<Digit> {
        match self {
            Key::Digit(d) => Some(*d),
            _ => None,
        }
    }
}

/// Result of one electrical scan; `None` means no key is down
pub type RawKey = Option<Key>;

/// A debounced, de-duplicated key press
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogicalKeyEvent(pub Key);

impl LogicalKeyEvent {
    pub const fn key(&self) -> Key {
        self.0
    }
}

/// Which physical digit of the display
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitIndex {
    Units,
    Tens,
}

impl DigitIndex {
    pub const fn other(&self) -> DigitIndex {
        match self {
            DigitIndex::Units => DigitIndex::Tens,
            DigitIndex::Tens => DigitIndex::Units,
        }
    }
}

/// Function key assignments
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyBindings {
    /// Adds one, wrapping 99 to 0
    pub increment: Key,
    /// Subtracts one, wrapping 0 to 99
    pub decrement: Key,
    /// Resets the value to 00 when bound
    pub clear: Option<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            increment: Key::Hash,
            decrement: Key::Star,
            clear: None,
        }
    }
}

impl KeyBindings {
    /// Create bindings, rejecting digit keys and duplicates
    pub fn new(increment: Key, decrement: Key, clear: Option<Key>) -> Result<Self, &'static str> {
        if increment.as_digit().is_some() || decrement.as_digit().is_some() {
            return Err("Function keys cannot be digit keys");
        }
        if increment == decrement {
            return Err("Increment and decrement must be different keys");
        }
        if let Some(clear) = clear {
            if clear.as_digit().is_some() {
                return Err("Function keys cannot be digit keys");
            }
            if clear == increment || clear == decrement {
                return Err("Clear key must differ from increment and decrement");
            }
        }

        Ok(Self {
            increment,
            decrement,
            clear,
        })
    }
}

/// Panel configuration parameters
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelConfig {
    /// Period of the refresh timer in microseconds
    pub tick_period_us: u32,
    /// Timer ticks per digit switch
    pub refresh_threshold: u32,
    /// Contact settle delay between scan and debounce decision
    pub settle_us: u32,
    /// Function key assignments
    pub bindings: KeyBindings,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            tick_period_us: 500,
            refresh_threshold: 500, // 250 ms per digit
            settle_us: 1_000,
            bindings: KeyBindings::default(),
        }
    }
}

impl PanelConfig {
    /// Create a new configuration with validation
    ///
    /// `refresh_ms` is the time each digit stays lit and must be a whole
    /// number of timer periods.
    pub fn new(
        tick_period_us: u32,
        refresh_ms: u32,
        settle_us: u32,
        bindings: KeyBindings,
    ) -> Result<Self, &'static str> {
        if tick_period_us == 0 || tick_period_us > 10_000 {
            return Err("Tick period must be between 1us and 10ms");
        }
        if refresh_ms == 0 || refresh_ms > 1_000 {
            return Err("Refresh interval must be between 1 and 1000 ms");
        }
        if settle_us > 50_000 {
            return Err("Settle delay must be <= 50ms");
        }

        let refresh_us = refresh_ms * 1_000;
        if refresh_us % tick_period_us != 0 {
            return Err("Refresh interval must be a multiple of the tick period");
        }

        Ok(Self {
            tick_period_us,
            refresh_threshold: refresh_us / tick_period_us,
            settle_us,
            bindings,
        })
    }

    /// Time each digit stays selected, in milliseconds
    pub fn refresh_interval_ms(&self) -> u32 {
        self.tick_period_us * self.refresh_threshold / 1_000
    }
}
