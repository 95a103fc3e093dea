//! CH32V203 Hardware Implementation
//!
//! Register-level GPIO and USART1 bindings for the keypad panel board.
//!
//! Pin map:
//! - PA7..PA4: keypad rows 0..3 (push-pull outputs, idle high)
//! - PA3..PA0: keypad columns 0..3 (inputs with pull-up, pressed = low)
//! - PB0..PB7: segment lines, bit 0 (g) .. bit 7 (active low)
//! - PB8: digit select
//! - PA9: USART1 TX, 9600 baud

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use panel_core::{HalError, IoSerial, KeypadScanner, PinDisplay};

/// Peripheral base addresses
const RCC_BASE: u32 = 0x4002_1000;
const GPIOA_BASE: u32 = 0x4001_0800;
const GPIOB_BASE: u32 = 0x4001_0C00;
const USART1_BASE: u32 = 0x4001_3800;

/// RCC register offsets
const RCC_APB2PCENR: u32 = 0x18;
const RCC_APB2_IOPAEN: u32 = 1 << 2;
const RCC_APB2_IOPBEN: u32 = 1 << 3;
const RCC_APB2_USART1EN: u32 = 1 << 14;

/// GPIO register offsets
const GPIO_CFGLR: u32 = 0x00;
const GPIO_CFGHR: u32 = 0x04;
const GPIO_INDR: u32 = 0x08;
const GPIO_OUTDR: u32 = 0x0C;
const GPIO_BSHR: u32 = 0x10;

/// GPIO mode nibbles
const MODE_OUTPUT_PP_10MHZ: u32 = 0b0001;
const MODE_INPUT_PULL: u32 = 0b1000;
const MODE_AF_PP_10MHZ: u32 = 0b1001;

/// USART register offsets
const USART_STATR: u32 = 0x00;
const USART_DATAR: u32 = 0x04;
const USART_BRR: u32 = 0x08;
const USART_CTLR1: u32 = 0x0C;
const USART_STATR_TXE: u32 = 1 << 7;
const USART_STATR_TC: u32 = 1 << 6;
const USART_CTLR1_UE: u32 = 1 << 13;
const USART_CTLR1_TE: u32 = 1 << 3;

/// APB2 clock after reset (HSI)
const PCLK2_HZ: u32 = 8_000_000;
const BAUD_RATE: u32 = 9_600;

fn read_reg(addr: u32) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

fn write_reg(addr: u32, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

fn modify_reg(addr: u32, f: impl FnOnce(u32) -> u32) {
    write_reg(addr, f(read_reg(addr)));
}

/// Set the 4-bit mode/config field of one pin
fn configure_pin(port: u32, pin: u8, mode: u32) {
    let (reg, shift) = if pin < 8 {
        (port + GPIO_CFGLR, pin as u32 * 4)
    } else {
        (port + GPIO_CFGHR, (pin as u32 - 8) * 4)
    };
    modify_reg(reg, |cfg| (cfg & !(0xF << shift)) | (mode << shift));
}

/// Push-pull output pin
pub struct Ch32v203Output {
    port: u32,
    pin: u8,
}

impl Ch32v203Output {
    fn new(port: u32, pin: u8) -> Self {
        configure_pin(port, pin, MODE_OUTPUT_PP_10MHZ);
        Self { port, pin }
    }
}

impl ErrorType for Ch32v203Output {
    type Error = Infallible;
}

impl OutputPin for Ch32v203Output {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        // BSHR upper half resets
        write_reg(self.port + GPIO_BSHR, 1 << (self.pin as u32 + 16));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        write_reg(self.port + GPIO_BSHR, 1 << self.pin as u32);
        Ok(())
    }
}

impl StatefulOutputPin for Ch32v203Output {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(read_reg(self.port + GPIO_OUTDR) & (1 << self.pin as u32) != 0)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|high| !high)
    }
}

/// Input pin with internal pull-up
pub struct Ch32v203Input {
    port: u32,
    pin: u8,
}

impl Ch32v203Input {
    fn new(port: u32, pin: u8) -> Self {
        configure_pin(port, pin, MODE_INPUT_PULL);
        // OUTDR bit selects pull-up rather than pull-down
        write_reg(port + GPIO_BSHR, 1 << pin as u32);
        Self { port, pin }
    }
}

impl ErrorType for Ch32v203Input {
    type Error = Infallible;
}

impl InputPin for Ch32v203Input {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(read_reg(self.port + GPIO_INDR) & (1 << self.pin as u32) != 0)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Blocking USART1 transmitter
pub struct Usart1Tx {
    _private: (),
}

impl Usart1Tx {
    fn new() -> Self {
        configure_pin(GPIOA_BASE, 9, MODE_AF_PP_10MHZ);
        write_reg(USART1_BASE + USART_BRR, PCLK2_HZ / BAUD_RATE);
        write_reg(USART1_BASE + USART_CTLR1, USART_CTLR1_UE | USART_CTLR1_TE);
        Self { _private: () }
    }
}

impl embedded_io::ErrorType for Usart1Tx {
    type Error = Infallible;
}

impl embedded_io::Write for Usart1Tx {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let Some(&byte) = buf.first() else {
            return Ok(0);
        };
        while read_reg(USART1_BASE + USART_STATR) & USART_STATR_TXE == 0 {}
        write_reg(USART1_BASE + USART_DATAR, byte as u32);
        Ok(1)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        while read_reg(USART1_BASE + USART_STATR) & USART_STATR_TC == 0 {}
        Ok(())
    }
}

pub type BoardScanner = KeypadScanner<Ch32v203Output, Ch32v203Input>;
pub type BoardDisplay = PinDisplay<Ch32v203Output, Ch32v203Output>;
pub type BoardSerial = IoSerial<Usart1Tx>;

/// Peripherals used by the panel
pub struct Ch32v203Board {
    pub scanner: BoardScanner,
    pub display: BoardDisplay,
    pub serial: BoardSerial,
}

impl Ch32v203Board {
    /// Enable clocks and configure every pin
    ///
    /// Rows are released and the display blanked before returning.
    pub fn init() -> Result<Self, HalError> {
        modify_reg(RCC_BASE + RCC_APB2PCENR, |en| {
            en | RCC_APB2_IOPAEN | RCC_APB2_IOPBEN | RCC_APB2_USART1EN
        });

        let rows = pins::ROWS.map(|pin| Ch32v203Output::new(GPIOA_BASE, pin));
        let cols = pins::COLS.map(|pin| Ch32v203Input::new(GPIOA_BASE, pin));
        let mut scanner = KeypadScanner::new(rows, cols);
        scanner.init()?;

        let segments = core::array::from_fn(|bit| Ch32v203Output::new(GPIOB_BASE, bit as u8));
        let select = Ch32v203Output::new(GPIOB_BASE, pins::DIGIT_SELECT);
        let mut display = PinDisplay::new(select, segments);
        display.blank()?;

        #[cfg(feature = "defmt")]
        defmt::info!("CH32V203 panel hardware initialized");

        Ok(Self {
            scanner,
            display,
            serial: IoSerial::new(Usart1Tx::new()),
        })
    }
}

/// CH32V203 pin configuration constants
pub mod pins {
    /// Keypad row lines, row 0 first (PA7..PA4)
    pub const ROWS: [u8; 4] = [7, 6, 5, 4];

    /// Keypad column lines, column 0 first (PA3..PA0)
    pub const COLS: [u8; 4] = [3, 2, 1, 0];

    /// Digit select line (PB8)
    pub const DIGIT_SELECT: u8 = 8;
}
