//! Embassy time driver on the CH32V203 SysTick
//!
//! SysTick is a 64-bit up-counter clocked at HCLK/8 (1 MHz at the 8 MHz reset
//! clock), matching the `tick-hz-1_000_000` embassy-time feature. One alarm
//! is provided through the compare register, which is all the generic timer
//! queue needs.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_time_driver::{AlarmHandle, Driver};
use portable_atomic::{AtomicBool, Ordering};

const SYSTICK_BASE: u32 = 0xE000_F000;
const STK_CTLR: u32 = SYSTICK_BASE;
const STK_SR: u32 = SYSTICK_BASE + 0x04;
const STK_CNTL: u32 = SYSTICK_BASE + 0x08;
const STK_CNTH: u32 = SYSTICK_BASE + 0x0C;
const STK_CMPLR: u32 = SYSTICK_BASE + 0x10;
const STK_CMPHR: u32 = SYSTICK_BASE + 0x14;

// PFIC interrupt enable, SysTick is IRQ 12
const PFIC_IENR1: u32 = 0xE000_E100;
const SYSTICK_IRQ: u32 = 12;

const CTLR_STE: u32 = 1 << 0;
const CTLR_STIE: u32 = 1 << 1;
const SR_CNTIF: u32 = 1 << 0;

fn read_reg(addr: u32) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

fn write_reg(addr: u32, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

struct AlarmState {
    timestamp: Cell<u64>,
    callback: Cell<Option<(fn(*mut ()), *mut ())>>,
}

// Only touched inside critical sections
unsafe impl Send for AlarmState {}

/// Time driver backed by the SysTick counter
pub struct SysTickDriver {
    alarm_taken: AtomicBool,
    alarm: Mutex<AlarmState>,
}

impl SysTickDriver {
    const fn new() -> Self {
        Self {
            alarm_taken: AtomicBool::new(false),
            alarm: Mutex::new(AlarmState {
                timestamp: Cell::new(u64::MAX),
                callback: Cell::new(None),
            }),
        }
    }

    /// Start the counter; call once before the executor runs
    pub fn start(&self) {
        write_reg(STK_CNTL, 0);
        write_reg(STK_CNTH, 0);
        write_reg(STK_CTLR, CTLR_STE);
    }

    /// SysTick compare interrupt
    pub fn on_interrupt(&self) {
        write_reg(STK_SR, 0);
        write_reg(STK_CTLR, read_reg(STK_CTLR) & !CTLR_STIE);

        let callback = critical_section::with(|cs| {
            let alarm = self.alarm.borrow(cs);
            if alarm.timestamp.get() <= self.now() {
                alarm.timestamp.set(u64::MAX);
                alarm.callback.get()
            } else {
                // Woke early; re-arm for the stored deadline
                self.arm(alarm.timestamp.get());
                None
            }
        });

        if let Some((callback, ctx)) = callback {
            callback(ctx);
        }
    }

    fn arm(&self, timestamp: u64) {
        write_reg(STK_CMPLR, timestamp as u32);
        write_reg(STK_CMPHR, (timestamp >> 32) as u32);
        write_reg(STK_SR, read_reg(STK_SR) & !SR_CNTIF);
        write_reg(STK_CTLR, read_reg(STK_CTLR) | CTLR_STIE);
    }
}

impl Driver for SysTickDriver {
    fn now(&self) -> u64 {
        // Re-read the high word in case the low word wrapped in between
        loop {
            let high = read_reg(STK_CNTH);
            let low = read_reg(STK_CNTL);
            if read_reg(STK_CNTH) == high {
                return ((high as u64) << 32) | low as u64;
            }
        }
    }

    unsafe fn allocate_alarm(&self) -> Option<AlarmHandle> {
        if self.alarm_taken.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(AlarmHandle::new(0))
        }
    }

    fn set_alarm_callback(&self, _alarm: AlarmHandle, callback: fn(*mut ()), ctx: *mut ()) {
        critical_section::with(|cs| {
            self.alarm.borrow(cs).callback.set(Some((callback, ctx)));
        });
    }

    fn set_alarm(&self, _alarm: AlarmHandle, timestamp: u64) -> bool {
        critical_section::with(|cs| {
            let alarm = self.alarm.borrow(cs);
            if timestamp <= self.now() {
                alarm.timestamp.set(u64::MAX);
                return false;
            }
            alarm.timestamp.set(timestamp);
            self.arm(timestamp);
            true
        })
    }
}

embassy_time_driver::time_driver_impl!(static DRIVER: SysTickDriver = SysTickDriver::new());

/// Start the time base and unmask its interrupt
pub fn init() {
    DRIVER.start();
    write_reg(PFIC_IENR1, 1 << SYSTICK_IRQ);
    unsafe { riscv::interrupt::enable() };
}

#[no_mangle]
extern "C" fn SysTick() {
    DRIVER.on_interrupt();
}

// Critical section implementation for single-core RISC-V
critical_section::set_impl!(RiscvCriticalSection);

struct RiscvCriticalSection;

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let mut mstatus: usize;
        core::arch::asm!("csrrci {}, mstatus, 8", out(reg) mstatus);
        (mstatus & 8) as u8
    }

    unsafe fn release(was_active: critical_section::RawRestoreState) {
        if was_active != 0 {
            core::arch::asm!("csrsi mstatus, 8");
        }
    }
}
