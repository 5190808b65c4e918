#![no_main]
#![no_std]

mod board;

use core::sync::atomic::{AtomicU32, Ordering};
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m_rt::{entry, exception};
use panic_halt as _;
use scaplat_core::cycle_counter::elapsed;
use scaplat_core::{BusyWait, PlatformAttr, PlatformController};

use board::{CortexMDebug, GpioaTrigger, Stm32f2Bringup};

// Reset HSI on the STM32F2.
const SYSCLK_HZ: u32 = 16_000_000;
const TRIGGER_PIN: u8 = 12;

/// Milliseconds since init, wraps after ~49.7 days. Read it from a debugger.
static MILLIS: AtomicU32 = AtomicU32::new(0);
/// Cycles spent in the last measured window.
static LAST_WINDOW: AtomicU32 = AtomicU32::new(0);

#[exception]
fn SysTick() {
    MILLIS.fetch_add(1, Ordering::Relaxed);
}

#[entry]
fn main() -> ! {
    let mut cp = cortex_m::Peripherals::take().unwrap();

    cp.SYST.set_clock_source(SystClkSource::Core);
    cp.SYST.set_reload(SYSCLK_HZ / 1_000 - 1);
    cp.SYST.clear_current();
    cp.SYST.enable_interrupt();
    cp.SYST.enable_counter();

    let mut platform = PlatformController::init(
        &mut Stm32f2Bringup,
        CortexMDebug::new(cp.DCB, cp.DWT),
        GpioaTrigger::new(TRIGGER_PIN),
        BusyWait,
    );

    let mut block = [0u8; 16];
    loop {
        platform.fill_random(&mut block);

        let _ = platform.set_attributes(&[PlatformAttr::TriggerHigh]);
        let start = platform.cycle_count() as u32;
        let mut acc = 0u8;
        for b in block.iter() {
            acc = acc.rotate_left(3) ^ *b;
        }
        core::hint::black_box(acc);
        let end = platform.cycle_count() as u32;
        let _ = platform.set_attributes(&[PlatformAttr::TriggerLow]);

        LAST_WINDOW.store(elapsed(start, end), Ordering::Relaxed);
        platform.sync();
    }
}
