//! STM32F2 (CW308 target) implementations of the core's hardware traits.

use core::num::NonZeroU32;
use core::ptr::{read_volatile, write_volatile};
use cortex_m::peripheral::{DCB, DWT};
use scaplat_core::regs::{gpio, Demcr, DwtCtrl, DWT_BASE};
use scaplat_core::{Bringup, DebugRegisters, TriggerPin};

// CoreSight ROM table entry for the DWT (ARMv7-M Table C1-2). Bit 0 is
// "entry present".
const ROMTABLE_DWT: *const u32 = 0xE00F_F004 as *const u32;

const RCC_AHB1ENR: *mut u32 = 0x4002_3830 as *mut u32;
const RCC_AHB1ENR_GPIOAEN: u32 = 1 << 0;

const CYCCNT: *const u32 = (DWT_BASE + 0x04) as *const u32;

// Used when the cycle counter is off or happens to read a value that mixes
// to zero.
const FALLBACK_SEED: u32 = 0x2545_F491;

pub struct CortexMDebug {
    dcb: DCB,
    dwt: DWT,
}

impl CortexMDebug {
    pub fn new(dcb: DCB, dwt: DWT) -> Self {
        Self { dcb, dwt }
    }
}

impl DebugRegisters for CortexMDebug {
    fn dwt_present(&self) -> bool {
        unsafe { read_volatile(ROMTABLE_DWT) & 1 != 0 }
    }

    fn demcr(&self) -> Demcr {
        Demcr::from_bits_retain(self.dcb.demcr.read())
    }

    fn set_demcr(&mut self, value: Demcr) {
        unsafe { self.dcb.demcr.write(value.bits()) }
    }

    fn dwt_ctrl(&self) -> DwtCtrl {
        DwtCtrl::from_bits_retain(self.dwt.ctrl.read())
    }

    fn set_dwt_ctrl(&mut self, value: DwtCtrl) {
        unsafe { self.dwt.ctrl.write(value.bits()) }
    }

    fn cyccnt(&self) -> u32 {
        self.dwt.cyccnt.read()
    }

    fn set_cyccnt(&mut self, value: u32) {
        unsafe { self.dwt.cyccnt.write(value) }
    }
}

/// Trigger on a GPIOA pin, ChipWhisperer wiring uses PA12.
pub struct GpioaTrigger {
    pin: u8,
}

impl GpioaTrigger {
    pub fn new(pin: u8) -> Self {
        Self { pin: pin & 0xF }
    }

    fn reg(offset: u32) -> *mut u32 {
        (gpio::GPIOA_BASE + offset) as *mut u32
    }

    fn modify(offset: u32, mask: u32, bits: u32) {
        unsafe {
            let value = read_volatile(Self::reg(offset));
            write_volatile(Self::reg(offset), (value & !mask) | bits);
        }
    }
}

impl TriggerPin for GpioaTrigger {
    fn configure_output(&mut self) {
        let pin = self.pin;
        Self::modify(
            gpio::MODER,
            gpio::field_mask(pin),
            gpio::field(pin, gpio::MODE_OUTPUT),
        );
        Self::modify(gpio::OTYPER, 1 << pin as u32, 0);
        Self::modify(
            gpio::OSPEEDR,
            gpio::field_mask(pin),
            gpio::field(pin, gpio::SPEED_HIGH),
        );
        Self::modify(gpio::PUPDR, gpio::field_mask(pin), 0);
    }

    fn set_high(&mut self) {
        unsafe { write_volatile(Self::reg(gpio::BSRR), gpio::bsrr_set(self.pin)) }
    }

    fn set_low(&mut self) {
        unsafe { write_volatile(Self::reg(gpio::BSRR), gpio::bsrr_reset(self.pin)) }
    }
}

/// Clock and seed bring-up. The core runs from the reset HSI clock; the
/// serial console is not part of this image.
pub struct Stm32f2Bringup;

impl Bringup for Stm32f2Bringup {
    fn hal_init(&mut self) {
        unsafe {
            let value = read_volatile(RCC_AHB1ENR);
            write_volatile(RCC_AHB1ENR, value | RCC_AHB1ENR_GPIOAEN);
        }
        // Let the enable propagate before GPIOA is touched.
        cortex_m::asm::dsb();
    }

    fn seed(&mut self) -> NonZeroU32 {
        let cycles = unsafe { read_volatile(CYCCNT) };
        NonZeroU32::new(cycles ^ FALLBACK_SEED)
            .or(NonZeroU32::new(FALLBACK_SEED))
            .unwrap_or(NonZeroU32::MIN)
    }
}
