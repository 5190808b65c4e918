//! Register bit layouts shared by the simulated peripherals and the firmware.

use bitflags::bitflags;

/// Base address of the DWT register block.
pub const DWT_BASE: u32 = 0xE000_1000;
/// Address of the Debug Exception and Monitor Control Register.
pub const DEMCR_ADDR: u32 = 0xE000_EDFC;

bitflags! {
    /// Debug Exception and Monitor Control Register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Demcr: u32 {
        /// Global enable for DWT and ITM. Never cleared once set.
        const TRCENA = 1 << 24;
        const _ = !0;
    }
}

bitflags! {
    /// DWT Control Register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DwtCtrl: u32 {
        const CYCCNTENA = 1 << 0;
        /// Read-only: set when CYCCNT is not implemented.
        const NOCYCCNT = 1 << 25;
        const _ = !0;
    }
}

impl DwtCtrl {
    pub const NUMCOMP_SHIFT: u32 = 28;

    /// Number of comparators, bits 31:28 (read-only).
    pub fn num_comparators(self) -> u32 {
        self.bits() >> Self::NUMCOMP_SHIFT
    }
}

/// STM32F2 GPIO register offsets.
pub mod gpio {
    pub const GPIOA_BASE: u32 = 0x4002_0000;

    pub const MODER: u32 = 0x00;
    pub const OTYPER: u32 = 0x04;
    pub const OSPEEDR: u32 = 0x08;
    pub const PUPDR: u32 = 0x0C;
    pub const IDR: u32 = 0x10;
    pub const ODR: u32 = 0x14;
    pub const BSRR: u32 = 0x18;
    pub const LCKR: u32 = 0x1C;

    pub const MODE_OUTPUT: u32 = 0b01;
    pub const SPEED_HIGH: u32 = 0b10;

    /// MODER/OSPEEDR/PUPDR use two bits per pin.
    pub const fn field_mask(pin: u8) -> u32 {
        0b11 << (pin as u32 * 2)
    }

    pub const fn field(pin: u8, value: u32) -> u32 {
        (value & 0b11) << (pin as u32 * 2)
    }

    /// BSRR word that drives `pin` high.
    pub const fn bsrr_set(pin: u8) -> u32 {
        1 << pin as u32
    }

    /// BSRR word that drives `pin` low.
    pub const fn bsrr_reset(pin: u8) -> u32 {
        1 << (pin as u32 + 16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_bits_are_kept() {
        let ctrl = DwtCtrl::from_bits_retain(0x4000_0001);
        assert!(ctrl.contains(DwtCtrl::CYCCNTENA));
        assert_eq!(ctrl.num_comparators(), 4);
        assert_eq!((ctrl | DwtCtrl::CYCCNTENA).bits(), 0x4000_0001);
    }

    #[test]
    fn test_gpio_fields() {
        assert_eq!(gpio::field(12, gpio::MODE_OUTPUT), 0x0100_0000);
        assert_eq!(gpio::field_mask(12), 0x0300_0000);
        assert_eq!(gpio::bsrr_set(12), 0x0000_1000);
        assert_eq!(gpio::bsrr_reset(12), 0x1000_0000);
    }
}
