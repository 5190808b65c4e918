use crate::regs::gpio::{self, BSRR, IDR, LCKR, MODER, ODR, OSPEEDR, OTYPER, PUPDR};
use crate::TriggerPin;

/// STM32F2-compatible GPIO port
#[derive(Debug, Default)]
pub struct GpioPort {
    moder: u32,   // 0x00: mode register
    otyper: u32,  // 0x04: output type register
    ospeedr: u32, // 0x08: output speed register
    pupdr: u32,   // 0x0C: pull-up/pull-down register
    odr: u32,     // 0x14: output data register
    lckr: u32,    // 0x1C: configuration lock register
}

impl GpioPort {
    pub fn new() -> Self {
        // Reset values for ports other than A/B: all pins input, no pull.
        Self::default()
    }

    pub fn read_reg(&self, offset: u32) -> u32 {
        match offset {
            MODER => self.moder,
            OTYPER => self.otyper,
            OSPEEDR => self.ospeedr,
            PUPDR => self.pupdr,
            // Outputs read back on IDR; nothing external drives the pins.
            IDR => self.odr,
            ODR => self.odr,
            LCKR => self.lckr,
            _ => 0,
        }
    }

    pub fn write_reg(&mut self, offset: u32, value: u32) {
        match offset {
            MODER => self.moder = value,
            OTYPER => self.otyper = value & 0xFFFF,
            OSPEEDR => self.ospeedr = value,
            PUPDR => self.pupdr = value,
            ODR => self.odr = value & 0xFFFF,
            BSRR => {
                // Set wins when both halves name the same pin.
                let set = value & 0xFFFF;
                let reset = (value >> 16) & 0xFFFF;
                self.odr &= !reset;
                self.odr |= set;
            }
            LCKR => self.lckr = value,
            _ => {}
        }
    }

    fn modify(&mut self, offset: u32, mask: u32, bits: u32) {
        let value = (self.read_reg(offset) & !mask) | bits;
        self.write_reg(offset, value);
    }

    pub fn is_output(&self, pin: u8) -> bool {
        self.moder & gpio::field_mask(pin) == gpio::field(pin, gpio::MODE_OUTPUT)
    }

    pub fn pin_is_high(&self, pin: u8) -> bool {
        self.odr & (1 << pin as u32) != 0
    }
}

/// One pin of a simulated [`GpioPort`], driven the way the firmware drives
/// the real one: configuration through MODER/OTYPER/OSPEEDR/PUPDR and
/// levels through BSRR. Edges are counted for the tests and the CLI report.
#[derive(Debug)]
pub struct SimTriggerPin {
    port: GpioPort,
    pin: u8,
    rising_edges: u32,
    falling_edges: u32,
}

impl SimTriggerPin {
    pub fn new(pin: u8) -> Self {
        Self {
            port: GpioPort::new(),
            pin: pin & 0xF,
            rising_edges: 0,
            falling_edges: 0,
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn port(&self) -> &GpioPort {
        &self.port
    }

    pub fn is_high(&self) -> bool {
        self.port.pin_is_high(self.pin)
    }

    pub fn rising_edges(&self) -> u32 {
        self.rising_edges
    }

    pub fn falling_edges(&self) -> u32 {
        self.falling_edges
    }

    fn drive(&mut self, bsrr: u32) {
        let was_high = self.is_high();
        self.port.write_reg(BSRR, bsrr);
        match (was_high, self.is_high()) {
            (false, true) => self.rising_edges += 1,
            (true, false) => self.falling_edges += 1,
            _ => {}
        }
    }
}

impl TriggerPin for SimTriggerPin {
    fn configure_output(&mut self) {
        let pin = self.pin;
        self.port.modify(
            MODER,
            gpio::field_mask(pin),
            gpio::field(pin, gpio::MODE_OUTPUT),
        );
        // Push-pull, high speed, no pull.
        self.port.modify(OTYPER, 1 << pin as u32, 0);
        self.port.modify(
            OSPEEDR,
            gpio::field_mask(pin),
            gpio::field(pin, gpio::SPEED_HIGH),
        );
        self.port.modify(PUPDR, gpio::field_mask(pin), 0);
    }

    fn set_high(&mut self) {
        self.drive(gpio::bsrr_set(self.pin));
    }

    fn set_low(&mut self) {
        self.drive(gpio::bsrr_reset(self.pin));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bsrr_set_and_reset() {
        let mut port = GpioPort::new();
        port.write_reg(BSRR, 1 << 12);
        assert_eq!(port.read_reg(ODR), 1 << 12);
        port.write_reg(BSRR, 1 << (12 + 16));
        assert_eq!(port.read_reg(ODR), 0);
        // Both halves for the same pin: set takes priority.
        port.write_reg(BSRR, (1 << 3) | (1 << (3 + 16)));
        assert!(port.pin_is_high(3));
    }

    #[test]
    fn test_configure_output_leaves_other_pins() {
        let mut pin = SimTriggerPin::new(12);
        pin.port.write_reg(MODER, 0xA800_0000);
        pin.configure_output();
        assert!(pin.port().is_output(12));
        assert_eq!(pin.port().read_reg(MODER) & 0xFC00_0000, 0xA800_0000);
        assert_eq!(
            pin.port().read_reg(OSPEEDR) & gpio::field_mask(12),
            gpio::field(12, gpio::SPEED_HIGH)
        );
    }

    #[test]
    fn test_edges_are_counted() {
        let mut pin = SimTriggerPin::new(12);
        pin.configure_output();
        pin.set_low();
        pin.set_high();
        pin.set_high();
        pin.set_low();
        assert_eq!(pin.rising_edges(), 1);
        assert_eq!(pin.falling_edges(), 1);
        assert!(!pin.is_high());
    }
}
