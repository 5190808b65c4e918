use crate::TriggerPin;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerLevel {
    Low,
    High,
}

/// The scope trigger (ChipWhisperer-compatible). Every call goes straight to
/// the pin; nothing is queued.
#[derive(Debug)]
pub struct TriggerLine<P> {
    pin: P,
    level: TriggerLevel,
}

impl<P: TriggerPin> TriggerLine<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            level: TriggerLevel::Low,
        }
    }

    /// Configures the pin as a push-pull output and drives it low.
    pub fn init(&mut self) {
        self.pin.configure_output();
        self.assert_low();
    }

    pub fn assert_high(&mut self) {
        self.pin.set_high();
        self.level = TriggerLevel::High;
    }

    pub fn assert_low(&mut self) {
        self.pin.set_low();
        self.level = TriggerLevel::Low;
    }

    /// Runs `f` inside a high pulse.
    pub fn pulse<T>(&mut self, f: impl FnOnce() -> T) -> T {
        self.assert_high();
        let out = f();
        self.assert_low();
        out
    }

    pub fn level(&self) -> TriggerLevel {
        self.level
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripherals::SimTriggerPin;

    #[test]
    fn test_init_drives_low() {
        let mut line = TriggerLine::new(SimTriggerPin::new(12));
        line.init();
        assert_eq!(line.level(), TriggerLevel::Low);
        assert!(line.pin().port().is_output(12));
        assert!(!line.pin().is_high());
    }

    #[test]
    fn test_assert_drives_pin() {
        let mut line = TriggerLine::new(SimTriggerPin::new(12));
        line.init();
        line.assert_high();
        assert_eq!(line.level(), TriggerLevel::High);
        assert!(line.pin().is_high());
        line.assert_low();
        assert_eq!(line.level(), TriggerLevel::Low);
        assert!(!line.pin().is_high());
    }

    #[test]
    fn test_pulse_brackets_work() {
        let mut line = TriggerLine::new(SimTriggerPin::new(12));
        line.init();
        let out = line.pulse(|| 7 * 6);
        assert_eq!(out, 42);
        assert_eq!(line.pin().rising_edges(), 1);
        assert_eq!(line.pin().falling_edges(), 1);
        assert_eq!(line.level(), TriggerLevel::Low);
    }
}
