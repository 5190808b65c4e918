#[cfg(test)]
mod tests {
    use crate::peripherals::{SimBringup, SimDebugUnit, SimTriggerPin};
    use crate::regs::{Demcr, DwtCtrl};
    use crate::{
        Bringup, BoundedWait, DebugRegisters, PlatformAttr, PlatformController, PlatformError,
        TriggerLevel, TriggerPin, XorShift32,
    };
    use std::cell::RefCell;
    use std::num::NonZeroU32;
    use std::rc::Rc;

    type SimPlatform = PlatformController<SimDebugUnit, SimTriggerPin, BoundedWait>;

    const SEED: u32 = 0xC0FF_EE11;

    fn seed() -> NonZeroU32 {
        NonZeroU32::new(SEED).unwrap()
    }

    fn platform(unit: SimDebugUnit) -> (SimPlatform, SimBringup) {
        let mut bringup = SimBringup::new(seed());
        let platform = PlatformController::init(
            &mut bringup,
            unit,
            SimTriggerPin::new(12),
            BoundedWait::new(1_000),
        );
        (platform, bringup)
    }

    #[test]
    fn test_init_brings_everything_up() {
        let (platform, bringup) = platform(SimDebugUnit::new());
        assert_eq!(bringup.hal_init_calls(), 1);
        assert!(bringup.transport_ready());
        assert_eq!(bringup.seeds_drawn(), 1);

        assert!(platform.cycle_counter().is_enabled());
        assert_eq!(platform.trigger().level(), TriggerLevel::Low);
        assert!(platform.trigger().pin().port().is_output(12));
        assert_eq!(platform.rng().state(), SEED);
    }

    #[test]
    fn test_init_survives_missing_cycle_counter() {
        let (platform, bringup) = platform(SimDebugUnit::new().with_cyccnt(false));
        assert!(!platform.cycle_counter().is_enabled());
        assert!(bringup.transport_ready());
        assert_eq!(platform.trigger().level(), TriggerLevel::Low);
        assert_eq!(platform.rng().state(), SEED);
        // TRCENA stays on even though CYCCNT is missing.
        assert!(platform
            .cycle_counter()
            .registers()
            .demcr()
            .contains(Demcr::TRCENA));
    }

    #[test]
    fn test_init_survives_missing_dwt() {
        let (mut platform, _) = platform(SimDebugUnit::new().with_dwt(false));
        assert!(!platform.cycle_counter().is_enabled());
        assert_eq!(platform.cycle_count(), 0);
        assert_eq!(
            platform.cycle_counter_mut().enable(),
            Err(PlatformError::FeatureUnavailable(crate::Feature::Dwt))
        );
    }

    #[test]
    fn test_cycle_count_is_widened_not_extended() {
        let (mut platform, _) = platform(SimDebugUnit::new().with_cycles_per_access(16));
        platform
            .cycle_counter_mut()
            .registers_mut()
            .set_cyccnt(u32::MAX - 7);
        let before = platform.cycle_count();
        let after = platform.cycle_count();
        assert_eq!(before, u64::from(u32::MAX - 7));
        assert!(before >> 32 == 0 && after >> 32 == 0);
        // Wrapped: the caller sees the raw drop.
        assert_eq!(after, 8);
    }

    #[test]
    fn test_cycle_count_monotonic_in_window() {
        let (platform, _) = platform(SimDebugUnit::new());
        let a = platform.cycle_count();
        let b = platform.cycle_count();
        assert!(b >= a);
    }

    #[test]
    fn test_set_attributes_short_circuits() {
        let (mut platform, _) = platform(SimDebugUnit::new());
        assert_eq!(
            platform.set_attributes(&[PlatformAttr::ClockUserspace, PlatformAttr::ClockMax]),
            Err(PlatformError::DispatchMiss)
        );
        assert_eq!(platform.trigger().level(), TriggerLevel::Low);

        assert_eq!(
            platform.set_attributes(&[
                PlatformAttr::ClockMax,
                PlatformAttr::TriggerHigh,
                PlatformAttr::TriggerLow,
            ]),
            Ok(TriggerLevel::High)
        );
        assert_eq!(platform.trigger().level(), TriggerLevel::High);
        assert!(platform.trigger().pin().is_high());

        assert_eq!(
            platform.set_attributes_raw(&[42, 3]),
            Ok(TriggerLevel::Low)
        );
        assert!(!platform.trigger().pin().is_high());
    }

    #[test]
    fn test_fill_random_matches_generator() {
        let (mut platform, _) = platform(SimDebugUnit::new());
        let mut buf = [0u8; 11];
        platform.fill_random(&mut buf);

        let mut reference = XorShift32::new(seed());
        let mut expected = [0u8; 11];
        reference.fill(&mut expected);

        assert_eq!(buf, expected);
        assert_eq!(platform.rng().state(), reference.state());

        let mut empty: [u8; 0] = [];
        platform.fill_random(&mut empty);
        assert_eq!(platform.rng().state(), reference.state());
    }

    #[test]
    fn test_snapshot() {
        let (mut platform, _) = platform(SimDebugUnit::new());
        platform.set_attributes(&[PlatformAttr::TriggerHigh]).unwrap();
        let mut buf = [0u8; 4];
        platform.fill_random(&mut buf);
        platform.sync();

        let snap = platform.snapshot();
        assert!(snap.cycle_counter_enabled);
        assert_eq!(snap.trigger_level, TriggerLevel::High);
        assert_eq!(snap.rng_state, crate::rng::step(SEED));
    }

    #[derive(Clone, Default)]
    struct Journal(Rc<RefCell<Vec<&'static str>>>);

    impl Journal {
        fn push(&self, event: &'static str) {
            self.0.borrow_mut().push(event);
        }
    }

    struct RecordingBringup(Journal);

    impl Bringup for RecordingBringup {
        fn hal_init(&mut self) {
            self.0.push("hal_init");
        }

        fn init_transport(&mut self) {
            self.0.push("transport");
        }

        fn seed(&mut self) -> NonZeroU32 {
            self.0.push("seed");
            NonZeroU32::new(1).unwrap()
        }
    }

    struct RecordingDebug(Journal, SimDebugUnit);

    impl DebugRegisters for RecordingDebug {
        fn dwt_present(&self) -> bool {
            self.0.push("dwt_present");
            self.1.dwt_present()
        }
        fn demcr(&self) -> Demcr {
            self.1.demcr()
        }
        fn set_demcr(&mut self, value: Demcr) {
            self.0.push("trcena");
            self.1.set_demcr(value)
        }
        fn dwt_ctrl(&self) -> DwtCtrl {
            self.1.dwt_ctrl()
        }
        fn set_dwt_ctrl(&mut self, value: DwtCtrl) {
            self.0.push("cyccntena");
            self.1.set_dwt_ctrl(value)
        }
        fn cyccnt(&self) -> u32 {
            self.1.cyccnt()
        }
        fn set_cyccnt(&mut self, value: u32) {
            self.0.push("cyccnt_reset");
            self.1.set_cyccnt(value)
        }
    }

    struct RecordingPin(Journal);

    impl TriggerPin for RecordingPin {
        fn configure_output(&mut self) {
            self.0.push("trigger_config");
        }
        fn set_high(&mut self) {
            self.0.push("trigger_high");
        }
        fn set_low(&mut self) {
            self.0.push("trigger_low");
        }
    }

    #[test]
    fn test_init_ordering() {
        let journal = Journal::default();
        let mut bringup = RecordingBringup(journal.clone());
        let _platform = PlatformController::init(
            &mut bringup,
            RecordingDebug(journal.clone(), SimDebugUnit::new()),
            RecordingPin(journal.clone()),
            BoundedWait::new(100),
        );

        let events = journal.0.borrow().clone();
        assert_eq!(
            events,
            vec![
                "hal_init",
                "dwt_present",
                "trcena",
                "cyccnt_reset",
                "cyccntena",
                "trigger_config",
                "trigger_low",
                "transport",
                "seed",
            ]
        );
    }
}
