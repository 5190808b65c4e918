use crate::attributes::{self, PlatformAttr};
use crate::cycle_counter::CycleCounter;
use crate::rng::XorShift32;
use crate::snapshot::PlatformSnapshot;
use crate::trigger::{TriggerLevel, TriggerLine};
use crate::wait::{BusyWait, Wait};
use crate::{Bringup, DebugRegisters, PlatformResult, TriggerPin};

/// Owns every piece of platform state. There is one per target and it is
/// driven from a single thread; nothing here is reentrant.
#[derive(Debug)]
pub struct PlatformController<R, P, W = BusyWait> {
    cycles: CycleCounter<R, W>,
    trigger: TriggerLine<P>,
    rng: XorShift32,
}

impl<R, P, W> PlatformController<R, P, W>
where
    R: DebugRegisters,
    P: TriggerPin,
    W: Wait,
{
    /// Brings the platform up in order: clocks, cycle counter, trigger,
    /// transport, generator seed.
    ///
    /// A missing cycle counter only costs timing and does not fail init.
    pub fn init<B: Bringup>(bringup: &mut B, regs: R, pin: P, wait: W) -> Self {
        bringup.hal_init();

        let mut cycles = CycleCounter::new(regs, wait);
        if let Err(e) = cycles.enable() {
            warn!("cycle counting unavailable: {}", e);
        }

        let mut trigger = TriggerLine::new(pin);
        trigger.init();

        bringup.init_transport();

        let rng = XorShift32::new(bringup.seed());
        info!(
            "platform ready (cycle counter {})",
            if cycles.is_enabled() { "on" } else { "off" }
        );

        Self {
            cycles,
            trigger,
            rng,
        }
    }

    /// CYCCNT widened to 64 bits. Only the low 32 bits carry information and
    /// they wrap.
    pub fn cycle_count(&self) -> u64 {
        u64::from(self.cycles.read())
    }

    pub fn set_attributes(&mut self, requests: &[PlatformAttr]) -> PlatformResult<TriggerLevel> {
        attributes::dispatch(&mut self.trigger, requests)
    }

    pub fn set_attributes_raw(&mut self, requests: &[u32]) -> PlatformResult<TriggerLevel> {
        attributes::dispatch_raw(&mut self.trigger, requests)
    }

    /// Fills `buf` from the byte stream. Cannot fail.
    pub fn fill_random(&mut self, buf: &mut [u8]) {
        self.rng.fill(buf);
    }

    /// No-op on this platform.
    pub fn sync(&self) {}

    pub fn snapshot(&self) -> PlatformSnapshot {
        PlatformSnapshot {
            cycle_counter_enabled: self.cycles.is_enabled(),
            cycle_count: self.cycles.read(),
            trigger_level: self.trigger.level(),
            rng_state: self.rng.state(),
        }
    }

    pub fn cycle_counter(&self) -> &CycleCounter<R, W> {
        &self.cycles
    }

    pub fn cycle_counter_mut(&mut self) -> &mut CycleCounter<R, W> {
        &mut self.cycles
    }

    pub fn trigger(&self) -> &TriggerLine<P> {
        &self.trigger
    }

    pub fn trigger_mut(&mut self) -> &mut TriggerLine<P> {
        &mut self.trigger
    }

    pub fn rng(&self) -> &XorShift32 {
        &self.rng
    }
}
