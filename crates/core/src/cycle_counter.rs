use crate::regs::{Demcr, DwtCtrl};
use crate::wait::{BusyWait, Wait};
use crate::{DebugRegisters, Feature, PlatformError, PlatformResult, WaitStage};

/// DWT CYCCNT with a one-way enable latch.
///
/// Enabling follows ARMv7-M (DDI 0403E.b, C1.6.5 and C1.8.8): TRCENA goes on
/// before any DWT register is touched, and once on it is never cleared again,
/// since other DWT/ITM users may rely on it. The counter is 32 bits and wraps
/// silently; see [`elapsed`].
#[derive(Debug)]
pub struct CycleCounter<R, W = BusyWait> {
    regs: R,
    wait: W,
    enabled: bool,
}

impl<R: DebugRegisters, W: Wait> CycleCounter<R, W> {
    pub fn new(regs: R, wait: W) -> Self {
        Self {
            regs,
            wait,
            enabled: false,
        }
    }

    /// Turns on cycle counting. Repeated calls after a success return
    /// immediately without touching the hardware.
    pub fn enable(&mut self) -> PlatformResult<()> {
        if self.enabled {
            return Ok(());
        }

        if !self.regs.dwt_present() {
            debug!("DWT not present");
            return Err(PlatformError::FeatureUnavailable(Feature::Dwt));
        }

        // Must precede every DWT register access.
        let demcr = self.regs.demcr();
        self.regs.set_demcr(demcr | Demcr::TRCENA);

        // NOCYCCNT is only meaningful with TRCENA set.
        if self.regs.dwt_ctrl().contains(DwtCtrl::NOCYCCNT) {
            debug!("DWT present but CYCCNT not implemented");
            return Err(PlatformError::FeatureUnavailable(Feature::CycleCounter));
        }

        self.regs.set_cyccnt(0);
        // NUMCOMP (31:28) is read-only, writing back what we read is harmless.
        let ctrl = self.regs.dwt_ctrl();
        self.regs.set_dwt_ctrl(ctrl | DwtCtrl::CYCCNTENA);

        let regs = &self.regs;
        if !self
            .wait
            .until(&mut || regs.dwt_ctrl().contains(DwtCtrl::CYCCNTENA))
        {
            return Err(PlatformError::Stalled(WaitStage::CounterEnable));
        }
        if !self.wait.until(&mut || regs.cyccnt() != 0) {
            return Err(PlatformError::Stalled(WaitStage::CounterTick));
        }

        self.enabled = true;
        info!("cycle counter enabled");
        Ok(())
    }

    /// Raw CYCCNT. Wraps at 2^32 cycles; callers handle wraparound.
    pub fn read(&self) -> u32 {
        self.regs.cyccnt()
    }

    /// Writes the architectural reset value (0) to CYCCNT.
    pub fn reset(&mut self) -> PlatformResult<()> {
        if !self.enabled {
            return Err(PlatformError::FeatureUnavailable(Feature::CycleCounter));
        }
        self.regs.set_cyccnt(0);
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    pub fn wait(&self) -> &W {
        &self.wait
    }
}

/// Cycles between two [`CycleCounter::read`] values, correct across at most
/// one wrap.
pub fn elapsed(start: u32, end: u32) -> u32 {
    end.wrapping_sub(start)
}
