use crate::regs::{Demcr, DwtCtrl};
use crate::DebugRegisters;
use core::cell::Cell;

/// Simulated DCB/DWT pair.
///
/// DWT registers are gated by DEMCR.TRCENA: with trace disabled, reads
/// return zero and writes are dropped, the same as an unclocked DWT.
/// CYCCNT advances by `cycles_per_access` after every read once the counter
/// runs, which keeps back-to-back reads monotonic.
#[derive(Debug)]
pub struct SimDebugUnit {
    dwt_present: bool,
    cyccnt_present: bool,
    num_comparators: u32,
    demcr: u32,
    ctrl: u32,
    cyccnt: Cell<u32>,
    cycles_per_access: u32,
    // Reads of CTRL left before a CYCCNTENA write becomes visible.
    enable_latency: u32,
    pending_latency: Cell<u32>,
    // Reads of CYCCNT left before the counter starts ticking.
    start_delay: u32,
    pending_start: Cell<u32>,
    accesses: Cell<u32>,
}

impl Default for SimDebugUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDebugUnit {
    pub fn new() -> Self {
        Self {
            dwt_present: true,
            cyccnt_present: true,
            num_comparators: 4,
            demcr: 0,
            ctrl: 0,
            cyccnt: Cell::new(0),
            cycles_per_access: 1,
            enable_latency: 0,
            pending_latency: Cell::new(0),
            start_delay: 0,
            pending_start: Cell::new(0),
            accesses: Cell::new(0),
        }
    }

    pub fn with_dwt(mut self, present: bool) -> Self {
        self.dwt_present = present;
        self
    }

    pub fn with_cyccnt(mut self, present: bool) -> Self {
        self.cyccnt_present = present;
        self
    }

    pub fn with_cycles_per_access(mut self, cycles: u32) -> Self {
        self.cycles_per_access = cycles;
        self
    }

    pub fn with_enable_latency(mut self, reads: u32) -> Self {
        self.enable_latency = reads;
        self
    }

    pub fn with_start_delay(mut self, reads: u32) -> Self {
        self.start_delay = reads;
        self
    }

    /// Number of register reads and writes made through [`DebugRegisters`].
    pub fn register_accesses(&self) -> u32 {
        self.accesses.get()
    }

    fn touch(&self) {
        self.accesses.set(self.accesses.get().wrapping_add(1));
    }

    fn dwt_clocked(&self) -> bool {
        self.dwt_present && self.demcr & Demcr::TRCENA.bits() != 0
    }

    fn counter_running(&self) -> bool {
        self.dwt_clocked() && self.ctrl & DwtCtrl::CYCCNTENA.bits() != 0
    }

    fn read_only_ctrl_bits(&self) -> u32 {
        let nocyccnt = if self.cyccnt_present {
            0
        } else {
            DwtCtrl::NOCYCCNT.bits()
        };
        (self.num_comparators << DwtCtrl::NUMCOMP_SHIFT) | nocyccnt
    }
}

impl DebugRegisters for SimDebugUnit {
    fn dwt_present(&self) -> bool {
        self.touch();
        self.dwt_present
    }

    fn demcr(&self) -> Demcr {
        self.touch();
        Demcr::from_bits_retain(self.demcr)
    }

    fn set_demcr(&mut self, value: Demcr) {
        self.touch();
        self.demcr = value.bits();
        debug!("DEMCR <- {:#010x}", self.demcr);
    }

    fn dwt_ctrl(&self) -> DwtCtrl {
        self.touch();
        if !self.dwt_clocked() {
            return DwtCtrl::empty();
        }
        let mut ctrl = self.ctrl;
        let pending = self.pending_latency.get();
        if pending > 0 {
            self.pending_latency.set(pending - 1);
            ctrl &= !DwtCtrl::CYCCNTENA.bits();
        }
        DwtCtrl::from_bits_retain(ctrl | self.read_only_ctrl_bits())
    }

    fn set_dwt_ctrl(&mut self, value: DwtCtrl) {
        self.touch();
        if !self.dwt_clocked() {
            return;
        }
        let mut writable = value.bits() & DwtCtrl::CYCCNTENA.bits();
        if !self.cyccnt_present {
            writable = 0;
        }
        let starting = writable != 0 && self.ctrl & DwtCtrl::CYCCNTENA.bits() == 0;
        self.ctrl = writable;
        if starting {
            self.pending_latency.set(self.enable_latency);
            self.pending_start.set(self.start_delay);
        }
        debug!("DWT_CTRL <- {:#010x}", value.bits());
    }

    fn cyccnt(&self) -> u32 {
        self.touch();
        if !self.dwt_clocked() {
            return 0;
        }
        let value = self.cyccnt.get();
        if self.counter_running() {
            let pending = self.pending_start.get();
            if pending > 0 {
                self.pending_start.set(pending - 1);
            } else {
                self.cyccnt
                    .set(value.wrapping_add(self.cycles_per_access));
            }
        }
        value
    }

    fn set_cyccnt(&mut self, value: u32) {
        self.touch();
        if self.dwt_clocked() {
            self.cyccnt.set(value);
        }
    }
}
