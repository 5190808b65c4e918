use crate::Bringup;
use core::num::NonZeroU32;

/// Bring-up stand-in: hands out a fixed seed and records what was called.
#[derive(Debug, Clone)]
pub struct SimBringup {
    seed: NonZeroU32,
    hal_init_calls: u32,
    transport_ready: bool,
    seeds_drawn: u32,
}

impl SimBringup {
    pub fn new(seed: NonZeroU32) -> Self {
        Self {
            seed,
            hal_init_calls: 0,
            transport_ready: false,
            seeds_drawn: 0,
        }
    }

    pub fn hal_init_calls(&self) -> u32 {
        self.hal_init_calls
    }

    pub fn transport_ready(&self) -> bool {
        self.transport_ready
    }

    pub fn seeds_drawn(&self) -> u32 {
        self.seeds_drawn
    }
}

impl Bringup for SimBringup {
    fn hal_init(&mut self) {
        self.hal_init_calls += 1;
        debug!("clock tree configured");
    }

    fn init_transport(&mut self) {
        self.transport_ready = true;
    }

    fn seed(&mut self) -> NonZeroU32 {
        self.seeds_drawn += 1;
        self.seed
    }
}
