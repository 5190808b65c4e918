/// Spin primitive used for the write-then-verify polls on debug registers.
pub trait Wait {
    /// Poll `ready` until it returns `true`. Returns `false` only if the
    /// implementation gave up first.
    fn until(&mut self, ready: &mut dyn FnMut() -> bool) -> bool;
}

/// Spins without a timeout. On supported hardware the polled conditions
/// settle within a few cycles; a core that never sets them hangs here.
#[derive(Debug, Default, Clone, Copy)]
pub struct BusyWait;

impl Wait for BusyWait {
    fn until(&mut self, ready: &mut dyn FnMut() -> bool) -> bool {
        while !ready() {
            core::hint::spin_loop();
        }
        true
    }
}

/// Gives up after `budget` polls. Used by the simulator and the tests, where
/// a misconfigured model must not hang the host.
#[derive(Debug, Clone, Copy)]
pub struct BoundedWait {
    budget: u32,
    last_polls: u32,
}

impl BoundedWait {
    pub fn new(budget: u32) -> Self {
        Self {
            budget,
            last_polls: 0,
        }
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Number of polls the most recent `until` call made.
    pub fn last_polls(&self) -> u32 {
        self.last_polls
    }
}

impl Wait for BoundedWait {
    fn until(&mut self, ready: &mut dyn FnMut() -> bool) -> bool {
        self.last_polls = 0;
        while self.last_polls < self.budget {
            self.last_polls += 1;
            if ready() {
                return true;
            }
        }
        debug!("wait abandoned after {} polls", self.last_polls);
        false
    }
}
