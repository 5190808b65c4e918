#![cfg_attr(not(feature = "std"), no_std)]

//! Platform-control layer for side-channel measurement targets.
//!
//! The crate owns three primitives the firmware under test relies on: the DWT
//! cycle counter, the trigger pin the scope synchronizes on, and a fast
//! xorshift byte stream for input randomization. Hardware is reached only
//! through the traits below, so the same code drives a real Cortex-M and the
//! simulated peripherals in [`peripherals`].

// tracing needs liballoc without std, so events compile away on the target.
macro_rules! event {
    ($level:ident, $($arg:tt)*) => {{
        #[cfg(feature = "std")]
        tracing::$level!($($arg)*);
        #[cfg(not(feature = "std"))]
        let _ = core::format_args!($($arg)*);
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => { event!(debug, $($arg)*) };
}

macro_rules! info {
    ($($arg:tt)*) => { event!(info, $($arg)*) };
}

macro_rules! warn {
    ($($arg:tt)*) => { event!(warn, $($arg)*) };
}

pub mod attributes;
pub mod cycle_counter;
pub mod peripherals;
pub mod platform;
pub mod regs;
pub mod rng;
pub mod snapshot;
pub mod trigger;
pub mod wait;

mod tests;

use core::fmt;
use core::num::NonZeroU32;

pub use attributes::PlatformAttr;
pub use cycle_counter::CycleCounter;
pub use platform::PlatformController;
pub use regs::{Demcr, DwtCtrl};
pub use rng::XorShift32;
pub use trigger::{TriggerLevel, TriggerLine};
pub use wait::{BoundedWait, BusyWait, Wait};

/// Optional debug hardware that may be missing on a given core revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// The Data Watchpoint and Trace unit as a whole.
    Dwt,
    /// The CYCCNT register inside an otherwise present DWT.
    CycleCounter,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Dwt => f.write_str("DWT unit"),
            Feature::CycleCounter => f.write_str("DWT cycle counter"),
        }
    }
}

/// Poll loop that a bounded [`Wait`] abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStage {
    /// CYCCNTENA never read back as set.
    CounterEnable,
    /// CYCCNT stayed at zero.
    CounterTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("{0} not present")]
    FeatureUnavailable(Feature),
    #[error("no trigger attribute in request batch")]
    DispatchMiss,
    #[error("hardware did not settle ({0:?})")]
    Stalled(WaitStage),
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Register-level access to the Cortex-M debug block (DCB + DWT).
///
/// Reads take `&self` because the real registers are read through shared
/// references; implementations needing to model read side effects use
/// interior mutability.
pub trait DebugRegisters {
    /// Whether the DWT unit exists at all. Valid before TRCENA is set.
    fn dwt_present(&self) -> bool;
    fn demcr(&self) -> Demcr;
    fn set_demcr(&mut self, value: Demcr);
    fn dwt_ctrl(&self) -> DwtCtrl;
    fn set_dwt_ctrl(&mut self, value: DwtCtrl);
    fn cyccnt(&self) -> u32;
    fn set_cyccnt(&mut self, value: u32);
}

/// A single push-pull output used as the scope trigger.
pub trait TriggerPin {
    fn configure_output(&mut self);
    fn set_high(&mut self);
    fn set_low(&mut self);
}

/// Board bring-up that lives outside the core: clocks, console transport and
/// the seed for the byte stream.
pub trait Bringup {
    fn hal_init(&mut self);
    fn init_transport(&mut self) {}
    fn seed(&mut self) -> NonZeroU32;
}
