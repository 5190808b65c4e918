//! Simulated hardware behind the core's traits.

pub mod bringup;
pub mod dwt;
pub mod gpio;

pub use bringup::SimBringup;
pub use dwt::SimDebugUnit;
pub use gpio::{GpioPort, SimTriggerPin};
