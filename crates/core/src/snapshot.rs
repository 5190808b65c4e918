use crate::trigger::TriggerLevel;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlatformSnapshot {
    pub cycle_counter_enabled: bool,
    pub cycle_count: u32,
    pub trigger_level: TriggerLevel,
    pub rng_state: u32,
}
