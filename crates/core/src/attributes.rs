use crate::trigger::{TriggerLevel, TriggerLine};
use crate::{PlatformError, PlatformResult, TriggerPin};
use serde::{Deserialize, Serialize};

/// Platform attribute requests. Wire values are the discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum PlatformAttr {
    /// Reserved for clock-mode switching; accepted and ignored.
    ClockUserspace = 0,
    /// Reserved for clock-mode switching; accepted and ignored.
    ClockMax = 1,
    TriggerHigh = 2,
    TriggerLow = 3,
}

impl PlatformAttr {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::ClockUserspace),
            1 => Some(Self::ClockMax),
            2 => Some(Self::TriggerHigh),
            3 => Some(Self::TriggerLow),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        self as u32
    }
}

/// Processes `requests` in order and stops at the first trigger request.
///
/// Anything after that request is never looked at: `[ClockMax, TriggerHigh,
/// TriggerLow]` leaves the line high. A batch without a trigger request is a
/// [`PlatformError::DispatchMiss`], which only means nothing happened.
pub fn dispatch<P: TriggerPin>(
    line: &mut TriggerLine<P>,
    requests: &[PlatformAttr],
) -> PlatformResult<TriggerLevel> {
    dispatch_iter(line, requests.iter().copied())
}

/// Wire form of [`dispatch`]. Unknown values are skipped like the clock
/// requests and never count as a trigger.
pub fn dispatch_raw<P: TriggerPin>(
    line: &mut TriggerLine<P>,
    requests: &[u32],
) -> PlatformResult<TriggerLevel> {
    dispatch_iter(
        line,
        requests.iter().filter_map(|&raw| {
            let attr = PlatformAttr::from_raw(raw);
            if attr.is_none() {
                debug!("ignoring unknown attribute {}", raw);
            }
            attr
        }),
    )
}

fn dispatch_iter<P: TriggerPin>(
    line: &mut TriggerLine<P>,
    requests: impl Iterator<Item = PlatformAttr>,
) -> PlatformResult<TriggerLevel> {
    for attr in requests {
        match attr {
            PlatformAttr::ClockUserspace | PlatformAttr::ClockMax => {}
            PlatformAttr::TriggerHigh => {
                line.assert_high();
                return Ok(TriggerLevel::High);
            }
            PlatformAttr::TriggerLow => {
                line.assert_low();
                return Ok(TriggerLevel::Low);
            }
        }
    }
    Err(PlatformError::DispatchMiss)
}
