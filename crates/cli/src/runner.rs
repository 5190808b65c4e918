use anyhow::{Context, Result};
use scaplat_config::{
    parse_size, BoardDescriptor, CycleCounterState, ExperimentScript, ScriptAssertion, ScriptStep,
};
use scaplat_core::peripherals::{SimBringup, SimDebugUnit, SimTriggerPin};
use scaplat_core::snapshot::PlatformSnapshot;
use scaplat_core::{BoundedWait, PlatformController, TriggerLevel};
use serde::Serialize;
use std::num::NonZeroU32;
use tracing::{debug, info, warn};

pub type SimPlatform = PlatformController<SimDebugUnit, SimTriggerPin, BoundedWait>;

/// Largest single `fill_random` the simulator will allocate.
pub const MAX_FILL_BYTES: u64 = 16 * 1024 * 1024;

pub fn build_platform(
    board: &BoardDescriptor,
    seed: NonZeroU32,
    max_polls: u32,
) -> SimPlatform {
    let unit = SimDebugUnit::new()
        .with_dwt(board.debug.dwt_present)
        .with_cyccnt(board.debug.cyccnt_present)
        .with_enable_latency(board.debug.cyccntena_latency)
        .with_cycles_per_access(board.debug.cycles_per_access)
        .with_start_delay(board.debug.start_delay);
    let mut bringup = SimBringup::new(seed);
    PlatformController::init(
        &mut bringup,
        unit,
        SimTriggerPin::new(board.trigger.pin),
        BoundedWait::new(max_polls),
    )
}

#[derive(Debug, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepRecord {
    SetAttributes {
        requested: usize,
        result: Option<TriggerLevel>,
    },
    FillRandom {
        len: usize,
        bytes: String,
    },
    CycleCount {
        label: String,
        value: u64,
    },
    ResetCycles {
        ok: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct AssertionRecord {
    pub assertion: String,
    pub passed: bool,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub status: &'static str,
    pub board: String,
    pub seed: u32,
    pub steps: Vec<StepRecord>,
    pub assertions: Vec<AssertionRecord>,
    pub rising_edges: u32,
    pub falling_edges: u32,
    pub snapshot: PlatformSnapshot,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.assertions.iter().all(|a| a.passed)
    }
}

pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn run_script(
    platform: &mut SimPlatform,
    board: &BoardDescriptor,
    seed: NonZeroU32,
    script: &ExperimentScript,
) -> Result<RunReport> {
    let mut steps = Vec::with_capacity(script.steps.len());

    for (i, step) in script.steps.iter().enumerate() {
        let record = match step {
            ScriptStep::SetAttributes(s) => {
                let result = platform.set_attributes(&s.set_attributes).ok();
                info!("step {}: set_attributes {:?} -> {:?}", i, s.set_attributes, result);
                StepRecord::SetAttributes {
                    requested: s.set_attributes.len(),
                    result,
                }
            }
            ScriptStep::SetAttributesRaw(s) => {
                let result = platform.set_attributes_raw(&s.set_attributes_raw).ok();
                info!(
                    "step {}: set_attributes_raw {:?} -> {:?}",
                    i, s.set_attributes_raw, result
                );
                StepRecord::SetAttributes {
                    requested: s.set_attributes_raw.len(),
                    result,
                }
            }
            ScriptStep::FillRandom(s) => {
                let len = parse_size(&s.fill_random)?;
                if len > MAX_FILL_BYTES {
                    anyhow::bail!(
                        "fill_random of {} bytes exceeds the {} byte limit",
                        len,
                        MAX_FILL_BYTES
                    );
                }
                let mut buf = vec![0u8; len as usize];
                platform.fill_random(&mut buf);
                debug!("step {}: fill_random {} bytes", i, len);
                StepRecord::FillRandom {
                    len: buf.len(),
                    bytes: hex(&buf),
                }
            }
            ScriptStep::CycleCount(s) => {
                let value = platform.cycle_count();
                info!("step {}: cycle_count[{}] = {}", i, s.cycle_count, value);
                StepRecord::CycleCount {
                    label: s.cycle_count.clone(),
                    value,
                }
            }
            ScriptStep::ResetCycles(s) => {
                let ok = if s.reset_cycles {
                    platform.cycle_counter_mut().reset().is_ok()
                } else {
                    true
                };
                if !ok {
                    warn!("step {}: reset_cycles without a running counter", i);
                }
                StepRecord::ResetCycles { ok }
            }
        };
        steps.push(record);
    }

    let snapshot = platform.snapshot();
    let assertions = script
        .assertions
        .iter()
        .map(|assertion| check(assertion, &snapshot))
        .collect::<Vec<_>>();

    let mut report = RunReport {
        status: "pass",
        board: board.name.clone(),
        seed: seed.get(),
        steps,
        assertions,
        rising_edges: platform.trigger().pin().rising_edges(),
        falling_edges: platform.trigger().pin().falling_edges(),
        snapshot,
    };
    if !report.passed() {
        report.status = "fail";
    }
    Ok(report)
}

fn check(assertion: &ScriptAssertion, snapshot: &PlatformSnapshot) -> AssertionRecord {
    let (label, passed) = match assertion {
        ScriptAssertion::TriggerLevel(a) => (
            format!("trigger_level == {:?}", a.trigger_level),
            snapshot.trigger_level == a.trigger_level,
        ),
        ScriptAssertion::CycleCounter(a) => {
            let actual = if snapshot.cycle_counter_enabled {
                CycleCounterState::Enabled
            } else {
                CycleCounterState::Unavailable
            };
            (format!("cycle_counter == {:?}", a.cycle_counter), actual == a.cycle_counter)
        }
        ScriptAssertion::RngState(a) => (
            format!("rng_state == {:#010x}", a.rng_state),
            snapshot.rng_state == a.rng_state,
        ),
    };
    if !passed {
        warn!("assertion failed: {}", label);
    }
    AssertionRecord {
        assertion: label,
        passed,
    }
}

pub fn write_report(report: &RunReport, path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write report to {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(yaml: &str) -> BoardDescriptor {
        let path = std::env::temp_dir().join(format!(
            "scaplat-runner-board-{}-{}.yaml",
            std::process::id(),
            yaml.len()
        ));
        std::fs::write(&path, yaml).unwrap();
        let b = BoardDescriptor::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        b
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x00, 0xab, 0x10]), "00ab10");
    }

    #[test]
    fn test_build_platform_without_cyccnt() {
        let b = board("name: t\nseed: 5\ndebug:\n  cyccnt_present: false\n");
        let platform = build_platform(&b, b.seed().unwrap(), 100);
        assert!(!platform.cycle_counter().is_enabled());
        assert_eq!(platform.rng().state(), 5);
    }
}
