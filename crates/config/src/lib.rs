use anyhow::{Context, Result};
use scaplat_core::{PlatformAttr, TriggerLevel};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::Path;

fn default_true() -> bool {
    true
}

fn default_cycles_per_access() -> u32 {
    1
}

fn default_port() -> String {
    "A".to_string()
}

fn default_pin() -> u8 {
    12
}

/// Debug block model of a simulated board.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DebugUnitConfig {
    #[serde(default = "default_true")]
    pub dwt_present: bool,
    #[serde(default = "default_true")]
    pub cyccnt_present: bool,
    /// CTRL reads before a CYCCNTENA write reads back as set.
    #[serde(default)]
    pub cyccntena_latency: u32,
    #[serde(default = "default_cycles_per_access")]
    pub cycles_per_access: u32,
    /// CYCCNT reads before the counter starts ticking.
    #[serde(default)]
    pub start_delay: u32,
}

impl Default for DebugUnitConfig {
    fn default() -> Self {
        Self {
            dwt_present: true,
            cyccnt_present: true,
            cyccntena_latency: 0,
            cycles_per_access: 1,
            start_delay: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    #[serde(default = "default_port")]
    pub port: String, // e.g. "A"
    #[serde(default = "default_pin")]
    pub pin: u8,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            pin: default_pin(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BoardDescriptor {
    pub name: String,
    pub seed: u32,
    #[serde(default)]
    pub debug: DebugUnitConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
}

impl BoardDescriptor {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open board descriptor at {:?}", path.as_ref()))?;
        let board: Self =
            serde_yaml::from_reader(f).context("Failed to parse Board Descriptor")?;
        board.validate()?;
        Ok(board)
    }

    pub fn validate(&self) -> Result<()> {
        if self.seed == 0 {
            anyhow::bail!("Board 'seed' must be non-zero");
        }

        if self.trigger.pin > 15 {
            anyhow::bail!(
                "Trigger pin {} out of range (0..=15)",
                self.trigger.pin
            );
        }

        let port = self.trigger.port.as_bytes();
        if port.len() != 1 || !(b'A'..=b'K').contains(&port[0]) {
            anyhow::bail!("Trigger port '{}' must be a letter A..K", self.trigger.port);
        }

        Ok(())
    }

    pub fn seed(&self) -> Result<NonZeroU32> {
        NonZeroU32::new(self.seed).context("Board 'seed' must be non-zero")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScriptLimits {
    /// Poll budget for each hardware wait during cycle-counter bring-up.
    pub max_polls: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SetAttributesStep {
    pub set_attributes: Vec<PlatformAttr>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SetAttributesRawStep {
    pub set_attributes_raw: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FillRandomStep {
    pub fill_random: String, // e.g. "16 B"
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CycleCountStep {
    pub cycle_count: String, // label for the report
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ResetCyclesStep {
    pub reset_cycles: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum ScriptStep {
    SetAttributes(SetAttributesStep),
    SetAttributesRaw(SetAttributesRawStep),
    FillRandom(FillRandomStep),
    CycleCount(CycleCountStep),
    ResetCycles(ResetCyclesStep),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CycleCounterState {
    Enabled,
    Unavailable,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TriggerLevelAssertion {
    pub trigger_level: TriggerLevel,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CycleCounterAssertion {
    pub cycle_counter: CycleCounterState,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RngStateAssertion {
    pub rng_state: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum ScriptAssertion {
    TriggerLevel(TriggerLevelAssertion),
    CycleCounter(CycleCounterAssertion),
    RngState(RngStateAssertion),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ExperimentScript {
    pub schema_version: String,
    /// Board descriptor path, relative to the script.
    pub board: String,
    pub limits: ScriptLimits,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
    #[serde(default)]
    pub assertions: Vec<ScriptAssertion>,
}

impl ExperimentScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open experiment script at {:?}", path.as_ref()))?;
        let script: Self = serde_yaml::from_reader(f)
            .context("Failed to parse Experiment Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        if self.board.trim().is_empty() {
            anyhow::bail!("Input 'board' path cannot be empty");
        }

        if self.limits.max_polls == 0 {
            anyhow::bail!("Limit 'max_polls' must be greater than zero");
        }

        for step in &self.steps {
            if let ScriptStep::FillRandom(fill) = step {
                parse_size(&fill.fill_random)
                    .with_context(|| format!("Bad fill_random size '{}'", fill.fill_random))?;
            }
        }

        Ok(())
    }

    /// Board path resolved against the script's directory.
    pub fn board_path(&self, script_path: &Path) -> std::path::PathBuf {
        script_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.board)
    }
}

pub fn parse_size(size_str: &str) -> Result<u64> {
    use human_size::{Byte, Size, SpecificSize};
    let s: Size = size_str
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid size format: {}", e))?;
    let bytes: SpecificSize<Byte> = s.into();
    Ok(bytes.value() as u64)
}
