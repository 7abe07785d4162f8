use std::path::Path;

use anyhow::Context;
use fluidstep_core::FluidConfig;
use fluidstep_modules_input::DashBindings;
use serde::Deserialize;

/// Runtime config plus the demo's own `[demo]` section, from one TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoConfig {
    #[serde(flatten)]
    pub fluid: FluidConfig,
    #[serde(default)]
    pub demo: DemoSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoSection {
    /// Zero runs until ctrl-c.
    #[serde(default = "default_seconds")]
    pub seconds: f64,
    #[serde(default = "default_dash_period_ms")]
    pub dash_period_ms: u64,
    #[serde(default)]
    pub dash: DashBindings,
}

fn default_seconds() -> f64 { 10.0 }
fn default_dash_period_ms() -> u64 { 700 }

impl Default for DemoSection {
    fn default() -> Self {
        Self {
            seconds: default_seconds(),
            dash_period_ms: default_dash_period_ms(),
            dash: DashBindings::default(),
        }
    }
}

impl DemoConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: Self =
            toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))?;
        cfg.fluid.validate()?;
        Ok(cfg)
    }
}
