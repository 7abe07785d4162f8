use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FluidError, FluidResult};
use crate::sched::{Pacing, SchedulerConfig};
use crate::smoothing::{SmoothingMode, SmoothingSettings, DEFAULT_TELEPORT_THRESHOLD};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FluidConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_update_hz")]
    pub update_hz: f64,
    #[serde(default = "default_draw_hz")]
    pub draw_hz: f64,
    #[serde(default)]
    pub pacing: Pacing,
    #[serde(default = "default_max_accumulated_ms")]
    pub max_accumulated_ms: u64,
    #[serde(default = "default_lag_threshold")]
    pub lag_threshold: u32,
}

fn default_update_hz() -> f64 { 60.0 }
fn default_draw_hz() -> f64 { 240.0 }
fn default_max_accumulated_ms() -> u64 { 500 }
fn default_lag_threshold() -> u32 { 5 }

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            update_hz: default_update_hz(),
            draw_hz: default_draw_hz(),
            pacing: Pacing::default(),
            max_accumulated_ms: default_max_accumulated_ms(),
            lag_threshold: default_lag_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub mode: SmoothingMode,
    #[serde(default = "default_player_mode")]
    pub player_mode: SmoothingMode,
    #[serde(default = "default_teleport_threshold")]
    pub teleport_threshold: f32,
}

fn default_enabled() -> bool { true }
fn default_player_mode() -> SmoothingMode { SmoothingMode::Extrapolate }
fn default_teleport_threshold() -> f32 { DEFAULT_TELEPORT_THRESHOLD }

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            mode: SmoothingMode::default(),
            player_mode: default_player_mode(),
            teleport_threshold: default_teleport_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_enabled")]
    pub log_rates: bool,
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

fn default_period_ms() -> u64 { 1000 }

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_rates: true,
            period_ms: default_period_ms(),
        }
    }
}

impl TelemetryConfig {
    #[inline]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl FluidConfig {
    pub fn from_toml_str(text: &str) -> FluidResult<Self> {
        toml::from_str(text).map_err(|e| FluidError::config(format!("invalid TOML: {e}")))
    }

    pub fn load_toml(path: impl AsRef<Path>) -> FluidResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| FluidError::config(format!("read {}: {e}", path.display())))?;
        let cfg = Self::from_toml_str(&text)?;
        log::debug!("config: loaded {}", path.display());
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> FluidResult<String> {
        toml::to_string_pretty(self).map_err(|e| FluidError::config(format!("serialize: {e}")))
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        let t = &self.timing;
        SchedulerConfig {
            update_hz: t.update_hz,
            draw_hz: t.draw_hz,
            pacing: t.pacing,
            max_accumulated: Duration::from_millis(t.max_accumulated_ms),
            lag_threshold: t.lag_threshold,
        }
    }

    pub fn smoothing_settings(&self) -> SmoothingSettings {
        let s = &self.smoothing;
        SmoothingSettings {
            enabled: s.enabled,
            mode: s.mode,
            player_mode: s.player_mode,
            teleport_threshold: s.teleport_threshold,
        }
    }

    /// Checks everything the runtime would reject, without building it.
    pub fn validate(&self) -> FluidResult<(SchedulerConfig, SmoothingSettings)> {
        let sched = self.scheduler_config();
        sched.plan()?;

        let threshold = self.smoothing.teleport_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(FluidError::config(format!(
                "smoothing.teleport_threshold must be positive, got {threshold}"
            )));
        }

        Ok((sched, self.smoothing_settings()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = FluidConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, FluidConfig::default());
        assert_eq!(cfg.timing.update_hz, 60.0);
        assert_eq!(cfg.timing.draw_hz, 240.0);
        assert_eq!(cfg.smoothing.player_mode, SmoothingMode::Extrapolate);
    }

    #[test]
    fn parses_sections() {
        let cfg = FluidConfig::from_toml_str(
            r#"
            [timing]
            update_hz = 50.0
            draw_hz = 144.0
            pacing = "independent"

            [smoothing]
            mode = "extrapolate"
            player_mode = "none"

            [telemetry]
            log_rates = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.timing.update_hz, 50.0);
        assert_eq!(cfg.timing.pacing, Pacing::Independent);
        assert_eq!(cfg.smoothing.mode, SmoothingMode::Extrapolate);
        assert_eq!(cfg.smoothing.player_mode, SmoothingMode::None);
        assert!(!cfg.telemetry.log_rates);
        assert_eq!(cfg.telemetry.period_ms, 1000);
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = FluidConfig::from_toml_str("[smoothing]\nmode = \"blend\"\n").unwrap_err();
        assert!(matches!(err, FluidError::Config(_)));
    }

    #[test]
    fn validate_rejects_zero_rate() {
        let mut cfg = FluidConfig::default();
        cfg.timing.update_hz = 0.0;
        assert!(matches!(cfg.validate(), Err(FluidError::Config(_))));
    }

    #[test]
    fn validate_rejects_bad_threshold() {
        let mut cfg = FluidConfig::default();
        cfg.smoothing.teleport_threshold = -1.0;
        assert!(cfg.validate().is_err());
    }
}
