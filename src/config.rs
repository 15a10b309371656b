//! Engine configuration parsed from environment variables.

use std::env::VarError;
use std::time::Duration;

use crate::consts::{PAN_DURATION_MS, PLACEMENT_GAP, PLACEMENT_LEVELS, SETTLE_FRAMES};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Parse { var: &'static str, value: String },
    #[error("{var} is not valid unicode")]
    NotUnicode { var: &'static str },
}

/// How the transactional path waits before verifying bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleMode {
    /// Skip the wait when the scene commits synchronously; otherwise wait
    /// the given number of frames.
    Acknowledged { fallback_frames: u32 },
    /// Always wait this many render passes.
    Frames(u32),
}

impl Default for SettleMode {
    fn default() -> Self {
        Self::Frames(SETTLE_FRAMES)
    }
}

/// Placement search tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementConfig {
    /// Gap between parent and child, also used as collision padding.
    pub gap: f64,
    /// Number of spiral levels to probe.
    pub levels: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self { gap: PLACEMENT_GAP, levels: PLACEMENT_LEVELS }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub placement: PlacementConfig,
    pub settle: SettleMode,
    /// Camera pan animation; `None` jumps immediately.
    pub pan_animation: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placement: PlacementConfig::default(),
            settle: SettleMode::default(),
            pan_animation: Some(Duration::from_millis(PAN_DURATION_MS)),
        }
    }
}

impl EngineConfig {
    /// Build typed engine config from environment variables.
    ///
    /// Optional:
    /// - `FLOWBOARD_PLACEMENT_GAP`: default 80
    /// - `FLOWBOARD_PLACEMENT_LEVELS`: default 25
    /// - `FLOWBOARD_SETTLE`: `frames` (default) or `ack`
    /// - `FLOWBOARD_SETTLE_FRAMES`: default 2
    /// - `FLOWBOARD_PAN_DURATION_MS`: default 300, `0` disables animation
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a present variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Same as [`from_env`](Self::from_env) but reads through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a present variable fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let gap: f64 = parse_var(&lookup, "FLOWBOARD_PLACEMENT_GAP", PLACEMENT_GAP)?;
        if !gap.is_finite() || gap < 0.0 {
            return Err(ConfigError::Parse { var: "FLOWBOARD_PLACEMENT_GAP", value: gap.to_string() });
        }
        let levels = parse_var(&lookup, "FLOWBOARD_PLACEMENT_LEVELS", PLACEMENT_LEVELS)?;
        let frames = parse_var(&lookup, "FLOWBOARD_SETTLE_FRAMES", SETTLE_FRAMES)?;
        let settle = parse_settle(read_var(&lookup, "FLOWBOARD_SETTLE")?.as_deref(), frames)?;
        let pan_ms = parse_var(&lookup, "FLOWBOARD_PAN_DURATION_MS", PAN_DURATION_MS)?;
        let pan_animation = (pan_ms > 0).then(|| Duration::from_millis(pan_ms));

        Ok(Self { placement: PlacementConfig { gap, levels }, settle, pan_animation })
    }
}

fn read_var<F>(lookup: &F, var: &'static str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    match lookup(var) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { var }),
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
    T: std::str::FromStr,
{
    match read_var(lookup, var)? {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Parse { var, value: raw }),
    }
}

fn parse_settle(raw: Option<&str>, frames: u32) -> Result<SettleMode, ConfigError> {
    match raw.unwrap_or("frames") {
        "frames" => Ok(SettleMode::Frames(frames)),
        "ack" => Ok(SettleMode::Acknowledged { fallback_frames: frames }),
        other => Err(ConfigError::Parse { var: "FLOWBOARD_SETTLE", value: other.to_string() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
