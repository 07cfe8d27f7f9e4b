use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlaybackError, Result};
use crate::gesture::{DirectionFilter, GesturePolicy};

/// Knobs for the playback interaction core.
///
/// Every section carries defaults matching the shipping player, so a config
/// file only needs the values it wants to override.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Auto-hide and fade timing for the playback overlay.
    pub overlay: OverlayConfig,
    /// Jump intervals and accumulation windows.
    pub jump: JumpConfig,
    /// Gesture action policy and direction gating.
    pub gestures: GestureConfig,
    /// Deduplication cache sizing.
    pub cache: CacheConfig,
    /// Change broadcast channel sizing.
    pub bus: BusConfig,
}

impl PlaybackConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: PlaybackConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading playback config");
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Reject values that would make a timer fire immediately, a cache
    /// unable to hold a single entry, or gesture math produce NaN.
    pub fn validate(&self) -> Result<()> {
        let zero_checks = [
            ("overlay.auto_hide_ms", self.overlay.auto_hide_ms),
            ("jump.window_ms", self.jump.window_ms),
            ("jump.tap_window_ms", self.jump.tap_window_ms),
            ("jump.forward_secs", self.jump.forward_secs),
            ("jump.backward_secs", self.jump.backward_secs),
        ];
        for (name, value) in zero_checks {
            if value == 0 {
                return Err(PlaybackError::InvalidConfig(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        let policy = &self.gestures.policy;
        let float_checks = [
            (
                "gestures.policy.slow_scrub_damping",
                policy.slow_scrub_damping,
                policy.slow_scrub_damping >= 0.0,
            ),
            (
                "gestures.policy.level_sensitivity",
                policy.level_sensitivity,
                policy.level_sensitivity > 0.0,
            ),
            (
                "gestures.policy.swipe_min_velocity",
                policy.swipe_min_velocity,
                policy.swipe_min_velocity >= 0.0,
            ),
            (
                "gestures.policy.swipe_min_translation",
                policy.swipe_min_translation,
                policy.swipe_min_translation >= 0.0,
            ),
        ];
        for (name, value, in_range) in float_checks {
            if !value.is_finite() || !in_range {
                return Err(PlaybackError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        if self.cache.user_data_capacity == 0 {
            return Err(PlaybackError::InvalidConfig(
                "cache.user_data_capacity must be greater than zero".into(),
            ));
        }
        if self.bus.capacity == 0 {
            return Err(PlaybackError::InvalidConfig(
                "bus.capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Idle time before the overlay hides itself (milliseconds).
    pub auto_hide_ms: u64,
    /// Fade applied when the overlay is hidden by the auto-hide timer.
    pub fade_out_ms: u64,
}

impl OverlayConfig {
    pub fn auto_hide(&self) -> Duration {
        Duration::from_millis(self.auto_hide_ms)
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            auto_hide_ms: 5_000,
            fade_out_ms: 300,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    pub forward_secs: u64,
    pub backward_secs: u64,
    /// Quiet period that closes a jump burst (keys, swipes).
    pub window_ms: u64,
    /// Shorter burst window used for multi-tap jumps.
    pub tap_window_ms: u64,
}

impl JumpConfig {
    pub fn forward(&self) -> Duration {
        Duration::from_secs(self.forward_secs)
    }

    pub fn backward(&self) -> Duration {
        Duration::from_secs(self.backward_secs)
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn tap_window(&self) -> Duration {
        Duration::from_millis(self.tap_window_ms)
    }
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            forward_secs: 15,
            backward_secs: 15,
            window_ms: 2_000,
            tap_window_ms: 350,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub policy: GesturePolicy,
    /// Directions a pan may start in before it is handed back to the host.
    pub pan_direction: DirectionFilter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub user_data_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user_data_capacity: crate::hash_cache::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}
