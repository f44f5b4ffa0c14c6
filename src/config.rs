//! Shared configuration for every control source.
//!
//! Plain `Copy` structs with builder methods, usable in `no_std` firmware
//! and on desktop alike. Enable the `serde` feature to load them from a
//! file.
//!
//! # Example
//!
//! ```rust
//! use tank_control::config::{AxisPolicy, Config, GamepadConfig, RcConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.control.update_interval_ms, 50);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_gamepad(
//!         GamepadConfig::default()
//!             .with_dead_zone(80)
//!             .with_axis_policy(AxisPolicy::Ternary),
//!     )
//!     .with_rc(RcConfig::default().with_fire_threshold_us(1600));
//! ```

use crate::deadzone::DEFAULT_DEAD_ZONE;

// ============================================================================
// Main Config
// ============================================================================

/// Complete control configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Settings shared by every source
    pub control: ControlConfig,
    /// Gamepad stick handling
    pub gamepad: GamepadConfig,
    /// RC receiver calibration
    pub rc: RcConfig,
}

impl Config {
    /// Set shared control configuration
    pub fn with_control(mut self, control: ControlConfig) -> Self {
        self.control = control;
        self
    }

    /// Set gamepad configuration
    pub fn with_gamepad(mut self, gamepad: GamepadConfig) -> Self {
        self.gamepad = gamepad;
        self
    }

    /// Set RC receiver configuration
    pub fn with_rc(mut self, rc: RcConfig) -> Self {
        self.rc = rc;
        self
    }
}

// ============================================================================
// Control Config
// ============================================================================

/// Settings shared by every control source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlConfig {
    /// Minimum spacing between two computed refresh cycles (milliseconds)
    pub update_interval_ms: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 50,
        }
    }
}

impl ControlConfig {
    /// Set the refresh interval
    pub fn with_update_interval_ms(mut self, ms: u32) -> Self {
        self.update_interval_ms = ms;
        self
    }
}

// ============================================================================
// Gamepad Config
// ============================================================================

/// How analog stick deflection becomes intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AxisPolicy {
    /// Linear scaling of the dead-zoned axis onto `[-100, 100]`.
    #[default]
    Proportional,
    /// Any deflection outside the dead zone is full `±100`.
    Ternary,
}

/// Gamepad stick handling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GamepadConfig {
    /// Dead-zone threshold on the raw axis
    pub dead_zone: u16,
    /// Raw axis value at full negative deflection
    pub axis_min: i16,
    /// Raw axis value at full positive deflection
    pub axis_max: i16,
    /// Proportional or ternary stick mapping
    pub axis_policy: AxisPolicy,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            dead_zone: DEFAULT_DEAD_ZONE,
            axis_min: -512,
            axis_max: 511,
            axis_policy: AxisPolicy::Proportional,
        }
    }
}

impl GamepadConfig {
    /// Set the dead-zone threshold
    pub fn with_dead_zone(mut self, threshold: u16) -> Self {
        self.dead_zone = threshold;
        self
    }

    /// Set the raw axis range
    pub fn with_axis_range(mut self, min: i16, max: i16) -> Self {
        self.axis_min = min;
        self.axis_max = max;
        self
    }

    /// Set the stick mapping policy
    pub fn with_axis_policy(mut self, policy: AxisPolicy) -> Self {
        self.axis_policy = policy;
        self
    }
}

// ============================================================================
// RC Config
// ============================================================================

/// Receiver channel assignment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RcChannels {
    /// Forward/back
    pub throttle: u8,
    /// Left/right
    pub steering: u8,
    /// Gear potentiometer
    pub gear: u8,
    /// Turret left/right
    pub turret_rotation: u8,
    /// Turret up/down
    pub turret_elevation: u8,
    /// Flamethrower switch
    pub fire: u8,
}

impl Default for RcChannels {
    fn default() -> Self {
        Self {
            throttle: 2,
            steering: 3,
            gear: 4,
            turret_rotation: 5,
            turret_elevation: 6,
            fire: 7,
        }
    }
}

/// RC receiver calibration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RcConfig {
    /// Channel assignment
    pub channels: RcChannels,
    /// Pulse width at full negative deflection (µs)
    pub pulse_min_us: u16,
    /// Pulse width at full positive deflection (µs)
    pub pulse_max_us: u16,
    /// Longest wait for one pulse (µs)
    pub pulse_timeout_us: u32,
    /// Fire channel activates strictly above this width (µs)
    pub fire_threshold_us: u16,
    /// All channels silent for this long counts as signal loss (ms)
    pub signal_loss_ms: u32,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            channels: RcChannels::default(),
            pulse_min_us: 1000,
            pulse_max_us: 2000,
            pulse_timeout_us: 25_000,
            fire_threshold_us: 1500,
            signal_loss_ms: 1000,
        }
    }
}

impl RcConfig {
    /// Set the channel assignment
    pub fn with_channels(mut self, channels: RcChannels) -> Self {
        self.channels = channels;
        self
    }

    /// Set the calibrated pulse range
    pub fn with_pulse_range(mut self, min_us: u16, max_us: u16) -> Self {
        self.pulse_min_us = min_us;
        self.pulse_max_us = max_us;
        self
    }

    /// Set the per-channel pulse timeout
    pub fn with_pulse_timeout_us(mut self, us: u32) -> Self {
        self.pulse_timeout_us = us;
        self
    }

    /// Set the fire threshold
    pub fn with_fire_threshold_us(mut self, us: u16) -> Self {
        self.fire_threshold_us = us;
        self
    }

    /// Set the signal-loss failsafe delay
    pub fn with_signal_loss_ms(mut self, ms: u32) -> Self {
        self.signal_loss_ms = ms;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
