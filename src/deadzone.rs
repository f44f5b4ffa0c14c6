//! Dead-zone filtering for analog stick axes.
//!
//! Readings close to the stick center are noise; [`DeadZoneFilter`] snaps
//! them to exactly zero. The band is exclusive at its edge: a reading whose
//! magnitude equals the threshold passes through unchanged.
//!
//! ```rust
//! use tank_control::DeadZoneFilter;
//!
//! let filter = DeadZoneFilter::new(100);
//! assert_eq!(filter.apply(99), 0);
//! assert_eq!(filter.apply(-99), 0);
//! assert_eq!(filter.apply(100), 100);
//! assert_eq!(filter.apply(-300), -300);
//! ```

/// Default threshold on a raw axis domain of roughly `[-512, 511]`.
pub const DEFAULT_DEAD_ZONE: u16 = 100;

/// Rejects small analog noise around joystick center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeadZoneFilter {
    threshold: u16,
}

impl DeadZoneFilter {
    /// Create a filter with the given threshold.
    pub const fn new(threshold: u16) -> Self {
        Self { threshold }
    }

    /// Returns 0 if `|value| < threshold`, otherwise `value` unchanged.
    #[inline]
    pub fn apply(&self, value: i16) -> i16 {
        filter(value, self.threshold)
    }

    /// The configured threshold.
    pub fn threshold(&self) -> u16 {
        self.threshold
    }
}

impl Default for DeadZoneFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DEAD_ZONE)
    }
}

/// Free-function form of [`DeadZoneFilter::apply`].
#[inline]
pub fn filter(value: i16, threshold: u16) -> i16 {
    if value.unsigned_abs() < threshold {
        0
    } else {
        value
    }
}
