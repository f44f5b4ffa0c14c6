//! Source-agnostic driver intent.
//!
//! An [`Intent`] is the normalized snapshot a control source produces on a
//! successful refresh cycle. It carries no identity beyond "latest": every
//! cycle computes a fresh one and hands it to the caller of
//! [`ControlSource::refresh`](crate::ControlSource::refresh).
//!
//! # Example
//!
//! ```rust
//! use tank_control::{GearRequest, Intent};
//!
//! let intent = Intent {
//!     forward_back: 100,
//!     turn: -100,
//!     ..Intent::neutral()
//! };
//! assert_eq!(intent.gear, GearRequest::Hold);
//! assert!(!intent.fire);
//! ```

/// Lower bound of every normalized intent axis.
pub const AXIS_MIN: i8 = -100;

/// Upper bound of every normalized intent axis.
pub const AXIS_MAX: i8 = 100;

/// How a source asks the gear controller to change gear this cycle.
///
/// A source sticks to one family for its whole lifetime: sampled edge
/// signals ([`Edge`](Self::Edge)) or an absolute proportional reading
/// ([`Absolute`](Self::Absolute)). [`Hold`](Self::Hold) is valid for both and
/// means "no gear information this cycle".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GearRequest {
    /// Leave the gear untouched.
    #[default]
    Hold,
    /// Current level of the shift-up and shift-down signals.
    ///
    /// Only rising edges shift; the controller remembers the previous level.
    Edge {
        /// Shift-up signal is held this cycle.
        up: bool,
        /// Shift-down signal is held this cycle.
        down: bool,
    },
    /// Raw proportional reading mapped linearly onto gears 1-5.
    Absolute {
        /// Raw sample (e.g. pulse width in microseconds).
        raw: i32,
        /// Raw value mapping to gear 1.
        min: i32,
        /// Raw value mapping to gear 5.
        max: i32,
    },
}

/// Normalized driver commands for one control cycle.
///
/// All axes are in `[-100, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Intent {
    /// Positive = forward.
    pub forward_back: i8,
    /// Positive = right turn.
    pub turn: i8,
    /// Positive = turret rotates right.
    pub turret_yaw: i8,
    /// Positive = turret elevates.
    pub turret_pitch: i8,
    /// Flamethrower requested.
    pub fire: bool,
    /// Gear change request for this cycle.
    pub gear: GearRequest,
}

impl Intent {
    /// All axes centered, fire off, gear held.
    pub const fn neutral() -> Self {
        Self {
            forward_back: 0,
            turn: 0,
            turret_yaw: 0,
            turret_pitch: 0,
            fire: false,
            gear: GearRequest::Hold,
        }
    }

    /// Returns true if no axis is deflected and fire is off.
    pub fn is_neutral(&self) -> bool {
        self.forward_back == 0
            && self.turn == 0
            && self.turret_yaw == 0
            && self.turret_pitch == 0
            && !self.fire
    }
}

/// Clamp a wide intermediate value onto the intent axis range.
#[inline]
pub fn clamp_axis(value: i32) -> i8 {
    value.clamp(AXIS_MIN as i32, AXIS_MAX as i32) as i8
}
