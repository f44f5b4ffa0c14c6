//! Differential-drive and turret mixing.
//!
//! Both mixers are pure functions over already-normalized `[-100, 100]`
//! values. Sources resolve their raw inputs (buttons, sticks, pulse widths)
//! into that range first, using the helpers in this module.
//!
//! # Drive mixing
//!
//! The gear scales both tracks by `gear / 5`, and `turn` biases the tracks
//! in opposite directions for skid steering:
//!
//! ```rust
//! use tank_control::DriveMixer;
//!
//! assert_eq!(DriveMixer::mix(100, 0, 5), (100, 100));
//! assert_eq!(DriveMixer::mix(100, 0, 1), (20, 20));
//! assert_eq!(DriveMixer::mix(0, 100, 5), (100, -100));
//! ```
//!
//! # Turret mixing
//!
//! ```rust
//! use tank_control::TurretMixer;
//!
//! // Ternary: buttons resolve to -100 / 0 / +100
//! let yaw = TurretMixer::rotation_from_buttons(true, false);
//! let pitch = TurretMixer::elevation_from_buttons(false, false);
//! assert_eq!(TurretMixer::mix(yaw, pitch), (-100, 0));
//! ```

use crate::gear::{MAX_GEAR, MIN_GEAR};
use crate::intent::{clamp_axis, AXIS_MAX, AXIS_MIN};

/// Intent + gear to left/right track speed.
pub struct DriveMixer;

impl DriveMixer {
    /// Mix forward/back and turn intent into `(left, right)` track speeds.
    ///
    /// `left = clamp((forward_back + turn) * gear / 5)` and
    /// `right = clamp((forward_back - turn) * gear / 5)`, truncating toward
    /// zero. Both outputs are always in `[-100, 100]`.
    ///
    /// `gear` must be in `[1, 5]`; [`GearController`](crate::GearController)
    /// guarantees this.
    pub fn mix(forward_back: i8, turn: i8, gear: u8) -> (i8, i8) {
        debug_assert!(
            (MIN_GEAR..=MAX_GEAR).contains(&gear),
            "gear {gear} out of range"
        );
        let fb = forward_back as i32;
        let turn = turn as i32;
        let gear = gear as i32;
        let max = MAX_GEAR as i32;

        let left = (fb + turn) * gear / max;
        let right = (fb - turn) * gear / max;
        (clamp_axis(left), clamp_axis(right))
    }

    /// Resolve a pair of opposing buttons into a drive axis.
    ///
    /// Additive: both held cancel out to 0.
    pub fn axis_from_buttons(negative: bool, positive: bool) -> i8 {
        let mut value = 0;
        if positive {
            value += AXIS_MAX;
        }
        if negative {
            value += AXIS_MIN;
        }
        value
    }
}

/// Intent to turret rotation/elevation.
///
/// The mixer only ever sees a resolved `[-100, 100]` pair; whether that pair
/// came from buttons (ternary) or a stick (proportional) is a property of
/// the source.
pub struct TurretMixer;

impl TurretMixer {
    /// Mix yaw and pitch intent into `(rotation, elevation)`.
    pub fn mix(yaw: i8, pitch: i8) -> (i8, i8) {
        (clamp_axis(yaw as i32), clamp_axis(pitch as i32))
    }

    /// Ternary rotation: left wins over right.
    pub fn rotation_from_buttons(left: bool, right: bool) -> i8 {
        if left {
            AXIS_MIN
        } else if right {
            AXIS_MAX
        } else {
            0
        }
    }

    /// Ternary elevation: elevate wins over lower.
    pub fn elevation_from_buttons(elevate: bool, lower: bool) -> i8 {
        if elevate {
            AXIS_MAX
        } else if lower {
            AXIS_MIN
        } else {
            0
        }
    }
}

/// Bucket an analog reading into `-100`, `0` or `+100` by its sign.
#[inline]
pub fn ternary_axis(value: i16) -> i8 {
    match value.signum() {
        1 => AXIS_MAX,
        -1 => AXIS_MIN,
        _ => 0,
    }
}

/// Linearly map `value` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// Rounds to nearest, halves away from zero. The result is not clamped, so
/// inputs outside the range extrapolate. Reversed ranges are allowed; a
/// degenerate input range returns `out_min`.
///
/// ```rust
/// use tank_control::mixer::scale_linear;
///
/// assert_eq!(scale_linear(1500, 1000, 2000, -100, 100), 0);
/// assert_eq!(scale_linear(1000, 1000, 2000, 100, -100), 100);
/// ```
pub fn scale_linear(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    let span_in = in_max as i64 - in_min as i64;
    if span_in == 0 {
        return out_min;
    }
    let num = (value as i64 - in_min as i64) * (out_max as i64 - out_min as i64);
    let scaled = out_min as i64 + div_round(num, span_in);
    scaled.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Map a raw reading onto the intent axis range and clamp.
///
/// A degenerate calibration (`in_min == in_max`) reads as centered.
#[inline]
pub fn proportional_axis(value: i32, in_min: i32, in_max: i32) -> i8 {
    if in_min == in_max {
        return 0;
    }
    clamp_axis(scale_linear(
        value,
        in_min,
        in_max,
        AXIS_MIN as i32,
        AXIS_MAX as i32,
    ))
}

fn div_round(num: i64, den: i64) -> i64 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    if num >= 0 {
        (2 * num + den) / (2 * den)
    } else {
        -((-2 * num + den) / (2 * den))
    }
}
