//! Gear state machine.
//!
//! The gear is an integer in `[1, 5]` acting as a global speed governor on
//! both tracks. It is the only quantity that persists across control cycles
//! and it is mutated exclusively through [`GearController`].
//!
//! Two transition policies exist, fixed per controller instance:
//!
//! - [`GearMode::Edge`]: discrete shifting on rising edges of the shift-up /
//!   shift-down signals. Holding a button shifts exactly once.
//! - [`GearMode::Absolute`]: gear follows a proportional input (an RC
//!   potentiometer channel) with no memory of previous readings.
//!
//! # Example
//!
//! ```rust
//! use tank_control::GearController;
//!
//! let mut gear = GearController::edge();
//! assert_eq!(gear.gear(), 1);
//!
//! // Held across three frames: one shift, not three
//! gear.apply_edge(true, false);
//! gear.apply_edge(true, false);
//! gear.apply_edge(true, false);
//! assert_eq!(gear.gear(), 2);
//!
//! let mut pot = GearController::absolute();
//! pot.apply_absolute(1500, 1000, 2000);
//! assert_eq!(pot.gear(), 3);
//! ```

use tracing::{debug, info, warn};

use crate::intent::GearRequest;
use crate::mixer::scale_linear;

/// Lowest gear.
pub const MIN_GEAR: u8 = 1;

/// Highest gear; full track authority.
pub const MAX_GEAR: u8 = 5;

/// Which transition policy a [`GearController`] follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GearMode {
    /// One shift per rising edge of a shift signal.
    Edge,
    /// Gear set directly from a proportional reading.
    Absolute,
}

/// Gear state machine with edge-triggered or absolute transitions.
///
/// Starts in gear 1. There is no terminal state.
#[derive(Clone, Debug)]
pub struct GearController {
    gear: u8,
    mode: GearMode,
    prev_up: bool,
    prev_down: bool,
}

impl GearController {
    /// Create a controller in gear 1 using `mode`.
    pub const fn new(mode: GearMode) -> Self {
        Self {
            gear: MIN_GEAR,
            mode,
            prev_up: false,
            prev_down: false,
        }
    }

    /// Shorthand for `GearController::new(GearMode::Edge)`.
    pub const fn edge() -> Self {
        Self::new(GearMode::Edge)
    }

    /// Shorthand for `GearController::new(GearMode::Absolute)`.
    pub const fn absolute() -> Self {
        Self::new(GearMode::Absolute)
    }

    /// Current gear, always in `[1, 5]`.
    #[inline]
    pub fn gear(&self) -> u8 {
        self.gear
    }

    /// The policy this controller was built with.
    pub fn mode(&self) -> GearMode {
        self.mode
    }

    /// Dispatch a per-cycle request to the matching transition.
    ///
    /// Returns true if the gear changed. A request from the other policy
    /// family is ignored.
    pub fn apply(&mut self, request: GearRequest) -> bool {
        match request {
            GearRequest::Hold => false,
            GearRequest::Edge { up, down } => self.apply_edge(up, down),
            GearRequest::Absolute { raw, min, max } => self.apply_absolute(raw, min, max),
        }
    }

    /// Edge-triggered transition.
    ///
    /// Rising edges are detected against the previous call's signals. On a
    /// simultaneous up and down rising edge, up wins and down is dropped.
    /// The stored snapshot is updated on every call.
    pub fn apply_edge(&mut self, up: bool, down: bool) -> bool {
        if self.mode != GearMode::Edge {
            warn!(mode = ?self.mode, "edge shift ignored by absolute gear controller");
            return false;
        }

        let rising_up = up && !self.prev_up;
        let rising_down = down && !self.prev_down;
        self.prev_up = up;
        self.prev_down = down;

        if rising_up {
            self.shift_up()
        } else if rising_down {
            self.shift_down()
        } else {
            false
        }
    }

    /// Absolute transition: map `raw` from `[min, max]` onto `[1, 5]`.
    ///
    /// Rounds to the nearest gear (halves away from zero) and clamps, so
    /// readings outside the calibrated range and reversed ranges never fail.
    pub fn apply_absolute(&mut self, raw: i32, min: i32, max: i32) -> bool {
        if self.mode != GearMode::Absolute {
            warn!(mode = ?self.mode, "absolute gear reading ignored by edge gear controller");
            return false;
        }

        let mapped = scale_linear(raw, min, max, MIN_GEAR as i32, MAX_GEAR as i32)
            .clamp(MIN_GEAR as i32, MAX_GEAR as i32) as u8;
        if mapped == self.gear {
            return false;
        }
        debug!(raw, from = self.gear, to = mapped, "absolute gear change");
        self.gear = mapped;
        true
    }

    /// Shift up one gear, saturating at 5.
    ///
    /// Used directly by sources whose shift events already arrive as
    /// discrete edges (serial `gear_up` tokens).
    pub fn shift_up(&mut self) -> bool {
        if self.gear >= MAX_GEAR {
            return false;
        }
        self.gear += 1;
        info!(gear = self.gear, "gear shifted up");
        true
    }

    /// Shift down one gear, saturating at 1.
    pub fn shift_down(&mut self) -> bool {
        if self.gear <= MIN_GEAR {
            return false;
        }
        self.gear -= 1;
        info!(gear = self.gear, "gear shifted down");
        true
    }

    /// Forget the previous shift-signal snapshot.
    ///
    /// Called when a source loses its device so that a button still held at
    /// reconnect counts as a fresh press.
    pub fn reset_edges(&mut self) {
        self.prev_up = false;
        self.prev_down = false;
    }
}

impl Default for GearController {
    fn default() -> Self {
        Self::edge()
    }
}
