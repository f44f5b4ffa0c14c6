//! Control sources: raw transport samples in, tank outputs out.
//!
//! Every input device is wrapped in a type implementing [`ControlSource`].
//! The poll loop calls [`refresh`](ControlSource::refresh) on each active
//! source, which reads its transport, builds an [`Intent`], runs it through
//! the gear controller and both mixers, and keeps the resulting
//! [`TankOutputs`] for the read-only accessors.
//!
//! | Source | Transport | Gear policy | Starts |
//! |--------|-----------|-------------|--------|
//! | [`GamepadSource`] | [`GamepadInput`] + link bus | Edge (D-pad) | Disconnected |
//! | [`KeyboardSource`] | [`KeyboardInput`] + link bus | Edge (Shift/Ctrl) | Disconnected |
//! | [`RcSource`] | [`PulseInput`] | Absolute (pot channel) | Connected |
//! | [`SerialSource`] | [`LineInput`] | Discrete tokens | Connected |
//!
//! # Example
//!
//! ```rust
//! use tank_control::source::{ControlSource, RefreshResult, SerialSource};
//! use tank_control::hal::MockSerial;
//! use tank_control::Config;
//!
//! let mut serial = MockSerial::new();
//! serial.queue_text("forward_press\nleft_press\n");
//!
//! let mut source = SerialSource::new(serial, &Config::default());
//! let RefreshResult::Updated(intent) = source.refresh(0) else {
//!     panic!("first refresh is never rate limited");
//! };
//! assert_eq!((intent.forward_back, intent.turn), (100, -100));
//!
//! // Gear 1 scales the tracks down to a fifth
//! assert_eq!(source.current_drive(), (0, 40));
//! ```
//!
//! [`GamepadInput`]: crate::traits::GamepadInput
//! [`KeyboardInput`]: crate::traits::KeyboardInput
//! [`PulseInput`]: crate::traits::PulseInput
//! [`LineInput`]: crate::traits::LineInput

mod gamepad;
mod keyboard;
mod rc;
mod serial;

pub use gamepad::GamepadSource;
pub use keyboard::KeyboardSource;
pub use rc::RcSource;
pub use serial::SerialSource;

use alloc::boxed::Box;
use core::fmt;

use tracing::{info, trace};

use crate::gear::{GearController, GearMode, MIN_GEAR};
use crate::intent::Intent;
use crate::link::{DeviceSlot, LinkSubscription, SlotChange};
use crate::mixer::{DriveMixer, TurretMixer};

// ============================================================================
// Source-facing value types
// ============================================================================

/// Whether a source currently has a live device behind it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConnectionState {
    /// Device present and reporting.
    Connected,
    /// No device, or the link was lost.
    Disconnected,
}

/// Which variant a [`ControlSource`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SourceKind {
    /// Wireless gamepad.
    Gamepad,
    /// Wireless keyboard.
    Keyboard,
    /// Hobby RC receiver.
    RcReceiver,
    /// Line-oriented serial commands.
    Serial,
}

impl SourceKind {
    /// Short lowercase name, used in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Gamepad => "gamepad",
            SourceKind::Keyboard => "keyboard",
            SourceKind::RcReceiver => "rc",
            SourceKind::Serial => "serial",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four actuator channels plus fire and gear, as last computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TankOutputs {
    /// Left track, `[-100, 100]`.
    pub left: i8,
    /// Right track, `[-100, 100]`.
    pub right: i8,
    /// Turret rotation rate, `[-100, 100]`.
    pub rotation: i8,
    /// Turret elevation rate, `[-100, 100]`.
    pub elevation: i8,
    /// Flamethrower on.
    pub fire: bool,
    /// Gear in `[1, 5]`.
    pub gear: u8,
}

impl TankOutputs {
    /// Everything at rest in the given gear.
    pub const fn neutral(gear: u8) -> Self {
        Self {
            left: 0,
            right: 0,
            rotation: 0,
            elevation: 0,
            fire: false,
            gear,
        }
    }

    /// True if no channel is moving and fire is off.
    pub fn is_neutral(&self) -> bool {
        self.left == 0 && self.right == 0 && self.rotation == 0 && self.elevation == 0 && !self.fire
    }
}

impl Default for TankOutputs {
    fn default() -> Self {
        Self::neutral(MIN_GEAR)
    }
}

/// Outcome of one [`ControlSource::refresh`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshResult {
    /// A full cycle ran. The caller owns the intent that produced the new
    /// outputs.
    Updated(Intent),
    /// Called again before the refresh interval elapsed; nothing changed.
    RateLimited,
    /// No device. Outputs are neutral.
    Disconnected,
    /// Connected but the transport had nothing new; last outputs held.
    NoData,
}

impl RefreshResult {
    /// The intent, if this was a full cycle.
    pub fn intent(&self) -> Option<&Intent> {
        match self {
            RefreshResult::Updated(intent) => Some(intent),
            _ => None,
        }
    }

    /// Returns true for [`RefreshResult::Updated`].
    pub fn is_updated(&self) -> bool {
        matches!(self, RefreshResult::Updated(_))
    }
}

// ============================================================================
// ControlSource trait
// ============================================================================

/// Polymorphic contract shared by every input variant.
///
/// Object safe: a poll loop can hold `Box<dyn ControlSource>` and switch
/// variants at runtime.
///
/// The accessors report the outputs of the last completed cycle. When the
/// device is absent they keep reporting them, except right after a
/// disconnect transition where the tracks, turret and fire drop to neutral
/// (the gear is kept).
pub trait ControlSource {
    /// Poll the transport and, if the refresh interval has elapsed,
    /// recompute the outputs.
    ///
    /// `now_ms` is a monotonic timestamp; see [`Clock`](crate::traits::Clock).
    fn refresh(&mut self, now_ms: u64) -> RefreshResult;

    /// Current link state.
    fn connection_state(&self) -> ConnectionState;

    /// Which variant this is.
    fn kind(&self) -> SourceKind;

    /// Snapshot of the last computed outputs.
    fn outputs(&self) -> &TankOutputs;

    /// `(left, right)` track speeds.
    fn current_drive(&self) -> (i8, i8) {
        let out = self.outputs();
        (out.left, out.right)
    }

    /// `(rotation, elevation)` turret rates.
    fn current_turret(&self) -> (i8, i8) {
        let out = self.outputs();
        (out.rotation, out.elevation)
    }

    /// Whether the flamethrower is requested.
    fn fire_active(&self) -> bool {
        self.outputs().fire
    }

    /// Current gear, `[1, 5]`.
    fn current_gear(&self) -> u8 {
        self.outputs().gear
    }

    /// Shorthand for `connection_state() == Connected`.
    fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }
}

impl<T: ControlSource + ?Sized> ControlSource for Box<T> {
    fn refresh(&mut self, now_ms: u64) -> RefreshResult {
        (**self).refresh(now_ms)
    }

    fn connection_state(&self) -> ConnectionState {
        (**self).connection_state()
    }

    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    fn outputs(&self) -> &TankOutputs {
        (**self).outputs()
    }
}

// ============================================================================
// Shared per-source state
// ============================================================================

/// Bookkeeping every source variant needs.
///
/// Owns the refresh rate limiter, the gear controller, the output snapshot
/// and the connection state. Variants only decide how to read their
/// transport and how to turn a sample into an [`Intent`]. Public so that
/// out-of-tree sources can reuse it.
#[derive(Clone, Debug)]
pub struct SourceCore {
    kind: SourceKind,
    interval_ms: u64,
    last_update: Option<u64>,
    gear: GearController,
    outputs: TankOutputs,
    state: ConnectionState,
}

impl SourceCore {
    /// Create the core for a source of `kind`.
    pub fn new(kind: SourceKind, mode: GearMode, interval_ms: u32, state: ConnectionState) -> Self {
        let gear = GearController::new(mode);
        Self {
            kind,
            interval_ms: interval_ms as u64,
            last_update: None,
            outputs: TankOutputs::neutral(gear.gear()),
            gear,
            state,
        }
    }

    /// Take a refresh slot if the interval has elapsed since the last one.
    ///
    /// The first call always succeeds.
    pub fn try_begin_cycle(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_update {
            if now_ms.saturating_sub(last) < self.interval_ms {
                return false;
            }
        }
        self.last_update = Some(now_ms);
        true
    }

    /// Feed one intent through the gear controller and both mixers.
    pub fn apply(&mut self, intent: &Intent) {
        self.gear.apply(intent.gear);
        let gear = self.gear.gear();
        let (left, right) = DriveMixer::mix(intent.forward_back, intent.turn, gear);
        let (rotation, elevation) = TurretMixer::mix(intent.turret_yaw, intent.turret_pitch);
        let outputs = TankOutputs {
            left,
            right,
            rotation,
            elevation,
            fire: intent.fire,
            gear,
        };
        if outputs != self.outputs {
            trace!(source = %self.kind, ?outputs, "outputs changed");
        }
        self.outputs = outputs;
    }

    /// Mark the source connected. Returns true on a transition.
    pub fn connect(&mut self) -> bool {
        if self.state == ConnectionState::Connected {
            return false;
        }
        info!(source = %self.kind, "control source connected");
        self.state = ConnectionState::Connected;
        true
    }

    /// Mark the source disconnected. Returns true on a transition.
    ///
    /// On a transition the outputs drop to neutral in the current gear and
    /// the gear controller forgets its shift-signal snapshot.
    pub fn disconnect(&mut self) -> bool {
        if self.state == ConnectionState::Disconnected {
            return false;
        }
        info!(
            source = %self.kind,
            gear = self.gear.gear(),
            "control source disconnected, outputs neutral"
        );
        self.state = ConnectionState::Disconnected;
        self.outputs = TankOutputs::neutral(self.gear.gear());
        self.gear.reset_edges();
        true
    }

    /// Drain link events through `slot`, connecting or disconnecting on
    /// changes to the held device.
    ///
    /// If the subscription overflowed and lost a detach, the held device is
    /// released and the source disconnects.
    pub fn follow_link(&mut self, link: &mut LinkSubscription, slot: &mut DeviceSlot) {
        while let Some(event) = link.poll() {
            match slot.accept(event) {
                Some(SlotChange::Attached(_)) => {
                    self.connect();
                }
                Some(SlotChange::Detached(_)) => {
                    self.disconnect();
                }
                None => {}
            }
        }
        if link.take_lost_detach() && slot.release().is_some() {
            self.disconnect();
        }
    }

    /// Which variant owns this core.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Current link state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Last computed outputs.
    pub fn outputs(&self) -> &TankOutputs {
        &self.outputs
    }

    /// The gear controller.
    pub fn gear(&self) -> &GearController {
        &self.gear
    }

    /// Mutable gear controller, for sources that shift directly.
    pub fn gear_mut(&mut self) -> &mut GearController {
        &mut self.gear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::GearRequest;
    use crate::link::{DeviceClass, DeviceHandle, LinkBus, LinkEvent};

    fn core() -> SourceCore {
        SourceCore::new(
            SourceKind::Keyboard,
            GearMode::Edge,
            50,
            ConnectionState::Connected,
        )
    }

    // =========================================================================
    // Rate limiting
    // =========================================================================

    #[test]
    fn first_cycle_is_never_rate_limited() {
        let mut c = core();
        assert!(c.try_begin_cycle(1_000_000));
    }

    #[test]
    fn cycles_are_spaced_by_interval() {
        let mut c = core();
        assert!(c.try_begin_cycle(0));
        assert!(!c.try_begin_cycle(10));
        assert!(!c.try_begin_cycle(49));
        assert!(c.try_begin_cycle(50));
        assert!(!c.try_begin_cycle(99));
        assert!(c.try_begin_cycle(100));
    }

    #[test]
    fn rejected_call_does_not_move_the_window() {
        let mut c = core();
        c.try_begin_cycle(0);
        c.try_begin_cycle(30);
        assert!(c.try_begin_cycle(50));
    }

    // =========================================================================
    // Apply
    // =========================================================================

    #[test]
    fn apply_mixes_with_current_gear() {
        let mut c = core();
        c.apply(&Intent {
            forward_back: 100,
            turret_yaw: -100,
            fire: true,
            ..Intent::neutral()
        });
        assert_eq!(
            *c.outputs(),
            TankOutputs {
                left: 20,
                right: 20,
                rotation: -100,
                elevation: 0,
                fire: true,
                gear: 1,
            }
        );
    }

    #[test]
    fn apply_shifts_before_mixing() {
        let mut c = core();
        c.apply(&Intent {
            forward_back: 100,
            gear: GearRequest::Edge {
                up: true,
                down: false,
            },
            ..Intent::neutral()
        });
        assert_eq!(c.outputs().gear, 2);
        assert_eq!((c.outputs().left, c.outputs().right), (40, 40));
    }

    // =========================================================================
    // Connection transitions
    // =========================================================================

    #[test]
    fn disconnect_resets_outputs_but_keeps_gear() {
        let mut c = core();
        c.gear_mut().shift_up();
        c.apply(&Intent {
            forward_back: 100,
            fire: true,
            ..Intent::neutral()
        });
        assert!(!c.outputs().is_neutral());

        assert!(c.disconnect());
        assert_eq!(*c.outputs(), TankOutputs::neutral(2));
        assert_eq!(c.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn disconnect_twice_is_one_transition() {
        let mut c = core();
        assert!(c.disconnect());
        assert!(!c.disconnect());
        assert!(c.connect());
        assert!(!c.connect());
    }

    #[test]
    fn disconnect_forgets_held_shift_button() {
        let mut c = core();
        let held = Intent {
            gear: GearRequest::Edge {
                up: true,
                down: false,
            },
            ..Intent::neutral()
        };
        c.apply(&held);
        assert_eq!(c.outputs().gear, 2);

        c.disconnect();
        c.connect();
        // Still held at reconnect: counts as a new press
        c.apply(&held);
        assert_eq!(c.outputs().gear, 3);
    }

    #[test]
    fn follow_link_tracks_matching_device() {
        let mut bus = LinkBus::new();
        let mut link = bus.subscribe();
        let mut slot = DeviceSlot::new(DeviceClass::Gamepad);
        let mut c = SourceCore::new(
            SourceKind::Gamepad,
            GearMode::Edge,
            50,
            ConnectionState::Disconnected,
        );

        bus.publish(LinkEvent::Attached {
            handle: DeviceHandle(7),
            class: DeviceClass::Keyboard,
        });
        c.follow_link(&mut link, &mut slot);
        assert_eq!(c.state(), ConnectionState::Disconnected);

        bus.publish(LinkEvent::Attached {
            handle: DeviceHandle(3),
            class: DeviceClass::Gamepad,
        });
        c.follow_link(&mut link, &mut slot);
        assert_eq!(c.state(), ConnectionState::Connected);

        bus.publish(LinkEvent::Detached {
            handle: DeviceHandle(3),
        });
        c.follow_link(&mut link, &mut slot);
        assert_eq!(c.state(), ConnectionState::Disconnected);
    }

    // =========================================================================
    // Value types
    // =========================================================================

    #[test]
    fn default_outputs_are_neutral_in_first_gear() {
        assert_eq!(TankOutputs::default(), TankOutputs::neutral(1));
        assert!(TankOutputs::default().is_neutral());
    }

    #[test]
    fn source_kind_names() {
        assert_eq!(SourceKind::RcReceiver.as_str(), "rc");
        assert_eq!(alloc::format!("{}", SourceKind::Serial), "serial");
    }

    #[test]
    fn refresh_result_accessors() {
        let r = RefreshResult::Updated(Intent::neutral());
        assert!(r.is_updated());
        assert_eq!(r.intent(), Some(&Intent::neutral()));
        assert!(RefreshResult::NoData.intent().is_none());
    }
}
