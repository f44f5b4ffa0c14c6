//! Wireless gamepad source.
//!
//! Left stick drives, right stick aims the turret, the D-pad shifts gears
//! and the south face button fires. Stick Y axes report negative when
//! pushed up, so both are inverted: up is forward and up is elevate.

use tracing::debug;

use crate::config::{AxisPolicy, Config, GamepadConfig};
use crate::deadzone::DeadZoneFilter;
use crate::gear::{GearController, GearMode};
use crate::intent::{GearRequest, Intent};
use crate::link::{DeviceClass, DeviceHandle, DeviceSlot, LinkSubscription};
use crate::mixer::{proportional_axis, ternary_axis};
use crate::source::{
    ConnectionState, ControlSource, RefreshResult, SourceCore, SourceKind, TankOutputs,
};
use crate::traits::{GamepadInput, GamepadState};

/// [`ControlSource`] backed by a gamepad on the link bus.
///
/// Starts disconnected and connects when a [`DeviceClass::Gamepad`] attach
/// event arrives on its subscription.
///
/// ```rust
/// use tank_control::config::Config;
/// use tank_control::hal::MockGamepad;
/// use tank_control::link::{DeviceClass, DeviceHandle, LinkBus, LinkEvent};
/// use tank_control::source::{ControlSource, GamepadSource};
/// use tank_control::traits::GamepadState;
///
/// let mut bus = LinkBus::new();
/// let mut pad = GamepadSource::new(MockGamepad::new(), bus.subscribe(), &Config::default());
/// assert!(!pad.is_connected());
///
/// bus.publish(LinkEvent::Attached { handle: DeviceHandle(0), class: DeviceClass::Gamepad });
/// pad.input_mut().set(GamepadState { axis_y: -512, ..Default::default() });
/// pad.refresh(0);
///
/// assert!(pad.is_connected());
/// assert_eq!(pad.current_drive(), (20, 20));
/// ```
#[derive(Debug)]
pub struct GamepadSource<G> {
    input: G,
    link: LinkSubscription,
    slot: DeviceSlot,
    dead_zone: DeadZoneFilter,
    config: GamepadConfig,
    core: SourceCore,
}

impl<G: GamepadInput> GamepadSource<G> {
    /// Create a disconnected gamepad source listening on `link`.
    pub fn new(input: G, link: LinkSubscription, config: &Config) -> Self {
        Self {
            input,
            link,
            slot: DeviceSlot::new(DeviceClass::Gamepad),
            dead_zone: DeadZoneFilter::new(config.gamepad.dead_zone),
            config: config.gamepad,
            core: SourceCore::new(
                SourceKind::Gamepad,
                GearMode::Edge,
                config.control.update_interval_ms,
                ConnectionState::Disconnected,
            ),
        }
    }

    /// The device currently driving this source.
    pub fn device(&self) -> Option<DeviceHandle> {
        self.slot.held()
    }

    /// Current gear controller state.
    pub fn gear(&self) -> &GearController {
        self.core.gear()
    }

    /// Borrow the transport.
    pub fn input(&self) -> &G {
        &self.input
    }

    /// Mutably borrow the transport.
    pub fn input_mut(&mut self) -> &mut G {
        &mut self.input
    }

    /// Resolve one report into intent.
    pub fn intent_from(&self, state: &GamepadState) -> Intent {
        Intent {
            forward_back: self.axis(state.axis_y, true),
            turn: self.axis(state.axis_x, false),
            turret_yaw: self.axis(state.axis_rx, false),
            turret_pitch: self.axis(state.axis_ry, true),
            fire: state.a,
            gear: GearRequest::Edge {
                up: state.dpad.is_up(),
                down: state.dpad.is_down(),
            },
        }
    }

    fn axis(&self, raw: i16, inverted: bool) -> i8 {
        let value = self.dead_zone.apply(raw);
        match self.config.axis_policy {
            AxisPolicy::Proportional => {
                let (lo, hi) = (self.config.axis_min as i32, self.config.axis_max as i32);
                if inverted {
                    proportional_axis(value as i32, hi, lo)
                } else {
                    proportional_axis(value as i32, lo, hi)
                }
            }
            AxisPolicy::Ternary => {
                let v = ternary_axis(value);
                if inverted {
                    -v
                } else {
                    v
                }
            }
        }
    }
}

impl<G: GamepadInput> ControlSource for GamepadSource<G> {
    fn refresh(&mut self, now_ms: u64) -> RefreshResult {
        self.core.follow_link(&mut self.link, &mut self.slot);
        let Some(handle) = self.slot.held() else {
            return RefreshResult::Disconnected;
        };
        if !self.core.try_begin_cycle(now_ms) {
            return RefreshResult::RateLimited;
        }
        let Some(state) = self.input.read(handle) else {
            debug!(handle = handle.0, "no gamepad report this cycle");
            return RefreshResult::NoData;
        };

        let intent = self.intent_from(&state);
        self.core.apply(&intent);
        RefreshResult::Updated(intent)
    }

    fn connection_state(&self) -> ConnectionState {
        self.core.state()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Gamepad
    }

    fn outputs(&self) -> &TankOutputs {
        self.core.outputs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockGamepad;
    use crate::link::{LinkBus, LinkEvent};
    use crate::traits::Dpad;

    fn attached(config: &Config) -> (LinkBus, GamepadSource<MockGamepad>) {
        let mut bus = LinkBus::new();
        let pad = GamepadSource::new(MockGamepad::new(), bus.subscribe(), config);
        bus.publish(LinkEvent::Attached {
            handle: DeviceHandle(1),
            class: DeviceClass::Gamepad,
        });
        (bus, pad)
    }

    fn stick(axis_x: i16, axis_y: i16) -> GamepadState {
        GamepadState {
            axis_x,
            axis_y,
            ..Default::default()
        }
    }

    // =========================================================================
    // Connection
    // =========================================================================

    #[test]
    fn starts_disconnected_without_device() {
        let mut bus = LinkBus::new();
        let mut pad = GamepadSource::new(MockGamepad::new(), bus.subscribe(), &Config::default());
        assert_eq!(pad.refresh(0), RefreshResult::Disconnected);
        assert_eq!(pad.connection_state(), ConnectionState::Disconnected);
        assert_eq!(pad.input().reads, 0);
    }

    #[test]
    fn attach_connects_and_reads() {
        let (_bus, mut pad) = attached(&Config::default());
        pad.input_mut().set(stick(0, 0));
        assert!(pad.refresh(0).is_updated());
        assert_eq!(pad.device(), Some(DeviceHandle(1)));
        assert_eq!(pad.input().reads, 1);
    }

    #[test]
    fn keyboard_attach_is_ignored() {
        let mut bus = LinkBus::new();
        let mut pad = GamepadSource::new(MockGamepad::new(), bus.subscribe(), &Config::default());
        bus.publish(LinkEvent::Attached {
            handle: DeviceHandle(2),
            class: DeviceClass::Keyboard,
        });
        assert_eq!(pad.refresh(0), RefreshResult::Disconnected);
    }

    #[test]
    fn detach_mid_command_goes_neutral() {
        let (mut bus, mut pad) = attached(&Config::default());
        pad.input_mut().set(GamepadState {
            axis_y: -512,
            a: true,
            ..Default::default()
        });
        pad.refresh(0);
        assert_eq!(pad.current_drive(), (20, 20));
        assert!(pad.fire_active());

        bus.publish(LinkEvent::Detached {
            handle: DeviceHandle(1),
        });
        assert_eq!(pad.refresh(10), RefreshResult::Disconnected);
        assert_eq!(*pad.outputs(), TankOutputs::neutral(1));
    }

    #[test]
    fn missing_report_holds_outputs() {
        let (_bus, mut pad) = attached(&Config::default());
        pad.input_mut().set(stick(511, 0));
        pad.refresh(0);
        let before = *pad.outputs();

        pad.input_mut().clear();
        assert_eq!(pad.refresh(50), RefreshResult::NoData);
        assert_eq!(*pad.outputs(), before);
    }

    // =========================================================================
    // Axis mapping
    // =========================================================================

    #[test]
    fn stick_up_is_forward_full_scale() {
        let (_bus, pad) = attached(&Config::default());
        let intent = pad.intent_from(&stick(0, -512));
        assert_eq!(intent.forward_back, 100);
        let intent = pad.intent_from(&stick(0, 511));
        assert_eq!(intent.forward_back, -100);
    }

    #[test]
    fn stick_right_is_right_turn() {
        let (_bus, pad) = attached(&Config::default());
        assert_eq!(pad.intent_from(&stick(511, 0)).turn, 100);
        assert_eq!(pad.intent_from(&stick(-512, 0)).turn, -100);
    }

    #[test]
    fn proportional_axis_is_linear() {
        let (_bus, pad) = attached(&Config::default());
        // Halfway deflection lands near half scale
        let turn = pad.intent_from(&stick(256, 0)).turn;
        assert!((49..=51).contains(&turn), "turn = {turn}");
    }

    #[test]
    fn dead_zone_snaps_to_zero() {
        let (_bus, pad) = attached(&Config::default());
        let intent = pad.intent_from(&GamepadState {
            axis_x: 99,
            axis_y: -99,
            axis_rx: -60,
            axis_ry: 1,
            ..Default::default()
        });
        assert!(intent.is_neutral());
    }

    #[test]
    fn right_stick_aims_turret() {
        let (_bus, pad) = attached(&Config::default());
        let intent = pad.intent_from(&GamepadState {
            axis_rx: -512,
            axis_ry: -512,
            ..Default::default()
        });
        assert_eq!((intent.turret_yaw, intent.turret_pitch), (-100, 100));
    }

    #[test]
    fn ternary_policy_buckets_deflection() {
        let config = Config::default().with_gamepad(
            GamepadConfig::default().with_axis_policy(AxisPolicy::Ternary),
        );
        let (_bus, pad) = attached(&config);
        let intent = pad.intent_from(&stick(150, -150));
        assert_eq!((intent.forward_back, intent.turn), (100, 100));
        let intent = pad.intent_from(&stick(99, 0));
        assert_eq!(intent.turn, 0);
    }

    // =========================================================================
    // Gear and fire
    // =========================================================================

    #[test]
    fn dpad_held_shifts_once() {
        let (_bus, mut pad) = attached(&Config::default());
        pad.input_mut().set(GamepadState {
            dpad: Dpad::UpLeft,
            ..Default::default()
        });
        for t in 0..5 {
            pad.refresh(t * 50);
        }
        assert_eq!(pad.current_gear(), 2);

        pad.input_mut().set(GamepadState::default());
        pad.refresh(250);
        pad.input_mut().set(GamepadState {
            dpad: Dpad::Up,
            ..Default::default()
        });
        pad.refresh(300);
        assert_eq!(pad.current_gear(), 3);
    }

    #[test]
    fn dpad_down_shifts_down() {
        let (_bus, mut pad) = attached(&Config::default());
        pad.input_mut().set(GamepadState {
            dpad: Dpad::Up,
            ..Default::default()
        });
        pad.refresh(0);
        pad.input_mut().set(GamepadState {
            dpad: Dpad::DownRight,
            ..Default::default()
        });
        pad.refresh(50);
        assert_eq!(pad.current_gear(), 1);
    }

    #[test]
    fn button_a_fires() {
        let (_bus, mut pad) = attached(&Config::default());
        pad.input_mut().set(GamepadState {
            a: true,
            ..Default::default()
        });
        let RefreshResult::Updated(intent) = pad.refresh(0) else {
            panic!("expected a full cycle");
        };
        assert!(intent.fire);
        assert!(pad.fire_active());
    }

    #[test]
    fn fast_calls_are_rate_limited() {
        let (_bus, mut pad) = attached(&Config::default());
        pad.input_mut().set(stick(0, 0));
        assert!(pad.refresh(100).is_updated());
        assert_eq!(pad.refresh(120), RefreshResult::RateLimited);
        assert_eq!(pad.input().reads, 1);
    }
}
