//! Wireless keyboard source.
//!
//! | Keys | Action |
//! |------|--------|
//! | W / S | Forward / back |
//! | A / D | Turn left / right |
//! | Q, Left / E, Right | Turret left / right |
//! | Up / Down | Turret elevate / lower |
//! | Space | Fire |
//! | Shift (either) | Gear up |
//! | Ctrl (either) | Gear down |
//!
//! Opposing drive keys cancel out. For the turret, left beats right and
//! elevate beats lower.

use crate::config::Config;
use crate::gear::GearMode;
use crate::intent::{GearRequest, Intent};
use crate::link::{DeviceClass, DeviceHandle, DeviceSlot, LinkSubscription};
use crate::mixer::{DriveMixer, TurretMixer};
use crate::source::{
    ConnectionState, ControlSource, RefreshResult, SourceCore, SourceKind, TankOutputs,
};
use crate::traits::{Key, KeyboardInput};

const TURRET_LEFT: &[Key] = &[Key::Q, Key::LeftArrow];
const TURRET_RIGHT: &[Key] = &[Key::E, Key::RightArrow];
const SHIFT: &[Key] = &[Key::LeftShift, Key::RightShift];
const CTRL: &[Key] = &[Key::LeftCtrl, Key::RightCtrl];

/// [`ControlSource`] backed by a keyboard on the link bus.
#[derive(Debug)]
pub struct KeyboardSource<K> {
    input: K,
    link: LinkSubscription,
    slot: DeviceSlot,
    core: SourceCore,
}

impl<K: KeyboardInput> KeyboardSource<K> {
    /// Create a disconnected keyboard source listening on `link`.
    pub fn new(input: K, link: LinkSubscription, config: &Config) -> Self {
        Self {
            input,
            link,
            slot: DeviceSlot::new(DeviceClass::Keyboard),
            core: SourceCore::new(
                SourceKind::Keyboard,
                GearMode::Edge,
                config.control.update_interval_ms,
                ConnectionState::Disconnected,
            ),
        }
    }

    /// The keyboard currently driving this source.
    pub fn device(&self) -> Option<DeviceHandle> {
        self.slot.held()
    }

    /// Borrow the transport.
    pub fn input(&self) -> &K {
        &self.input
    }

    /// Mutably borrow the transport.
    pub fn input_mut(&mut self) -> &mut K {
        &mut self.input
    }

    fn read_intent(&self, handle: DeviceHandle) -> Intent {
        let held = |key| self.input.is_key_pressed(handle, key);
        let any = |keys: &[Key]| self.input.any_pressed(handle, keys);

        Intent {
            forward_back: DriveMixer::axis_from_buttons(held(Key::S), held(Key::W)),
            turn: DriveMixer::axis_from_buttons(held(Key::A), held(Key::D)),
            turret_yaw: TurretMixer::rotation_from_buttons(any(TURRET_LEFT), any(TURRET_RIGHT)),
            turret_pitch: TurretMixer::elevation_from_buttons(
                held(Key::UpArrow),
                held(Key::DownArrow),
            ),
            fire: held(Key::Space),
            gear: GearRequest::Edge {
                up: any(SHIFT),
                down: any(CTRL),
            },
        }
    }
}

impl<K: KeyboardInput> ControlSource for KeyboardSource<K> {
    fn refresh(&mut self, now_ms: u64) -> RefreshResult {
        self.core.follow_link(&mut self.link, &mut self.slot);
        let Some(handle) = self.slot.held() else {
            return RefreshResult::Disconnected;
        };
        if !self.core.try_begin_cycle(now_ms) {
            return RefreshResult::RateLimited;
        }

        let intent = self.read_intent(handle);
        self.core.apply(&intent);
        RefreshResult::Updated(intent)
    }

    fn connection_state(&self) -> ConnectionState {
        self.core.state()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Keyboard
    }

    fn outputs(&self) -> &TankOutputs {
        self.core.outputs()
    }
}
