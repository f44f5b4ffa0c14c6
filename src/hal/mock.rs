//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for every transport and actuator
//! trait, enabling development and testing on desktop without a vehicle.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockActuators`] | [`Actuators`] | Records track/turret/fire commands |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockGamepad`] | [`GamepadInput`] | Settable gamepad report |
//! | [`MockKeyboard`] | [`KeyboardInput`] | Settable key state |
//! | [`MockReceiver`] | [`PulseInput`] | Settable pulse width per channel |
//! | [`MockSerial`] | [`LineInput`] | Queued lines, open/closed link |
//!
//! # Example
//!
//! ```rust
//! use tank_control::hal::{MockActuators, MockSerial};
//! use tank_control::source::SerialSource;
//! use tank_control::{Config, TankController};
//!
//! let mut serial = MockSerial::new();
//! serial.queue_text("gear_up\nforward_press\n");
//!
//! let source = SerialSource::new(serial, &Config::default());
//! let mut tank = TankController::new(source, MockActuators::new());
//! tank.tick(0).unwrap();
//!
//! assert_eq!(tank.actuators().tracks, (40, 40));
//! ```
//!
//! [`Actuators`]: crate::traits::Actuators
//! [`Clock`]: crate::traits::Clock
//! [`GamepadInput`]: crate::traits::GamepadInput
//! [`KeyboardInput`]: crate::traits::KeyboardInput
//! [`PulseInput`]: crate::traits::PulseInput
//! [`LineInput`]: crate::traits::LineInput

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::link::DeviceHandle;
use crate::traits::{
    Actuators, Clock, GamepadInput, GamepadState, Key, KeyboardInput, Line, LineInput, PulseInput,
};

// ============================================================================
// Actuator and Clock Mocks
// ============================================================================

/// Mock actuator layer for testing.
///
/// Records the last value sent to each channel. Use the public fields to
/// inspect state after test operations.
///
/// # Example
///
/// ```rust
/// use tank_control::hal::MockActuators;
/// use tank_control::traits::Actuators;
///
/// let mut act = MockActuators::new();
/// act.set_tracks(50, -50).unwrap();
/// act.set_turret(0, 100).unwrap();
///
/// assert_eq!(act.tracks, (50, -50));
/// assert_eq!(act.turret, (0, 100));
/// assert_eq!(act.call_count, 2);
///
/// act.fail = true;
/// assert!(act.set_flamethrower(true).is_err());
/// ```
#[derive(Debug, Default)]
pub struct MockActuators {
    /// Last `(left, right)` track command.
    pub tracks: (i8, i8),
    /// Last `(rotation, elevation)` turret command.
    pub turret: (i8, i8),
    /// Flamethrower relay state.
    pub flamethrower: bool,
    /// Number of successful actuator calls.
    pub call_count: usize,
    /// When set, every call fails and leaves state untouched.
    pub fail: bool,
}

impl MockActuators {
    /// Creates a new mock with everything at rest.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.call_count += 1;
        Ok(())
    }
}

impl Actuators for MockActuators {
    type Error = ();

    fn set_tracks(&mut self, left: i8, right: i8) -> Result<(), ()> {
        self.record()?;
        self.tracks = (left, right);
        Ok(())
    }

    fn set_turret(&mut self, rotation: i8, elevation: i8) -> Result<(), ()> {
        self.record()?;
        self.turret = (rotation, elevation);
        Ok(())
    }

    fn set_flamethrower(&mut self, active: bool) -> Result<(), ()> {
        self.record()?;
        self.flamethrower = active;
        Ok(())
    }
}

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
///
/// # Example
///
/// ```rust
/// use tank_control::hal::MockClock;
/// use tank_control::traits::Clock;
///
/// let mut clock = MockClock::new();
/// clock.set(1000);
/// clock.advance(50);
/// assert_eq!(clock.now_ms(), 1050);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

// ============================================================================
// Input Mocks
// ============================================================================

/// Mock gamepad transport.
///
/// Returns the same report for any handle until it is changed or cleared.
#[derive(Debug, Default)]
pub struct MockGamepad {
    /// Report returned by `read`, `None` simulates a missing report.
    pub state: Option<GamepadState>,
    /// Number of `read` calls.
    pub reads: usize,
    /// Handle passed to the most recent `read`.
    pub last_handle: Option<DeviceHandle>,
}

impl MockGamepad {
    /// Creates a mock with no report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the report returned from now on.
    pub fn set(&mut self, state: GamepadState) {
        self.state = Some(state);
    }

    /// Stop returning reports.
    pub fn clear(&mut self) {
        self.state = None;
    }
}

impl GamepadInput for MockGamepad {
    fn read(&mut self, handle: DeviceHandle) -> Option<GamepadState> {
        self.reads += 1;
        self.last_handle = Some(handle);
        self.state
    }
}

/// Mock keyboard transport.
///
/// # Example
///
/// ```rust
/// use tank_control::hal::MockKeyboard;
/// use tank_control::link::DeviceHandle;
/// use tank_control::traits::{Key, KeyboardInput};
///
/// let mut kb = MockKeyboard::new();
/// kb.press(Key::W);
/// assert!(kb.is_key_pressed(DeviceHandle(0), Key::W));
///
/// kb.release_all();
/// assert!(!kb.is_key_pressed(DeviceHandle(0), Key::W));
/// ```
#[derive(Debug, Default)]
pub struct MockKeyboard {
    /// Keys currently held.
    pub pressed: Vec<Key>,
}

impl MockKeyboard {
    /// Creates a mock with no keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `key`.
    pub fn press(&mut self, key: Key) {
        if !self.pressed.contains(&key) {
            self.pressed.push(key);
        }
    }

    /// Let go of `key`.
    pub fn release(&mut self, key: Key) {
        self.pressed.retain(|&k| k != key);
    }

    /// Let go of everything.
    pub fn release_all(&mut self) {
        self.pressed.clear();
    }
}

impl KeyboardInput for MockKeyboard {
    fn is_key_pressed(&self, _handle: DeviceHandle, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

/// Channels a [`MockReceiver`] can simulate.
pub const MOCK_RC_CHANNELS: usize = 16;

/// Mock RC receiver.
///
/// Each channel either answers with a fixed pulse width or times out.
#[derive(Debug, Default)]
pub struct MockReceiver {
    /// Pulse width per channel; `None` times out.
    pub pulses: [Option<u16>; MOCK_RC_CHANNELS],
    /// Number of `read_pulse_us` calls.
    pub reads: usize,
    /// Timeout passed to the most recent read.
    pub last_timeout_us: Option<u32>,
}

impl MockReceiver {
    /// Creates a receiver with every channel silent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `channel` answer with `us`.
    pub fn set_pulse(&mut self, channel: u8, us: u16) {
        if let Some(slot) = self.pulses.get_mut(channel as usize) {
            *slot = Some(us);
        }
    }

    /// Make `channel` time out.
    pub fn drop_channel(&mut self, channel: u8) {
        if let Some(slot) = self.pulses.get_mut(channel as usize) {
            *slot = None;
        }
    }

    /// Make every channel time out (transmitter off).
    pub fn drop_all(&mut self) {
        self.pulses = [None; MOCK_RC_CHANNELS];
    }
}

impl PulseInput for MockReceiver {
    fn read_pulse_us(&mut self, channel: u8, timeout_us: u32) -> Option<u16> {
        self.reads += 1;
        self.last_timeout_us = Some(timeout_us);
        self.pulses.get(channel as usize).copied().flatten()
    }
}

/// Mock serial line.
///
/// # Example
///
/// ```rust
/// use tank_control::hal::MockSerial;
/// use tank_control::traits::LineInput;
///
/// let mut serial = MockSerial::new();
/// serial.queue_text("fire_press\ngear_up\n");
///
/// assert_eq!(serial.read_line().as_deref(), Some("fire_press"));
/// assert_eq!(serial.read_line().as_deref(), Some("gear_up"));
/// assert!(serial.read_line().is_none());
/// ```
#[derive(Debug)]
pub struct MockSerial {
    /// Lines waiting to be read.
    pub lines: VecDeque<Line>,
    /// Link state reported by `is_open`.
    pub open: bool,
}

impl MockSerial {
    /// Creates an open line with nothing buffered.
    pub fn new() -> Self {
        Self {
            lines: VecDeque::new(),
            open: true,
        }
    }

    /// Queue one line. Text beyond the line capacity is cut off.
    pub fn queue_line(&mut self, text: &str) {
        let mut line = Line::new();
        for c in text.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        self.lines.push_back(line);
    }

    /// Queue newline-separated text, one line per `\n`.
    pub fn queue_text(&mut self, text: &str) {
        for line in text.split_terminator('\n') {
            self.queue_line(line);
        }
    }

    /// Returns true if every queued line has been read.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for MockSerial {
    fn default() -> Self {
        Self::new()
    }
}

impl LineInput for MockSerial {
    fn read_line(&mut self) -> Option<Line> {
        self.lines.pop_front()
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
