//! Raw-sample reader traits for each input transport.
//!
//! These are the upstream collaborators of the control sources. HID report
//! parsing, pulse-width timing and serial tokenizing all happen behind
//! them; the sources only see the decoded samples.
//!
//! | Trait | Used by | Sample |
//! |-------|---------|--------|
//! | [`GamepadInput`] | [`GamepadSource`] | Stick axes, D-pad, buttons |
//! | [`KeyboardInput`] | [`KeyboardSource`] | Per-key pressed state |
//! | [`PulseInput`] | [`RcSource`] | Pulse width per channel (µs) |
//! | [`LineInput`] | [`SerialSource`] | Newline-delimited text |
//!
//! [`GamepadSource`]: crate::source::GamepadSource
//! [`KeyboardSource`]: crate::source::KeyboardSource
//! [`RcSource`]: crate::source::RcSource
//! [`SerialSource`]: crate::source::SerialSource

use heapless::String as HString;

use crate::link::DeviceHandle;

/// Maximum length of one serial line.
pub const MAX_LINE_LEN: usize = 64;

/// One line of serial input, without its terminator.
pub type Line = HString<MAX_LINE_LEN>;

// ============================================================================
// Gamepad
// ============================================================================

/// Direction reported by a gamepad D-pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Dpad {
    /// Nothing pressed.
    #[default]
    Centered,
    /// Up.
    Up,
    /// Up and right.
    UpRight,
    /// Right.
    Right,
    /// Down and right.
    DownRight,
    /// Down.
    Down,
    /// Down and left.
    DownLeft,
    /// Left.
    Left,
    /// Up and left.
    UpLeft,
}

impl Dpad {
    /// True for any direction with an upward component.
    pub fn is_up(&self) -> bool {
        matches!(self, Dpad::Up | Dpad::UpLeft | Dpad::UpRight)
    }

    /// True for any direction with a downward component.
    pub fn is_down(&self) -> bool {
        matches!(self, Dpad::Down | Dpad::DownLeft | Dpad::DownRight)
    }
}

/// One decoded gamepad report.
///
/// Axes are signed on a raw domain of roughly `[-512, 511]`. Y axes are
/// negative when the stick is pushed up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GamepadState {
    /// Left stick X (drive turn).
    pub axis_x: i16,
    /// Left stick Y (drive forward/back).
    pub axis_y: i16,
    /// Right stick X (turret rotation).
    pub axis_rx: i16,
    /// Right stick Y (turret elevation).
    pub axis_ry: i16,
    /// D-pad direction (gear shifting).
    pub dpad: Dpad,
    /// South face button (fire).
    pub a: bool,
}

/// Gamepad transport.
pub trait GamepadInput {
    /// Latest report for `handle`, or `None` if the device has none yet.
    fn read(&mut self, handle: DeviceHandle) -> Option<GamepadState>;
}

// ============================================================================
// Keyboard
// ============================================================================

/// Keys the keyboard source looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    /// W
    W,
    /// A
    A,
    /// S
    S,
    /// D
    D,
    /// Q
    Q,
    /// E
    E,
    /// Up arrow
    UpArrow,
    /// Down arrow
    DownArrow,
    /// Left arrow
    LeftArrow,
    /// Right arrow
    RightArrow,
    /// Space bar
    Space,
    /// Left shift
    LeftShift,
    /// Right shift
    RightShift,
    /// Left control
    LeftCtrl,
    /// Right control
    RightCtrl,
}

/// Keyboard transport.
pub trait KeyboardInput {
    /// Whether `key` is currently held on the keyboard behind `handle`.
    fn is_key_pressed(&self, handle: DeviceHandle, key: Key) -> bool;

    /// Returns true if any of `keys` is held.
    fn any_pressed(&self, handle: DeviceHandle, keys: &[Key]) -> bool {
        keys.iter().any(|&k| self.is_key_pressed(handle, k))
    }
}

// ============================================================================
// RC receiver
// ============================================================================

/// Pulse-width transport for a traditional RC receiver.
pub trait PulseInput {
    /// Measure the high pulse on `channel`, waiting at most `timeout_us`.
    ///
    /// Returns the width in microseconds, or `None` on timeout.
    fn read_pulse_us(&mut self, channel: u8, timeout_us: u32) -> Option<u16>;
}

// ============================================================================
// Serial
// ============================================================================

/// Line-oriented serial transport.
pub trait LineInput {
    /// Next complete line, or `None` if nothing is buffered.
    ///
    /// Must not block.
    fn read_line(&mut self) -> Option<Line>;

    /// Whether the link is up. Wired ports are always open.
    fn is_open(&self) -> bool {
        true
    }
}
