//! Trait definitions for hardware abstraction and input transports.
//!
//! This module defines the abstractions that let tank-control:
//! - Run on different hardware (microcontroller firmware, desktop mock)
//! - Accept input from interchangeable transports
//!
//! # Submodules
//!
//! - `hardware`: Actuators and clock
//! - `input`: Gamepad, keyboard, RC pulse and serial line readers
//!
//! # Hardware Abstraction
//!
//! - [`Actuators`]: Track, turret and flamethrower outputs
//! - [`Clock`]: Time source for `no_std` environments
//!
//! # Input Transports
//!
//! - [`GamepadInput`]: Decoded gamepad reports
//! - [`KeyboardInput`]: Per-key pressed state
//! - [`PulseInput`]: RC receiver pulse widths
//! - [`LineInput`]: Newline-delimited serial text

pub mod hardware;
pub mod input;

pub use hardware::*;
pub use input::*;
