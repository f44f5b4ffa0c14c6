//! # tank-control
//!
//! Control-source abstraction and drive/turret mixing for a twin-track
//! (skid-steer) vehicle with a rotating, elevating turret and a
//! flamethrower.
//!
//! ## Features
//!
//! - **Interchangeable inputs**: gamepad, keyboard, RC receiver and serial
//!   commands behind one [`ControlSource`] trait
//! - **Gear governor**: five gears scaling track authority, edge-triggered
//!   or absolute
//! - **Pure mixers**: integer differential drive and turret mixing
//! - **Fail safe**: outputs drop to neutral the moment a source loses its
//!   device
//! - **`no_std` core**: everything except the hosted HAL and the console
//!   binary runs on a microcontroller
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `intent` - Normalized per-cycle driver intent
//! - `deadzone`, `gear`, `mixer` - The pure control pipeline
//! - `source` - The four control sources
//! - `link` - Device attach/detach notification for wireless sources
//! - `traits` - Transport and actuator abstractions
//! - `tank` - Poll-loop controller that drives the actuators
//! - `hal` - Concrete implementations (mock for testing, system for hosted targets)
//!
//! ## Example
//!
//! ```rust
//! use tank_control::{
//!     Config, ControlSource, GearController, DriveMixer, Intent, GearRequest,
//!     TankController,
//!     hal::{MockActuators, MockSerial},
//!     source::SerialSource,
//! };
//!
//! // The pipeline by hand
//! let mut gear = GearController::edge();
//! let intent = Intent {
//!     forward_back: 100,
//!     gear: GearRequest::Edge { up: true, down: false },
//!     ..Intent::neutral()
//! };
//! gear.apply(intent.gear);
//! assert_eq!(DriveMixer::mix(intent.forward_back, intent.turn, gear.gear()), (40, 40));
//!
//! // Or let a source and the controller do it
//! let mut serial = MockSerial::new();
//! serial.queue_text("gear_up\nforward_press\n");
//! let source = SerialSource::new(serial, &Config::default());
//! let mut tank = TankController::new(source, MockActuators::new());
//! tank.tick(0).unwrap();
//! assert_eq!(tank.source().current_drive(), (40, 40));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Serial command vocabulary.
pub mod commands;
/// Shared configuration for desktop and firmware.
pub mod config;
/// Dead-zone filtering for analog axes.
pub mod deadzone;
/// Gear state machine.
pub mod gear;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Normalized driver intent.
pub mod intent;
/// Device attach/detach notification.
pub mod link;
/// Differential-drive and turret mixing.
pub mod mixer;
/// Control sources and the trait they share.
pub mod source;
/// Poll-loop controller driving the actuators.
pub mod tank;
/// Core traits for actuators, time and input transports.
pub mod traits;

// Re-exports for convenience
pub use commands::{Control, ParseCommandError, SerialCommand};
pub use config::{AxisPolicy, Config, ControlConfig, GamepadConfig, RcChannels, RcConfig};
pub use deadzone::DeadZoneFilter;
pub use gear::{GearController, GearMode, MAX_GEAR, MIN_GEAR};
pub use intent::{GearRequest, Intent};
pub use link::{DeviceClass, DeviceHandle, LinkBus, LinkEvent, LinkSubscription};
pub use mixer::{DriveMixer, TurretMixer};
pub use source::{
    ConnectionState, ControlSource, GamepadSource, KeyboardSource, RcSource, RefreshResult,
    SerialSource, SourceKind, TankOutputs,
};
pub use tank::{TankController, TankState};
pub use traits::{
    // Hardware
    Actuators,
    Clock,
    // Input
    Dpad,
    GamepadInput,
    GamepadState,
    Key,
    KeyboardInput,
    LineInput,
    PulseInput,
};
