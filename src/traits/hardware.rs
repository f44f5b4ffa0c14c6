//! Hardware abstraction traits for actuators and time.
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Actuators`] | Track motors, turret servos, flamethrower relay |
//! | [`Clock`] | Time source for `no_std` environments |
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`].
//!
//! # Example
//!
//! ```rust
//! use tank_control::traits::Actuators;
//! use tank_control::hal::MockActuators;
//!
//! let mut act = MockActuators::new();
//! act.set_tracks(60, -60).unwrap();
//! act.set_flamethrower(true).unwrap();
//! act.stop().unwrap();
//!
//! assert_eq!(act.tracks, (0, 0));
//! assert!(!act.flamethrower);
//! ```

/// Downstream actuator layer.
///
/// Implement this for the vehicle's motor driver and servo hardware. All
/// values arrive already mixed and clamped to `[-100, 100]`; PWM generation
/// is the implementation's concern.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use tank_control::traits::Actuators;
///
/// struct Chassis { /* PWM channels */ }
///
/// impl Actuators for Chassis {
///     type Error = ();
///
///     fn set_tracks(&mut self, left: i8, right: i8) -> Result<(), ()> {
///         // Convert to duty cycles and direction pins...
///         Ok(())
///     }
///
///     fn set_turret(&mut self, rotation: i8, elevation: i8) -> Result<(), ()> {
///         // Drive servos...
///         Ok(())
///     }
///
///     fn set_flamethrower(&mut self, active: bool) -> Result<(), ()> {
///         // Toggle relay...
///         Ok(())
///     }
/// }
/// ```
pub trait Actuators {
    /// Error type for actuator operations.
    type Error;

    /// Set left and right track speed, `[-100, 100]`, positive = forward.
    fn set_tracks(&mut self, left: i8, right: i8) -> Result<(), Self::Error>;

    /// Set turret rotation and elevation rates, `[-100, 100]`.
    fn set_turret(&mut self, rotation: i8, elevation: i8) -> Result<(), Self::Error>;

    /// Switch the flamethrower on or off.
    fn set_flamethrower(&mut self, active: bool) -> Result<(), Self::Error>;

    /// Convenience method to bring everything to rest.
    ///
    /// The flamethrower is switched off first.
    fn stop(&mut self) -> Result<(), Self::Error> {
        self.set_flamethrower(false)?;
        self.set_tracks(0, 0)?;
        self.set_turret(0, 0)
    }
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for refresh rate limiting. On
/// desktop, this wraps `std::time::Instant` ([`SystemClock`]). On embedded,
/// use a hardware timer.
///
/// [`SystemClock`]: crate::hal::SystemClock
///
/// # Example
///
/// ```rust
/// use tank_control::traits::Clock;
/// use tank_control::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(50);
/// assert_eq!(clock.now_ms(), 50);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}
