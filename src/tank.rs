//! Poll-loop controller that ties a control source to the actuators.
//!
//! This module provides [`TankController`], which owns one
//! [`ControlSource`] and one [`Actuators`] implementation. Every call to
//! [`tick`](TankController::tick) refreshes the source and forwards its
//! outputs to the hardware when they changed.
//!
//! # Example
//!
//! ```rust
//! use tank_control::{
//!     TankController,
//!     config::Config,
//!     hal::{MockActuators, MockReceiver},
//!     source::RcSource,
//! };
//!
//! let mut rx = MockReceiver::new();
//! rx.set_pulse(2, 2000); // throttle full forward
//! rx.set_pulse(4, 1500); // gear pot centered
//!
//! let mut tank = TankController::new(RcSource::new(rx, &Config::default()), MockActuators::new());
//!
//! // Main loop - call tick() as often as you like, the source rate-limits itself
//! for t in 0..10 {
//!     tank.tick(t * 10).unwrap();
//! }
//!
//! let state = tank.state();
//! assert_eq!(state.outputs.gear, 3);
//! assert_eq!(tank.actuators().tracks, (60, 60));
//! ```

use tracing::{debug, info};

use crate::source::{ConnectionState, ControlSource, RefreshResult, SourceKind, TankOutputs};
use crate::traits::Actuators;

/// Drives the actuators from one control source.
///
/// # Type Parameters
///
/// - `S`: the input ([`ControlSource`]); `Box<dyn ControlSource>` works too
/// - `A`: the output ([`Actuators`])
///
/// The controller is not thread-safe; run it on the poll loop thread.
#[derive(Debug)]
pub struct TankController<S, A> {
    source: S,
    actuators: A,
    applied: Option<TankOutputs>,
}

impl<S: ControlSource, A: Actuators> TankController<S, A> {
    /// Create a new controller. Nothing is sent until the first tick.
    pub fn new(source: S, actuators: A) -> Self {
        Self {
            source,
            actuators,
            applied: None,
        }
    }

    /// Refresh the source and push changed outputs to the actuators.
    ///
    /// A failed push is retried on the next tick.
    pub fn tick(&mut self, now_ms: u64) -> Result<RefreshResult, A::Error> {
        let result = self.source.refresh(now_ms);
        let outputs = *self.source.outputs();
        if self.applied != Some(outputs) {
            self.push(&outputs)?;
        }
        Ok(result)
    }

    fn push(&mut self, outputs: &TankOutputs) -> Result<(), A::Error> {
        debug!(?outputs, "pushing outputs to actuators");
        self.actuators.set_tracks(outputs.left, outputs.right)?;
        self.actuators.set_turret(outputs.rotation, outputs.elevation)?;
        self.actuators.set_flamethrower(outputs.fire)?;
        self.applied = Some(*outputs);
        Ok(())
    }

    /// Bring every actuator to rest.
    ///
    /// Call once when the poll loop ends.
    pub fn shutdown(&mut self) -> Result<(), A::Error> {
        info!(source = %self.source.kind(), "shutting down, stopping actuators");
        self.actuators.stop()?;
        self.applied = Some(TankOutputs::neutral(self.source.current_gear()));
        Ok(())
    }

    /// Get the current state for UI/logging
    pub fn state(&self) -> TankState {
        TankState {
            source: self.source.kind(),
            connection: self.source.connection_state(),
            outputs: *self.source.outputs(),
        }
    }

    /// Latest outputs of the source.
    pub fn outputs(&self) -> &TankOutputs {
        self.source.outputs()
    }

    /// Borrow the source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Borrow the actuators.
    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    /// Mutably borrow the actuators.
    pub fn actuators_mut(&mut self) -> &mut A {
        &mut self.actuators
    }

    /// Take the controller apart.
    pub fn into_parts(self) -> (S, A) {
        (self.source, self.actuators)
    }
}

/// Full state snapshot for UI/logging.
///
/// Implements `serde::Serialize` when the `serde` feature is enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TankState {
    /// Which source is driving.
    pub source: SourceKind,
    /// Whether it has a live device.
    pub connection: ConnectionState,
    /// Last computed outputs.
    pub outputs: TankOutputs,
}
