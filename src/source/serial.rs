//! Line-oriented serial command source.
//!
//! Each line carries one token from the [`SerialCommand`] vocabulary.
//! `*_press` / `*_release` tokens latch a control on or off until the
//! opposite token arrives; `gear_up` / `gear_down` shift immediately, in
//! arrival order.
//!
//! Lines are drained on every refresh, even rate-limited ones, so the
//! input buffer never backs up. Outputs are recomputed from the latched
//! state only once per refresh interval.

use tracing::{debug, warn};

use crate::commands::{Control, SerialCommand};
use crate::config::Config;
use crate::gear::GearMode;
use crate::intent::{GearRequest, Intent};
use crate::mixer::{DriveMixer, TurretMixer};
use crate::source::{
    ConnectionState, ControlSource, RefreshResult, SourceCore, SourceKind, TankOutputs,
};
use crate::traits::LineInput;

/// [`ControlSource`] driven by text commands over a serial line.
#[derive(Debug)]
pub struct SerialSource<L> {
    input: L,
    pressed: [bool; Control::ALL.len()],
    core: SourceCore,
}

impl<L: LineInput> SerialSource<L> {
    /// Create a connected serial source recomputing at most every
    /// `config.control.update_interval_ms`.
    pub fn new(input: L, config: &Config) -> Self {
        Self {
            input,
            pressed: [false; Control::ALL.len()],
            core: SourceCore::new(
                SourceKind::Serial,
                GearMode::Edge,
                config.control.update_interval_ms,
                ConnectionState::Connected,
            ),
        }
    }

    /// Whether `control` is currently latched on.
    pub fn is_pressed(&self, control: Control) -> bool {
        self.pressed[control.index()]
    }

    /// Borrow the transport.
    pub fn input(&self) -> &L {
        &self.input
    }

    /// Mutably borrow the transport.
    pub fn input_mut(&mut self) -> &mut L {
        &mut self.input
    }

    /// Apply one parsed command to the latched state.
    pub fn handle(&mut self, command: SerialCommand) {
        match command {
            SerialCommand::Press(control) => self.pressed[control.index()] = true,
            SerialCommand::Release(control) => self.pressed[control.index()] = false,
            SerialCommand::GearUp => {
                self.core.gear_mut().shift_up();
            }
            SerialCommand::GearDown => {
                self.core.gear_mut().shift_down();
            }
        }
    }

    fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Some(line) = self.input.read_line() {
            let token = line.trim();
            if token.is_empty() {
                continue;
            }
            match token.parse::<SerialCommand>() {
                Ok(command) => {
                    debug!(%command, "serial command");
                    self.handle(command);
                    handled += 1;
                }
                Err(e) => warn!(%e, "ignoring serial input"),
            }
        }
        handled
    }

    fn latched_intent(&self) -> Intent {
        let held = |c: Control| self.pressed[c.index()];
        Intent {
            forward_back: DriveMixer::axis_from_buttons(
                held(Control::Back),
                held(Control::Forward),
            ),
            turn: DriveMixer::axis_from_buttons(held(Control::Left), held(Control::Right)),
            turret_yaw: TurretMixer::rotation_from_buttons(
                held(Control::TurretLeft),
                held(Control::TurretRight),
            ),
            turret_pitch: TurretMixer::elevation_from_buttons(
                held(Control::TurretElevate),
                held(Control::TurretLower),
            ),
            fire: held(Control::Fire),
            gear: GearRequest::Hold,
        }
    }
}

impl<L: LineInput> ControlSource for SerialSource<L> {
    fn refresh(&mut self, now_ms: u64) -> RefreshResult {
        if !self.input.is_open() {
            if self.core.disconnect() {
                self.pressed = [false; Control::ALL.len()];
            }
            return RefreshResult::Disconnected;
        }
        self.core.connect();

        self.drain();
        if !self.core.try_begin_cycle(now_ms) {
            return RefreshResult::RateLimited;
        }

        let intent = self.latched_intent();
        self.core.apply(&intent);
        RefreshResult::Updated(intent)
    }

    fn connection_state(&self) -> ConnectionState {
        self.core.state()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Serial
    }

    fn outputs(&self) -> &TankOutputs {
        self.core.outputs()
    }
}
