//! Hobby RC receiver source.
//!
//! Six PWM channels are sampled every cycle: throttle, steering, a gear
//! potentiometer, turret rotation, turret elevation and a fire switch.
//! Pulse widths are mapped linearly from the calibrated range, so a larger
//! pulse means forward, right and up.
//!
//! A channel that times out keeps its last reading. If every channel stays
//! silent for longer than the configured signal-loss delay the source
//! fails safe: it reports disconnected and its outputs go neutral until
//! the next pulse arrives.

use tracing::{debug, warn};

use crate::config::{Config, RcConfig};
use crate::gear::GearMode;
use crate::intent::{GearRequest, Intent};
use crate::mixer::proportional_axis;
use crate::source::{
    ConnectionState, ControlSource, RefreshResult, SourceCore, SourceKind, TankOutputs,
};
use crate::traits::PulseInput;

const THROTTLE: usize = 0;
const STEERING: usize = 1;
const GEAR: usize = 2;
const ROTATION: usize = 3;
const ELEVATION: usize = 4;
const FIRE: usize = 5;
const CHANNELS: usize = 6;

/// [`ControlSource`] backed by an RC receiver.
///
/// ```rust
/// use tank_control::config::Config;
/// use tank_control::hal::MockReceiver;
/// use tank_control::source::{ControlSource, RcSource};
///
/// let mut rx = MockReceiver::new();
/// rx.set_pulse(2, 2000); // full throttle
/// rx.set_pulse(4, 2000); // gear pot at max
///
/// let mut rc = RcSource::new(rx, &Config::default());
/// rc.refresh(0);
/// assert_eq!(rc.current_gear(), 5);
/// assert_eq!(rc.current_drive(), (100, 100));
/// ```
#[derive(Debug)]
pub struct RcSource<P> {
    input: P,
    config: RcConfig,
    held: [Option<u16>; CHANNELS],
    last_pulse_ms: Option<u64>,
    core: SourceCore,
}

impl<P: PulseInput> RcSource<P> {
    /// Create a connected receiver source.
    pub fn new(input: P, config: &Config) -> Self {
        Self {
            input,
            config: config.rc,
            held: [None; CHANNELS],
            last_pulse_ms: None,
            core: SourceCore::new(
                SourceKind::RcReceiver,
                GearMode::Absolute,
                config.control.update_interval_ms,
                ConnectionState::Connected,
            ),
        }
    }

    /// Borrow the transport.
    pub fn input(&self) -> &P {
        &self.input
    }

    /// Mutably borrow the transport.
    pub fn input_mut(&mut self) -> &mut P {
        &mut self.input
    }

    /// Last pulse width seen on each channel, in wiring order.
    pub fn held_pulses(&self) -> [Option<u16>; CHANNELS] {
        self.held
    }

    fn channel_ids(&self) -> [u8; CHANNELS] {
        let ch = self.config.channels;
        [
            ch.throttle,
            ch.steering,
            ch.gear,
            ch.turret_rotation,
            ch.turret_elevation,
            ch.fire,
        ]
    }

    /// Sample every channel once. Returns how many answered.
    fn sample(&mut self) -> usize {
        let timeout = self.config.pulse_timeout_us;
        let mut fresh = 0;
        for (slot, channel) in self.channel_ids().into_iter().enumerate() {
            match self.input.read_pulse_us(channel, timeout) {
                Some(us) => {
                    self.held[slot] = Some(us);
                    fresh += 1;
                }
                None => debug!(channel, "pulse timeout, holding last value"),
            }
        }
        fresh
    }

    fn axis(&self, slot: usize) -> i8 {
        self.held[slot].map_or(0, |us| {
            proportional_axis(
                us as i32,
                self.config.pulse_min_us as i32,
                self.config.pulse_max_us as i32,
            )
        })
    }

    fn intent(&self) -> Intent {
        Intent {
            forward_back: self.axis(THROTTLE),
            turn: self.axis(STEERING),
            turret_yaw: self.axis(ROTATION),
            turret_pitch: self.axis(ELEVATION),
            fire: self.held[FIRE].is_some_and(|us| us > self.config.fire_threshold_us),
            gear: match self.held[GEAR] {
                Some(us) => GearRequest::Absolute {
                    raw: us as i32,
                    min: self.config.pulse_min_us as i32,
                    max: self.config.pulse_max_us as i32,
                },
                None => GearRequest::Hold,
            },
        }
    }
}

impl<P: PulseInput> ControlSource for RcSource<P> {
    fn refresh(&mut self, now_ms: u64) -> RefreshResult {
        if !self.core.try_begin_cycle(now_ms) {
            return RefreshResult::RateLimited;
        }

        if self.sample() == 0 {
            let since = *self.last_pulse_ms.get_or_insert(now_ms);
            if now_ms.saturating_sub(since) >= self.config.signal_loss_ms as u64 {
                if self.core.disconnect() {
                    let silent_ms = now_ms.saturating_sub(since);
                    warn!(silent_ms, "rc signal lost, failsafe engaged");
                }
                return RefreshResult::Disconnected;
            }
            return match self.core.state() {
                ConnectionState::Connected => RefreshResult::NoData,
                ConnectionState::Disconnected => RefreshResult::Disconnected,
            };
        }

        self.last_pulse_ms = Some(now_ms);
        self.core.connect();
        let intent = self.intent();
        self.core.apply(&intent);
        RefreshResult::Updated(intent)
    }

    fn connection_state(&self) -> ConnectionState {
        self.core.state()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::RcReceiver
    }

    fn outputs(&self) -> &TankOutputs {
        self.core.outputs()
    }
}
