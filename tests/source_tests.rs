//! Integration tests for the control sources and the poll loop

use tank_control::hal::{
    MockActuators, MockClock, MockGamepad, MockKeyboard, MockReceiver, MockSerial,
};
use tank_control::{
    Clock, Config, ConnectionState, ControlSource, DeviceClass, DeviceHandle, Dpad,
    GamepadSource, GamepadState, Key, KeyboardSource, LinkBus, LinkEvent, RcSource,
    RefreshResult, SerialSource, SourceKind, TankController, TankOutputs,
};

fn attach(bus: &mut LinkBus, handle: u8, class: DeviceClass) {
    bus.publish(LinkEvent::Attached {
        handle: DeviceHandle(handle),
        class,
    });
}

fn detach(bus: &mut LinkBus, handle: u8) {
    bus.publish(LinkEvent::Detached {
        handle: DeviceHandle(handle),
    });
}

// =============================================================================
// Serial
// =============================================================================

#[test]
fn serial_forward_left_yields_intent_before_mixing() {
    let mut serial = MockSerial::new();
    serial.queue_text("forward_press\nleft_press\n");
    let mut source = SerialSource::new(serial, &Config::default());

    let result = source.refresh(0);
    let intent = result.intent().expect("full cycle");
    assert_eq!(intent.forward_back, 100);
    assert_eq!(intent.turn, -100);
}

#[test]
fn serial_session_end_to_end() {
    let mut serial = MockSerial::new();
    serial.queue_text("gear_up\ngear_up\ngear_up\ngear_up\nforward_press\nright_press\n");
    let source = SerialSource::new(serial, &Config::default());
    let mut tank = TankController::new(source, MockActuators::new());

    tank.tick(0).unwrap();
    assert_eq!(tank.outputs().gear, 5);
    // (100 + 100) clamps, (100 - 100) stops
    assert_eq!(tank.actuators().tracks, (100, 0));

    tank.source_mut()
        .input_mut()
        .queue_text("right_release\nturret_elevate_press\nfire_press\n");
    tank.tick(50).unwrap();
    assert_eq!(tank.actuators().tracks, (100, 100));
    assert_eq!(tank.actuators().turret, (0, 100));
    assert!(tank.actuators().flamethrower);
}

// =============================================================================
// Rate limiting across variants
// =============================================================================

#[test]
fn every_variant_rate_limits_at_interval() {
    let config = Config::default();
    let mut bus = LinkBus::new();

    let mut pad = MockGamepad::new();
    pad.set(GamepadState::default());
    let mut rx = MockReceiver::new();
    rx.set_pulse(2, 1500);

    let mut sources: Vec<Box<dyn ControlSource>> = vec![
        Box::new(GamepadSource::new(pad, bus.subscribe(), &config)),
        Box::new(KeyboardSource::new(
            MockKeyboard::new(),
            bus.subscribe(),
            &config,
        )),
        Box::new(RcSource::new(rx, &config)),
        Box::new(SerialSource::new(MockSerial::new(), &config)),
    ];
    attach(&mut bus, 1, DeviceClass::Gamepad);
    attach(&mut bus, 2, DeviceClass::Keyboard);

    for source in sources.iter_mut() {
        assert!(source.refresh(1000).is_updated(), "{}", source.kind());
        assert_eq!(
            source.refresh(1049),
            RefreshResult::RateLimited,
            "{}",
            source.kind()
        );
        assert!(source.refresh(1050).is_updated(), "{}", source.kind());
    }
}

#[test]
fn kinds_are_reported() {
    let config = Config::default();
    let mut bus = LinkBus::new();
    let kinds = [
        GamepadSource::new(MockGamepad::new(), bus.subscribe(), &config).kind(),
        KeyboardSource::new(MockKeyboard::new(), bus.subscribe(), &config).kind(),
        RcSource::new(MockReceiver::new(), &config).kind(),
        SerialSource::new(MockSerial::new(), &Config::default()).kind(),
    ];
    assert_eq!(
        kinds,
        [
            SourceKind::Gamepad,
            SourceKind::Keyboard,
            SourceKind::RcReceiver,
            SourceKind::Serial
        ]
    );
}

#[test]
fn clock_driven_poll_loop() {
    let mut clock = MockClock::new();
    let mut serial = MockSerial::new();
    serial.queue_text("gear_up\n");
    let mut source = SerialSource::new(serial, &Config::default());

    let mut updates = 0;
    for _ in 0..100 {
        if source.refresh(clock.now_ms()).is_updated() {
            updates += 1;
        }
        clock.advance(10);
    }
    // 1000 ms of 10 ms ticks at a 50 ms interval
    assert_eq!(updates, 20);
    assert_eq!(source.current_gear(), 2);
}

// =============================================================================
// Shared link bus
// =============================================================================

#[test]
fn gamepad_and_keyboard_share_a_bus() {
    let config = Config::default();
    let mut bus = LinkBus::new();
    let mut pad = GamepadSource::new(MockGamepad::new(), bus.subscribe(), &config);
    let mut kb = KeyboardSource::new(MockKeyboard::new(), bus.subscribe(), &config);

    attach(&mut bus, 5, DeviceClass::Keyboard);
    pad.refresh(0);
    kb.refresh(0);
    assert_eq!(pad.connection_state(), ConnectionState::Disconnected);
    assert_eq!(kb.connection_state(), ConnectionState::Connected);
    assert_eq!(kb.device(), Some(DeviceHandle(5)));

    attach(&mut bus, 6, DeviceClass::Gamepad);
    pad.refresh(50);
    kb.refresh(50);
    assert!(pad.is_connected());
    assert_eq!(pad.device(), Some(DeviceHandle(6)));

    // Gamepad leaving does not touch the keyboard
    detach(&mut bus, 6);
    pad.refresh(100);
    kb.refresh(100);
    assert!(!pad.is_connected());
    assert!(kb.is_connected());
}

#[test]
fn second_gamepad_is_ignored_until_first_leaves() {
    let mut bus = LinkBus::new();
    let mut pad = GamepadSource::new(MockGamepad::new(), bus.subscribe(), &Config::default());

    attach(&mut bus, 1, DeviceClass::Gamepad);
    attach(&mut bus, 2, DeviceClass::Gamepad);
    pad.refresh(0);
    assert_eq!(pad.device(), Some(DeviceHandle(1)));

    detach(&mut bus, 2);
    pad.refresh(50);
    assert!(pad.is_connected());

    detach(&mut bus, 1);
    attach(&mut bus, 2, DeviceClass::Gamepad);
    pad.refresh(100);
    assert_eq!(pad.device(), Some(DeviceHandle(2)));
}

#[test]
fn dropping_a_source_releases_its_subscription() {
    let mut bus = LinkBus::new();
    let kb = KeyboardSource::new(MockKeyboard::new(), bus.subscribe(), &Config::default());
    assert_eq!(bus.subscriber_count(), 1);
    drop(kb);
    assert_eq!(bus.subscriber_count(), 0);
}

// =============================================================================
// Disconnect safety
// =============================================================================

#[test]
fn gamepad_detach_keeps_gear_and_reconnect_resumes() {
    let mut bus = LinkBus::new();
    let mut pad = GamepadSource::new(MockGamepad::new(), bus.subscribe(), &Config::default());
    attach(&mut bus, 1, DeviceClass::Gamepad);

    pad.input_mut().set(GamepadState {
        dpad: Dpad::Up,
        ..Default::default()
    });
    pad.refresh(0);
    pad.input_mut().set(GamepadState {
        axis_y: -512,
        axis_rx: 511,
        a: true,
        ..Default::default()
    });
    pad.refresh(50);
    assert_eq!(pad.current_drive(), (40, 40));

    detach(&mut bus, 1);
    assert_eq!(pad.refresh(60), RefreshResult::Disconnected);
    assert_eq!(*pad.outputs(), TankOutputs::neutral(2));

    // Outputs stay neutral while disconnected
    assert_eq!(pad.refresh(500), RefreshResult::Disconnected);
    assert_eq!(*pad.outputs(), TankOutputs::neutral(2));

    attach(&mut bus, 1, DeviceClass::Gamepad);
    assert!(pad.refresh(550).is_updated());
    assert_eq!(pad.current_drive(), (40, 40));
    assert_eq!(pad.current_turret(), (100, 0));
    assert!(pad.fire_active());
}

#[test]
fn keyboard_held_shift_across_reconnect_shifts_again() {
    let mut bus = LinkBus::new();
    let mut kb = KeyboardSource::new(MockKeyboard::new(), bus.subscribe(), &Config::default());
    attach(&mut bus, 1, DeviceClass::Keyboard);

    kb.input_mut().press(Key::LeftShift);
    kb.refresh(0);
    assert_eq!(kb.current_gear(), 2);

    detach(&mut bus, 1);
    kb.refresh(50);
    attach(&mut bus, 1, DeviceClass::Keyboard);
    kb.refresh(100);
    assert_eq!(kb.current_gear(), 3);
}

#[test]
fn rc_failsafe_through_the_controller() {
    let mut rx = MockReceiver::new();
    rx.set_pulse(2, 2000);
    rx.set_pulse(4, 2000);
    rx.set_pulse(7, 2000);
    let mut tank = TankController::new(RcSource::new(rx, &Config::default()), MockActuators::new());

    tank.tick(0).unwrap();
    assert_eq!(tank.actuators().tracks, (100, 100));
    assert!(tank.actuators().flamethrower);

    tank.source_mut().input_mut().drop_all();
    tank.tick(500).unwrap();
    // Holding last values inside the loss window
    assert_eq!(tank.actuators().tracks, (100, 100));

    assert_eq!(tank.tick(1000).unwrap(), RefreshResult::Disconnected);
    assert_eq!(tank.actuators().tracks, (0, 0));
    assert!(!tank.actuators().flamethrower);
    assert_eq!(tank.outputs().gear, 5);
}
