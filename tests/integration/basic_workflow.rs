//! Integration tests for basic workflow scenarios

use crate::common::{MockBus, MockClock, MockDelay, Wiring, bus_with_mag, create_imu};
use bmi160_bmm150::{
    AccelRange, Diagnostics, Event, I2cInterface, Imu, ImuConfig, MagMode, Timing,
};

#[test]
fn test_complete_direct_workflow() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let mut imu = create_imu(&bus);

    assert!(imu.begin(&mut MockDelay));
    assert_eq!(imu.magnetometer_mode(), MagMode::Direct);

    imu.set_accel_range(AccelRange::G2).unwrap();

    bus.set_accel_data(0, 0, 16384);
    bus.set_gyro_data(0, 0, 0);
    bus.set_mag_words(0x0100, -0x0100, 0x0100, 42);

    let sample = imu.read_raw(&mut MockDelay);
    let accel = imu.conversion_factors().accel_g(&sample.accel);
    assert!((accel.z - 1.0).abs() < 1e-4);
    assert_eq!(sample.mag.x, 0x20);
    assert_eq!(sample.mag.y, -0x20);
    assert_eq!(sample.mag.z, 0x80);

    let clock = MockClock::at(0);
    let mut emitted = 0;
    for t in 0..=100 {
        clock.set(t);
        if let Some(avg) = imu.read_at_frequency(50.0, &clock, &mut MockDelay) {
            assert_eq!(avg.accel.z, 16384);
            assert_eq!(avg.rhall, 42);
            emitted += 1;
        }
    }
    // 20 ms interval over 100 ms
    assert_eq!(emitted, 5);
}

#[test]
fn test_complete_bridged_workflow() {
    let bus = bus_with_mag(0x12, Wiring::Bridged);
    bus.set_mag_words(-300, 150, 75, 6000);
    let mut imu = create_imu(&bus);

    assert!(imu.begin(&mut MockDelay));
    assert_eq!(imu.magnetometer_mode(), MagMode::Bridged);

    bus.set_accel_data(1, 2, 3);
    let sample = imu.read_raw(&mut MockDelay);
    assert_eq!(sample.mag.x, -300);
    assert_eq!(sample.mag.y, 150);
    assert_eq!(sample.mag.z, 75);
    assert_eq!(sample.rhall, 6000);
    assert_eq!(sample.accel.z, 3);

    // Forced trigger goes to the recorded passthrough address
    assert_eq!(bus.bmi160_register(0x4B), 0x09);
    assert_eq!(bus.bmm150_register(0x4C), 0x02);
}

#[test]
fn test_custom_config_and_timing() {
    let bus = bus_with_mag(0x11, Wiring::Direct);
    let mut config = ImuConfig::default();
    config.accel.range = AccelRange::G8;

    let timing = Timing {
        soft_reset_ms: 0,
        ..Timing::default()
    };
    let mut imu = Imu::with_config(I2cInterface::new(bus.clone()), config).with_timing(timing);

    assert!(imu.begin(&mut MockDelay));
    assert_eq!(bus.bmi160_register(0x41), 0x08);
    assert_eq!(imu.timing().soft_reset_ms, 0);
    assert!((imu.conversion_factors().accel_lsb_per_g - 4096.0).abs() < 1e-3);

    let bus = imu.release().release();
    assert!(!bus.operations().is_empty());
}

#[test]
fn test_error_recovery() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let mut imu = create_imu(&bus);
    imu.begin(&mut MockDelay);
    bus.set_accel_data(100, 200, 300);

    // Inject a read failure
    bus.fail_next_read();
    let failed = imu.read_raw(&mut MockDelay);
    assert_eq!(failed.accel.x, 0);

    // But subsequent reads should work (error was only for one operation)
    let ok = imu.read_raw(&mut MockDelay);
    assert_eq!(ok.accel.x, 100);
    assert_eq!(
        imu.diagnostics()
            .count(|e| matches!(e, Event::ReadFailed { .. })),
        1
    );
}

#[test]
fn test_custom_diagnostics_sink() {
    #[derive(Default)]
    struct FailureCounter(usize);

    impl Diagnostics for FailureCounter {
        fn record(&mut self, event: Event) {
            if event.is_failure() {
                self.0 += 1;
            }
        }
    }

    let bus = MockBus::new();
    let mut counter = FailureCounter::default();
    {
        let mut imu = Imu::new(I2cInterface::new(bus.clone())).with_diagnostics(&mut counter);
        assert!(!imu.begin(&mut MockDelay));
        imu.read_raw(&mut MockDelay);
    }
    // PrimaryMissing and MagMissing
    assert_eq!(counter.0, 2);
}

#[test]
fn test_default_sink_discards_events() {
    let bus = MockBus::new();
    bus.add_bmi160(0x68);
    let mut imu = Imu::new(I2cInterface::new(bus.clone()));

    assert!(!imu.begin(&mut MockDelay));
    let sample = imu.read_raw(&mut MockDelay);
    assert_eq!(sample.mag.x, 0);
}
