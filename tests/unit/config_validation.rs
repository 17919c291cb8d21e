//! Unit tests for range configuration and conversion factors

use crate::common::{MockBus, MockDelay, Wiring, begin, bus_with_mag, create_imu};
use bmi160_bmm150::{AccelData, AccelRange, Error, GyroData, GyroRange};

fn assert_float_eq(a: f32, b: f32, epsilon: f32) {
    assert!(
        (a - b).abs() < epsilon,
        "Values not equal within epsilon: {a} vs {b}"
    );
}

#[test]
fn test_accel_range_updates_hardware_and_factors() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let (mut imu, _) = begin(&bus);

    imu.set_accel_range(AccelRange::G16).unwrap();

    assert_eq!(bus.bmi160_register(0x41), 0x0C);
    assert_eq!(imu.config().accel.range, AccelRange::G16);
    assert_float_eq(imu.conversion_factors().accel_lsb_per_g, 2048.0, 1e-3);
}

#[test]
fn test_gyro_range_updates_hardware_and_factors() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let (mut imu, _) = begin(&bus);

    imu.set_gyro_range(GyroRange::Dps250).unwrap();

    assert_eq!(bus.bmi160_register(0x43), 0x03);
    assert_eq!(imu.config().gyro.range, GyroRange::Dps250);
    assert_float_eq(imu.conversion_factors().gyro_lsb_per_dps, 131.072, 1e-3);
}

#[test]
fn test_range_codes_follow_table() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let (mut imu, _) = begin(&bus);

    for (code, sensitivity) in [(0x03, 16384.0), (0x05, 8192.0), (0x08, 4096.0), (0x0C, 2048.0)] {
        imu.set_accel_range_code(code).unwrap();
        assert_eq!(bus.bmi160_register(0x41), code);
        assert_float_eq(imu.conversion_factors().accel_lsb_per_g, sensitivity, 1e-3);
    }

    for (code, sensitivity) in [
        (0x00, 16.384),
        (0x01, 32.768),
        (0x02, 65.536),
        (0x03, 131.072),
        (0x04, 262.144),
    ] {
        imu.set_gyro_range_code(code).unwrap();
        assert_eq!(bus.bmi160_register(0x43), code);
        assert_float_eq(imu.conversion_factors().gyro_lsb_per_dps, sensitivity, 1e-3);
    }
}

#[test]
fn test_unknown_range_code_rejected() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let (mut imu, _) = begin(&bus);
    bus.clear_operations();

    assert!(matches!(
        imu.set_accel_range_code(0x04),
        Err(Error::InvalidConfig)
    ));
    assert!(matches!(
        imu.set_gyro_range_code(0x05),
        Err(Error::InvalidConfig)
    ));

    assert_eq!(imu.config().accel.range, AccelRange::G4);
    assert_eq!(imu.config().gyro.range, GyroRange::Dps2000);
    assert!(bus.writes_to(0x68).is_empty());
}

#[test]
fn test_range_without_primary_only_updates_table() {
    let bus = MockBus::new();
    bus.add_bmm150(0x10, Wiring::Direct);
    let (mut imu, _) = begin(&bus);
    bus.clear_operations();

    imu.set_accel_range(AccelRange::G2).unwrap();

    assert!(bus.operations().is_empty());
    assert_float_eq(imu.conversion_factors().accel_lsb_per_g, 16384.0, 1e-3);
}

#[test]
fn test_range_before_begin_is_applied_by_discovery() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let mut imu = create_imu(&bus);

    imu.set_gyro_range(GyroRange::Dps500).unwrap();
    assert!(bus.operations().is_empty());

    imu.begin(&mut MockDelay);
    assert_eq!(bus.bmi160_register(0x43), 0x02);
    assert_float_eq(imu.conversion_factors().gyro_lsb_per_dps, 65.536, 1e-3);
}

#[test]
fn test_failed_range_write_still_updates_table() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let (mut imu, _) = begin(&bus);
    bus.fail_register_write(0x68, 0x41);

    let result = imu.set_accel_range(AccelRange::G8);

    assert!(matches!(result, Err(Error::Bus(_))));
    assert_eq!(imu.config().accel.range, AccelRange::G8);
    assert_float_eq(imu.conversion_factors().accel_lsb_per_g, 4096.0, 1e-3);
}

#[test]
fn test_physical_units() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let (mut imu, _) = begin(&bus);
    bus.set_accel_data(0, 0, 8192);
    bus.set_gyro_data(164, 0, -164);

    let sample = imu.read_raw(&mut MockDelay);
    let factors = imu.conversion_factors();

    let accel = factors.accel_g(&sample.accel);
    assert_float_eq(accel.z, 1.0, 1e-4);
    assert_float_eq(accel.magnitude(), 1.0, 1e-4);

    let gyro = factors.gyro_dps(&sample.gyro);
    assert_float_eq(gyro.x, 10.0, 0.05);
    assert_float_eq(gyro.z, -10.0, 0.05);

    // Conversion only depends on the table
    let raw = AccelData {
        x: -16384,
        y: 0,
        z: 0,
    };
    assert_float_eq(factors.accel_g(&raw).x, -2.0, 1e-4);
    assert_float_eq(factors.gyro_dps(&GyroData::default()).y, 0.0, 1e-6);
}
