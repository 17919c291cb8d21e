//! Unit tests for device discovery

use crate::common::{MockBus, MockDelay, Operation, Wiring, begin, bus_with_mag, create_imu};
use bmi160_bmm150::{Error, Event, MagMode, SearchTier};

#[test]
fn test_direct_magnetometer_found_first() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let (imu, ready) = begin(&bus);

    assert!(ready);
    assert_eq!(imu.magnetometer_mode(), MagMode::Direct);
    let topology = imu.topology();
    assert_eq!(topology.primary_address, Some(0x68));
    assert_eq!(topology.mag_address, Some(0x10));
    assert_eq!(topology.passthrough_address, None);
    assert!(topology.usable);

    assert!(imu.diagnostics().events.contains(&Event::MagFound {
        tier: SearchTier::Direct,
        address: 0x10,
    }));
}

#[test]
fn test_direct_candidates_tried_in_order() {
    let bus = bus_with_mag(0x12, Wiring::Direct);
    let (imu, ready) = begin(&bus);

    assert!(ready);
    assert_eq!(imu.topology().mag_address, Some(0x12));
    let rejected: Vec<u8> = imu
        .diagnostics()
        .events
        .iter()
        .filter_map(|e| match *e {
            Event::MagCandidateRejected {
                tier: SearchTier::Direct,
                address,
            } => Some(address),
            _ => None,
        })
        .collect();
    assert_eq!(rejected, vec![0x10, 0x11]);
}

#[test]
fn test_primary_identity_decides_between_candidates() {
    // Something else answers at 0x68 with the wrong identity
    let bus = MockBus::new();
    bus.add_device(0x68, 0x00, 0xD0);
    bus.add_bmi160(0x69);
    bus.add_bmm150(0x10, Wiring::Direct);

    let (imu, _) = begin(&bus);

    assert_eq!(imu.topology().primary_address, Some(0x69));
    let events = &imu.diagnostics().events;
    assert!(events.contains(&Event::PrimaryProbe {
        address: 0x68,
        chip_id: Some(0xD0),
    }));
    assert!(events.contains(&Event::PrimaryFound { address: 0x69 }));
    assert!(!events.contains(&Event::PrimaryFound { address: 0x68 }));
}

#[test]
fn test_first_matching_primary_wins() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    bus.add_device(0x69, 0x00, 0xD1);

    let (imu, _) = begin(&bus);

    assert_eq!(imu.topology().primary_address, Some(0x68));
    assert!(
        !bus.operations().iter().any(|op| matches!(
            op,
            Operation::Pointer { address: 0x69, .. } | Operation::Read { address: 0x69, .. }
        )),
        "0x69 should not be probed once 0x68 matched"
    );
}

#[test]
fn test_configuration_reapplied_after_reset() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let (imu, _) = begin(&bus);

    // The simulated reset restores ACC_RANGE to 0x03
    assert_eq!(bus.bmi160_register(0x41), 0x05);
    assert_eq!(bus.bmi160_register(0x40), 0x28);
    assert_eq!(bus.bmi160_register(0x42), 0x28);
    assert_eq!(bus.bmi160_register(0x43), 0x00);

    let writes = bus.writes_to(0x68);
    let reset = writes
        .iter()
        .position(|&w| w == (0x7E, 0xB6))
        .expect("soft reset");
    let acc_normal = writes
        .iter()
        .position(|&w| w == (0x7E, 0x11))
        .expect("accelerometer normal mode");
    let gyr_normal = writes
        .iter()
        .position(|&w| w == (0x7E, 0x15))
        .expect("gyroscope normal mode");
    assert!(reset < acc_normal && acc_normal < gyr_normal);

    let factors = imu.conversion_factors();
    assert!((factors.accel_lsb_per_g - 8192.0).abs() < f32::EPSILON);
    assert!((factors.gyro_lsb_per_dps - 16.384).abs() < 1e-4);
}

#[test]
fn test_failed_config_write_is_reported_and_skipped() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    bus.fail_register_write(0x68, 0x43);

    let (imu, ready) = begin(&bus);

    assert!(ready);
    let failures = imu
        .diagnostics()
        .count(|e| *e == Event::ConfigWriteFailed { register: 0x43 });
    assert_eq!(failures, 2);
    // Writes after the failing one still happened
    assert!(bus.writes_to(0x68).contains(&(0x7E, 0x15)));
}

#[test]
fn test_magnetometer_without_primary_is_usable() {
    let bus = MockBus::new();
    bus.add_bmm150(0x11, Wiring::Direct);

    let (imu, ready) = begin(&bus);

    assert!(ready);
    assert_eq!(imu.magnetometer_mode(), MagMode::Direct);
    assert_eq!(imu.topology().primary_address, None);
    assert!(imu.diagnostics().events.contains(&Event::PrimaryMissing));
}

#[test]
fn test_primary_without_magnetometer_is_not_usable() {
    let bus = MockBus::new();
    bus.add_bmi160(0x68);

    let (imu, ready) = begin(&bus);

    assert!(!ready);
    assert!(!imu.is_ready());
    assert_eq!(imu.magnetometer_mode(), MagMode::Absent);
    assert!(imu.topology().has_primary());
    assert!(imu.diagnostics().events.contains(&Event::MagMissing));
}

#[test]
fn test_sweep_runs_only_after_other_tiers_fail() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let (imu, _) = begin(&bus);

    assert!(
        !imu.diagnostics()
            .any(|e| matches!(e, Event::MagFound { tier: SearchTier::Sweep, .. }))
    );
    assert!(
        !bus.operations()
            .iter()
            .any(|op| matches!(op, Operation::Nack { address: 0x00 })),
        "the full-bus sweep must not run when the direct tier succeeds"
    );
}

#[test]
fn test_sweep_finds_magnetometer_at_unusual_address() {
    let bus = bus_with_mag(0x2A, Wiring::Direct);
    bus.power_bmm150();

    let (imu, ready) = begin(&bus);

    assert!(ready);
    assert_eq!(imu.magnetometer_mode(), MagMode::Direct);
    assert_eq!(imu.topology().mag_address, Some(0x2A));
    assert!(imu.diagnostics().events.contains(&Event::MagFound {
        tier: SearchTier::Sweep,
        address: 0x2A,
    }));
}

#[test]
fn test_sweep_needs_primary() {
    // No BMI160: tiers 2 and 3 are skipped
    let bus = MockBus::new();
    bus.add_bmm150(0x2A, Wiring::Direct);
    bus.power_bmm150();

    let (imu, ready) = begin(&bus);

    assert!(!ready);
    assert_eq!(imu.magnetometer_mode(), MagMode::Absent);
}

#[test]
fn test_nothing_on_the_bus() {
    let bus = MockBus::new();
    let mut imu = create_imu(&bus);

    assert!(!imu.begin(&mut MockDelay));
    assert!(matches!(
        imu.try_begin(&mut MockDelay),
        Err(Error::NotDetected)
    ));
    let events = &imu.diagnostics().events;
    assert!(events.contains(&Event::PrimaryMissing));
    assert!(events.contains(&Event::MagMissing));
}

#[test]
fn test_try_begin_reports_topology() {
    let bus = MockBus::new();
    bus.add_bmi160(0x69);

    let mut imu = create_imu(&bus);
    let topology = imu.try_begin(&mut MockDelay).unwrap();

    assert_eq!(topology.primary_address, Some(0x69));
    assert!(!topology.usable);
}

#[test]
fn test_begin_runs_discovery_once() {
    let bus = bus_with_mag(0x10, Wiring::Direct);
    let mut imu = create_imu(&bus);

    assert!(imu.begin(&mut MockDelay));
    bus.clear_operations();
    let events = imu.diagnostics().events.len();

    assert!(imu.begin(&mut MockDelay));
    assert!(bus.operations().is_empty());
    assert_eq!(imu.diagnostics().events.len(), events);
}
