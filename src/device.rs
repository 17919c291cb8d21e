//! High-level driver API for the BMI160 + BMM150 pair
//!
//! [`Imu`] owns the bus handle and all state that the discovery sequence
//! establishes: topology, sensor configuration, conversion factors and the
//! averaging accumulator. Discovery runs once in [`Imu::begin`]; every read
//! after that consults the recorded topology.

use embedded_hal::delay::DelayNs;

use crate::Error;
use crate::conversion::ConversionFactors;
use crate::diagnostics::{Diagnostics, Event};
use crate::discovery::Topology;
use crate::interface::{PrimaryInterface, RegisterBus};
use crate::rate::Accumulator;
use crate::registers::{Bmi160, bmi160};
use crate::retry::Retry;
use crate::sample::RawSample;
use crate::sensors::{AccelConfig, AccelRange, GyroConfig, GyroRange, ImuConfig, MagMode};
use crate::time::Clock;

/// Settle delays and polling budgets used by the bus sequences
///
/// The defaults follow the chips' documented start-up and conversion times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Gap between consecutive passthrough register writes
    pub register_gap_ms: u32,
    /// BMI160 soft reset
    pub soft_reset_ms: u32,
    /// Accelerometer / gyroscope normal-mode command, each
    pub power_mode_ms: u32,
    /// BMM150 power-on before its identity can be read
    pub mag_power_on_ms: u32,
    /// Relayed passthrough write round trip after the commit
    pub passthrough_commit_ms: u32,
    /// Magnetometer interface normal-mode command
    pub mag_normal_ms: u32,
    /// `drdy_mag` polling while synchronizing a new bridge
    pub sync_poll: Retry,
    /// Forced conversion budget before polling `drdy_mag`
    pub forced_conversion_ms: u32,
    /// `drdy_mag` polling after a bridged forced trigger
    pub forced_poll: Retry,
    /// Settle after re-powering a bridged magnetometer that stopped answering
    pub forced_recovery_ms: u32,
    /// Extra settle between a ready bridged trigger and the burst read
    pub forced_settle_ms: u32,
    /// Direct forced conversion budget
    pub direct_conversion_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            register_gap_ms: 1,
            soft_reset_ms: 100,
            power_mode_ms: 10,
            mag_power_on_ms: 20,
            passthrough_commit_ms: 50,
            mag_normal_ms: 100,
            sync_poll: Retry::new(200, 1),
            forced_conversion_ms: 2,
            forced_poll: Retry::new(50, 1),
            forced_recovery_ms: 200,
            forced_settle_ms: 1,
            direct_conversion_ms: 1,
        }
    }
}

/// Main driver for the BMI160 + BMM150 pair
pub struct Imu<I, S = ()> {
    pub(crate) interface: I,
    pub(crate) diagnostics: S,
    pub(crate) config: ImuConfig,
    pub(crate) factors: ConversionFactors,
    pub(crate) timing: Timing,
    pub(crate) topology: Topology,
    pub(crate) discovered: bool,
    pub(crate) accumulator: Accumulator,
    pub(crate) native_rates_applied: bool,
}

impl<I> Imu<I> {
    /// Create a driver with the default configuration
    ///
    /// Nothing is sent on the bus until [`begin`](Self::begin).
    ///
    /// # Example
    /// ```ignore
    /// let mut imu = Imu::new(I2cInterface::new(i2c));
    /// if !imu.begin(&mut delay) {
    ///     // neither chip answered
    /// }
    /// ```
    pub fn new(interface: I) -> Self {
        Self::with_config(interface, ImuConfig::default())
    }

    /// Create a driver with an explicit sensor configuration
    pub fn with_config(interface: I, config: ImuConfig) -> Self {
        Self {
            interface,
            diagnostics: (),
            config,
            factors: ConversionFactors::from_config(&config),
            timing: Timing::default(),
            topology: Topology::default(),
            discovered: false,
            accumulator: Accumulator::new(),
            native_rates_applied: false,
        }
    }
}

impl<I, S> Imu<I, S> {
    /// Replace the diagnostics sink
    pub fn with_diagnostics<S2>(self, diagnostics: S2) -> Imu<I, S2> {
        Imu {
            interface: self.interface,
            diagnostics,
            config: self.config,
            factors: self.factors,
            timing: self.timing,
            topology: self.topology,
            discovered: self.discovered,
            accumulator: self.accumulator,
            native_rates_applied: self.native_rates_applied,
        }
    }

    /// Replace the settle and polling budgets
    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// How the magnetometer is wired, as found by discovery
    pub const fn magnetometer_mode(&self) -> MagMode {
        self.topology.mag_mode
    }

    /// Whether discovery left the system usable
    ///
    /// A reachable magnetometer is sufficient, even without the BMI160.
    pub const fn is_ready(&self) -> bool {
        self.topology.usable
    }

    /// Topology recorded by discovery
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Current sensor configuration
    pub const fn config(&self) -> &ImuConfig {
        &self.config
    }

    /// Conversion factors for the current ranges
    pub const fn conversion_factors(&self) -> &ConversionFactors {
        &self.factors
    }

    /// Settle and polling budgets in use
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Diagnostics sink
    pub const fn diagnostics(&self) -> &S {
        &self.diagnostics
    }

    /// Mutable access to the diagnostics sink
    pub const fn diagnostics_mut(&mut self) -> &mut S {
        &mut self.diagnostics
    }

    /// Consume the driver and return the bus interface
    pub fn release(self) -> I {
        self.interface
    }
}

impl<I, S> Imu<I, S>
where
    I: RegisterBus,
    S: Diagnostics,
{
    /// Discover and bring up whichever chips are present
    ///
    /// Runs the discovery sequence on the first call only; later calls
    /// return the recorded result without touching the bus. Returns `true`
    /// when a magnetometer was found by any search tier.
    pub fn begin<D>(&mut self, delay: &mut D) -> bool
    where
        D: DelayNs,
    {
        if !self.discovered {
            self.topology = self.discover(delay);
            self.discovered = true;
        }
        self.topology.usable
    }

    /// Like [`begin`](Self::begin), but reports what was found
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotDetected`] when neither the BMI160 nor a
    /// magnetometer answered. A BMI160 without a magnetometer is returned as
    /// a topology with `usable == false`.
    pub fn try_begin<D>(&mut self, delay: &mut D) -> Result<Topology, Error<I::Error>>
    where
        D: DelayNs,
    {
        self.begin(delay);
        if self.topology.has_primary() || self.topology.mag_mode.is_present() {
            Ok(self.topology)
        } else {
            Err(Error::NotDetected)
        }
    }

    /// Read every present sensor once
    ///
    /// Absent sensors and failed transactions leave their fields at zero.
    pub fn read_raw<D>(&mut self, delay: &mut D) -> RawSample
    where
        D: DelayNs,
    {
        self.read_once(delay)
    }

    /// Read once and return an averaged sample once per output interval
    ///
    /// Call this from a tight loop. Each call performs exactly one read and
    /// folds it into the accumulator. `None` means "no new sample yet" and
    /// must not be taken as a zero reading.
    ///
    /// `target_hz` is clamped to the slowest present sensor's native rate;
    /// non-positive requests fall back to 10 Hz. The first call pushes the
    /// accelerometer and gyroscope to their fastest output rates.
    pub fn read_at_frequency<C, D>(
        &mut self,
        target_hz: f32,
        clock: &C,
        delay: &mut D,
    ) -> Option<RawSample>
    where
        C: Clock,
        D: DelayNs,
    {
        self.poll_rate(target_hz, clock, delay)
    }

    /// Set the accelerometer range
    ///
    /// The configuration and conversion factors change together; the range
    /// is written to the BMI160 if one was discovered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the register write fails. The new range is
    /// still recorded.
    pub fn set_accel_range(&mut self, range: AccelRange) -> Result<(), Error<I::Error>> {
        self.config.accel.range = range;
        self.factors = ConversionFactors::from_config(&self.config);

        if let Some(primary) = self.topology.primary_address {
            let written = self.registers(primary).acc_range().write(|w| {
                w.set_acc_range(range.code());
            });
            self.config_write(bmi160::ACC_RANGE, written)?;
        }
        Ok(())
    }

    /// Set the gyroscope range
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the register write fails. The new range is
    /// still recorded.
    pub fn set_gyro_range(&mut self, range: GyroRange) -> Result<(), Error<I::Error>> {
        self.config.gyro.range = range;
        self.factors = ConversionFactors::from_config(&self.config);

        if let Some(primary) = self.topology.primary_address {
            let written = self.registers(primary).gyr_range().write(|w| {
                w.set_gyr_range(range.code());
            });
            self.config_write(bmi160::GYR_RANGE, written)?;
        }
        Ok(())
    }

    /// Set the accelerometer range from its raw `ACC_RANGE` code
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for codes outside the range table,
    /// leaving the configuration untouched.
    pub fn set_accel_range_code(&mut self, code: u8) -> Result<(), Error<I::Error>> {
        let range = AccelRange::from_code(code).ok_or(Error::InvalidConfig)?;
        self.set_accel_range(range)
    }

    /// Set the gyroscope range from its raw `GYR_RANGE` code
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for codes outside the range table,
    /// leaving the configuration untouched.
    pub fn set_gyro_range_code(&mut self, code: u8) -> Result<(), Error<I::Error>> {
        let range = GyroRange::from_code(code).ok_or(Error::InvalidConfig)?;
        self.set_gyro_range(range)
    }

    /// Typed register block of the BMI160 at `address`
    pub(crate) fn registers(&mut self, address: u8) -> Bmi160<PrimaryInterface<'_, I>> {
        Bmi160::new(PrimaryInterface::new(&mut self.interface, address))
    }

    /// Write rate and filter mode to `ACC_CONF`
    pub(crate) fn write_accel_conf(
        &mut self,
        primary: u8,
        accel: AccelConfig,
    ) -> Result<(), I::Error> {
        let written = self.registers(primary).acc_conf().write(|w| {
            w.set_acc_odr(accel.odr.code());
            w.set_acc_bwp(accel.filter.code());
        });
        self.config_write(bmi160::ACC_CONF, written)
    }

    /// Write rate and filter mode to `GYR_CONF`
    pub(crate) fn write_gyro_conf(
        &mut self,
        primary: u8,
        gyro: GyroConfig,
    ) -> Result<(), I::Error> {
        let written = self.registers(primary).gyr_conf().write(|w| {
            w.set_gyr_odr(gyro.odr.code());
            w.set_gyr_bwp(gyro.filter.code());
        });
        self.config_write(bmi160::GYR_CONF, written)
    }

    /// Report a failed BMI160 configuration write to the diagnostics sink
    pub(crate) fn config_write(
        &mut self,
        register: u8,
        result: Result<(), I::Error>,
    ) -> Result<(), I::Error> {
        if result.is_err() {
            self.diagnostics
                .record(Event::ConfigWriteFailed { register });
        }
        result
    }
}
