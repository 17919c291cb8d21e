//! Device discovery
//!
//! Finds the BMI160 at one of its two addresses, configures it, then looks for
//! the BMM150 in three tiers:
//! 1. directly on the bus at 0x10..=0x13
//! 2. behind the BMI160 passthrough at the same addresses
//! 3. a sweep of every bus address for the BMM150 identity
//!
//! Tiers 2 and 3 need the BMI160. A magnetometer found by any tier makes the
//! system usable, with or without the BMI160.

use embedded_hal::delay::DelayNs;

use crate::Error;
use crate::conversion::ConversionFactors;
use crate::device::Imu;
use crate::diagnostics::{Diagnostics, Event, SearchTier};
use crate::interface::RegisterBus;
use crate::registers::{MAX_BUS_ADDRESS, bmi160, bmm150};
use crate::sensors::{ImuConfig, MagMode};

/// What discovery found on the bus
///
/// Recorded once by [`Imu::begin`](crate::Imu::begin) and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Topology {
    /// BMI160 address, `None` when absent
    pub primary_address: Option<u8>,
    /// Physical BMM150 address, `None` when absent
    pub mag_address: Option<u8>,
    /// 7-bit address programmed into the passthrough, bridged wiring only
    pub passthrough_address: Option<u8>,
    /// How the magnetometer is wired
    pub mag_mode: MagMode,
    /// A magnetometer was found by some tier
    pub usable: bool,
}

impl Topology {
    /// Whether the BMI160 was found
    #[must_use]
    pub const fn has_primary(&self) -> bool {
        self.primary_address.is_some()
    }
}

impl<I, S> Imu<I, S>
where
    I: RegisterBus,
    S: Diagnostics,
{
    /// Run the full discovery sequence
    pub(crate) fn discover<D>(&mut self, delay: &mut D) -> Topology
    where
        D: DelayNs,
    {
        let mut topology = Topology {
            primary_address: self.find_primary(),
            ..Topology::default()
        };

        if let Some(primary) = topology.primary_address {
            self.configure_primary(primary, delay);
        }

        if let Some(address) = self.find_direct_mag(delay) {
            topology.mag_address = Some(address);
            topology.mag_mode = MagMode::Direct;
        } else if let Some(primary) = topology.primary_address {
            if let Some((address, passthrough)) = self.find_bridged_mag(primary, delay) {
                topology.mag_address = Some(address);
                topology.passthrough_address = Some(passthrough);
                topology.mag_mode = MagMode::Bridged;
            } else if let Some(address) = self.sweep_for_mag() {
                topology.mag_address = Some(address);
                topology.mag_mode = MagMode::Direct;
            }
        }

        topology.usable = topology.mag_mode.is_present();
        if !topology.usable {
            self.diagnostics.record(Event::MagMissing);
        }
        topology
    }

    /// Probe the BMI160 candidates; the first with a matching identity wins
    fn find_primary(&mut self) -> Option<u8> {
        for address in bmi160::ADDRESSES {
            let chip_id = self.interface.read_id(address, bmi160::CHIP_ID).ok();
            self.diagnostics
                .record(Event::PrimaryProbe { address, chip_id });

            if chip_id == Some(bmi160::CHIP_ID_VALUE) {
                self.diagnostics.record(Event::PrimaryFound { address });
                return Some(address);
            }
        }
        self.diagnostics.record(Event::PrimaryMissing);
        None
    }

    /// Push the configuration, reset, and enable accelerometer and gyroscope
    ///
    /// Individual write failures are reported and skipped. The soft reset
    /// restores register defaults, so rate and range are written again once
    /// both sensors are in normal mode.
    fn configure_primary<D>(&mut self, primary: u8, delay: &mut D)
    where
        D: DelayNs,
    {
        self.write_config(primary);

        if self.command(primary, bmi160::CMD_SOFT_RESET).is_ok() {
            delay.delay_ms(self.timing.soft_reset_ms);
        }
        if self.command(primary, bmi160::CMD_ACC_NORMAL).is_ok() {
            delay.delay_ms(self.timing.power_mode_ms);
        }
        if self.command(primary, bmi160::CMD_GYR_NORMAL).is_ok() {
            delay.delay_ms(self.timing.power_mode_ms);
        }

        self.write_config(primary);
        self.factors = ConversionFactors::from_config(&self.config);
    }

    /// Rate, filter and range for both sensors; failures are reported and skipped
    fn write_config(&mut self, primary: u8) {
        let ImuConfig { accel, gyro } = self.config;

        let _ = self.write_accel_conf(primary, accel);
        let written = self.registers(primary).acc_range().write(|w| {
            w.set_acc_range(accel.range.code());
        });
        let _ = self.config_write(bmi160::ACC_RANGE, written);

        let _ = self.write_gyro_conf(primary, gyro);
        let written = self.registers(primary).gyr_range().write(|w| {
            w.set_gyr_range(gyro.range.code());
        });
        let _ = self.config_write(bmi160::GYR_RANGE, written);
    }

    fn command(&mut self, primary: u8, command: u8) -> Result<(), I::Error> {
        let written = self.registers(primary).cmd().write(|w| {
            w.set_cmd(command);
        });
        self.config_write(bmi160::CMD, written)
    }

    /// Tier 1: BMM150 wired directly to the bus
    fn find_direct_mag<D>(&mut self, delay: &mut D) -> Option<u8>
    where
        D: DelayNs,
    {
        for address in bmm150::ADDRESSES {
            if self.init_direct_mag(address, delay).is_ok() {
                self.diagnostics.record(Event::MagFound {
                    tier: SearchTier::Direct,
                    address,
                });
                return Some(address);
            }
            self.diagnostics.record(Event::MagCandidateRejected {
                tier: SearchTier::Direct,
                address,
            });
        }
        None
    }

    /// Power a direct BMM150 on and check its identity
    fn init_direct_mag<D>(&mut self, address: u8, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.interface
            .write_register(address, bmm150::POWER, bmm150::POWER_ON)?;
        delay.delay_ms(self.timing.mag_power_on_ms);

        let mut chip_id = [0u8; 1];
        self.interface
            .read_registers(address, bmm150::CHIP_ID, &mut chip_id)?;

        if chip_id[0] == bmm150::CHIP_ID_VALUE {
            Ok(())
        } else {
            Err(Error::InvalidDevice(chip_id[0]))
        }
    }

    /// Tier 2: BMM150 behind the BMI160 passthrough
    ///
    /// Returns the physical and passthrough addresses of the first candidate
    /// that bridges successfully.
    fn find_bridged_mag<D>(&mut self, primary: u8, delay: &mut D) -> Option<(u8, u8)>
    where
        D: DelayNs,
    {
        for address in bmm150::ADDRESSES {
            match self.configure_bridge(primary, address, delay) {
                Ok(passthrough) => {
                    self.diagnostics.record(Event::MagFound {
                        tier: SearchTier::Bridged,
                        address,
                    });
                    return Some((address, passthrough));
                }
                Err(_) => self.diagnostics.record(Event::MagCandidateRejected {
                    tier: SearchTier::Bridged,
                    address,
                }),
            }
        }
        None
    }

    /// Tier 3: look for the BMM150 identity at every bus address
    fn sweep_for_mag(&mut self) -> Option<u8> {
        for address in 0..=MAX_BUS_ADDRESS {
            if self.interface.read_id(address, bmm150::CHIP_ID).ok()
                == Some(bmm150::CHIP_ID_VALUE)
            {
                self.diagnostics.record(Event::MagFound {
                    tier: SearchTier::Sweep,
                    address,
                });
                return Some(address);
            }
        }
        None
    }
}
