//! Conversion factor table
//!
//! Scale divisors for raw accelerometer and gyroscope counts. The driver
//! rebuilds the table in the same call that changes a range, so it always
//! matches the configured range codes.

use crate::sample::{AccelData, GyroData};
use crate::sensors::{AccelDataG, AccelRange, GyroDataDps, GyroRange, ImuConfig};

/// Counts per physical unit for the current ranges
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConversionFactors {
    /// Accelerometer LSB per g
    pub accel_lsb_per_g: f32,
    /// Gyroscope LSB per °/s
    pub gyro_lsb_per_dps: f32,
}

impl ConversionFactors {
    /// Table entry for a pair of ranges
    #[must_use]
    pub const fn new(accel: AccelRange, gyro: GyroRange) -> Self {
        Self {
            accel_lsb_per_g: accel.sensitivity(),
            gyro_lsb_per_dps: gyro.sensitivity(),
        }
    }

    /// Table entry for a sensor configuration
    #[must_use]
    pub const fn from_config(config: &ImuConfig) -> Self {
        Self::new(config.accel.range, config.gyro.range)
    }

    /// Convert raw accelerometer counts to g
    #[must_use]
    pub fn accel_g(&self, raw: &AccelData) -> AccelDataG {
        AccelDataG {
            x: f32::from(raw.x) / self.accel_lsb_per_g,
            y: f32::from(raw.y) / self.accel_lsb_per_g,
            z: f32::from(raw.z) / self.accel_lsb_per_g,
        }
    }

    /// Convert raw gyroscope counts to °/s
    #[must_use]
    pub fn gyro_dps(&self, raw: &GyroData) -> GyroDataDps {
        GyroDataDps {
            x: f32::from(raw.x) / self.gyro_lsb_per_dps,
            y: f32::from(raw.y) / self.gyro_lsb_per_dps,
            z: f32::from(raw.z) / self.gyro_lsb_per_dps,
        }
    }
}

impl Default for ConversionFactors {
    fn default() -> Self {
        Self::from_config(&ImuConfig::default())
    }
}
