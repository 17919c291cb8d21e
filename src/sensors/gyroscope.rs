//! Gyroscope sensor types and configuration
//!
//! Provides types, enums, and utility functions for the BMI160's 3-axis gyroscope.

use super::odr::{FilterMode, OutputDataRate};

/// Gyroscope full-scale range (`GYR_RANGE` codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroRange {
    /// ±2000°/s range
    Dps2000 = 0x00,
    /// ±1000°/s range
    Dps1000 = 0x01,
    /// ±500°/s range
    Dps500 = 0x02,
    /// ±250°/s range
    Dps250 = 0x03,
    /// ±125°/s range
    Dps125 = 0x04,
}

impl GyroRange {
    /// Get the sensitivity in LSB/(°/s)
    ///
    /// This is used to convert raw sensor values to physical units.
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::Dps2000 => 16.384,
            Self::Dps1000 => 32.768,
            Self::Dps500 => 65.536,
            Self::Dps250 => 131.072,
            Self::Dps125 => 262.144,
        }
    }

    /// Register code written to `GYR_RANGE`
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look up a range by its register code
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::Dps2000),
            0x01 => Some(Self::Dps1000),
            0x02 => Some(Self::Dps500),
            0x03 => Some(Self::Dps250),
            0x04 => Some(Self::Dps125),
            _ => None,
        }
    }
}

/// Gyroscope configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroConfig {
    /// Output data rate
    pub odr: OutputDataRate,
    /// Filter / averaging mode
    pub filter: FilterMode,
    /// Full-scale range
    pub range: GyroRange,
}

impl Default for GyroConfig {
    fn default() -> Self {
        Self {
            odr: OutputDataRate::Hz100,
            filter: FilterMode::Normal,
            range: GyroRange::Dps2000,
        }
    }
}

impl GyroConfig {
    /// Fastest native gyroscope setting: 3200 Hz, 4x oversampling
    #[must_use]
    pub const fn fastest(range: GyroRange) -> Self {
        Self {
            odr: OutputDataRate::Hz3200,
            filter: FilterMode::Osr4,
            range,
        }
    }
}

/// Gyroscope data in degrees per second
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroDataDps {
    /// X-axis rotation rate in °/s
    pub x: f32,
    /// Y-axis rotation rate in °/s
    pub y: f32,
    /// Z-axis rotation rate in °/s
    pub z: f32,
}
