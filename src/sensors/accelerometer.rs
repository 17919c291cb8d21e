//! Accelerometer sensor types and configuration
//!
//! Provides types, enums, and utility functions for the BMI160's 3-axis accelerometer.

use super::odr::{FilterMode, OutputDataRate};

/// Accelerometer full-scale range (`ACC_RANGE` codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRange {
    /// ±2g range (most sensitive, least range)
    G2 = 0x03,
    /// ±4g range
    G4 = 0x05,
    /// ±8g range
    G8 = 0x08,
    /// ±16g range (least sensitive, most range)
    G16 = 0x0C,
}

impl AccelRange {
    /// Get the sensitivity in LSB/g (Least Significant Bit per g)
    ///
    /// This is used to convert raw sensor values to physical units.
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::G2 => 16384.0,
            Self::G4 => 8192.0,
            Self::G8 => 4096.0,
            Self::G16 => 2048.0,
        }
    }

    /// Register code written to `ACC_RANGE`
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look up a range by its register code
    ///
    /// Only the four documented codes are accepted.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x03 => Some(Self::G2),
            0x05 => Some(Self::G4),
            0x08 => Some(Self::G8),
            0x0C => Some(Self::G16),
            _ => None,
        }
    }
}

/// Accelerometer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelConfig {
    /// Output data rate
    pub odr: OutputDataRate,
    /// Filter / averaging mode
    pub filter: FilterMode,
    /// Full-scale range
    pub range: AccelRange,
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            odr: OutputDataRate::Hz100,
            filter: FilterMode::Normal,
            range: AccelRange::G4,
        }
    }
}

impl AccelConfig {
    /// Fastest native accelerometer setting: 1600 Hz, 4x oversampling
    #[must_use]
    pub const fn fastest(range: AccelRange) -> Self {
        Self {
            odr: OutputDataRate::Hz1600,
            filter: FilterMode::Osr4,
            range,
        }
    }
}

/// Accelerometer data in physical units (g-force)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelDataG {
    /// X-axis acceleration in g
    pub x: f32,
    /// Y-axis acceleration in g
    pub y: f32,
    /// Z-axis acceleration in g
    pub z: f32,
}

impl AccelDataG {
    /// Calculate the magnitude of the acceleration vector
    ///
    /// Returns the magnitude in g. At rest this should be ~1.0g.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}
