//! Output data rate and filter codes shared by the accelerometer and gyroscope
//!
//! `ACC_CONF` and `GYR_CONF` both hold the ODR code in their low nibble and
//! the filter / averaging mode in the bandwidth field above it.

/// Output data rate code (`acc_odr` / `gyr_odr`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputDataRate {
    /// 25 Hz
    Hz25 = 0x06,
    /// 50 Hz
    Hz50 = 0x07,
    /// 100 Hz
    Hz100 = 0x08,
    /// 200 Hz
    Hz200 = 0x09,
    /// 400 Hz
    Hz400 = 0x0A,
    /// 800 Hz
    Hz800 = 0x0B,
    /// 1600 Hz
    Hz1600 = 0x0C,
    /// 3200 Hz (gyroscope only)
    Hz3200 = 0x0D,
}

impl OutputDataRate {
    /// Rate in Hz
    #[must_use]
    pub const fn hz(self) -> u16 {
        match self {
            Self::Hz25 => 25,
            Self::Hz50 => 50,
            Self::Hz100 => 100,
            Self::Hz200 => 200,
            Self::Hz400 => 400,
            Self::Hz800 => 800,
            Self::Hz1600 => 1600,
            Self::Hz3200 => 3200,
        }
    }

    /// Field value for the ODR nibble
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Filter / averaging mode (`acc_bwp` / `gyr_bwp`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterMode {
    /// 4x oversampling
    Osr4 = 0x00,
    /// 2x oversampling
    Osr2 = 0x01,
    /// Normal filter mode
    Normal = 0x02,
}

impl FilterMode {
    /// Field value for the bandwidth bits
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}
