//! Sensor modules for the BMI160 / BMM150 pair
//!
//! Types, enums and configuration structures for each sensor:
//! - Accelerometer (3-axis, BMI160)
//! - Gyroscope (3-axis, BMI160)
//! - Magnetometer (3-axis + RHALL, BMM150)
//!
//! All bus operations are performed through methods on `Imu`.

pub mod accelerometer;
pub mod gyroscope;
pub mod magnetometer;
pub mod odr;

// Re-export main types
pub use accelerometer::{AccelConfig, AccelDataG, AccelRange};
pub use gyroscope::{GyroConfig, GyroDataDps, GyroRange};
pub use magnetometer::MagMode;
pub use odr::{FilterMode, OutputDataRate};

/// Complete sensor configuration pushed to the BMI160
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuConfig {
    /// Accelerometer rate and range
    pub accel: AccelConfig,
    /// Gyroscope rate and range
    pub gyro: GyroConfig,
}
