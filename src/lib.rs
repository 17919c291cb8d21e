#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bridge;
pub mod conversion;
pub mod device;
pub mod diagnostics;
pub mod discovery;
pub mod interface;
pub mod rate;
pub mod registers;
pub mod retry;
pub mod sample;
pub mod sensors;
pub mod time;

// Re-export main types
pub use conversion::ConversionFactors;
pub use device::{Imu, Timing};
pub use diagnostics::{BridgeStep, Diagnostics, Event, SearchTier};
pub use discovery::Topology;
pub use interface::{I2cInterface, PrimaryInterface, RegisterBus};
pub use rate::{Accumulator, clamp_frequency, interval_ms};
pub use retry::Retry;
pub use sample::{AccelData, GyroData, MagData, RawSample, decode_direct_mag, decode_unified};
pub use sensors::{
    AccelConfig, AccelDataG, AccelRange, FilterMode, GyroConfig, GyroDataDps, GyroRange,
    ImuConfig, MagMode, OutputDataRate,
};
pub use time::Clock;

#[cfg(feature = "defmt")]
pub use diagnostics::DefmtDiagnostics;

/// Driver errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with a device
    Bus(E),
    /// Identity register did not match (contains the value read)
    InvalidDevice(u8),
    /// Invalid configuration parameter
    InvalidConfig,
    /// Neither chip was found
    NotDetected,
    /// Relayed power status read back the wrong value (contains the value read)
    BridgeVerify(u8),
    /// Bridged magnetometer data never became available
    BridgeNotSynchronized,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
