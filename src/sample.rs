//! Raw samples and the read cycle
//!
//! The decode functions are pure: they take a raw register window and return
//! signed counts. [`Imu::read_raw`](crate::Imu::read_raw) picks the bus
//! procedure for the discovered topology and falls back to the zero sentinel
//! on any failure.

use embedded_hal::delay::DelayNs;

use crate::Error;
use crate::device::Imu;
use crate::diagnostics::{Diagnostics, Event};
use crate::interface::RegisterBus;
use crate::registers::{bmi160, bmm150};
use crate::sensors::MagMode;

/// Accelerometer data (raw 16-bit values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelData {
    /// X-axis acceleration (raw)
    pub x: i16,
    /// Y-axis acceleration (raw)
    pub y: i16,
    /// Z-axis acceleration (raw)
    pub z: i16,
}

/// Gyroscope data (raw 16-bit values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroData {
    /// X-axis rotation (raw)
    pub x: i16,
    /// Y-axis rotation (raw)
    pub y: i16,
    /// Z-axis rotation (raw)
    pub z: i16,
}

/// Magnetometer data (raw 16-bit values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagData {
    /// X-axis magnetic field (raw)
    pub x: i16,
    /// Y-axis magnetic field (raw)
    pub y: i16,
    /// Z-axis magnetic field (raw)
    pub z: i16,
}

/// One synchronized read of all sensors
///
/// Zero is the "no data" sentinel: an absent sensor or a failed read leaves
/// its fields at zero. An all-zero triple is inconclusive, not a reading of
/// zero field or acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// Accelerometer counts
    pub accel: AccelData,
    /// Gyroscope counts
    pub gyro: GyroData,
    /// Magnetometer counts
    pub mag: MagData,
    /// Hall resistance (RHALL) counts
    pub rhall: i16,
}

impl RawSample {
    /// The all-zero sentinel
    pub const ZERO: Self = Self {
        accel: AccelData { x: 0, y: 0, z: 0 },
        gyro: GyroData { x: 0, y: 0, z: 0 },
        mag: MagData { x: 0, y: 0, z: 0 },
        rhall: 0,
    };

    /// Whether every field holds the zero sentinel
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

#[inline]
fn le_i16(buf: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// Decode the BMI160 unified data window (`DATA_0`, 20 bytes)
///
/// Every field is a little-endian signed word at its fixed offset. The
/// magnetometer fields are only meaningful when the BMM150 is bridged.
#[must_use]
pub fn decode_unified(buf: &[u8; bmi160::DATA_LEN]) -> RawSample {
    use bmi160::offset;

    RawSample {
        accel: AccelData {
            x: le_i16(buf, offset::ACC_X),
            y: le_i16(buf, offset::ACC_Y),
            z: le_i16(buf, offset::ACC_Z),
        },
        gyro: GyroData {
            x: le_i16(buf, offset::GYR_X),
            y: le_i16(buf, offset::GYR_Y),
            z: le_i16(buf, offset::GYR_Z),
        },
        mag: MagData {
            x: le_i16(buf, offset::MAG_X),
            y: le_i16(buf, offset::MAG_Y),
            z: le_i16(buf, offset::MAG_Z),
        },
        rhall: le_i16(buf, offset::RHALL),
    }
}

/// Decode a direct BMM150 data window (`DATA_X`, 8 bytes)
///
/// X and Y carry 13 significant bits and Z 14, left-aligned in their words,
/// so they are shifted arithmetically after the signed conversion. RHALL is
/// used as-is.
#[must_use]
pub fn decode_direct_mag(buf: &[u8; bmm150::DATA_LEN]) -> (MagData, i16) {
    let mag = MagData {
        x: le_i16(buf, 0) >> bmm150::XY_SHIFT,
        y: le_i16(buf, 2) >> bmm150::XY_SHIFT,
        z: le_i16(buf, 4) >> bmm150::Z_SHIFT,
    };
    (mag, le_i16(buf, 6))
}

impl<I, S> Imu<I, S>
where
    I: RegisterBus,
    S: Diagnostics,
{
    /// One read cycle for the discovered topology
    pub(crate) fn read_once<D>(&mut self, delay: &mut D) -> RawSample
    where
        D: DelayNs,
    {
        let topology = self.topology;
        let mut sample = RawSample::ZERO;

        if let Some(primary) = topology.primary_address {
            let bridged = topology.mag_mode == MagMode::Bridged;

            if bridged {
                if let Some(passthrough) = topology.passthrough_address {
                    if self.trigger_bridged_forced(primary, passthrough, delay) {
                        delay.delay_ms(self.timing.forced_settle_ms);
                    }
                }
            }

            let mut buf = [0u8; bmi160::DATA_LEN];
            match self
                .interface
                .read_registers(primary, bmi160::DATA_0, &mut buf)
            {
                Ok(()) => {
                    let frame = decode_unified(&buf);
                    sample.accel = frame.accel;
                    sample.gyro = frame.gyro;
                    if bridged {
                        sample.mag = frame.mag;
                        sample.rhall = frame.rhall;
                    }
                }
                Err(_) => self
                    .diagnostics
                    .record(Event::ReadFailed { address: primary }),
            }
        }

        if topology.mag_mode == MagMode::Direct {
            if let Some(address) = topology.mag_address {
                match self.read_direct_mag(address, delay) {
                    Ok((mag, rhall)) => {
                        sample.mag = mag;
                        sample.rhall = rhall;
                    }
                    Err(_) => self.diagnostics.record(Event::ReadFailed { address }),
                }
            }
        }

        sample
    }

    /// Forced-mode measurement on a directly wired BMM150
    fn read_direct_mag<D>(
        &mut self,
        address: u8,
        delay: &mut D,
    ) -> Result<(MagData, i16), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.interface
            .write_register(address, bmm150::OPMODE, bmm150::OPMODE_FORCED)?;
        delay.delay_ms(self.timing.direct_conversion_ms);

        let mut buf = [0u8; bmm150::DATA_LEN];
        self.interface
            .read_registers(address, bmm150::DATA_X, &mut buf)?;
        Ok(decode_direct_mag(&buf))
    }
}
