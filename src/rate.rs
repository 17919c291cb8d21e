//! Rate limiting and averaging
//!
//! Samples are read at the sensors' native rate and folded into an
//! [`Accumulator`]. Once per output interval the integer-truncated mean is
//! emitted and the accumulator starts over.

use embedded_hal::delay::DelayNs;

use crate::device::Imu;
use crate::diagnostics::Diagnostics;
use crate::interface::RegisterBus;
use crate::sample::{AccelData, GyroData, MagData, RawSample};
use crate::sensors::{AccelConfig, GyroConfig, OutputDataRate};
use crate::time::Clock;

/// Highest native accelerometer rate in Hz
pub const MAX_ACCEL_HZ: f32 = OutputDataRate::Hz1600.hz() as f32;

/// Highest native gyroscope rate in Hz
pub const MAX_GYRO_HZ: f32 = OutputDataRate::Hz3200.hz() as f32;

/// Highest magnetometer rate in Hz
pub const MAX_MAG_HZ: f32 = 100.0;

/// Rate used when the caller asks for zero, a negative rate or NaN
pub const DEFAULT_HZ: f32 = 10.0;

/// Clamp a requested output rate to what the present sensors can deliver
///
/// The cap is the slower of the accelerometer and gyroscope, lowered to the
/// magnetometer's rate whenever a magnetometer is present.
#[must_use]
pub fn clamp_frequency(target_hz: f32, mag_present: bool) -> f32 {
    // `!(x > 0)` also catches NaN
    let requested = if target_hz > 0.0 { target_hz } else { DEFAULT_HZ };

    let mut max_hz = MAX_ACCEL_HZ.min(MAX_GYRO_HZ);
    if mag_present {
        max_hz = max_hz.min(MAX_MAG_HZ);
    }

    requested.min(max_hz)
}

/// Output interval in whole milliseconds (truncated)
#[must_use]
pub fn interval_ms(frequency_hz: f32) -> u64 {
    (1000.0 / frequency_hz) as u64
}

/// Running per-axis sums for one output interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accumulator {
    accel: [i64; 3],
    gyro: [i64; 3],
    mag: [i64; 3],
    rhall: i64,
    samples: u32,
    last_flush_ms: Option<u64>,
}

impl Accumulator {
    /// Empty accumulator with no interval started
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accel: [0; 3],
            gyro: [0; 3],
            mag: [0; 3],
            rhall: 0,
            samples: 0,
            last_flush_ms: None,
        }
    }

    /// Fold one sample into the sums
    ///
    /// A full accumulator (`u32::MAX` samples) ignores further samples until
    /// the next flush.
    pub fn add(&mut self, sample: &RawSample) {
        let Some(samples) = self.samples.checked_add(1) else {
            return;
        };
        add_axes(
            &mut self.accel,
            [sample.accel.x, sample.accel.y, sample.accel.z],
        );
        add_axes(&mut self.gyro, [sample.gyro.x, sample.gyro.y, sample.gyro.z]);
        add_axes(&mut self.mag, [sample.mag.x, sample.mag.y, sample.mag.z]);
        self.rhall += i64::from(sample.rhall);
        self.samples = samples;
    }

    /// Number of samples accumulated since the last flush
    #[must_use]
    pub const fn samples(&self) -> u32 {
        self.samples
    }

    /// Whether no samples are accumulated
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.samples == 0
    }

    /// Integer-truncated mean of the accumulated samples, `None` when empty
    #[must_use]
    pub fn mean(&self) -> Option<RawSample> {
        if self.samples == 0 {
            return None;
        }
        let n = i64::from(self.samples);
        let [ax, ay, az] = mean_axes(&self.accel, n);
        let [gx, gy, gz] = mean_axes(&self.gyro, n);
        let [mx, my, mz] = mean_axes(&self.mag, n);

        Some(RawSample {
            accel: AccelData {
                x: ax,
                y: ay,
                z: az,
            },
            gyro: GyroData {
                x: gx,
                y: gy,
                z: gz,
            },
            mag: MagData {
                x: mx,
                y: my,
                z: mz,
            },
            rhall: (self.rhall / n) as i16,
        })
    }

    /// Take the mean and clear the sums, keeping the interval timestamp
    pub fn flush(&mut self) -> Option<RawSample> {
        let mean = self.mean();
        *self = Self {
            last_flush_ms: self.last_flush_ms,
            ..Self::new()
        };
        mean
    }

    /// Close the interval if `interval_ms` has elapsed at `now_ms`
    ///
    /// The first call only starts the interval. When the interval has
    /// elapsed the timestamp restarts and the flushed mean is returned; an
    /// empty accumulator yields `None` and stays empty.
    pub fn tick(&mut self, now_ms: u64, interval_ms: u64) -> Option<RawSample> {
        let started = *self.last_flush_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(started) < interval_ms {
            return None;
        }
        self.last_flush_ms = Some(now_ms);
        self.flush()
    }
}

fn add_axes(sums: &mut [i64; 3], axes: [i16; 3]) {
    for (sum, axis) in sums.iter_mut().zip(axes) {
        *sum += i64::from(axis);
    }
}

// The mean of i16 values always fits in i16
fn mean_axes(sums: &[i64; 3], n: i64) -> [i16; 3] {
    sums.map(|sum| (sum / n) as i16)
}

impl<I, S> Imu<I, S>
where
    I: RegisterBus,
    S: Diagnostics,
{
    /// Push the accelerometer and gyroscope to their fastest native rates
    ///
    /// Runs until it succeeds once; repeating it would only rewrite the same
    /// registers.
    pub(crate) fn apply_native_rates(&mut self) {
        if self.native_rates_applied {
            return;
        }
        let Some(primary) = self.topology.primary_address else {
            self.native_rates_applied = true;
            return;
        };

        let accel = AccelConfig::fastest(self.config.accel.range);
        let gyro = GyroConfig::fastest(self.config.gyro.range);

        let accel_ok = self.write_accel_conf(primary, accel).is_ok();
        let gyro_ok = self.write_gyro_conf(primary, gyro).is_ok();

        if accel_ok {
            self.config.accel = accel;
        }
        if gyro_ok {
            self.config.gyro = gyro;
        }
        self.native_rates_applied = accel_ok && gyro_ok;
    }

    /// One polling step of the rate limiter
    pub(crate) fn poll_rate<C, D>(
        &mut self,
        target_hz: f32,
        clock: &C,
        delay: &mut D,
    ) -> Option<RawSample>
    where
        C: Clock,
        D: DelayNs,
    {
        self.apply_native_rates();

        let frequency = clamp_frequency(target_hz, self.topology.mag_mode.is_present());
        let interval = interval_ms(frequency);

        let sample = self.read_once(delay);
        self.accumulator.add(&sample);

        self.accumulator.tick(clock.now_ms(), interval)
    }
}
