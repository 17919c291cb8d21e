//! Bridged magnetometer access through the BMI160 passthrough
//!
//! Every logical BMM150 register access is relayed by the BMI160 as a nested
//! transaction on its secondary port, so each relayed write is followed by a
//! commit and a settle in the tens of milliseconds.
//!
//! Once bridged, the BMI160 shadows the BMM150 data registers (X, Y, Z,
//! RHALL) into the first 8 bytes of its own data window, where the regular
//! burst read picks them up.

use embedded_hal::delay::DelayNs;

use crate::Error;
use crate::device::Imu;
use crate::diagnostics::{BridgeStep, Diagnostics, Event};
use crate::interface::RegisterBus;
use crate::registers::{bmi160, bmm150};
use crate::sensors::magnetometer::passthrough_address;

/// Shadowed magnetometer bytes
type ShadowBuffer = [u8; bmm150::DATA_LEN];

fn is_all_zero(buf: &ShadowBuffer) -> bool {
    buf.iter().all(|&byte| byte == 0)
}

impl<I, S> Imu<I, S>
where
    I: RegisterBus,
    S: Diagnostics,
{
    /// Bridge the BMM150 at `physical` through the BMI160 at `primary`
    ///
    /// Powers the magnetometer on, verifies the power state, selects its
    /// operating mode, points the shadow window at its data registers and
    /// waits for the first non-zero shadowed data. Any failed step aborts
    /// this candidate.
    ///
    /// Returns the 7-bit passthrough address on success.
    pub(crate) fn configure_bridge<D>(
        &mut self,
        primary: u8,
        physical: u8,
        delay: &mut D,
    ) -> Result<u8, Error<I::Error>>
    where
        D: DelayNs,
    {
        let passthrough = passthrough_address(physical);

        let result = self.interface.read_id(primary, bmi160::CHIP_ID).map(|_| ());
        self.bridge_step(physical, BridgeStep::PrimaryCheck, result.map_err(Error::Bus))?;

        let written = self.registers(primary).mag_if_0().write(|w| {
            w.set_i2c_device_addr(passthrough);
        });
        let result = self.register_gap(written, delay);
        self.bridge_step(physical, BridgeStep::TargetAddress, result)?;

        let result = self.passthrough_write(primary, bmm150::POWER, bmm150::POWER_ON, delay);
        self.bridge_step(physical, BridgeStep::PowerOn, result)?;

        let result = match self.passthrough_read(primary, bmm150::POWER, delay) {
            Ok(bmm150::POWER_ON) => Ok(()),
            Ok(status) => Err(Error::BridgeVerify(status)),
            Err(e) => Err(e),
        };
        self.bridge_step(physical, BridgeStep::PowerVerify, result)?;

        let result =
            self.passthrough_write(primary, bmm150::OPMODE, bmm150::OPMODE_NORMAL, delay);
        self.bridge_step(physical, BridgeStep::OperatingMode, result)?;

        let written = self.registers(primary).mag_conf().write(|w| {
            w.set_mag_odr(bmi160::MAG_ODR_BRIDGED);
        });
        let result = self.register_gap(written, delay);
        self.bridge_step(physical, BridgeStep::PollingRate, result)?;

        let result = self.configure_burst_window(primary, delay);
        self.bridge_step(physical, BridgeStep::BurstWindow, result)?;

        let result = self
            .registers(primary)
            .cmd()
            .write(|w| {
                w.set_cmd(bmi160::CMD_MAG_NORMAL);
            })
            .map_err(Error::Bus);
        self.bridge_step(physical, BridgeStep::NormalMode, result)?;
        delay.delay_ms(self.timing.mag_normal_ms);

        let result = self.synchronize_shadow(primary, physical, delay);
        self.bridge_step(physical, BridgeStep::Synchronize, result)?;

        Ok(passthrough)
    }

    /// Wait for the shadow buffer to carry real data
    ///
    /// All-zero data means "not yet synchronized". If `drdy_mag` never sets
    /// within the polling budget, one last direct read of the shadow buffer
    /// decides.
    fn synchronize_shadow<D>(
        &mut self,
        primary: u8,
        physical: u8,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let poll = self.timing.sync_poll;
        let synced = poll.poll(delay, || {
            if !self.mag_data_ready(primary) {
                return None;
            }
            let buf = self.read_shadow(primary).ok()?;
            if is_all_zero(&buf) {
                self.diagnostics
                    .record(Event::BridgeAllZero { address: physical });
                return None;
            }
            Some(())
        });
        if synced.is_some() {
            return Ok(());
        }

        self.diagnostics
            .record(Event::BridgeReadyTimeout { address: physical });
        let buf = self.read_shadow(primary)?;
        if is_all_zero(&buf) {
            Err(Error::BridgeNotSynchronized)
        } else {
            Ok(())
        }
    }

    /// Trigger one forced measurement on a bridged BMM150 and wait for it
    ///
    /// Returns whether `drdy_mag` was seen. A measurement that never becomes
    /// ready gets one recovery attempt (re-power and a long settle). Failure
    /// is not fatal; the following burst read just returns older data.
    pub(crate) fn trigger_bridged_forced<D>(
        &mut self,
        primary: u8,
        passthrough: u8,
        delay: &mut D,
    ) -> bool
    where
        D: DelayNs,
    {
        if self.arm_forced(primary, passthrough, delay).is_err() {
            self.diagnostics.record(Event::ForcedTriggerFailed);
            return false;
        }
        delay.delay_ms(self.timing.forced_conversion_ms);

        let poll = self.timing.forced_poll;
        if poll
            .poll(delay, || self.mag_data_ready(primary).then_some(()))
            .is_some()
        {
            return true;
        }

        self.diagnostics.record(Event::ForcedRecovery);
        if self.repower(primary).is_err() {
            self.diagnostics.record(Event::ForcedTriggerFailed);
        }
        delay.delay_ms(self.timing.forced_recovery_ms);

        if poll
            .poll(delay, || self.mag_data_ready(primary).then_some(()))
            .is_some()
        {
            return true;
        }

        self.diagnostics.record(Event::ForcedTimeout);
        false
    }

    fn arm_forced<D>(
        &mut self,
        primary: u8,
        passthrough: u8,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let written = self.registers(primary).mag_if_enable().write(|w| {
            w.set_enable(true);
        });
        self.register_gap(written, delay)?;
        // 7-bit passthrough address recorded by the bridge sequence, not the physical one
        let written = self.registers(primary).mag_if_0().write(|w| {
            w.set_i2c_device_addr(passthrough);
        });
        self.register_gap(written, delay)?;
        let written = self.registers(primary).mag_if_1().write(|w| {
            w.set_mag_manual_en(true);
        });
        self.register_gap(written, delay)?;
        self.stage_relayed_write(primary, bmm150::OPMODE, bmm150::OPMODE_FORCED, delay)?;
        self.commit(primary)
    }

    /// Relay the power-on write again, without settle delays
    fn repower(&mut self, primary: u8) -> Result<(), Error<I::Error>> {
        let mut device = self.registers(primary);
        device.mag_if_3().write(|w| {
            w.set_write_addr(bmm150::POWER);
        })?;
        device.mag_if_4().write(|w| {
            w.set_write_data(bmm150::POWER_ON);
        })?;
        self.commit(primary)
    }

    /// Shadow the 8 data bytes starting at the BMM150 X register
    fn configure_burst_window<D>(
        &mut self,
        primary: u8,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let written = self.registers(primary).mag_if_2().write(|w| {
            w.set_read_addr(bmm150::DATA_X);
        });
        self.register_gap(written, delay)?;
        let written = self.registers(primary).mag_if_1().write(|w| {
            w.set_mag_rd_burst(bmi160::MAG_BURST_8);
        });
        self.register_gap(written, delay)
    }

    /// Relay a register write to the secondary device
    fn passthrough_write<D>(
        &mut self,
        primary: u8,
        register: u8,
        value: u8,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let written = self.registers(primary).mag_if_1().write(|w| {
            w.set_mag_manual_en(true);
        });
        self.register_gap(written, delay)?;
        self.stage_relayed_write(primary, register, value, delay)?;
        self.commit(primary)?;
        delay.delay_ms(self.timing.passthrough_commit_ms);
        Ok(())
    }

    /// Load target register and data byte for the next commit
    fn stage_relayed_write<D>(
        &mut self,
        primary: u8,
        register: u8,
        value: u8,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let written = self.registers(primary).mag_if_3().write(|w| {
            w.set_write_addr(register);
        });
        self.register_gap(written, delay)?;
        let written = self.registers(primary).mag_if_4().write(|w| {
            w.set_write_data(value);
        });
        self.register_gap(written, delay)
    }

    /// Relay a register read from the secondary device
    fn passthrough_read<D>(
        &mut self,
        primary: u8,
        register: u8,
        delay: &mut D,
    ) -> Result<u8, Error<I::Error>>
    where
        D: DelayNs,
    {
        let written = self.registers(primary).mag_if_3().write(|w| {
            w.set_write_addr(register);
        });
        self.register_gap(written, delay)?;
        // Leaving manual mode starts the relayed read
        let written = self.registers(primary).mag_if_1().write(|w| {
            w.set_mag_manual_en(false);
        });
        self.register_gap(written, delay)?;

        let value = self.registers(primary).mag_if_4().read()?;
        Ok(value.write_data())
    }

    /// Strobe manual mode again to execute the staged relayed write
    fn commit(&mut self, primary: u8) -> Result<(), Error<I::Error>> {
        self.registers(primary).mag_if_1().write(|w| {
            w.set_mag_manual_en(true);
        })?;
        Ok(())
    }

    /// Pass a primary write through, pausing for the inter-write gap on success
    fn register_gap<D>(
        &self,
        written: Result<(), I::Error>,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        written?;
        delay.delay_ms(self.timing.register_gap_ms);
        Ok(())
    }

    fn mag_data_ready(&mut self, primary: u8) -> bool {
        self.registers(primary)
            .status()
            .read()
            .is_ok_and(|status| status.drdy_mag())
    }

    fn read_shadow(&mut self, primary: u8) -> Result<ShadowBuffer, Error<I::Error>> {
        let mut buf = [0u8; bmm150::DATA_LEN];
        self.interface
            .read_registers(primary, bmi160::DATA_0, &mut buf)?;
        Ok(buf)
    }

    /// Report a failed bridge step and pass the result through
    fn bridge_step<T>(
        &mut self,
        address: u8,
        step: BridgeStep,
        result: Result<T, Error<I::Error>>,
    ) -> Result<T, Error<I::Error>> {
        if result.is_err() {
            self.diagnostics
                .record(Event::BridgeFailed { address, step });
        }
        result
    }
}
