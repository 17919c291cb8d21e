//! Bus primitives for the BMI160 / BMM150 pair
//!
//! Both chips share one two-wire bus and the driver addresses them (and, during
//! the full-bus sweep, every other address) through the same handle, so the
//! primitives take the target address on every call. [`PrimaryInterface`]
//! pins one address to back the typed BMI160 register block.

use device_driver::RegisterInterface;

/// Register-level bus transactions used by the driver
///
/// Every operation is blocking and fully completes its transaction before
/// returning. Implementations bound the transaction with their own timeout.
pub trait RegisterBus {
    /// Bus error type
    type Error;

    /// Check whether a device acknowledges `address` by setting its register pointer
    ///
    /// # Errors
    ///
    /// Returns the bus error when nothing acknowledges the address.
    fn probe(&mut self, address: u8, register: u8) -> Result<(), Self::Error>;

    /// Write a single register
    ///
    /// # Errors
    ///
    /// Returns the bus error if the transaction is not acknowledged.
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Read `buf.len()` consecutive registers starting at `register`
    ///
    /// # Errors
    ///
    /// Returns the bus error if the transaction fails.
    fn read_registers(&mut self, address: u8, register: u8, buf: &mut [u8])
    -> Result<(), Self::Error>;

    /// Read one identity byte after confirming the device answers
    ///
    /// # Errors
    ///
    /// Returns the bus error if either the probe or the read fails.
    fn read_id(&mut self, address: u8, register: u8) -> Result<u8, Self::Error> {
        self.probe(address, register)?;
        let mut id = [0u8; 1];
        self.read_registers(address, register, &mut id)?;
        Ok(id[0])
    }
}

/// I2C implementation of [`RegisterBus`] over `embedded-hal` 1.0
pub struct I2cInterface<I2C> {
    i2c: I2C,
}

impl<I2C> I2cInterface<I2C> {
    /// Wrap an I2C peripheral
    ///
    /// # Example
    /// ```ignore
    /// let interface = I2cInterface::new(i2c);
    /// let mut imu = Imu::new(interface);
    /// ```
    pub const fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Consume the interface and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> RegisterBus for I2cInterface<I2C>
where
    I2C: embedded_hal::i2c::I2c<Error = E>,
{
    type Error = E;

    fn probe(&mut self, address: u8, register: u8) -> Result<(), Self::Error> {
        self.i2c.write(address, &[register])
    }

    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c.write(address, &[register, value])
    }

    fn read_registers(
        &mut self,
        address: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c.write_read(address, &[register], buf)
    }
}

/// `device-driver` interface for the BMI160 at one bus address
pub struct PrimaryInterface<'a, B> {
    bus: &'a mut B,
    address: u8,
}

impl<'a, B> PrimaryInterface<'a, B> {
    /// Borrow `bus` for the BMI160 at `address`
    pub const fn new(bus: &'a mut B, address: u8) -> Self {
        Self { bus, address }
    }
}

impl<B> RegisterInterface for PrimaryInterface<'_, B>
where
    B: RegisterBus,
{
    type Error = B::Error;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in read_data.len()
        self.bus.read_registers(self.address, address, read_data)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits;
        // Every BMI160 register in the block is one byte wide
        for (offset, &value) in (0u8..).zip(write_data) {
            self.bus
                .write_register(self.address, address.wrapping_add(offset), value)?;
        }
        Ok(())
    }
}
