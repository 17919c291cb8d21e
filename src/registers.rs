//! Register maps for the BMI160 and the BMM150
//!
//! The BMI160 sits at one fixed address once discovery has picked it, so its
//! configuration bank is declared as a typed register block. The BMM150 is
//! reached directly, through the passthrough or by the bus sweep, and keeps
//! plain address tables.
//!
//! ## Passthrough (MAG_IF) bank
//! The BMI160 relays transactions to a device on its secondary port through
//! `MAG_IF_0..MAG_IF_4`:
//! - **MAG_IF_0**: secondary device address
//! - **MAG_IF_1**: manual mode (also the commit strobe) and burst length
//! - **MAG_IF_2**: first register of the shadowed burst-read window
//! - **MAG_IF_3**: target register for a relayed read or write
//! - **MAG_IF_4**: data byte for a relayed write, relayed byte for a read

device_driver::create_device!(
    device_name: Bmi160,
    dsl: {
        config {
            type RegisterAddressType = u8;
            type DefaultByteOrder = LE;
        }

        /// STATUS - Data ready and interface flags (0x1B)
        register Status {
            const ADDRESS = 0x1B;
            const SIZE_BITS = 8;

            reserved_1_0: uint = 0..2,
            /// Manual magnetometer interface operation in progress
            mag_man_op: bool = 2,
            /// Fast offset compensation ready
            foc_rdy: bool = 3,
            /// NVM ready
            nvm_rdy: bool = 4,
            /// New magnetometer data in the data window
            drdy_mag: bool = 5,
            /// New gyroscope data
            drdy_gyr: bool = 6,
            /// New accelerometer data
            drdy_acc: bool = 7,
        },

        /// ACC_CONF - Accelerometer rate and filter (0x40)
        register AccConf {
            const ADDRESS = 0x40;
            const SIZE_BITS = 8;

            /// Output data rate code
            acc_odr: uint = 0..4,
            /// Bandwidth / averaging mode
            acc_bwp: uint = 4..7,
            /// Undersampling
            acc_us: bool = 7,
        },

        /// ACC_RANGE - Accelerometer full-scale range (0x41)
        register AccRange {
            const ADDRESS = 0x41;
            const SIZE_BITS = 8;

            acc_range: uint = 0..4,
            reserved_7_4: uint = 4..8,
        },

        /// GYR_CONF - Gyroscope rate and filter (0x42)
        register GyrConf {
            const ADDRESS = 0x42;
            const SIZE_BITS = 8;

            /// Output data rate code
            gyr_odr: uint = 0..4,
            /// Bandwidth / oversampling mode
            gyr_bwp: uint = 4..6,
            reserved_7_6: uint = 6..8,
        },

        /// GYR_RANGE - Gyroscope full-scale range (0x43)
        register GyrRange {
            const ADDRESS = 0x43;
            const SIZE_BITS = 8;

            gyr_range: uint = 0..3,
            reserved_7_3: uint = 3..8,
        },

        /// MAG_CONF - Secondary interface polling rate (0x44)
        register MagConf {
            const ADDRESS = 0x44;
            const SIZE_BITS = 8;

            mag_odr: uint = 0..4,
            reserved_7_4: uint = 4..8,
        },

        /// MAG_IF_0 - Secondary device address (0x4B)
        register MagIf0 {
            const ADDRESS = 0x4B;
            const SIZE_BITS = 8;

            /// Address byte presented on the secondary port
            i2c_device_addr: uint = 0..8,
        },

        /// MAG_IF_1 - Secondary interface mode and burst length (0x4C)
        register MagIf1 {
            const ADDRESS = 0x4C;
            const SIZE_BITS = 8;

            /// Burst length code (3 = 8 bytes)
            mag_rd_burst: uint = 0..2,
            /// Trigger-readout offset
            mag_offset: uint = 2..6,
            reserved_6: uint = 6..7,
            /// Manual mode; writing it again commits a staged relayed write
            mag_manual_en: bool = 7,
        },

        /// MAG_IF_2 - Burst-read start register on the secondary device (0x4D)
        register MagIf2 {
            const ADDRESS = 0x4D;
            const SIZE_BITS = 8;

            read_addr: uint = 0..8,
        },

        /// MAG_IF_3 - Relayed target register (0x4E)
        register MagIf3 {
            const ADDRESS = 0x4E;
            const SIZE_BITS = 8;

            write_addr: uint = 0..8,
        },

        /// MAG_IF_4 - Relayed data byte (0x4F)
        register MagIf4 {
            const ADDRESS = 0x4F;
            const SIZE_BITS = 8;

            write_data: uint = 0..8,
        },

        /// Secondary interface enable (0x7D)
        register MagIfEnable {
            const ADDRESS = 0x7D;
            const SIZE_BITS = 8;

            enable: bool = 0,
            reserved_7_1: uint = 1..8,
        },

        /// CMD - Command register (0x7E)
        register Cmd {
            const ADDRESS = 0x7E;
            const SIZE_BITS = 8;

            cmd: uint = 0..8,
        },
    }
);

/// BMI160 addresses, identity and command values
pub mod bmi160 {
    /// Candidate bus addresses, probed in this order (SDO low, SDO high)
    pub const ADDRESSES: [u8; 2] = [0x68, 0x69];

    /// `CHIP_ID` register
    pub const CHIP_ID: u8 = 0x00;

    /// Expected `CHIP_ID` value
    pub const CHIP_ID_VALUE: u8 = 0xD1;

    /// Start of the unified data window (`DATA_0`)
    pub const DATA_0: u8 = 0x04;

    /// Length of the unified burst read: 8 mag bytes, 6 gyro bytes, 6 accel bytes
    pub const DATA_LEN: usize = 20;

    /// `ACC_CONF` address, as reported by configuration diagnostics
    pub const ACC_CONF: u8 = 0x40;

    /// `ACC_RANGE` address
    pub const ACC_RANGE: u8 = 0x41;

    /// `GYR_CONF` address
    pub const GYR_CONF: u8 = 0x42;

    /// `GYR_RANGE` address
    pub const GYR_RANGE: u8 = 0x43;

    /// `CMD` address
    pub const CMD: u8 = 0x7E;

    /// `MAG_CONF` polling rate used while shadowing a bridged magnetometer
    pub const MAG_ODR_BRIDGED: u8 = 0x0B;

    /// `MAG_IF_1` burst length code for 8 bytes (X, Y, Z, RHALL)
    pub const MAG_BURST_8: u8 = 0x03;

    /// Soft reset command
    pub const CMD_SOFT_RESET: u8 = 0xB6;

    /// Accelerometer normal power mode command
    pub const CMD_ACC_NORMAL: u8 = 0x11;

    /// Gyroscope normal power mode command
    pub const CMD_GYR_NORMAL: u8 = 0x15;

    /// Magnetometer interface normal mode command
    pub const CMD_MAG_NORMAL: u8 = 0x19;

    /// Byte offsets inside the unified data window
    pub mod offset {
        /// Magnetometer X (shadowed)
        pub const MAG_X: usize = 0;
        /// Magnetometer Y (shadowed)
        pub const MAG_Y: usize = 2;
        /// Magnetometer Z (shadowed)
        pub const MAG_Z: usize = 4;
        /// RHALL (shadowed)
        pub const RHALL: usize = 6;
        /// Gyroscope X
        pub const GYR_X: usize = 8;
        /// Gyroscope Y
        pub const GYR_Y: usize = 10;
        /// Gyroscope Z
        pub const GYR_Z: usize = 12;
        /// Accelerometer X
        pub const ACC_X: usize = 14;
        /// Accelerometer Y
        pub const ACC_Y: usize = 16;
        /// Accelerometer Z
        pub const ACC_Z: usize = 18;
    }
}

/// BMM150 magnetometer registers and commands
pub mod bmm150 {
    use core::ops::RangeInclusive;

    /// Physical addresses tried for direct and bridged wiring
    pub const ADDRESSES: RangeInclusive<u8> = 0x10..=0x13;

    /// `CHIP_ID` register
    pub const CHIP_ID: u8 = 0x40;

    /// Expected `CHIP_ID` value
    pub const CHIP_ID_VALUE: u8 = 0x32;

    /// First data register (`DATA_X_LSB`)
    pub const DATA_X: u8 = 0x42;

    /// X, Y, Z and RHALL, two bytes each
    pub const DATA_LEN: usize = 8;

    /// Power control register
    pub const POWER: u8 = 0x4B;

    /// Power control "on" value, also the expected read-back
    pub const POWER_ON: u8 = 0x01;

    /// Operation mode register
    pub const OPMODE: u8 = 0x4C;

    /// Operation mode value written when bridging
    pub const OPMODE_NORMAL: u8 = 0x06;

    /// Forced (single measurement) mode command
    pub const OPMODE_FORCED: u8 = 0x02;

    /// Right shift applied to the X and Y data words (13-bit)
    pub const XY_SHIFT: u32 = 3;

    /// Right shift applied to the Z data word (14-bit)
    pub const Z_SHIFT: u32 = 1;
}

/// Highest 7-bit bus address, the last one visited by the full-bus sweep
pub const MAX_BUS_ADDRESS: u8 = 0x7F;
