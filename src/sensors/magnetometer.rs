//! Magnetometer wiring and decode helpers for the BMM150

/// How the BMM150 is reached on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagMode {
    /// No magnetometer found
    #[default]
    Absent,
    /// Wired to the shared bus and addressed on its own
    Direct,
    /// Reached through the BMI160's secondary-port passthrough
    Bridged,
}

impl MagMode {
    /// Whether a magnetometer was found by any search tier
    #[must_use]
    pub const fn is_present(self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// 7-bit passthrough address for a physical BMM150 address
#[must_use]
pub const fn passthrough_address(physical: u8) -> u8 {
    physical >> 1
}
