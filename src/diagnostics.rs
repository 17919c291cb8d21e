//! Diagnostic events raised while discovering and reading the sensors
//!
//! The driver never prints. Every notable outcome is handed to a
//! [`Diagnostics`] sink as a typed [`Event`]; the default sink `()` drops
//! them. Enable the `defmt` feature for [`DefmtDiagnostics`], which forwards
//! events to the defmt logger.

/// Which magnetometer search tier produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SearchTier {
    /// Magnetometer addressed directly on the shared bus
    Direct,
    /// Magnetometer reached through the BMI160 passthrough
    Bridged,
    /// Sweep over every bus address
    Sweep,
}

/// Step of the bridge configuration sequence that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeStep {
    /// BMI160 did not answer before bridging started
    PrimaryCheck,
    /// Writing the passthrough target address
    TargetAddress,
    /// Relayed power-on write
    PowerOn,
    /// Relayed power status read-back
    PowerVerify,
    /// Relayed operating-mode write
    OperatingMode,
    /// Secondary interface rate (`MAG_CONF`)
    PollingRate,
    /// Burst-read window start and length
    BurstWindow,
    /// Magnetometer interface normal-mode command
    NormalMode,
    /// Shadow buffer never produced non-zero data
    Synchronize,
}

/// A diagnostic event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A BMI160 candidate address was probed
    PrimaryProbe {
        /// Probed address
        address: u8,
        /// Identity byte, if the probe succeeded
        chip_id: Option<u8>,
    },
    /// BMI160 accepted at this address
    PrimaryFound {
        /// Accepted address
        address: u8,
    },
    /// No BMI160 candidate matched
    PrimaryMissing,
    /// A configuration or command write to the BMI160 failed
    ConfigWriteFailed {
        /// Register that could not be written
        register: u8,
    },
    /// A magnetometer candidate did not answer or had the wrong identity
    MagCandidateRejected {
        /// Search tier
        tier: SearchTier,
        /// Candidate address
        address: u8,
    },
    /// The bridge sequence stopped at `step`
    BridgeFailed {
        /// Physical magnetometer address being bridged
        address: u8,
        /// Failing step
        step: BridgeStep,
    },
    /// Shadow buffer read back all zero while waiting for synchronization
    BridgeAllZero {
        /// Physical magnetometer address being bridged
        address: u8,
    },
    /// `drdy_mag` never set during bridge synchronization
    BridgeReadyTimeout {
        /// Physical magnetometer address being bridged
        address: u8,
    },
    /// Magnetometer accepted
    MagFound {
        /// Tier that found it
        tier: SearchTier,
        /// Physical address
        address: u8,
    },
    /// No tier found a magnetometer
    MagMissing,
    /// Arming a bridged forced measurement failed on the bus
    ForcedTriggerFailed,
    /// Bridged forced measurement not ready, re-powering the magnetometer
    ForcedRecovery,
    /// Bridged forced measurement still not ready after recovery
    ForcedTimeout,
    /// A data read failed and the zero sentinel was used
    ReadFailed {
        /// Device address that failed
        address: u8,
    },
}

impl Event {
    /// Whether the event reports a failure rather than progress
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::PrimaryMissing
                | Self::ConfigWriteFailed { .. }
                | Self::BridgeFailed { .. }
                | Self::BridgeReadyTimeout { .. }
                | Self::MagMissing
                | Self::ForcedTriggerFailed
                | Self::ForcedTimeout
                | Self::ReadFailed { .. }
        )
    }
}

/// Sink for diagnostic events
pub trait Diagnostics {
    /// Record one event. The default implementation drops it.
    fn record(&mut self, event: Event) {
        let _ = event;
    }
}

impl Diagnostics for () {}

impl<T: Diagnostics + ?Sized> Diagnostics for &mut T {
    fn record(&mut self, event: Event) {
        (**self).record(event);
    }
}

/// Forwards events to the defmt logger
#[cfg(feature = "defmt")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefmtDiagnostics;

#[cfg(feature = "defmt")]
impl Diagnostics for DefmtDiagnostics {
    fn record(&mut self, event: Event) {
        if event.is_failure() {
            defmt::warn!("imu: {}", event);
        } else {
            defmt::debug!("imu: {}", event);
        }
    }
}
