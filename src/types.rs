use bitflags::bitflags;

use crate::protocol::{parse_identity, RawInfo};

bitflags! {
    /// Capability and status bits reported by a watchdog driver.
    ///
    /// The same bits describe what a device supports ([`DeviceInfo::options`]),
    /// what it currently sees ([`Device::status`](crate::Device::status)) and
    /// why it last reset the host ([`Device::boot_status`](crate::Device::boot_status)).
    /// Unknown bits from the driver are retained.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WatchdogFlags: u32 {
        /// Reset due to CPU overheat.
        const OVERHEAT    = 0x0001;
        /// Fan failed.
        const FAN_FAULT   = 0x0002;
        /// External relay 1.
        const EXTERN1     = 0x0004;
        /// External relay 2.
        const EXTERN2     = 0x0008;
        /// Power bad / power fault.
        const POWER_UNDER = 0x0010;
        /// Card previously reset the CPU.
        const CARD_RESET  = 0x0020;
        /// Power over voltage.
        const POWER_OVER  = 0x0040;
        /// Timeout can be set (in seconds).
        const SET_TIMEOUT = 0x0080;
        /// Supports the magic close character.
        const MAGIC_CLOSE = 0x0100;
        /// Pre-timeout can be read and set (in seconds).
        const PRETIMEOUT  = 0x0200;
        /// Raises a management alarm instead of rebooting.
        const ALARM_ONLY  = 0x0400;
        /// Keep-alive ping is supported.
        const KEEPALIVE   = 0x8000;
    }
}

bitflags! {
    /// Control signals for [`Device::set_options`](crate::Device::set_options).
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SetOptions: u32 {
        /// Turn off the watchdog timer.
        const DISABLE_CARD = 0x0001;
        /// Turn on the watchdog timer.
        const ENABLE_CARD  = 0x0002;
        /// Kernel panic on temperature trip.
        const TEMP_PANIC   = 0x0004;
    }
}

/// Snapshot of what a watchdog device supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub options: WatchdogFlags,
    /// Driver-defined firmware version.
    pub firmware_version: u32,
    /// Driver name with NUL padding removed.
    pub identity: String,
}

impl DeviceInfo {
    /// Whether every bit in `flags` is advertised by the device.
    pub fn supports(&self, flags: WatchdogFlags) -> bool {
        self.options.contains(flags)
    }
}

impl From<RawInfo> for DeviceInfo {
    fn from(raw: RawInfo) -> Self {
        Self {
            options: WatchdogFlags::from_bits_retain(raw.options),
            firmware_version: raw.firmware_version,
            identity: parse_identity(&raw.identity),
        }
    }
}
