//! Watchdog control catalog: requests, constants, and unit conversion.
//!
//! Pure definitions with no I/O: shared by every platform backend.

use std::time::Duration;

use crate::WatchdogError;

/// Conventional watchdog device node. `/dev/watchdog` aliases `/dev/watchdog0`
/// on current kernels.
pub const DEFAULT_PATH: &str = "/dev/watchdog";

/// Byte written before close to disarm the timer ("Magic Close").
pub const MAGIC_CLOSE: u8 = b'V';

/// Size of the NUL-padded identity buffer in the support record.
pub const IDENTITY_LEN: usize = 32;

/// A single request against the platform watchdog control interface.
///
/// Integer arguments and results are in the units the hardware reports:
/// seconds for every timing request, bit flags for status and options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    GetStatus,
    GetBootStatus,
    GetTemp,
    SetOptions,
    SetTimeout,
    GetTimeout,
    SetPreTimeout,
    GetPreTimeout,
    GetTimeLeft,
}

impl Request {
    /// Short operation name used in errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::GetStatus => "status",
            Self::GetBootStatus => "boot_status",
            Self::GetTemp => "temp",
            Self::SetOptions => "set_options",
            Self::SetTimeout => "set_timeout",
            Self::GetTimeout => "timeout",
            Self::SetPreTimeout => "set_pretimeout",
            Self::GetPreTimeout => "pretimeout",
            Self::GetTimeLeft => "time_left",
        }
    }
}

/// Support record as the driver fills it in.
///
/// Layout matches the kernel's `struct watchdog_info`, so a backend can hand
/// a pointer to it straight to the control call.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInfo {
    pub options: u32,
    pub firmware_version: u32,
    pub identity: [u8; IDENTITY_LEN],
}

impl Default for RawInfo {
    fn default() -> Self {
        Self {
            options: 0,
            firmware_version: 0,
            identity: [0u8; IDENTITY_LEN],
        }
    }
}

/// Convert a duration to the whole seconds the hardware accepts.
///
/// Sub-second parts are truncated, never rounded.
pub fn duration_to_secs(d: Duration) -> Result<i32, WatchdogError> {
    i32::try_from(d.as_secs()).map_err(|_| WatchdogError::InvalidDuration(d))
}

/// Convert a whole-second hardware value back into a duration.
///
/// Drivers never report negative timings; one that does is read as zero.
pub fn secs_to_duration(secs: i32) -> Duration {
    Duration::from_secs(u64::try_from(secs).unwrap_or(0))
}

/// Strip the NUL padding from a fixed-size identity buffer.
///
/// Invalid UTF-8 is replaced rather than rejected; the name is informational.
pub fn parse_identity(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
